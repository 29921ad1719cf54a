use crate::{wire::ApiResponse, Response};

/// Failure raised by a [`Transport`](crate::Transport) when a request could not
/// produce a [`Response`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Network or request execution error from `reqwest`.
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    /// Status code `>= 400` while HTTP exceptions were not muted.
    #[error("request failed with status code {status}")]
    Status { status: u16 },
    /// A caller-supplied header name or value is not valid HTTP.
    #[error("invalid header: {name}")]
    InvalidHeader { name: String },
    /// Redirect suppression was requested on a target that cannot honor it.
    #[error("redirect suppression is not supported by this transport")]
    RedirectUnsupported,
    /// Failure reported by a non-`reqwest` transport.
    #[error("{0}")]
    Other(String),
}

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum TgBotError {
    /// The request could not be sent at all.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// The payload exceeded the transport's POST size limit. Never retried.
    #[error("Limit Exceeded: URLFetch POST Size.")]
    PayloadTooLarge,
    /// Status 429. Carries the response so callers can read the retry-after hint.
    #[error("too many requests (status {})", .response.status())]
    RateLimited { response: Box<Response> },
    /// Retry budget ran out; embeds the last observed error message.
    #[error("fetch error after retry: {message}")]
    RetryExhausted { message: String },
    /// The API could not retrieve a remotely hosted media URL.
    #[error("send media by url error: {description}")]
    SendMediaByUrl { description: String },
    /// The API rejected an oversized attachment.
    #[error("file too large: {description}")]
    FileTooLarge { description: String },
    /// Payload shaping failed before anything was sent.
    #[error("encode error: {0}")]
    Encode(String),
    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl TgBotError {
    /// Returns `true` for the kinds that are never retried by any layer.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::PayloadTooLarge
                | Self::RetryExhausted { .. }
                | Self::SendMediaByUrl { .. }
                | Self::FileTooLarge { .. }
        )
    }

    /// Server-directed delay in seconds carried by a [`TgBotError::RateLimited`].
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited { response } => {
                ApiResponse::parse(&response.text())?.retry_after()
            }
            _ => None,
        }
    }
}
