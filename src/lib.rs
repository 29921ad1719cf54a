//! `tgbot-http` is a resilient async HTTP client for the Telegram Bot API.
//!
//! Requests flow through three layers:
//! - a [`Transport`] performs one raw exchange ([`FormTransport`] or
//!   [`MultipartTransport`]);
//! - [`HttpClient::fetch_with_retry`] retries failed attempts with a pluggable
//!   [`RetryHandler`];
//! - [`TelegramBot`] shapes endpoint payloads, classifies API errors with
//!   [`ApiRetryHandler`] and recovers from rate limits in an outer loop.

mod client;
mod encode;
mod error;
mod http;
mod input;
mod log;
mod options;
mod payload;
mod request;
mod response;
mod sleep;
mod transport;
mod types;
mod value;
mod wire;

#[cfg(test)]
mod testing;

pub use client::{api_url, classify_bad_request, ApiRetryHandler, Backend, TelegramBot};
pub use error::{TgBotError, TransportError};
pub use http::{
    FixedDelay, HttpClient, RetryHandler, RetryRequest, NO_RESPONSE_STATUS, POST_SIZE_LIMIT_MARKER,
};
pub use input::{
    InputFile, InputMedia, MediaKind, PinChatMessage, SendAnimation, SendAudio, SendMediaGroup,
    SendMessage, SendOptions, SendPhoto, SendVideo, MAX_CAPTION_LEN, MAX_MESSAGE_LEN,
};
#[cfg(feature = "tracing")]
pub use log::TracingLogger;
pub use log::{Logger, NoopLogger};
pub use options::BotOptions;
pub use payload::Payload;
pub use request::{append_query, query_string, FetchOptions, Method};
pub use response::Response;
pub use sleep::{Sleeper, DefaultSleeper};
pub use transport::{FormTransport, MultipartTransport, Transport};
pub use types::{Bot, Recipient};
pub use value::{Blob, PayloadValue};
pub use wire::{ApiResponse, ApiResult, Chat, FileRef, Message, ResponseParameters};

pub type Result<T> = std::result::Result<T, TgBotError>;
