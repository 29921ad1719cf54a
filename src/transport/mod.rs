//! Raw request backends.
//!
//! A [`Transport`] performs exactly one HTTP exchange. Both shipped variants run
//! on `reqwest` (hyper natively, the Fetch API on `wasm32`) and differ only in
//! how payloads are encoded:
//! - [`FormTransport`] sends form-urlencoded bodies and switches to multipart
//!   only when an attachment is present.
//! - [`MultipartTransport`] always sends multipart bodies.

mod form;
mod multipart;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    multipart::{Form, Part},
    RequestBuilder,
};

pub use form::FormTransport;
pub use multipart::MultipartTransport;

use crate::{FetchOptions, Payload, PayloadValue, Response, TransportError};

/// One raw HTTP request → one [`Response`].
///
/// Contract shared by every implementation:
/// - `options.params` are appended to the URL with
///   [`append_query`](crate::append_query).
/// - headers and content type are attached only when provided, and replace
///   whatever the body encoding would set for the same name.
/// - `follow_redirects == false` is never silently ignored.
/// - `mute_http_exceptions == true` yields a `Response` for every status code.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Response, TransportError>;
}

/// Pair of `reqwest` clients so redirect following can be chosen per request.
#[derive(Clone, Debug)]
struct Clients {
    follow: reqwest::Client,
    #[cfg(not(target_arch = "wasm32"))]
    no_follow: reqwest::Client,
    timeout: Option<Duration>,
}

impl Clients {
    fn new() -> Result<Self, TransportError> {
        Ok(Self {
            follow: reqwest::Client::builder().build()?,
            #[cfg(not(target_arch = "wasm32"))]
            no_follow: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()?,
            timeout: None,
        })
    }

    fn client(&self, follow_redirects: bool) -> Result<&reqwest::Client, TransportError> {
        if follow_redirects {
            return Ok(&self.follow);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Ok(&self.no_follow)
        }
        // The Fetch API offers no per-request redirect policy through reqwest.
        #[cfg(target_arch = "wasm32")]
        {
            Err(TransportError::RedirectUnsupported)
        }
    }

    fn request(&self, url: &str, options: &FetchOptions) -> Result<RequestBuilder, TransportError> {
        let url = options.url_for(url);
        let mut builder = self
            .client(options.follow_redirects)?
            .request(options.method.into(), url);
        if let Some(timeout) = options.timeout.or(self.timeout) {
            builder = builder.timeout(timeout);
        }
        Ok(builder)
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        options: &FetchOptions,
    ) -> Result<Response, TransportError> {
        let builder = apply_headers(builder, options)?;
        let response = builder.send().await?;
        let status = response.status().as_u16();

        if status >= 400 && !options.mute_http_exceptions {
            return Err(TransportError::Status { status });
        }

        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Response::new(status, headers, body.to_vec()))
    }
}

/// Caller headers are applied after the body so they override body defaults
/// such as the form or multipart `Content-Type`.
fn apply_headers(
    builder: RequestBuilder,
    options: &FetchOptions,
) -> Result<RequestBuilder, TransportError> {
    let mut headers = HeaderMap::new();
    for (name, value) in options.headers.iter().flatten() {
        headers.append(header_name(name)?, header_value(name, value)?);
    }
    if let Some(content_type) = &options.content_type {
        headers.insert(CONTENT_TYPE, header_value(CONTENT_TYPE.as_str(), content_type)?);
    }
    if headers.is_empty() {
        return Ok(builder);
    }
    Ok(builder.headers(headers))
}

fn header_name(name: &str) -> Result<HeaderName, TransportError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| TransportError::InvalidHeader {
        name: name.to_owned(),
    })
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, TransportError> {
    HeaderValue::from_str(value).map_err(|_| TransportError::InvalidHeader {
        name: name.to_owned(),
    })
}

/// Builds a multipart form. Empty text fields are skipped; attachments without a
/// file name are named after their field.
fn multipart_form(payload: &Payload) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for (key, value) in payload.iter() {
        match value {
            PayloadValue::Text(text) if text.is_empty() => {}
            PayloadValue::Text(text) => {
                form = form.text(key.to_owned(), text.clone());
            }
            PayloadValue::Blob(blob) => {
                let file_name = blob.file_name.clone().unwrap_or_else(|| key.to_owned());
                let mut part = Part::bytes(blob.bytes.clone()).file_name(file_name);
                if let Some(content_type) = &blob.content_type {
                    part = part.mime_str(content_type)?;
                }
                form = form.part(key.to_owned(), part);
            }
        }
    }
    Ok(form)
}
