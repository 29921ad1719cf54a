use std::time::Duration;

use async_trait::async_trait;

use super::{multipart_form, Clients, Transport};
use crate::{FetchOptions, Response, TransportError};

/// Backend that encodes every payload as `multipart/form-data`.
#[derive(Clone, Debug)]
pub struct MultipartTransport {
    clients: Clients,
}

impl MultipartTransport {
    pub fn new() -> Result<Self, TransportError> {
        Ok(Self {
            clients: Clients::new()?,
        })
    }

    /// Bounds every attempt. Without it an attempt may wait indefinitely.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.clients.timeout = Some(timeout);
        self
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Transport for MultipartTransport {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Response, TransportError> {
        let mut builder = self.clients.request(url, options)?;
        if let Some(payload) = &options.payload {
            builder = builder.multipart(multipart_form(payload)?);
        }
        self.clients.send(builder, options).await
    }
}
