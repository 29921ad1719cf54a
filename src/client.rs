use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    encode::EndpointInput,
    input::{
        PinChatMessage, SendAnimation, SendAudio, SendMediaGroup, SendMessage, SendPhoto,
        SendVideo,
    },
    log::default_logger,
    ApiResponse, BotOptions, DefaultSleeper, FetchOptions, FormTransport, HttpClient, Logger,
    Method, MultipartTransport, Recipient, Response, Result, RetryHandler, RetryRequest, Sleeper,
    TgBotError, Transport,
};

/// Lower-cased fragments of 400 descriptions meaning the API could not fetch a
/// remotely hosted media URL.
const MEDIA_URL_ERRORS: &[&str] = &[
    "failed to get http url content",
    "wrong file identifier/http url specified",
    "group send failed",
    "wrong type of the web page content",
    "wrong remote file identifier specified",
    "webpage_curl_failed",
    "webpage_media_empty",
];

/// Lower-cased fragments of 400 descriptions meaning an attachment is too big.
const FILE_TOO_LARGE_ERRORS: &[&str] = &[
    "request entity too large",
    "file is too big",
    "file too large",
    "too big for a photo",
];

/// Builds the method URL: `<api_base>/bot<token>/<endpoint>`.
///
/// Example: `("https://api.telegram.org", "123:abc", "sendMessage")` →
/// `"https://api.telegram.org/bot123:abc/sendMessage"`
pub fn api_url(api_base: &str, token: &str, endpoint: &str) -> String {
    format!("{}/bot{}/{}", api_base.trim_end_matches('/'), token.trim(), endpoint)
}

/// Maps a 400 description to a non-retryable error, if it names one.
pub fn classify_bad_request(description: &str) -> Option<TgBotError> {
    let lowered = description.to_lowercase();
    if MEDIA_URL_ERRORS.iter().any(|needle| lowered.contains(needle)) {
        return Some(TgBotError::SendMediaByUrl {
            description: description.to_owned(),
        });
    }
    if FILE_TOO_LARGE_ERRORS
        .iter()
        .any(|needle| lowered.contains(needle))
    {
        return Some(TgBotError::FileTooLarge {
            description: description.to_owned(),
        });
    }
    None
}

/// Backoff hook that understands the Bot API error envelope.
///
/// - 429: sleeps for `parameters.retry_after` instead of the fixed backoff.
/// - 400: stops with [`TgBotError::SendMediaByUrl`] or
///   [`TgBotError::FileTooLarge`] when the description says waiting cannot help.
/// - anything else: sleeps for the fixed backoff.
#[derive(Clone)]
pub struct ApiRetryHandler {
    backoff: Duration,
    sleeper: Arc<dyn Sleeper>,
    logger: Arc<dyn Logger>,
}

impl ApiRetryHandler {
    pub fn new(backoff: Duration, sleeper: Arc<dyn Sleeper>, logger: Arc<dyn Logger>) -> Self {
        Self {
            backoff,
            sleeper,
            logger,
        }
    }
}

impl fmt::Debug for ApiRetryHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRetryHandler")
            .field("backoff", &self.backoff)
            .finish()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RetryHandler for ApiRetryHandler {
    async fn handle_retry(&self, response: Option<&Response>) -> Result<()> {
        let mut delay = self.backoff;

        if let Some(response) = response {
            let envelope = ApiResponse::parse(&response.text());
            match response.status() {
                429 => {
                    if let Some(seconds) = envelope.as_ref().and_then(ApiResponse::retry_after) {
                        delay = Duration::from_secs(seconds);
                    }
                }
                400 => {
                    let fatal = envelope
                        .as_ref()
                        .and_then(|envelope| envelope.description.as_deref())
                        .and_then(classify_bad_request);
                    if let Some(err) = fatal {
                        self.logger.info(&err.to_string());
                        return Err(err);
                    }
                }
                _ => {}
            }
        }

        self.logger
            .info(&format!("Sleep for {} sec", delay.as_secs_f64()));
        self.sleeper.sleep(delay).await;
        Ok(())
    }
}

/// Backend used by [`TelegramBot::from_options`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    /// Form-urlencoded bodies, multipart only for uploads.
    #[default]
    Form,
    /// Multipart bodies for every request.
    Multipart,
}

#[derive(Clone)]
/// Telegram Bot API client with inner retry and outer rate-limit recovery.
pub struct TelegramBot {
    http: HttpClient,
    options: BotOptions,
}

impl fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramBot")
            .field("http", &self.http)
            .field("options", &self.options)
            .finish()
    }
}

impl TelegramBot {
    /// Creates a bot client over an existing [`HttpClient`] with default options.
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            options: BotOptions::default(),
        }
    }

    /// Creates a bot client on one of the bundled transports.
    ///
    /// The logger is a `TracingLogger` honoring `options.debug` (a no-op logger
    /// without the `tracing` feature), and backoff sleeps use [`DefaultSleeper`].
    pub fn from_options(backend: Backend, options: BotOptions) -> Result<Self> {
        let transport: Arc<dyn Transport> = match backend {
            Backend::Form => Arc::new(FormTransport::new()?),
            Backend::Multipart => Arc::new(MultipartTransport::new()?),
        };

        let http = HttpClient::from_parts(
            transport,
            default_logger(options.debug),
            Arc::new(DefaultSleeper),
            Duration::from_millis(options.retry_backoff_ms),
        );
        Ok(Self { http, options })
    }

    /// Replaces the options.
    ///
    /// Budgets, backoff, `timeout_ms` and `api_base` apply to the next call. A
    /// changed `debug` flag swaps in the default logger for that level.
    pub fn with_options(mut self, opts: BotOptions) -> Self {
        if opts.debug != self.options.debug {
            self.http = self.http.with_logger(default_logger(opts.debug));
        }
        self.http = self
            .http
            .with_retry_backoff(Duration::from_millis(opts.retry_backoff_ms));
        self.options = opts;
        self
    }

    pub fn options(&self) -> &BotOptions {
        &self.options
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn api_url(&self, token: &str, endpoint: &str) -> String {
        api_url(&self.options.api_base, token, endpoint)
    }

    /// Sends a text message. `parse_mode` defaults to `HTML`.
    pub async fn send_message(
        &self,
        recipient: &Recipient,
        input: SendMessage,
    ) -> Result<Option<ApiResponse>> {
        self.call(recipient, input).await
    }

    pub async fn send_photo(
        &self,
        recipient: &Recipient,
        input: SendPhoto,
    ) -> Result<Option<ApiResponse>> {
        self.call(recipient, input).await
    }

    pub async fn send_audio(
        &self,
        recipient: &Recipient,
        input: SendAudio,
    ) -> Result<Option<ApiResponse>> {
        self.call(recipient, input).await
    }

    pub async fn send_video(
        &self,
        recipient: &Recipient,
        input: SendVideo,
    ) -> Result<Option<ApiResponse>> {
        self.call(recipient, input).await
    }

    pub async fn send_animation(
        &self,
        recipient: &Recipient,
        input: SendAnimation,
    ) -> Result<Option<ApiResponse>> {
        self.call(recipient, input).await
    }

    /// Sends an album. The `media` list is JSON-encoded into one field.
    pub async fn send_media_group(
        &self,
        recipient: &Recipient,
        input: SendMediaGroup,
    ) -> Result<Option<ApiResponse>> {
        self.call(recipient, input).await
    }

    pub async fn pin_chat_message(
        &self,
        recipient: &Recipient,
        input: PinChatMessage,
    ) -> Result<Option<ApiResponse>> {
        self.call(recipient, input).await
    }

    /// Pins every message of a successful send when the recipient asks for it.
    ///
    /// Returns one envelope per pin request; empty when nothing was pinned.
    pub async fn pin_sent(
        &self,
        recipient: &Recipient,
        sent: &ApiResponse,
    ) -> Result<Vec<Option<ApiResponse>>> {
        if !recipient.pin_all_message || !sent.ok {
            return Ok(Vec::new());
        }

        let mut pinned = Vec::new();
        for message in sent.messages() {
            let input = PinChatMessage::new(message.message_id);
            pinned.push(self.pin_chat_message(recipient, input).await?);
        }
        Ok(pinned)
    }

    async fn call<I: EndpointInput>(
        &self,
        recipient: &Recipient,
        input: I,
    ) -> Result<Option<ApiResponse>> {
        let payload = input.into_payload(recipient)?;
        let mut options = FetchOptions::new(Method::Post).with_payload(payload);
        if let Some(timeout_ms) = self.options.timeout_ms {
            options = options.with_timeout(Duration::from_millis(timeout_ms));
        }
        self.fetch(recipient, I::ENDPOINT, options).await
    }

    /// Runs one logical API call.
    ///
    /// The inner loop (`max_retries`) lives in [`HttpClient::fetch_with_retry`].
    /// A [`TgBotError::RateLimited`] escaping it restarts the whole call after
    /// the server's `retry_after`, up to `max_rate_limit_retries` times.
    async fn fetch(
        &self,
        recipient: &Recipient,
        endpoint: &str,
        options: FetchOptions,
    ) -> Result<Option<ApiResponse>> {
        let url = self.api_url(&recipient.bot.token, endpoint);
        let handler = self.retry_handler();
        let mut rate_limit_retry = self.options.max_rate_limit_retries;

        loop {
            let request = RetryRequest::new(url.clone(), options.clone())
                .retry(self.options.max_retries)
                .handler(&handler);

            match self.http.fetch_with_retry(request).await {
                Ok(response) => return Ok(ApiResponse::parse(&response.text())),
                Err(TgBotError::RateLimited { response }) if rate_limit_retry > 0 => {
                    rate_limit_retry -= 1;
                    let delay = self.rate_limit_delay(&response);
                    self.http.logger().info(&format!(
                        "{endpoint} rate limited, sleep for {} sec ({rate_limit_retry} retries left)",
                        delay.as_secs_f64()
                    ));
                    self.http.sleeper().sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// `parameters.retry_after` of a 429 body, else the fixed backoff.
    fn rate_limit_delay(&self, response: &Response) -> Duration {
        ApiResponse::parse(&response.text())
            .and_then(|envelope| envelope.retry_after())
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.retry_backoff())
    }

    fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.options.retry_backoff_ms)
    }

    fn retry_handler(&self) -> ApiRetryHandler {
        ApiRetryHandler::new(
            self.retry_backoff(),
            self.http.sleeper().clone(),
            self.http.logger().clone(),
        )
    }
}
