use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    log::default_logger, DefaultSleeper, FetchOptions, Logger, Method, Payload, Response, Result,
    Sleeper, TgBotError, Transport,
};

/// Marker in a failure message that identifies an oversized POST body.
pub const POST_SIZE_LIMIT_MARKER: &str = "Limit Exceeded: URLFetch POST Size";

/// Status recorded for an attempt that produced no response at all.
pub const NO_RESPONSE_STATUS: u16 = 9999;

/// Backoff decision hook invoked between failed attempts.
///
/// `response` is `None` when the transport failed before receiving anything.
/// Returning an error aborts the retry chain with that error.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait RetryHandler: Send + Sync {
    async fn handle_retry(&self, response: Option<&Response>) -> Result<()>;
}

/// Sleeps for a fixed duration regardless of the response.
#[derive(Clone)]
pub struct FixedDelay {
    delay: Duration,
    sleeper: Arc<dyn Sleeper>,
    logger: Arc<dyn Logger>,
}

impl FixedDelay {
    pub fn new(delay: Duration, sleeper: Arc<dyn Sleeper>, logger: Arc<dyn Logger>) -> Self {
        Self {
            delay,
            sleeper,
            logger,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl fmt::Debug for FixedDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedDelay")
            .field("delay", &self.delay)
            .finish()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RetryHandler for FixedDelay {
    async fn handle_retry(&self, _response: Option<&Response>) -> Result<()> {
        self.logger
            .info(&format!("Sleep for {} sec", self.delay.as_secs_f64()));
        self.sleeper.sleep(self.delay).await;
        Ok(())
    }
}

/// One retried call: target, request shape, remaining budget and an optional
/// backoff hook. Without a hook the client's [`FixedDelay`] is used.
pub struct RetryRequest<'a> {
    pub url: String,
    pub options: FetchOptions,
    pub retry: usize,
    pub handler: Option<&'a dyn RetryHandler>,
}

impl<'a> RetryRequest<'a> {
    pub fn new(url: impl Into<String>, options: FetchOptions) -> Self {
        Self {
            url: url.into(),
            options,
            retry: 0,
            handler: None,
        }
    }

    pub fn retry(mut self, retry: usize) -> Self {
        self.retry = retry;
        self
    }

    pub fn handler(mut self, handler: &'a dyn RetryHandler) -> Self {
        self.handler = Some(handler);
        self
    }
}

#[derive(Clone)]
/// Transport wrapper with status-driven retry.
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    logger: Arc<dyn Logger>,
    sleeper: Arc<dyn Sleeper>,
    default_retry: FixedDelay,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("retry_backoff", &self.default_retry.delay)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Creates a client that backs off `retry_backoff` between attempts unless a
    /// [`RetryHandler`] says otherwise.
    pub fn new(transport: impl Transport + 'static, retry_backoff: Duration) -> Self {
        Self::from_parts(
            Arc::new(transport),
            default_logger(false),
            Arc::new(DefaultSleeper),
            retry_backoff,
        )
    }

    pub fn from_parts(
        transport: Arc<dyn Transport>,
        logger: Arc<dyn Logger>,
        sleeper: Arc<dyn Sleeper>,
        retry_backoff: Duration,
    ) -> Self {
        let default_retry = FixedDelay::new(retry_backoff, sleeper.clone(), logger.clone());
        Self {
            transport,
            logger,
            sleeper,
            default_retry,
        }
    }

    pub fn with_logger(self, logger: Arc<dyn Logger>) -> Self {
        Self::from_parts(self.transport, logger, self.sleeper, self.default_retry.delay)
    }

    pub fn with_sleeper(self, sleeper: Arc<dyn Sleeper>) -> Self {
        Self::from_parts(self.transport, self.logger, sleeper, self.default_retry.delay)
    }

    pub fn with_retry_backoff(self, retry_backoff: Duration) -> Self {
        Self::from_parts(self.transport, self.logger, self.sleeper, retry_backoff)
    }

    pub fn retry_backoff(&self) -> Duration {
        self.default_retry.delay
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    pub fn sleeper(&self) -> &Arc<dyn Sleeper> {
        &self.sleeper
    }

    /// Performs a single request. Status codes are not interpreted here.
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Response> {
        self.logger.debug(&options.url_for(url));
        self.logger.debug(&describe(options));
        Ok(self.transport.fetch(url, options).await?)
    }

    /// Issues `request` until a status `< 400` comes back or a terminal
    /// condition is reached.
    ///
    /// Every attempt runs with HTTP exceptions muted. On failure:
    /// 1. a POST size overflow fails with [`TgBotError::PayloadTooLarge`];
    /// 2. status 429 fails with [`TgBotError::RateLimited`] carrying the response;
    /// 3. an exhausted budget fails with [`TgBotError::RetryExhausted`];
    /// 4. otherwise the budget is decremented, the handler runs, and the
    ///    request is issued again.
    pub async fn fetch_with_retry(&self, request: RetryRequest<'_>) -> Result<Response> {
        let RetryRequest {
            url,
            options,
            mut retry,
            handler,
        } = request;
        let options = options.mute_http_exceptions(true);
        let handler: &dyn RetryHandler = match handler {
            Some(handler) => handler,
            None => &self.default_retry,
        };

        loop {
            let (response, failure) = match self.fetch(&url, &options).await {
                Ok(response) => (Some(response), None),
                Err(err) => (None, Some(err.to_string())),
            };

            let response = match response {
                Some(response) if response.status() < 400 => return Ok(response),
                other => other,
            };
            let status = response
                .as_ref()
                .map_or(NO_RESPONSE_STATUS, Response::status);

            let message = failure
                .or_else(|| response.as_ref().map(Response::text))
                .unwrap_or_default();
            self.logger.info(&format!("fetch error: {message}"));

            if message.contains(POST_SIZE_LIMIT_MARKER) {
                return Err(TgBotError::PayloadTooLarge);
            }

            if let Some(response) = response.as_ref().filter(|_| status == 429) {
                return Err(TgBotError::RateLimited {
                    response: Box::new(response.clone()),
                });
            }

            if retry == 0 {
                let err = TgBotError::RetryExhausted { message };
                self.logger.info(&err.to_string());
                return Err(err);
            }

            retry -= 1;
            handler.handle_retry(response.as_ref()).await?;
        }
    }

    pub async fn get<I, K, V>(&self, url: &str, params: I) -> Result<Response>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let options = FetchOptions::new(Method::Get).with_params(params);
        self.fetch(url, &options).await
    }

    pub async fn post(&self, url: &str, body: impl Into<Payload>) -> Result<Response> {
        let options = FetchOptions::new(Method::Post).with_payload(body);
        self.fetch(url, &options).await
    }

    pub async fn put(&self, url: &str, body: impl Into<Payload>) -> Result<Response> {
        let options = FetchOptions::new(Method::Put).with_payload(body);
        self.fetch(url, &options).await
    }

    pub async fn patch(&self, url: &str, body: impl Into<Payload>) -> Result<Response> {
        let options = FetchOptions::new(Method::Patch).with_payload(body);
        self.fetch(url, &options).await
    }

    pub async fn delete(&self, url: &str) -> Result<Response> {
        let options = FetchOptions::new(Method::Delete);
        self.fetch(url, &options).await
    }
}

/// Compact one-line summary; attachments are reported by size only.
fn describe(options: &FetchOptions) -> String {
    let fields = options
        .payload
        .as_ref()
        .map(|payload| {
            payload
                .iter()
                .map(|(key, value)| match value {
                    crate::PayloadValue::Text(text) => format!("{key}={text}"),
                    crate::PayloadValue::Blob(blob) => {
                        format!("{key}=<{} bytes>", blob.bytes.len())
                    }
                })
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();
    format!(
        "{} follow_redirects={} mute_http_exceptions={} payload=[{fields}]",
        options.method, options.follow_redirects, options.mute_http_exceptions
    )
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    use async_trait::async_trait;

    use super::{HttpClient, RetryHandler, RetryRequest, NO_RESPONSE_STATUS};
    use crate::{
        testing::{RecordingSleeper, ScriptedTransport},
        FetchOptions, Method, NoopLogger, Response, Result, TgBotError, TransportError,
    };

    fn client(transport: &ScriptedTransport, sleeper: &RecordingSleeper) -> HttpClient {
        HttpClient::from_parts(
            Arc::new(transport.clone()),
            Arc::new(NoopLogger),
            Arc::new(sleeper.clone()),
            Duration::from_secs(2),
        )
    }

    fn post_options() -> FetchOptions {
        FetchOptions::new(Method::Post).with_payload([("text", "hi")])
    }

    #[tokio::test]
    async fn server_errors_consume_whole_budget_then_fail() {
        for budget in 0..4 {
            let transport = ScriptedTransport::always(Response::from_text(500, "boom"));
            let sleeper = RecordingSleeper::default();
            let http = client(&transport, &sleeper);

            let err = http
                .fetch_with_retry(RetryRequest::new("https://x/y", post_options()).retry(budget))
                .await
                .expect_err("must exhaust budget");

            assert!(matches!(err, TgBotError::RetryExhausted { ref message } if message == "boom"));
            assert_eq!(transport.hits(), budget + 1);
            assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(2); budget]);
        }
    }

    #[tokio::test]
    async fn success_returns_first_response_without_backoff() {
        let transport = ScriptedTransport::always(Response::from_text(302, "moved"));
        let sleeper = RecordingSleeper::default();
        let http = client(&transport, &sleeper);

        let response = http
            .fetch_with_retry(RetryRequest::new("https://x/y", post_options()).retry(5))
            .await
            .expect("status below 400 is success");

        assert_eq!(response.status(), 302);
        assert_eq!(transport.hits(), 1);
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn every_attempt_mutes_http_exceptions() {
        let transport = ScriptedTransport::new(vec![
            Ok(Response::from_text(502, "bad gateway")),
            Ok(Response::from_text(200, "ok")),
        ]);
        let sleeper = RecordingSleeper::default();
        let http = client(&transport, &sleeper);

        http.fetch_with_retry(RetryRequest::new("https://x/y", post_options()).retry(1))
            .await
            .expect("second attempt succeeds");

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|(_, options)| options.mute_http_exceptions));
        assert!(requests.iter().all(|(url, _)| url == "https://x/y"));
    }

    #[tokio::test]
    async fn post_size_overflow_is_fatal_on_first_attempt() {
        let transport = ScriptedTransport::always(Response::from_text(
            413,
            "Exception: Limit Exceeded: URLFetch POST Size.",
        ));
        let sleeper = RecordingSleeper::default();
        let http = client(&transport, &sleeper);

        let err = http
            .fetch_with_retry(RetryRequest::new("https://x/y", post_options()).retry(3))
            .await
            .expect_err("must fail");

        assert!(matches!(err, TgBotError::PayloadTooLarge));
        assert!(err.is_fatal());
        assert_eq!(transport.hits(), 1);
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_message_takes_precedence() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Other(
            "Limit Exceeded: URLFetch POST Size.".to_owned(),
        ))]);
        let sleeper = RecordingSleeper::default();
        let http = client(&transport, &sleeper);

        let err = http
            .fetch_with_retry(RetryRequest::new("https://x/y", post_options()).retry(3))
            .await
            .expect_err("must fail");

        assert!(matches!(err, TgBotError::PayloadTooLarge));
    }

    #[tokio::test]
    async fn rate_limit_surfaces_immediately_with_response() {
        let body = r#"{"ok":false,"error_code":429,"parameters":{"retry_after":7}}"#;
        let transport = ScriptedTransport::always(Response::from_text(429, body));
        let sleeper = RecordingSleeper::default();
        let http = client(&transport, &sleeper);

        let err = http
            .fetch_with_retry(RetryRequest::new("https://x/y", post_options()).retry(3))
            .await
            .expect_err("must fail");

        match &err {
            TgBotError::RateLimited { response } => assert_eq!(response.text(), body),
            other => panic!("expected rate limited error, got {other:?}"),
        }
        assert_eq!(err.retry_after(), Some(7));
        assert_eq!(transport.hits(), 1);
    }

    #[tokio::test]
    async fn unreachable_host_is_retried_then_reports_message() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Other("Address unavailable".to_owned())),
            Err(TransportError::Other("Address unavailable".to_owned())),
        ]);
        let sleeper = RecordingSleeper::default();
        let http = client(&transport, &sleeper);

        let err = http
            .fetch_with_retry(RetryRequest::new("https://x/y", post_options()).retry(1))
            .await
            .expect_err("must fail");

        assert_eq!(
            err.to_string(),
            "fetch error after retry: transport error: Address unavailable"
        );
        assert_eq!(transport.hits(), 2);
    }

    struct CountingHandler {
        calls: AtomicUsize,
        seen: std::sync::Mutex<Vec<u16>>,
    }

    #[async_trait]
    impl RetryHandler for CountingHandler {
        async fn handle_retry(&self, response: Option<&Response>) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .expect("seen lock")
                .push(response.map_or(NO_RESPONSE_STATUS, Response::status));
            Ok(())
        }
    }

    #[tokio::test]
    async fn custom_handler_replaces_default_backoff() {
        let transport = ScriptedTransport::new(vec![
            Ok(Response::from_text(500, "a")),
            Err(TransportError::Other("down".to_owned())),
            Ok(Response::from_text(200, "ok")),
        ]);
        let sleeper = RecordingSleeper::default();
        let http = client(&transport, &sleeper);
        let handler = CountingHandler {
            calls: AtomicUsize::new(0),
            seen: Default::default(),
        };

        let response = http
            .fetch_with_retry(
                RetryRequest::new("https://x/y", post_options())
                    .retry(5)
                    .handler(&handler),
            )
            .await
            .expect("third attempt succeeds");

        assert_eq!(response.text(), "ok");
        assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            *handler.seen.lock().expect("seen lock"),
            vec![500, NO_RESPONSE_STATUS]
        );
        assert!(sleeper.sleeps().is_empty());
    }

    struct FailingHandler;

    #[async_trait]
    impl RetryHandler for FailingHandler {
        async fn handle_retry(&self, _response: Option<&Response>) -> Result<()> {
            Err(TgBotError::FileTooLarge {
                description: "file is too big".to_owned(),
            })
        }
    }

    #[tokio::test]
    async fn handler_error_stops_the_chain() {
        let transport = ScriptedTransport::always(Response::from_text(400, "bad"));
        let sleeper = RecordingSleeper::default();
        let http = client(&transport, &sleeper);

        let err = http
            .fetch_with_retry(
                RetryRequest::new("https://x/y", post_options())
                    .retry(5)
                    .handler(&FailingHandler),
            )
            .await
            .expect_err("handler error propagates");

        assert!(matches!(err, TgBotError::FileTooLarge { .. }));
        assert_eq!(transport.hits(), 1);
    }

    #[tokio::test]
    async fn convenience_methods_shape_requests_without_retry() {
        let transport = ScriptedTransport::always(Response::from_text(500, "boom"));
        let sleeper = RecordingSleeper::default();
        let http = client(&transport, &sleeper);

        let response = http
            .get("https://x/y?z=1", [("a", "1")])
            .await
            .expect("fetch returns response as-is");
        assert_eq!(response.status(), 500);

        http.post("https://x/y", [("k", "v")]).await.expect("post");
        http.put("https://x/y", [("k", "v")]).await.expect("put");
        http.patch("https://x/y", [("k", "v")]).await.expect("patch");
        http.delete("https://x/y").await.expect("delete");

        let methods: Vec<Method> = transport
            .requests()
            .into_iter()
            .map(|(_, options)| options.method)
            .collect();
        assert_eq!(
            methods,
            vec![Method::Get, Method::Post, Method::Put, Method::Patch, Method::Delete]
        );
        assert_eq!(
            transport.requests()[0].1.url_for("https://x/y?z=1"),
            "https://x/y?z=1&a=1"
        );
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn identical_successful_calls_yield_identical_responses() {
        let transport = ScriptedTransport::always(Response::from_text(200, "{\"ok\":true}"));
        let sleeper = RecordingSleeper::default();
        let http = client(&transport, &sleeper);

        let first = http
            .fetch_with_retry(RetryRequest::new("https://x/y", post_options()))
            .await
            .expect("first");
        let second = http
            .fetch_with_retry(RetryRequest::new("https://x/y", post_options()))
            .await
            .expect("second");
        assert_eq!(first, second);
    }
}
