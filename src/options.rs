/// Configures retry budgets, backoff and logging of a [`TelegramBot`](crate::TelegramBot).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BotOptions {
    /// Retries after the initial attempt for ordinary failures (inner loop).
    pub max_retries: usize,
    /// Extra whole-call attempts after a rate-limit error (outer loop).
    pub max_rate_limit_retries: usize,
    /// Fixed backoff between inner retries, in milliseconds.
    pub retry_backoff_ms: u64,
    /// Promotes debug logging to the info level.
    pub debug: bool,
    /// Scheme and host of the Bot API.
    pub api_base: String,
    /// Optional per-attempt transport timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl Default for BotOptions {
    fn default() -> Self {
        Self {
            max_retries: 0,
            max_rate_limit_retries: 3,
            retry_backoff_ms: 1_000,
            debug: false,
            api_base: "https://api.telegram.org".to_owned(),
            timeout_ms: None,
        }
    }
}
