use std::sync::Arc;

/// Diagnostic sink used by the retry engine. Never load-bearing for control flow.
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
}

/// Forwards to `tracing`. Available with the `tracing` feature.
///
/// With `debug` enabled, debug output is promoted to the info level so it shows
/// up under a default subscriber filter.
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger {
    debug: bool,
}

#[cfg(feature = "tracing")]
impl TracingLogger {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

#[cfg(feature = "tracing")]
impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        if self.debug {
            tracing::info!(target: "tgbot_http", "{message}");
        } else {
            tracing::debug!(target: "tgbot_http", "{message}");
        }
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "tgbot_http", "{message}");
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _message: &str) {}

    fn info(&self, _message: &str) {}
}

/// Logger used by the bundled constructors: `TracingLogger` when the
/// `tracing` feature is on, [`NoopLogger`] otherwise.
#[cfg(feature = "tracing")]
pub(crate) fn default_logger(debug: bool) -> Arc<dyn Logger> {
    Arc::new(TracingLogger::new(debug))
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn default_logger(_debug: bool) -> Arc<dyn Logger> {
    Arc::new(NoopLogger)
}
