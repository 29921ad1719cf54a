//! In-memory doubles shared by unit tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;

use crate::{FetchOptions, Response, Sleeper, Transport, TransportError};

/// Replays queued outcomes and records every request it receives.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    outcomes: Arc<Mutex<VecDeque<Result<Response, TransportError>>>>,
    /// Replayed once the queue is empty.
    fallback: Option<Response>,
    requests: Arc<Mutex<Vec<(String, FetchOptions)>>>,
}

impl ScriptedTransport {
    pub(crate) fn new(outcomes: Vec<Result<Response, TransportError>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into())),
            ..Self::default()
        }
    }

    pub(crate) fn always(response: Response) -> Self {
        Self {
            fallback: Some(response),
            ..Self::default()
        }
    }

    pub(crate) fn hits(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    pub(crate) fn requests(&self) -> Vec<(String, FetchOptions)> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Response, TransportError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push((url.to_owned(), options.clone()));
        let next = self.outcomes.lock().expect("outcomes lock").pop_front();
        match (next, &self.fallback) {
            (Some(outcome), _) => outcome,
            (None, Some(response)) => Ok(response.clone()),
            (None, None) => Err(TransportError::Other("no scripted outcome".to_owned())),
        }
    }
}

/// Records requested durations instead of waiting.
#[derive(Clone, Default)]
pub(crate) struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().expect("sleeps lock").clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().expect("sleeps lock").push(duration);
    }
}

pub(crate) fn json_response(status: u16, body: serde_json::Value) -> Response {
    Response::from_text(status, body.to_string()).with_header("content-type", "application/json")
}
