//! Scripted in-memory transport for unit tests.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::DiscoverError;
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Transport whose responses are queued per path ahead of time. Calls
/// for a path consume its queue in order; an unscripted call panics so
/// a test never silently swallows an unexpected request.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<HashMap<String, VecDeque<Result<Value, DiscoverError>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, path: &str, payload: Value) {
        self.script
            .lock()
            .entry(path.to_string())
            .or_default()
            .push_back(Ok(payload));
    }

    pub fn push_err(&self, path: &str, err: DiscoverError) {
        self.script
            .lock()
            .entry(path.to_string())
            .or_default()
            .push_back(Err(err));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.path == path).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(
        &self,
        path: &str,
        params: &[(String, String)],
        token: &CancellationToken,
    ) -> Result<Value, DiscoverError> {
        self.calls.lock().push(RecordedCall {
            path: path.to_string(),
            params: params.to_vec(),
        });
        if token.is_cancelled() {
            return Err(DiscoverError::Cancelled);
        }
        self.script
            .lock()
            .get_mut(path)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| panic!("no scripted response for {path}"))
    }
}
