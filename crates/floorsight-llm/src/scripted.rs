//! In-memory model for development and testing.
//!
//! Replies are served in order from a script and every request is recorded.

use async_trait::async_trait;
use floorsight_core::error::{FloorsightError, Result};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::ports::{GenerationRequest, MultimodalModel};

#[derive(Debug, Clone)]
enum ScriptedReply {
    Text(String),
    Failure(String),
}

/// Model that answers from a fixed script
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ScriptedReply>>,
    calls: Mutex<Vec<GenerationRequest>>,
    delay: Option<Duration>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful text reply
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(ScriptedReply::Text(text.into()));
        self
    }

    /// Queue a failed call
    pub fn with_failure(self, reason: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(ScriptedReply::Failure(reason.into()));
        self
    }

    /// Wait this long before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far, in order
    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl MultimodalModel for ScriptedModel {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.calls.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Failure(reason)) => Err(FloorsightError::RemoteInference {
                stage: request.stage,
                reason,
            }),
            None => Err(FloorsightError::RemoteInference {
                stage: request.stage,
                reason: "script exhausted".to_string(),
            }),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
