//! Transport that replays canned replies.

use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;

use super::transport::{GenerationRequest, RequestKind, Transport};
use crate::error::{CoachError, Result};

/// Replays queued replies in order and records every request it receives.
///
/// Drives tests and offline sessions. When the queue runs dry the transport
/// falls back to a fixed reply per request kind, or fails with a transport
/// error if it was built with [`ScriptedTransport::strict`].
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    strict: bool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails once the queue is empty instead of answering with defaults.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// Queues a raw reply.
    pub fn push_reply(&self, raw: impl Into<String>) -> &Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(raw.into()));
        self
    }

    /// Queues a failure.
    pub fn push_error(&self, error: CoachError) -> &Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn pending_replies(&self) -> usize {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn fallback(kind: RequestKind, instruction: &str) -> String {
        match kind {
            RequestKind::TitleGeneration => {
                let title: String = instruction
                    .lines()
                    .find_map(|line| line.strip_prefix("Description: "))
                    .unwrap_or("New goal")
                    .split_whitespace()
                    .take(5)
                    .collect::<Vec<_>>()
                    .join(" ");
                serde_json::json!({ "title": title }).to_string()
            }
            RequestKind::ContextGathering => {
                r#"{"status": "ok", "question": "", "context": ""}"#.to_string()
            }
            RequestKind::StepGeneration => {
                r#"{"status": "ok", "step": "Spend ten minutes writing down what done looks like for this goal."}"#
                    .to_string()
            }
            RequestKind::StepRephrase => {
                r#"{"status": "ok", "step": "Spend five minutes on the smallest part of the current step."}"#
                    .to_string()
            }
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn complete(&self, request: &GenerationRequest) -> Result<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let next = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match next {
            Some(reply) => reply,
            None if self.strict => Err(CoachError::Transport {
                message: format!("no scripted reply left for {}", request.kind.as_str()),
            }),
            None => Ok(Self::fallback(request.kind, &request.instruction)),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
