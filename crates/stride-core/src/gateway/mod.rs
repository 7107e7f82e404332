//! Generation gateway: structured requests in, validated outcomes out.
//!
//! The gateway renders a prompt for each request, hands it to a
//! [`Transport`] under a fixed timeout, and turns the raw reply into one of a
//! closed set of outcomes. Nothing outside this module sees provider wire
//! formats or raw reply text.
//!
//! | Request          | Outcomes                                               |
//! |------------------|--------------------------------------------------------|
//! | generate step    | step, near completion, need clarification, completed  |
//! | rephrase step    | new step text                                          |
//! | gather context   | ready, need context                                    |
//! | derive title     | title                                                  |

use std::{sync::Arc, time::Duration};

use log::debug;

use crate::{
    error::{CoachError, Result},
    models::{Goal, Step},
};

pub mod contracts;
pub mod extract;
pub mod openai;
pub mod prompts;
pub mod scripted;
pub mod transport;

use contracts::{
    decode, ContextReply, ContextStatus, Contract, RephraseReply, StepReply, StepStatus,
    TitleReply,
};
pub use extract::{extract_first_balanced_object, parse_reply};
pub use openai::OpenAiTransport;
pub use prompts::PromptTemplates;
pub use scripted::ScriptedTransport;
pub use transport::{GenerationRequest, RequestKind, Transport};

/// Default bound on a single generation call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed instruction used when the user asks for a simpler step.
pub const SIMPLIFY_INSTRUCTION: &str = "Make this step as simple as possible: something that takes between five minutes and one day at most. Break it down into the simplest possible task.";

/// Result of asking for the next step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A new step
    Step(String),
    /// A new step that may be the last one
    NearCompletion(String),
    /// The service needs an answer before it can suggest a step
    NeedClarification(String),
    /// The goal is reached; carries the reason
    GoalCompleted(String),
}

/// Result of asking whether enough is known about the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextOutcome {
    /// Enough is known; may carry a summary of it
    Ready { summary: Option<String> },
    /// Ask the user this question next
    NeedContext(String),
}

/// Sends domain requests to a [`Transport`] and validates the replies.
#[derive(Clone)]
pub struct GenerationGateway {
    transport: Arc<dyn Transport>,
    prompts: Arc<PromptTemplates>,
    timeout: Duration,
}

impl GenerationGateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            prompts: Arc::new(PromptTemplates::builtin()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_prompts(mut self, prompts: PromptTemplates) -> Self {
        self.prompts = Arc::new(prompts);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Asks for the next step of `goal` given its completed steps.
    pub async fn generate_step(&self, goal: &Goal, completed: &[Step]) -> Result<StepOutcome> {
        let kind = RequestKind::StepGeneration;
        let instruction = self.prompts.step_generation(goal, completed)?;
        let reply: StepReply = self.call(kind, instruction).await?;
        let operation = kind.as_str();

        let outcome = match reply.status {
            StepStatus::Ok => StepOutcome::Step(required(operation, "step", reply.step)?),
            StepStatus::NearCompletion => {
                StepOutcome::NearCompletion(required(operation, "step", reply.step)?)
            }
            StepStatus::NeedClarification => {
                StepOutcome::NeedClarification(required(operation, "question", reply.question)?)
            }
            StepStatus::GoalCompleted => {
                StepOutcome::GoalCompleted(reply.completion_reason.trim().to_string())
            }
        };
        Ok(outcome)
    }

    /// Asks for a new wording of `step` that answers `feedback`.
    pub async fn rephrase_step(&self, goal: &Goal, step: &Step, feedback: &str) -> Result<String> {
        let kind = RequestKind::StepRephrase;
        let instruction = self.prompts.step_rephrase(goal, step, feedback)?;
        let reply: RephraseReply = self.call(kind, instruction).await?;
        required(kind.as_str(), "step", reply.step)
    }

    /// Asks whether more needs to be known before the first step.
    pub async fn gather_context(&self, goal: &Goal) -> Result<ContextOutcome> {
        let kind = RequestKind::ContextGathering;
        let instruction = self.prompts.context_gathering(goal)?;
        let reply: ContextReply = self.call(kind, instruction).await?;

        let outcome = match reply.status {
            ContextStatus::Ok => {
                let summary = reply.context.trim();
                ContextOutcome::Ready {
                    summary: (!summary.is_empty()).then(|| summary.to_string()),
                }
            }
            ContextStatus::NeedContext => {
                ContextOutcome::NeedContext(required(kind.as_str(), "question", reply.question)?)
            }
        };
        Ok(outcome)
    }

    /// Asks for a short title for a goal description.
    pub async fn derive_title(&self, description: &str) -> Result<String> {
        let kind = RequestKind::TitleGeneration;
        let instruction = self.prompts.title_generation(description)?;
        let reply: TitleReply = self.call(kind, instruction).await?;
        let title = required(kind.as_str(), "title", reply.title)?;
        Ok(title.trim_matches(|c| c == '"' || c == '\'').trim().to_string())
    }

    async fn call<T: Contract>(&self, kind: RequestKind, instruction: String) -> Result<T> {
        let operation = kind.as_str();
        let request = GenerationRequest {
            kind,
            instruction,
            schema: T::schema(),
        };

        debug!(
            "{operation} via {}: prompt of {} chars",
            self.transport.name(),
            request.instruction.chars().count()
        );

        let raw = tokio::time::timeout(self.timeout, self.transport.complete(&request))
            .await
            .map_err(|_| CoachError::Timeout {
                operation,
                seconds: self.timeout.as_secs(),
            })??;

        debug!("{operation} raw reply: {raw}");
        decode(operation, parse_reply(operation, &raw)?)
    }
}

/// Trims `value` and fails with a parse error when nothing is left.
fn required(operation: &'static str, field: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoachError::ParseFailure {
            operation,
            reason: format!("reply has an empty '{field}' field"),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    fn gateway_with(replies: &[&str]) -> (Arc<ScriptedTransport>, GenerationGateway) {
        let transport = Arc::new(ScriptedTransport::strict());
        for reply in replies {
            transport.push_reply(*reply);
        }
        let gateway = GenerationGateway::new(transport.clone());
        (transport, gateway)
    }

    struct SlowTransport;

    #[async_trait]
    impl Transport for SlowTransport {
        async fn complete(&self, _request: &GenerationRequest) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("{}".to_string())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_generate_step_outcomes() {
        let goal = Goal::new("u1", "Swim", "Swim 50 meters");
        let (transport, gateway) = gateway_with(&[
            r#"{"status": "ok", "step": " Find a pool "}"#,
            r#"{"status": "near_completion", "step": "Swim 50 meters"}"#,
            r#"{"status": "need_clarification", "question": "Can you float?"}"#,
            r#"{"status": "goal_completed", "completion_reason": "You swam 50 meters"}"#,
        ]);

        assert_eq!(
            gateway.generate_step(&goal, &[]).await.unwrap(),
            StepOutcome::Step("Find a pool".to_string())
        );
        assert_eq!(
            gateway.generate_step(&goal, &[]).await.unwrap(),
            StepOutcome::NearCompletion("Swim 50 meters".to_string())
        );
        assert_eq!(
            gateway.generate_step(&goal, &[]).await.unwrap(),
            StepOutcome::NeedClarification("Can you float?".to_string())
        );
        assert_eq!(
            gateway.generate_step(&goal, &[]).await.unwrap(),
            StepOutcome::GoalCompleted("You swam 50 meters".to_string())
        );

        let requests = transport.requests();
        assert_eq!(requests.len(), 4);
        assert!(requests
            .iter()
            .all(|r| r.kind == RequestKind::StepGeneration));
        assert!(requests[0].schema.to_string().contains("goal_completed"));
    }

    #[tokio::test]
    async fn test_ok_step_with_empty_text_is_parse_failure() {
        let goal = Goal::new("u1", "Swim", "Swim");
        let (_transport, gateway) = gateway_with(&[r#"{"status": "ok", "step": "  "}"#]);
        assert!(matches!(
            gateway.generate_step(&goal, &[]).await,
            Err(CoachError::ParseFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_gather_context_outcomes() {
        let goal = Goal::new("u1", "Swim", "Swim");
        let (_transport, gateway) = gateway_with(&[
            r#"{"status": "need_context", "question": "What is your current swimming level?"}"#,
            r#"{"status": "ok", "question": "", "context": "Beginner, pool nearby"}"#,
            r#"{"status": "ok"}"#,
        ]);

        assert_eq!(
            gateway.gather_context(&goal).await.unwrap(),
            ContextOutcome::NeedContext("What is your current swimming level?".to_string())
        );
        assert_eq!(
            gateway.gather_context(&goal).await.unwrap(),
            ContextOutcome::Ready {
                summary: Some("Beginner, pool nearby".to_string())
            }
        );
        assert_eq!(
            gateway.gather_context(&goal).await.unwrap(),
            ContextOutcome::Ready { summary: None }
        );
    }

    #[tokio::test]
    async fn test_derive_title_strips_quotes_and_uses_fallback_parse() {
        let (_transport, gateway) =
            gateway_with(&["Title:\n```json\n{\"title\": \"\\\"Learn to swim\\\"\"}\n```"]);
        assert_eq!(
            gateway.derive_title("I want to swim").await.unwrap(),
            "Learn to swim"
        );
    }

    #[tokio::test]
    async fn test_rephrase_rejects_wrong_status() {
        let goal = Goal::new("u1", "Swim", "Swim");
        let step = Step::new(&goal.id, "Swim a mile");
        let (_transport, gateway) =
            gateway_with(&[r#"{"status": "goal_completed", "step": "x"}"#]);
        assert!(matches!(
            gateway.rephrase_step(&goal, &step, "too hard").await,
            Err(CoachError::UnexpectedStatus { .. })
        ));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let (transport, gateway) = gateway_with(&[]);
        transport.push_error(CoachError::Transport {
            message: "connection refused".to_string(),
        });
        assert!(matches!(
            gateway.derive_title("anything").await,
            Err(CoachError::Transport { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_transport_times_out() {
        let gateway =
            GenerationGateway::new(Arc::new(SlowTransport)).with_timeout(Duration::from_secs(30));
        let err = gateway.derive_title("anything").await.unwrap_err();
        assert!(matches!(
            err,
            CoachError::Timeout {
                seconds: 30,
                operation: "derive title"
            }
        ));
        assert!(err.is_retryable());
    }
}
