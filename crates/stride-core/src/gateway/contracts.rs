//! Reply contracts the generation service must satisfy.
//!
//! Each contract derives [`JsonSchema`] so the expected shape travels with
//! the request. Status fields are checked by hand before the rest of the
//! reply is decoded: an unknown status is [`CoachError::UnexpectedStatus`],
//! not a parse failure.

use schemars::{schema_for, JsonSchema};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::error::{CoachError, Result};

/// Status of a step generation reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    NeedClarification,
    GoalCompleted,
    NearCompletion,
}

/// Reply to a step generation request.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StepReply {
    pub status: StepStatus,
    /// Text of the next step
    #[serde(default)]
    pub step: String,
    /// Clarifying question, when one is needed
    #[serde(default)]
    pub question: String,
    /// Why the goal counts as reached
    #[serde(default)]
    pub completion_reason: String,
}

/// Status of a rephrase reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RephraseStatus {
    Ok,
}

/// Reply to a rephrase or simplify request.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RephraseReply {
    pub status: RephraseStatus,
    /// New text of the step
    #[serde(default)]
    pub step: String,
}

/// Status of a context gathering reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContextStatus {
    Ok,
    NeedContext,
}

/// Reply to a context gathering request.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ContextReply {
    pub status: ContextStatus,
    /// Next question to ask the user
    #[serde(default)]
    pub question: String,
    /// Short summary of what is known so far
    #[serde(default)]
    pub context: String,
}

/// Reply to a title request. Has no status; a missing title is a failure.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TitleReply {
    /// Short goal title
    pub title: String,
}

/// A reply contract decodable from a parsed JSON object.
pub trait Contract: DeserializeOwned + JsonSchema {
    /// Accepted `status` values, or `None` for contracts without a status.
    const STATUSES: Option<&'static [&'static str]>;

    fn schema() -> Value {
        schema_for!(Self).to_value()
    }
}

impl Contract for StepReply {
    const STATUSES: Option<&'static [&'static str]> = Some(&[
        "ok",
        "need_clarification",
        "goal_completed",
        "near_completion",
    ]);
}

impl Contract for RephraseReply {
    const STATUSES: Option<&'static [&'static str]> = Some(&["ok"]);
}

impl Contract for ContextReply {
    const STATUSES: Option<&'static [&'static str]> = Some(&["ok", "need_context"]);
}

impl Contract for TitleReply {
    const STATUSES: Option<&'static [&'static str]> = None;
}

/// Decodes `value` into contract `T`.
///
/// # Errors
///
/// - [`CoachError::UnexpectedStatus`] when `T` has a status and the value's
///   `status` is missing, not a string, or not one of `T::STATUSES`.
/// - [`CoachError::ParseFailure`] when the rest of the value does not match.
pub fn decode<T: Contract>(operation: &'static str, value: Value) -> Result<T> {
    if let Some(accepted) = T::STATUSES {
        let status = value.get("status").and_then(Value::as_str);
        match status {
            Some(status) if accepted.contains(&status) => {}
            _ => {
                return Err(CoachError::UnexpectedStatus {
                    operation,
                    status: value.get("status").map(|s| match s.as_str() {
                        Some(text) => text.to_string(),
                        None => s.to_string(),
                    }),
                });
            }
        }
    }

    serde_json::from_value(value).map_err(|e| CoachError::ParseFailure {
        operation,
        reason: e.to_string(),
    })
}
