//! Goal model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::GoalStatus;

/// Clarifications gathered from the user to personalize step generation.
///
/// Append-only: entries are never edited or removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GoalContext {
    /// One entry per answered question, in the order they were asked
    #[serde(default)]
    pub clarifications: Vec<String>,

    /// Free-form notes about the goal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl GoalContext {
    pub fn is_empty(&self) -> bool {
        self.clarifications.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clarifications.len()
    }
}

/// A user-declared objective broken into sequential steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    /// Unique identifier for the goal
    pub id: String,

    /// ID of the owning user
    pub user_id: String,

    /// Short title derived from the description
    pub title: String,

    /// The user's own description of the goal
    pub description: String,

    /// Lifecycle status
    #[serde(default)]
    pub status: GoalStatus,

    /// Timestamp when the goal was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the goal was last modified (UTC)
    pub updated_at: Timestamp,

    /// Set exactly when `status` is completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    /// Clarifications gathered before the first step
    #[serde(default)]
    pub context: GoalContext,
}

impl Goal {
    /// Creates an active goal with an empty context and a fresh ID.
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: title.into(),
            description: description.into(),
            status: GoalStatus::Active,
            created_at: now,
            updated_at: now,
            completed_at: None,
            context: GoalContext::default(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == GoalStatus::Completed
    }

    /// Marks the goal completed, stamping `completed_at` and `updated_at`
    /// with the same instant.
    pub fn complete(&mut self) {
        let now = Timestamp::now();
        self.status = GoalStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    /// Appends one question/answer pair to the context.
    pub fn add_clarification(&mut self, question: &str, answer: &str) {
        self.context
            .clarifications
            .push(format!("Q: {} | A: {}", question.trim(), answer.trim()));
        self.updated_at = Timestamp::now();
    }
}
