//! Step model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One small, independently completable unit of work toward a goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Unique identifier for the step
    pub id: String,

    /// ID of the parent goal
    pub goal_id: String,

    /// What the user should do
    pub text: String,

    /// Timestamp when the step was created (UTC)
    pub created_at: Timestamp,

    /// Completion marker; presence means done
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    /// Whether the text was rewritten at the user's request
    #[serde(default)]
    pub rephrased: bool,

    /// Why the user asked for the rewrite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_comment: Option<String>,
}

impl Step {
    pub fn new(goal_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            goal_id: goal_id.into(),
            text: text.into(),
            created_at: Timestamp::now(),
            completed_at: None,
            rephrased: false,
            user_comment: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn complete(&mut self) {
        self.completed_at = Some(Timestamp::now());
    }

    /// Replaces the text and records the comment that prompted it.
    pub fn rephrase(&mut self, text: impl Into<String>, comment: impl Into<String>) {
        self.text = text.into();
        self.rephrased = true;
        self.user_comment = Some(comment.into());
    }

    /// Creation order: `created_at`, ties broken by ID.
    pub(crate) fn creation_key(&self) -> (Timestamp, &str) {
        (self.created_at, self.id.as_str())
    }
}

/// The oldest incomplete step among `steps`, if any.
pub fn current_step<'a, I>(steps: I) -> Option<&'a Step>
where
    I: IntoIterator<Item = &'a Step>,
{
    steps
        .into_iter()
        .filter(|step| !step.is_completed())
        .min_by(|a, b| a.creation_key().cmp(&b.creation_key()))
}
