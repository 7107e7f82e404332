//! User model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A person talking to the coach.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Stable external identifier supplied by the transport
    pub id: String,

    /// Transport handle, if the transport has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Name used when greeting the user
    pub display_name: String,

    /// Timestamp when the user first interacted (UTC)
    pub created_at: Timestamp,

    /// Goal currently being worked on. A lookup key, not containment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_goal_id: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            display_name: display_name.into(),
            created_at: Timestamp::now(),
            active_goal_id: None,
        }
    }

    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username.filter(|name| !name.is_empty());
        self
    }

    /// Whether `goal_id` is this user's active goal.
    pub fn is_active_goal(&self, goal_id: &str) -> bool {
        self.active_goal_id.as_deref() == Some(goal_id)
    }
}
