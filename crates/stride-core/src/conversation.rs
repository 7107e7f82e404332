//! Per-user conversation state.
//!
//! Conversation state is transient: it lives only as long as the process and
//! is created lazily the first time a user is seen. It records what the next
//! free-text message from the user means.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

/// Scratch key holding the goal a context question belongs to.
pub const SCRATCH_GOAL_ID: &str = "goal_id";
/// Scratch key holding the context question waiting for an answer.
pub const SCRATCH_QUESTION: &str = "question";

/// How the next free-text message is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    /// Next text describes a new goal
    AwaitingGoalDescription,
    /// Next text explains what is wrong with the current step
    AwaitingRephraseComment,
    /// Next text answers the pending context question
    AwaitingContextAnswer,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::AwaitingGoalDescription => "awaiting-goal-description",
            Mode::AwaitingRephraseComment => "awaiting-rephrase-comment",
            Mode::AwaitingContextAnswer => "awaiting-context-answer",
        }
    }
}

/// Mode plus string-keyed scratch data carried between messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    pub mode: Mode,
    pub scratch: HashMap<String, String>,
}

impl ConversationState {
    /// A state in `mode` with empty scratch data.
    pub fn in_mode(mode: Mode) -> Self {
        Self {
            mode,
            scratch: HashMap::new(),
        }
    }

    /// Waiting for the answer to `question` about `goal_id`.
    pub fn awaiting_context(goal_id: &str, question: &str) -> Self {
        let mut state = Self::in_mode(Mode::AwaitingContextAnswer);
        state
            .scratch
            .insert(SCRATCH_GOAL_ID.to_string(), goal_id.to_string());
        state
            .scratch
            .insert(SCRATCH_QUESTION.to_string(), question.to_string());
        state
    }

    pub fn scratch(&self, key: &str) -> Option<&str> {
        self.scratch.get(key).map(String::as_str)
    }
}

/// Lock-guarded table of conversation states keyed by user ID.
///
/// States are copied in and out; the lock is never held across an await.
#[derive(Debug, Default)]
pub struct ConversationTable {
    states: Mutex<HashMap<String, ConversationState>>,
}

impl ConversationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's current state, created idle on first access.
    pub fn get(&self, user_id: &str) -> ConversationState {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    pub fn set(&self, user_id: &str, state: ConversationState) {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.to_string(), state);
    }

    /// Back to idle with scratch data cleared.
    pub fn reset(&self, user_id: &str) {
        self.set(user_id, ConversationState::default());
    }

    pub fn len(&self) -> usize {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
