//! Goal progression controller and conversation state machine.
//!
//! [`Coach`] ties the entity store, the generation gateway and the per-user
//! conversation table together. Front-ends hand it one [`Interaction`] at a
//! time and render the [`Reply`] it returns.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │     Dialog      │    │   Operations    │    │   EntityStore   │
//! │ (mode, command  │───▶│ (goal_ops,      │───▶│ GenerationGate- │
//! │  dispatch)      │    │  step_ops)      │    │ way             │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!   Conversation state     Progression policy     Storage, generation
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: assembles a [`Coach`] from a [`CoachConfig`](crate::CoachConfig)
//! - [`dialog`]: interactions, commands, replies and mode transitions
//! - [`goal_ops`]: user registration and goal lifecycle
//! - [`step_ops`]: the next-step policy, completion, rephrasing and context
//!
//! Store calls run on the blocking pool; the only other suspension points are
//! generation calls. A failed interaction leaves both the store and the
//! conversation state as they were.

use std::sync::Arc;

use tokio::task;

use crate::{
    conversation::ConversationTable,
    error::{CoachError, Result},
    gateway::GenerationGateway,
    store::EntityStore,
};

pub mod builder;
pub mod dialog;
pub mod goal_ops;
pub mod step_ops;


pub use builder::CoachBuilder;
pub use dialog::{Command, Input, Interaction, QuickReply, Reply};
pub use step_ops::NextStep;

/// Main entry point for driving goal progression.
pub struct Coach {
    store: Arc<EntityStore>,
    gateway: GenerationGateway,
    conversations: ConversationTable,
}

impl Coach {
    pub(crate) fn new(store: Arc<EntityStore>, gateway: GenerationGateway) -> Self {
        Self {
            store,
            gateway,
            conversations: ConversationTable::new(),
        }
    }

    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    pub fn gateway(&self) -> &GenerationGateway {
        &self.gateway
    }

    pub fn conversations(&self) -> &ConversationTable {
        &self.conversations
    }

    /// Runs `f` against the store on the blocking pool.
    pub(crate) async fn with_store<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&EntityStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| CoachError::Configuration {
                message: format!("Task join error: {e}"),
            })?
    }
}
