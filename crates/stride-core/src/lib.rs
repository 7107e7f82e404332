//! Core library for the Stride goal coaching assistant.
//!
//! This crate provides the goal progression engine: a write-through entity
//! store for users, goals and steps, a gateway that turns replies from a text
//! generation service into validated outcomes, and the per-user conversation
//! state machine that sequences goal creation, context gathering, step
//! issuance, completion and rephrasing.
//!
//! # Architecture
//!
//! - **Entity Store** ([`store`]): in-memory collections mirrored to a
//!   [`SnapshotBackend`](store::SnapshotBackend) on every mutation
//! - **Generation Gateway** ([`gateway`]): prompt rendering, transport,
//!   reply extraction and contract validation
//! - **Coach** ([`coach`]): conversation modes and the next-step policy
//! - **Display** ([`display`]): markdown replies for every outcome
//!
//! Front-ends only deal with [`Interaction`] and [`Reply`].
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use stride_core::{gateway::ScriptedTransport, CoachBuilder, Input, Interaction, StorageKind};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let coach = CoachBuilder::new()
//!     .with_storage(StorageKind::Memory)
//!     .with_transport(Arc::new(ScriptedTransport::new()))
//!     .build()
//!     .await?;
//!
//! let input = Input::parse("/start")?;
//! let reply = coach.handle(Interaction::new("42", "Ann", input)).await;
//! println!("{}", reply.text);
//! # Ok(())
//! # }
//! ```

pub mod coach;
pub mod config;
pub mod conversation;
pub mod db;
pub mod display;
pub mod error;
pub mod gateway;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use coach::{Coach, CoachBuilder, Command, Input, Interaction, NextStep, QuickReply, Reply};
pub use config::{CoachConfig, StorageKind};
pub use conversation::{ConversationState, ConversationTable, Mode};
pub use db::{Database, SqliteBackend};
pub use error::{CoachError, Result};
pub use gateway::{GenerationGateway, OpenAiTransport, ScriptedTransport, Transport};
pub use models::{Goal, GoalContext, GoalStatus, Step, User};
pub use store::{EntityStore, JsonFileBackend, MemoryBackend, SnapshotBackend};
