//! Presentation of coach data for chat replies.
//!
//! Domain models implement [`std::fmt::Display`] here rather than next to
//! their definitions, and newtype wrappers format collections. All output is
//! markdown; front-ends decide how to render it.
//!
//! ## Module Organization
//!
//! - [`collections`]: goal lists, progress, context summaries, checklists
//! - [`datetime`]: date formatting in the system time zone
//! - [`messages`]: fixed reply texts and templates
//! - [`models`]: Display implementations for domain models
//!
//! ```rust
//! use stride_core::{display::GoalList, models::Goal};
//!
//! let goals = vec![Goal::new("42", "Learn to swim", "Swim 50 meters")];
//! let text = GoalList::new(&goals, Some(goals[0].id.as_str())).to_string();
//! assert!(text.contains("🎯 **1. Learn to swim**"));
//! ```

pub mod collections;
pub mod datetime;
pub mod messages;
pub mod models;

pub use collections::{ContextSummary, GoalList, GoalProgress, StepChecklist};
pub use datetime::LocalDate;
