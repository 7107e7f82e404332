//! Data models for users, goals and steps.
//!
//! These are the records the entity store keeps and persists. Display
//! implementations live in [`crate::display`] so presentation stays out of the
//! data structures.
//!
//! # Invariants
//!
//! - A goal's `completed_at` is set if and only if its status is
//!   [`GoalStatus::Completed`]. The only way to complete a goal is
//!   [`Goal::complete`], which sets both together.
//! - The "current" step of a goal is the oldest step without `completed_at`.
//!   [`current_step`] is the single definition used by the store and the
//!   coach.
//!
//! # Examples
//!
//! ```rust
//! use stride_core::models::{Goal, GoalStatus, Step};
//!
//! let mut goal = Goal::new("42", "Learn to swim", "Swim 50 meters without stopping");
//! assert_eq!(goal.status, GoalStatus::Active);
//!
//! let mut step = Step::new(&goal.id, "Find a pool nearby");
//! step.complete();
//! assert!(step.is_completed());
//!
//! goal.complete();
//! assert!(goal.completed_at.is_some());
//! ```

pub mod goal;
pub mod status;
pub mod step;
pub mod user;

#[cfg(test)]
mod tests;

pub use goal::{Goal, GoalContext};
pub use status::GoalStatus;
pub use step::{current_step, Step};
pub use user::User;
