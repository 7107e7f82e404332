//! Entity store: in-memory collections mirrored to durable storage.
//!
//! The store keeps three keyed collections (users, goals, steps). Each one is
//! guarded by its own [`RwLock`]; readers run concurrently, writers are
//! exclusive, and no method ever holds two collection locks at once.
//!
//! # Durability
//!
//! Every mutating call persists the *entire* affected collection through the
//! [`SnapshotBackend`] before it returns. The mutation is applied to a copy of
//! the collection, the copy is saved, and only then does the copy replace the
//! live map. A failed save therefore leaves memory exactly as it was and
//! surfaces [`CoachError::Persistence`].
//!
//! # Cascading deletes
//!
//! [`EntityStore::delete_goal`] removes the goal, then its steps, taking one
//! lock after the other. If the steps cannot be saved the goal is put back
//! before the error is returned, so a caller sees either both removed or
//! neither. The two collections are still not updated atomically: a crash
//! between the two saves leaves steps whose goal no longer exists. Those steps
//! are never reachable through a live goal and are harmless.
//!
//! ```text
//! ┌────────────┐   clone + mutate   ┌────────────┐   save snapshot   ┌─────────┐
//! │  RwLock<   │ ─────────────────▶ │   next     │ ────────────────▶ │ backend │
//! │  HashMap>  │ ◀───── swap ────── │   map      │ ◀────── Ok ────── │         │
//! └────────────┘                    └────────────┘                   └─────────┘
//! ```

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use jiff::Timestamp;
use log::{debug, info, warn};

use crate::{
    error::{CoachError, Result},
    models::{current_step, Goal, Step, User},
};

pub mod backend;
pub mod json_file;
pub mod memory;

#[cfg(test)]
mod tests;

pub use backend::SnapshotBackend;
pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;

/// A record the store can key and order.
trait Record: Clone {
    const ENTITY: &'static str;

    fn key(&self) -> &str;

    /// Creation order, used for snapshots and listings.
    fn order_key(&self) -> (Timestamp, &str);
}

impl Record for User {
    const ENTITY: &'static str = "User";

    fn key(&self) -> &str {
        &self.id
    }

    fn order_key(&self) -> (Timestamp, &str) {
        (self.created_at, &self.id)
    }
}

impl Record for Goal {
    const ENTITY: &'static str = "Goal";

    fn key(&self) -> &str {
        &self.id
    }

    fn order_key(&self) -> (Timestamp, &str) {
        (self.created_at, &self.id)
    }
}

impl Record for Step {
    const ENTITY: &'static str = "Step";

    fn key(&self) -> &str {
        &self.id
    }

    fn order_key(&self) -> (Timestamp, &str) {
        self.creation_key()
    }
}

/// One lock-guarded collection.
struct Collection<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V: Record> Collection<V> {
    fn new(records: Vec<V>) -> Self {
        let entries = records
            .into_iter()
            .map(|record| (record.key().to_string(), record))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    fn get(&self, id: &str) -> Result<V> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| CoachError::NotFound {
                entity: V::ENTITY,
                id: id.to_string(),
            })
    }

    /// Records matching `predicate`, in creation order.
    fn filter<P>(&self, predicate: P) -> Vec<V>
    where
        P: Fn(&V) -> bool,
    {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut matching: Vec<V> = entries.values().filter(|v| predicate(v)).cloned().collect();
        matching.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
        matching
    }

    /// Applies `mutate` to a copy of the collection, saves the copy, then
    /// swaps it in. Memory is untouched if either step fails.
    fn write<R, M, S>(&self, mutate: M, save: S) -> Result<R>
    where
        M: FnOnce(&mut HashMap<String, V>) -> Result<R>,
        S: FnOnce(&[V]) -> Result<()>,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = entries.clone();
        let outcome = mutate(&mut next)?;
        save(&snapshot(&next))?;
        *entries = next;
        Ok(outcome)
    }

    fn insert(&self, record: V, save: impl FnOnce(&[V]) -> Result<()>) -> Result<()> {
        self.write(
            |entries| {
                if entries.contains_key(record.key()) {
                    return Err(CoachError::AlreadyExists {
                        entity: V::ENTITY,
                        id: record.key().to_string(),
                    });
                }
                entries.insert(record.key().to_string(), record);
                Ok(())
            },
            save,
        )
    }

    fn replace(&self, record: V, save: impl FnOnce(&[V]) -> Result<()>) -> Result<()> {
        self.write(
            |entries| match entries.get_mut(record.key()) {
                Some(existing) => {
                    *existing = record;
                    Ok(())
                }
                None => Err(CoachError::NotFound {
                    entity: V::ENTITY,
                    id: record.key().to_string(),
                }),
            },
            save,
        )
    }
}

/// Collection contents in creation order.
fn snapshot<V: Record>(entries: &HashMap<String, V>) -> Vec<V> {
    let mut records: Vec<V> = entries.values().cloned().collect();
    records.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
    records
}

/// In-memory users, goals and steps with write-through persistence.
pub struct EntityStore {
    backend: Box<dyn SnapshotBackend>,
    users: Collection<User>,
    goals: Collection<Goal>,
    steps: Collection<Step>,
}

impl EntityStore {
    /// Loads all three collections from `backend`.
    ///
    /// A collection that has never been written is initialized empty and
    /// written out, so a fresh backend ends up in a valid empty state.
    ///
    /// # Errors
    ///
    /// Any load or initial save failure. Callers treat this as fatal.
    pub fn open<B>(backend: B) -> Result<Self>
    where
        B: SnapshotBackend + 'static,
    {
        let users = match backend.load_users()? {
            Some(users) => users,
            None => {
                backend.save_users(&[])?;
                Vec::new()
            }
        };
        let goals = match backend.load_goals()? {
            Some(goals) => goals,
            None => {
                backend.save_goals(&[])?;
                Vec::new()
            }
        };
        let steps = match backend.load_steps()? {
            Some(steps) => steps,
            None => {
                backend.save_steps(&[])?;
                Vec::new()
            }
        };

        info!(
            "Entity store loaded: {} users, {} goals, {} steps",
            users.len(),
            goals.len(),
            steps.len()
        );

        Ok(Self {
            backend: Box::new(backend),
            users: Collection::new(users),
            goals: Collection::new(goals),
            steps: Collection::new(steps),
        })
    }

    // Users

    pub fn get_user(&self, id: &str) -> Result<User> {
        self.users.get(id)
    }

    pub fn create_user(&self, user: User) -> Result<()> {
        debug!("create_user: {}", user.id);
        self.users.insert(user, |users| self.backend.save_users(users))
    }

    pub fn update_user(&self, user: User) -> Result<()> {
        self.users.replace(user, |users| self.backend.save_users(users))
    }

    // Goals

    pub fn get_goal(&self, id: &str) -> Result<Goal> {
        self.goals.get(id)
    }

    pub fn create_goal(&self, goal: Goal) -> Result<()> {
        debug!("create_goal: {} for user {}", goal.id, goal.user_id);
        self.goals.insert(goal, |goals| self.backend.save_goals(goals))
    }

    /// Replaces a stored goal, stamping `updated_at` on the way in.
    pub fn update_goal(&self, mut goal: Goal) -> Result<Goal> {
        goal.updated_at = goal.updated_at.max(Timestamp::now());
        let stored = goal.clone();
        self.goals.replace(goal, |goals| self.backend.save_goals(goals))?;
        Ok(stored)
    }

    /// Goals owned by `user_id`, in creation order.
    pub fn list_goals_for_user(&self, user_id: &str) -> Vec<Goal> {
        self.goals.filter(|goal| goal.user_id == user_id)
    }

    /// Removes a goal and every step that belongs to it.
    ///
    /// Returns the removed goal and the number of steps removed with it. If
    /// the steps cannot be saved, the goal is restored before the error is
    /// returned.
    pub fn delete_goal(&self, goal_id: &str) -> Result<(Goal, usize)> {
        let goal = self.goals.write(
            |goals| {
                goals
                    .remove(goal_id)
                    .ok_or_else(|| CoachError::goal_not_found(goal_id))
            },
            |goals| self.backend.save_goals(goals),
        )?;

        let removed = self.steps.write(
            |steps| {
                let before = steps.len();
                steps.retain(|_, step| step.goal_id != goal_id);
                Ok(before - steps.len())
            },
            |steps| self.backend.save_steps(steps),
        );

        match removed {
            Ok(removed) => {
                info!("Deleted goal {goal_id} with {removed} steps");
                Ok((goal, removed))
            }
            Err(e) => {
                let restored = self.goals.insert(goal, |goals| self.backend.save_goals(goals));
                if let Err(restore) = restored {
                    warn!("Failed to restore goal {goal_id} after a failed delete: {restore}");
                }
                Err(e)
            }
        }
    }

    // Steps

    pub fn get_step(&self, id: &str) -> Result<Step> {
        self.steps.get(id)
    }

    pub fn create_step(&self, step: Step) -> Result<()> {
        debug!("create_step: {} for goal {}", step.id, step.goal_id);
        self.steps.insert(step, |steps| self.backend.save_steps(steps))
    }

    pub fn update_step(&self, step: Step) -> Result<()> {
        self.steps.replace(step, |steps| self.backend.save_steps(steps))
    }

    /// Steps of `goal_id`, oldest first. Empty for unknown goals.
    pub fn list_steps_for_goal(&self, goal_id: &str) -> Vec<Step> {
        self.steps.filter(|step| step.goal_id == goal_id)
    }

    /// The oldest incomplete step of `goal_id`.
    ///
    /// # Errors
    ///
    /// [`CoachError::NoCurrentStep`] when every step is complete or none
    /// exist.
    pub fn current_step(&self, goal_id: &str) -> Result<Step> {
        let steps = self.list_steps_for_goal(goal_id);
        current_step(&steps)
            .cloned()
            .ok_or_else(|| CoachError::NoCurrentStep {
                goal_id: goal_id.to_string(),
            })
    }

    /// Marks the current step of `goal_id` complete and returns it.
    ///
    /// The lookup and the update happen under one steps write lock, so two
    /// concurrent calls never complete the same step twice.
    pub fn complete_current_step(&self, goal_id: &str) -> Result<Step> {
        self.steps.write(
            |steps| {
                let current_id = current_step(steps.values().filter(|s| s.goal_id == goal_id))
                    .map(|step| step.id.clone())
                    .ok_or_else(|| CoachError::NoCurrentStep {
                        goal_id: goal_id.to_string(),
                    })?;
                let step = steps
                    .get_mut(&current_id)
                    .ok_or_else(|| CoachError::step_not_found(&current_id))?;
                step.complete();
                Ok(step.clone())
            },
            |steps| self.backend.save_steps(steps),
        )
    }
}
