//! Volatile backend that keeps snapshots in process memory.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex, PoisonError,
};

use crate::{
    error::{CoachError, Result},
    models::{Goal, Step, User},
};

use super::SnapshotBackend;

#[derive(Default)]
struct Snapshots {
    users: Option<Vec<User>>,
    goals: Option<Vec<Goal>>,
    steps: Option<Vec<Step>>,
}

/// Snapshot backend held entirely in memory.
///
/// Used for offline sessions that should leave nothing on disk, and by tests
/// that need to make writes fail on demand with [`MemoryBackend::fail_writes`].
#[derive(Default)]
pub struct MemoryBackend {
    snapshots: Mutex<Snapshots>,
    failing: AtomicBool,
    failing_steps: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the backend as if the collections had been written before.
    pub fn with_snapshot(users: Vec<User>, goals: Vec<Goal>, steps: Vec<Step>) -> Self {
        Self {
            snapshots: Mutex::new(Snapshots {
                users: Some(users),
                goals: Some(goals),
                steps: Some(steps),
            }),
            ..Self::default()
        }
    }

    /// Makes every following save fail (or succeed again).
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes only step saves fail, leaving users and goals writable.
    pub fn fail_step_writes(&self, failing: bool) {
        self.failing_steps.store(failing, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn save_with<F>(&self, collection: &str, failing: bool, write: F) -> Result<()>
    where
        F: FnOnce(&mut Snapshots),
    {
        if failing || self.failing.load(Ordering::SeqCst) {
            return Err(CoachError::persistence(format!("Failed to save {collection}"))
                .with_source(std::io::Error::other("writes disabled")));
        }
        let mut snapshots = self.snapshots.lock().unwrap_or_else(PoisonError::into_inner);
        write(&mut *snapshots);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn read<T, F>(&self, read: F) -> T
    where
        F: FnOnce(&Snapshots) -> T,
    {
        let snapshots = self.snapshots.lock().unwrap_or_else(PoisonError::into_inner);
        read(&*snapshots)
    }
}

impl SnapshotBackend for MemoryBackend {
    fn load_users(&self) -> Result<Option<Vec<User>>> {
        Ok(self.read(|s| s.users.clone()))
    }

    fn load_goals(&self) -> Result<Option<Vec<Goal>>> {
        Ok(self.read(|s| s.goals.clone()))
    }

    fn load_steps(&self) -> Result<Option<Vec<Step>>> {
        Ok(self.read(|s| s.steps.clone()))
    }

    fn save_users(&self, users: &[User]) -> Result<()> {
        self.save_with("users", false, |s| s.users = Some(users.to_vec()))
    }

    fn save_goals(&self, goals: &[Goal]) -> Result<()> {
        self.save_with("goals", false, |s| s.goals = Some(goals.to_vec()))
    }

    fn save_steps(&self, steps: &[Step]) -> Result<()> {
        let failing = self.failing_steps.load(Ordering::SeqCst);
        self.save_with("steps", failing, |s| s.steps = Some(steps.to_vec()))
    }
}
