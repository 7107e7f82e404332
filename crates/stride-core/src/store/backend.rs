//! Durable storage seam for the entity store.

use std::sync::Arc;

use crate::{
    error::Result,
    models::{Goal, Step, User},
};

/// Durable medium holding one complete snapshot per collection.
///
/// Every `save_*` call replaces the whole collection; there are no partial or
/// delta writes. A `load_*` returning `None` means the collection has never
/// been written, which the store answers by writing an empty snapshot.
///
/// Implementations are called while the store holds that collection's write
/// lock, so two saves of the same collection never overlap.
pub trait SnapshotBackend: Send + Sync {
    fn load_users(&self) -> Result<Option<Vec<User>>>;
    fn load_goals(&self) -> Result<Option<Vec<Goal>>>;
    fn load_steps(&self) -> Result<Option<Vec<Step>>>;

    fn save_users(&self, users: &[User]) -> Result<()>;
    fn save_goals(&self, goals: &[Goal]) -> Result<()>;
    fn save_steps(&self, steps: &[Step]) -> Result<()>;
}

/// Lets a caller keep a handle on the backend after handing it to the store.
impl<B: SnapshotBackend + ?Sized> SnapshotBackend for Arc<B> {
    fn load_users(&self) -> Result<Option<Vec<User>>> {
        (**self).load_users()
    }

    fn load_goals(&self) -> Result<Option<Vec<Goal>>> {
        (**self).load_goals()
    }

    fn load_steps(&self) -> Result<Option<Vec<Step>>> {
        (**self).load_steps()
    }

    fn save_users(&self, users: &[User]) -> Result<()> {
        (**self).save_users(users)
    }

    fn save_goals(&self, goals: &[Goal]) -> Result<()> {
        (**self).save_goals(goals)
    }

    fn save_steps(&self, steps: &[Step]) -> Result<()> {
        (**self).save_steps(steps)
    }
}
