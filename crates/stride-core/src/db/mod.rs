//! SQLite storage for user, goal and step snapshots.
//!
//! The entity store keeps everything in memory and hands whole collections to
//! its backend on every change. [`SqliteBackend`] writes each collection in a
//! single transaction, so a reader of the database file always sees either the
//! previous snapshot or the new one.

use std::{
    path::Path,
    sync::{Mutex, PoisonError},
};

use log::debug;
use rusqlite::Connection;

use crate::{
    error::{PersistenceResultExt, Result},
    models::{Goal, Step, User},
    store::SnapshotBackend,
};

pub mod goal_queries;
pub mod step_queries;
pub mod user_queries;
pub mod utils;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Opens (or creates) the database file and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection =
            Connection::open(path).persist_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory()
            .persist_context("Failed to open in-memory database")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Creates any missing tables from the embedded schema.
    fn initialize_schema(&self) -> Result<()> {
        self.connection
            .execute_batch(include_str!("../../assets/schema.sql"))
            .persist_context("Failed to initialize database schema")
    }
}

/// [`SnapshotBackend`] over a single SQLite database file.
pub struct SqliteBackend {
    db: Mutex<Database>,
}

impl SqliteBackend {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("Opening SQLite store at {}", path.as_ref().display());
        Ok(Self::from_database(Database::new(path)?))
    }

    pub fn from_database(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    fn with_db<T>(&self, f: impl FnOnce(&mut Database) -> Result<T>) -> Result<T> {
        let mut db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *db)
    }
}

impl SnapshotBackend for SqliteBackend {
    fn load_users(&self) -> Result<Option<Vec<User>>> {
        self.with_db(|db| db.load_users())
    }

    fn load_goals(&self) -> Result<Option<Vec<Goal>>> {
        self.with_db(|db| db.load_goals())
    }

    fn load_steps(&self) -> Result<Option<Vec<Step>>> {
        self.with_db(|db| db.load_steps())
    }

    fn save_users(&self, users: &[User]) -> Result<()> {
        self.with_db(|db| db.replace_users(users))
    }

    fn save_goals(&self, goals: &[Goal]) -> Result<()> {
        self.with_db(|db| db.replace_goals(goals))
    }

    fn save_steps(&self, steps: &[Step]) -> Result<()> {
        self.with_db(|db| db.replace_steps(steps))
    }
}
