//! Snapshot backend writing one pretty-printed JSON array per collection.

use std::{
    fs,
    io::{BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};

use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::{
    error::{CoachError, PersistenceResultExt, Result},
    models::{Goal, Step, User},
};

use super::SnapshotBackend;

const USERS_FILE: &str = "users.json";
const GOALS_FILE: &str = "goals.json";
const STEPS_FILE: &str = "steps.json";

/// Stores `users.json`, `goals.json` and `steps.json` in one directory.
///
/// Each save writes a temporary file next to the target and renames it over
/// the target, so readers and crashes only ever see a complete collection.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    /// Uses `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| CoachError::FileSystem {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load<T: DeserializeOwned>(&self, file: &str) -> Result<Option<Vec<T>>> {
        let path = self.dir.join(file);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CoachError::FileSystem { path, source: e }),
        };
        let records = serde_json::from_slice(&bytes)
            .persist_context(&format!("Failed to decode {}", path.display()))?;
        Ok(Some(records))
    }

    fn save<T: Serialize>(&self, file: &str, records: &[T]) -> Result<()> {
        let target = self.dir.join(file);
        let message = format!("Failed to write {}", target.display());

        let tmp = NamedTempFile::new_in(&self.dir).persist_context(&message)?;
        let mut writer = BufWriter::new(tmp);
        serde_json::to_writer_pretty(&mut writer, records).persist_context(&message)?;
        writer.flush().persist_context(&message)?;
        let tmp = writer
            .into_inner()
            .map_err(|e| CoachError::persistence(message.clone()).with_source(e.into_error()))?;
        tmp.as_file().sync_all().persist_context(&message)?;
        tmp.persist(&target)
            .map_err(|e| CoachError::persistence(message).with_source(e.error))?;

        debug!("Wrote {} records to {}", records.len(), target.display());
        Ok(())
    }
}

impl SnapshotBackend for JsonFileBackend {
    fn load_users(&self) -> Result<Option<Vec<User>>> {
        self.load(USERS_FILE)
    }

    fn load_goals(&self) -> Result<Option<Vec<Goal>>> {
        self.load(GOALS_FILE)
    }

    fn load_steps(&self) -> Result<Option<Vec<Step>>> {
        self.load(STEPS_FILE)
    }

    fn save_users(&self, users: &[User]) -> Result<()> {
        self.save(USERS_FILE, users)
    }

    fn save_goals(&self, goals: &[Goal]) -> Result<()> {
        self.save(GOALS_FILE, goals)
    }

    fn save_steps(&self, steps: &[Step]) -> Result<()> {
        self.save(STEPS_FILE, steps)
    }
}
