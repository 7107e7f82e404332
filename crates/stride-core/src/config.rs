//! Runtime configuration for building a [`Coach`](crate::Coach).

use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::gateway::{
    openai::{DEFAULT_API_BASE, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE},
    DEFAULT_TIMEOUT,
};

/// Where snapshots are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    /// One SQLite database file, `stride.db`
    #[default]
    Sqlite,
    /// `users.json`, `goals.json` and `steps.json`
    Json,
    /// Nothing written to disk
    Memory,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Sqlite => "sqlite",
            StorageKind::Json => "json",
            StorageKind::Memory => "memory",
        }
    }
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StorageKind::Sqlite),
            "json" => Ok(StorageKind::Json),
            "memory" => Ok(StorageKind::Memory),
            _ => Err(format!("Invalid storage kind: {s} (expected sqlite, json or memory)")),
        }
    }
}

/// Everything needed to assemble a coach.
#[derive(Debug, Clone, PartialEq)]
pub struct CoachConfig {
    /// Data directory; `$XDG_DATA_HOME/stride/` when unset
    pub data_dir: Option<PathBuf>,
    pub storage: StorageKind,
    /// Bound on each generation call
    pub generation_timeout: Duration,
    pub model: String,
    pub api_base: String,
    /// Checked when a generation call is made, not at startup
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the service to follow each reply's JSON Schema
    pub structured_replies: bool,
    /// Directory with prompt template overrides
    pub prompts_dir: Option<PathBuf>,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage: StorageKind::default(),
            generation_timeout: DEFAULT_TIMEOUT,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            structured_replies: true,
            prompts_dir: None,
        }
    }
}
