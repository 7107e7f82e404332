//! Builder for creating and configuring Coach instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::info;
use tokio::task;

use super::Coach;
use crate::{
    config::{CoachConfig, StorageKind},
    db::SqliteBackend,
    error::{CoachError, Result},
    gateway::{GenerationGateway, OpenAiTransport, PromptTemplates, Transport},
    store::{EntityStore, JsonFileBackend, MemoryBackend, SnapshotBackend},
};

/// File name of the SQLite database inside the data directory.
pub const DATABASE_FILE: &str = "stride.db";

/// Builder for creating and configuring Coach instances.
#[derive(Default)]
pub struct CoachBuilder {
    config: CoachConfig,
    transport: Option<Arc<dyn Transport>>,
    backend: Option<Arc<dyn SnapshotBackend>>,
}

impl CoachBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: CoachConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets a custom data directory.
    ///
    /// If not specified, uses the XDG Base Directory specification:
    /// `$XDG_DATA_HOME/stride/` or `~/.local/share/stride/`
    pub fn with_data_dir<P: AsRef<Path>>(mut self, dir: Option<P>) -> Self {
        if let Some(dir) = dir {
            self.config.data_dir = Some(dir.as_ref().to_path_buf());
        }
        self
    }

    pub fn with_storage(mut self, storage: StorageKind) -> Self {
        self.config.storage = storage;
        self
    }

    /// Uses `transport` instead of the configured chat-completions service.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Uses `backend` instead of the configured storage kind.
    pub fn with_backend<B>(mut self, backend: Arc<B>) -> Self
    where
        B: SnapshotBackend + 'static,
    {
        let backend: Arc<dyn SnapshotBackend> = backend;
        self.backend = Some(backend);
        self
    }

    /// Builds the configured coach instance.
    ///
    /// # Errors
    ///
    /// Returns `CoachError::XdgDirectory` if no data directory can be resolved
    /// Returns `CoachError::FileSystem` if the data directory cannot be created
    /// Returns `CoachError::Persistence` if the store cannot be loaded
    pub async fn build(self) -> Result<Coach> {
        let Self {
            config,
            transport,
            backend,
        } = self;

        let backend = match backend {
            Some(backend) => backend,
            None => Self::open_backend(&config).await?,
        };

        let store = task::spawn_blocking(move || EntityStore::open(backend))
            .await
            .map_err(|e| CoachError::Configuration {
                message: format!("Task join error: {e}"),
            })??;

        let transport: Arc<dyn Transport> = match transport {
            Some(transport) => transport,
            None => Arc::new(
                OpenAiTransport::new(config.api_key.clone())
                    .with_api_base(&config.api_base)
                    .with_model(&config.model)
                    .with_sampling(config.temperature, config.max_tokens)
                    .with_structured_replies(config.structured_replies)
                    .with_http_timeout(config.generation_timeout),
            ),
        };

        let prompts = match &config.prompts_dir {
            Some(dir) => PromptTemplates::with_override_dir(dir),
            None => PromptTemplates::builtin(),
        };

        info!(
            "Coach ready: {} storage, {} transport, {}s generation timeout",
            config.storage.as_str(),
            transport.name(),
            config.generation_timeout.as_secs()
        );

        let gateway = GenerationGateway::new(transport)
            .with_prompts(prompts)
            .with_timeout(config.generation_timeout);
        Ok(Coach::new(Arc::new(store), gateway))
    }

    async fn open_backend(config: &CoachConfig) -> Result<Arc<dyn SnapshotBackend>> {
        match config.storage {
            StorageKind::Memory => Ok(Arc::new(MemoryBackend::new())),
            StorageKind::Json => {
                let dir = Self::data_dir(config)?;
                Ok(Arc::new(JsonFileBackend::new(dir)?))
            }
            StorageKind::Sqlite => {
                let db_path = Self::data_dir(config)?.join(DATABASE_FILE);
                let backend = task::spawn_blocking(move || SqliteBackend::open(&db_path))
                    .await
                    .map_err(|e| CoachError::Configuration {
                        message: format!("Task join error: {e}"),
                    })??;
                Ok(Arc::new(backend))
            }
        }
    }

    /// The configured data directory, created if missing, or the XDG default.
    fn data_dir(config: &CoachConfig) -> Result<PathBuf> {
        if let Some(dir) = &config.data_dir {
            std::fs::create_dir_all(dir).map_err(|e| CoachError::FileSystem {
                path: dir.clone(),
                source: e,
            })?;
            return Ok(dir.clone());
        }

        let db_path = xdg::BaseDirectories::with_prefix("stride")
            .place_data_file(DATABASE_FILE)
            .map_err(|e| CoachError::XdgDirectory(e.to_string()))?;
        db_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| CoachError::XdgDirectory(format!("{} has no parent", db_path.display())))
    }
}
