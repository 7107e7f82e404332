//! Error types for the goal progression engine.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all coach operations.
#[derive(Error, Debug)]
pub enum CoachError {
    /// Entity absent from the store
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: String },
    /// Duplicate create
    #[error("{entity} with ID {id} already exists")]
    AlreadyExists { entity: &'static str, id: String },
    /// Every step of the goal is complete, or the goal has none
    #[error("Goal {goal_id} has no current step")]
    NoCurrentStep { goal_id: String },
    /// Generation reply could not be parsed as structured data
    #[error("Failed to parse {operation} reply: {reason}")]
    ParseFailure {
        operation: &'static str,
        reason: String,
    },
    /// Well-formed reply with a missing or unrecognized status
    #[error("Unexpected status {status:?} in {operation} reply")]
    UnexpectedStatus {
        operation: &'static str,
        status: Option<String>,
    },
    /// Durable write or read failed
    #[error("Persistence error: {message}")]
    Persistence {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Generation call exceeded its bound
    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: &'static str, seconds: u64 },
    /// Generation service unreachable or returned a failure status
    #[error("Generation service error: {message}")]
    Transport { message: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating persistence errors with a source.
pub struct PersistenceErrorBuilder {
    message: String,
}

impl PersistenceErrorBuilder {
    /// Create a new persistence error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source<E>(self, source: E) -> CoachError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CoachError::Persistence {
            message: self.message,
            source: Box::new(source),
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> CoachError {
        CoachError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl CoachError {
    /// Creates a builder for persistence errors.
    pub fn persistence(message: impl Into<String>) -> PersistenceErrorBuilder {
        PersistenceErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "User",
            id: id.into(),
        }
    }

    pub fn goal_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Goal",
            id: id.into(),
        }
    }

    pub fn step_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Step",
            id: id.into(),
        }
    }

    /// Whether repeating the same input later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Transport { .. }
                | Self::ParseFailure { .. }
                | Self::UnexpectedStatus { .. }
                | Self::Persistence { .. }
        )
    }

    /// Short message safe to show to the end user.
    ///
    /// Never includes internal error text or any part of a generation reply.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound { entity: "User", .. } => {
                "❌ I couldn't find your profile. Send /start to begin."
            }
            Self::NotFound { entity: "Goal", .. } => {
                "❌ That goal no longer exists. Pick another one with /goals."
            }
            Self::NotFound { .. } => "❌ That step no longer exists. Use /step to see where you are.",
            Self::AlreadyExists { .. } => "❌ That record already exists.",
            Self::NoCurrentStep { .. } => {
                "✅ All steps for this goal are done. Use /next to get the next one."
            }
            Self::ParseFailure { .. } | Self::UnexpectedStatus { .. } => {
                "❌ I got a confusing answer from the assistant. Please try again."
            }
            Self::Timeout { .. } => "⏳ The assistant took too long to answer. Please try again.",
            Self::Transport { .. } => {
                "❌ The assistant is unavailable right now. Please try again later."
            }
            Self::Persistence { .. } => "❌ I couldn't save your progress. Please try again.",
            Self::InvalidInput { .. } => "❌ I didn't understand that. Send /help for the list of commands.",
            Self::FileSystem { .. }
            | Self::XdgDirectory(_)
            | Self::Serialization { .. }
            | Self::Configuration { .. } => "❌ Something went wrong on my side. Please try again.",
        }
    }
}

/// Specialized extension trait for persistence-related Results.
pub trait PersistenceResultExt<T> {
    /// Map storage errors with a message.
    fn persist_context(self, message: &str) -> Result<T>;
}

impl<T, E> PersistenceResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn persist_context(self, message: &str) -> Result<T> {
        self.map_err(|e| CoachError::persistence(message).with_source(e))
    }
}

/// Extension trait for Result to map arbitrary errors into configuration
/// errors with context.
pub trait ResultExt<T> {
    /// Add lazy context to any error type, converting to CoachError.
    fn with_context_lazy<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: fmt::Display,
{
    fn with_context_lazy<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| CoachError::Configuration {
            message: format!("{}: {}", f(), e),
        })
    }
}

/// Result type alias for coach operations
pub type Result<T> = std::result::Result<T, CoachError>;
