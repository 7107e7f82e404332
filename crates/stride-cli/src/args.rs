use std::{path::PathBuf, time::Duration};

use clap::{Args as ClapArgs, Parser, Subcommand};
use stride_core::{CoachConfig, StorageKind};

/// User ID used when none is given.
pub const DEFAULT_USER: &str = "local";
/// Display name used when none is given.
pub const DEFAULT_NAME: &str = "friend";

/// Terminal front-end for the Stride goal coach
///
/// Stride helps you reach a goal one small step at a time. Describe a goal,
/// and a text generation service suggests the next concrete step whenever
/// you finish the previous one. Lines starting with `/` are commands; send
/// `/help` to list them.
#[derive(Parser)]
#[command(version, about, name = "stride")]
pub struct Args {
    /// Directory for stored users, goals and steps. Defaults to
    /// $XDG_DATA_HOME/stride/
    #[arg(long, global = true, env = "STRIDE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Storage backend: sqlite, json or memory
    #[arg(long, global = true, default_value = "sqlite")]
    pub storage: StorageKind,

    /// Seconds to wait for each generation call
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Chat completions model
    #[arg(long, global = true, env = "STRIDE_MODEL")]
    pub model: Option<String>,

    /// Base URL of the chat completions API
    #[arg(long, global = true, env = "STRIDE_API_BASE")]
    pub api_base: Option<String>,

    /// API key for the chat completions API
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Directory with prompt template overrides
    #[arg(long, global = true)]
    pub prompts_dir: Option<PathBuf>,

    /// Request plain JSON objects instead of schema-constrained replies
    #[arg(long, global = true)]
    pub json_object: bool,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use canned replies instead of the generation service
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Args {
    /// Coach configuration from the flags, defaults filled in.
    pub fn coach_config(&self) -> CoachConfig {
        let defaults = CoachConfig::default();
        CoachConfig {
            data_dir: self.data_dir.clone(),
            storage: self.storage,
            generation_timeout: Duration::from_secs(self.timeout_secs),
            model: self.model.clone().unwrap_or(defaults.model),
            api_base: self.api_base.clone().unwrap_or(defaults.api_base),
            api_key: self.api_key.clone(),
            structured_replies: !self.json_object,
            prompts_dir: self.prompts_dir.clone(),
            ..defaults
        }
    }
}

/// Available commands for the Stride CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Chat with the coach, one line per message (default)
    #[command(alias = "c")]
    Chat(ChatArgs),
    /// Print a user's goals and exit
    #[command(alias = "g")]
    Goals {
        /// User whose goals to print
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
    },
}

#[derive(ClapArgs)]
pub struct ChatArgs {
    /// User ID to chat as
    #[arg(long, default_value = DEFAULT_USER)]
    pub user: String,

    /// Name the coach greets you with
    #[arg(long, default_value = DEFAULT_NAME)]
    pub name: String,

    /// Optional handle stored with the user
    #[arg(long)]
    pub username: Option<String>,
}

impl Default for ChatArgs {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            name: DEFAULT_NAME.to_string(),
            username: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_coach_config_from_flags() {
        let args = Args::parse_from([
            "stride",
            "--storage",
            "json",
            "--timeout-secs",
            "5",
            "--model",
            "small-model",
            "goals",
        ]);
        let config = args.coach_config();
        assert_eq!(config.storage, StorageKind::Json);
        assert_eq!(config.generation_timeout, Duration::from_secs(5));
        assert_eq!(config.model, "small-model");
        assert_eq!(config.max_tokens, CoachConfig::default().max_tokens);
        assert!(config.structured_replies);
        assert!(matches!(args.command, Some(Commands::Goals { .. })));
    }

    #[test]
    fn test_json_object_flag_disables_structured_replies() {
        let args = Args::parse_from(["stride", "--json-object", "chat"]);
        assert!(!args.coach_config().structured_replies);
    }

    #[test]
    fn test_invalid_storage_is_rejected() {
        assert!(Args::try_parse_from(["stride", "--storage", "postgres"]).is_err());
    }
}
