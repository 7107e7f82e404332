//! Chat loop and one-shot commands.
//!
//! Every stdin line becomes one interaction: lines starting with `/` and
//! quick reply labels are commands, anything else is free text for the
//! coach's current conversation mode.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use log::{info, warn};
use stride_core::{
    display::{messages, GoalList},
    Coach, CoachError, Input, Interaction, Reply,
};
use tokio::{
    io::{self, AsyncBufReadExt, BufReader},
    signal,
};

use crate::{args::ChatArgs, renderer::TerminalRenderer};

/// Command handler for CLI operations
pub struct Cli {
    coach: Coach,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(coach: Coach, renderer: TerminalRenderer) -> Self {
        Self { coach, renderer }
    }

    /// Reads stdin line by line until EOF or Ctrl-C.
    pub async fn chat(&self, chat: ChatArgs) -> Result<()> {
        let interactive = std::io::stdin().is_terminal();
        let mut lines = BufReader::new(io::stdin()).lines();

        info!("Chatting as user {}", chat.user);
        loop {
            if interactive {
                self.renderer.prompt()?;
            }

            let line = tokio::select! {
                line = lines.next_line() => line.context("Failed to read from stdin")?,
                _ = signal::ctrl_c() => {
                    info!("Interrupted");
                    break;
                }
            };
            let Some(line) = line else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let reply = self.send(&chat, line).await;
            self.renderer.render_reply(&reply)?;
        }
        Ok(())
    }

    async fn send(&self, chat: &ChatArgs, line: &str) -> Reply {
        match Input::parse(line) {
            Ok(input) => {
                let interaction = Interaction::new(&chat.user, &chat.name, input)
                    .with_username(chat.username.clone());
                self.coach.handle(interaction).await
            }
            Err(e) => {
                warn!("Rejected input {line:?}: {e}");
                Reply::text(e.user_message())
            }
        }
    }

    /// Prints the goals of `user_id`.
    pub async fn list_goals(&self, user_id: &str) -> Result<()> {
        let active_goal_id = match self.coach.store().get_user(user_id) {
            Ok(user) => user.active_goal_id,
            Err(CoachError::NotFound { .. }) => None,
            Err(e) => return Err(e).context("Failed to load user"),
        };
        let goals = self
            .coach
            .list_goals(user_id)
            .await
            .context("Failed to list goals")?;

        if goals.is_empty() {
            return self.renderer.render(messages::NO_GOALS);
        }
        let list = GoalList::new(&goals, active_goal_id.as_deref());
        self.renderer.render(list.to_string().trim_end())
    }
}
