//! Stride CLI Application
//!
//! Terminal chat front-end for the Stride goal coach.

mod args;
mod cli;
mod renderer;

use std::sync::Arc;

use anyhow::{Context, Result};
use args::{Args, ChatArgs, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::TerminalRenderer;
use stride_core::{gateway::ScriptedTransport, CoachBuilder};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let mut builder = CoachBuilder::new().with_config(args.coach_config());
    if args.offline {
        builder = builder.with_transport(Arc::new(ScriptedTransport::new()));
    }
    let coach = builder.build().await.context("Failed to initialize coach")?;

    let renderer = TerminalRenderer::new(!args.no_color);

    info!("Stride started");

    let cli = Cli::new(coach, renderer);
    match args.command {
        Some(Commands::Goals { user }) => cli.list_goals(&user).await,
        Some(Commands::Chat(chat)) => cli.chat(chat).await,
        None => cli.chat(ChatArgs::default()).await,
    }
}
