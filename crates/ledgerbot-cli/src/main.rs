//! CLI entry point for ledgerbot.
//!
//! This binary provides the `ledgerbot` command; its one subcommand starts
//! the Telegram gateway loop.

use anyhow::Result;
use clap::Parser;

mod bot;
mod cli;
mod config;
mod helpers;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bot { poll_timeout } => bot::cmd_bot(poll_timeout).await,
    }
}
