//! CLI argument definitions for ledgerbot.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use clap::{Parser, Subcommand};

/// ledgerbot -- a Telegram bot tracking profit readings in a Google Sheet.
#[derive(Parser)]
#[command(
    name = "ledgerbot",
    version,
    about = "ledgerbot -- Telegram front-end for a Google Sheets profit ledger",
    long_about = "A group-chat bot that inserts, edits, deletes and lists profit rows \
                  in a single Google Sheets worksheet."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the Telegram bot gateway (receive commands from Telegram,
    /// apply them to the sheet, send replies back).
    Bot {
        /// Telegram long-polling timeout in seconds.
        #[arg(long, default_value_t = 30)]
        poll_timeout: u64,
    },
}
