//! Subcommand: `ledgerbot bot` -- Telegram bot gateway.
//!
//! Polls Telegram for incoming messages, applies data commands to the
//! ledger sheet, and sends formatted replies back.  Data commands are
//! restricted to the configured allow-list of chat ids; `/help` is open.

use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::{Duration, FixedOffset};
use tracing::{info, warn};

use ledgerbot_gateway::{Command, Messages, Parsed, TelegramClient, keys, parse};
use ledgerbot_ledger::{DeleteOutcome, EditOutcome, LedgerSheet, Reading};
use ledgerbot_store::{
    RangeSpec, RangeStore, ServiceAccountAuth, SheetsClient, TokenProvider,
};

use crate::config::AppConfig;
use crate::helpers::{env_non_empty, init_tracing};

/// Run the Telegram bot gateway.
pub async fn cmd_bot(poll_timeout: u64) -> Result<()> {
    init_tracing("info");
    info!("starting ledgerbot gateway");

    let config = AppConfig::load("config/default.toml")?;
    let msgs = Messages::load();

    // Resolve the Telegram bot token and verify it with getMe.
    let bot_token = env_non_empty("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
        anyhow::anyhow!("TELEGRAM_BOT_TOKEN is required. Create a bot at https://t.me/BotFather")
    })?;
    let telegram = TelegramClient::new(bot_token);
    let bot_name = telegram
        .get_me()
        .await
        .context("failed to reach Telegram API")?;

    // Sheets auth: a pre-issued token from the environment wins over the
    // service-account key file.
    let auth = match env_non_empty("SHEETS_ACCESS_TOKEN") {
        Some(token) => {
            info!("using pre-issued Sheets token from environment");
            TokenProvider::Static(token)
        }
        None => TokenProvider::ServiceAccount(
            ServiceAccountAuth::from_key_file(&config.sheets.credentials_file)
                .context("failed to load service-account key")?,
        ),
    };

    let zone = FixedOffset::east_opt(config.ledger.utc_offset_hours * 3600)
        .context("ledger.utc_offset_hours is out of range")?;
    let ledger = LedgerSheet::new(
        SheetsClient::new(auth),
        config.sheets.spreadsheet_id.clone(),
        RangeSpec::new(
            config.sheets.worksheet.clone(),
            config.sheets.column_span.clone(),
        ),
        zone,
    )
    .with_tolerance(Duration::seconds(config.ledger.tolerance_secs));

    // Print banner.
    println!();
    println!("  ledgerbot v{}", env!("CARGO_PKG_VERSION"));
    println!("  Bot: @{bot_name}");
    println!("  Spreadsheet: {}", config.sheets.spreadsheet_id);
    println!(
        "  Worksheet: {} ({})",
        config.sheets.worksheet, config.sheets.column_span
    );
    println!("  Allowed chats: {:?}", config.telegram.allowed_chat_ids);
    println!("  Long-poll timeout: {poll_timeout}s");
    println!();
    println!("  Bot is running. Send /help to @{bot_name} on Telegram.");
    println!("  Press Ctrl+C to stop.");
    println!();

    // Polling loop.
    let mut offset: i64 = 0;

    loop {
        let updates = match telegram.get_updates(offset, poll_timeout).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!(error = %e, "Telegram poll failed, retrying...");
                tokio::time::sleep(StdDuration::from_secs(5)).await;
                continue;
            }
        };

        for update in &updates {
            let update_id = update
                .get("update_id")
                .and_then(|v| v.as_i64())
                .unwrap_or(0);
            offset = offset.max(update_id + 1);

            let Some(message) = update.get("message") else {
                continue;
            };
            let Some(text) = message.get("text").and_then(|v| v.as_str()) else {
                continue;
            };
            let chat_id = message
                .pointer("/chat/id")
                .and_then(|v| v.as_i64())
                .unwrap_or(0);

            info!(chat_id, text, "incoming Telegram message");

            handle_message(&telegram, &ledger, &msgs, &config, chat_id, text).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Parse one message and run the matching handler.
async fn handle_message<S: RangeStore>(
    telegram: &TelegramClient,
    ledger: &LedgerSheet<S>,
    msgs: &Messages,
    config: &AppConfig,
    chat_id: i64,
    text: &str,
) {
    let parsed = parse(text);
    if parsed == Parsed::NotACommand {
        return;
    }

    // /help is open to everyone; everything that can reach the sheet is
    // allow-listed, including malformed attempts.
    if !matches!(parsed, Parsed::Command(Command::Help)) && !is_authorized(config, chat_id) {
        warn!(chat_id, "chat not in allow list, denying");
        send(telegram, chat_id, &msgs.get(keys::UNAUTHORIZED), None).await;
        return;
    }

    match parsed {
        Parsed::Command(command) => {
            handle_command(telegram, ledger, msgs, config, chat_id, command).await;
        }
        Parsed::Invalid { usage_key } => {
            send(telegram, chat_id, &msgs.get(usage_key), None).await;
        }
        Parsed::UnknownSymbol { symbol } => {
            let text = msgs.format(keys::UNKNOWN_SYMBOL, &[("symbol", symbol.as_str())]);
            send(telegram, chat_id, &text, None).await;
        }
        Parsed::NotACommand => {}
    }
}

/// Run one well-formed command against the ledger and reply.
async fn handle_command<S: RangeStore>(
    telegram: &TelegramClient,
    ledger: &LedgerSheet<S>,
    msgs: &Messages,
    config: &AppConfig,
    chat_id: i64,
    command: Command,
) {
    match command {
        Command::Input {
            name,
            amount,
            symbol,
        } => {
            // Waiting message first; it becomes the success card on edit.
            let waiting_id = match telegram
                .send_message(chat_id, &msgs.get(keys::WAITING), None)
                .await
            {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(chat_id, error = %e, "failed to send waiting message");
                    None
                }
            };

            match ledger.append_reading(&name, &amount, &symbol).await {
                Ok(timestamp) => {
                    // Echo what the sheet now holds near this instant.
                    let echo = match ledger.find_recent_reading().await {
                        Ok(Some(found)) => echo_line(&found),
                        Ok(None) => msgs.get(keys::LOOKUP_MISS),
                        Err(e) => {
                            warn!(chat_id, error = %e, "post-insert lookup failed");
                            msgs.get(keys::LOOKUP_MISS)
                        }
                    };

                    let profit = format!("{amount} {symbol}");
                    let link = sheet_link(&config.sheets.spreadsheet_id);
                    let success = msgs.format(
                        keys::INPUT_SUCCESS,
                        &[
                            ("name", name.as_str()),
                            ("profit", profit.as_str()),
                            ("timestamp", timestamp.as_str()),
                            ("echo", echo.as_str()),
                            ("sheet_link", link.as_str()),
                        ],
                    );

                    match waiting_id {
                        Some(id) => {
                            if let Err(e) = telegram
                                .edit_message(chat_id, id, &success, Some("HTML"))
                                .await
                            {
                                warn!(chat_id, error = %e, "failed to edit waiting message");
                            }
                        }
                        None => send(telegram, chat_id, &success, Some("HTML")).await,
                    }
                }
                Err(e) => {
                    warn!(chat_id, error = %e, "insert failed");
                    if let Some(id) = waiting_id
                        && let Err(e) = telegram.delete_message(chat_id, id).await
                    {
                        warn!(chat_id, error = %e, "failed to delete waiting message");
                    }
                    send(telegram, chat_id, &msgs.get(keys::STORE_FAILURE), None).await;
                }
            }
        }

        Command::Edit {
            name,
            amount,
            symbol,
        } => match ledger.edit_reading(&name, &amount, &symbol).await {
            Ok(EditOutcome::Updated { .. }) => {
                let text = msgs.format(keys::EDIT_SUCCESS, &[("name", name.as_str())]);
                send(telegram, chat_id, &text, None).await;
            }
            Ok(EditOutcome::NotFound) => {
                let text = msgs.format(keys::EDIT_MISSING, &[("name", name.as_str())]);
                send(telegram, chat_id, &text, None).await;
            }
            Err(e) => {
                warn!(chat_id, error = %e, "edit failed");
                send(telegram, chat_id, &msgs.get(keys::STORE_FAILURE), None).await;
            }
        },

        Command::DeleteUser { name } => match ledger.delete_readings(&name).await {
            Ok(DeleteOutcome::Deleted { rows }) => {
                info!(chat_id, name = %name, rows, "rows deleted");
                let text = msgs.format(keys::DELETE_SUCCESS, &[("name", name.as_str())]);
                send(telegram, chat_id, &text, None).await;
            }
            Ok(DeleteOutcome::NotFound) => {
                let text = msgs.format(keys::DELETE_MISSING, &[("name", name.as_str())]);
                send(telegram, chat_id, &text, None).await;
            }
            Err(e) => {
                warn!(chat_id, error = %e, "delete failed");
                send(telegram, chat_id, &msgs.get(keys::STORE_FAILURE), None).await;
            }
        },

        Command::Show => match ledger.list_all().await {
            Ok(listing) if listing.is_empty() => {
                send(telegram, chat_id, &msgs.get(keys::SHOW_EMPTY), None).await;
            }
            Ok(listing) => send(telegram, chat_id, &listing, None).await,
            Err(e) => {
                warn!(chat_id, error = %e, "show failed");
                send(telegram, chat_id, &msgs.get(keys::STORE_FAILURE), None).await;
            }
        },

        Command::Help => {
            send(telegram, chat_id, &msgs.get(keys::HELP), Some("HTML")).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Small helpers
// ---------------------------------------------------------------------------

/// Whether this chat may use the data commands.
fn is_authorized(config: &AppConfig, chat_id: i64) -> bool {
    config.telegram.allowed_chat_ids.contains(&chat_id)
}

/// One-line rendering of a reading for the success card.
fn echo_line(reading: &Reading) -> String {
    format!("{}: {}", reading.name, reading.profit_cell())
}

/// Browser link to the spreadsheet.
fn sheet_link(spreadsheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}")
}

/// Send a message, logging instead of failing the loop on error.
async fn send(telegram: &TelegramClient, chat_id: i64, text: &str, parse_mode: Option<&str>) {
    if let Err(e) = telegram.send_message(chat_id, text, parse_mode).await {
        warn!(chat_id, error = %e, "failed to send message");
    }
}
