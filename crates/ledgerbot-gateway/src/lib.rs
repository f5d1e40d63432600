//! # ledgerbot-gateway
//!
//! The chat-facing half of ledgerbot: a Telegram Bot API client, the
//! command grammar, and the user-facing message templates.  The gateway
//! knows nothing about spreadsheets -- it hands parsed commands to the
//! caller and renders whatever the caller decides to say.

pub mod command;
pub mod error;
pub mod messages;
pub mod telegram;

pub use command::{Command, KNOWN_SYMBOLS, Parsed, is_known_symbol, parse};
pub use error::{GatewayError, GatewayResult};
pub use messages::{Messages, keys};
pub use telegram::TelegramClient;
