//! # ledgerbot-ledger
//!
//! Row-level logic for the profit sheet: a typed [`Reading`] record, the
//! fixed-zone timestamp convention, and the five operations the bot's
//! commands translate into -- append, time-windowed lookup, edit by name,
//! delete by name, list.
//!
//! Every operation re-reads the full sheet before acting and overwrites the
//! full range on write; nothing is cached between calls.  The store behind
//! [`LedgerSheet`] is any [`ledgerbot_store::RangeStore`], so tests run
//! against an in-memory implementation.

pub mod error;
pub mod reading;
pub mod sheet;

pub use error::{LedgerError, LedgerResult};
pub use reading::{Reading, TIMESTAMP_FORMAT, format_timestamp, name_matches, parse_timestamp};
pub use sheet::{DeleteOutcome, EditOutcome, LedgerSheet};
