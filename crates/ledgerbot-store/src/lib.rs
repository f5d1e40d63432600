//! # ledgerbot-store
//!
//! Google Sheets range client for ledgerbot.
//!
//! The sheet is treated as a rectangular store of string cells with exactly
//! two server-side operations: read a whole range, overwrite a whole range.
//! [`RangeStore`] captures that seam; [`SheetsClient`] implements it against
//! the `spreadsheets.values` REST API, authenticating with a service-account
//! JWT exchange (or a pre-issued token during development).

pub mod auth;
pub mod error;
pub mod range;
pub mod sheets;

pub use auth::{ServiceAccountAuth, ServiceAccountKey, TokenProvider};
pub use error::{StoreError, StoreResult};
pub use range::{Cells, RangeSpec, RangeStore};
pub use sheets::SheetsClient;
