//! Application configuration.
//!
//! Reads `config/default.toml`.  Secrets never live in the file: the bot
//! token and the optional pre-issued Sheets token come from the environment
//! (see `helpers::env_non_empty`); the file only points at the
//! service-account key.  Every field except the spreadsheet id has a
//! default.

use anyhow::{Context, Result, bail};

/// Settings from the `[telegram]` section.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Chat ids allowed to use the data commands.  `/help` is always open.
    /// An empty list denies every chat.
    pub allowed_chat_ids: Vec<i64>,
}

/// Settings from the `[sheets]` section.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// The spreadsheet to operate on.  Required.
    pub spreadsheet_id: String,
    /// Worksheet title inside the spreadsheet.
    pub worksheet: String,
    /// Column span of the ledger rows, in A1 notation.
    pub column_span: String,
    /// Path to the service-account key file.
    pub credentials_file: String,
}

/// Settings from the `[ledger]` section.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Half-width of the post-insert lookup window, in seconds.
    pub tolerance_secs: i64,
    /// Fixed UTC offset timestamps are recorded in, in hours.
    pub utc_offset_hours: i32,
}

/// The full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub sheets: SheetsConfig,
    pub ledger: LedgerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {path}"))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from raw TOML.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let table: toml::Table = raw.parse().context("cannot parse config file")?;

        let telegram = table.get("telegram").and_then(|v| v.as_table());
        let sheets = table.get("sheets").and_then(|v| v.as_table());
        let ledger = table.get("ledger").and_then(|v| v.as_table());

        let allowed_chat_ids = telegram
            .and_then(|t| t.get("allowed_chat_ids"))
            .and_then(|v| v.as_array())
            .map(|ids| ids.iter().filter_map(|v| v.as_integer()).collect())
            .unwrap_or_default();

        let spreadsheet_id = sheets
            .and_then(|t| t.get("spreadsheet_id"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        if spreadsheet_id.is_empty() {
            bail!("config is missing required key `sheets.spreadsheet_id`");
        }

        let str_or = |section: Option<&toml::Table>, key: &str, default: &str| {
            section
                .and_then(|t| t.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or(default)
                .to_string()
        };

        Ok(Self {
            telegram: TelegramConfig { allowed_chat_ids },
            sheets: SheetsConfig {
                spreadsheet_id,
                worksheet: str_or(sheets, "worksheet", "Profits"),
                column_span: str_or(sheets, "column_span", "A:C"),
                credentials_file: str_or(
                    sheets,
                    "credentials_file",
                    "credentials/service-account.json",
                ),
            },
            ledger: LedgerConfig {
                tolerance_secs: ledger
                    .and_then(|t| t.get("tolerance_secs"))
                    .and_then(|v| v.as_integer())
                    .map(|v| v.max(1))
                    .unwrap_or(60),
                utc_offset_hours: ledger
                    .and_then(|t| t.get("utc_offset_hours"))
                    .and_then(|v| v.as_integer())
                    .map(|v| v.clamp(-23, 23) as i32)
                    .unwrap_or(7),
            },
        })
    }
}
