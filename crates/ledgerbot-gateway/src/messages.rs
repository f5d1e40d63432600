//! User-facing message templates loaded from `config/default.toml`.
//!
//! Templates live in the `[messages]` section, nested tables flattened into
//! dot-separated keys (e.g. `input.success`).  Placeholders use
//! `{name}`-style markers.  Built-in defaults cover every key, so a missing
//! or partial config file never leaves the bot speechless.

use std::collections::HashMap;

use tracing::warn;

// ---------------------------------------------------------------------------
// Message keys (compile-time constants to avoid typos)
// ---------------------------------------------------------------------------

pub mod keys {
    // Insert flow
    pub const WAITING: &str = "input.waiting";
    pub const INPUT_SUCCESS: &str = "input.success";
    pub const LOOKUP_MISS: &str = "input.lookup_miss";

    // Edit / delete
    pub const EDIT_SUCCESS: &str = "edit.success";
    pub const EDIT_MISSING: &str = "edit.missing";
    pub const DELETE_SUCCESS: &str = "delete.success";
    pub const DELETE_MISSING: &str = "delete.missing";

    // Errors
    pub const UNAUTHORIZED: &str = "errors.unauthorized";
    pub const STORE_FAILURE: &str = "errors.store";
    pub const UNKNOWN_SYMBOL: &str = "errors.unknown_symbol";

    // Show
    pub const SHOW_EMPTY: &str = "show.empty";

    // Usage lines
    pub const USAGE_INPUT: &str = "usage.input";
    pub const USAGE_EDIT: &str = "usage.edit";
    pub const USAGE_DELETE: &str = "usage.delete";

    // Help
    pub const HELP: &str = "help.text";
}

// ---------------------------------------------------------------------------
// Messages store
// ---------------------------------------------------------------------------

/// Store of user-facing message templates.
#[derive(Debug, Clone)]
pub struct Messages {
    templates: HashMap<String, String>,
}

impl Messages {
    /// Load templates from `config/default.toml`, falling back to the
    /// built-in defaults for anything the file does not override.
    pub fn load() -> Self {
        match std::fs::read_to_string("config/default.toml") {
            Ok(raw) => Self::from_toml_str(&raw),
            Err(_) => Self {
                templates: builtin_templates(),
            },
        }
    }

    /// Build a store from raw TOML, merging `[messages]` over the defaults.
    pub fn from_toml_str(raw: &str) -> Self {
        let mut templates = builtin_templates();

        match raw.parse::<toml::Table>() {
            Ok(table) => {
                if let Some(toml::Value::Table(messages)) = table.get("messages") {
                    flatten_into("", messages, &mut templates);
                }
            }
            Err(e) => warn!(error = %e, "cannot parse config, using built-in messages"),
        }

        Self { templates }
    }

    /// Get the template for a key.
    pub fn get(&self, key: &str) -> String {
        self.templates
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Get a template and substitute `{placeholder}` markers.
    pub fn format(&self, key: &str, substitutions: &[(&str, &str)]) -> String {
        let mut text = self.get(key);
        for (name, value) in substitutions {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }
}

/// Flatten nested TOML tables into dot-separated keys.
fn flatten_into(prefix: &str, table: &toml::Table, out: &mut HashMap<String, String>) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(nested) => flatten_into(&full, nested, out),
            toml::Value::String(s) => {
                out.insert(full, s.clone());
            }
            other => {
                out.insert(full, other.to_string());
            }
        }
    }
}

/// The default template for every key the bot sends.
fn builtin_templates() -> HashMap<String, String> {
    let defaults: &[(&str, &str)] = &[
        (keys::WAITING, "Waiting Input Data..."),
        (
            keys::INPUT_SUCCESS,
            "\u{2705} <b>Data inserted successfully!</b>\n\n\
             \u{1f464} <b>Name:</b> {name}\n\
             \u{1f4b0} <b>Profit:</b> <code>{profit}</code>\n\
             \u{1f4c5} <b>Date Time:</b> {timestamp}\n\n\
             \u{1f4c8} {echo}\n\n\
             <a href='{sheet_link}'>\u{1f310} <b>You can view the Google Sheet here</b></a>",
        ),
        (keys::LOOKUP_MISS, "No data found for the current day."),
        (keys::EDIT_SUCCESS, "Data for {name} edited successfully."),
        (
            keys::EDIT_MISSING,
            "Username '{name}' not found in the spreadsheet.",
        ),
        (keys::DELETE_SUCCESS, "Data for {name} deleted successfully."),
        (
            keys::DELETE_MISSING,
            "No rows found for '{name}' in the spreadsheet.",
        ),
        (
            keys::UNAUTHORIZED,
            "Unauthorized access. This command is not allowed for this chat ID.",
        ),
        (
            keys::STORE_FAILURE,
            "Error talking to the Google Sheet. Please try again.",
        ),
        (
            keys::UNKNOWN_SYMBOL,
            "Unknown symbol '{symbol}'. See /help for the expected format.",
        ),
        (keys::SHOW_EMPTY, "The spreadsheet is empty."),
        (
            keys::USAGE_INPUT,
            "Invalid /input command format. Expected format: '/input name amount symbol'",
        ),
        (
            keys::USAGE_EDIT,
            "Invalid /edit command format. Expected format: '/edit username new_amount new_symbol'",
        ),
        (
            keys::USAGE_DELETE,
            "Invalid /delete_user command format. Expected format: '/delete_user username'",
        ),
        (
            keys::HELP,
            "<b>Available Commands:</b>\n\n\
             /input name amount symbol - Input data into Google Sheet\n\
             /edit username new_amount new_symbol - Edit data in Google Sheet\n\
             /delete_user username - Delete user data from Google Sheet\n\
             /show - Show data from Google Sheet\n",
        ),
    ];

    defaults
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
