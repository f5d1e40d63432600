//! Command parsing for the group-chat surface.
//!
//! Commands are plain text: a `/name` head followed by whitespace-separated
//! arguments.  Extra arguments are ignored, matching how operators actually
//! type.  Ticker symbols are upper-cased; `/input` additionally validates
//! them against the known list before any store access happens.

use crate::messages::keys;

/// Ticker symbols accepted by `/input`.
pub const KNOWN_SYMBOLS: &[&str] = &[
    "BTC", "ETH", "TRX", "BNB", "LTC", "DOGE", "BUSD", "XRP", "EOS", "UNI", "SHIB", "USDT", "BCH",
    "ADA", "DOT", "LINK", "MATIC", "XLM", "ETC", "VET", "SOL", "FIL", "CAKE", "ATOM", "XEM",
    "ALGO", "XTZ", "WBTC", "USDC", "DAI", "AAVE", "AVAX", "SUSHI", "SNX", "MKR", "COMP", "ICX",
    "FTT", "HOT", "OKB", "DASH", "YFI", "THETA", "BTT", "BAND", "SRM", "HT", "CEL", "CRV", "CHZ",
    "NEO", "CELO", "XMR", "MIOTA", "LEO", "DCR", "MANA", "STX", "WAVES", "ZRX", "LUNA", "RUNE",
    "FTM", "DGB", "ZEC", "ENJ", "REN", "GRT", "KSM", "NANO", "DENT", "RVN", "HNT", "LSK", "OMG",
    "ONE", "FLOW", "SXP", "QTUM", "WIN", "NEXO", "ONT", "IOST", "TUSD", "ZIL",
];

/// Whether `/input` accepts this (already upper-cased) ticker.
pub fn is_known_symbol(symbol: &str) -> bool {
    KNOWN_SYMBOLS.contains(&symbol)
}

/// A fully parsed bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/input name amount symbol` -- append a reading.
    Input {
        name: String,
        amount: String,
        symbol: String,
    },
    /// `/edit username new_amount new_symbol` -- rewrite a user's row.
    Edit {
        name: String,
        amount: String,
        symbol: String,
    },
    /// `/delete_user username` -- remove a user's rows.
    DeleteUser { name: String },
    /// `/show` -- dump the sheet.
    Show,
    /// `/help` -- list commands.
    Help,
}

/// Outcome of parsing one incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// A well-formed command.
    Command(Command),
    /// One of our commands with missing arguments; reply with the usage
    /// template behind `usage_key`.
    Invalid { usage_key: &'static str },
    /// `/input` with a ticker outside [`KNOWN_SYMBOLS`].
    UnknownSymbol { symbol: String },
    /// Not a command of ours; ignore silently.
    NotACommand,
}

/// Parse one message text.
pub fn parse(text: &str) -> Parsed {
    let mut parts = text.split_whitespace();
    let Some(head) = parts.next() else {
        return Parsed::NotACommand;
    };
    if !head.starts_with('/') {
        return Parsed::NotACommand;
    }
    let args: Vec<&str> = parts.collect();

    match head {
        "/input" => {
            if args.len() < 3 {
                return Parsed::Invalid {
                    usage_key: keys::USAGE_INPUT,
                };
            }
            let symbol = args[2].to_uppercase();
            if !is_known_symbol(&symbol) {
                return Parsed::UnknownSymbol { symbol };
            }
            Parsed::Command(Command::Input {
                name: args[0].to_string(),
                amount: args[1].to_string(),
                symbol,
            })
        }
        "/edit" => {
            if args.len() < 3 {
                return Parsed::Invalid {
                    usage_key: keys::USAGE_EDIT,
                };
            }
            Parsed::Command(Command::Edit {
                name: args[0].to_string(),
                amount: args[1].to_string(),
                symbol: args[2].to_uppercase(),
            })
        }
        "/delete_user" => match args.first() {
            Some(name) => Parsed::Command(Command::DeleteUser {
                name: (*name).to_string(),
            }),
            None => Parsed::Invalid {
                usage_key: keys::USAGE_DELETE,
            },
        },
        "/show" => Parsed::Command(Command::Show),
        "/help" => Parsed::Command(Command::Help),
        _ => Parsed::NotACommand,
    }
}
