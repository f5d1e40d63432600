//! Google Sheets implementation of the range store.
//!
//! Talks to the `spreadsheets.values` REST surface: `values.get` for whole
//! ranges and `values.update` with `valueInputOption=RAW` for full-range
//! overwrites.  The two calls are the only server-side capability the bot
//! relies on; all row matching happens client-side.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::auth::TokenProvider;
use crate::error::{StoreError, StoreResult};
use crate::range::{Cells, RangeSpec, RangeStore};

/// Base URL for the spreadsheets values API.
const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// REST client for the Google Sheets values API.
pub struct SheetsClient {
    /// HTTP client for making requests.
    http: reqwest::Client,
    /// Bearer-token source for each request.
    auth: TokenProvider,
}

impl SheetsClient {
    /// Create a client that authenticates through the given provider.
    pub fn new(auth: TokenProvider) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("ledgerbot/0.1")
            .build()
            .unwrap_or_default();

        Self { http, auth }
    }

    /// Build the `values` endpoint URL for a range.
    ///
    /// Worksheet titles may contain spaces; they are the only character in
    /// an A1 range that needs escaping here.
    fn values_url(spreadsheet_id: &str, range: &RangeSpec) -> String {
        let a1 = range.a1().replace(' ', "%20");
        format!("{SHEETS_API_BASE}/{spreadsheet_id}/values/{a1}")
    }

    /// Convert one API error body into a typed error.
    ///
    /// Error responses carry an envelope of the form
    /// `{ "error": { "code": 403, "message": "..." } }`.
    fn api_error(status: reqwest::StatusCode, body: &Value) -> StoreError {
        let message = body
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
            .to_string();
        StoreError::Api {
            status: status.as_u16(),
            message,
        }
    }

    /// Extract the `values` grid from a `values.get` response.
    ///
    /// A range with no data at all omits the field entirely; that is an
    /// empty sheet, not an error.
    fn parse_values(body: &Value) -> StoreResult<Vec<Cells>> {
        let Some(values) = body.get("values") else {
            return Ok(Vec::new());
        };

        let rows = values.as_array().ok_or_else(|| {
            StoreError::MalformedResponse("`values` is not an array".into())
        })?;

        rows.iter()
            .map(|row| {
                let cells = row.as_array().ok_or_else(|| {
                    StoreError::MalformedResponse("row in `values` is not an array".into())
                })?;
                Ok(cells.iter().map(Self::cell_to_string).collect())
            })
            .collect()
    }

    /// Render one cell value as the string the sheet displays.
    fn cell_to_string(cell: &Value) -> String {
        match cell {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
impl RangeStore for SheetsClient {
    async fn get_range(&self, spreadsheet_id: &str, range: &RangeSpec) -> StoreResult<Vec<Cells>> {
        let url = Self::values_url(spreadsheet_id, range);
        let token = self.auth.bearer_token().await?;

        debug!(range = %range, "reading sheet range");

        let response = self.http.get(&url).bearer_auth(&token).send().await?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::MalformedResponse(format!("cannot parse get response: {e}")))?;

        if !status.is_success() {
            return Err(Self::api_error(status, &body));
        }

        Self::parse_values(&body)
    }

    async fn put_range(
        &self,
        spreadsheet_id: &str,
        range: &RangeSpec,
        rows: &[Cells],
    ) -> StoreResult<u64> {
        let url = format!(
            "{}?valueInputOption=RAW",
            Self::values_url(spreadsheet_id, range)
        );
        let token = self.auth.bearer_token().await?;

        debug!(range = %range, rows = rows.len(), "overwriting sheet range");

        let response = self
            .http
            .put(&url)
            .bearer_auth(&token)
            .json(&json!({ "values": rows }))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::MalformedResponse(format!("cannot parse put response: {e}")))?;

        if !status.is_success() {
            return Err(Self::api_error(status, &body));
        }

        let updated = body
            .get("updatedCells")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        debug!(range = %range, updated, "sheet range written");

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_url_embeds_id_and_range() {
        let range = RangeSpec::new("Profits", "A:C");
        let url = SheetsClient::values_url("sheet-123", &range);
        assert_eq!(
            url,
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/Profits!A:C"
        );
    }

    #[test]
    fn values_url_escapes_spaces_in_worksheet_title() {
        let range = RangeSpec::new("Q1 Profits", "A:C");
        let url = SheetsClient::values_url("sheet-123", &range);
        assert!(url.ends_with("/values/Q1%20Profits!A:C"));
    }

    #[test]
    fn parse_values_returns_empty_for_missing_field() {
        let body = json!({ "range": "Profits!A:C", "majorDimension": "ROWS" });
        let rows = SheetsClient::parse_values(&body).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn parse_values_extracts_rows_of_strings() {
        let body = json!({
            "values": [
                ["name", "datetime", "profit"],
                ["alice", "2024-01-01 10:00:00", "5 BTC"],
            ]
        });
        let rows = SheetsClient::parse_values(&body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["alice", "2024-01-01 10:00:00", "5 BTC"]);
    }

    #[test]
    fn parse_values_stringifies_numeric_cells() {
        let body = json!({ "values": [["bob", 42]] });
        let rows = SheetsClient::parse_values(&body).unwrap();
        assert_eq!(rows[0], vec!["bob", "42"]);
    }

    #[test]
    fn parse_values_rejects_non_array_grid() {
        let body = json!({ "values": "oops" });
        assert!(matches!(
            SheetsClient::parse_values(&body),
            Err(StoreError::MalformedResponse(_))
        ));
    }

    #[test]
    fn api_error_extracts_envelope_message() {
        let body = json!({ "error": { "code": 403, "message": "The caller does not have permission" } });
        let err = SheetsClient::api_error(reqwest::StatusCode::FORBIDDEN, &body);
        let text = err.to_string();
        assert!(text.contains("403"));
        assert!(text.contains("does not have permission"));
    }

    #[test]
    fn api_error_defaults_message_when_envelope_missing() {
        let err = SheetsClient::api_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &json!({}));
        assert!(err.to_string().contains("unknown error"));
    }
}
