//! Telegram Bot API client.
//!
//! The bot needs five methods: `getMe` to verify the token at startup,
//! `getUpdates` to long-poll for commands, and `sendMessage` /
//! `editMessageText` / `deleteMessage` for replies.  All method calls are
//! POSTed to `{BASE_URL}{bot_token}/{method}`.

use serde_json::{Value, json};
use tracing::debug;

use crate::error::{GatewayError, GatewayResult};

/// Telegram Bot API base URL.
const TELEGRAM_API_BASE: &str = "https://api.telegram.org/bot";

/// Reqwest-backed Telegram Bot API client.
pub struct TelegramClient {
    /// Bot token obtained from [@BotFather](https://t.me/BotFather).
    token: String,
    /// HTTP client for making requests.
    http: reqwest::Client,
}

impl TelegramClient {
    /// Create a client for the given bot token.
    pub fn new(token: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("ledgerbot/0.1")
            .build()
            .unwrap_or_default();

        Self {
            token: token.into(),
            http,
        }
    }

    /// Build a full Telegram Bot API URL for the given method.
    fn api_url(&self, method: &str) -> String {
        format!("{}{}/{}", TELEGRAM_API_BASE, self.token, method)
    }

    /// Check a Telegram Bot API response envelope.
    ///
    /// Responses follow the format `{ "ok": true, "result": ... }` on
    /// success, or `{ "ok": false, "error_code": 400, "description": "..." }`
    /// on failure.
    pub fn parse_response(response: &Value, method: &str) -> GatewayResult<()> {
        let ok = response
            .get("ok")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        if !ok {
            let code = response
                .get("error_code")
                .and_then(|v| v.as_i64())
                .unwrap_or(-1);
            let description = response
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error")
                .to_string();
            return Err(GatewayError::Api {
                method: method.to_string(),
                code,
                description,
            });
        }

        Ok(())
    }

    /// POST one API method and return its `result` field.
    async fn call(&self, method: &str, body: Value) -> GatewayResult<Value> {
        let url = self.api_url(method);

        debug!(method, "calling Telegram API");

        let response = self.http.post(&url).json(&body).send().await?;
        let envelope: Value =
            response
                .json()
                .await
                .map_err(|e| GatewayError::MalformedResponse {
                    method: method.to_string(),
                    reason: format!("cannot parse response: {e}"),
                })?;

        Self::parse_response(&envelope, method)?;

        Ok(envelope.get("result").cloned().unwrap_or(Value::Null))
    }

    // -----------------------------------------------------------------------
    // Methods
    // -----------------------------------------------------------------------

    /// Verify the token and return the bot's username.
    pub async fn get_me(&self) -> GatewayResult<String> {
        let result = self.call("getMe", json!({})).await?;
        result
            .get("username")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| GatewayError::MalformedResponse {
                method: "getMe".into(),
                reason: "result is missing `username`".into(),
            })
    }

    /// Send a text message, returning its message id for later edits.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
    ) -> GatewayResult<i64> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(mode) = parse_mode {
            body["parse_mode"] = json!(mode);
        }

        let result = self.call("sendMessage", body).await?;
        result
            .get("message_id")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| GatewayError::MalformedResponse {
                method: "sendMessage".into(),
                reason: "result is missing `message_id`".into(),
            })
    }

    /// Replace the text of a previously sent message.
    pub async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        parse_mode: Option<&str>,
    ) -> GatewayResult<()> {
        let mut body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        });
        if let Some(mode) = parse_mode {
            body["parse_mode"] = json!(mode);
        }

        self.call("editMessageText", body).await?;
        Ok(())
    }

    /// Delete a previously sent message.
    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> GatewayResult<()> {
        self.call(
            "deleteMessage",
            json!({
                "chat_id": chat_id,
                "message_id": message_id,
            }),
        )
        .await?;
        Ok(())
    }

    /// Long-poll for updates starting at `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> GatewayResult<Vec<Value>> {
        let result = self
            .call(
                "getUpdates",
                json!({
                    "offset": offset,
                    "timeout": timeout_secs,
                    "allowed_updates": ["message"],
                }),
            )
            .await?;

        result
            .as_array()
            .cloned()
            .ok_or_else(|| GatewayError::MalformedResponse {
                method: "getUpdates".into(),
                reason: "result is not an array".into(),
            })
    }
}
