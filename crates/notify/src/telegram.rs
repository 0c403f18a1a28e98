//! Telegram Bot API transport.
//!
//! Delivers message bodies via `sendMessage` and long-polls `getUpdates`
//! for incoming chat commands. Rate limit responses surface as
//! [`NotifyError::RateLimited`]; nothing is retried here.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use bday_core::ChannelId;

use crate::traits::{Notifier, NotifyError};
use crate::updates::Update;

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default = "Option::default")]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

/// Resolve a `${VAR}` token reference against the environment.
fn resolve_token(bot_token: String) -> Result<String, NotifyError> {
    if !bot_token.starts_with("${") {
        return Ok(bot_token);
    }
    let var_name = bot_token
        .strip_prefix("${")
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| NotifyError::Config(format!("Malformed env var reference: {bot_token}")))?;
    std::env::var(var_name)
        .map_err(|_| NotifyError::Config(format!("Environment variable '{var_name}' is not set")))
}

/// Sends messages and polls updates via the Telegram Bot API.
#[derive(Debug)]
pub struct TelegramNotifier {
    bot_token: String,
    api_url: String,
    parse_mode: Option<String>,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Creates a new `TelegramNotifier` from configuration values.
    ///
    /// If `bot_token` starts with `${`, the value between `${` and `}` is
    /// resolved as an environment variable name. Returns
    /// [`NotifyError::Config`] if the token is empty or the env var is missing.
    pub fn from_config(
        bot_token: String,
        api_url: String,
        parse_mode: Option<String>,
    ) -> Result<Self, NotifyError> {
        let resolved_token = resolve_token(bot_token)?;
        if resolved_token.is_empty() {
            return Err(NotifyError::Config(
                "Telegram bot token must not be empty".to_string(),
            ));
        }

        Ok(Self {
            bot_token: resolved_token,
            api_url: api_url.trim_end_matches('/').to_string(),
            parse_mode,
            client: reqwest::Client::new(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.bot_token, method)
    }

    /// POST a Bot API method and unwrap its `result`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, NotifyError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let resp: ApiResponse<T> = response.json().await?;

        if resp.ok {
            return resp
                .result
                .ok_or_else(|| NotifyError::Api(format!("{method}: response without result")));
        }

        // Handle rate limiting (HTTP 429).
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || resp.error_code == Some(429) {
            let retry_after = resp
                .parameters
                .and_then(|p| p.retry_after)
                .unwrap_or(30);
            return Err(NotifyError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let description = resp
            .description
            .unwrap_or_else(|| "Unknown Telegram API error".to_string());
        Err(NotifyError::Api(format!("{method}: {description}")))
    }

    /// Long-poll for updates newer than `offset`.
    ///
    /// Only `message` updates are requested; the call blocks server-side for
    /// up to `timeout_secs` when nothing is pending.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, NotifyError> {
        let mut body = serde_json::json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = serde_json::Value::from(offset);
        }
        self.call("getUpdates", &body).await
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    /// Sends a message via the Telegram `sendMessage` API.
    async fn send(&self, channel: ChannelId, text: &str) -> Result<(), NotifyError> {
        let mut body = serde_json::json!({
            "chat_id": channel.0,
            "text": text,
        });

        if let Some(ref mode) = self.parse_mode {
            body["parse_mode"] = serde_json::Value::String(mode.clone());
        }

        tracing::debug!(
            chat_id = %channel,
            parse_mode = ?self.parse_mode,
            "Sending Telegram message"
        );

        let _sent: serde_json::Value = self.call("sendMessage", &body).await?;
        tracing::info!(chat_id = %channel, "Telegram message sent");
        Ok(())
    }

    /// Returns the channel name for this notifier.
    fn channel_name(&self) -> &str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const API: &str = "https://api.telegram.org";

    #[test]
    fn test_env_var_resolution() {
        std::env::set_var("BDAY_TEST_TG_BOT_TOKEN", "123:ABC");
        let notifier = TelegramNotifier::from_config(
            "${BDAY_TEST_TG_BOT_TOKEN}".to_string(),
            API.to_string(),
            None,
        )
        .expect("should resolve env var");
        assert_eq!(notifier.bot_token, "123:ABC");
        std::env::remove_var("BDAY_TEST_TG_BOT_TOKEN");
    }

    #[test]
    fn test_env_var_missing() {
        let result = TelegramNotifier::from_config(
            "${NONEXISTENT_VAR_TELEGRAM_XYZ}".to_string(),
            API.to_string(),
            None,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("NONEXISTENT_VAR_TELEGRAM_XYZ"));
    }

    #[test]
    fn test_malformed_reference() {
        let err = TelegramNotifier::from_config("${OOPS".to_string(), API.to_string(), None)
            .unwrap_err()
            .to_string();
        assert!(err.contains("Malformed"));
    }

    #[test]
    fn test_empty_token_rejected() {
        let result = TelegramNotifier::from_config(String::new(), API.to_string(), None);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("must not be empty"));
    }

    #[test]
    fn test_method_url_strips_trailing_slash() {
        let notifier = TelegramNotifier::from_config(
            "123456:ABC-DEF".to_string(),
            "http://localhost:8081/".to_string(),
            None,
        )
        .unwrap();
        assert_eq!(
            notifier.method_url("sendMessage"),
            "http://localhost:8081/bot123456:ABC-DEF/sendMessage"
        );
        assert_eq!(notifier.channel_name(), "telegram");
    }

    #[test]
    fn test_api_response_error_shape() {
        let raw = r#"{"ok":false,"error_code":429,"description":"Too Many Requests","parameters":{"retry_after":12}}"#;
        let resp: ApiResponse<serde_json::Value> = serde_json::from_str(raw).unwrap();
        assert!(!resp.ok);
        assert_eq!(resp.error_code, Some(429));
        assert_eq!(resp.parameters.and_then(|p| p.retry_after), Some(12));
    }

    #[test]
    fn test_api_response_updates_shape() {
        let raw = r#"{"ok":true,"result":[{"update_id":3,"message":{"message_id":1,"chat":{"id":9},"text":"/start"}}]}"#;
        let resp: ApiResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        let updates = resp.result.unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].update_id, 3);
    }
}
