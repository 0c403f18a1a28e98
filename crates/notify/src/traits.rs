//! Notifier trait definition and shared error types.

use bday_core::ChannelId;

/// Errors that can occur during message delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// Trait for transport implementations.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one text body to a channel. Fire-and-forget: no retries.
    async fn send(&self, channel: ChannelId, text: &str) -> Result<(), NotifyError>;

    /// Human-readable name for this transport (e.g., "telegram").
    fn channel_name(&self) -> &str;
}

/// Result of delivering a body to a single channel.
#[derive(Debug)]
pub struct DispatchResult {
    pub channel: ChannelId,
    pub transport: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}
