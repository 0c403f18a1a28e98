//! Delivers rendered reminder bodies, one per channel.
//!
//! Individual channel failures are logged and recorded but don't block
//! delivery to the remaining channels.

use std::sync::Arc;

use bday_core::ChannelId;

use crate::traits::{DispatchResult, Notifier};

/// Routes per-channel bodies to a single transport.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Notifier>) -> Self {
        Self { transport }
    }

    /// The underlying transport (used for direct command replies).
    pub fn transport(&self) -> &Arc<dyn Notifier> {
        &self.transport
    }

    /// Deliver every `(channel, body)` pair in order.
    ///
    /// Returns one result per channel. There are no retries: a failed
    /// channel is reported and skipped.
    pub async fn deliver<'a, I>(&self, messages: I) -> Vec<DispatchResult>
    where
        I: IntoIterator<Item = (&'a ChannelId, &'a String)>,
    {
        let mut results = Vec::new();

        for (channel, body) in messages {
            let start = std::time::Instant::now();
            let result = self.transport.send(*channel, body).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let (success, error) = match result {
                Ok(()) => {
                    tracing::info!(
                        chat_id = %channel,
                        transport = self.transport.channel_name(),
                        duration_ms,
                        "Reminder delivered"
                    );
                    (true, None)
                }
                Err(e) => {
                    tracing::warn!(
                        chat_id = %channel,
                        transport = self.transport.channel_name(),
                        error = %e,
                        duration_ms,
                        "Reminder delivery failed"
                    );
                    (false, Some(e.to_string()))
                }
            };

            results.push(DispatchResult {
                channel: *channel,
                transport: self.transport.channel_name().to_string(),
                success,
                error,
                duration_ms,
            });
        }

        results
    }
}
