//! Telegram long polling: fetch updates, run commands, reply in the same chat.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use bday_core::ChannelId;
use bday_notify::{Notifier, NotifyError, TelegramNotifier, Update};

use crate::commands::Command;
use crate::handler::CommandHandler;

/// Pause after a failed `getUpdates` call that carries no retry hint.
const ERROR_BACKOFF: Duration = Duration::from_secs(3);

pub const COMMAND_FAILED: &str = "Something went wrong, please try again later.";

/// Poll `getUpdates` until `shutdown` flips to true.
pub async fn poll_commands(
    notifier: Arc<TelegramNotifier>,
    handler: Arc<CommandHandler>,
    timeout_secs: u64,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(timeout_secs, "command polling started");
    let mut offset: Option<i64> = None;

    loop {
        if *shutdown.borrow() {
            break;
        }

        let polled = tokio::select! {
            polled = notifier.get_updates(offset, timeout_secs) => polled,
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
        };

        let updates = match polled {
            Ok(updates) => updates,
            Err(NotifyError::RateLimited { retry_after_secs }) => {
                warn!(retry_after_secs, "getUpdates rate limited");
                if !pause(Duration::from_secs(retry_after_secs), &mut shutdown).await {
                    break;
                }
                continue;
            }
            Err(e) => {
                warn!(error = %e, "getUpdates failed");
                if !pause(ERROR_BACKOFF, &mut shutdown).await {
                    break;
                }
                continue;
            }
        };

        for update in updates {
            offset = Some(next_offset(offset, &update));
            let Some((chat, command)) = extract_command(&update) else {
                continue;
            };
            let reply = match handler.handle(chat, command).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(chat_id = %chat, error = %e, "command failed");
                    COMMAND_FAILED.to_string()
                }
            };
            if let Err(e) = notifier.send(chat, &reply).await {
                warn!(chat_id = %chat, error = %e, "failed to send command reply");
            }
        }
    }

    info!("command polling stopped");
}

/// Sleep for `duration` unless shutdown is requested first.
/// Returns `false` when polling should stop.
async fn pause(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return false;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        changed = shutdown.changed() => changed.is_ok() && !*shutdown.borrow(),
    }
}

/// Offset to confirm everything up to and including `update`.
fn next_offset(current: Option<i64>, update: &Update) -> i64 {
    let next = update.update_id + 1;
    current.map_or(next, |c| c.max(next))
}

/// Chat and parsed command of a text message, if it is one.
fn extract_command(update: &Update) -> Option<(ChannelId, Command)> {
    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?;
    let command = Command::parse(text)?;
    debug!(chat_id = message.chat.id, ?command, "command received");
    Some((ChannelId(message.chat.id), command))
}
