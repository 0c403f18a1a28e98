//! Message delivery for birthday reminders.
//!
//! This crate provides:
//! - `Notifier` trait for pluggable transports
//! - Telegram Bot API transport (`sendMessage`, `getUpdates` long polling)
//! - Dispatcher that delivers one rendered body per channel

pub mod dispatcher;
pub mod telegram;
pub mod traits;
pub mod updates;

pub use dispatcher::Dispatcher;
pub use telegram::TelegramNotifier;
pub use traits::{DispatchResult, Notifier, NotifyError};
pub use updates::{Chat, IncomingMessage, Update};
