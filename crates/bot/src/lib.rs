//! Telegram birthday reminder bot.
//!
//! This crate wires the reminder engine to its collaborators:
//! - `trigger`: the daily cron trigger and the shared run path
//! - `commands` / `handler`: the chat command surface
//! - `poller`: Telegram long polling that feeds the handler

pub mod commands;
pub mod cron;
pub mod handler;
pub mod poller;
pub mod trigger;

pub use commands::Command;
pub use handler::CommandHandler;
pub use trigger::{DailyTrigger, ReminderRunner, RunSummary};
