//! Telegram alert delivery for threshold breaches.
//!
//! This crate provides:
//! - Telegram message formatting and sending
//! - SQLite-backed persistence of sent alerts
//! - Best-effort dispatch of a batch of events plus the cycle digest

pub mod notifier;
pub mod store;
pub mod telegram;

pub use notifier::{Dispatcher, DispatchSummary};
pub use store::AlertStore;
pub use telegram::{format_alert_message, TelegramNotifier};
