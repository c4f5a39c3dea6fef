//! Best-effort delivery of a cycle's alerts and digest.

use crate::store::AlertStore;
use crate::telegram::{format_alert_message, TelegramNotifier};
use pricewatch_core::AlertEvent;
use tracing::{error, info};

/// What happened during one dispatch pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub alerts_sent: u32,
    pub alerts_failed: u32,
    pub digest_sent: bool,
}

/// Sends individual alerts followed by the digest.
///
/// Delivery is best-effort: a failed send is logged and skipped, it
/// never aborts the batch and is never retried within the cycle. The
/// in-memory state keeps the key either way, so a breach whose message
/// was lost stays suppressed like any other.
pub struct Dispatcher {
    notifier: TelegramNotifier,
    store: Option<AlertStore>,
}

impl Dispatcher {
    pub fn new(notifier: TelegramNotifier) -> Self {
        Self {
            notifier,
            store: None,
        }
    }

    /// Also persist each delivered alert to the store.
    pub fn with_store(mut self, store: AlertStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Send every event as its own message, then the digest.
    pub async fn dispatch(&self, events: &[AlertEvent], digest: &str) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for event in events {
            let message = format_alert_message(event);
            match self.notifier.send(&message).await {
                Ok(()) => {
                    info!(
                        symbol = %event.instrument.symbol,
                        kind = event.kind.as_str(),
                        threshold = %event.threshold,
                        "Alert sent"
                    );
                    summary.alerts_sent += 1;

                    if let Some(ref store) = self.store {
                        if let Err(e) = store.record(event).await {
                            error!(error = %e, "Failed to persist alert");
                        }
                    }
                }
                Err(e) => {
                    error!(
                        symbol = %event.instrument.symbol,
                        error = %e,
                        "Failed to send alert"
                    );
                    summary.alerts_failed += 1;
                }
            }
        }

        match self.notifier.send(digest).await {
            Ok(()) => summary.digest_sent = true,
            Err(e) => error!(error = %e, "Failed to send digest"),
        }

        summary
    }
}
