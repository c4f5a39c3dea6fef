//! Alert events produced by the evaluator.

use crate::{Currency, FixedPoint, Instrument};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Which configured threshold was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThresholdKind {
    /// Price reached or exceeded the high (sell) target.
    High,
    /// Price reached or fell below the low (buy) target.
    Low,
}

impl ThresholdKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ThresholdKind::High => "high",
            ThresholdKind::Low => "low",
        }
    }
}

impl std::fmt::Display for ThresholdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of one reported breach: the instrument plus the exact
/// threshold that triggered. Once recorded, the same breach is never
/// reported again for the life of the state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertKey {
    pub symbol: CompactString,
    pub threshold: FixedPoint,
}

impl AlertKey {
    pub fn new(symbol: &str, threshold: FixedPoint) -> Self {
        Self {
            symbol: CompactString::new(symbol),
            threshold,
        }
    }
}

/// A threshold breach the bot should report. Immutable; produced by the
/// evaluator, consumed by the report builder and the notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub instrument: Instrument,
    pub kind: ThresholdKind,
    /// The threshold that was crossed.
    pub threshold: FixedPoint,
    /// Observed price at the time of the breach.
    pub price: FixedPoint,
    /// Signed distance from the threshold in basis points.
    pub variation_bps: i32,
    /// Currency both price and threshold are expressed in.
    pub currency: Currency,
    pub timestamp_ms: u64,
}

impl AlertEvent {
    /// Deduplication key for this breach.
    pub fn key(&self) -> AlertKey {
        AlertKey::new(&self.instrument.symbol, self.threshold)
    }

    /// Variation in percent, for display.
    pub fn variation_pct(&self) -> f64 {
        self.variation_bps as f64 / 100.0
    }
}
