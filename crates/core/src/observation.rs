//! Price observations produced by market data sources.

use crate::{convert, Currency, FixedPoint};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

/// One price reading for one instrument.
///
/// Produced fresh each polling cycle, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Provider symbol this reading belongs to.
    pub symbol: CompactString,
    /// Observed price; zero means the source returned no usable value.
    pub price: FixedPoint,
    /// Currency the price is quoted in.
    pub currency: Currency,
    /// Observation timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl PriceObservation {
    pub fn new(symbol: &str, price: FixedPoint, currency: Currency) -> Self {
        Self {
            symbol: CompactString::new(symbol),
            price,
            currency,
            timestamp_ms: now_ms(),
        }
    }

    /// False when the source returned a zero or invalid price.
    #[inline]
    pub fn is_evaluable(&self) -> bool {
        !self.price.is_zero()
    }

    /// Copy of this observation normalized to `currency` using the
    /// USD/BRL rate. Same-currency normalization is a plain clone.
    pub fn converted_to(&self, currency: Currency, usd_brl: f64) -> Self {
        if self.currency == currency {
            return self.clone();
        }
        Self {
            symbol: self.symbol.clone(),
            price: convert(self.price, self.currency, currency, usd_brl),
            currency,
            timestamp_ms: self.timestamp_ms,
        }
    }
}
