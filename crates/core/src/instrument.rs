//! Tracked instrument definitions.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A tradable asset tracked by an alert rule: a B3 ticker, a crypto
/// symbol or a macro series id, depending on the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// Provider-specific symbol (e.g. "PETR4", "BTC-USD", "SELIC").
    pub symbol: CompactString,
    /// Human-readable name shown in reports.
    pub name: CompactString,
    /// Cosmetic emoji tag; ignored by the engine.
    pub tag: CompactString,
}

impl Instrument {
    pub fn new(symbol: &str, name: &str, tag: &str) -> Self {
        Self {
            symbol: CompactString::new(symbol),
            name: CompactString::new(name),
            tag: CompactString::new(tag),
        }
    }

    /// Name for report lines, falling back to the symbol.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.symbol
        } else {
            &self.name
        }
    }
}
