//! The provider capability.

use crate::SourceError;
use async_trait::async_trait;
use pricewatch_core::PriceObservation;
use serde::{Deserialize, Serialize};

/// A market data provider: instrument symbol in, current price out.
///
/// Implementations translate every network or format failure into a
/// `SourceError`; they never panic on bad provider data.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// Fetch the current price for one instrument.
    async fn get_price(&self, symbol: &str) -> Result<PriceObservation, SourceError>;
}

/// Which provider serves an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// brapi.dev quotes for B3 equities.
    Brapi,
    /// Yahoo Finance chart API for crypto and FX.
    Yahoo,
    /// FRED macro series.
    Fred,
}

impl ProviderKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "brapi" => Some(ProviderKind::Brapi),
            "yahoo" => Some(ProviderKind::Yahoo),
            "fred" => Some(ProviderKind::Fred),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Brapi => "brapi",
            ProviderKind::Yahoo => "yahoo",
            ProviderKind::Fred => "fred",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!(ProviderKind::from_str("brapi"), Some(ProviderKind::Brapi));
        assert_eq!(ProviderKind::from_str("YAHOO"), Some(ProviderKind::Yahoo));
        assert_eq!(ProviderKind::from_str("binance"), None);
    }

    #[test]
    fn test_provider_kind_serde() {
        let json = serde_json::to_string(&ProviderKind::Fred).unwrap();
        assert_eq!(json, "\"fred\"");
        let parsed: ProviderKind = serde_json::from_str("\"brapi\"").unwrap();
        assert_eq!(parsed, ProviderKind::Brapi);
    }
}
