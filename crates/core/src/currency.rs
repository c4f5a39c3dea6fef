//! Currency units and conversion.

use crate::FixedPoint;
use serde::{Deserialize, Serialize};

/// Fallback USD/BRL rate used when a live rate cannot be fetched.
pub const DEFAULT_USD_BRL: f64 = 5.40;

/// Currency an amount is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Brazilian Real
    BRL,
    /// US Dollar
    USD,
}

impl Currency {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BRL" => Some(Currency::BRL),
            "USD" => Some(Currency::USD),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Currency::BRL => "BRL",
            Currency::USD => "USD",
        }
    }

    /// Display prefix for formatted amounts.
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::BRL => "R$",
            Currency::USD => "US$",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::BRL
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Convert an amount between currencies using the USD/BRL rate
/// (BRL per 1 USD). Same-currency conversion is the identity; a
/// non-positive rate yields zero rather than an error.
pub fn convert(amount: FixedPoint, from: Currency, to: Currency, usd_brl: f64) -> FixedPoint {
    match (from, to) {
        (Currency::USD, Currency::BRL) => FixedPoint::from_f64(amount.to_f64() * usd_brl),
        (Currency::BRL, Currency::USD) if usd_brl > 0.0 => {
            FixedPoint::from_f64(amount.to_f64() / usd_brl)
        }
        (Currency::BRL, Currency::USD) => FixedPoint::ZERO,
        _ => amount,
    }
}
