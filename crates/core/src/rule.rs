//! Alert rule configuration.

use crate::{Currency, FixedPoint, Instrument};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("rule for {0} has neither a high nor a low target")]
    NoTargets(String),
}

/// One instrument plus its configured price targets.
///
/// Immutable once loaded for a run. At least one target is always set;
/// `AlertRule::new` rejects empty rules at configuration time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    pub instrument: Instrument,
    /// Sell target: alert when price >= this.
    pub target_high: Option<FixedPoint>,
    /// Buy target: alert when price <= this.
    pub target_low: Option<FixedPoint>,
    /// Currency the targets are expressed in. Observations are
    /// normalized to this unit before evaluation.
    pub currency: Currency,
}

impl AlertRule {
    pub fn new(
        instrument: Instrument,
        target_high: Option<FixedPoint>,
        target_low: Option<FixedPoint>,
        currency: Currency,
    ) -> Result<Self, RuleError> {
        if target_high.is_none() && target_low.is_none() {
            return Err(RuleError::NoTargets(instrument.symbol.to_string()));
        }
        Ok(Self {
            instrument,
            target_high,
            target_low,
            currency,
        })
    }

    /// The configured target closest to being breached at `price`,
    /// used as the denominator for displayed variation.
    pub fn display_target(&self, price: FixedPoint) -> FixedPoint {
        match (self.target_high, self.target_low) {
            (Some(high), Some(low)) => {
                let to_high = FixedPoint::variation_bps(high, price).abs();
                let to_low = FixedPoint::variation_bps(low, price).abs();
                if to_high <= to_low {
                    high
                } else {
                    low
                }
            }
            (Some(high), None) => high,
            (None, Some(low)) => low,
            (None, None) => FixedPoint::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn petr() -> Instrument {
        Instrument::new("PETR4", "Petrobras", "")
    }

    #[test]
    fn test_rule_requires_a_target() {
        let err = AlertRule::new(petr(), None, None, Currency::BRL).unwrap_err();
        assert_eq!(err, RuleError::NoTargets("PETR4".to_string()));
    }

    #[test]
    fn test_rule_with_single_target() {
        let rule = AlertRule::new(
            petr(),
            Some(FixedPoint::from_f64(42.0)),
            None,
            Currency::BRL,
        )
        .unwrap();
        assert_eq!(rule.target_high, Some(FixedPoint::from_f64(42.0)));
        assert_eq!(rule.target_low, None);
    }

    #[test]
    fn test_display_target_prefers_closer_threshold() {
        let rule = AlertRule::new(
            petr(),
            Some(FixedPoint::from_f64(42.0)),
            Some(FixedPoint::from_f64(38.0)),
            Currency::BRL,
        )
        .unwrap();

        // 41.5 sits much closer to the high target.
        let near_high = rule.display_target(FixedPoint::from_f64(41.5));
        assert_eq!(near_high, FixedPoint::from_f64(42.0));

        // 38.2 sits much closer to the low target.
        let near_low = rule.display_target(FixedPoint::from_f64(38.2));
        assert_eq!(near_low, FixedPoint::from_f64(38.0));
    }

    #[test]
    fn test_display_target_single() {
        let rule = AlertRule::new(
            petr(),
            None,
            Some(FixedPoint::from_f64(38.0)),
            Currency::BRL,
        )
        .unwrap();
        assert_eq!(
            rule.display_target(FixedPoint::from_f64(50.0)),
            FixedPoint::from_f64(38.0)
        );
    }
}
