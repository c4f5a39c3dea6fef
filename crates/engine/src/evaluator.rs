//! Threshold breach evaluation with per-state deduplication.

use crate::AlertState;
use pricewatch_core::{
    AlertEvent, AlertKey, AlertRule, FixedPoint, PriceObservation, ThresholdKind,
};
use tracing::debug;

/// Whether a fired threshold may fire again within the same state
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RearmPolicy {
    /// One alert per (instrument, threshold) for the life of the state.
    #[default]
    Never,
    /// Forget a fired threshold once the price moves back off it, so
    /// the next crossing alerts again.
    OnRecovery,
}

/// Stateless evaluation core; all memory lives in the `AlertState`
/// passed by the caller, so tests can construct fresh or pre-seeded
/// states and persistence stays a collaborator concern.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    rearm: RearmPolicy,
}

impl Evaluator {
    pub fn new(rearm: RearmPolicy) -> Self {
        Self { rearm }
    }

    /// Decide whether `observation` breaches `rule`.
    ///
    /// Returns at most one event per call and records its key in
    /// `state`. An absent or unevaluable observation produces nothing
    /// and leaves the state untouched. Never fails: bad input is
    /// reported as "no event", not as an error.
    pub fn evaluate(
        &self,
        rule: &AlertRule,
        observation: Option<&PriceObservation>,
        state: &mut AlertState,
    ) -> Option<AlertEvent> {
        let obs = match observation {
            Some(obs) if obs.is_evaluable() => obs,
            _ => return None,
        };
        let price = obs.price;

        let breach = Self::detect_breach(rule, price);

        if self.rearm == RearmPolicy::OnRecovery {
            Self::forget_recovered(rule, price, state);
        }

        let (kind, threshold) = breach?;
        let key = AlertKey::new(&rule.instrument.symbol, threshold);
        if state.contains(&key) {
            debug!(
                symbol = %rule.instrument.symbol,
                threshold = threshold.to_f64(),
                "breach already reported, suppressing"
            );
            return None;
        }
        state.insert(key);

        Some(AlertEvent {
            instrument: rule.instrument.clone(),
            kind,
            threshold,
            price,
            variation_bps: FixedPoint::variation_bps(threshold, price),
            currency: obs.currency,
            timestamp_ms: obs.timestamp_ms,
        })
    }

    /// Breach detection. The high target wins when both are configured;
    /// only one kind fires per call. Both boundaries are inclusive.
    fn detect_breach(rule: &AlertRule, price: FixedPoint) -> Option<(ThresholdKind, FixedPoint)> {
        if let Some(high) = rule.target_high {
            if price >= high {
                return Some((ThresholdKind::High, high));
            }
        }
        if let Some(low) = rule.target_low {
            if price <= low {
                return Some((ThresholdKind::Low, low));
            }
        }
        None
    }

    /// Drop keys for thresholds the price has moved back off.
    fn forget_recovered(rule: &AlertRule, price: FixedPoint, state: &mut AlertState) {
        if let Some(high) = rule.target_high {
            if price < high {
                state.remove(&AlertKey::new(&rule.instrument.symbol, high));
            }
        }
        if let Some(low) = rule.target_low {
            if price > low {
                state.remove(&AlertKey::new(&rule.instrument.symbol, low));
            }
        }
    }
}
