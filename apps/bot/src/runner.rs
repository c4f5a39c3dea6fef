//! One evaluation cycle: fetch, evaluate, accumulate the digest.

use crate::config::ResolvedRule;
use pricewatch_core::AlertEvent;
use pricewatch_engine::{AlertState, Evaluator, ReportBuilder};
use pricewatch_sources::{PriceSource, ProviderKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Maps each provider kind to its live source.
#[derive(Default)]
pub struct SourceRegistry {
    sources: HashMap<ProviderKind, Arc<dyn PriceSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ProviderKind, source: Arc<dyn PriceSource>) {
        self.sources.insert(kind, source);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&Arc<dyn PriceSource>> {
        self.sources.get(&kind)
    }
}

/// Everything one cycle produced.
pub struct CycleOutcome {
    /// Breaches to report, in rule order.
    pub events: Vec<AlertEvent>,
    /// Digest text covering every rule.
    pub digest: String,
    /// Rules whose price could not be fetched.
    pub unavailable: usize,
}

/// Evaluate every rule once, in configuration order.
///
/// Rules are polled sequentially with a politeness delay between
/// provider calls. A failed fetch marks the rule unavailable and the
/// cycle moves on.
pub async fn run_cycle(
    rules: &[ResolvedRule],
    registry: &SourceRegistry,
    evaluator: &Evaluator,
    state: &mut AlertState,
    usd_brl: f64,
    politeness_delay: Duration,
) -> CycleOutcome {
    let mut events = Vec::new();
    let mut report = ReportBuilder::new("\u{1F4CA} <b>Price Watch</b>");
    report.push_header_line(format!(
        "\u{1F550} {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));
    report.push_header_line(format!("\u{1F4B5} USD/BRL: {:.4}", usd_brl));

    for (i, resolved) in rules.iter().enumerate() {
        if i > 0 && !politeness_delay.is_zero() {
            tokio::time::sleep(politeness_delay).await;
        }

        let rule = &resolved.rule;
        let symbol = rule.instrument.symbol.as_str();

        let Some(source) = registry.get(resolved.provider) else {
            warn!(symbol, provider = %resolved.provider, "No source for provider");
            report.push_unavailable(rule);
            continue;
        };

        let observation = match source.get_price(symbol).await {
            Ok(obs) => obs.converted_to(rule.currency, usd_brl),
            Err(e) => {
                warn!(
                    symbol,
                    provider = source.name(),
                    transient = e.is_transient(),
                    error = %e,
                    "Price fetch failed"
                );
                report.push_unavailable(rule);
                continue;
            }
        };

        if !observation.is_evaluable() {
            report.push_unavailable(rule);
            continue;
        }

        let fired = evaluator.evaluate(rule, Some(&observation), state);
        debug!(
            symbol,
            price = observation.price.to_f64(),
            fired = fired.is_some(),
            "Evaluated rule"
        );

        report.push_line(rule, &observation, fired.as_ref());
        if let Some(event) = fired {
            events.push(event);
        }
    }

    CycleOutcome {
        events,
        digest: report.build(),
        unavailable: report.unavailable_count(),
    }
}
