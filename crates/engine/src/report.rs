//! Digest report accumulation.

use pricewatch_core::{AlertEvent, AlertRule, Currency, FixedPoint, PriceObservation};

/// Format an amount with its currency symbol, decimals scaled to
/// magnitude so sub-unit crypto prices stay readable.
pub fn format_amount(currency: Currency, amount: FixedPoint) -> String {
    let value = amount.to_f64();
    let formatted = if value >= 1.0 {
        format!("{:.2}", value)
    } else if value >= 0.01 {
        format!("{:.4}", value)
    } else {
        format!("{:.6}", value)
    };
    format!("{} {}", currency.symbol(), formatted)
}

/// Accumulates one line per rule, in evaluation order, and produces the
/// cycle digest.
///
/// Ordering is exactly insertion order — the digest is never reordered
/// by price or severity.
#[derive(Debug)]
pub struct ReportBuilder {
    title: String,
    header: Vec<String>,
    lines: Vec<String>,
    fired: usize,
    unavailable: usize,
}

impl ReportBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            header: Vec::new(),
            lines: Vec::new(),
            fired: 0,
            unavailable: 0,
        }
    }

    /// Extra header line shown under the title (timestamp, exchange
    /// rate, ...).
    pub fn push_header_line(&mut self, line: impl Into<String>) {
        self.header.push(line.into());
    }

    /// Line for a rule with a usable observation. `fired` marks lines
    /// whose evaluation produced an alert this cycle.
    pub fn push_line(
        &mut self,
        rule: &AlertRule,
        observation: &PriceObservation,
        fired: Option<&AlertEvent>,
    ) {
        let target = rule.display_target(observation.price);
        let pct = FixedPoint::variation_pct(target, observation.price);

        let tag = if rule.instrument.tag.is_empty() {
            if pct > 0.0 {
                "\u{1F7E2}"
            } else if pct < 0.0 {
                "\u{1F534}"
            } else {
                "\u{26AA}"
            }
        } else {
            rule.instrument.tag.as_str()
        };
        let marker = if fired.is_some() { " \u{1F6A8}" } else { "" };

        self.lines.push(format!(
            "{} <b>{}</b>: {} ({:+.2}%){}",
            tag,
            rule.instrument.display_name(),
            format_amount(observation.currency, observation.price),
            pct,
            marker,
        ));
        if fired.is_some() {
            self.fired += 1;
        }
    }

    /// Line for a rule whose price could not be fetched.
    pub fn push_unavailable(&mut self, rule: &AlertRule) {
        self.lines.push(format!(
            "\u{274C} <b>{}</b>: price unavailable",
            rule.instrument.display_name()
        ));
        self.unavailable += 1;
    }

    /// Number of alerts fired this cycle.
    pub fn fired_count(&self) -> usize {
        self.fired
    }

    pub fn unavailable_count(&self) -> usize {
        self.unavailable
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Final digest text.
    pub fn build(&self) -> String {
        let mut digest = self.title.clone();
        for line in &self.header {
            digest.push('\n');
            digest.push_str(line);
        }
        digest.push('\n');
        for line in &self.lines {
            digest.push('\n');
            digest.push_str(line);
        }
        digest.push('\n');
        if self.fired > 0 {
            digest.push_str(&format!(
                "\n\u{1F514} <b>{} alert(s) fired this cycle</b>",
                self.fired
            ));
        } else {
            digest.push_str("\n\u{2705} No alerts fired this cycle");
        }
        digest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pricewatch_core::{Instrument, ThresholdKind};

    fn rule(symbol: &str, high: f64) -> AlertRule {
        AlertRule::new(
            Instrument::new(symbol, symbol, ""),
            Some(FixedPoint::from_f64(high)),
            None,
            Currency::BRL,
        )
        .unwrap()
    }

    fn obs(symbol: &str, price: f64) -> PriceObservation {
        PriceObservation::new(symbol, FixedPoint::from_f64(price), Currency::BRL)
    }

    fn event_for(rule: &AlertRule, price: f64) -> AlertEvent {
        let threshold = rule.target_high.unwrap();
        let price = FixedPoint::from_f64(price);
        AlertEvent {
            instrument: rule.instrument.clone(),
            kind: ThresholdKind::High,
            threshold,
            price,
            variation_bps: FixedPoint::variation_bps(threshold, price),
            currency: Currency::BRL,
            timestamp_ms: 0,
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(
            format_amount(Currency::BRL, FixedPoint::from_f64(37.5)),
            "R$ 37.50"
        );
        assert_eq!(
            format_amount(Currency::USD, FixedPoint::from_f64(45000.0)),
            "US$ 45000.00"
        );
        assert_eq!(
            format_amount(Currency::USD, FixedPoint::from_f64(0.0234)),
            "US$ 0.0234"
        );
    }

    #[test]
    fn test_lines_keep_rule_order() {
        let mut report = ReportBuilder::new("<b>Report</b>");
        report.push_line(&rule("ZZZ", 10.0), &obs("ZZZ", 5.0), None);
        report.push_unavailable(&rule("AAA", 10.0));
        report.push_line(&rule("MMM", 10.0), &obs("MMM", 20.0), None);

        let digest = report.build();
        let zzz = digest.find("ZZZ").unwrap();
        let aaa = digest.find("AAA").unwrap();
        let mmm = digest.find("MMM").unwrap();
        assert!(zzz < aaa && aaa < mmm);
    }

    #[test]
    fn test_fired_count_and_marker() {
        let r = rule("PETR4", 42.0);
        let mut report = ReportBuilder::new("<b>Report</b>");
        report.push_line(&r, &obs("PETR4", 43.0), Some(&event_for(&r, 43.0)));
        report.push_line(&rule("VALE3", 65.0), &obs("VALE3", 60.0), None);

        assert_eq!(report.fired_count(), 1);
        let digest = report.build();
        assert!(digest.contains("\u{1F6A8}"));
        assert!(digest.contains("1 alert(s) fired this cycle"));
    }

    #[test]
    fn test_no_alerts_footer() {
        let mut report = ReportBuilder::new("<b>Report</b>");
        report.push_line(&rule("PETR4", 42.0), &obs("PETR4", 40.0), None);
        assert_eq!(report.fired_count(), 0);
        assert!(report.build().contains("No alerts fired"));
    }

    #[test]
    fn test_unavailable_line() {
        let mut report = ReportBuilder::new("<b>Report</b>");
        report.push_unavailable(&rule("PETR4", 42.0));
        assert_eq!(report.unavailable_count(), 1);
        assert!(report.build().contains("price unavailable"));
    }

    #[test]
    fn test_header_lines_under_title() {
        let mut report = ReportBuilder::new("<b>Report</b>");
        report.push_header_line("\u{1F550} 2026-08-24 12:00 UTC");
        report.push_header_line("\u{1F4B5} USD/BRL: 5.40");
        let digest = report.build();
        let title = digest.find("Report").unwrap();
        let stamp = digest.find("2026-08-24").unwrap();
        let rate = digest.find("USD/BRL").unwrap();
        assert!(title < stamp && stamp < rate);
    }

    #[test]
    fn test_display_variation_without_breach() {
        let r = AlertRule::new(
            Instrument::new("PETR4", "Petrobras", ""),
            Some(FixedPoint::from_f64(42.0)),
            Some(FixedPoint::from_f64(38.0)),
            Currency::BRL,
        )
        .unwrap();
        let mut report = ReportBuilder::new("r");
        report.push_line(&r, &obs("PETR4", 41.5), None);
        let digest = report.build();
        // Variation against the closer (high) target: (41.5-42)/42 = -1.19%
        assert!(digest.contains("-1.19%"), "digest: {digest}");
    }
}
