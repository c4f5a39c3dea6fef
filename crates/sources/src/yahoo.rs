//! Yahoo Finance chart fetcher for crypto and FX symbols.

use crate::{PriceSource, SourceError};
use async_trait::async_trait;
use pricewatch_core::{Currency, FixedPoint, PriceObservation};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Quotes from the Yahoo Finance chart API. Serves crypto pairs
/// ("BTC-USD"), FX ("USDBRL=X") and most listed tickers.
pub struct YahooSource {
    client: reqwest::Client,
    base_url: String,
}

impl YahooSource {
    const BASE_URL: &'static str = "https://query1.finance.yahoo.com";

    pub fn new() -> Self {
        Self::with_base_url(Self::BASE_URL)
    }

    /// Override the endpoint, e.g. for a local stub.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, symbol: &str) -> Result<serde_json::Value, SourceError> {
        let url = format!(
            "{}/v8/finance/chart/{}?range=1d&interval=1m",
            self.base_url, symbol
        );
        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

impl Default for YahooSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the regular market price and quote currency from a chart
/// payload. Response shape:
/// {"chart":{"result":[{"meta":{"regularMarketPrice":...,"currency":"USD"}}]}}
fn parse_chart(symbol: &str, json: &serde_json::Value) -> Result<(f64, Currency), SourceError> {
    let result = json["chart"]["result"]
        .as_array()
        .and_then(|r| r.first())
        .ok_or_else(|| SourceError::NoData(symbol.to_string()))?;

    let meta = &result["meta"];
    let price = meta["regularMarketPrice"]
        .as_f64()
        .ok_or_else(|| SourceError::Parse(format!("{}: regularMarketPrice missing", symbol)))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(SourceError::NoData(symbol.to_string()));
    }

    let currency = meta["currency"]
        .as_str()
        .and_then(Currency::from_str)
        .unwrap_or(Currency::USD);

    Ok((price, currency))
}

#[async_trait]
impl PriceSource for YahooSource {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn get_price(&self, symbol: &str) -> Result<PriceObservation, SourceError> {
        debug!(symbol, "fetching yahoo chart");
        let json = self.fetch(symbol).await?;
        let (price, currency) = parse_chart(symbol, &json)?;
        Ok(PriceObservation::new(
            symbol,
            FixedPoint::from_f64(price),
            currency,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chart_json(price: f64, currency: &str) -> serde_json::Value {
        serde_json::json!({
            "chart": {
                "result": [{
                    "meta": {
                        "regularMarketPrice": price,
                        "currency": currency,
                        "symbol": "BTC-USD"
                    }
                }],
                "error": null
            }
        })
    }

    #[test]
    fn test_parse_chart() {
        let (price, currency) = parse_chart("BTC-USD", &chart_json(45000.0, "USD")).unwrap();
        assert_eq!(price, 45000.0);
        assert_eq!(currency, Currency::USD);
    }

    #[test]
    fn test_parse_chart_brl_currency() {
        let (_, currency) = parse_chart("PETR4.SA", &chart_json(37.5, "BRL")).unwrap();
        assert_eq!(currency, Currency::BRL);
    }

    #[test]
    fn test_parse_chart_unknown_currency_defaults_to_usd() {
        let (_, currency) = parse_chart("BTC-EUR", &chart_json(42000.0, "EUR")).unwrap();
        assert_eq!(currency, Currency::USD);
    }

    #[test]
    fn test_parse_chart_no_result() {
        let json = serde_json::json!({"chart": {"result": null, "error": "Not Found"}});
        assert!(matches!(
            parse_chart("NOPE", &json),
            Err(SourceError::NoData(_))
        ));
    }

    #[test]
    fn test_parse_chart_rejects_non_positive() {
        assert!(matches!(
            parse_chart("BTC-USD", &chart_json(-1.0, "USD")),
            Err(SourceError::NoData(_))
        ));
    }

    #[tokio::test]
    async fn test_get_price_from_stub() {
        let body = chart_json(45000.0, "USD").to_string();
        let base = crate::testutil::serve_once("200 OK", &body).await;

        let source = YahooSource::with_base_url(&base);
        let obs = source.get_price("BTC-USD").await.unwrap();
        assert_eq!(obs.price, FixedPoint::from_f64(45000.0));
        assert_eq!(obs.currency, Currency::USD);
    }

    #[tokio::test]
    async fn test_get_price_maps_error_status() {
        let base = crate::testutil::serve_once("404 Not Found", "{}").await;

        let source = YahooSource::with_base_url(&base);
        assert!(matches!(
            source.get_price("NOPE").await,
            Err(SourceError::Status(404))
        ));
    }
}
