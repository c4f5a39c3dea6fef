//! Brapi quote fetcher for B3 equities.

use crate::{PriceSource, SourceError};
use async_trait::async_trait;
use pricewatch_core::{Currency, FixedPoint, PriceObservation};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Quotes from brapi.dev. Prices are quoted in BRL.
pub struct BrapiSource {
    client: reqwest::Client,
    base_url: String,
}

impl BrapiSource {
    const BASE_URL: &'static str = "https://brapi.dev/api";

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

    async fn fetch(&self, ticker: &str) -> Result<serde_json::Value, SourceError> {
        let url = format!("{}/quote/{}", self.base_url, ticker);
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

impl Default for BrapiSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the regular market price from a brapi quote payload.
/// Response shape: {"results": [{"regularMarketPrice": 37.5, ...}]}
fn parse_quote(ticker: &str, json: &serde_json::Value) -> Result<f64, SourceError> {
    let result = json["results"]
        .as_array()
        .and_then(|r| r.first())
        .ok_or_else(|| SourceError::NoData(ticker.to_string()))?;

    let price = result["regularMarketPrice"]
        .as_f64()
        .ok_or_else(|| SourceError::Parse(format!("{}: regularMarketPrice missing", ticker)))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(SourceError::NoData(ticker.to_string()));
    }
    Ok(price)
}

#[async_trait]
impl PriceSource for BrapiSource {
    fn name(&self) -> &'static str {
        "brapi"
    }

    async fn get_price(&self, symbol: &str) -> Result<PriceObservation, SourceError> {
        debug!(symbol, "fetching brapi quote");
        let json = self.fetch(symbol).await?;
        let price = parse_quote(symbol, &json)?;
        Ok(PriceObservation::new(
            symbol,
            FixedPoint::from_f64(price),
            Currency::BRL,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_quote() {
        let json: serde_json::Value = serde_json::from_str(
            r#"{"results":[{"symbol":"PETR4","regularMarketPrice":37.5,"regularMarketChangePercent":-0.8}]}"#,
        )
        .unwrap();
        assert_eq!(parse_quote("PETR4", &json).unwrap(), 37.5);
    }

    #[test]
    fn test_parse_quote_empty_results() {
        let json: serde_json::Value = serde_json::from_str(r#"{"results":[]}"#).unwrap();
        assert!(matches!(
            parse_quote("PETR4", &json),
            Err(SourceError::NoData(_))
        ));
    }

    #[test]
    fn test_parse_quote_missing_price() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"results":[{"symbol":"PETR4"}]}"#).unwrap();
        assert!(matches!(
            parse_quote("PETR4", &json),
            Err(SourceError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_quote_rejects_non_positive() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"results":[{"regularMarketPrice":0.0}]}"#).unwrap();
        assert!(matches!(
            parse_quote("PETR4", &json),
            Err(SourceError::NoData(_))
        ));
    }

    #[tokio::test]
    async fn test_get_price_from_stub() {
        let base = crate::testutil::serve_once(
            "200 OK",
            r#"{"results":[{"symbol":"PETR4","regularMarketPrice":37.5}]}"#,
        )
        .await;

        let source = BrapiSource::with_base_url(&base);
        let obs = source.get_price("PETR4").await.unwrap();
        assert_eq!(obs.price, FixedPoint::from_f64(37.5));
        assert_eq!(obs.currency, Currency::BRL);
    }

    #[tokio::test]
    async fn test_get_price_maps_error_status() {
        let base = crate::testutil::serve_once("503 Service Unavailable", "{}").await;

        let source = BrapiSource::with_base_url(&base);
        assert!(matches!(
            source.get_price("PETR4").await,
            Err(SourceError::Status(503))
        ));
    }
}
