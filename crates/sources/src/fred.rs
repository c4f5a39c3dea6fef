//! FRED macro series fetcher.

use crate::{PriceSource, SourceError};
use async_trait::async_trait;
use pricewatch_core::{Currency, FixedPoint, PriceObservation};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Latest observation of a FRED series (USD/BRL rate, Selic, IPCA...).
///
/// The instrument symbol is the FRED series id. Series whose latest
/// value is non-positive or missing ("." in the API) are reported as
/// unavailable rather than evaluated.
pub struct FredSource {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FredSource {
    const BASE_URL: &'static str = "https://api.stlouisfed.org/fred/series/observations";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, Self::BASE_URL)
    }

    /// Override the endpoint, e.g. for a local stub.
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.to_string(),
        }
    }

    async fn fetch(&self, series_id: &str) -> Result<serde_json::Value, SourceError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("sort_order", "desc"),
                ("limit", "1"),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

/// Extract the latest observation value from a FRED payload.
/// Response shape: {"observations": [{"date": "...", "value": "4.85"}]}
fn parse_observations(series_id: &str, json: &serde_json::Value) -> Result<f64, SourceError> {
    let observation = json["observations"]
        .as_array()
        .and_then(|o| o.first())
        .ok_or_else(|| SourceError::NoData(series_id.to_string()))?;

    let raw = observation["value"]
        .as_str()
        .ok_or_else(|| SourceError::Parse(format!("{}: value missing", series_id)))?;

    // "." marks a series with no recent reading.
    if raw == "." {
        return Err(SourceError::NoData(series_id.to_string()));
    }

    let value: f64 = raw
        .parse()
        .map_err(|_| SourceError::Parse(format!("{}: value {:?} not numeric", series_id, raw)))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(SourceError::NoData(series_id.to_string()));
    }
    Ok(value)
}

#[async_trait]
impl PriceSource for FredSource {
    fn name(&self) -> &'static str {
        "fred"
    }

    async fn get_price(&self, symbol: &str) -> Result<PriceObservation, SourceError> {
        debug!(series = symbol, "fetching FRED observation");
        let json = self.fetch(symbol).await?;
        let value = parse_observations(symbol, &json)?;
        Ok(PriceObservation::new(
            symbol,
            FixedPoint::from_f64(value),
            Currency::USD,
        ))
    }
}
