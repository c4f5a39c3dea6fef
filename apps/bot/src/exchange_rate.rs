//! USD/BRL exchange rate fetching.
//!
//! Fetched once per run from a public API and cached in process-wide
//! atomics. When the fetch fails the hardcoded fallback keeps currency
//! normalization working.

use pricewatch_core::DEFAULT_USD_BRL;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Atomic storage for the rate (stored as rate * 10000 for 4 decimal
/// precision), e.g. 5.4321 stored as 54321. 0 means not loaded yet.
static USD_BRL_RATE: AtomicU64 = AtomicU64::new(0);

/// Whether the rate has been fetched from the API at least once.
static RATE_LOADED: AtomicBool = AtomicBool::new(false);

/// Whether a live rate has been loaded.
pub fn is_rate_loaded() -> bool {
    RATE_LOADED.load(Ordering::Relaxed)
}

/// Current USD/BRL rate, falling back to the hardcoded default when no
/// live rate has been fetched.
pub fn usd_brl_rate_or_default() -> f64 {
    let rate = USD_BRL_RATE.load(Ordering::Relaxed);
    if rate == 0 {
        DEFAULT_USD_BRL
    } else {
        rate as f64 / 10_000.0
    }
}

/// Fetch the current rate and update the cached value.
async fn fetch_usd_brl() -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
    let url = "https://open.er-api.com/v6/latest/USD";

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let response: serde_json::Value = client.get(url).send().await?.json().await?;

    let rate = response["rates"]["BRL"]
        .as_f64()
        .ok_or("BRL rate not found in response")?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err("BRL rate not positive".into());
    }

    USD_BRL_RATE.store((rate * 10_000.0) as u64, Ordering::Relaxed);
    RATE_LOADED.store(true, Ordering::Relaxed);

    Ok(rate)
}

/// Load the rate for this run. Failures are logged and leave the
/// fallback in place; they never stop a cycle.
pub async fn load_rate() -> f64 {
    match fetch_usd_brl().await {
        Ok(rate) => {
            info!(rate, "Fetched USD/BRL exchange rate");
            rate
        }
        Err(e) => {
            warn!(
                error = %e,
                fallback = DEFAULT_USD_BRL,
                "Failed to fetch USD/BRL rate, using fallback"
            );
            usd_brl_rate_or_default()
        }
    }
}
