//! SQLite persistence for sent alerts.
//!
//! The one-shot guarantee normally lives in memory for a single run.
//! Pointing the bot at a database file extends it across restarts: the
//! stored keys seed the in-memory state at startup.

use pricewatch_core::{AlertEvent, AlertKey, FixedPoint};
use pricewatch_engine::AlertState;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Database connection for alert history.
#[derive(Clone)]
pub struct AlertStore {
    pool: SqlitePool,
}

impl AlertStore {
    /// Connect to SQLite at the given path, creating it if missing.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sent_alerts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                threshold INTEGER NOT NULL,
                kind TEXT NOT NULL,
                price REAL NOT NULL,
                variation_bps INTEGER NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(symbol, threshold)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load every recorded key into a fresh alert state.
    pub async fn load_state(&self) -> Result<AlertState, StoreError> {
        let rows = sqlx::query_as::<_, (String, i64)>("SELECT symbol, threshold FROM sent_alerts")
            .fetch_all(&self.pool)
            .await?;

        Ok(AlertState::from_keys(
            rows.into_iter()
                .map(|(symbol, threshold)| AlertKey::new(&symbol, FixedPoint(threshold as u64))),
        ))
    }

    /// Record a dispatched alert. Replays of the same key update the
    /// observed price instead of inserting a duplicate.
    pub async fn record(&self, event: &AlertEvent) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sent_alerts (symbol, threshold, kind, price, variation_bps)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(symbol, threshold)
            DO UPDATE SET kind = ?, price = ?, variation_bps = ?, created_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(event.instrument.symbol.as_str())
        .bind(event.threshold.0 as i64)
        .bind(event.kind.as_str())
        .bind(event.price.to_f64())
        .bind(event.variation_bps)
        .bind(event.kind.as_str())
        .bind(event.price.to_f64())
        .bind(event.variation_bps)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Drop one key, re-arming the corresponding threshold.
    pub async fn forget(&self, key: &AlertKey) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sent_alerts WHERE symbol = ? AND threshold = ?")
            .bind(key.symbol.as_str())
            .bind(key.threshold.0 as i64)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete alerts older than the given number of days.
    pub async fn cleanup_older_than(&self, days: i64) -> Result<u64, StoreError> {
        let result =
            sqlx::query("DELETE FROM sent_alerts WHERE created_at < datetime('now', ? || ' days')")
                .bind(-days)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricewatch_core::{now_ms, Currency, Instrument, ThresholdKind};

    fn event(symbol: &str, target: f64, price: f64, kind: ThresholdKind) -> AlertEvent {
        let threshold = FixedPoint::from_f64(target);
        let observed = FixedPoint::from_f64(price);
        AlertEvent {
            instrument: Instrument::new(symbol, symbol, ""),
            kind,
            threshold,
            price: observed,
            variation_bps: FixedPoint::variation_bps(threshold, observed),
            currency: Currency::BRL,
            timestamp_ms: now_ms(),
        }
    }

    #[tokio::test]
    async fn test_record_and_load_state() {
        let store = AlertStore::connect("sqlite::memory:").await.unwrap();
        let low = event("PETR4", 38.0, 37.5, ThresholdKind::Low);
        store.record(&low).await.unwrap();

        let state = store.load_state().await.unwrap();
        assert_eq!(state.len(), 1);
        assert!(state.contains(&low.key()));
    }

    #[tokio::test]
    async fn test_record_same_key_twice_keeps_one_row() {
        let store = AlertStore::connect("sqlite::memory:").await.unwrap();
        store
            .record(&event("PETR4", 38.0, 37.5, ThresholdKind::Low))
            .await
            .unwrap();
        store
            .record(&event("PETR4", 38.0, 37.2, ThresholdKind::Low))
            .await
            .unwrap();

        let state = store.load_state().await.unwrap();
        assert_eq!(state.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_thresholds_are_distinct_keys() {
        let store = AlertStore::connect("sqlite::memory:").await.unwrap();
        store
            .record(&event("PETR4", 38.0, 37.5, ThresholdKind::Low))
            .await
            .unwrap();
        store
            .record(&event("PETR4", 42.0, 42.3, ThresholdKind::High))
            .await
            .unwrap();

        let state = store.load_state().await.unwrap();
        assert_eq!(state.len(), 2);
    }

    #[tokio::test]
    async fn test_cleanup_respects_retention_window() {
        let store = AlertStore::connect("sqlite::memory:").await.unwrap();
        store
            .record(&event("PETR4", 38.0, 37.5, ThresholdKind::Low))
            .await
            .unwrap();
        store
            .record(&event("VALE3", 50.0, 49.0, ThresholdKind::Low))
            .await
            .unwrap();

        // Fresh rows survive the window.
        assert_eq!(store.cleanup_older_than(30).await.unwrap(), 0);

        // Backdate one row past the window.
        sqlx::query(
            "UPDATE sent_alerts SET created_at = datetime('now', '-40 days') WHERE symbol = ?",
        )
        .bind("PETR4")
        .execute(&store.pool)
        .await
        .unwrap();

        assert_eq!(store.cleanup_older_than(30).await.unwrap(), 1);
        let state = store.load_state().await.unwrap();
        assert_eq!(state.len(), 1);
        assert!(!state.contains(&AlertKey::new("PETR4", FixedPoint::from_f64(38.0))));
    }

    #[tokio::test]
    async fn test_forget_rearms_key() {
        let store = AlertStore::connect("sqlite::memory:").await.unwrap();
        let low = event("PETR4", 38.0, 37.5, ThresholdKind::Low);
        store.record(&low).await.unwrap();
        store.forget(&low.key()).await.unwrap();

        let state = store.load_state().await.unwrap();
        assert!(state.is_empty());
    }
}
