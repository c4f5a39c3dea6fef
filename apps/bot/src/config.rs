//! Application configuration.

use pricewatch_core::{AlertRule, Currency, FixedPoint, Instrument, RuleError};
use pricewatch_sources::ProviderKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no Telegram bot token (set telegram.bot_token or TELEGRAM_BOT_TOKEN)")]
    MissingBotToken,
    #[error("no Telegram chat id (set telegram.chat_id or TELEGRAM_CHAT_ID)")]
    MissingChatId,
    #[error("no FRED API key for rule {0} (set fred_api_key or FRED_API_KEY)")]
    MissingFredKey(String),
    #[error("no rules configured")]
    NoRules,
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Telegram credentials.
    #[serde(default)]
    pub telegram: TelegramSettings,
    /// Instruments to watch.
    pub rules: Vec<RuleSettings>,
    /// API key for the FRED provider.
    #[serde(default)]
    pub fred_api_key: Option<String>,
    /// Delay between consecutive provider calls, in milliseconds.
    #[serde(default = "default_politeness_delay_ms")]
    pub politeness_delay_ms: u64,
    /// Re-arm thresholds when the price recovers past them.
    #[serde(default)]
    pub rearm_on_recovery: bool,
    /// SQLite path for cross-run alert persistence. Absent means the
    /// one-shot guarantee only spans a single run.
    #[serde(default)]
    pub state_db: Option<String>,
    /// Prune persisted alerts older than this many days at startup,
    /// re-arming their thresholds. Absent means keep forever.
    #[serde(default)]
    pub state_retention_days: Option<i64>,
    /// Logging level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_politeness_delay_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram credentials. Either field may be left empty in the file
/// and supplied through the environment instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramSettings {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
}

/// One watched instrument as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSettings {
    /// Provider symbol ("PETR4", "BTC-USD", a FRED series id).
    pub symbol: String,
    /// Human-readable name for messages. Defaults to the symbol.
    #[serde(default)]
    pub name: String,
    /// Emoji or short tag shown in the digest.
    #[serde(default)]
    pub tag: String,
    /// Which provider serves this symbol.
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    /// Sell target: alert when price >= this.
    #[serde(default)]
    pub target_high: Option<f64>,
    /// Buy target: alert when price <= this.
    #[serde(default)]
    pub target_low: Option<f64>,
    /// Currency the targets are expressed in.
    #[serde(default)]
    pub currency: Currency,
}

fn default_provider() -> ProviderKind {
    ProviderKind::Yahoo
}

impl RuleSettings {
    pub fn to_rule(&self) -> Result<AlertRule, RuleError> {
        let name = if self.name.is_empty() {
            &self.symbol
        } else {
            &self.name
        };
        AlertRule::new(
            Instrument::new(&self.symbol, name, &self.tag),
            self.target_high.map(FixedPoint::from_f64),
            self.target_low.map(FixedPoint::from_f64),
            self.currency,
        )
    }
}

/// An alert rule bound to the provider that serves its symbol.
#[derive(Debug, Clone)]
pub struct ResolvedRule {
    pub provider: ProviderKind,
    pub rule: AlertRule,
}

impl AppConfig {
    /// Load from a JSON file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig = serde_json::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Environment variables win over file contents for secrets.
    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            if !token.is_empty() {
                self.telegram.bot_token = token;
            }
        }
        if let Ok(chat_id) = std::env::var("TELEGRAM_CHAT_ID") {
            if !chat_id.is_empty() {
                self.telegram.chat_id = chat_id;
            }
        }
        if let Ok(key) = std::env::var("FRED_API_KEY") {
            if !key.is_empty() {
                self.fred_api_key = Some(key);
            }
        }
    }

    /// Check completeness and compile every rule.
    ///
    /// `require_telegram` is false for dry runs, which never touch the
    /// Telegram API.
    pub fn validate(&self, require_telegram: bool) -> Result<Vec<ResolvedRule>, ConfigError> {
        if require_telegram {
            if self.telegram.bot_token.is_empty() {
                return Err(ConfigError::MissingBotToken);
            }
            if self.telegram.chat_id.is_empty() {
                return Err(ConfigError::MissingChatId);
            }
        }
        if self.rules.is_empty() {
            return Err(ConfigError::NoRules);
        }

        let mut resolved = Vec::with_capacity(self.rules.len());
        for settings in &self.rules {
            if settings.provider == ProviderKind::Fred && self.fred_api_key.is_none() {
                return Err(ConfigError::MissingFredKey(settings.symbol.clone()));
            }
            resolved.push(ResolvedRule {
                provider: settings.provider,
                rule: settings.to_rule()?,
            });
        }
        Ok(resolved)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            telegram: TelegramSettings::default(),
            rules: vec![
                RuleSettings {
                    symbol: "PETR4".to_string(),
                    name: "Petrobras PN".to_string(),
                    tag: "\u{26FD}".to_string(),
                    provider: ProviderKind::Brapi,
                    target_high: Some(42.0),
                    target_low: Some(38.0),
                    currency: Currency::BRL,
                },
                RuleSettings {
                    symbol: "BTC-USD".to_string(),
                    name: "Bitcoin".to_string(),
                    tag: "\u{20BF}".to_string(),
                    provider: ProviderKind::Yahoo,
                    target_high: Some(120000.0),
                    target_low: Some(45000.0),
                    currency: Currency::USD,
                },
            ],
            fred_api_key: None,
            politeness_delay_ms: default_politeness_delay_ms(),
            rearm_on_recovery: false,
            state_db: None,
            state_retention_days: None,
            log_level: default_log_level(),
        }
    }
}
