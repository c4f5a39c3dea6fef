//! Price Watch - Threshold Alert Bot
//!
//! Polls market data providers, evaluates configured price targets and
//! reports breaches to Telegram.

mod config;
mod exchange_rate;
mod runner;

use clap::Parser;
use config::AppConfig;
use pricewatch_alerts::{format_alert_message, AlertStore, Dispatcher, TelegramNotifier};
use pricewatch_engine::{AlertState, Evaluator, RearmPolicy};
use pricewatch_sources::{BrapiSource, FredSource, ProviderKind, YahooSource};
use runner::SourceRegistry;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Price Watch CLI
#[derive(Parser, Debug)]
#[command(name = "pricewatch")]
#[command(about = "Market price threshold alert bot", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "pricewatch.json")]
    config: String,

    /// Log level: trace, debug, info, warn, error (overrides config)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Evaluate and print instead of sending to Telegram
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Keep running, evaluating every interval
    #[arg(long, default_value_t = false)]
    watch: bool,

    /// Seconds between cycles in watch mode
    #[arg(long, default_value_t = 60)]
    interval_secs: u64,
}

fn init_logging(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

fn build_registry(config: &AppConfig) -> SourceRegistry {
    let mut registry = SourceRegistry::new();
    registry.insert(ProviderKind::Brapi, Arc::new(BrapiSource::new()));
    registry.insert(ProviderKind::Yahoo, Arc::new(YahooSource::new()));
    if let Some(ref key) = config.fred_api_key {
        registry.insert(ProviderKind::Fred, Arc::new(FredSource::new(key.clone())));
    }
    registry
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = match AppConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    let log_level = args.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(log_level);

    let rules = match config.validate(!args.dry_run) {
        Ok(rules) => rules,
        Err(e) => {
            error!(error = %e, "Configuration error");
            std::process::exit(2);
        }
    };
    info!(rules = rules.len(), dry_run = args.dry_run, "Starting price watch");

    let registry = build_registry(&config);
    let evaluator = Evaluator::new(if config.rearm_on_recovery {
        RearmPolicy::OnRecovery
    } else {
        RearmPolicy::Never
    });

    // Optional cross-run persistence. A broken database degrades to a
    // fresh in-memory state instead of aborting.
    let mut store = None;
    let mut state = AlertState::new();
    if let Some(ref path) = config.state_db {
        match AlertStore::connect(path).await {
            Ok(s) => {
                // Prune before loading so expired keys re-arm.
                if let Some(days) = config.state_retention_days {
                    match s.cleanup_older_than(days).await {
                        Ok(removed) if removed > 0 => {
                            info!(removed, days, "Pruned expired alerts")
                        }
                        Ok(_) => {}
                        Err(e) => warn!(error = %e, "Failed to prune expired alerts"),
                    }
                }
                match s.load_state().await {
                    Ok(loaded) => {
                        info!(keys = loaded.len(), "Loaded alert state");
                        state = loaded;
                        store = Some(s);
                    }
                    Err(e) => warn!(error = %e, "Failed to load alert state"),
                }
            }
            Err(e) => warn!(error = %e, path = %path, "Failed to open state database"),
        }
    }

    let dispatcher = if args.dry_run {
        None
    } else {
        let notifier = match TelegramNotifier::new(
            &config.telegram.bot_token,
            &config.telegram.chat_id,
        ) {
            Ok(notifier) => notifier,
            Err(e) => {
                error!(error = %e, "Configuration error");
                std::process::exit(2);
            }
        };
        let mut dispatcher = Dispatcher::new(notifier);
        if let Some(ref s) = store {
            dispatcher = dispatcher.with_store(s.clone());
        }
        Some(dispatcher)
    };

    let politeness_delay = Duration::from_millis(config.politeness_delay_ms);

    loop {
        let usd_brl = exchange_rate::load_rate().await;

        let outcome = runner::run_cycle(
            &rules,
            &registry,
            &evaluator,
            &mut state,
            usd_brl,
            politeness_delay,
        )
        .await;
        info!(
            fired = outcome.events.len(),
            unavailable = outcome.unavailable,
            "Cycle complete"
        );

        match dispatcher {
            Some(ref dispatcher) => {
                let summary = dispatcher.dispatch(&outcome.events, &outcome.digest).await;
                info!(
                    sent = summary.alerts_sent,
                    failed = summary.alerts_failed,
                    digest = summary.digest_sent,
                    "Dispatch complete"
                );
            }
            None => {
                for event in &outcome.events {
                    println!("{}\n", format_alert_message(event));
                }
                println!("{}", outcome.digest);
            }
        }

        if !args.watch {
            break;
        }
        tokio::time::sleep(Duration::from_secs(args.interval_secs)).await;
    }
}
