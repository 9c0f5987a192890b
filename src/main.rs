mod config;
mod errors;
mod ingestion;
mod metrics;
mod models;
mod services;
mod tracker;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Duration};

use crate::config::AppConfig;
use crate::ingestion::pipeline::run_feed_consumer;
use crate::ingestion::replay::run_replay;
use crate::ingestion::stdin_listener::run_stdin_listener;
use crate::ingestion::FeedEvent;
use crate::metrics::init_metrics;
use crate::models::EstimateBook;
use crate::services::run_estimator;
use crate::tracker::TwapBook;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    // --- Observability ---
    if let Some(addr) = config.metrics_addr {
        init_metrics(addr)?;
        tracing::info!(addr = %addr, "Prometheus exporter listening");
    }

    let book = TwapBook::new();
    let (feed_tx, feed_rx) = mpsc::channel::<FeedEvent>(config.feed_buffer);
    let (estimates_tx, estimates_rx) = watch::channel(EstimateBook::empty());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // --- Feed driver: capture replay or live stdin ---
    match config.replay_file.clone() {
        Some(path) => {
            let interval_ms = config.replay_interval_ms;
            tracing::info!(file = %path, "Starting replay feed");
            tokio::spawn(async move {
                if let Err(e) = run_replay(&path, interval_ms, feed_tx).await {
                    tracing::error!(error = %e, "Replay feed failed");
                }
            });
        }
        None => {
            tracing::info!("Starting stdin feed");
            tokio::spawn(async move {
                run_stdin_listener(feed_tx).await;
            });
        }
    }

    // --- Pipeline consumer: validation + book maintenance ---
    let consumer_book = book.clone();
    tokio::spawn(async move {
        run_feed_consumer(feed_rx, consumer_book).await;
    });

    // --- Estimator loop ---
    let estimator_book = book.clone();
    let estimator_shutdown = shutdown_rx.clone();
    let tick_ms = config.estimator_tick_ms;
    tokio::spawn(async move {
        run_estimator(estimator_book, tick_ms, estimates_tx, estimator_shutdown).await;
    });

    // --- Summary logger: samples the published estimates ---
    let summary_interval = config.summary_interval_ms;
    let mut summary_shutdown = shutdown_rx;
    let mut summary_rx = estimates_rx;
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(summary_interval.max(100)));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snapshot = summary_rx.borrow_and_update().clone();
                    if snapshot.is_empty() {
                        continue;
                    }
                    let completed = snapshot
                        .estimates
                        .values()
                        .filter(|e| e.is_completed)
                        .count();
                    let remaining_usd: f64 = snapshot
                        .estimates
                        .values()
                        .map(|e| e.remaining_value)
                        .sum();
                    tracing::info!(
                        orders = snapshot.len(),
                        completed,
                        remaining_usd,
                        "TWAP estimates"
                    );
                }
                changed = summary_shutdown.changed() => {
                    if changed.is_err() || *summary_shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl-C received; shutting down");
    let _ = shutdown_tx.send(true);
    // Give the loops a beat to observe the flag.
    tokio::time::sleep(Duration::from_millis(100)).await;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
