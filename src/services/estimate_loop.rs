use std::time::Instant;

use chrono::Utc;
use metrics::{counter, gauge, histogram};
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::models::EstimateBook;
use crate::tracker::{estimator, TwapBook};

/// Run the estimator loop. Every `tick_ms` it snapshots the tracked
/// orders, recomputes every estimate against a single clock reading, and
/// publishes the whole map at once; subscribers never observe a mix of
/// old and new entries.
///
/// When the last order leaves, one empty book goes out so subscribers
/// clear, and the loop idles until orders return. It stops when the
/// shutdown flag flips or when every subscriber is gone.
pub async fn run_estimator(
    book: TwapBook,
    tick_ms: u64,
    estimates_tx: watch::Sender<EstimateBook>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval(Duration::from_millis(tick_ms.max(1)));
    // A late batch must not trigger a burst of catch-up recomputes.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut published_empty = false;

    tracing::info!(tick_ms, "Estimator loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    tracing::info!("Shutdown requested; estimator stopping");
                    break;
                }
                continue;
            }
        }

        let orders = book.snapshot().await;

        if orders.is_empty() {
            if !published_empty {
                tracing::debug!("No orders tracked; publishing empty book and idling");
                if estimates_tx.send(EstimateBook::empty()).is_err() {
                    tracing::info!("All estimate subscribers gone; estimator stopping");
                    break;
                }
                published_empty = true;
                gauge!("orders_tracked").set(0.0);
            }
            continue;
        }
        published_empty = false;

        let started = Instant::now();
        let next = estimator::estimate_all(&orders, Utc::now());

        counter!("estimator_ticks_total").increment(1);
        gauge!("orders_tracked").set(orders.len() as f64);
        histogram!("estimator_batch_seconds").record(started.elapsed().as_secs_f64());

        if estimates_tx.send(next).is_err() {
            tracing::info!("All estimate subscribers gone; estimator stopping");
            break;
        }
    }

    tracing::info!("Estimator loop stopped");
}
