use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tokio::sync::mpsc;

use crate::errors::RecordError;
use crate::ingestion::feed::{FeedEvent, TwapOrderRecord};
use crate::models::{Side, TwapOrder, ValueBasis};
use crate::tracker::TwapBook;

/// Validate a raw feed record into a tracked order.
///
/// Identity, side, start time, and amount are hard requirements; a record
/// missing any of them is rejected. Value fields degrade softly instead:
/// a missing or corrupt USD value leaves the basis unresolved, and the
/// estimator serves the authoritative snapshot for that order rather than
/// interpolating.
pub fn validate_record(
    rec: &TwapOrderRecord,
    synced_at: DateTime<Utc>,
) -> Result<TwapOrder, RecordError> {
    let hash = rec
        .hash
        .as_deref()
        .filter(|h| !h.is_empty())
        .ok_or(RecordError::MissingField("hash"))?;

    let side_str = rec.side.as_deref().ok_or(RecordError::MissingField("side"))?;
    let side =
        Side::from_api_str(side_str).ok_or_else(|| RecordError::InvalidSide(side_str.into()))?;

    let start_ms = rec.start_time.ok_or(RecordError::MissingField("startTime"))?;
    let start_time = DateTime::from_timestamp_millis(start_ms)
        .ok_or(RecordError::InvalidTimestamp(start_ms))?;

    let amount_raw = rec.amount.ok_or(RecordError::MissingField("amount"))?;
    let original_amount = decimal_to_f64(amount_raw)
        .filter(|a| *a >= 0.0)
        .ok_or_else(|| RecordError::InvalidNumber {
            field: "amount",
            raw: amount_raw.to_string(),
        })?;

    // Interpolation inputs degrade to "cannot estimate" rather than reject.
    let duration_minutes = rec.duration_minutes.filter(|d| d.is_finite()).unwrap_or(0.0);
    let progression = rec
        .progression
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 100.0));
    let value = rec.value.and_then(decimal_to_f64).filter(|v| *v >= 0.0);
    let original_value = rec
        .original_value
        .and_then(decimal_to_f64)
        .filter(|v| *v >= 0.0);

    Ok(TwapOrder {
        hash: hash.to_string(),
        user: rec.user.clone().unwrap_or_else(|| "unknown".into()),
        coin: rec.coin.clone().unwrap_or_else(|| "unknown".into()),
        side,
        start_time,
        duration_minutes,
        original_amount,
        value_basis: ValueBasis::resolve(original_value, value, progression),
        last_value: value,
        last_progression: progression,
        synced_at,
        ended: rec.ended.unwrap_or(false),
        error: rec.error.clone().filter(|e| !e.is_empty()),
    })
}

fn decimal_to_f64(d: Decimal) -> Option<f64> {
    d.to_f64().filter(|f| f.is_finite())
}

/// Apply one feed event to the shared book.
///
/// Bad records are counted, logged, and skipped; a snapshot with rejects
/// still replaces the book with whatever validated. Nothing in here is
/// fatal to the process.
pub async fn process_feed_event(event: FeedEvent, book: &TwapBook) {
    counter!("feed_events_total").increment(1);
    let synced_at = Utc::now();

    match event {
        FeedEvent::Snapshot { orders } => {
            let total = orders.len();
            let mut valid = Vec::with_capacity(total);

            for rec in &orders {
                match validate_record(rec, synced_at) {
                    Ok(order) => valid.push(order),
                    Err(e) => reject_record(rec, &e),
                }
            }

            tracing::info!(
                received = total,
                accepted = valid.len(),
                "Applying feed snapshot"
            );
            book.replace_all(valid).await;
        }
        FeedEvent::Update { order } => match validate_record(&order, synced_at) {
            Ok(order) => {
                tracing::debug!(
                    hash = %order.hash,
                    coin = %order.coin,
                    side = %order.side,
                    ended = order.ended,
                    "Applying feed update"
                );
                book.upsert(order).await;
            }
            Err(e) => reject_record(&order, &e),
        },
        FeedEvent::Remove { hash } => {
            if !book.remove(&hash).await {
                tracing::debug!(hash = %hash, "Remove for untracked order");
            }
        }
    }

    gauge!("orders_tracked").set(book.len().await as f64);
}

fn reject_record(rec: &TwapOrderRecord, err: &RecordError) {
    counter!("feed_records_rejected_total").increment(1);
    tracing::warn!(
        hash = rec.hash.as_deref().unwrap_or("<none>"),
        coin = rec.coin.as_deref().unwrap_or("<none>"),
        error = %err,
        "Rejected feed record"
    );
}

/// Drain the feed channel into the book until every sender hangs up.
pub async fn run_feed_consumer(mut rx: mpsc::Receiver<FeedEvent>, book: TwapBook) {
    tracing::info!("Feed consumer started");
    while let Some(event) = rx.recv().await {
        process_feed_event(event, &book).await;
    }
    tracing::info!("Feed channel closed; consumer stopping");
}
