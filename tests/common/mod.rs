use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use liquidwatch::ingestion::TwapOrderRecord;

/// Build a live BTC buy record. `start` is the placement time; value fields
/// carry the total USD notional so estimates interpolate.
#[allow(dead_code)]
pub fn make_record(
    hash: &str,
    start: DateTime<Utc>,
    duration_minutes: f64,
    amount: i64,
    original_value: i64,
) -> TwapOrderRecord {
    TwapOrderRecord {
        hash: Some(hash.into()),
        user: Some("0xf3a7c4d9".into()),
        coin: Some("BTC".into()),
        side: Some("B".into()),
        start_time: Some(start.timestamp_millis()),
        duration_minutes: Some(duration_minutes),
        amount: Some(Decimal::from(amount)),
        value: None,
        original_value: Some(Decimal::from(original_value)),
        progression: None,
        ended: None,
        error: None,
    }
}

/// An order the feed already reported as finished, with its final sync
/// numbers attached.
#[allow(dead_code)]
pub fn make_ended_record(
    hash: &str,
    start: DateTime<Utc>,
    progression: f64,
    value: i64,
) -> TwapOrderRecord {
    let mut rec = make_record(hash, start, 30.0, 100, 100_000);
    rec.ended = Some(true);
    rec.progression = Some(progression);
    rec.value = Some(Decimal::from(value));
    rec
}
