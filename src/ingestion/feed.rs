use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TWAP order record (explorer feed)
// ---------------------------------------------------------------------------

/// A raw TWAP order as the HyperLiquid explorer feed reports it.
///
/// Everything is optional at the wire: upstream omits fields freely and the
/// validated domain type is only built at the pipeline boundary. `value` is
/// the USD value still unexecuted at the last sync, while `originalValue`
/// is the order's total USD notional; the pipeline resolves which basis a
/// record actually carries.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TwapOrderRecord {
    pub hash: Option<String>,
    pub user: Option<String>,
    pub coin: Option<String>,
    pub side: Option<String>,
    /// Epoch milliseconds.
    pub start_time: Option<i64>,
    pub duration_minutes: Option<f64>,
    pub amount: Option<Decimal>,
    pub value: Option<Decimal>,
    pub original_value: Option<Decimal>,
    pub progression: Option<f64>,
    pub ended: Option<bool>,
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Feed envelope
// ---------------------------------------------------------------------------

/// One message on the feed channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    /// Full authoritative state: replaces everything currently tracked.
    Snapshot { orders: Vec<TwapOrderRecord> },
    /// A single order changed (new fill sync, ended, errored).
    Update { order: TwapOrderRecord },
    /// An order left the upstream set entirely.
    Remove { hash: String },
}

/// Parse one feed line, which may be:
/// - A tagged envelope: `{"type": "snapshot", "orders": [...]}`
/// - A bare JSON array of records, treated as a snapshot
/// - A single record object, treated as an update
pub fn parse_feed_line(text: &str) -> Option<FeedEvent> {
    if let Ok(event) = serde_json::from_str::<FeedEvent>(text) {
        return Some(event);
    }

    match serde_json::from_str::<serde_json::Value>(text) {
        // A tag we did not match above is control chatter, not a record
        Ok(value) if value.get("type").is_some() => {}
        Ok(value) => {
            if let Ok(orders) = serde_json::from_value::<Vec<TwapOrderRecord>>(value.clone()) {
                return Some(FeedEvent::Snapshot { orders });
            }
            if value.is_object() {
                if let Ok(order) = serde_json::from_value::<TwapOrderRecord>(value) {
                    return Some(FeedEvent::Update { order });
                }
            }
        }
        Err(_) => {}
    }

    // Not a feed message (e.g. heartbeat, ack)
    tracing::trace!(raw = %text, "Non-feed line received");
    None
}
