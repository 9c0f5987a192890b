use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::models::TwapOrder;

/// Shared registry of every TWAP order currently known from the feed,
/// keyed by order hash.
///
/// Cheap to clone: all clones share the same map. The feed consumer is the
/// only writer; the estimator loop snapshots it once per tick.
#[derive(Clone)]
pub struct TwapBook {
    inner: Arc<RwLock<HashMap<String, TwapOrder>>>,
}

impl TwapBook {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Replace the entire registry with a fresh authoritative snapshot.
    /// Orders absent from `orders` are dropped.
    pub async fn replace_all(&self, orders: Vec<TwapOrder>) {
        let mut map = self.inner.write().await;
        map.clear();
        for order in orders {
            map.insert(order.hash.clone(), order);
        }
        debug!(orders = map.len(), "twap book replaced");
    }

    /// Insert or overwrite a single order.
    pub async fn upsert(&self, order: TwapOrder) {
        let mut map = self.inner.write().await;
        debug!(hash = %order.hash, coin = %order.coin, "twap book upsert");
        map.insert(order.hash.clone(), order);
    }

    /// Drop a single order. Returns false when the hash was not tracked.
    pub async fn remove(&self, hash: &str) -> bool {
        let mut map = self.inner.write().await;
        let removed = map.remove(hash).is_some();
        if removed {
            debug!(hash = %hash, "twap book remove");
        }
        removed
    }

    /// Clone out the current orders for a batch pass.
    pub async fn snapshot(&self) -> Vec<TwapOrder> {
        self.inner.read().await.values().cloned().collect()
    }

    pub async fn get(&self, hash: &str) -> Option<TwapOrder> {
        self.inner.read().await.get(hash).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl Default for TwapBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Side, ValueBasis};
    use chrono::Utc;

    fn make_order(hash: &str) -> TwapOrder {
        TwapOrder {
            hash: hash.to_string(),
            user: "0xuser".into(),
            coin: "BTC".into(),
            side: Side::Sell,
            start_time: Utc::now(),
            duration_minutes: 30.0,
            original_amount: 10.0,
            value_basis: ValueBasis::OriginalNotional(650_000.0),
            last_value: None,
            last_progression: None,
            synced_at: Utc::now(),
            ended: false,
            error: None,
        }
    }

    #[tokio::test]
    async fn test_replace_all_drops_stale_orders() {
        let book = TwapBook::new();
        book.upsert(make_order("0xold")).await;

        book.replace_all(vec![make_order("0xa"), make_order("0xb")])
            .await;

        assert_eq!(book.len().await, 2);
        assert!(book.get("0xold").await.is_none());
        assert!(book.get("0xa").await.is_some());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_hash() {
        let book = TwapBook::new();
        book.upsert(make_order("0xa")).await;

        let mut updated = make_order("0xa");
        updated.ended = true;
        book.upsert(updated).await;

        assert_eq!(book.len().await, 1);
        assert!(book.get("0xa").await.unwrap().ended);
    }

    #[tokio::test]
    async fn test_remove_reports_whether_tracked() {
        let book = TwapBook::new();
        book.upsert(make_order("0xa")).await;

        assert!(book.remove("0xa").await);
        assert!(!book.remove("0xa").await);
        assert!(book.is_empty().await);
    }
}
