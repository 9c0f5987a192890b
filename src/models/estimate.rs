use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Derived execution estimate for a single TWAP order.
///
/// `progression` is a percent in `[0, 100]`; `remaining_amount` is in tokens
/// and `remaining_value` in USD. All three are either interpolated from
/// wall-clock time or passed through verbatim from the last authoritative
/// sync, never a mix of the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwapEstimate {
    pub progression: f64,
    pub remaining_value: f64,
    pub remaining_amount: f64,
    pub is_completed: bool,
}

/// One tick's worth of estimates, keyed by order hash.
///
/// Replaced wholesale on every estimator tick; consumers always observe a
/// complete, internally consistent batch computed against a single `now`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateBook {
    pub computed_at: DateTime<Utc>,
    pub estimates: HashMap<String, TwapEstimate>,
}

impl EstimateBook {
    pub fn empty() -> Self {
        Self {
            computed_at: Utc::now(),
            estimates: HashMap::new(),
        }
    }

    pub fn get(&self, hash: &str) -> Option<&TwapEstimate> {
        self.estimates.get(hash)
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }
}
