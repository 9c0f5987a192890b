use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Side;

// ---------------------------------------------------------------------------
// ValueBasis
// ---------------------------------------------------------------------------

/// Where the USD notional used for remaining-value interpolation comes from.
///
/// The feed is inconsistent about value semantics: some payloads carry the
/// total notional at placement, others only the unexecuted value as of the
/// last sync together with a progression percent. Both resolve to a single
/// original notional here, once, so the estimator never has to guess what a
/// raw `value` field meant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ValueBasis {
    /// The feed supplied the total USD notional at placement.
    OriginalNotional(f64),
    /// Total notional backed out of the last sync's remaining value and
    /// progression percent: `value / (100 - progression) * 100`.
    ReconstructedFromSync(f64),
    /// No usable value information; remaining value cannot be interpolated.
    Unknown,
}

impl ValueBasis {
    /// Resolve a basis from the raw feed fields, preferring a directly
    /// supplied total over a reconstruction. Non-finite, negative, or
    /// fully-progressed inputs yield `Unknown` rather than a bogus notional.
    pub fn resolve(
        original_value: Option<f64>,
        value: Option<f64>,
        progression_pct: Option<f64>,
    ) -> Self {
        if let Some(total) = original_value {
            if total.is_finite() && total >= 0.0 {
                return ValueBasis::OriginalNotional(total);
            }
        }

        if let (Some(v), Some(p)) = (value, progression_pct) {
            if v.is_finite() && v >= 0.0 && p.is_finite() && (0.0..100.0).contains(&p) {
                let total = v / (100.0 - p) * 100.0;
                if total.is_finite() {
                    return ValueBasis::ReconstructedFromSync(total);
                }
            }
        }

        ValueBasis::Unknown
    }

    /// Total USD notional at placement, if one could be resolved.
    pub fn original_notional(&self) -> Option<f64> {
        match *self {
            ValueBasis::OriginalNotional(v) | ValueBasis::ReconstructedFromSync(v) => Some(v),
            ValueBasis::Unknown => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TwapOrder
// ---------------------------------------------------------------------------

/// A validated TWAP order as tracked between authoritative feed syncs.
///
/// Read-only from this layer's perspective: the feed owns the entity, this
/// process only derives display estimates from it. `last_value` and
/// `last_progression` preserve the feed's own numbers so terminal or
/// degraded orders can be served exactly as last reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwapOrder {
    pub hash: String,
    pub user: String,
    pub coin: String,
    pub side: Side,
    /// Placement time of the parent order.
    pub start_time: DateTime<Utc>,
    /// Planned execution window. May be zero or negative on degraded
    /// records; the estimator refuses to interpolate those.
    pub duration_minutes: f64,
    /// Quantity at placement, in tokens.
    pub original_amount: f64,
    /// Resolved USD notional source for remaining-value interpolation.
    pub value_basis: ValueBasis,
    /// Unexecuted USD value as of the last authoritative sync, verbatim.
    pub last_value: Option<f64>,
    /// Progression percent as of the last authoritative sync, verbatim.
    pub last_progression: Option<f64>,
    /// When this record was accepted from the feed.
    pub synced_at: DateTime<Utc>,
    pub ended: bool,
    pub error: Option<String>,
}

impl TwapOrder {
    /// Terminal orders are excluded from live recomputation; their last
    /// authoritative values are served unchanged.
    pub fn is_terminal(&self) -> bool {
        self.ended || self.error.is_some()
    }

    /// Execution window in milliseconds, or `None` when the duration cannot
    /// support interpolation (zero, negative, or non-finite).
    pub fn duration_ms(&self) -> Option<f64> {
        if self.duration_minutes.is_finite() && self.duration_minutes > 0.0 {
            Some(self.duration_minutes * 60_000.0)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_supplied_total() {
        let basis = ValueBasis::resolve(Some(80_000.0), Some(40_000.0), Some(50.0));
        assert_eq!(basis, ValueBasis::OriginalNotional(80_000.0));
    }

    #[test]
    fn test_resolve_reconstructs_from_sync() {
        // 40k unexecuted at 50% progressed -> 80k total
        let basis = ValueBasis::resolve(None, Some(40_000.0), Some(50.0));
        assert_eq!(basis, ValueBasis::ReconstructedFromSync(80_000.0));
    }

    #[test]
    fn test_resolve_rejects_full_progression() {
        // 100% progressed leaves nothing to divide by
        let basis = ValueBasis::resolve(None, Some(0.0), Some(100.0));
        assert_eq!(basis, ValueBasis::Unknown);
    }

    #[test]
    fn test_resolve_rejects_bad_numbers() {
        assert_eq!(
            ValueBasis::resolve(Some(f64::NAN), None, None),
            ValueBasis::Unknown
        );
        assert_eq!(
            ValueBasis::resolve(None, Some(-1.0), Some(10.0)),
            ValueBasis::Unknown
        );
        assert_eq!(ValueBasis::resolve(None, Some(500.0), None), ValueBasis::Unknown);
    }

    #[test]
    fn test_resolve_accepts_zero_progression() {
        // Nothing executed yet: remaining value IS the original notional
        let basis = ValueBasis::resolve(None, Some(1_000.0), Some(0.0));
        assert_eq!(basis, ValueBasis::ReconstructedFromSync(1_000.0));
    }
}
