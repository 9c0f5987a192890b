use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{EstimateBook, TwapEstimate, TwapOrder};

// ---------------------------------------------------------------------------
// Time progression
// ---------------------------------------------------------------------------

/// Linear execution progression implied by wall-clock time alone:
/// `elapsed / (duration_minutes * 60000) * 100`, clamped to `[0, 100]`.
///
/// Returns `None` when the order's duration cannot support interpolation
/// (zero, negative, or non-finite); any other non-finite intermediate is
/// treated as zero progression so corrupt values never surface.
pub fn time_progression_pct(order: &TwapOrder, now: DateTime<Utc>) -> Option<f64> {
    let duration_ms = order.duration_ms()?;
    let elapsed_ms = (now - order.start_time).num_milliseconds() as f64;
    let raw = elapsed_ms / duration_ms * 100.0;
    if raw.is_finite() {
        Some(raw.clamp(0.0, 100.0))
    } else {
        Some(0.0)
    }
}

// ---------------------------------------------------------------------------
// Estimation
// ---------------------------------------------------------------------------

/// Estimate an order's execution state at `now`.
///
/// Strictly a function of `(order, now)`: recomputing with the same inputs
/// gives the same output, and progression is non-decreasing in `now`, which
/// is what lets the caller drive smooth progress animation between
/// authoritative syncs. Remaining amount and value decay together along
/// `remaining_pct = 100 - progression`, converging to zero when the
/// execution window closes.
///
/// Terminal orders, orders whose duration cannot be interpolated, and orders
/// without a resolvable value basis all fall back to the last authoritative
/// snapshot unchanged.
pub fn estimate_at(order: &TwapOrder, now: DateTime<Utc>) -> TwapEstimate {
    if order.is_terminal() {
        return authoritative_estimate(order);
    }

    let Some(progression) = time_progression_pct(order, now) else {
        return authoritative_estimate(order);
    };
    let Some(original_notional) = order.value_basis.original_notional() else {
        return authoritative_estimate(order);
    };

    let remaining_pct = 100.0 - progression;
    let remaining_amount = order.original_amount * remaining_pct / 100.0;
    let remaining_value = original_notional * remaining_pct / 100.0;

    TwapEstimate {
        progression,
        remaining_value: finite_or_zero(remaining_value),
        remaining_amount: finite_or_zero(remaining_amount),
        is_completed: progression >= 100.0,
    }
}

/// Estimate a whole batch against one shared clock reading, keyed by order
/// hash. Orders never disagree about what time it is within a tick.
pub fn estimate_all(orders: &[TwapOrder], now: DateTime<Utc>) -> EstimateBook {
    let mut estimates = HashMap::with_capacity(orders.len());
    for order in orders {
        estimates.insert(order.hash.clone(), estimate_at(order, now));
    }
    EstimateBook {
        computed_at: now,
        estimates,
    }
}

// ---------------------------------------------------------------------------
// Authoritative fallback
// ---------------------------------------------------------------------------

/// Serve the order exactly as the feed last reported it, with no time
/// interpolation. Used for terminal orders and for anything the estimator
/// refuses to interpolate.
pub fn authoritative_estimate(order: &TwapOrder) -> TwapEstimate {
    let default_pct = if order.ended { 100.0 } else { 0.0 };
    let progression = order
        .last_progression
        .filter(|p| p.is_finite())
        .unwrap_or(default_pct)
        .clamp(0.0, 100.0);

    let remaining_pct = 100.0 - progression;
    let remaining_amount = finite_or_zero(order.original_amount * remaining_pct / 100.0);

    let remaining_value = order
        .last_value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .or_else(|| {
            order
                .value_basis
                .original_notional()
                .map(|total| total * remaining_pct / 100.0)
        })
        .map(finite_or_zero)
        .unwrap_or(0.0);

    TwapEstimate {
        progression,
        remaining_value,
        remaining_amount,
        is_completed: order.ended || progression >= 100.0,
    }
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
