// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite - Output Rounding

//! Rounding adapter: converts between the engine's f64 arithmetic and
//! `Decimal` for output-boundary rounding.
//!
//! Intermediate values are never rounded; scenario derivations work on the
//! raw figures and only reported values pass through here. Midpoints round
//! to even, so `0.5 -> 0` and `1.5 -> 2`.

use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::PerformanceResult;

/// Convert f64 to Decimal (non-finite values map to zero).
pub fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

/// Convert Decimal to f64.
pub fn from_decimal(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Round to `dp` decimal places, midpoint to even.
pub fn round_dp(v: f64, dp: u32) -> f64 {
    from_decimal(to_decimal(v).round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven))
}

/// Whole units (impressions, clicks, currency).
pub fn round_units(v: f64) -> f64 {
    round_dp(v, 0)
}

/// Conversions are reported with two decimals.
pub fn round_conversions(v: f64) -> f64 {
    round_dp(v, 2)
}

/// Ratios (ROAS %, CTR %, CVR %) are reported with two decimals.
pub fn round_percent(v: f64) -> f64 {
    round_dp(v, 2)
}

/// Presentation copy of a performance result: whole units for impressions,
/// clicks and money, two decimals for conversions and percentages.
pub fn round_performance(p: &PerformanceResult) -> PerformanceResult {
    PerformanceResult {
        media_budget: round_units(p.media_budget),
        impressions: round_units(p.impressions),
        clicks: round_units(p.clicks),
        cpm: round_units(p.cpm),
        conversions: round_conversions(p.conversions),
        conversions_adjusted: round_conversions(p.conversions_adjusted),
        cpa: round_units(p.cpa),
        cpa_adjusted: round_units(p.cpa_adjusted),
        revenue: round_units(p.revenue),
        revenue_adjusted: round_units(p.revenue_adjusted),
        roas: round_percent(p.roas),
        roas_adjusted: round_percent(p.roas_adjusted),
    }
}
