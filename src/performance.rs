// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite - Performance Calculator
//
// Turns a budget plus rates into the click / impression / conversion funnel
// and its cost and revenue metrics. Raises only on invalid input; zero
// conversions or impressions are reported as zeros.

use serde::{Deserialize, Serialize};

use crate::rounding::{round_conversions, round_percent, round_units};
use crate::types::{safe_div, Channel, PerformanceResult, RateTriple};

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PerformanceError {
    #[error("{metric} out of range: {value}")]
    InvalidMetric { metric: &'static str, value: f64 },

    #[error("budget must be positive, got {0}")]
    InvalidBudget(f64),

    #[error("channel '{name}' is misconfigured: {source}")]
    InvalidChannel {
        name: String,
        #[source]
        source: Box<PerformanceError>,
    },
}

fn require_positive(metric: &'static str, value: f64) -> Result<(), PerformanceError> {
    // Written negated so NaN fails too.
    if !(value > 0.0) || value.is_infinite() {
        return Err(PerformanceError::InvalidMetric { metric, value });
    }
    Ok(())
}

fn require_non_negative(metric: &'static str, value: f64) -> Result<(), PerformanceError> {
    if !(value >= 0.0) || value.is_infinite() {
        return Err(PerformanceError::InvalidMetric { metric, value });
    }
    Ok(())
}

fn require_budget(budget: f64) -> Result<(), PerformanceError> {
    if !(budget > 0.0) || budget.is_infinite() {
        return Err(PerformanceError::InvalidBudget(budget));
    }
    Ok(())
}

// ─── Funnel Estimate ────────────────────────────────────────────────────────

/// Rounded funnel for a budget spent at fixed rates. CTR and CVR are
/// reported as percentages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FunnelEstimate {
    pub impressions: f64,
    pub clicks: f64,
    pub conversions: f64,
    pub cpa: f64,
    pub ctr: f64,
    pub cvr: f64,
    pub cpc: f64,
}

/// Funnel for `budget` at `metrics` (CTR and CVR as fractions).
pub fn calculate_performance(budget: f64, metrics: &RateTriple) -> Result<FunnelEstimate, PerformanceError> {
    require_positive("cpc", metrics.cpc)?;
    require_positive("ctr", metrics.ctr)?;
    require_non_negative("cvr", metrics.cvr)?;
    require_budget(budget)?;

    let clicks = budget / metrics.cpc;
    let impressions = clicks / metrics.ctr;
    let conversions = clicks * metrics.cvr;
    let cpa = safe_div(budget, conversions);

    Ok(FunnelEstimate {
        impressions: round_units(impressions),
        clicks: round_units(clicks),
        conversions: round_conversions(conversions),
        cpa: round_units(cpa),
        ctr: round_percent(metrics.ctr * 100.0),
        cvr: round_percent(metrics.cvr * 100.0),
        cpc: round_units(metrics.cpc),
    })
}

// ─── Channel Performance ────────────────────────────────────────────────────

fn check_channel(channel: &Channel) -> Result<(), PerformanceError> {
    require_non_negative("budget_ratio", channel.budget_ratio)?;
    require_positive("cpc", channel.cpc)?;
    require_positive("ctr", channel.ctr)?;
    require_non_negative("cvr", channel.cvr)?;
    Ok(())
}

/// Full unrounded performance of `channel` within `total_budget`.
///
/// The channel's `adjustment` percent corrects conversions; every
/// `*_adjusted` field derives from the corrected count.
pub fn calculate_channel_performance(
    channel: &Channel,
    total_budget: f64,
) -> Result<PerformanceResult, PerformanceError> {
    require_budget(total_budget)?;
    check_channel(channel).map_err(|source| PerformanceError::InvalidChannel {
        name: channel.name.clone(),
        source: Box::new(source),
    })?;

    let media_budget = total_budget * channel.budget_ratio / 100.0;
    let clicks = media_budget / channel.cpc;
    let impressions = clicks / (channel.ctr / 100.0);
    let conversions = clicks * channel.cvr / 100.0;
    let revenue = conversions * channel.revenue_per_conversion;

    let raw = PerformanceResult {
        media_budget,
        impressions,
        clicks,
        cpm: safe_div(media_budget, impressions) * 1000.0,
        conversions,
        cpa: safe_div(media_budget, conversions),
        revenue,
        roas: safe_div(revenue, media_budget) * 100.0,
        ..PerformanceResult::zeroed()
    };
    let adjusted_conversions = conversions * (1.0 + channel.adjustment / 100.0);
    let result = raw.with_adjusted_conversions(adjusted_conversions, channel.revenue_per_conversion);

    tracing::debug!(
        channel = %channel.name,
        media_budget,
        conversions = result.conversions_adjusted,
        roas = result.roas_adjusted,
        "channel performance computed"
    );
    Ok(result)
}

// ===========================================================================
// Tests
// ===========================================================================
