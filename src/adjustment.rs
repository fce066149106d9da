// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite - Adjustment Engine
//
// Composes seasonal, industry and budget-scale factors into corrected
// CTR / CVR / CPC. Seasonality moves engagement (CTR, CVR) only; budget scale
// moves price (CPC) only.

use crate::benchmarks::BenchmarkStore;
use crate::types::RateTriple;

// ─── Constants ──────────────────────────────────────────────────────────────

const SMALL_BUDGET: f64 = 10_000_000.0;
const MID_BUDGET: f64 = 50_000_000.0;
const LARGE_BUDGET: f64 = 100_000_000.0;

const COMPETITION_SMALL: f64 = 0.90;
const COMPETITION_MID: f64 = 1.00;
const COMPETITION_LARGE: f64 = 1.10;
const COMPETITION_XLARGE: f64 = 1.20;

/// Factor applied to a month or industry the store does not know.
pub const NEUTRAL_FACTOR: f64 = 1.0;

// ─── Factors ────────────────────────────────────────────────────────────────

/// CPC multiplier for a budget tier. Larger budgets bid on more contested
/// inventory.
pub fn budget_competition_factor(budget: f64) -> f64 {
    if budget < SMALL_BUDGET {
        COMPETITION_SMALL
    } else if budget < MID_BUDGET {
        COMPETITION_MID
    } else if budget < LARGE_BUDGET {
        COMPETITION_LARGE
    } else {
        COMPETITION_XLARGE
    }
}

/// Common seasonality for `month`, scaled by the industry's high or low
/// season multiplier. High months win when a month is listed in both.
pub fn seasonality(store: &BenchmarkStore, month: u8, industry: &str) -> f64 {
    let common = store.seasonality(month).unwrap_or(NEUTRAL_FACTOR);
    match store.season_weight(industry) {
        Some(weight) if weight.high_months.contains(&month) => common * weight.high_multiplier,
        Some(weight) if weight.low_months.contains(&month) => common * weight.low_multiplier,
        _ => common,
    }
}

// ─── Adjustment ─────────────────────────────────────────────────────────────

/// Apply seasonality to CTR and CVR and budget competition to CPC.
pub fn apply_adjustments(
    store: &BenchmarkStore,
    industry: &str,
    month: u8,
    budget: f64,
    base: &RateTriple,
) -> RateTriple {
    let season = seasonality(store, month, industry);
    let competition = budget_competition_factor(budget);
    RateTriple {
        ctr: base.ctr * season,
        cpc: base.cpc * competition,
        cvr: base.cvr * season,
    }
}

/// Adjusted metrics for one channel: industry base rates times the channel
/// multiplier (neutral when the channel is unknown), then
/// [`apply_adjustments`].
///
/// Returns `None` for an industry with no base rates so the caller can skip
/// the channel.
pub fn channel_adjusted_metrics(
    store: &BenchmarkStore,
    industry: &str,
    channel_key: &str,
    month: u8,
    channel_budget: f64,
) -> Option<RateTriple> {
    let base = store.base_metrics(industry)?;
    let multiplier = store.media_multiplier(channel_key).unwrap_or(&RateTriple::NEUTRAL);
    let channel_base = base.scaled_by(multiplier);
    tracing::trace!(industry, channel_key, month, "channel base rates resolved");
    Some(apply_adjustments(store, industry, month, channel_budget, &channel_base))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> BenchmarkStore {
        BenchmarkStore::builtin().expect("test: builtin benchmarks should parse")
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn competition_tiers() {
        assert_eq!(budget_competition_factor(5_000_000.0), 0.90);
        assert_eq!(budget_competition_factor(9_999_999.0), 0.90);
        assert_eq!(budget_competition_factor(10_000_000.0), 1.00);
        assert_eq!(budget_competition_factor(49_999_999.0), 1.00);
        assert_eq!(budget_competition_factor(50_000_000.0), 1.10);
        assert_eq!(budget_competition_factor(100_000_000.0), 1.20);
        assert_eq!(budget_competition_factor(5_000_000_000.0), 1.20);
    }

    #[test]
    fn seasonality_applies_industry_weight() {
        let store = store();
        // ecommerce: December common 1.20, high-season x1.10
        assert!(close(seasonality(&store, 12, "ecommerce"), 1.32));
        // ecommerce: February common 0.85, low-season x0.92
        assert!(close(seasonality(&store, 2, "ecommerce"), 0.85 * 0.92));
        // March is neither high nor low for ecommerce
        assert!(close(seasonality(&store, 3, "ecommerce"), 1.0));
    }

    #[test]
    fn seasonality_defaults_when_unknown() {
        let store = store();
        assert_eq!(seasonality(&store, 13, "ecommerce"), NEUTRAL_FACTOR);
        assert!(close(seasonality(&store, 11, "shipbuilding"), 1.15));
        let empty = BenchmarkStore::from_json("{}").expect("test: empty store");
        assert_eq!(seasonality(&empty, 6, "ecommerce"), NEUTRAL_FACTOR);
    }

    #[test]
    fn adjustments_split_price_and_engagement() {
        let store = store();
        let base = RateTriple::new(0.02, 1000.0, 0.02);
        let adjusted = apply_adjustments(&store, "ecommerce", 12, 60_000_000.0, &base);
        assert!(close(adjusted.ctr, 0.02 * 1.32));
        assert!(close(adjusted.cvr, 0.02 * 1.32));
        assert!(close(adjusted.cpc, 1100.0));
    }

    #[test]
    fn neutral_month_leaves_rates_alone() {
        let store = store();
        let base = RateTriple::new(0.02, 1000.0, 0.02);
        let adjusted = apply_adjustments(&store, "ecommerce", 3, 10_000_000.0, &base);
        assert!(close(adjusted.ctr, 0.02));
        assert!(close(adjusted.cpc, 1000.0));
        assert!(close(adjusted.cvr, 0.02));
    }

    #[test]
    fn channel_metrics_use_multiplier() {
        let store = store();
        let metrics = channel_adjusted_metrics(&store, "ecommerce", "naver_SA", 3, 20_000_000.0)
            .expect("test: ecommerce is known");
        assert!(close(metrics.ctr, 0.02 * 1.1));
        assert!(close(metrics.cpc, 800.0 * 1.15));
        assert!(close(metrics.cvr, 0.025 * 1.1));
    }

    #[test]
    fn unknown_channel_uses_industry_base() {
        let store = store();
        let metrics = channel_adjusted_metrics(&store, "ecommerce", "carrier_pigeon_DA", 3, 20_000_000.0)
            .expect("test: ecommerce is known");
        assert!(close(metrics.ctr, 0.02));
        assert!(close(metrics.cpc, 800.0));
    }

    #[test]
    fn unknown_industry_is_absent() {
        let store = store();
        assert!(channel_adjusted_metrics(&store, "shipbuilding", "naver_SA", 3, 20_000_000.0).is_none());
    }
}
