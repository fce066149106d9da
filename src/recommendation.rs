// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite - Recommendation Engine
//
// Channel-level advice over the base scenario. Each rule is an independent
// predicate; rules never suppress one another and are evaluated in the
// order of `RecommendationRule::ALL`.

use crate::types::{Advisory, AdvisoryDetail, AdvisoryKind, ChannelOutcome};

// ─── Constants ──────────────────────────────────────────────────────────────

/// A single channel above this budget share is a dependency risk.
pub const RISK_RATIO_THRESHOLD: f64 = 50.0;

/// Worst CPA must exceed best CPA by this factor to suggest a shift.
const CPA_SPREAD_FACTOR: f64 = 1.5;
/// Share of the worst channel's ratio moved to the best channel.
const SHIFT_FRACTION: f64 = 0.1;

/// Efficient channels below this share are considered underweighted.
const UNDERWEIGHT_RATIO: f64 = 20.0;
/// Percentage points added to an underweighted channel.
const UNDERWEIGHT_BOOST_PP: f64 = 10.0;
/// How many of the cheapest channels are checked for underweighting.
const UNDERWEIGHT_CANDIDATES: usize = 2;

const ROAS_TARGET: f64 = 150.0;

const LOW_VOLUME: f64 = 200.0;
const BUDGET_UPLIFT: f64 = 1.3;

// ─── Context ────────────────────────────────────────────────────────────────

/// Inputs shared by every rule.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationContext<'a> {
    pub outcomes: &'a [ChannelOutcome],
    pub total_budget: f64,
}

impl<'a> RecommendationContext<'a> {
    pub fn new(outcomes: &'a [ChannelOutcome], total_budget: f64) -> Self {
        Self { outcomes, total_budget }
    }

    /// Computed channels with a positive CPA, cheapest first. Ties keep
    /// input order.
    fn ranked_by_cpa(&self) -> Vec<&'a ChannelOutcome> {
        let mut ranked: Vec<&ChannelOutcome> = self
            .outcomes
            .iter()
            .filter(|o| !o.is_error() && o.performance.cpa > 0.0)
            .collect();
        ranked.sort_by(|a, b| a.performance.cpa.total_cmp(&b.performance.cpa));
        ranked
    }

    fn total_conversions(&self) -> f64 {
        self.outcomes.iter().map(|o| o.performance.conversions_adjusted).sum()
    }
}

/// Conversions bought by `spend` at a channel's own CPC and CVR, or `None`
/// when the channel cannot convert.
fn conversions_for_spend(outcome: &ChannelOutcome, spend: f64) -> Option<f64> {
    let cpc = outcome.channel.cpc;
    let cvr = outcome.channel.cvr / 100.0;
    if cpc > 0.0 && cvr > 0.0 {
        Some(spend / cpc * cvr)
    } else {
        None
    }
}

// ─── Rules ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationRule {
    EfficiencyShift,
    UnderweightedChannel,
    ConcentrationRisk,
    RoasImprovement,
    VolumeInsufficiency,
}

impl RecommendationRule {
    pub const ALL: [RecommendationRule; 5] = [
        Self::EfficiencyShift,
        Self::UnderweightedChannel,
        Self::ConcentrationRisk,
        Self::RoasImprovement,
        Self::VolumeInsufficiency,
    ];

    pub fn evaluate(&self, ctx: &RecommendationContext<'_>) -> Vec<Advisory> {
        match self {
            Self::EfficiencyShift => efficiency_shift(ctx).into_iter().collect(),
            Self::UnderweightedChannel => underweighted_channels(ctx),
            Self::ConcentrationRisk => concentration_risk(ctx),
            Self::RoasImprovement => roas_improvement(ctx),
            Self::VolumeInsufficiency => volume_insufficiency(ctx).into_iter().collect(),
        }
    }
}

fn efficiency_shift(ctx: &RecommendationContext<'_>) -> Option<Advisory> {
    let ranked = ctx.ranked_by_cpa();
    if ranked.len() < 2 {
        return None;
    }
    let best = ranked[0];
    let worst = ranked[ranked.len() - 1];
    if worst.performance.cpa <= best.performance.cpa * CPA_SPREAD_FACTOR {
        return None;
    }

    let shift_ratio = worst.channel.budget_ratio * SHIFT_FRACTION;
    let shift_budget = ctx.total_budget * shift_ratio / 100.0;
    let additional = conversions_for_spend(best, shift_budget)?;

    let before = ctx.total_conversions();
    let after = before + additional;
    let avg_cpa_before = if before > 0.0 { ctx.total_budget / before } else { 0.0 };
    let avg_cpa_after = if after > 0.0 { ctx.total_budget / after } else { 0.0 };
    let from_after = worst.channel.budget_ratio - shift_ratio;
    let to_after = best.channel.budget_ratio + shift_ratio;

    Some(Advisory {
        kind: AdvisoryKind::Info,
        title: "Rebalance toward efficient channel".to_string(),
        message: format!(
            "Moving {shift_ratio:.1}pp from {} ({:.1}% to {from_after:.1}%) to {} ({:.1}% to {to_after:.1}%) \
             adds about {additional:.0} conversions and lowers average CPA by {:.0}.",
            worst.channel.name,
            worst.channel.budget_ratio,
            best.channel.name,
            best.channel.budget_ratio,
            avg_cpa_before - avg_cpa_after,
        ),
        detail: AdvisoryDetail::EfficiencyShift {
            from_channel: worst.channel.name.clone(),
            to_channel: best.channel.name.clone(),
            shift_ratio,
            from_ratio_after: from_after,
            to_ratio_after: to_after,
            additional_conversions: additional,
            avg_cpa_before,
            avg_cpa_after,
            cpa_improvement: avg_cpa_before - avg_cpa_after,
        },
    })
}

fn underweighted_channels(ctx: &RecommendationContext<'_>) -> Vec<Advisory> {
    let boost_budget = ctx.total_budget * UNDERWEIGHT_BOOST_PP / 100.0;
    ctx.ranked_by_cpa()
        .into_iter()
        .take(UNDERWEIGHT_CANDIDATES)
        .filter(|o| o.channel.budget_ratio < UNDERWEIGHT_RATIO)
        .filter_map(|o| {
            let additional = conversions_for_spend(o, boost_budget)?;
            let marginal_cpa = if additional > 0.0 { boost_budget / additional } else { 0.0 };
            let current = o.channel.budget_ratio;
            let proposed = current + UNDERWEIGHT_BOOST_PP;
            Some(Advisory {
                kind: AdvisoryKind::Info,
                title: "Underweighted efficient channel".to_string(),
                message: format!(
                    "{} (CPA {:.0}) at {current:.1}% could grow to {proposed:.1}%, adding about \
                     {additional:.0} conversions at a CPA near {marginal_cpa:.0}.",
                    o.channel.name, o.performance.cpa,
                ),
                detail: AdvisoryDetail::UnderweightedChannel {
                    channel: o.channel.name.clone(),
                    current_ratio: current,
                    proposed_ratio: proposed,
                    current_cpa: o.performance.cpa,
                    additional_conversions: additional,
                    marginal_cpa,
                },
            })
        })
        .collect()
}

fn concentration_risk(ctx: &RecommendationContext<'_>) -> Vec<Advisory> {
    ctx.outcomes
        .iter()
        .filter(|o| o.channel.budget_ratio > RISK_RATIO_THRESHOLD)
        .map(|o| Advisory {
            kind: AdvisoryKind::Warning,
            title: "Channel concentration".to_string(),
            message: format!(
                "{} carries {:.1}% of the budget. An algorithm or policy change on that platform \
                 would hit the whole campaign; consider spreading spend.",
                o.channel.name, o.channel.budget_ratio,
            ),
            detail: AdvisoryDetail::ConcentrationRisk {
                channel: o.channel.name.clone(),
                budget_ratio: o.channel.budget_ratio,
                threshold: RISK_RATIO_THRESHOLD,
            },
        })
        .collect()
}

fn roas_improvement(ctx: &RecommendationContext<'_>) -> Vec<Advisory> {
    ctx.outcomes
        .iter()
        .filter(|o| o.performance.roas > 0.0 && o.performance.roas < ROAS_TARGET)
        .map(|o| {
            let current = o.channel.revenue_per_conversion;
            let target = o.performance.cpa * ROAS_TARGET / 100.0;
            let gap = target - current;
            Advisory {
                kind: AdvisoryKind::Warning,
                title: "Low ROAS".to_string(),
                message: format!(
                    "{} returns {:.1}% ROAS. Raising revenue per conversion from {current:.0} to \
                     {target:.0} (+{gap:.0}) reaches {ROAS_TARGET:.0}%.",
                    o.channel.name, o.performance.roas,
                ),
                detail: AdvisoryDetail::RoasImprovement {
                    channel: o.channel.name.clone(),
                    roas: o.performance.roas,
                    current_revenue_per_conversion: current,
                    target_revenue_per_conversion: target,
                    revenue_gap: gap,
                },
            }
        })
        .collect()
}

fn volume_insufficiency(ctx: &RecommendationContext<'_>) -> Option<Advisory> {
    let total = ctx.total_conversions();
    if !(total > 0.0 && total < LOW_VOLUME) {
        return None;
    }
    let proposed_budget = ctx.total_budget * BUDGET_UPLIFT;
    let projected = total * BUDGET_UPLIFT;
    Some(Advisory {
        kind: AdvisoryKind::Info,
        title: "Conversion volume too low".to_string(),
        message: format!(
            "Expected conversions ({total:.0}) are thin. Raising the budget from {:.0} to \
             {proposed_budget:.0} (+30%) projects about {projected:.0} conversions.",
            ctx.total_budget,
        ),
        detail: AdvisoryDetail::VolumeInsufficiency {
            total_conversions: total,
            current_budget: ctx.total_budget,
            proposed_budget,
            projected_conversions: projected,
        },
    })
}

/// Evaluate every rule over the base scenario.
pub fn generate_recommendations(base: &[ChannelOutcome], total_budget: f64) -> Vec<Advisory> {
    if base.is_empty() {
        return Vec::new();
    }
    let ctx = RecommendationContext::new(base, total_budget);
    RecommendationRule::ALL
        .iter()
        .flat_map(|rule| rule.evaluate(&ctx))
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::generate_scenarios;
    use crate::types::{Channel, ChannelCategory};

    const BUDGET: f64 = 10_000_000.0;

    fn channel(name: &str, ratio: f64, cpc: f64, cvr: f64, revenue: f64) -> Channel {
        Channel::new(name, ChannelCategory::SA)
            .with_ratio(ratio)
            .with_rates(cpc, 2.0, cvr)
            .with_revenue(revenue)
    }

    fn base(channels: &[Channel]) -> Vec<ChannelOutcome> {
        generate_scenarios(channels, BUDGET, 5.0).base
    }

    fn details(advisories: &[Advisory]) -> Vec<&AdvisoryDetail> {
        advisories.iter().map(|a| &a.detail).collect()
    }

    #[test]
    fn concentration_fires_for_majority_channel_only() {
        let outcomes = base(&[
            channel("big", 60.0, 1000.0, 2.0, 50_000.0),
            channel("small", 40.0, 1000.0, 2.0, 50_000.0),
        ]);
        let ctx = RecommendationContext::new(&outcomes, BUDGET);
        let advisories = RecommendationRule::ConcentrationRisk.evaluate(&ctx);
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].kind, AdvisoryKind::Warning);
        match &advisories[0].detail {
            AdvisoryDetail::ConcentrationRisk { channel, budget_ratio, threshold } => {
                assert_eq!(channel, "big");
                assert_eq!(*budget_ratio, 60.0);
                assert_eq!(*threshold, 50.0);
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn exactly_half_is_not_concentrated() {
        let outcomes = base(&[
            channel("a", 50.0, 1000.0, 2.0, 50_000.0),
            channel("b", 50.0, 1000.0, 2.0, 50_000.0),
        ]);
        let ctx = RecommendationContext::new(&outcomes, BUDGET);
        assert!(RecommendationRule::ConcentrationRisk.evaluate(&ctx).is_empty());
    }

    #[test]
    fn efficiency_shift_moves_ten_percent_of_worst() {
        // cheap: CPA 1000/0.04 = 25,000; pricey: CPA 2000/0.02 = 100,000
        let outcomes = base(&[
            channel("cheap", 40.0, 1000.0, 4.0, 50_000.0),
            channel("pricey", 60.0, 2000.0, 2.0, 50_000.0),
        ]);
        let ctx = RecommendationContext::new(&outcomes, BUDGET);
        let advisories = RecommendationRule::EfficiencyShift.evaluate(&ctx);
        assert_eq!(advisories.len(), 1);
        match &advisories[0].detail {
            AdvisoryDetail::EfficiencyShift {
                from_channel,
                to_channel,
                shift_ratio,
                from_ratio_after,
                to_ratio_after,
                additional_conversions,
                cpa_improvement,
                ..
            } => {
                assert_eq!(from_channel, "pricey");
                assert_eq!(to_channel, "cheap");
                assert!((shift_ratio - 6.0).abs() < 1e-9);
                assert!((from_ratio_after - 54.0).abs() < 1e-9);
                assert!((to_ratio_after - 46.0).abs() < 1e-9);
                // 600,000 / 1000 * 0.04 = 24
                assert!((additional_conversions - 24.0).abs() < 1e-9);
                assert!(*cpa_improvement > 0.0);
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn no_shift_when_spread_is_small() {
        let outcomes = base(&[
            channel("a", 50.0, 1000.0, 2.0, 50_000.0),
            channel("b", 50.0, 1200.0, 2.0, 50_000.0),
        ]);
        let ctx = RecommendationContext::new(&outcomes, BUDGET);
        assert!(RecommendationRule::EfficiencyShift.evaluate(&ctx).is_empty());
    }

    #[test]
    fn underweighted_cheap_channel_gets_boost() {
        let outcomes = base(&[
            channel("niche", 10.0, 500.0, 5.0, 50_000.0),
            channel("bulk", 45.0, 1000.0, 2.0, 50_000.0),
            channel("rest", 45.0, 1000.0, 2.0, 50_000.0),
        ]);
        let ctx = RecommendationContext::new(&outcomes, BUDGET);
        let advisories = RecommendationRule::UnderweightedChannel.evaluate(&ctx);
        assert_eq!(advisories.len(), 1);
        match &advisories[0].detail {
            AdvisoryDetail::UnderweightedChannel { channel, proposed_ratio, additional_conversions, marginal_cpa, .. } => {
                assert_eq!(channel, "niche");
                assert_eq!(*proposed_ratio, 20.0);
                // 1,000,000 / 500 * 0.05 = 100
                assert!((additional_conversions - 100.0).abs() < 1e-9);
                assert!((marginal_cpa - 10_000.0).abs() < 1e-6);
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn low_roas_gets_revenue_target() {
        // CPA 50,000, revenue 50,000 -> ROAS 100
        let outcomes = base(&[channel("a", 100.0, 1000.0, 2.0, 50_000.0)]);
        let ctx = RecommendationContext::new(&outcomes, BUDGET);
        let advisories = RecommendationRule::RoasImprovement.evaluate(&ctx);
        assert_eq!(advisories.len(), 1);
        match &advisories[0].detail {
            AdvisoryDetail::RoasImprovement { target_revenue_per_conversion, revenue_gap, .. } => {
                assert!((target_revenue_per_conversion - 75_000.0).abs() < 1e-6);
                assert!((revenue_gap - 25_000.0).abs() < 1e-6);
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn low_volume_proposes_uplift() {
        // 10,000 clicks * 1% = 100 conversions
        let outcomes = base(&[channel("a", 100.0, 1000.0, 1.0, 200_000.0)]);
        let ctx = RecommendationContext::new(&outcomes, BUDGET);
        let advisories = RecommendationRule::VolumeInsufficiency.evaluate(&ctx);
        assert_eq!(advisories.len(), 1);
        match &advisories[0].detail {
            AdvisoryDetail::VolumeInsufficiency { proposed_budget, projected_conversions, .. } => {
                assert!((proposed_budget - 13_000_000.0).abs() < 1e-6);
                assert!((projected_conversions - 130.0).abs() < 1e-6);
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn rules_fire_in_fixed_order() {
        let outcomes = base(&[
            channel("cheap", 10.0, 1000.0, 4.0, 50_000.0),
            channel("pricey", 90.0, 2000.0, 0.5, 50_000.0),
        ]);
        let advisories = generate_recommendations(&outcomes, BUDGET);
        let rules: Vec<&str> = details(&advisories)
            .iter()
            .map(|d| match d {
                AdvisoryDetail::EfficiencyShift { .. } => "shift",
                AdvisoryDetail::UnderweightedChannel { .. } => "underweight",
                AdvisoryDetail::ConcentrationRisk { .. } => "concentration",
                AdvisoryDetail::RoasImprovement { .. } => "roas",
                AdvisoryDetail::VolumeInsufficiency { .. } => "volume",
                _ => "other",
            })
            .collect();
        assert_eq!(rules, vec!["shift", "underweight", "concentration", "roas", "volume"]);
    }

    #[test]
    fn errored_channels_are_not_ranked() {
        let broken = channel("broken", 50.0, 0.0, 2.0, 50_000.0);
        let outcomes = base(&[channel("ok", 50.0, 1000.0, 2.0, 50_000.0), broken]);
        let ctx = RecommendationContext::new(&outcomes, BUDGET);
        assert_eq!(ctx.ranked_by_cpa().len(), 1);
        assert!(RecommendationRule::EfficiencyShift.evaluate(&ctx).is_empty());
    }

    #[test]
    fn empty_base_yields_nothing() {
        assert!(generate_recommendations(&[], BUDGET).is_empty());
    }
}
