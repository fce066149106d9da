// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite - Scenario Generator
//
// Builds the conservative / base / aggressive variants. Each channel is
// computed once; the outer scenarios re-weight its adjustment-corrected
// conversions and re-derive the dependent fields. A failing channel becomes
// a zeroed placeholder in all three variants, so every variant always has
// one entry per input channel in input order.

use serde::{Deserialize, Serialize};

use crate::grading::{efficiency_score, EfficiencyScore};
use crate::performance::calculate_channel_performance;
use crate::types::{safe_div, Channel, ChannelOutcome, Grade, ScenarioKind, ScenarioSet};

// ─── Generation ─────────────────────────────────────────────────────────────

/// Compute every channel and derive the three scenarios at `width_pct`.
///
/// Never fails: per-channel errors are captured in the outcome.
pub fn generate_scenarios(channels: &[Channel], total_budget: f64, width_pct: f64) -> ScenarioSet {
    let mut set = ScenarioSet::default();

    for channel in channels {
        match calculate_channel_performance(channel, total_budget) {
            Ok(base) => {
                for kind in ScenarioKind::ALL {
                    let performance = match kind {
                        ScenarioKind::Base => base,
                        _ => base.with_adjusted_conversions(
                            base.conversions_adjusted * kind.conversion_factor(width_pct),
                            channel.revenue_per_conversion,
                        ),
                    };
                    set.get_mut(kind).push(ChannelOutcome::computed(channel.clone(), performance));
                }
            }
            Err(err) => {
                tracing::warn!(channel = %channel.name, error = %err, "channel replaced by placeholder");
                let message = format!("calculation failed: {err}");
                for kind in ScenarioKind::ALL {
                    set.get_mut(kind).push(ChannelOutcome::failed(channel.clone(), message.clone()));
                }
            }
        }
    }

    tracing::debug!(
        channels = channels.len(),
        failed = set.base.iter().filter(|o| o.is_error()).count(),
        width_pct,
        "scenario set generated"
    );
    set
}

// ─── Summary ────────────────────────────────────────────────────────────────

/// Totals and averages over one scenario. Placeholders contribute zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScenarioSummary {
    pub kind: ScenarioKind,
    pub total_budget: f64,
    pub total_impressions: f64,
    pub total_clicks: f64,
    pub total_conversions: f64,
    pub total_revenue: f64,
    pub avg_ctr: f64,
    pub avg_cvr: f64,
    pub avg_cpa: f64,
    pub avg_roas: f64,
    pub grade: Grade,
    pub score: EfficiencyScore,
}

pub fn summarize(kind: ScenarioKind, outcomes: &[ChannelOutcome]) -> ScenarioSummary {
    let mut budget = 0.0;
    let mut impressions = 0.0;
    let mut clicks = 0.0;
    let mut conversions = 0.0;
    let mut revenue = 0.0;

    for p in outcomes.iter().map(|o| &o.performance) {
        budget += p.media_budget;
        impressions += p.impressions;
        clicks += p.clicks;
        conversions += p.conversions_adjusted;
        revenue += p.revenue_adjusted;
    }

    let avg_cpa = safe_div(budget, conversions);
    let avg_roas = safe_div(revenue, budget) * 100.0;
    let score = efficiency_score(avg_cpa, avg_roas, conversions);

    ScenarioSummary {
        kind,
        total_budget: budget,
        total_impressions: impressions,
        total_clicks: clicks,
        total_conversions: conversions,
        total_revenue: revenue,
        avg_ctr: safe_div(clicks, impressions) * 100.0,
        avg_cvr: safe_div(conversions, clicks) * 100.0,
        avg_cpa,
        avg_roas,
        grade: score.grade(),
        score,
    }
}

/// Summaries in conservative, base, aggressive order.
pub fn summarize_all(set: &ScenarioSet) -> Vec<ScenarioSummary> {
    set.iter().map(|(kind, outcomes)| summarize(kind, outcomes)).collect()
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChannelCategory;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn channel(name: &str, ratio: f64) -> Channel {
        Channel::new(name, ChannelCategory::SA)
            .with_ratio(ratio)
            .with_rates(1000.0, 2.0, 2.0)
            .with_revenue(50_000.0)
    }

    #[test]
    fn variants_reweight_adjusted_conversions() {
        let channels = vec![channel("a", 100.0).with_adjustment(10.0)];
        let set = generate_scenarios(&channels, 10_000_000.0, 10.0);
        let base = set.base[0].performance;
        let low = set.conservative[0].performance;
        let high = set.aggressive[0].performance;

        assert!(close(base.conversions_adjusted, 220.0));
        assert!(close(low.conversions_adjusted, 198.0));
        assert!(close(high.conversions_adjusted, 242.0));
        assert!(close(low.revenue_adjusted, 198.0 * 50_000.0));
        assert!(close(high.cpa_adjusted, 10_000_000.0 / 242.0));
        // Raw funnel is shared by all variants.
        assert_eq!(low.clicks, base.clicks);
        assert_eq!(high.conversions, base.conversions);
    }

    #[test]
    fn failure_is_isolated_per_channel() {
        let broken = channel("broken", 50.0).with_rates(0.0, 2.0, 2.0);
        let channels = vec![channel("ok", 50.0), broken];
        let set = generate_scenarios(&channels, 10_000_000.0, 5.0);

        for (_, outcomes) in set.iter() {
            assert_eq!(outcomes.len(), 2);
            assert!(!outcomes[0].is_error());
            assert!(outcomes[1].is_error());
            assert_eq!(outcomes[1].channel.name, "broken");
            assert_eq!(outcomes[1].performance.media_budget, 0.0);
        }
    }

    #[test]
    fn invalid_total_budget_fails_every_channel() {
        let channels = vec![channel("a", 50.0), channel("b", 50.0)];
        let set = generate_scenarios(&channels, 0.0, 5.0);
        assert!(set.base.iter().all(ChannelOutcome::is_error));
        assert_eq!(set.aggressive.len(), 2);
    }

    #[test]
    fn generation_is_deterministic() {
        let channels = vec![channel("a", 30.0), channel("b", 70.0).with_adjustment(-5.0)];
        let first = generate_scenarios(&channels, 25_000_000.0, 7.5);
        let second = generate_scenarios(&channels, 25_000_000.0, 7.5);
        assert_eq!(first, second);
    }

    #[test]
    fn summary_totals() {
        let channels = vec![channel("a", 50.0), channel("b", 50.0)];
        let set = generate_scenarios(&channels, 10_000_000.0, 5.0);
        let summary = summarize(ScenarioKind::Base, &set.base);

        assert!(close(summary.total_budget, 10_000_000.0));
        assert!(close(summary.total_clicks, 10_000.0));
        assert!(close(summary.total_conversions, 200.0));
        assert!(close(summary.avg_cpa, 50_000.0));
        assert!(close(summary.avg_roas, 100.0));
        assert!(close(summary.avg_ctr, 2.0));
        assert!(close(summary.avg_cvr, 2.0));
        // ROAS 100 -> 10, volume 200 -> 20, CPA 50,000 -> 20
        assert_eq!(summary.score.total, 50);
        assert_eq!(summary.grade, Grade::B);
    }

    #[test]
    fn summary_of_placeholders_is_zero() {
        let broken = channel("broken", 100.0).with_rates(1000.0, 0.0, 2.0);
        let set = generate_scenarios(&[broken], 10_000_000.0, 5.0);
        let summary = summarize(ScenarioKind::Base, &set.base);
        assert_eq!(summary.total_budget, 0.0);
        assert_eq!(summary.avg_cpa, 0.0);
        assert_eq!(summary.avg_roas, 0.0);
        assert_eq!(summary.grade, Grade::C);
    }

    #[test]
    fn summaries_follow_scenario_order() {
        let set = generate_scenarios(&[channel("a", 100.0)], 10_000_000.0, 5.0);
        let kinds: Vec<ScenarioKind> = summarize_all(&set).iter().map(|s| s.kind).collect();
        assert_eq!(kinds, ScenarioKind::ALL.to_vec());
    }
}
