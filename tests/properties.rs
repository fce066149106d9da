use mediamix_engine::allocation::{normalize_ratios, ratio_sum};
use mediamix_engine::performance::calculate_channel_performance;
use mediamix_engine::scenario::generate_scenarios;
use mediamix_engine::*;
use proptest::prelude::*;

fn rel_close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() <= 1e-9 * expected.abs().max(1.0)
}

fn arb_category() -> impl Strategy<Value = ChannelCategory> {
    prop_oneof![
        Just(ChannelCategory::SA),
        Just(ChannelCategory::DA),
        Just(ChannelCategory::VA),
    ]
}

/// A channel with valid rates and an arbitrary ratio.
fn arb_channel(ratio: f64) -> impl Strategy<Value = Channel> {
    (
        arb_category(),
        10.0..100_000.0f64,
        0.01..100.0f64,
        0.0..100.0f64,
        1_000.0..1_000_000.0f64,
        -50.0..50.0f64,
    )
        .prop_map(move |(category, cpc, ctr, cvr, revenue, adjustment)| {
            Channel::new("ch", category)
                .with_ratio(ratio)
                .with_rates(cpc, ctr, cvr)
                .with_revenue(revenue)
                .with_adjustment(adjustment)
        })
}

/// 1-8 channels whose ratios sum to 100.
fn arb_mix() -> impl Strategy<Value = Vec<Channel>> {
    prop::collection::vec(1.0..10.0f64, 1..=8).prop_flat_map(|weights| {
        let total: f64 = weights.iter().sum();
        weights
            .iter()
            .map(|w| arb_channel(w / total * 100.0))
            .collect::<Vec<_>>()
    })
}

// ── Funnel identities ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn funnel_identities_hold(
        channel in arb_channel(100.0),
        budget in 1_000_000.0..10_000_000_000.0f64,
    ) {
        let p = calculate_channel_performance(&channel, budget).expect("test: valid channel");
        let clicks = budget / channel.cpc;
        prop_assert!(rel_close(p.media_budget, budget));
        prop_assert!(rel_close(p.clicks, clicks));
        prop_assert!(rel_close(p.impressions, clicks / (channel.ctr / 100.0)));
        prop_assert!(rel_close(p.conversions, clicks * channel.cvr / 100.0));
        if p.conversions > 0.0 {
            prop_assert!(rel_close(p.cpa * p.conversions, budget));
        } else {
            prop_assert_eq!(p.cpa, 0.0);
        }
    }
}

// ── Budget conservation ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn media_budgets_sum_to_total(
        channels in arb_mix(),
        budget in 1_000_000.0..10_000_000_000.0f64,
    ) {
        let set = generate_scenarios(&channels, budget, 5.0);
        let spent: f64 = set.base.iter().map(|o| o.performance.media_budget).sum();
        prop_assert!(rel_close(spent, budget), "spent {} of {}", spent, budget);
    }
}

// ── Scenario identity ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn outer_scenarios_scale_base(
        channels in arb_mix(),
        width in 1.0..30.0f64,
    ) {
        let set = generate_scenarios(&channels, 50_000_000.0, width);
        prop_assert_eq!(set.conservative.len(), channels.len());
        prop_assert_eq!(set.aggressive.len(), channels.len());
        for (i, base) in set.base.iter().enumerate() {
            let p = &base.performance;
            let corrected = p.conversions * (1.0 + base.channel.adjustment / 100.0);
            prop_assert!(rel_close(p.conversions_adjusted, corrected));
            prop_assert!(rel_close(
                set.conservative[i].performance.conversions_adjusted,
                p.conversions_adjusted * (1.0 - width / 100.0),
            ));
            prop_assert!(rel_close(
                set.aggressive[i].performance.conversions_adjusted,
                p.conversions_adjusted * (1.0 + width / 100.0),
            ));
        }
    }
}

// ── Grade monotonicity ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn grade_never_drops_when_an_input_improves(
        cpa in 1.0..200_000.0f64,
        roas in 0.0..500.0f64,
        conversions in 0.0..2_000.0f64,
        gain in 0.0..1_000.0f64,
    ) {
        let grade = calculate_efficiency_grade(cpa, roas, conversions);
        prop_assert!(calculate_efficiency_grade(cpa, roas + gain, conversions) >= grade);
        prop_assert!(calculate_efficiency_grade(cpa, roas, conversions + gain) >= grade);
        prop_assert!(calculate_efficiency_grade(cpa / (1.0 + gain), roas, conversions) >= grade);
    }
}

// ── Idempotence ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn scenario_generation_is_pure(
        channels in arb_mix(),
        budget in 1_000_000.0..1_000_000_000.0f64,
    ) {
        let snapshot = channels.clone();
        let first = generate_scenarios(&channels, budget, 5.0);
        let second = generate_scenarios(&channels, budget, 5.0);
        prop_assert_eq!(first, second);
        prop_assert_eq!(channels, snapshot);
    }
}

// ── Normalization ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn normalized_ratios_sum_to_hundred(
        ratios in prop::collection::vec(prop_oneof![Just(0.0), 0.0..1.0f64, 0.0..500.0f64], 1..=10),
    ) {
        let channels: Vec<Channel> = ratios
            .iter()
            .map(|r| Channel::new("ch", ChannelCategory::SA).with_ratio(*r))
            .collect();
        let normalized = normalize_ratios(&channels);
        prop_assert_eq!(normalized.len(), channels.len());
        prop_assert!((ratio_sum(&normalized) - 100.0).abs() <= 0.01 + 1e-9);
        for channel in &normalized {
            prop_assert!(channel.budget_ratio >= 0.0, "negative ratio in {:?}", normalized);
        }
        prop_assert!((ratio_sum(&channels) - ratios.iter().sum::<f64>()).abs() < 1e-9);
    }
}
