// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite - Media Mix Generator
//
// Builds channel lists from benchmark data: a goal-driven automatic mix over
// every known channel, or user-picked channels seeded with benchmark rates.

use serde::{Deserialize, Serialize};

use crate::adjustment::{budget_competition_factor, channel_adjusted_metrics, NEUTRAL_FACTOR};
use crate::allocation::normalize_ratios;
use crate::benchmarks::BenchmarkStore;
use crate::config::CategoryRevenue;
use crate::rounding::{round_percent, round_units};
use crate::types::{channel_display_name, CampaignGoal, Channel, ChannelCategory};

/// Video channels share this fraction of the display pool.
const VIDEO_SHARE_OF_DISPLAY: f64 = 0.2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaMixRequest {
    pub total_budget: f64,
    pub industry: String,
    pub month: u8,
    #[serde(default)]
    pub goal: CampaignGoal,
    /// Benchmark channel keys to leave out (`kakao_SA`, ...).
    #[serde(default)]
    pub excluded: Vec<String>,
}

/// Channels produced from benchmark data plus the keys that had no
/// coverage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GeneratedMix {
    pub channels: Vec<Channel>,
    pub skipped: Vec<String>,
}

/// A user-picked benchmark channel and its budget share.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelSelection {
    pub key: String,
    pub budget_ratio: f64,
}

fn pool_keys<'a>(store: &'a BenchmarkStore, category: ChannelCategory, excluded: &[String]) -> Vec<&'a str> {
    store
        .channel_keys_in(category)
        .into_iter()
        .filter(|key| !excluded.iter().any(|e| e == key))
        .collect()
}

/// Automatic mix for a campaign goal.
///
/// The goal splits the budget between search and display; channels share
/// their category pool equally, video gets a fifth of the display pool, and
/// the resulting ratios are normalized to 100. Rates come from
/// [`channel_adjusted_metrics`] at each channel's own budget.
pub fn generate_media_mix(
    store: &BenchmarkStore,
    revenue: &CategoryRevenue,
    request: &MediaMixRequest,
) -> GeneratedMix {
    let (sa_share, da_share) = request.goal.category_split();
    let budget = request.total_budget;
    let da_budget = budget * da_share;
    let pools = [
        (ChannelCategory::SA, budget * sa_share),
        (ChannelCategory::DA, da_budget),
        (ChannelCategory::VA, da_budget * VIDEO_SHARE_OF_DISPLAY),
    ];

    let mut mix = GeneratedMix::default();
    for (category, pool_budget) in pools {
        let keys = pool_keys(store, category, &request.excluded);
        if keys.is_empty() || !(pool_budget > 0.0) {
            continue;
        }
        let per_channel = pool_budget / keys.len() as f64;
        for key in keys {
            let Some(metrics) =
                channel_adjusted_metrics(store, &request.industry, key, request.month, per_channel)
            else {
                tracing::warn!(industry = %request.industry, channel = key, "no base metrics, channel skipped");
                mix.skipped.push(key.to_string());
                continue;
            };
            mix.channels.push(
                Channel::new(channel_display_name(key), category)
                    .with_ratio(per_channel / budget * 100.0)
                    .with_rates(
                        round_units(metrics.cpc),
                        round_percent(metrics.ctr * 100.0),
                        round_percent(metrics.cvr * 100.0),
                    )
                    .with_revenue(revenue.for_category(category)),
            );
        }
    }

    mix.channels = normalize_ratios(&mix.channels);
    tracing::debug!(
        goal = ?request.goal,
        channels = mix.channels.len(),
        skipped = mix.skipped.len(),
        "media mix generated"
    );
    mix
}

/// Channels for user-picked benchmark keys.
///
/// Benchmark CTR and CVR are scaled by the common seasonality for `month`;
/// CPC by the budget competition factor. Keys without a benchmark entry for
/// `industry`, or without a category suffix, are skipped.
pub fn benchmark_channels(
    store: &BenchmarkStore,
    revenue: &CategoryRevenue,
    industry: &str,
    month: u8,
    total_budget: f64,
    selections: &[ChannelSelection],
) -> GeneratedMix {
    let season = store.seasonality(month).unwrap_or(NEUTRAL_FACTOR);
    let competition = budget_competition_factor(total_budget);

    let mut mix = GeneratedMix::default();
    for selection in selections {
        let key = selection.key.as_str();
        let (Some(category), Some(benchmark)) = (
            ChannelCategory::from_channel_key(key),
            store.channel_benchmark(industry, key),
        ) else {
            tracing::warn!(industry, channel = key, "no benchmark coverage, channel skipped");
            mix.skipped.push(selection.key.clone());
            continue;
        };
        mix.channels.push(
            Channel::new(channel_display_name(key), category)
                .with_ratio(selection.budget_ratio)
                .with_rates(
                    round_units(benchmark.cpc * competition),
                    round_percent(benchmark.ctr * season),
                    round_percent(benchmark.cvr * season),
                )
                .with_revenue(revenue.for_category(category)),
        );
    }
    mix
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::ratio_sum;

    fn store() -> BenchmarkStore {
        BenchmarkStore::builtin().expect("test: builtin benchmarks should parse")
    }

    fn request(goal: CampaignGoal) -> MediaMixRequest {
        MediaMixRequest {
            total_budget: 50_000_000.0,
            industry: "ecommerce".to_string(),
            month: 3,
            goal,
            excluded: Vec::new(),
        }
    }

    fn category_share(channels: &[Channel], category: ChannelCategory) -> f64 {
        channels.iter().filter(|c| c.category == category).map(|c| c.budget_ratio).sum()
    }

    #[test]
    fn mix_covers_every_known_channel() {
        let store = store();
        let mix = generate_media_mix(&store, &CategoryRevenue::default(), &request(CampaignGoal::Balanced));
        assert_eq!(mix.channels.len(), store.channel_keys().count());
        assert!(mix.skipped.is_empty());
        assert!((ratio_sum(&mix.channels) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn conversion_goal_favors_search() {
        let store = store();
        let mix = generate_media_mix(&store, &CategoryRevenue::default(), &request(CampaignGoal::Conversion));
        let sa = category_share(&mix.channels, ChannelCategory::SA);
        let da = category_share(&mix.channels, ChannelCategory::DA);
        let va = category_share(&mix.channels, ChannelCategory::VA);
        // 70 : 30 : 6 before normalization
        assert!((sa - 70.0 / 106.0 * 100.0).abs() < 0.5, "sa = {sa}");
        assert!((da - 30.0 / 106.0 * 100.0).abs() < 0.5, "da = {da}");
        assert!((va - 6.0 / 106.0 * 100.0).abs() < 0.5, "va = {va}");
    }

    #[test]
    fn exclusions_are_respected() {
        let store = store();
        let mut req = request(CampaignGoal::Balanced);
        req.excluded = vec!["youtube_VA".to_string(), "kakao_SA".to_string()];
        let mix = generate_media_mix(&store, &CategoryRevenue::default(), &req);
        assert!(mix.channels.iter().all(|c| c.name != "youtube" && c.name != "kakao"));
        assert_eq!(category_share(&mix.channels, ChannelCategory::VA), 0.0);
    }

    #[test]
    fn rates_are_percentages_with_defaults() {
        let store = store();
        let mix = generate_media_mix(&store, &CategoryRevenue::default(), &request(CampaignGoal::Balanced));
        let google = mix
            .channels
            .iter()
            .find(|c| c.name == "google" && c.category == ChannelCategory::SA)
            .expect("test: google search present");
        // ecommerce base 2% CTR, 2.5% CVR, March neutral; 6.25M per SA channel -> 0.9 competition
        assert_eq!(google.ctr, 2.0);
        assert_eq!(google.cvr, 2.5);
        assert_eq!(google.cpc, 720.0);
        assert_eq!(google.revenue_per_conversion, 100_000.0);
    }

    #[test]
    fn unknown_industry_skips_everything() {
        let store = store();
        let mut req = request(CampaignGoal::Balanced);
        req.industry = "shipbuilding".to_string();
        let mix = generate_media_mix(&store, &CategoryRevenue::default(), &req);
        assert!(mix.channels.is_empty());
        assert_eq!(mix.skipped.len(), store.channel_keys().count());
    }

    #[test]
    fn benchmark_channels_skip_missing_coverage() {
        let store = store();
        let selections = vec![
            ChannelSelection { key: "naver_SA".to_string(), budget_ratio: 60.0 },
            ChannelSelection { key: "daangn_SA".to_string(), budget_ratio: 20.0 },
            ChannelSelection { key: "meta_DA".to_string(), budget_ratio: 20.0 },
        ];
        let mix = benchmark_channels(&store, &CategoryRevenue::default(), "ecommerce", 12, 30_000_000.0, &selections);
        assert_eq!(mix.skipped, vec!["daangn_SA".to_string()]);
        assert_eq!(mix.channels.len(), 2);

        let naver = &mix.channels[0];
        assert_eq!(naver.name, "naver");
        assert_eq!(naver.budget_ratio, 60.0);
        // 2.4% * 1.20 December seasonality
        assert_eq!(naver.ctr, 2.88);
        assert_eq!(naver.cpc, 900.0);

        let meta = &mix.channels[1];
        assert_eq!(meta.category, ChannelCategory::DA);
        assert_eq!(meta.revenue_per_conversion, 80_000.0);
    }
}
