// Randomized Mix Profiles - each profile draws a fresh media mix per seed
// Profile logic only shapes the request; the engine is exercised unchanged

use std::ops::Range;

use mediamix_engine::mix_generator::{generate_media_mix, MediaMixRequest};
use mediamix_engine::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

// ─── Profile Configuration ──────────────────────────────────────────────────

/// How a profile builds its channel list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixSource {
    /// Hand-specified channels with random rates.
    Manual,
    /// Goal-driven mix generated from benchmarks.
    Generated,
}

pub struct Profile {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub source: MixSource,
    pub budget: Range<f64>,
    pub channels: Range<usize>,
    /// Chance that a manual channel gets an invalid rate.
    pub broken_rate: f64,
    /// When false, ratios are drawn freely and left for normalization.
    pub exact_ratios: bool,
}

impl Profile {
    /// Clamp the channel count range to `max_channels`.
    pub fn channel_range(&self, max_channels: usize) -> Range<usize> {
        let end = self.channels.end.min(max_channels + 1).max(self.channels.start + 1);
        self.channels.start..end
    }
}

pub fn profiles() -> Vec<Profile> {
    vec![
        Profile {
            name: "MIX_SMALL_BUDGET",
            label: "Small budget manual mix",
            category: "manual",
            source: MixSource::Manual,
            budget: 1_000_000.0..10_000_000.0,
            channels: 1..4,
            broken_rate: 0.0,
            exact_ratios: true,
        },
        Profile {
            name: "MIX_ENTERPRISE",
            label: "Enterprise budget manual mix",
            category: "manual",
            source: MixSource::Manual,
            budget: 100_000_000.0..10_000_000_000.0,
            channels: 3..9,
            broken_rate: 0.0,
            exact_ratios: true,
        },
        Profile {
            name: "MIX_UNNORMALIZED",
            label: "Free-form ratios (normalized)",
            category: "allocation",
            source: MixSource::Manual,
            budget: 5_000_000.0..500_000_000.0,
            channels: 2..9,
            broken_rate: 0.0,
            exact_ratios: false,
        },
        Profile {
            name: "MIX_BROKEN_CHANNELS",
            label: "Misconfigured channels isolated",
            category: "isolation",
            source: MixSource::Manual,
            budget: 5_000_000.0..500_000_000.0,
            channels: 2..9,
            broken_rate: 0.3,
            exact_ratios: true,
        },
        Profile {
            name: "MIX_GENERATED",
            label: "Goal-driven generated mix",
            category: "generator",
            source: MixSource::Generated,
            budget: 1_000_000.0..1_000_000_000.0,
            channels: 1..2,
            broken_rate: 0.0,
            exact_ratios: true,
        },
    ]
}

// ─── Request Builders ───────────────────────────────────────────────────────

fn random_goal(rng: &mut ChaCha8Rng) -> CampaignGoal {
    match rng.gen_range(0..3) {
        0 => CampaignGoal::Awareness,
        1 => CampaignGoal::Conversion,
        _ => CampaignGoal::Balanced,
    }
}

/// Ratios summing to exactly 100 with one decimal, remainder on the last.
fn exact_ratios(rng: &mut ChaCha8Rng, n: usize) -> Vec<f64> {
    let weights: Vec<f64> = (0..n).map(|_| rng.gen_range(1.0..10.0)).collect();
    let total: f64 = weights.iter().sum();
    let mut ratios: Vec<f64> = weights.iter().map(|w| (w / total * 1000.0).floor() / 10.0).collect();
    let assigned: f64 = ratios[..n - 1].iter().sum();
    ratios[n - 1] = ((100.0 - assigned) * 10.0).round() / 10.0;
    ratios
}

fn manual_channels(rng: &mut ChaCha8Rng, profile: &Profile, n: usize) -> Vec<Channel> {
    let ratios = if profile.exact_ratios {
        exact_ratios(rng, n)
    } else {
        (0..n).map(|_| rng.gen_range(0.0..80.0)).collect()
    };

    ratios
        .into_iter()
        .enumerate()
        .map(|(i, ratio)| {
            let category = ChannelCategory::ALL[rng.gen_range(0..3)];
            let mut cpc = rng.gen_range(10.0..5_000.0);
            let ctr = rng.gen_range(0.1..10.0);
            let cvr = rng.gen_range(0.0..10.0);
            if rng.gen_bool(profile.broken_rate) {
                cpc = 0.0;
            }
            Channel::new(format!("ch{i}"), category)
                .with_ratio(ratio)
                .with_rates(cpc, ctr, cvr)
                .with_revenue(rng.gen_range(1_000.0..500_000.0))
                .with_adjustment(rng.gen_range(-50.0..50.0))
        })
        .collect()
}

/// Draw one simulation request for `profile`.
pub fn build_request(
    rng: &mut ChaCha8Rng,
    profile: &Profile,
    store: &BenchmarkStore,
    config: &EngineConfig,
    max_channels: usize,
) -> SimulationRequest {
    let industries: Vec<&str> = store.industries().collect();
    let industry = industries[rng.gen_range(0..industries.len())].to_string();
    let month = rng.gen_range(1..=12u8);
    let goal = random_goal(rng);
    let total_budget = rng.gen_range(profile.budget.clone());

    let channels = match profile.source {
        MixSource::Manual => {
            let n = rng.gen_range(profile.channel_range(max_channels));
            manual_channels(rng, profile, n)
        }
        MixSource::Generated => {
            let request = MediaMixRequest {
                total_budget,
                industry: industry.clone(),
                month,
                goal,
                excluded: Vec::new(),
            };
            generate_media_mix(store, &config.default_revenue_per_conversion, &request).channels
        }
    };

    SimulationRequest {
        total_budget,
        industry,
        month,
        goal,
        scenario_adjustment_pct: Some(rng.gen_range(1.0..30.0)),
        channels,
    }
}
