// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite - Target Planner
//
// Back-solves the budget for a conversion target at a target CPA, spreads it
// over search and display per the campaign goal and predicts whether the
// target is reachable.

use serde::{Deserialize, Serialize};

use crate::adjustment::channel_adjusted_metrics;
use crate::benchmarks::BenchmarkStore;
use crate::performance::{calculate_performance, FunnelEstimate, PerformanceError};
use crate::types::{channel_display_name, safe_div, CampaignGoal, ChannelCategory};

pub const MIN_CONFIDENCE: f64 = 0.5;
pub const MAX_CONFIDENCE: f64 = 1.5;

const ACHIEVABLE_PCT: f64 = 100.0;
const NEEDS_IMPROVEMENT_PCT: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("target conversions and target CPA must be positive")]
    InvalidTarget,

    #[error("confidence {0} is outside 0.5-1.5")]
    InvalidConfidence(f64),

    #[error(transparent)]
    Performance(#[from] PerformanceError),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanRequest {
    pub industry: String,
    pub month: u8,
    pub target_conversions: f64,
    pub target_cpa: f64,
    #[serde(default)]
    pub goal: CampaignGoal,
    /// Prediction scale, 1.0 is neutral.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub excluded: Vec<String>,
}

fn default_confidence() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outlook {
    Achievable,
    NeedsImprovement,
    Unlikely,
}

impl Outlook {
    pub fn from_achievement(rate_pct: f64) -> Self {
        if rate_pct >= ACHIEVABLE_PCT {
            Self::Achievable
        } else if rate_pct >= NEEDS_IMPROVEMENT_PCT {
            Self::NeedsImprovement
        } else {
            Self::Unlikely
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannedChannel {
    pub name: String,
    pub category: ChannelCategory,
    pub budget: f64,
    pub budget_ratio: f64,
    pub funnel: FunnelEstimate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetPlan {
    pub required_budget: f64,
    pub target_conversions: f64,
    pub target_cpa: f64,
    pub predicted_conversions: f64,
    pub predicted_cpa: f64,
    pub achievement_rate: f64,
    pub outlook: Outlook,
    pub channels: Vec<PlannedChannel>,
}

/// Plan the budget for `request`. Channels with no base metrics are left
/// out of the plan.
pub fn plan_for_target(store: &BenchmarkStore, request: &PlanRequest) -> Result<TargetPlan, PlanError> {
    if !(request.target_conversions > 0.0 && request.target_cpa > 0.0) {
        return Err(PlanError::InvalidTarget);
    }
    if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&request.confidence) {
        return Err(PlanError::InvalidConfidence(request.confidence));
    }

    let required_budget = request.target_conversions * request.target_cpa;
    let (sa_share, da_share) = request.goal.category_split();

    let mut channels = Vec::new();
    for (category, share) in [(ChannelCategory::SA, sa_share), (ChannelCategory::DA, da_share)] {
        let keys: Vec<&str> = store
            .channel_keys_in(category)
            .into_iter()
            .filter(|key| !request.excluded.iter().any(|e| e == key))
            .collect();
        if keys.is_empty() {
            continue;
        }
        let per_channel = required_budget * share / keys.len() as f64;
        for key in keys {
            let Some(metrics) = channel_adjusted_metrics(store, &request.industry, key, request.month, per_channel)
            else {
                continue;
            };
            channels.push(PlannedChannel {
                name: channel_display_name(key).to_string(),
                category,
                budget: per_channel,
                budget_ratio: per_channel / required_budget * 100.0,
                funnel: calculate_performance(per_channel, &metrics)?,
            });
        }
    }

    let total_conversions: f64 = channels.iter().map(|c| c.funnel.conversions).sum();
    let predicted_conversions = total_conversions * request.confidence;
    let predicted_cpa = safe_div(safe_div(required_budget, total_conversions), request.confidence);
    let achievement_rate = predicted_conversions / request.target_conversions * 100.0;

    tracing::debug!(required_budget, predicted_conversions, achievement_rate, "target plan computed");
    Ok(TargetPlan {
        required_budget,
        target_conversions: request.target_conversions,
        target_cpa: request.target_cpa,
        predicted_conversions,
        predicted_cpa,
        achievement_rate,
        outlook: Outlook::from_achievement(achievement_rate),
        channels,
    })
}
