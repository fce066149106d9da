// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite - Insight Engine
//
// Campaign-level observations over the base scenario: volume, CPA against
// the industry benchmark, SA/DA balance, seasonality, goal fit and ROAS.

use crate::benchmarks::BenchmarkStore;
use crate::recommendation::RISK_RATIO_THRESHOLD;
use crate::types::{
    safe_div, Advisory, AdvisoryDetail, AdvisoryKind, CampaignGoal, ChannelCategory, ChannelOutcome,
};

// ─── Constants ──────────────────────────────────────────────────────────────

const HIGH_VOLUME: f64 = 1000.0;
const LOW_VOLUME: f64 = 100.0;

/// Industry CPA used when the benchmark table has no positive CPA entry.
pub const FALLBACK_INDUSTRY_CPA: f64 = 50_000.0;
const EFFICIENT_CPA_FACTOR: f64 = 0.8;
const EXPENSIVE_CPA_FACTOR: f64 = 1.3;

const PEAK_SEASON: f64 = 1.15;
const OFF_SEASON: f64 = 0.85;

/// Minimum SA share recommended for a conversion-focused campaign.
const CONVERSION_GOAL_MIN_SA: f64 = 60.0;

const STRONG_ROAS: f64 = 200.0;
const WEAK_ROAS: f64 = 100.0;

// ─── Context ────────────────────────────────────────────────────────────────

pub struct InsightContext<'a> {
    pub store: &'a BenchmarkStore,
    pub outcomes: &'a [ChannelOutcome],
    pub total_budget: f64,
    pub industry: &'a str,
    pub month: u8,
    pub goal: CampaignGoal,
}

impl<'a> InsightContext<'a> {
    fn total_conversions(&self) -> f64 {
        self.outcomes.iter().map(|o| o.performance.conversions_adjusted).sum()
    }

    fn avg_cpa(&self) -> f64 {
        safe_div(self.total_budget, self.total_conversions())
    }

    fn avg_roas(&self) -> f64 {
        let revenue: f64 = self.outcomes.iter().map(|o| o.performance.revenue_adjusted).sum();
        safe_div(revenue, self.total_budget) * 100.0
    }

    fn category_ratio(&self, category: ChannelCategory) -> f64 {
        self.outcomes
            .iter()
            .filter(|o| o.channel.category == category)
            .map(|o| o.channel.budget_ratio)
            .sum()
    }
}

/// Unweighted mean of the positive CPA entries benchmarked for `industry`.
pub fn industry_average_cpa(store: &BenchmarkStore, industry: &str) -> f64 {
    let cpas: Vec<f64> = store
        .channel_benchmarks(industry)
        .map(|table| table.values().map(|b| b.cpa).filter(|&cpa| cpa > 0.0).collect())
        .unwrap_or_default();
    if cpas.is_empty() {
        FALLBACK_INDUSTRY_CPA
    } else {
        cpas.iter().sum::<f64>() / cpas.len() as f64
    }
}

// ─── Rules ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightRule {
    ConversionVolume,
    BenchmarkCpa,
    CategoryImbalance,
    Seasonality,
    GoalMixMismatch,
    RoasTier,
}

impl InsightRule {
    pub const ALL: [InsightRule; 6] = [
        Self::ConversionVolume,
        Self::BenchmarkCpa,
        Self::CategoryImbalance,
        Self::Seasonality,
        Self::GoalMixMismatch,
        Self::RoasTier,
    ];

    pub fn evaluate(&self, ctx: &InsightContext<'_>) -> Option<Advisory> {
        match self {
            Self::ConversionVolume => conversion_volume(ctx),
            Self::BenchmarkCpa => benchmark_cpa(ctx),
            Self::CategoryImbalance => category_imbalance(ctx),
            Self::Seasonality => seasonality(ctx),
            Self::GoalMixMismatch => goal_mix_mismatch(ctx),
            Self::RoasTier => roas_tier(ctx),
        }
    }
}

fn advisory(kind: AdvisoryKind, title: &str, message: String, detail: AdvisoryDetail) -> Advisory {
    Advisory { kind, title: title.to_string(), message, detail }
}

fn conversion_volume(ctx: &InsightContext<'_>) -> Option<Advisory> {
    let total = ctx.total_conversions();
    let detail = AdvisoryDetail::ConversionVolume { total_conversions: total };
    if total >= HIGH_VOLUME {
        Some(advisory(
            AdvisoryKind::Success,
            "Strong conversion volume",
            format!("Expected conversions ({total:.0}) are high enough for stable campaign operation."),
            detail,
        ))
    } else if total < LOW_VOLUME {
        Some(advisory(
            AdvisoryKind::Warning,
            "Thin conversion volume",
            format!(
                "Expected conversions ({total:.0}) may be too few for statistically meaningful results. \
                 Consider a larger budget or a revised target."
            ),
            detail,
        ))
    } else {
        None
    }
}

fn benchmark_cpa(ctx: &InsightContext<'_>) -> Option<Advisory> {
    let avg_cpa = ctx.avg_cpa();
    if avg_cpa <= 0.0 {
        return None;
    }
    let industry_avg = industry_average_cpa(ctx.store, ctx.industry);
    let difference_pct = (industry_avg - avg_cpa) / industry_avg * 100.0;
    let detail = AdvisoryDetail::BenchmarkCpa {
        avg_cpa,
        industry_avg_cpa: industry_avg,
        difference_pct,
    };

    if avg_cpa < industry_avg * EFFICIENT_CPA_FACTOR {
        Some(advisory(
            AdvisoryKind::Success,
            "Efficient CPA",
            format!(
                "Average CPA ({avg_cpa:.0}) is {difference_pct:.0}% below the {} average ({industry_avg:.0}).",
                ctx.industry
            ),
            detail,
        ))
    } else if avg_cpa > industry_avg * EXPENSIVE_CPA_FACTOR {
        Some(advisory(
            AdvisoryKind::Error,
            "High CPA",
            format!(
                "Average CPA ({avg_cpa:.0}) is above the {} average ({industry_avg:.0}). \
                 Targeting or creative needs work.",
                ctx.industry
            ),
            detail,
        ))
    } else {
        None
    }
}

fn category_imbalance(ctx: &InsightContext<'_>) -> Option<Advisory> {
    let sa = ctx.category_ratio(ChannelCategory::SA);
    let da = ctx.category_ratio(ChannelCategory::DA);
    if (sa - da).abs() <= RISK_RATIO_THRESHOLD {
        return None;
    }
    let dominant = if sa > da { ChannelCategory::SA } else { ChannelCategory::DA };
    Some(advisory(
        AdvisoryKind::Info,
        "Category imbalance",
        format!(
            "{} dominates the mix (SA {sa:.1}%, DA {da:.1}%). Consider widening the other category.",
            dominant.description()
        ),
        AdvisoryDetail::CategoryImbalance { dominant, sa_ratio: sa, da_ratio: da },
    ))
}

fn seasonality(ctx: &InsightContext<'_>) -> Option<Advisory> {
    // Common factor only, without the industry weight.
    let factor = ctx.store.seasonality(ctx.month).unwrap_or(1.0);
    let detail = AdvisoryDetail::Seasonality { month: ctx.month, factor };
    if factor >= PEAK_SEASON {
        Some(advisory(
            AdvisoryKind::Success,
            "Peak season",
            format!("Month {} is peak season for {}. Aggressive spend is warranted.", ctx.month, ctx.industry),
            detail,
        ))
    } else if factor <= OFF_SEASON {
        Some(advisory(
            AdvisoryKind::Warning,
            "Off season",
            format!(
                "Month {} is a low-efficiency period. Consider branding-led spend or a smaller budget.",
                ctx.month
            ),
            detail,
        ))
    } else {
        None
    }
}

fn goal_mix_mismatch(ctx: &InsightContext<'_>) -> Option<Advisory> {
    let sa = ctx.category_ratio(ChannelCategory::SA);
    if ctx.goal != CampaignGoal::Conversion || sa >= CONVERSION_GOAL_MIN_SA {
        return None;
    }
    Some(advisory(
        AdvisoryKind::Info,
        "Goal and mix mismatch",
        format!(
            "The campaign targets conversions but search carries only {sa:.1}%. \
             Raising SA to {CONVERSION_GOAL_MIN_SA:.0}% or more should perform better."
        ),
        AdvisoryDetail::GoalMixMismatch {
            sa_ratio: sa,
            recommended_min_sa_ratio: CONVERSION_GOAL_MIN_SA,
        },
    ))
}

fn roas_tier(ctx: &InsightContext<'_>) -> Option<Advisory> {
    let avg_roas = ctx.avg_roas();
    let detail = AdvisoryDetail::RoasTier { avg_roas };
    if avg_roas <= 0.0 {
        None
    } else if avg_roas >= STRONG_ROAS {
        Some(advisory(
            AdvisoryKind::Success,
            "High profitability",
            format!("Average ROAS ({avg_roas:.1}%) is strong. A budget increase is worth considering."),
            detail,
        ))
    } else if avg_roas < WEAK_ROAS {
        Some(advisory(
            AdvisoryKind::Error,
            "Low profitability",
            format!(
                "Average ROAS ({avg_roas:.1}%) is below 100%. Revenue per conversion or CPA must improve."
            ),
            detail,
        ))
    } else {
        None
    }
}

/// Evaluate every insight rule in order.
pub fn generate_insights(ctx: &InsightContext<'_>) -> Vec<Advisory> {
    InsightRule::ALL.iter().filter_map(|rule| rule.evaluate(ctx)).collect()
}

// ===========================================================================
// Tests
// ===========================================================================
