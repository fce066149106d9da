// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite - Type Definitions

use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Channel Category ───────────────────────────────────────────────────────

/// Advertising category of a channel: search, display or video.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelCategory {
    SA = 0,
    DA = 1,
    VA = 2,
}

impl ChannelCategory {
    pub const ALL: [ChannelCategory; 3] = [Self::SA, Self::DA, Self::VA];

    pub fn description(&self) -> &'static str {
        match self {
            Self::SA => "Search advertising",
            Self::DA => "Display advertising",
            Self::VA => "Video advertising",
        }
    }

    /// Category encoded in a benchmark channel key (`naver_SA`, `meta_DA`).
    pub fn from_channel_key(key: &str) -> Option<Self> {
        let (_, suffix) = key.rsplit_once('_')?;
        match suffix {
            "SA" => Some(Self::SA),
            "DA" => Some(Self::DA),
            "VA" => Some(Self::VA),
            _ => None,
        }
    }
}

impl fmt::Display for ChannelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SA => "SA",
            Self::DA => "DA",
            Self::VA => "VA",
        };
        f.write_str(label)
    }
}

/// Display name for a benchmark channel key: `naver_gfa_DA` -> `naver_gfa`.
pub fn channel_display_name(key: &str) -> &str {
    match ChannelCategory::from_channel_key(key) {
        Some(_) => key.rsplit_once('_').map(|(name, _)| name).unwrap_or(key),
        None => key,
    }
}

// ─── Rate Triple ────────────────────────────────────────────────────────────

/// CTR / CPC / CVR triple.
///
/// Used for industry base rates and channel multipliers (CTR and CVR as
/// fractions) and for adjusted per-channel metrics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RateTriple {
    pub ctr: f64,
    pub cpc: f64,
    pub cvr: f64,
}

impl RateTriple {
    pub const NEUTRAL: RateTriple = RateTriple { ctr: 1.0, cpc: 1.0, cvr: 1.0 };

    pub fn new(ctr: f64, cpc: f64, cvr: f64) -> Self {
        Self { ctr, cpc, cvr }
    }

    /// Component-wise product (base rates x channel multiplier).
    pub fn scaled_by(&self, multiplier: &RateTriple) -> Self {
        Self {
            ctr: self.ctr * multiplier.ctr,
            cpc: self.cpc * multiplier.cpc,
            cvr: self.cvr * multiplier.cvr,
        }
    }
}

// ─── Campaign Goal ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CampaignGoal {
    Awareness,
    Conversion,
    #[default]
    Balanced,
}

impl CampaignGoal {
    /// Parse a free-form goal label ("conversion-focused", "Awareness", ...).
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("conversion") {
            Self::Conversion
        } else if lower.contains("awareness") {
            Self::Awareness
        } else {
            Self::Balanced
        }
    }

    /// (SA share, DA share) of the budget for this goal.
    pub fn category_split(&self) -> (f64, f64) {
        match self {
            Self::Awareness => (0.4, 0.6),
            Self::Conversion => (0.7, 0.3),
            Self::Balanced => (0.5, 0.5),
        }
    }
}

// ─── Channel ────────────────────────────────────────────────────────────────

fn default_active() -> bool {
    true
}

/// A configured advertising channel.
///
/// `ctr`, `cvr` and `adjustment` are percentages; `budget_ratio` is the
/// percentage of the total budget assigned to this channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Channel {
    pub name: String,
    pub category: ChannelCategory,
    pub budget_ratio: f64,
    pub cpc: f64,
    pub ctr: f64,
    pub cvr: f64,
    pub revenue_per_conversion: f64,
    #[serde(default)]
    pub adjustment: f64,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Channel {
    pub fn new(name: impl Into<String>, category: ChannelCategory) -> Self {
        Self {
            name: name.into(),
            category,
            budget_ratio: 0.0,
            cpc: 0.0,
            ctr: 0.0,
            cvr: 0.0,
            revenue_per_conversion: 0.0,
            adjustment: 0.0,
            active: true,
        }
    }

    pub fn with_ratio(mut self, budget_ratio: f64) -> Self {
        self.budget_ratio = budget_ratio;
        self
    }

    pub fn with_rates(mut self, cpc: f64, ctr_pct: f64, cvr_pct: f64) -> Self {
        self.cpc = cpc;
        self.ctr = ctr_pct;
        self.cvr = cvr_pct;
        self
    }

    pub fn with_revenue(mut self, revenue_per_conversion: f64) -> Self {
        self.revenue_per_conversion = revenue_per_conversion;
        self
    }

    pub fn with_adjustment(mut self, adjustment_pct: f64) -> Self {
        self.adjustment = adjustment_pct;
        self
    }
}

// ─── PerformanceResult ──────────────────────────────────────────────────────

/// Derived funnel and money metrics for one channel within one run.
///
/// Values are unrounded; see [`crate::rounding::round_performance`] for the
/// presentation boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PerformanceResult {
    pub media_budget: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub cpm: f64,
    pub conversions: f64,
    pub conversions_adjusted: f64,
    pub cpa: f64,
    pub cpa_adjusted: f64,
    pub revenue: f64,
    pub revenue_adjusted: f64,
    pub roas: f64,
    pub roas_adjusted: f64,
}

impl PerformanceResult {
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// Copy with `conversions_adjusted` replaced and every field derived from
    /// it recomputed.
    pub fn with_adjusted_conversions(&self, conversions: f64, revenue_per_conversion: f64) -> Self {
        let revenue_adjusted = conversions * revenue_per_conversion;
        Self {
            conversions_adjusted: conversions,
            cpa_adjusted: safe_div(self.media_budget, conversions),
            revenue_adjusted,
            roas_adjusted: safe_div(revenue_adjusted, self.media_budget) * 100.0,
            ..*self
        }
    }
}

/// Division that yields 0 instead of NaN/inf for a non-positive denominator.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

// ─── ChannelOutcome ─────────────────────────────────────────────────────────

/// A channel paired with its computed performance.
///
/// A failed computation carries a zeroed performance and the error message,
/// so every scenario keeps one entry per input channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelOutcome {
    pub channel: Channel,
    pub performance: PerformanceResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChannelOutcome {
    pub fn computed(channel: Channel, performance: PerformanceResult) -> Self {
        Self { channel, performance, error: None }
    }

    pub fn failed(channel: Channel, message: impl Into<String>) -> Self {
        Self {
            channel,
            performance: PerformanceResult::zeroed(),
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

// ─── Scenario ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Conservative,
    Base,
    Aggressive,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [Self::Conservative, Self::Base, Self::Aggressive];

    /// Multiplier applied to adjustment-corrected conversions for a
    /// scenario width of `width_pct` percent.
    pub fn conversion_factor(&self, width_pct: f64) -> f64 {
        match self {
            Self::Conservative => 1.0 - width_pct / 100.0,
            Self::Base => 1.0,
            Self::Aggressive => 1.0 + width_pct / 100.0,
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Conservative => "conservative",
            Self::Base => "base",
            Self::Aggressive => "aggressive",
        };
        f.write_str(label)
    }
}

/// The three scenario variants, each with one outcome per input channel in
/// input order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScenarioSet {
    pub conservative: Vec<ChannelOutcome>,
    pub base: Vec<ChannelOutcome>,
    pub aggressive: Vec<ChannelOutcome>,
}

impl ScenarioSet {
    pub fn get(&self, kind: ScenarioKind) -> &[ChannelOutcome] {
        match kind {
            ScenarioKind::Conservative => &self.conservative,
            ScenarioKind::Base => &self.base,
            ScenarioKind::Aggressive => &self.aggressive,
        }
    }

    pub(crate) fn get_mut(&mut self, kind: ScenarioKind) -> &mut Vec<ChannelOutcome> {
        match kind {
            ScenarioKind::Conservative => &mut self.conservative,
            ScenarioKind::Base => &mut self.base,
            ScenarioKind::Aggressive => &mut self.aggressive,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScenarioKind, &[ChannelOutcome])> + '_ {
        ScenarioKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

// ─── Grade ──────────────────────────────────────────────────────────────────

/// Efficiency grade. Declaration order gives the ordinal `C < B < A < S`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    C,
    B,
    A,
    S,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        };
        f.write_str(label)
    }
}

// ─── Advisory ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryKind {
    Info,
    Warning,
    Error,
    Success,
}

/// One recommendation or insight.
///
/// `message` is plain text with no currency symbols; `detail` carries the
/// numbers behind it for the presentation layer to format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub title: String,
    pub message: String,
    pub detail: AdvisoryDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum AdvisoryDetail {
    EfficiencyShift {
        from_channel: String,
        to_channel: String,
        shift_ratio: f64,
        from_ratio_after: f64,
        to_ratio_after: f64,
        additional_conversions: f64,
        avg_cpa_before: f64,
        avg_cpa_after: f64,
        cpa_improvement: f64,
    },
    UnderweightedChannel {
        channel: String,
        current_ratio: f64,
        proposed_ratio: f64,
        current_cpa: f64,
        additional_conversions: f64,
        marginal_cpa: f64,
    },
    ConcentrationRisk {
        channel: String,
        budget_ratio: f64,
        threshold: f64,
    },
    RoasImprovement {
        channel: String,
        roas: f64,
        current_revenue_per_conversion: f64,
        target_revenue_per_conversion: f64,
        revenue_gap: f64,
    },
    VolumeInsufficiency {
        total_conversions: f64,
        current_budget: f64,
        proposed_budget: f64,
        projected_conversions: f64,
    },
    ConversionVolume {
        total_conversions: f64,
    },
    BenchmarkCpa {
        avg_cpa: f64,
        industry_avg_cpa: f64,
        difference_pct: f64,
    },
    CategoryImbalance {
        dominant: ChannelCategory,
        sa_ratio: f64,
        da_ratio: f64,
    },
    Seasonality {
        month: u8,
        factor: f64,
    },
    GoalMixMismatch {
        sa_ratio: f64,
        recommended_min_sa_ratio: f64,
    },
    RoasTier {
        avg_roas: f64,
    },
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_from_channel_key() {
        assert_eq!(ChannelCategory::from_channel_key("naver_SA"), Some(ChannelCategory::SA));
        assert_eq!(ChannelCategory::from_channel_key("naver_gfa_DA"), Some(ChannelCategory::DA));
        assert_eq!(ChannelCategory::from_channel_key("youtube_VA"), Some(ChannelCategory::VA));
        assert_eq!(ChannelCategory::from_channel_key("naver"), None);
        assert_eq!(ChannelCategory::from_channel_key("naver_XX"), None);
    }

    #[test]
    fn display_name_strips_category_suffix() {
        assert_eq!(channel_display_name("kakao_moment_DA"), "kakao_moment");
        assert_eq!(channel_display_name("custom"), "custom");
    }

    #[test]
    fn goal_from_label() {
        assert_eq!(CampaignGoal::from_label("Conversion-focused"), CampaignGoal::Conversion);
        assert_eq!(CampaignGoal::from_label("awareness"), CampaignGoal::Awareness);
        assert_eq!(CampaignGoal::from_label("whatever"), CampaignGoal::Balanced);
    }

    #[test]
    fn goal_splits_sum_to_one() {
        for goal in [CampaignGoal::Awareness, CampaignGoal::Conversion, CampaignGoal::Balanced] {
            let (sa, da) = goal.category_split();
            assert!((sa + da - 1.0).abs() < 1e-12, "{goal:?}");
        }
    }

    #[test]
    fn grade_ordering() {
        assert!(Grade::S > Grade::A);
        assert!(Grade::A > Grade::B);
        assert!(Grade::B > Grade::C);
    }

    #[test]
    fn scenario_factors() {
        assert!((ScenarioKind::Conservative.conversion_factor(10.0) - 0.9).abs() < 1e-12);
        assert_eq!(ScenarioKind::Base.conversion_factor(10.0), 1.0);
        assert!((ScenarioKind::Aggressive.conversion_factor(10.0) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn adjusted_conversions_rederive_dependents() {
        let base = PerformanceResult {
            media_budget: 1_000_000.0,
            conversions_adjusted: 100.0,
            cpa_adjusted: 10_000.0,
            revenue_adjusted: 2_000_000.0,
            roas_adjusted: 200.0,
            ..Default::default()
        };
        let derived = base.with_adjusted_conversions(50.0, 20_000.0);
        assert_eq!(derived.conversions_adjusted, 50.0);
        assert_eq!(derived.cpa_adjusted, 20_000.0);
        assert_eq!(derived.revenue_adjusted, 1_000_000.0);
        assert_eq!(derived.roas_adjusted, 100.0);
        assert_eq!(derived.media_budget, base.media_budget);
    }

    #[test]
    fn adjusted_conversions_zero_guards() {
        let base = PerformanceResult::zeroed();
        let derived = base.with_adjusted_conversions(0.0, 50_000.0);
        assert_eq!(derived.cpa_adjusted, 0.0);
        assert_eq!(derived.roas_adjusted, 0.0);
        assert!(derived.cpa_adjusted.is_finite());
    }

    #[test]
    fn failed_outcome_is_zeroed() {
        let channel = Channel::new("broken", ChannelCategory::SA);
        let outcome = ChannelOutcome::failed(channel, "cpc must be positive");
        assert!(outcome.is_error());
        assert_eq!(outcome.performance, PerformanceResult::zeroed());
    }

    #[test]
    fn advisory_detail_serializes_with_rule_tag() {
        let detail = AdvisoryDetail::ConcentrationRisk {
            channel: "naver".to_string(),
            budget_ratio: 60.0,
            threshold: 50.0,
        };
        let json = serde_json::to_value(&detail).expect("test: serialize detail");
        assert_eq!(json["rule"], "concentration_risk");
        assert_eq!(json["budget_ratio"], 60.0);
    }
}
