// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite - Simulation Core

use serde::{Deserialize, Serialize};

use crate::allocation::{prepare_channels, AllocationError};
use crate::benchmarks::BenchmarkStore;
use crate::config::EngineConfig;
use crate::grading::EfficiencyScore;
use crate::insights::{generate_insights, InsightContext};
use crate::recommendation::generate_recommendations;
use crate::rounding::round_performance;
use crate::scenario::{generate_scenarios, summarize_all, ScenarioSummary};
use crate::types::*;
use crate::validation::{channel_warnings, validate_input, ChannelWarning, InputField, ValidationError};

// ─── Errors ─────────────────────────────────────────────────────────────────

/// Failures that stop a run. Per-channel problems never do; they surface as
/// placeholders in the scenario set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// ─── Request / Report ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationRequest {
    pub total_budget: f64,
    pub industry: String,
    pub month: u8,
    #[serde(default)]
    pub goal: CampaignGoal,
    /// Overrides the configured scenario width.
    #[serde(default)]
    pub scenario_adjustment_pct: Option<f64>,
    pub channels: Vec<Channel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationReport {
    pub industry: String,
    pub month: u8,
    pub goal: CampaignGoal,
    pub total_budget: f64,
    pub scenario_adjustment_pct: f64,
    /// Active channels as computed, after any ratio normalization.
    pub channels: Vec<Channel>,
    pub normalized: bool,
    pub scenarios: ScenarioSet,
    pub summaries: Vec<ScenarioSummary>,
    pub grade: Grade,
    pub score: EfficiencyScore,
    pub recommendations: Vec<Advisory>,
    pub insights: Vec<Advisory>,
    pub warnings: Vec<ChannelWarning>,
}

impl SimulationReport {
    pub fn summary(&self, kind: ScenarioKind) -> Option<&ScenarioSummary> {
        self.summaries.iter().find(|s| s.kind == kind)
    }

    /// Copy of the scenario set with presentation rounding applied.
    pub fn rounded_scenarios(&self) -> ScenarioSet {
        let mut rounded = self.scenarios.clone();
        for kind in ScenarioKind::ALL {
            for outcome in rounded.get_mut(kind).iter_mut() {
                outcome.performance = round_performance(&outcome.performance);
            }
        }
        rounded
    }
}

// ─── MediaMixSimulation ─────────────────────────────────────────────────────

/// One configured engine. Holds only shared references, so any number of
/// runs may execute against the same store.
pub struct MediaMixSimulation<'a> {
    store: &'a BenchmarkStore,
    config: &'a EngineConfig,
}

impl<'a> MediaMixSimulation<'a> {
    pub fn new(store: &'a BenchmarkStore, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &BenchmarkStore {
        self.store
    }

    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    /// Full pipeline: allocate, generate scenarios, summarize, grade, advise.
    pub fn run(&self, request: &SimulationRequest) -> Result<SimulationReport, SimulationError> {
        let width = request
            .scenario_adjustment_pct
            .unwrap_or(self.config.scenario_adjustment_pct);
        validate_input(InputField::ScenarioWidth, width)?;

        let prepared = prepare_channels(&request.channels, self.config.ratio_policy, self.config.ratio_tolerance)?;
        let scenarios = generate_scenarios(&prepared.channels, request.total_budget, width);
        let summaries = summarize_all(&scenarios);

        let score = summaries
            .iter()
            .find(|s| s.kind == ScenarioKind::Base)
            .map(|s| s.score)
            .unwrap_or_default();

        let recommendations = generate_recommendations(&scenarios.base, request.total_budget);
        let insights = generate_insights(&InsightContext {
            store: self.store,
            outcomes: &scenarios.base,
            total_budget: request.total_budget,
            industry: &request.industry,
            month: request.month,
            goal: request.goal,
        });
        let warnings = channel_warnings(self.store, &request.industry, &prepared.channels);

        tracing::info!(
            industry = %request.industry,
            channels = prepared.channels.len(),
            normalized = prepared.normalized,
            grade = %score.grade(),
            recommendations = recommendations.len(),
            insights = insights.len(),
            "simulation complete"
        );

        Ok(SimulationReport {
            industry: request.industry.clone(),
            month: request.month,
            goal: request.goal,
            total_budget: request.total_budget,
            scenario_adjustment_pct: width,
            channels: prepared.channels,
            normalized: prepared.normalized,
            scenarios,
            summaries,
            grade: score.grade(),
            score,
            recommendations,
            insights,
            warnings,
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RatioPolicy;

    fn store() -> BenchmarkStore {
        BenchmarkStore::builtin().expect("test: builtin benchmarks should parse")
    }

    fn channel(name: &str, category: ChannelCategory, ratio: f64) -> Channel {
        Channel::new(name, category)
            .with_ratio(ratio)
            .with_rates(1000.0, 2.0, 2.0)
            .with_revenue(50_000.0)
    }

    fn request(channels: Vec<Channel>) -> SimulationRequest {
        SimulationRequest {
            total_budget: 10_000_000.0,
            industry: "ecommerce".to_string(),
            month: 3,
            goal: CampaignGoal::Balanced,
            scenario_adjustment_pct: None,
            channels,
        }
    }

    #[test]
    fn full_run_produces_every_section() {
        let store = store();
        let config = EngineConfig::default();
        let sim = MediaMixSimulation::new(&store, &config);
        let report = sim
            .run(&request(vec![
                channel("naver", ChannelCategory::SA, 60.0),
                channel("meta", ChannelCategory::DA, 40.0),
            ]))
            .expect("test: valid run");

        assert_eq!(report.summaries.len(), 3);
        assert_eq!(report.scenarios.base.len(), 2);
        assert_eq!(report.scenario_adjustment_pct, 5.0);
        assert!(!report.normalized);
        assert!(report
            .recommendations
            .iter()
            .any(|a| matches!(a.detail, AdvisoryDetail::ConcentrationRisk { .. })));
        let base = report.summary(ScenarioKind::Base).expect("test: base summary");
        assert_eq!(base.grade, report.grade);
    }

    #[test]
    fn ratios_are_normalized_by_default() {
        let store = store();
        let config = EngineConfig::default();
        let report = MediaMixSimulation::new(&store, &config)
            .run(&request(vec![
                channel("a", ChannelCategory::SA, 30.0),
                channel("b", ChannelCategory::DA, 30.0),
            ]))
            .expect("test: normalized run");
        assert!(report.normalized);
        assert_eq!(report.channels[0].budget_ratio, 50.0);
    }

    #[test]
    fn reject_policy_aborts() {
        let store = store();
        let config = EngineConfig { ratio_policy: RatioPolicy::Reject, ..EngineConfig::default() };
        let err = MediaMixSimulation::new(&store, &config)
            .run(&request(vec![channel("a", ChannelCategory::SA, 30.0)]));
        assert!(matches!(err, Err(SimulationError::Allocation(AllocationError::RatioSumMismatch { .. }))));
    }

    #[test]
    fn width_override_is_validated() {
        let store = store();
        let config = EngineConfig::default();
        let mut req = request(vec![channel("a", ChannelCategory::SA, 100.0)]);
        req.scenario_adjustment_pct = Some(45.0);
        let err = MediaMixSimulation::new(&store, &config).run(&req);
        assert!(matches!(err, Err(SimulationError::Validation(_))));
    }

    #[test]
    fn broken_channel_does_not_abort() {
        let store = store();
        let config = EngineConfig::default();
        let broken = channel("broken", ChannelCategory::DA, 50.0).with_rates(0.0, 2.0, 2.0);
        let report = MediaMixSimulation::new(&store, &config)
            .run(&request(vec![channel("ok", ChannelCategory::SA, 50.0), broken]))
            .expect("test: partial failure still reports");
        assert!(report.scenarios.base[1].is_error());
        assert_eq!(report.scenarios.conservative.len(), 2);
    }

    #[test]
    fn rounded_view_leaves_report_untouched() {
        let store = store();
        let config = EngineConfig::default();
        let report = MediaMixSimulation::new(&store, &config)
            .run(&request(vec![
                channel("a", ChannelCategory::SA, 33.3),
                channel("b", ChannelCategory::SA, 33.3),
                channel("c", ChannelCategory::DA, 33.4),
            ]))
            .expect("test: valid run");
        let rounded = report.rounded_scenarios();
        let raw = report.scenarios.base[0].performance.media_budget;
        assert_eq!(rounded.base[0].performance.media_budget, raw.round());
        assert_eq!(report.scenarios.base[0].performance.media_budget, raw);
    }

    #[test]
    fn report_serializes() {
        let store = store();
        let config = EngineConfig::default();
        let report = MediaMixSimulation::new(&store, &config)
            .run(&request(vec![channel("a", ChannelCategory::SA, 100.0)]))
            .expect("test: valid run");
        let json = serde_json::to_value(&report).expect("test: report to json");
        assert_eq!(json["grade"], "B");
        assert!(json["scenarios"]["aggressive"].is_array());
    }
}
