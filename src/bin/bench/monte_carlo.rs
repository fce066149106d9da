// Monte Carlo Infrastructure - N seeded runs per profile with statistical aggregation
// Each profile runs N times with seeds base..base+N, computing mean ± 95% CI

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use mediamix_engine::grading::efficiency_score;
use mediamix_engine::*;

use crate::profiles::{build_request, Profile};
use crate::report::*;

use std::time::Instant;

/// Relative error ceiling for the floating point identities.
const IDENTITY_TOLERANCE: f64 = 1e-9;

fn relative_error(actual: f64, expected: f64) -> f64 {
    (actual - expected).abs() / expected.abs().max(1.0)
}

// ─── Property Checks ────────────────────────────────────────────────────────

#[derive(Default)]
struct Checks {
    funnel_error: f64,
    budget_error: f64,
    scenario_error: f64,
    violations: Vec<String>,
}

impl Checks {
    fn fail(&mut self, message: String) {
        self.violations.push(message);
    }

    /// clicks = budget / cpc, impressions = clicks / ctr, conversions = clicks × cvr,
    /// cpa × conversions = budget.
    fn funnel(&mut self, report: &SimulationReport) {
        for outcome in report.scenarios.base.iter().filter(|o| !o.is_error()) {
            let c = &outcome.channel;
            let p = &outcome.performance;
            let clicks = p.media_budget / c.cpc;
            let mut worst = relative_error(p.clicks, clicks)
                .max(relative_error(p.impressions, clicks / (c.ctr / 100.0)))
                .max(relative_error(p.conversions, clicks * c.cvr / 100.0));
            if p.conversions > 0.0 {
                worst = worst.max(relative_error(p.cpa * p.conversions, p.media_budget));
            }
            if worst > IDENTITY_TOLERANCE {
                self.fail(format!("funnel identity off by {worst:.2e} on '{}'", c.name));
            }
            self.funnel_error = self.funnel_error.max(worst);
        }
    }

    /// Σ media_budget matches the allocated share of the total.
    fn budget(&mut self, report: &SimulationReport, tolerance: f64) {
        let ratios: f64 = report.channels.iter().map(|c| c.budget_ratio).sum();
        if (ratios - 100.0).abs() > tolerance + IDENTITY_TOLERANCE {
            self.fail(format!("allocated ratios sum to {ratios}"));
        }
        if report.scenarios.base.iter().any(|o| o.is_error()) {
            return;
        }
        let spent: f64 = report.scenarios.base.iter().map(|o| o.performance.media_budget).sum();
        self.budget_error = relative_error(spent, report.total_budget * ratios / 100.0);
        if self.budget_error > IDENTITY_TOLERANCE {
            self.fail(format!("media budget off by {:.2e}", self.budget_error));
        }
    }

    /// Outer scenarios scale base adjusted conversions by (1 ± s/100).
    fn scenarios(&mut self, report: &SimulationReport) {
        let n = report.channels.len();
        for kind in ScenarioKind::ALL {
            if report.scenarios.get(kind).len() != n {
                self.fail(format!("{kind} scenario has {} entries, expected {n}", report.scenarios.get(kind).len()));
                return;
            }
        }
        let width = report.scenario_adjustment_pct;
        for (i, base) in report.scenarios.base.iter().enumerate() {
            let expected_base = base.performance.conversions * (1.0 + base.channel.adjustment / 100.0);
            let mut worst = relative_error(base.performance.conversions_adjusted, expected_base);
            for kind in [ScenarioKind::Conservative, ScenarioKind::Aggressive] {
                let outer = &report.scenarios.get(kind)[i];
                if outer.is_error() != base.is_error() {
                    self.fail(format!("placeholder mismatch in {kind} at {i}"));
                }
                let expected = base.performance.conversions_adjusted * kind.conversion_factor(width);
                worst = worst.max(relative_error(outer.performance.conversions_adjusted, expected));
            }
            if worst > IDENTITY_TOLERANCE {
                self.fail(format!("scenario identity off by {worst:.2e} on '{}'", base.channel.name));
            }
            self.scenario_error = self.scenario_error.max(worst);
        }
    }

    /// Grade never drops when any one input improves.
    fn grade_monotonic(&mut self, report: &SimulationReport) {
        let Some(base) = report.summary(ScenarioKind::Base) else {
            self.fail("missing base summary".to_string());
            return;
        };
        let grade = calculate_efficiency_grade(base.avg_cpa, base.avg_roas, base.total_conversions);
        let improved = [
            calculate_efficiency_grade(base.avg_cpa, base.avg_roas * 1.5 + 1.0, base.total_conversions),
            calculate_efficiency_grade(base.avg_cpa, base.avg_roas, base.total_conversions * 1.5 + 1.0),
            calculate_efficiency_grade(base.avg_cpa * 0.5, base.avg_roas, base.total_conversions),
        ];
        if improved.iter().any(|g| *g < grade) {
            self.fail(format!("grade {grade} dropped after an improvement: {improved:?}"));
        }
        if efficiency_score(base.avg_cpa, base.avg_roas, base.total_conversions) != report.score {
            self.fail("report score differs from base summary score".to_string());
        }
    }

    /// No NaN or infinity anywhere in the scenario set.
    fn finite(&mut self, report: &SimulationReport) {
        for (kind, outcomes) in report.scenarios.iter() {
            for outcome in outcomes {
                let p = &outcome.performance;
                let fields = [
                    p.media_budget, p.impressions, p.clicks, p.cpm, p.conversions, p.conversions_adjusted,
                    p.cpa, p.cpa_adjusted, p.revenue, p.revenue_adjusted, p.roas, p.roas_adjusted,
                ];
                if fields.iter().any(|v| !v.is_finite()) {
                    self.fail(format!("non-finite metric in {kind} for '{}'", outcome.channel.name));
                }
            }
        }
    }
}

// ─── Runs ───────────────────────────────────────────────────────────────────

/// Run a single profile iteration with a specific seed.
pub fn run_single(
    profile: &Profile,
    seed: u64,
    store: &BenchmarkStore,
    config: &EngineConfig,
    max_channels: usize,
) -> RunResult {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let request = build_request(&mut rng, profile, store, config, max_channels);

    let start = Instant::now();
    let sim = MediaMixSimulation::new(store, config);
    let outcome = sim.run(&request);
    let elapsed_us = start.elapsed().as_micros();

    let mut result = RunResult {
        profile: profile.name.to_string(),
        industry: request.industry.clone(),
        month: request.month,
        seed,
        pass: false,
        channel_count: request.channels.len(),
        failed_channels: 0,
        normalized: false,
        total_budget: request.total_budget,
        funnel_error: 0.0,
        budget_error: 0.0,
        scenario_error: 0.0,
        base_conversions: 0.0,
        base_roas: 0.0,
        score: 0,
        grade: String::new(),
        recommendations: 0,
        insights: 0,
        elapsed_us,
        violations: Vec::new(),
    };

    let report = match outcome {
        Ok(report) => report,
        Err(err) => {
            result.violations.push(format!("run aborted: {err}"));
            return result;
        }
    };

    let mut checks = Checks::default();
    checks.funnel(&report);
    checks.budget(&report, config.ratio_tolerance);
    checks.scenarios(&report);
    checks.grade_monotonic(&report);
    checks.finite(&report);

    match sim.run(&request) {
        Ok(again) if again == report => {}
        _ => checks.fail("repeated run produced a different report".to_string()),
    }

    if let Some(base) = report.summary(ScenarioKind::Base) {
        result.base_conversions = base.total_conversions;
        result.base_roas = base.avg_roas;
    }
    result.failed_channels = report.scenarios.base.iter().filter(|o| o.is_error()).count();
    result.normalized = report.normalized;
    result.funnel_error = checks.funnel_error;
    result.budget_error = checks.budget_error;
    result.scenario_error = checks.scenario_error;
    result.score = report.score.total;
    result.grade = report.grade.to_string();
    result.recommendations = report.recommendations.len();
    result.insights = report.insights.len();
    result.pass = checks.violations.is_empty();
    result.violations = checks.violations;

    if !result.pass {
        tracing::warn!(profile = profile.name, seed, violations = ?result.violations, "property violation");
    }
    result
}

/// Run Monte Carlo: N runs of a profile, aggregate stats.
pub fn run_monte_carlo(
    profile: &Profile,
    n_runs: usize,
    base_seed: u64,
    store: &BenchmarkStore,
    config: &EngineConfig,
    max_channels: usize,
) -> MonteCarloReport {
    let results: Vec<RunResult> = (0..n_runs)
        .map(|i| run_single(profile, base_seed + i as u64, store, config, max_channels))
        .collect();

    aggregate(profile, results)
}

fn stats_of(results: &[RunResult], metric: impl Fn(&RunResult) -> f64) -> Stats {
    Stats::from_samples(&results.iter().map(metric).collect::<Vec<_>>())
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate(profile: &Profile, results: Vec<RunResult>) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();

    MonteCarloReport {
        profile_name: profile.name.to_string(),
        label: profile.label.to_string(),
        category: profile.category.to_string(),
        n_runs: n,
        pass_rate: if n > 0 { passed as f64 / n as f64 } else { 0.0 },
        funnel_error: stats_of(&results, |r| r.funnel_error),
        budget_error: stats_of(&results, |r| r.budget_error),
        scenario_error: stats_of(&results, |r| r.scenario_error),
        base_conversions: stats_of(&results, |r| r.base_conversions),
        base_roas: stats_of(&results, |r| r.base_roas),
        score: stats_of(&results, |r| r.score as f64),
        failed_channels: stats_of(&results, |r| r.failed_channels as f64),
        elapsed_us: stats_of(&results, |r| r.elapsed_us as f64),
        individual_runs: results,
    }
}
