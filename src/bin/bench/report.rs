// Benchmark Report Types
// Structured output for independent analysis of engine invariants

use serde::Serialize;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub profile: String,
    pub industry: String,
    pub month: u8,
    pub seed: u64,
    pub pass: bool,
    pub channel_count: usize,
    pub failed_channels: usize,
    pub normalized: bool,
    pub total_budget: f64,
    /// Largest relative deviation of the funnel identities over all channels.
    pub funnel_error: f64,
    /// Relative gap between spent media budget and allocated budget.
    pub budget_error: f64,
    /// Largest relative deviation of the outer scenario conversion identity.
    pub scenario_error: f64,
    pub base_conversions: f64,
    pub base_roas: f64,
    pub score: u32,
    pub grade: String,
    pub recommendations: usize,
    pub insights: usize,
    pub elapsed_us: u128,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
}

// ─── Monte Carlo Report (per-profile aggregation) ───────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub profile_name: String,
    pub label: String,
    pub category: String,
    pub n_runs: usize,
    pub pass_rate: f64,
    pub funnel_error: Stats,
    pub budget_error: Stats,
    pub scenario_error: Stats,
    pub base_conversions: Stats,
    pub base_roas: Stats,
    pub score: Stats,
    pub failed_channels: Stats,
    pub elapsed_us: Stats,
    pub individual_runs: Vec<RunResult>,
}

// ─── Fixed Case Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub name: &'static str,
    pub label: &'static str,
    pub pass: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub n_runs_per_profile: usize,
    pub base_seed: u64,
    pub summary: Summary,
    pub cases: Vec<CaseResult>,
    pub profiles: Vec<MonteCarloReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}

impl Summary {
    pub fn tally(cases: &[CaseResult], profiles: &[MonteCarloReport]) -> Self {
        let total = cases.len() + profiles.len();
        let passed = cases.iter().filter(|c| c.pass).count()
            + profiles.iter().filter(|p| p.pass_rate >= 1.0).count();
        Self {
            total,
            passed,
            failed: total - passed,
            pass_rate: if total > 0 { passed as f64 / total as f64 } else { 0.0 },
        }
    }
}
