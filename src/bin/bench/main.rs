// Media Mix Benchmark Runner - engine invariant validation
// Fixed reference cases plus Monte Carlo (N=30) seeded random mixes
//
// Usage:
//   cargo run --release --bin bench                          # All cases and profiles (30 runs each)
//   cargo run --release --bin bench -- --runs 5              # Quick mode (5 runs each)
//   cargo run --release --bin bench -- MIX_BROKEN            # Filter by name, label or category
//   cargo run --release --bin bench -- --seed 42             # Custom base seed
//   cargo run --release --bin bench -- --config engine.json  # Engine configuration override

mod cases;
mod monte_carlo;
mod profiles;
mod report;

use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context};
use clap::Parser;
use mediamix_engine::{BenchmarkStore, EngineConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

use cases::{cases, Case};
use profiles::{profiles, Profile};
use report::*;

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "bench")]
#[command(about = "Seeded invariant benchmarks for the media mix engine")]
struct Cli {
    /// Monte Carlo runs per profile.
    #[arg(long, default_value_t = 30)]
    runs: usize,

    /// Base seed; run i uses seed + i.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Upper bound on channels in a random manual mix.
    #[arg(long, default_value_t = 8)]
    max_channels: usize,

    /// Engine configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,

    /// Only run cases and profiles whose name, label or category matches.
    filter: Option<String>,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    EngineConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

fn init_subscriber(config: &EngineConfig, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = Registry::default().with(filter);
    let installed = if json {
        tracing::subscriber::set_global_default(registry.with(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        tracing::subscriber::set_global_default(registry.with(fmt::layer().with_writer(std::io::stderr)))
    };
    installed.context("installing tracing subscriber")
}

fn matches(filter: &Option<String>, fields: &[&str]) -> bool {
    match filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            fields.iter().any(|field| field.to_lowercase().contains(&f_lower))
        }
        None => true,
    }
}

fn status(pass: bool) -> &'static str {
    if pass { "PASS" } else { "FAIL" }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_subscriber(&config, cli.json_logs)?;
    let store = BenchmarkStore::builtin().context("loading built-in benchmarks")?;

    let all_cases = cases();
    let all_profiles = profiles();
    let cases_to_run: Vec<&Case> = all_cases
        .iter()
        .filter(|c| matches(&cli.filter, &[c.name, c.label]))
        .collect();
    let profiles_to_run: Vec<&Profile> = all_profiles
        .iter()
        .filter(|p| matches(&cli.filter, &[p.name, p.label, p.category]))
        .collect();

    if cases_to_run.is_empty() && profiles_to_run.is_empty() {
        bail!("no cases or profiles match filter: {:?}", cli.filter);
    }

    println!("\n  Media Mix Benchmark Runner v{}", env!("CARGO_PKG_VERSION"));
    println!("  PRNG: ChaCha8Rng | Runs/profile: {} | Base seed: {}", cli.runs, cli.seed);
    println!(
        "  Running {} case(s) and {} profile(s)...\n",
        cases_to_run.len(),
        profiles_to_run.len()
    );

    let suite_start = Instant::now();

    // ─── Fixed Cases ────────────────────────────────────────────────────

    let mut case_results = Vec::with_capacity(cases_to_run.len());
    for case in &cases_to_run {
        let outcome = (case.run)(&store, &config);
        println!("  {:<44} {}", case.label, status(outcome.is_ok()));
        if let Err(failure) = &outcome {
            println!("      {failure}");
        }
        case_results.push(CaseResult {
            name: case.name,
            label: case.label,
            pass: outcome.is_ok(),
            failure: outcome.err(),
        });
    }

    // ─── Monte Carlo Profiles ───────────────────────────────────────────

    if !profiles_to_run.is_empty() {
        println!();
        println!(
            "  {:<36} {:>5} {:>10} {:>10} {:>10} {:>7} {:>8}",
            "Profile", "Pass%", "Funnel", "Budget", "Scenario", "Score", "Time"
        );
        println!("  {}", "-".repeat(92));
    }

    let mut mc_reports = Vec::with_capacity(profiles_to_run.len());
    for profile in &profiles_to_run {
        let report = monte_carlo::run_monte_carlo(profile, cli.runs, cli.seed, &store, &config, cli.max_channels);
        println!(
            "  {:<36} {:>4}% {:>10.2e} {:>10.2e} {:>10.2e} {:>7.1} {:>6.0}us  {}",
            report.label,
            (report.pass_rate * 100.0) as u32,
            report.funnel_error.max,
            report.budget_error.max,
            report.scenario_error.max,
            report.score.mean,
            report.elapsed_us.mean,
            status(report.pass_rate >= 1.0),
        );
        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();
    let summary = Summary::tally(&case_results, &mc_reports);

    println!("  {}", "-".repeat(92));
    println!(
        "  Total: {}  Passed: {}  Failed: {}  Suite time: {:.2}s\n",
        summary.total,
        summary.passed,
        summary.failed,
        suite_elapsed.as_secs_f64()
    );
    tracing::info!(total = summary.total, failed = summary.failed, "benchmark suite finished");

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis();
    let timestamp = ts.to_string();
    let failed = summary.failed;

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        n_runs_per_profile: cli.runs,
        base_seed: cli.seed,
        summary,
        cases: case_results,
        profiles: mc_reports,
    };

    let dir = Path::new("benchmark-results");
    std::fs::create_dir_all(dir).context("creating benchmark-results/")?;
    let path = dir.join(format!("bench-{timestamp}.json"));
    let json = serde_json::to_string_pretty(&report).context("serializing report")?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    println!("  Results saved to: {}\n", path.display());

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
