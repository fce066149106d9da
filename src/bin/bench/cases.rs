// Fixed Cases - deterministic reference scenarios with exact expected values
// Each case returns Err with a description of the first mismatch

use mediamix_engine::allocation::AllocationError;
use mediamix_engine::grading::efficiency_score;
use mediamix_engine::mix_generator::{generate_media_mix, MediaMixRequest};
use mediamix_engine::performance::calculate_performance;
use mediamix_engine::planner::{plan_for_target, Outlook, PlanRequest};
use mediamix_engine::*;

type CaseFn = fn(&BenchmarkStore, &EngineConfig) -> Result<(), String>;

pub struct Case {
    pub name: &'static str,
    pub label: &'static str,
    pub run: CaseFn,
}

pub fn cases() -> Vec<Case> {
    vec![
        Case { name: "REFERENCE_FUNNEL", label: "Reference funnel (10M, 2%/1000/2%)", run: reference_funnel },
        Case { name: "CONCENTRATION_60_40", label: "Concentration risk at 60/40", run: concentration_60_40 },
        Case { name: "GRADE_S", label: "Grade S at 320% / 600 / 25,000", run: grade_s },
        Case { name: "FAILURE_ISOLATION", label: "Broken channel becomes placeholder", run: failure_isolation },
        Case { name: "NORMALIZATION", label: "Ratio normalization and rejection", run: normalization },
        Case { name: "AUTO_MIX_BUILTIN", label: "Auto mix for every industry and goal", run: auto_mix_builtin },
        Case { name: "TARGET_PLAN", label: "Target plan back-solve", run: target_plan },
    ]
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(message())
    }
}

fn expect_eq(what: &str, actual: f64, expected: f64) -> Result<(), String> {
    ensure((actual - expected).abs() <= 1e-6 * expected.abs().max(1.0), || {
        format!("{what}: got {actual}, expected {expected}")
    })
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

fn reference_channel(name: &str, ratio: f64) -> Channel {
    Channel::new(name, ChannelCategory::SA)
        .with_ratio(ratio)
        .with_rates(1000.0, 2.0, 2.0)
        .with_revenue(50_000.0)
}

// ─── Cases ──────────────────────────────────────────────────────────────────

fn reference_funnel(store: &BenchmarkStore, config: &EngineConfig) -> Result<(), String> {
    let funnel = calculate_performance(10_000_000.0, &RateTriple::new(0.02, 1000.0, 0.02)).map_err(|e| e.to_string())?;
    expect_eq("funnel clicks", funnel.clicks, 10_000.0)?;
    expect_eq("funnel impressions", funnel.impressions, 500_000.0)?;
    expect_eq("funnel conversions", funnel.conversions, 200.0)?;
    expect_eq("funnel cpa", funnel.cpa, 50_000.0)?;

    let report = MediaMixSimulation::new(store, config)
        .run(&request(vec![reference_channel("google", 100.0)]))
        .map_err(|e| e.to_string())?;
    let p = &report.scenarios.base[0].performance;
    expect_eq("clicks", p.clicks, 10_000.0)?;
    expect_eq("impressions", p.impressions, 500_000.0)?;
    expect_eq("conversions", p.conversions_adjusted, 200.0)?;
    expect_eq("cpa", p.cpa_adjusted, 50_000.0)?;
    expect_eq("revenue", p.revenue_adjusted, 10_000_000.0)?;
    expect_eq("roas", p.roas_adjusted, 100.0)
}

fn concentration_60_40(store: &BenchmarkStore, config: &EngineConfig) -> Result<(), String> {
    let report = MediaMixSimulation::new(store, config)
        .run(&request(vec![reference_channel("naver", 60.0), reference_channel("google", 40.0)]))
        .map_err(|e| e.to_string())?;
    let flagged: Vec<&str> = report
        .recommendations
        .iter()
        .filter_map(|a| match &a.detail {
            AdvisoryDetail::ConcentrationRisk { channel, .. } => Some(channel.as_str()),
            _ => None,
        })
        .collect();
    ensure(flagged == ["naver"], || format!("concentration flagged {flagged:?}, expected [\"naver\"]"))
}

fn grade_s(_: &BenchmarkStore, _: &EngineConfig) -> Result<(), String> {
    let score = efficiency_score(25_000.0, 320.0, 600.0);
    ensure(
        (score.roas_points, score.volume_points, score.cpa_points) == (40, 30, 30),
        || format!("component points {score:?}"),
    )?;
    ensure(score.total == 100, || format!("score {} != 100", score.total))?;
    let grade = calculate_efficiency_grade(25_000.0, 320.0, 600.0);
    ensure(grade == Grade::S, || format!("grade {grade}, expected S"))
}

fn failure_isolation(store: &BenchmarkStore, config: &EngineConfig) -> Result<(), String> {
    let broken = reference_channel("broken", 50.0).with_rates(0.0, 2.0, 2.0);
    let report = MediaMixSimulation::new(store, config)
        .run(&request(vec![reference_channel("ok", 50.0), broken]))
        .map_err(|e| e.to_string())?;
    for (kind, outcomes) in report.scenarios.iter() {
        ensure(outcomes.len() == 2, || format!("{kind} has {} entries", outcomes.len()))?;
        ensure(!outcomes[0].is_error() && outcomes[1].is_error(), || {
            format!("{kind} placeholder in the wrong position")
        })?;
        ensure(outcomes[1].performance == PerformanceResult::zeroed(), || {
            format!("{kind} placeholder is not zeroed")
        })?;
    }
    expect_eq("surviving conversions", report.scenarios.base[0].performance.conversions, 100.0)
}

fn normalization(store: &BenchmarkStore, config: &EngineConfig) -> Result<(), String> {
    let channels = vec![reference_channel("a", 30.0), reference_channel("b", 30.0)];
    let report = MediaMixSimulation::new(store, config)
        .run(&request(channels.clone()))
        .map_err(|e| e.to_string())?;
    ensure(report.normalized, || "ratios were not normalized".to_string())?;
    expect_eq("normalized ratio", report.channels[0].budget_ratio, 50.0)?;

    let strict = EngineConfig { ratio_policy: RatioPolicy::Reject, ..config.clone() };
    match MediaMixSimulation::new(store, &strict).run(&request(channels)) {
        Err(SimulationError::Allocation(AllocationError::RatioSumMismatch { .. })) => Ok(()),
        other => Err(format!("reject policy returned {other:?}")),
    }
}

fn auto_mix_builtin(store: &BenchmarkStore, config: &EngineConfig) -> Result<(), String> {
    let sim = MediaMixSimulation::new(store, config);
    for industry in store.industries() {
        for goal in [CampaignGoal::Awareness, CampaignGoal::Conversion, CampaignGoal::Balanced] {
            let mix_request = MediaMixRequest {
                total_budget: 50_000_000.0,
                industry: industry.to_string(),
                month: 11,
                goal,
                excluded: Vec::new(),
            };
            let mix = generate_media_mix(store, &config.default_revenue_per_conversion, &mix_request);
            ensure(!mix.channels.is_empty(), || format!("{industry}/{goal:?}: empty mix"))?;
            let sum: f64 = mix.channels.iter().map(|c| c.budget_ratio).sum();
            expect_eq(&format!("{industry}/{goal:?} ratio sum"), sum, 100.0)?;

            let report = sim
                .run(&SimulationRequest {
                    total_budget: mix_request.total_budget,
                    industry: industry.to_string(),
                    month: mix_request.month,
                    goal,
                    scenario_adjustment_pct: None,
                    channels: mix.channels,
                })
                .map_err(|e| format!("{industry}/{goal:?}: {e}"))?;
            ensure(report.scenarios.base.iter().all(|o| !o.is_error()), || {
                format!("{industry}/{goal:?}: generated channel failed")
            })?;
        }
    }
    Ok(())
}

fn target_plan(store: &BenchmarkStore, _: &EngineConfig) -> Result<(), String> {
    let plan = plan_for_target(
        store,
        &PlanRequest {
            industry: "ecommerce".to_string(),
            month: 3,
            target_conversions: 500.0,
            target_cpa: 40_000.0,
            goal: CampaignGoal::Balanced,
            confidence: 1.0,
            excluded: Vec::new(),
        },
    )
    .map_err(|e| e.to_string())?;
    expect_eq("required budget", plan.required_budget, 20_000_000.0)?;
    let allocated: f64 = plan.channels.iter().map(|c| c.budget).sum();
    expect_eq("allocated budget", allocated, 20_000_000.0)?;
    expect_eq(
        "achievement rate",
        plan.achievement_rate,
        plan.predicted_conversions / 500.0 * 100.0,
    )?;
    ensure(plan.outlook == Outlook::from_achievement(plan.achievement_rate), || {
        format!("outlook {:?} inconsistent with {:.1}%", plan.outlook, plan.achievement_rate)
    })
}
