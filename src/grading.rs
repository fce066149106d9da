// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite - Efficiency Grader
//
// Additive score out of 100 over ROAS (40), conversion volume (30) and
// CPA (30), mapped onto S / A / B / C. Inputs convert to Decimal without
// rounding, so a value one ulp short of a threshold never reaches it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Grade;

// ─── Score Tables ───────────────────────────────────────────────────────────

/// (minimum ROAS %, points), highest tier first.
const ROAS_TIERS: [(Decimal, u32); 4] = [
    (dec!(300), 40),
    (dec!(200), 30),
    (dec!(150), 20),
    (dec!(100), 10),
];

/// (minimum total conversions, points).
const VOLUME_TIERS: [(Decimal, u32); 4] = [
    (dec!(500), 30),
    (dec!(300), 25),
    (dec!(150), 20),
    (dec!(50), 10),
];

/// (maximum CPA, points), cheapest tier first.
const CPA_TIERS: [(Decimal, u32); 4] = [
    (dec!(30000), 30),
    (dec!(40000), 25),
    (dec!(50000), 20),
    (dec!(70000), 10),
];

const GRADE_S: u32 = 80;
const GRADE_A: u32 = 60;
const GRADE_B: u32 = 40;

// ─── Score ──────────────────────────────────────────────────────────────────

/// Points earned per component.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct EfficiencyScore {
    pub roas_points: u32,
    pub volume_points: u32,
    pub cpa_points: u32,
    pub total: u32,
}

impl EfficiencyScore {
    pub fn grade(&self) -> Grade {
        if self.total >= GRADE_S {
            Grade::S
        } else if self.total >= GRADE_A {
            Grade::A
        } else if self.total >= GRADE_B {
            Grade::B
        } else {
            Grade::C
        }
    }
}

/// Exact binary value of `v`. Out-of-range magnitudes saturate; NaN is zero.
fn exact(v: f64) -> Decimal {
    match Decimal::from_f64_retain(v) {
        Some(d) => d,
        None if v > 0.0 => Decimal::MAX,
        None if v < 0.0 => Decimal::MIN,
        None => Decimal::ZERO,
    }
}

fn at_least(value: Decimal, tiers: &[(Decimal, u32)]) -> u32 {
    tiers
        .iter()
        .find(|(min, _)| value >= *min)
        .map(|&(_, points)| points)
        .unwrap_or(0)
}

fn at_most(value: Decimal, tiers: &[(Decimal, u32)]) -> u32 {
    tiers
        .iter()
        .find(|(max, _)| value <= *max)
        .map(|&(_, points)| points)
        .unwrap_or(0)
}

/// Component scores for aggregate scenario metrics. CPA only scores when it
/// is positive, since zero means no conversions.
pub fn efficiency_score(avg_cpa: f64, avg_roas: f64, total_conversions: f64) -> EfficiencyScore {
    let roas_points = at_least(exact(avg_roas), &ROAS_TIERS);
    let volume_points = at_least(exact(total_conversions), &VOLUME_TIERS);
    let cpa = exact(avg_cpa);
    let cpa_points = if cpa > Decimal::ZERO { at_most(cpa, &CPA_TIERS) } else { 0 };

    EfficiencyScore {
        roas_points,
        volume_points,
        cpa_points,
        total: roas_points + volume_points + cpa_points,
    }
}

pub fn calculate_efficiency_grade(avg_cpa: f64, avg_roas: f64, total_conversions: f64) -> Grade {
    efficiency_score(avg_cpa, avg_roas, total_conversions).grade()
}
