// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite - Input Validation

//! Per-field bounds for user input and soft warnings for rates far from
//! the industry norm. Bounds are hard errors; efficiency warnings never
//! block a run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::benchmarks::{BenchmarkStore, Metric};
use crate::types::Channel;

/// Below `avg * LOW_FACTOR` or above `avg * HIGH_FACTOR` a rate is unusual.
const LOW_FACTOR: f64 = 0.5;
const HIGH_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    Budget,
    Ratio,
    Cpc,
    Ctr,
    Cvr,
    RevenuePerConversion,
    Month,
    Adjustment,
    ScenarioWidth,
}

impl InputField {
    /// Inclusive (min, max).
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            Self::Budget => (1_000_000.0, 10_000_000_000.0),
            Self::Ratio => (0.0, 100.0),
            Self::Cpc => (10.0, 100_000.0),
            Self::Ctr | Self::Cvr => (0.0, 100.0),
            Self::RevenuePerConversion => (1_000.0, 100_000_000.0),
            Self::Month => (1.0, 12.0),
            Self::Adjustment => (-50.0, 50.0),
            Self::ScenarioWidth => (1.0, 30.0),
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Budget => "budget",
            Self::Ratio => "budget ratio",
            Self::Cpc => "CPC",
            Self::Ctr => "CTR",
            Self::Cvr => "CVR",
            Self::RevenuePerConversion => "revenue per conversion",
            Self::Month => "month",
            Self::Adjustment => "adjustment",
            Self::ScenarioWidth => "scenario width",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange { field: InputField, value: f64, min: f64, max: f64 },

    #[error("{field} must be a whole number, got {value}")]
    NotInteger { field: InputField, value: f64 },
}

/// Check one value against its field's bounds.
pub fn validate_input(field: InputField, value: f64) -> Result<(), ValidationError> {
    let (min, max) = field.bounds();
    if !(value >= min && value <= max) {
        return Err(ValidationError::OutOfRange { field, value, min, max });
    }
    if field == InputField::Month && value.fract() != 0.0 {
        return Err(ValidationError::NotInteger { field, value });
    }
    Ok(())
}

/// Every bounded field of a channel, first failure wins.
pub fn validate_channel(channel: &Channel) -> Result<(), ValidationError> {
    validate_input(InputField::Ratio, channel.budget_ratio)?;
    validate_input(InputField::Cpc, channel.cpc)?;
    validate_input(InputField::Ctr, channel.ctr)?;
    validate_input(InputField::Cvr, channel.cvr)?;
    validate_input(InputField::RevenuePerConversion, channel.revenue_per_conversion)?;
    validate_input(InputField::Adjustment, channel.adjustment)?;
    Ok(())
}

// ─── Efficiency Warnings ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    Low,
    High,
    OutOfRange,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EfficiencyWarning {
    pub metric: Metric,
    pub kind: WarningKind,
    pub value: f64,
    pub industry_avg: f64,
    /// Distance from the average in percent; zero for `OutOfRange`.
    pub difference_pct: f64,
}

/// Compare a rate (CTR/CVR in percent, CPC in currency) with the
/// industry's efficiency range. `None` when the value is typical or the
/// industry has no range for the metric.
pub fn efficiency_warning(
    store: &BenchmarkStore,
    industry: &str,
    metric: Metric,
    value: f64,
) -> Option<EfficiencyWarning> {
    let range = store.efficiency_range(industry, metric)?;
    let avg = range.avg;
    let (kind, difference_pct) = if value < avg * LOW_FACTOR {
        (WarningKind::Low, (avg - value) / avg * 100.0)
    } else if value > avg * HIGH_FACTOR {
        (WarningKind::High, (value - avg) / avg * 100.0)
    } else if value < range.min || value > range.max {
        (WarningKind::OutOfRange, 0.0)
    } else {
        return None;
    };
    Some(EfficiencyWarning { metric, kind, value, industry_avg: avg, difference_pct })
}

/// A warning tied to the channel that raised it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelWarning {
    pub channel: String,
    #[serde(flatten)]
    pub warning: EfficiencyWarning,
}

/// Efficiency warnings for every rate of every channel.
pub fn channel_warnings(store: &BenchmarkStore, industry: &str, channels: &[Channel]) -> Vec<ChannelWarning> {
    channels
        .iter()
        .flat_map(|c| {
            [(Metric::Ctr, c.ctr), (Metric::Cpc, c.cpc), (Metric::Cvr, c.cvr)]
                .into_iter()
                .filter_map(move |(metric, value)| efficiency_warning(store, industry, metric, value))
                .map(move |warning| ChannelWarning { channel: c.name.clone(), warning })
        })
        .collect()
}
