// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite - Engine Configuration

//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a complete
//! configuration. The core never reads files or the environment; callers
//! hand in the document.

use serde::{Deserialize, Serialize};

use crate::types::ChannelCategory;

/// What to do when active channel ratios do not sum to 100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RatioPolicy {
    /// Scale proportionally, rounding remainder to the last channel.
    #[default]
    Normalize,
    /// Refuse to compute.
    Reject,
}

/// Revenue per conversion assumed for channels generated from benchmarks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRevenue {
    #[serde(default = "default_sa_revenue")]
    pub sa: f64,
    #[serde(default = "default_da_revenue")]
    pub da: f64,
    #[serde(default = "default_va_revenue")]
    pub va: f64,
}

impl CategoryRevenue {
    pub fn for_category(&self, category: ChannelCategory) -> f64 {
        match category {
            ChannelCategory::SA => self.sa,
            ChannelCategory::DA => self.da,
            ChannelCategory::VA => self.va,
        }
    }
}

impl Default for CategoryRevenue {
    fn default() -> Self {
        Self {
            sa: default_sa_revenue(),
            da: default_da_revenue(),
            va: default_va_revenue(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Scenario width in percent: conservative is `-width`, aggressive `+width`.
    #[serde(default = "default_scenario_adjustment_pct")]
    pub scenario_adjustment_pct: f64,
    /// Allowed deviation of the ratio sum from 100.
    #[serde(default = "default_ratio_tolerance")]
    pub ratio_tolerance: f64,
    #[serde(default)]
    pub ratio_policy: RatioPolicy,
    #[serde(default)]
    pub default_revenue_per_conversion: CategoryRevenue,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scenario_adjustment_pct: default_scenario_adjustment_pct(),
            ratio_tolerance: default_ratio_tolerance(),
            ratio_policy: RatioPolicy::default(),
            default_revenue_per_conversion: CategoryRevenue::default(),
            log_level: default_log_level(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn default_scenario_adjustment_pct() -> f64 {
    5.0
}

fn default_ratio_tolerance() -> f64 {
    0.1
}

fn default_sa_revenue() -> f64 {
    100_000.0
}

fn default_da_revenue() -> f64 {
    80_000.0
}

fn default_va_revenue() -> f64 {
    70_000.0
}

fn default_log_level() -> String {
    "info".to_string()
}
