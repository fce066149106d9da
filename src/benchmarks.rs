// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite - Benchmark Data Store

//! Read-only reference tables: industry base rates, monthly seasonality,
//! industry season weights, channel multipliers, per-channel benchmarks and
//! efficiency ranges.
//!
//! A [`BenchmarkStore`] is built once and passed by reference to the
//! engines. Every lookup returns `Option`; partial coverage is normal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{ChannelCategory, RateTriple};

/// Built-in dataset, embedded at compile time.
const BUILTIN_BENCHMARKS: &str = include_str!("../data/benchmarks.json");

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum BenchmarkError {
    #[error("benchmark document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("seasonality month {0} is outside 1-12")]
    InvalidMonth(u8),

    #[error("non-positive value in {table} for '{key}'")]
    NonPositiveRate { table: &'static str, key: String },
}

// ---------------------------------------------------------------------------
// Table entries
// ---------------------------------------------------------------------------

/// Industry-specific boost or damping on top of the common seasonality.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndustrySeasonWeight {
    #[serde(default)]
    pub high_months: Vec<u8>,
    #[serde(default)]
    pub low_months: Vec<u8>,
    #[serde(default = "one")]
    pub high_multiplier: f64,
    #[serde(default = "one")]
    pub low_multiplier: f64,
}

fn one() -> f64 {
    1.0
}

/// Observed rates for one channel in one industry. CTR and CVR are
/// percentages here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChannelBenchmark {
    pub ctr: f64,
    pub cpc: f64,
    pub cvr: f64,
    #[serde(default)]
    pub cpa: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Ctr,
    Cpc,
    Cvr,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ctr => "CTR",
            Self::Cpc => "CPC",
            Self::Cvr => "CVR",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EfficiencyRange {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Raw benchmark document as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BenchmarkData {
    #[serde(default)]
    pub industry_base_metrics: BTreeMap<String, RateTriple>,
    #[serde(default)]
    pub seasonality: BTreeMap<u8, f64>,
    #[serde(default)]
    pub industry_season_weights: BTreeMap<String, IndustrySeasonWeight>,
    #[serde(default)]
    pub media_multipliers: BTreeMap<String, RateTriple>,
    #[serde(default)]
    pub channel_benchmarks: BTreeMap<String, BTreeMap<String, ChannelBenchmark>>,
    #[serde(default)]
    pub efficiency_ranges: BTreeMap<String, BTreeMap<Metric, EfficiencyRange>>,
}

// ---------------------------------------------------------------------------
// BenchmarkStore
// ---------------------------------------------------------------------------

/// Validated, immutable view over a [`BenchmarkData`] document.
#[derive(Debug, Clone)]
pub struct BenchmarkStore {
    data: BenchmarkData,
}

impl BenchmarkStore {
    /// Validate and wrap a benchmark document.
    pub fn from_data(data: BenchmarkData) -> Result<Self, BenchmarkError> {
        for (&month, &factor) in &data.seasonality {
            if !(1..=12).contains(&month) {
                return Err(BenchmarkError::InvalidMonth(month));
            }
            if !(factor > 0.0) {
                return Err(BenchmarkError::NonPositiveRate {
                    table: "seasonality",
                    key: month.to_string(),
                });
            }
        }
        for (key, m) in &data.media_multipliers {
            if !(m.ctr > 0.0 && m.cpc > 0.0 && m.cvr > 0.0) {
                return Err(BenchmarkError::NonPositiveRate {
                    table: "media_multipliers",
                    key: key.clone(),
                });
            }
        }
        for (industry, base) in &data.industry_base_metrics {
            if !(base.ctr > 0.0 && base.cpc > 0.0 && base.cvr >= 0.0) {
                return Err(BenchmarkError::NonPositiveRate {
                    table: "industry_base_metrics",
                    key: industry.clone(),
                });
            }
        }
        for (industry, weight) in &data.industry_season_weights {
            let mut months = weight.high_months.iter().chain(weight.low_months.iter());
            if let Some(&bad) = months.find(|m| !(1..=12).contains(*m)) {
                tracing::warn!(industry = %industry, month = bad, "season weight month outside 1-12");
                return Err(BenchmarkError::InvalidMonth(bad));
            }
        }
        Ok(Self { data })
    }

    pub fn from_json(json: &str) -> Result<Self, BenchmarkError> {
        let data: BenchmarkData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    /// The dataset shipped with the crate.
    pub fn builtin() -> Result<Self, BenchmarkError> {
        Self::from_json(BUILTIN_BENCHMARKS)
    }

    pub fn data(&self) -> &BenchmarkData {
        &self.data
    }

    /// Industries with base metrics, in sorted order.
    pub fn industries(&self) -> impl Iterator<Item = &str> + '_ {
        self.data.industry_base_metrics.keys().map(String::as_str)
    }

    pub fn base_metrics(&self, industry: &str) -> Option<&RateTriple> {
        self.data.industry_base_metrics.get(industry)
    }

    /// Common seasonality factor for a month.
    pub fn seasonality(&self, month: u8) -> Option<f64> {
        self.data.seasonality.get(&month).copied()
    }

    pub fn season_weight(&self, industry: &str) -> Option<&IndustrySeasonWeight> {
        self.data.industry_season_weights.get(industry)
    }

    pub fn media_multiplier(&self, channel_key: &str) -> Option<&RateTriple> {
        self.data.media_multipliers.get(channel_key)
    }

    /// Channel keys known to the multiplier table.
    pub fn channel_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.data.media_multipliers.keys().map(String::as_str)
    }

    /// Multiplier-table channel keys of one category.
    pub fn channel_keys_in(&self, category: ChannelCategory) -> Vec<&str> {
        self.channel_keys()
            .filter(|key| ChannelCategory::from_channel_key(key) == Some(category))
            .collect()
    }

    pub fn channel_benchmarks(&self, industry: &str) -> Option<&BTreeMap<String, ChannelBenchmark>> {
        self.data.channel_benchmarks.get(industry)
    }

    pub fn channel_benchmark(&self, industry: &str, channel_key: &str) -> Option<&ChannelBenchmark> {
        self.channel_benchmarks(industry)?.get(channel_key)
    }

    pub fn efficiency_range(&self, industry: &str, metric: Metric) -> Option<&EfficiencyRange> {
        self.data.efficiency_ranges.get(industry)?.get(&metric)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
