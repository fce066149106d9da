// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite - Budget Allocation
//
// Active channel ratios must sum to 100 within the configured tolerance
// before any computation. Out-of-tolerance mixes are either scaled back to
// 100 or rejected, depending on the policy.

use crate::config::RatioPolicy;
use crate::rounding::round_dp;
use crate::types::Channel;

pub const FULL_ALLOCATION: f64 = 100.0;

/// Residual below which rounded ratios count as summing to 100.
const REMAINDER_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocationError {
    #[error("no active channels to allocate budget to")]
    NoActiveChannels,

    #[error("budget ratios sum to {sum:.1}%, expected 100%")]
    RatioSumMismatch { sum: f64 },

    #[error("channel '{name}' has negative budget ratio {value}")]
    NegativeRatio { name: String, value: f64 },
}

/// Active channels ready for computation.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedChannels {
    pub channels: Vec<Channel>,
    /// True when ratios were rescaled.
    pub normalized: bool,
}

pub fn ratio_sum(channels: &[Channel]) -> f64 {
    channels.iter().map(|c| c.budget_ratio).sum()
}

pub fn within_tolerance(sum: f64, tolerance: f64) -> bool {
    (sum - FULL_ALLOCATION).abs() <= tolerance
}

/// Scale ratios to sum to 100.
///
/// A zero sum splits equally. Otherwise each ratio is scaled
/// proportionally and rounded to one decimal. A positive rounding remainder
/// lands on the last channel; a negative one is taken from the trailing
/// channels without pushing any of them below zero. Returns new channels;
/// the input is untouched.
pub fn normalize_ratios(channels: &[Channel]) -> Vec<Channel> {
    if channels.is_empty() {
        return Vec::new();
    }
    let total = ratio_sum(channels);
    if total <= 0.0 {
        let equal = FULL_ALLOCATION / channels.len() as f64;
        return channels.iter().map(|c| c.clone().with_ratio(equal)).collect();
    }

    let mut normalized: Vec<Channel> = channels
        .iter()
        .map(|c| c.clone().with_ratio(round_dp(c.budget_ratio / total * FULL_ALLOCATION, 1)))
        .collect();

    let mut remainder = round_dp(FULL_ALLOCATION - ratio_sum(&normalized), 1);
    if remainder > REMAINDER_EPSILON {
        if let Some(last) = normalized.last_mut() {
            last.budget_ratio = round_dp(last.budget_ratio + remainder, 1);
        }
    } else if remainder < -REMAINDER_EPSILON {
        for channel in normalized.iter_mut().rev() {
            let taken = (-remainder).min(channel.budget_ratio);
            channel.budget_ratio = round_dp(channel.budget_ratio - taken, 1).max(0.0);
            remainder = round_dp(remainder + taken, 1);
            if remainder >= -REMAINDER_EPSILON {
                break;
            }
        }
    }
    normalized
}

/// Filter active channels and enforce the allocation invariant under
/// `policy`.
pub fn prepare_channels(
    channels: &[Channel],
    policy: RatioPolicy,
    tolerance: f64,
) -> Result<PreparedChannels, AllocationError> {
    let active: Vec<Channel> = channels.iter().filter(|c| c.active).cloned().collect();
    if active.is_empty() {
        return Err(AllocationError::NoActiveChannels);
    }
    if let Some(bad) = active.iter().find(|c| !(c.budget_ratio >= 0.0)) {
        return Err(AllocationError::NegativeRatio {
            name: bad.name.clone(),
            value: bad.budget_ratio,
        });
    }

    let sum = ratio_sum(&active);
    if within_tolerance(sum, tolerance) {
        return Ok(PreparedChannels { channels: active, normalized: false });
    }

    match policy {
        RatioPolicy::Reject => Err(AllocationError::RatioSumMismatch { sum }),
        RatioPolicy::Normalize => {
            tracing::debug!(sum, channels = active.len(), "normalizing budget ratios");
            Ok(PreparedChannels {
                channels: normalize_ratios(&active),
                normalized: true,
            })
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
