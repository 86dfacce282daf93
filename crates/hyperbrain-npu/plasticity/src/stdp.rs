// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pure STDP computation
//!
//! Spike times are substrate ticks. `dt = post_spike - pre_spike`.

use serde::{Deserialize, Serialize};

/// STDP configuration parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StdpConfig {
    /// Pre-synaptic time constant (τ_pre), in ticks
    pub tau_pre: f32,
    /// Post-synaptic time constant (τ_post), in ticks
    pub tau_post: f32,
    /// Potentiation learning rate (A+)
    pub a_plus: f32,
    /// Depression learning rate (A-)
    pub a_minus: f32,
    /// Spike pairs further apart than this are ignored
    pub window: u64,
}

impl Default for StdpConfig {
    fn default() -> Self {
        Self {
            tau_pre: 20.0,
            tau_post: 20.0,
            a_plus: 0.01,
            a_minus: 0.012,
            window: 50,
        }
    }
}

/// Compute STDP weight change for a single spike pair
///
/// Uses exponential STDP rule:
/// - Δw = A+ * exp(-Δt/τ_pre) if pre before post (potentiation)
/// - Δw = -A- * exp(Δt/τ_post) if post before pre (depression)
///
/// # Example
/// ```
/// use hyperbrain_npu_plasticity::stdp::{compute_stdp_weight_change, StdpConfig};
///
/// let config = StdpConfig::default();
/// assert!(compute_stdp_weight_change(5, &config) > 0.0);
/// assert!(compute_stdp_weight_change(-5, &config) < 0.0);
/// ```
#[inline]
pub fn compute_stdp_weight_change(dt: i64, config: &StdpConfig) -> f32 {
    if dt > 0 {
        let dt_f = dt as f32;
        config.a_plus * (-dt_f / config.tau_pre.max(1e-6)).exp()
    } else if dt < 0 {
        let dt_f = (-dt) as f32;
        -config.a_minus * (-dt_f / config.tau_post.max(1e-6)).exp()
    } else {
        // Same tick → strong potentiation
        config.a_plus
    }
}

/// Timing difference for a pair of last-spike ticks, if the pair is inside the window
/// and at least one side spiked at `now`
pub fn spike_pair_dt(
    pre_spike: Option<u64>,
    post_spike: Option<u64>,
    now: u64,
    config: &StdpConfig,
) -> Option<i64> {
    let (pre, post) = (pre_spike?, post_spike?);
    if pre != now && post != now {
        return None;
    }
    let dt = post as i64 - pre as i64;
    (dt.unsigned_abs() <= config.window).then_some(dt)
}
