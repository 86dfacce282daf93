// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synaptic weight range

/// Lower bound of a synaptic weight magnitude
pub const WEIGHT_MIN: f32 = 0.0;

/// Upper bound of a synaptic weight magnitude
pub const WEIGHT_MAX: f32 = 1.0;

/// Clamp a weight into [`WEIGHT_MIN`, `WEIGHT_MAX`]. NaN maps to `WEIGHT_MIN`.
#[inline]
pub fn clamp_weight(weight: f32) -> f32 {
    if weight.is_nan() {
        return WEIGHT_MIN;
    }
    weight.clamp(WEIGHT_MIN, WEIGHT_MAX)
}
