// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synaptic contribution calculation

use super::SynapseType;

/// Calculate the current a synapse delivers to its target
///
/// `contribution = sign × weight × pre_activation`
///
/// # Example
/// ```
/// use hyperbrain_npu_neural::synapse::{compute_synaptic_contribution, SynapseType};
///
/// let c = compute_synaptic_contribution(0.5, 1.0, SynapseType::Inhibitory);
/// assert_eq!(c, -0.5);
/// ```
#[inline]
pub fn compute_synaptic_contribution(weight: f32, pre_activation: f32, synapse_type: SynapseType) -> f32 {
    synapse_type.sign() * weight * pre_activation
}

/// Batch version; output is resized to `weights.len()`
pub fn compute_synaptic_contributions_batch(
    weights: &[f32],
    pre_activations: &[f32],
    types: &[SynapseType],
    output: &mut Vec<f32>,
) {
    output.clear();
    output.extend(
        weights
            .iter()
            .zip(pre_activations)
            .zip(types)
            .map(|((&w, &a), &t)| compute_synaptic_contribution(w, a, t)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_matches_scalar() {
        let weights = [0.2, 0.4, 0.9];
        let acts = [1.0, 0.5, 0.0];
        let types = [
            SynapseType::Excitatory,
            SynapseType::Inhibitory,
            SynapseType::Excitatory,
        ];
        let mut out = Vec::new();
        compute_synaptic_contributions_batch(&weights, &acts, &types, &mut out);
        assert_eq!(out.len(), 3);
        assert!((out[0] - 0.2).abs() < 1e-6);
        assert!((out[1] + 0.2).abs() < 1e-6);
        assert_eq!(out[2], 0.0);
    }
}
