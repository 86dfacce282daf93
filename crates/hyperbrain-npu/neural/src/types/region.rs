// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Region tags
//!
//! Both tags are descriptive: the substrate uses `ActivationPattern` to pick a
//! firing policy, while `RegionKind` is only carried for callers and checkpoints.

use serde::{Deserialize, Serialize};

/// Anatomical family of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    #[default]
    Cortical,
    Subcortical,
    Brainstem,
    Limbic,
    Special,
}

/// How the neurons of a region are allowed to fire within one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivationPattern {
    /// Every neuron fires independently when it crosses threshold
    #[default]
    Asynchronous,
    /// Once any neuron fires, every neuron above half threshold fires with it
    Synchronous,
    /// Independent firing; layering is expressed through connectivity
    Layered,
    /// Threshold modulated by a slow sine over the tick counter
    Oscillatory,
    /// Winner-take-all: only the most active candidate fires
    Competitive,
    /// At most a small fraction of the region fires per tick
    Sparse,
}

impl std::fmt::Display for RegionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RegionKind::Cortical => "cortical",
            RegionKind::Subcortical => "subcortical",
            RegionKind::Brainstem => "brainstem",
            RegionKind::Limbic => "limbic",
            RegionKind::Special => "special",
        };
        f.write_str(name)
    }
}
