// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # HyperBrain Plasticity
//!
//! Synaptic learning over a [`HypergraphBrain`](hyperbrain_npu_substrate::HypergraphBrain):
//! a correlation (Hebbian) rule, a timing (STDP) rule and an intrinsic
//! motivation signal derived from the substrate's own activity.
//!
//! The [`LearningSystem`] works with or without a persistence store. Store
//! failures are logged and swallowed.

pub mod config;
pub mod hebbian;
pub mod motivation;
pub mod stdp;
pub mod system;

pub use config::{LearningConfig, PlasticityError, Result};
pub use hebbian::{hebbian_weight_change, HebbianConfig};
pub use motivation::{MotivationConfig, MotivationSignal};
pub use stdp::{compute_stdp_weight_change, StdpConfig};
pub use system::{LearningStatistics, LearningSystem, LearningUpdate};
