// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Neuron models

pub mod neuron;

pub use neuron::{Neuron, NeuronParameters, ACTIVATION_MAX, ACTIVATION_MIN};
