// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Region extension point
//!
//! Region-specific behavior (sensory encoders, motor readout, memory regions)
//! plugs in through [`RegionBehavior`]. The substrate calls it once per tick,
//! after neuron dynamics, with mutable access to the neurons of that region
//! only.

use hyperbrain_npu_neural::{Neuron, RegionId};
use hyperbrain_state_manager::{PersistenceHandle, RunId};

/// View of one region handed to its behavior during a tick
pub struct RegionTickContext<'a> {
    region_id: RegionId,
    region_name: &'a str,
    tick: u64,
    neurons: &'a mut [Neuron],
}

impl<'a> RegionTickContext<'a> {
    pub(crate) fn new(
        region_id: RegionId,
        region_name: &'a str,
        tick: u64,
        neurons: &'a mut [Neuron],
    ) -> Self {
        Self {
            region_id,
            region_name,
            tick,
            neurons,
        }
    }

    pub fn region_id(&self) -> RegionId {
        self.region_id
    }

    pub fn region_name(&self) -> &str {
        self.region_name
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn neurons(&self) -> &[Neuron] {
        self.neurons
    }

    pub fn neurons_mut(&mut self) -> &mut [Neuron] {
        self.neurons
    }

    pub fn firing_count(&self) -> usize {
        self.neurons.iter().filter(|n| n.is_firing()).count()
    }

    pub fn mean_activation(&self) -> f32 {
        if self.neurons.is_empty() {
            return 0.0;
        }
        self.neurons.iter().map(Neuron::activation).sum::<f32>() / self.neurons.len() as f32
    }

    /// Queue `amount` of input on every neuron for the next tick
    pub fn stimulate_all(&mut self, amount: f32) {
        for neuron in self.neurons.iter_mut() {
            neuron.receive(amount);
        }
    }
}

/// Per-tick hook for a region kind
pub trait RegionBehavior: Send {
    fn on_tick(&mut self, ctx: &mut RegionTickContext<'_>, delta_time: f32);

    /// Hand the behavior a persistence handle. Behaviors that do not persist ignore it.
    fn attach_persistence(&mut self, _handle: PersistenceHandle, _run: RunId) {}
}
