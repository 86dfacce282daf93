// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Tick pipeline
//!
//! ```text
//! 1. Propagation   neurons that fired last tick deliver weight × sign to their targets
//! 2. Dynamics      every region integrates input + decay and applies its firing policy
//! 3. Behaviors     region hooks run with mutable access to their own neurons
//! ```
//!
//! Injected stimulus is queued on the neuron and consumed in step 2, exactly
//! like propagated input.

use crate::behavior::RegionTickContext;
use crate::brain::HypergraphBrain;
use crate::statistics::TickReport;
use hyperbrain_npu_neural::NeuronId;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{error, trace};

impl HypergraphBrain {
    /// Advance the whole graph by one tick
    pub fn tick(&mut self, delta_time: f32) -> TickReport {
        let tick = self.tick_count;
        let transmissions = self.propagate();

        let fired: usize = self
            .regions
            .par_iter_mut()
            .map(|(_, region)| region.process(tick, delta_time))
            .sum();

        self.run_behaviors(tick, delta_time);
        self.tick_count += 1;

        trace!(
            target: "hyperbrain-substrate",
            "Tick {}: {} transmissions, {} fired",
            tick,
            transmissions,
            fired
        );
        TickReport {
            tick,
            transmissions,
            fired,
        }
    }

    /// Run `count` ticks back to back
    pub fn run_ticks(&mut self, count: u64, delta_time: f32) -> Vec<TickReport> {
        (0..count).map(|_| self.tick(delta_time)).collect()
    }

    /// Deliver spikes from firing neurons. Returns the number of transmissions.
    fn propagate(&mut self) -> usize {
        let mut deliveries: Vec<(NeuronId, f32)> = Vec::new();
        for region in self.regions.values() {
            for neuron in region.neurons().iter().filter(|n| n.is_firing()) {
                for synapse_id in region.outgoing_synapses(neuron.id()) {
                    if let Some(synapse) = self.synapses.get(synapse_id) {
                        deliveries.push((synapse.target, synapse.transmit(neuron.output())));
                    }
                }
            }
        }

        let mut delivered = 0;
        for (target, current) in deliveries {
            if let Some(neuron) = self.neuron_mut(target) {
                neuron.receive(current);
                delivered += 1;
            }
        }
        delivered
    }

    fn run_behaviors(&mut self, tick: u64, delta_time: f32) {
        for (region_id, behavior) in self.behaviors.iter_mut() {
            let Some(region) = self.regions.get_mut(region_id) else {
                continue;
            };
            let name = region.name().to_string();
            let mut ctx = RegionTickContext::new(*region_id, &name, tick, region.neurons_mut());
            let outcome = catch_unwind(AssertUnwindSafe(|| behavior.on_tick(&mut ctx, delta_time)));
            if outcome.is_err() {
                error!(
                    target: "hyperbrain-substrate",
                    "Behavior of region '{}' panicked at tick {}; continuing",
                    name,
                    tick
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::behavior::{RegionBehavior, RegionTickContext};
    use crate::brain::{HypergraphBrain, SynapseSpec};
    use hyperbrain_npu_neural::{ActivationPattern, RegionKind, SynapseType};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingBehavior {
        calls: Arc<AtomicUsize>,
    }

    impl RegionBehavior for CountingBehavior {
        fn on_tick(&mut self, ctx: &mut RegionTickContext<'_>, _delta_time: f32) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ctx.stimulate_all(0.0);
        }
    }

    struct PanickingBehavior;

    impl RegionBehavior for PanickingBehavior {
        fn on_tick(&mut self, _ctx: &mut RegionTickContext<'_>, _delta_time: f32) {
            panic!("behavior failure");
        }
    }

    fn chain() -> (HypergraphBrain, Vec<hyperbrain_npu_neural::NeuronId>) {
        let mut brain = HypergraphBrain::default();
        let region = brain
            .create_region("chain", RegionKind::Cortical, ActivationPattern::Asynchronous, 3)
            .unwrap();
        let ids = brain.region(region).unwrap().neuron_ids();
        brain
            .connect_neurons(ids[0], ids[1], SynapseSpec::new(0.9, SynapseType::Excitatory))
            .unwrap();
        brain
            .connect_neurons(ids[0], ids[2], SynapseSpec::new(0.9, SynapseType::Inhibitory))
            .unwrap();
        (brain, ids)
    }

    #[test]
    fn test_spike_propagates_next_tick() {
        let (mut brain, ids) = chain();
        brain.inject(ids[0], 1.0).unwrap();

        let first = brain.tick(0.1);
        assert_eq!(first.fired, 1);
        assert_eq!(first.transmissions, 0);

        let second = brain.tick(0.1);
        assert_eq!(second.transmissions, 2);
        assert!(brain.neuron(ids[1]).unwrap().is_firing());
        assert!(!brain.neuron(ids[2]).unwrap().is_firing());
        assert_eq!(brain.tick_count(), 2);
    }

    #[test]
    fn test_behavior_runs_each_tick() {
        let (mut brain, _) = chain();
        let calls = Arc::new(AtomicUsize::new(0));
        let region = brain.region_id("chain").unwrap();
        brain
            .set_region_behavior(
                region,
                Box::new(CountingBehavior {
                    calls: calls.clone(),
                }),
            )
            .unwrap();
        brain.run_ticks(4, 0.1);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_panicking_behavior_does_not_stop_tick() {
        let (mut brain, _) = chain();
        let region = brain.region_id("chain").unwrap();
        brain
            .set_region_behavior(region, Box::new(PanickingBehavior))
            .unwrap();
        let report = brain.tick(0.1);
        assert_eq!(report.tick, 0);
        assert_eq!(brain.tick_count(), 1);
    }
}
