// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Adjacency-view invariants under repeated and reserved wiring

use hyperbrain_npu_neural::{ActivationPattern, NeuronId, RegionKind, SynapseType};
use hyperbrain_npu_substrate::{HypergraphBrain, RegionStats, SynapseSpec};
use proptest::prelude::*;

fn two_regions(src_size: usize, dst_size: usize) -> HypergraphBrain {
    let mut brain = HypergraphBrain::default();
    brain
        .create_region("src", RegionKind::Cortical, ActivationPattern::Asynchronous, src_size)
        .unwrap();
    brain
        .create_region("dst", RegionKind::Subcortical, ActivationPattern::Asynchronous, dst_size)
        .unwrap();
    brain
}

fn ids(brain: &HypergraphBrain, name: &str) -> Vec<NeuronId> {
    brain.region_by_name(name).unwrap().neuron_ids()
}

proptest! {
    #[test]
    fn prop_repeated_connect_keeps_single_entries(
        pairs in proptest::collection::vec((0usize..6, 0usize..6), 1..40),
        repeats in 1usize..4,
    ) {
        let mut brain = two_regions(6, 6);
        let src = ids(&brain, "src");
        let dst = ids(&brain, "dst");
        for _ in 0..repeats {
            for &(s, t) in &pairs {
                brain
                    .connect_neurons(src[s], dst[t], SynapseSpec::new(0.5, SynapseType::Excitatory))
                    .unwrap();
            }
        }

        let mut unique = pairs.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(brain.synapse_count(), unique.len());

        let src_region = brain.region_by_name("src").unwrap();
        let dst_region = brain.region_by_name("dst").unwrap();
        for &(s, t) in &unique {
            let synapse = brain.synapse_between(src[s], dst[t]).unwrap();
            prop_assert_eq!(
                src_region.outgoing_synapses(src[s]).iter().filter(|&&id| id == synapse.id).count(),
                1
            );
            prop_assert_eq!(
                dst_region.incoming_synapses(dst[t]).iter().filter(|&&id| id == synapse.id).count(),
                1
            );
        }
        prop_assert_eq!(
            src_region.inter_region_synapses(dst_region.id()).len(),
            unique.len()
        );
    }

    #[test]
    fn prop_reserved_capacity_absorbs_inserts(n in 1usize..32) {
        let mut brain = two_regions(1, 32);
        let source = ids(&brain, "src")[0];
        let targets = ids(&brain, "dst");
        let src_id = brain.region_id("src").unwrap();
        let dst_id = brain.region_id("dst").unwrap();

        brain.reserve_outgoing(source, n).unwrap();
        brain.reserve_inter_region(src_id, dst_id, n).unwrap();
        let out_cap = brain.region(src_id).unwrap().outgoing_capacity(source);
        let inter_cap = brain.region(src_id).unwrap().inter_region_capacity(dst_id);

        for &target in targets.iter().take(n) {
            brain.connect_neurons(source, target, SynapseSpec::default()).unwrap();
        }

        let region = brain.region(src_id).unwrap();
        prop_assert_eq!(region.outgoing_capacity(source), out_cap);
        prop_assert_eq!(region.inter_region_capacity(dst_id), inter_cap);
        prop_assert_eq!(region.outgoing_synapses(source).len(), n);
    }
}

#[test]
fn double_connect_leaves_every_view_at_one() {
    let mut brain = two_regions(2, 2);
    let src = ids(&brain, "src")[0];
    let dst = ids(&brain, "dst")[0];

    let first = brain.connect_neurons(src, dst, SynapseSpec::default()).unwrap();
    let second = brain.connect_neurons(src, dst, SynapseSpec::default()).unwrap();
    assert_eq!(first.synapse_id(), second.synapse_id());
    assert!(!second.is_new());

    let src_region = brain.region_by_name("src").unwrap();
    let dst_region = brain.region_by_name("dst").unwrap();
    assert_eq!(src_region.outgoing_synapses(src).len(), 1);
    assert_eq!(dst_region.incoming_synapses(dst).len(), 1);
    assert_eq!(src_region.inter_region_synapses(dst_region.id()).len(), 1);
}

#[test]
fn region_statistics_count_views() {
    let mut brain = two_regions(2, 2);
    let src = ids(&brain, "src");
    let dst = ids(&brain, "dst");
    brain.connect_neurons(src[0], dst[0], SynapseSpec::default()).unwrap();
    brain.connect_neurons(src[0], src[1], SynapseSpec::default()).unwrap();

    let stats: RegionStats = brain
        .region_statistics(brain.region_id("src").unwrap())
        .unwrap();
    assert_eq!(stats.outgoing_synapses, 2);
    assert_eq!(stats.incoming_synapses, 1);
    assert_eq!(stats.inter_region_synapses, 1);
}
