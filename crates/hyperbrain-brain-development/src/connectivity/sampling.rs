// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Target selection and weight draws for region-to-region synaptogenesis.

All functions work on neuron *indices* within a region. The caller maps them
back to neuron ids.

Distance-biased families use the proxy distance
`|mapped_source - target_index|` with
`mapped_source = source_index * target_len / source_len`. They are
best-effort: after a bounded number of draws a source may end up with fewer
than the planned number of targets.
*/

use super::parameters::{ConnectionDistribution, ConnectionParameters, TopologyType};
use ahash::AHashSet;
use rand::seq::index;
use rand::Rng;
use rand_distr::{Distribution, Exp, Normal, Pareto};
use tracing::debug;

/// Block count for [`TopologyType::Modular`]
pub(crate) const MODULE_COUNT: usize = 4;

/// Rewiring probability for [`ConnectionDistribution::SmallWorld`]
pub(crate) const REWIRE_PROBABILITY: f64 = 0.1;

/// Draws allowed per planned target before a distance-biased search gives up
const ATTEMPTS_PER_TARGET: usize = 20;

/// Exponent of the power-law tail
const POWER_LAW_ALPHA: f64 = 2.0;

pub(crate) const MIN_WEIGHT: f32 = 0.01;
pub(crate) const MAX_WEIGHT: f32 = 1.0;

/// Half-open index range a source may reach in the target
fn reachable_range(
    params: &ConnectionParameters,
    source_index: usize,
    source_len: usize,
    target_len: usize,
) -> (usize, usize) {
    if params.topology != TopologyType::Modular || target_len < MODULE_COUNT {
        return (0, target_len);
    }
    let module = (source_index * MODULE_COUNT / source_len.max(1)).min(MODULE_COUNT - 1);
    let start = module * target_len / MODULE_COUNT;
    let end = (module + 1) * target_len / MODULE_COUNT;
    (start, end)
}

/// Number of targets planned for one source.
///
/// `p * min(available, cap)` is rounded stochastically, so the expected
/// degree stays exact even when it is below one.
pub(crate) fn planned_degree<R: Rng + ?Sized>(
    rng: &mut R,
    params: &ConnectionParameters,
    available: usize,
) -> usize {
    let capped = match params.max_connections_per_neuron {
        0 => available,
        cap => available.min(cap),
    };
    let expected = params.connection_probability as f64 * capped as f64;
    let whole = expected.floor();
    let fraction = expected - whole;
    let mut k = whole as usize;
    if fraction > 0.0 && rng.gen_bool(fraction) {
        k += 1;
    }
    k.min(available)
}

/// Distinct target indices for the source at `source_index`.
///
/// `exclude` removes one target index (the source itself when wiring a region
/// onto itself).
pub(crate) fn sample_targets<R: Rng + ?Sized>(
    rng: &mut R,
    params: &ConnectionParameters,
    source_index: usize,
    source_len: usize,
    target_len: usize,
    exclude: Option<usize>,
) -> Vec<usize> {
    let (start, end) = reachable_range(params, source_index, source_len, target_len);
    let excluded = exclude.filter(|&e| e >= start && e < end);
    let available = (end - start) - usize::from(excluded.is_some());
    let k = planned_degree(rng, params, available);
    if k == 0 {
        return Vec::new();
    }

    let flat = matches!(
        params.topology,
        TopologyType::Global | TopologyType::Sparse | TopologyType::Modular
    ) || params.distribution == ConnectionDistribution::Uniform;

    if flat {
        return sample_flat(rng, start, end, excluded, k);
    }

    let mapped = source_index * target_len / source_len.max(1);
    match params.distribution {
        ConnectionDistribution::SmallWorld => {
            sample_small_world(rng, mapped, target_len, excluded, k)
        }
        distribution => sample_distance_biased(
            rng,
            distribution,
            params.distance_decay,
            mapped,
            target_len,
            excluded,
            k,
        ),
    }
}

/// `k` distinct indices uniformly from `[start, end)` minus `excluded`
fn sample_flat<R: Rng + ?Sized>(
    rng: &mut R,
    start: usize,
    end: usize,
    excluded: Option<usize>,
    k: usize,
) -> Vec<usize> {
    let span = (end - start) - usize::from(excluded.is_some());
    index::sample(rng, span, k)
        .into_iter()
        .map(|offset| {
            let candidate = start + offset;
            match excluded {
                Some(skip) if candidate >= skip => candidate + 1,
                _ => candidate,
            }
        })
        .collect()
}

fn distance_scale(decay: f32, target_len: usize) -> f64 {
    if decay > 0.0 {
        1.0 / decay as f64
    } else {
        (target_len as f64 / 4.0).max(1.0)
    }
}

fn sample_distance_biased<R: Rng + ?Sized>(
    rng: &mut R,
    distribution: ConnectionDistribution,
    decay: f32,
    mapped: usize,
    target_len: usize,
    excluded: Option<usize>,
    k: usize,
) -> Vec<usize> {
    let scale = distance_scale(decay, target_len);
    let Some(offsets) = OffsetDistribution::new(distribution, scale) else {
        debug!(
            target: "hyperbrain-bdu",
            "No {:?} offset distribution for scale {}",
            distribution,
            scale
        );
        return Vec::new();
    };
    let mut chosen = Vec::with_capacity(k);
    let mut seen = AHashSet::with_capacity(k);
    let mut attempts = k * ATTEMPTS_PER_TARGET;

    while chosen.len() < k && attempts > 0 {
        attempts -= 1;
        let candidate = mapped as f64 + offsets.sample(rng);
        if candidate < 0.0 || candidate >= target_len as f64 {
            continue;
        }
        let candidate = candidate.round().min((target_len - 1) as f64) as usize;
        if Some(candidate) == excluded || !seen.insert(candidate) {
            continue;
        }
        chosen.push(candidate);
    }
    if chosen.len() < k {
        debug!(
            target: "hyperbrain-bdu",
            "{:?} sampling around {} gave up after {} draws: {} of {} targets",
            distribution,
            mapped,
            k * ATTEMPTS_PER_TARGET,
            chosen.len(),
            k
        );
    }
    chosen
}

/// Signed offset from the mapped source position
enum OffsetDistribution {
    Gaussian(Normal<f64>),
    Exponential(Exp<f64>),
    /// Pareto shifted to start at 0 (Lomax)
    PowerLaw { pareto: Pareto<f64>, scale: f64 },
}

impl OffsetDistribution {
    fn new(distribution: ConnectionDistribution, scale: f64) -> Option<Self> {
        match distribution {
            ConnectionDistribution::Exponential => {
                Exp::new(1.0 / scale).ok().map(Self::Exponential)
            }
            ConnectionDistribution::PowerLaw => Pareto::new(scale, POWER_LAW_ALPHA)
                .ok()
                .map(|pareto| Self::PowerLaw { pareto, scale }),
            _ => Normal::new(0.0, scale).ok().map(Self::Gaussian),
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let magnitude = match self {
            Self::Gaussian(normal) => return normal.sample(rng),
            Self::Exponential(exp) => exp.sample(rng),
            Self::PowerLaw { pareto, scale } => pareto.sample(rng) - scale,
        };
        if rng.gen_bool(0.5) {
            magnitude
        } else {
            -magnitude
        }
    }
}

/// Ring lattice around the mapped position with random rewiring
fn sample_small_world<R: Rng + ?Sized>(
    rng: &mut R,
    mapped: usize,
    target_len: usize,
    excluded: Option<usize>,
    k: usize,
) -> Vec<usize> {
    let mut chosen = Vec::with_capacity(k);
    let mut seen = AHashSet::with_capacity(k);
    let mut step = 0usize;
    let mut attempts = k * ATTEMPTS_PER_TARGET;

    while chosen.len() < k && attempts > 0 {
        attempts -= 1;
        let candidate = if rng.gen_bool(REWIRE_PROBABILITY) {
            rng.gen_range(0..target_len)
        } else {
            // 0, +1, -1, +2, -2, ... wrapped around the ring
            let distance = (step + 1) / 2;
            let forward = step % 2 == 1;
            step += 1;
            let distance = distance % target_len;
            if forward {
                (mapped + distance) % target_len
            } else {
                (mapped + target_len - distance) % target_len
            }
        };
        if Some(candidate) == excluded || !seen.insert(candidate) {
            continue;
        }
        chosen.push(candidate);
    }
    chosen
}

/// Weight drawn from N(mean, std), clamped to the synaptogenesis range
pub(crate) fn sample_weight<R: Rng + ?Sized>(rng: &mut R, params: &ConnectionParameters) -> f32 {
    let mean = params.weight_mean as f64;
    let raw = match Normal::new(mean, params.weight_std as f64) {
        Ok(normal) if params.weight_std > 0.0 => normal.sample(rng) as f32,
        _ => params.weight_mean,
    };
    raw.clamp(MIN_WEIGHT, MAX_WEIGHT)
}
