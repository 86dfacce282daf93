// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# HyperBrain Brain Development

Region registry and probabilistic synaptogenesis between regions of a
[`HypergraphBrain`](hyperbrain_npu_substrate::HypergraphBrain).

## Example

```
use hyperbrain_brain_development::{ConnectionParameters, ConnectivityManager};
use hyperbrain_npu_neural::{ActivationPattern, RegionKind};
use hyperbrain_npu_substrate::HypergraphBrain;

let mut brain = HypergraphBrain::default();
brain.create_region("v1", RegionKind::Cortical, ActivationPattern::Sparse, 16).unwrap();
brain.create_region("v2", RegionKind::Cortical, ActivationPattern::Sparse, 16).unwrap();

let manager = ConnectivityManager::with_seed(7);
manager.register_regions_from(&brain);
let created = manager
    .connect_regions(&mut brain, "v1", "v2", &ConnectionParameters::default())
    .unwrap();
assert_eq!(brain.synapse_count(), created);
```
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod connectivity;
mod rng;
pub mod types;

pub use connectivity::{
    default_patterns, ConnectionDistribution, ConnectionParameters, ConnectivityManager,
    ConnectivityStatistics, ImportReport, RegionConnection, TopologyType,
    CONNECTIVITY_DOCUMENT_VERSION,
};
pub use types::{BduError, BduResult};
