// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Region-to-region connectivity.

`ConnectivityManager` plans synapses from declarative
[`ConnectionParameters`], reserves adjacency capacity up front and records a
[`RegionConnection`] per wired region pair.
*/

pub mod connection;
pub mod exchange;
pub mod manager;
pub mod parameters;
pub(crate) mod sampling;

pub use connection::{ConnectivityStatistics, RegionConnection};
pub use exchange::{ImportReport, CONNECTIVITY_DOCUMENT_VERSION};
pub use manager::ConnectivityManager;
pub use parameters::{default_patterns, ConnectionDistribution, ConnectionParameters, TopologyType};
