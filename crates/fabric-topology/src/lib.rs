// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # fabric-topology
//!
//! The data model of a heterogeneous compute fabric: clusters of tiles laid
//! out on a grid, each tile optionally hosting a compute unit and a memory
//! bank, connected through a mesh router with per-port bandwidth budgets.
//!
//! - [`UnitType`]: the compute unit family on a tile.
//! - [`Port`], [`Coord`], [`Access`]: router ports, grid positions and
//!   read/write directions.
//! - [`Channel`]: a capacity/available bandwidth pair with checked
//!   reserve/release.
//! - [`Tile`] and [`Cluster`]: the grid itself.
//! - [`FabricConfig`]: the configuration provider: TOML/JSON loading and
//!   the documented default topology.
//!
//! # Example
//! ```
//! use fabric_topology::FabricConfig;
//!
//! let clusters = FabricConfig::default().build().unwrap();
//! println!("{}", clusters[0].summary());
//! assert_eq!(clusters[0].num_tiles(), 20);
//! ```

mod channel;
mod cluster;
pub mod config;
mod error;
mod geometry;
mod tile;
mod unit;

pub use channel::Channel;
pub use cluster::{Cluster, MAX_TILES};
pub use config::{ClusterConfig, FabricConfig, TileConfig, TileOverride};
pub use error::{BandwidthError, TopologyError};
pub use geometry::{Access, ClusterId, Coord, Port, TileId};
pub use tile::{Tile, TileBandwidth};
pub use unit::UnitType;
