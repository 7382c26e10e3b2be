// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # resource-manager
//!
//! Tracks and hands out the resources of a tiled compute fabric: memory on
//! each tile's bank, bandwidth on memory ports, router ports and host links,
//! and whole groups of tiles for a workload.
//!
//! | Area | Operations |
//! |---|---|
//! | Memory | `get_free_memory`, `allocate_memory`, `release_memory`, `find_memory` |
//! | Bandwidth ledger | `available_*` / `reserve_*` / `release_*` for memory, port and cluster bandwidth |
//! | Network paths | `route`, `get_available_network_bandwidth`, `reserve_network_bandwidth`, `release_network_bandwidth`, `get_network_distance` |
//! | Tile sets | `find_single_units_set`, `find_units_set`, `find_units_sets`, `reserve_units_set`, `release_units_set` |
//! | Inspection | `snapshot`, `snapshot_all` |
//!
//! Every operation validates the cluster id, then the tile id(s), before
//! anything else, and reports failures as a [`ResourceError`] whose
//! [`status`](ResourceError::status) is one of the [`Status`] codes.
//! Operations that touch several resources (a network path, a tile set)
//! either complete or leave the manager as it was.
//!
//! # Example
//! ```
//! use fabric_topology::UnitType;
//! use resource_manager::{ResourceManager, TileLocation};
//!
//! let mut rm = ResourceManager::with_default_topology().unwrap();
//!
//! let set = rm.find_units_set(0, 2, &[UnitType::Gn, UnitType::Gn]).unwrap();
//! let reservation = rm.reserve_units_set(0, &set.tiles).unwrap();
//! let addr = rm.find_memory(0, set.anchor, 64 * 1024).unwrap();
//!
//! let (src, dst) = (TileLocation::new(0, set.anchor), TileLocation::new(0, 19));
//! // The route leaves the reserved tiles through a closed border port.
//! assert!(rm.reserve_network_bandwidth(src, dst, 10).is_err());
//!
//! rm.release_memory(0, set.anchor, addr, 64 * 1024).unwrap();
//! rm.release_units_set(0, &reservation.requested).unwrap();
//! ```

mod error;
mod ledger;
mod manager;
mod network;
mod reservation;
mod search;
mod shared;
mod snapshot;

pub use error::{ResourceError, Status};
pub use manager::ResourceManager;
pub use network::{xy_route, Hop, TileLocation};
pub use reservation::{Rect, Reservation};
pub use search::UnitsSet;
pub use shared::SharedResourceManager;
pub use snapshot::{ClusterSnapshot, PortState, TileSnapshot};
