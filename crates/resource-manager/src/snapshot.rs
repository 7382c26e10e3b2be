// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Point-in-time view of a cluster's resources.
//!
//! A [`ClusterSnapshot`] copies out everything an operator wants to see:
//! which tiles are assigned, how full each memory bank is, and what is left
//! on every port and host link. It owns its data, so it can be serialised or
//! printed after the manager has moved on.

use crate::{ResourceError, ResourceManager};
use fabric_topology::{Access, Channel, ClusterId, Coord, Port, TileId, UnitType};

/// One router port of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PortState {
    pub port: Port,
    #[serde(flatten)]
    pub channel: Channel,
}

/// Resource state of one tile.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TileSnapshot {
    pub id: TileId,
    pub coord: Coord,
    pub unit_type: UnitType,
    pub subtype: u32,
    pub assigned: bool,
    /// Bank size in bytes; 0 when the tile has no bank.
    pub memory_size: u64,
    pub free_memory: u64,
    pub read_memory: Channel,
    pub write_memory: Channel,
    pub ports: Vec<PortState>,
}

impl TileSnapshot {
    /// Returns `true` if any port or memory channel has bandwidth reserved.
    pub fn has_traffic(&self) -> bool {
        self.read_memory.reserved() > 0
            || self.write_memory.reserved() > 0
            || self.ports.iter().any(|p| p.channel.reserved() > 0)
    }
}

/// Resource state of a whole cluster.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ClusterSnapshot {
    pub cluster: ClusterId,
    pub arch_id: u32,
    pub num_rows: usize,
    pub num_cols: usize,
    pub read_link: Channel,
    pub write_link: Channel,
    pub tiles: Vec<TileSnapshot>,
}

impl ClusterSnapshot {
    pub fn assigned_tiles(&self) -> usize {
        self.tiles.iter().filter(|t| t.assigned).count()
    }

    /// Fraction of all bank bytes currently allocated (0.0 to 1.0).
    pub fn memory_utilisation(&self) -> f64 {
        let (free, total) = self.tiles.iter().fold((0u128, 0u128), |(f, t), tile| {
            (f + u128::from(tile.free_memory), t + u128::from(tile.memory_size))
        });
        if total == 0 {
            return 0.0;
        }
        (total - free) as f64 / total as f64
    }

    /// Fraction of all router port bandwidth currently unavailable.
    pub fn port_utilisation(&self) -> f64 {
        let (reserved, capacity) = self
            .tiles
            .iter()
            .flat_map(|t| &t.ports)
            .fold((0u128, 0u128), |(r, c), p| {
                (
                    r + u128::from(p.channel.reserved()),
                    c + u128::from(p.channel.capacity()),
                )
            });
        if capacity == 0 {
            return 0.0;
        }
        reserved as f64 / capacity as f64
    }

    /// Returns a summary string suitable for logging or CLI display.
    ///
    /// # Example output
    /// ```text
    /// Cluster 0: 4/20 tiles assigned, memory 12% used, ports 8% used, host link r 1000/1000 w 750/1000
    /// ```
    pub fn summary(&self) -> String {
        format!(
            "Cluster {}: {}/{} tiles assigned, memory {:.0}% used, ports {:.0}% used, \
             host link r {}/{} w {}/{}",
            self.cluster,
            self.assigned_tiles(),
            self.tiles.len(),
            self.memory_utilisation() * 100.0,
            self.port_utilisation() * 100.0,
            self.read_link.available(),
            self.read_link.capacity(),
            self.write_link.available(),
            self.write_link.capacity(),
        )
    }
}

impl ResourceManager {
    /// Captures the current state of one cluster.
    pub fn snapshot(&self, cluster: ClusterId) -> Result<ClusterSnapshot, ResourceError> {
        let c = self.cluster(cluster)?;
        let tiles = c
            .tiles()
            .iter()
            .enumerate()
            .map(|(id, t)| TileSnapshot {
                id,
                coord: c.coord_of(id),
                unit_type: t.unit_type(),
                subtype: t.subtype(),
                assigned: t.is_assigned(),
                memory_size: t.memory_size(),
                free_memory: t.free_memory(),
                read_memory: *t.memory_channel(Access::Read),
                write_memory: *t.memory_channel(Access::Write),
                ports: Port::ALL
                    .iter()
                    .map(|&port| PortState {
                        port,
                        channel: *t.port(port),
                    })
                    .collect(),
            })
            .collect();

        Ok(ClusterSnapshot {
            cluster,
            arch_id: c.arch_id(),
            num_rows: c.num_rows(),
            num_cols: c.num_cols(),
            read_link: *c.link(Access::Read),
            write_link: *c.link(Access::Write),
            tiles,
        })
    }

    /// Snapshots of every cluster, in id order.
    pub fn snapshot_all(&self) -> Vec<ClusterSnapshot> {
        (0..self.num_clusters())
            .filter_map(|id| self.snapshot(id).ok())
            .collect()
    }
}
