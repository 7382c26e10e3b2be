// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Topology configuration: the one-shot provider of the initial fabric.
//!
//! A topology is loaded from TOML (or JSON) once at start-up, or taken from
//! [`FabricConfig::default()`] when no file is given.
//!
//! # TOML Format
//! ```toml
//! [[clusters]]
//! arch_id = 0
//! num_rows = 4
//! num_cols = 5
//! read_cluster_bw = 1000
//! write_cluster_bw = 1000
//!
//! [clusters.defaults]        # template applied to every tile
//! unit_type = "GN"
//! memory_size = "0"
//! north_port_bw = 100
//!
//! [[clusters.tiles]]         # sparse per-tile overrides
//! id = 0
//! memory_size = "1M"
//! ```
//!
//! A cluster grid must be non-empty and hold at most
//! [`MAX_TILES`](crate::MAX_TILES) tiles; larger grids are rejected before any
//! tile is built.
//!
//! # Default topology
//! One cluster of 4 rows × 5 columns, every tile a `GN` unit of subtype 0,
//! 1 MiB of memory on each corner tile (0, 4, 15 and 19), 100 units of
//! bandwidth on every router port and memory direction, and 1000 units on
//! each host link.

use crate::cluster::grid_size;
use crate::{Cluster, Tile, TileBandwidth, TopologyError, UnitType};
use std::collections::HashSet;
use std::path::Path;
use tile_memory::ByteSize;

/// Rows of the default grid.
pub const DEFAULT_ROWS: usize = 4;
/// Columns of the default grid.
pub const DEFAULT_COLS: usize = 5;
/// Per-port and per-memory-direction bandwidth of the default topology.
pub const DEFAULT_TILE_BW: u64 = 100;
/// Host-link bandwidth (each direction) of the default topology.
pub const DEFAULT_LINK_BW: u64 = 1000;
/// Memory bank size on the default corner tiles.
pub const DEFAULT_BANK: &str = "1M";

/// The whole fabric: an ordered list of clusters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FabricConfig {
    pub clusters: Vec<ClusterConfig>,
}

/// One cluster's grid, host links and tiles.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub arch_id: u32,
    pub num_rows: usize,
    pub num_cols: usize,
    #[serde(default = "default_link_bw")]
    pub read_cluster_bw: u64,
    #[serde(default = "default_link_bw")]
    pub write_cluster_bw: u64,
    /// Template for every tile of the cluster.
    #[serde(default)]
    pub defaults: TileConfig,
    /// Per-tile deviations from the template.
    #[serde(default)]
    pub tiles: Vec<TileOverride>,
}

/// Complete description of one tile.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TileConfig {
    pub unit_type: UnitType,
    pub subtype: u32,
    /// Bank size, human-readable (`"1M"`). `"0"` means no bank.
    pub memory_size: String,
    pub read_memory_bw: u64,
    pub write_memory_bw: u64,
    pub north_port_bw: u64,
    pub east_port_bw: u64,
    pub west_port_bw: u64,
    pub south_port_bw: u64,
    pub local_port_bw: u64,
}

/// Sparse override of a [`TileConfig`] for the tile `id`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TileOverride {
    pub id: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<UnitType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_memory_bw: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_memory_bw: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub north_port_bw: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub east_port_bw: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub west_port_bw: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub south_port_bw: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_port_bw: Option<u64>,
}

fn default_link_bw() -> u64 {
    DEFAULT_LINK_BW
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            unit_type: UnitType::Gn,
            subtype: 0,
            memory_size: "0".to_string(),
            read_memory_bw: DEFAULT_TILE_BW,
            write_memory_bw: DEFAULT_TILE_BW,
            north_port_bw: DEFAULT_TILE_BW,
            east_port_bw: DEFAULT_TILE_BW,
            west_port_bw: DEFAULT_TILE_BW,
            south_port_bw: DEFAULT_TILE_BW,
            local_port_bw: DEFAULT_TILE_BW,
        }
    }
}

impl TileConfig {
    fn apply(&mut self, o: &TileOverride) {
        if let Some(v) = o.unit_type {
            self.unit_type = v;
        }
        if let Some(v) = o.subtype {
            self.subtype = v;
        }
        if let Some(v) = &o.memory_size {
            self.memory_size = v.clone();
        }
        let fields = [
            (o.read_memory_bw, &mut self.read_memory_bw),
            (o.write_memory_bw, &mut self.write_memory_bw),
            (o.north_port_bw, &mut self.north_port_bw),
            (o.east_port_bw, &mut self.east_port_bw),
            (o.west_port_bw, &mut self.west_port_bw),
            (o.south_port_bw, &mut self.south_port_bw),
            (o.local_port_bw, &mut self.local_port_bw),
        ];
        for (value, slot) in fields {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }

    fn bandwidth(&self) -> TileBandwidth {
        TileBandwidth {
            read_memory_bw: self.read_memory_bw,
            write_memory_bw: self.write_memory_bw,
            north_port_bw: self.north_port_bw,
            east_port_bw: self.east_port_bw,
            west_port_bw: self.west_port_bw,
            south_port_bw: self.south_port_bw,
            local_port_bw: self.local_port_bw,
        }
    }
}

impl ClusterConfig {
    /// Resolves the template and overrides into one config per tile.
    fn resolve_tiles(&self, cluster: usize) -> Result<Vec<TileConfig>, TopologyError> {
        let num_tiles = grid_size(cluster, self.num_rows, self.num_cols)?;
        let mut resolved = vec![self.defaults.clone(); num_tiles];
        let mut seen = HashSet::new();

        for o in &self.tiles {
            if o.id >= num_tiles {
                return Err(TopologyError::InvalidTile {
                    cluster,
                    tile: o.id,
                    detail: format!("id out of range for a {num_tiles}-tile grid"),
                });
            }
            if !seen.insert(o.id) {
                return Err(TopologyError::InvalidTile {
                    cluster,
                    tile: o.id,
                    detail: "tile overridden more than once".into(),
                });
            }
            resolved[o.id].apply(o);
        }
        Ok(resolved)
    }

    fn build(&self, cluster: usize) -> Result<Cluster, TopologyError> {
        let tiles = self
            .resolve_tiles(cluster)?
            .iter()
            .enumerate()
            .map(|(id, tc)| {
                let size = ByteSize::parse(&tc.memory_size).map_err(|e| {
                    TopologyError::InvalidTile {
                        cluster,
                        tile: id,
                        detail: e.to_string(),
                    }
                })?;
                Ok(Tile::new(tc.unit_type, tc.subtype, size.as_bytes(), tc.bandwidth()))
            })
            .collect::<Result<Vec<_>, TopologyError>>()?;

        Cluster::new(
            cluster,
            self.arch_id,
            self.num_rows,
            self.num_cols,
            self.read_cluster_bw,
            self.write_cluster_bw,
            tiles,
        )
    }
}

impl FabricConfig {
    /// Loads a topology file. Files ending in `.json` are parsed as JSON,
    /// everything else as TOML.
    pub fn from_file(path: &Path) -> Result<Self, TopologyError> {
        let content = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json(&content)?,
            _ => Self::from_toml(&content)?,
        };
        tracing::info!(
            "loaded topology from '{}': {} cluster(s)",
            path.display(),
            config.clusters.len(),
        );
        Ok(config)
    }

    /// Parses a topology from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, TopologyError> {
        toml::from_str(toml_str).map_err(|e| TopologyError::TomlError(format!("parse: {e}")))
    }

    /// Parses a topology from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, TopologyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialises the topology to TOML.
    pub fn to_toml(&self) -> Result<String, TopologyError> {
        toml::to_string_pretty(self).map_err(|e| TopologyError::TomlError(format!("serialise: {e}")))
    }

    /// Validates the configuration and builds the clusters.
    pub fn build(&self) -> Result<Vec<Cluster>, TopologyError> {
        if self.clusters.is_empty() {
            return Err(TopologyError::NoClusters);
        }
        self.clusters
            .iter()
            .enumerate()
            .map(|(id, cc)| cc.build(id))
            .collect()
    }
}

impl Default for FabricConfig {
    /// The documented default topology (see the module docs).
    fn default() -> Self {
        let last = DEFAULT_ROWS * DEFAULT_COLS - 1;
        let corners = [0, DEFAULT_COLS - 1, last + 1 - DEFAULT_COLS, last];
        Self {
            clusters: vec![ClusterConfig {
                arch_id: 0,
                num_rows: DEFAULT_ROWS,
                num_cols: DEFAULT_COLS,
                read_cluster_bw: DEFAULT_LINK_BW,
                write_cluster_bw: DEFAULT_LINK_BW,
                defaults: TileConfig::default(),
                tiles: corners
                    .iter()
                    .map(|&id| TileOverride {
                        id,
                        memory_size: Some(DEFAULT_BANK.to_string()),
                        ..Default::default()
                    })
                    .collect(),
            }],
        }
    }
}
