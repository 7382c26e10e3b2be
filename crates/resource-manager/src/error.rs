// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for resource management operations.

use fabric_topology::{BandwidthError, ClusterId, TileId};
use std::fmt;
use tile_memory::MemoryError;

/// Errors returned by [`ResourceManager`](crate::ResourceManager) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    /// The cluster id is out of range.
    #[error("cluster {cluster} not found")]
    ClusterNotFound { cluster: ClusterId },

    /// The tile id is out of range for its cluster.
    #[error("tile {tile} not found in cluster {cluster}")]
    TileNotFound { cluster: ClusterId, tile: TileId },

    /// The tile has no memory bank attached.
    #[error("tile {tile} in cluster {cluster} has no memory attached")]
    MemoryNotPresent { cluster: ClusterId, tile: TileId },

    /// A free-list operation on a tile's bank failed.
    #[error("memory error on tile {tile} in cluster {cluster}: {source}")]
    Memory {
        cluster: ClusterId,
        tile: TileId,
        #[source]
        source: MemoryError,
    },

    /// A bandwidth reservation or release failed.
    #[error("bandwidth error: {0}")]
    Bandwidth(#[from] BandwidthError),

    /// Not enough free tiles of the requested types could be found.
    #[error("partition not found: matched {matched} of {requested} requested tiles")]
    PartitionNotFound { requested: usize, matched: usize },

    /// A tile of a tile set is already part of another reservation.
    #[error("tile {tile} in cluster {cluster} is already assigned")]
    TileAssigned { cluster: ClusterId, tile: TileId },

    /// Source and destination lie in different clusters.
    #[error("path from cluster {src} to cluster {dst} crosses clusters, which is unsupported")]
    ClusterCrossingUnsupported { src: ClusterId, dst: ClusterId },
}

/// Status code of a failed call. Every [`ResourceError`] maps onto exactly
/// one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    ClusterNotFound,
    TileNotFound,
    MemoryNotPresent,
    NotEnoughMemory,
    FindMemoryError,
    NotEnoughBandwidthAvailable,
    WrongBandwidthSetting,
    PartitionNotFound,
    ClusterCrossingUnsupported,
}

impl ResourceError {
    /// The status code reported for this error.
    pub fn status(&self) -> Status {
        match self {
            Self::ClusterNotFound { .. } => Status::ClusterNotFound,
            Self::TileNotFound { .. } => Status::TileNotFound,
            Self::MemoryNotPresent { .. } => Status::MemoryNotPresent,
            Self::Memory { source, .. } => match source {
                MemoryError::NotEnoughMemory { .. } => Status::NotEnoughMemory,
                _ => Status::FindMemoryError,
            },
            Self::Bandwidth(BandwidthError::NotEnoughBandwidthAvailable { .. }) => {
                Status::NotEnoughBandwidthAvailable
            }
            Self::Bandwidth(BandwidthError::WrongBandwidthSetting { .. }) => {
                Status::WrongBandwidthSetting
            }
            Self::PartitionNotFound { .. } | Self::TileAssigned { .. } => Status::PartitionNotFound,
            Self::ClusterCrossingUnsupported { .. } => Status::ClusterCrossingUnsupported,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ClusterNotFound => "CLUSTER_NOT_FOUND",
            Self::TileNotFound => "TILE_NOT_FOUND",
            Self::MemoryNotPresent => "MEMORY_NOT_PRESENT",
            Self::NotEnoughMemory => "NOT_ENOUGH_MEMORY",
            Self::FindMemoryError => "FIND_MEMORY_ERROR",
            Self::NotEnoughBandwidthAvailable => "NOT_ENOUGH_BANDWIDTH_AVAILABLE",
            Self::WrongBandwidthSetting => "WRONG_BANDWIDTH_SETTING",
            Self::PartitionNotFound => "PARTITION_NOT_FOUND",
            Self::ClusterCrossingUnsupported => "CLUSTER_CROSSING_UNSUPPORTED",
        };
        f.write_str(s)
    }
}
