// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for topology construction and bandwidth accounting.

/// Errors that can occur while loading or building a fabric topology.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    /// The topology file could not be read.
    #[error("failed to read topology: {0}")]
    ReadError(#[from] std::io::Error),

    /// The topology JSON is malformed.
    #[error("failed to parse topology JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The topology TOML is malformed or could not be written.
    #[error("topology TOML error: {0}")]
    TomlError(String),

    /// The configuration does not describe any cluster.
    #[error("topology defines no clusters")]
    NoClusters,

    /// A cluster definition is invalid.
    #[error("invalid cluster {cluster}: {detail}")]
    InvalidCluster { cluster: usize, detail: String },

    /// A tile definition is invalid.
    #[error("invalid tile {tile} in cluster {cluster}: {detail}")]
    InvalidTile {
        cluster: usize,
        tile: usize,
        detail: String,
    },
}

/// Errors raised by a capacity/available bandwidth pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BandwidthError {
    /// The request exceeds the bandwidth still available.
    #[error("not enough bandwidth available: requested {requested}, available {available}")]
    NotEnoughBandwidthAvailable { requested: u64, available: u64 },

    /// Available bandwidth exceeds the static capacity, which means more was
    /// released than was ever reserved.
    #[error("wrong bandwidth setting: available {available} exceeds capacity {capacity}")]
    WrongBandwidthSetting { available: u64, capacity: u64 },
}
