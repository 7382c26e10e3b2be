// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Grid coordinates, router ports and access directions.
//!
//! Tiles are numbered row-major: `id = y * num_cols + x`, with `y = 0` the
//! northmost row and `x = 0` the westmost column.

use std::fmt;

/// Index of a cluster in the fabric.
pub type ClusterId = usize;

/// Row-major index of a tile within its cluster.
pub type TileId = usize;

/// Column/row position of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`.
    pub fn manhattan(&self, other: Coord) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of a tile's router links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Port {
    North,
    East,
    West,
    South,
    /// The tile-internal link into the local unit or memory.
    Local,
}

impl Port {
    /// All ports, in storage order.
    pub const ALL: [Port; 5] = [Port::North, Port::East, Port::West, Port::South, Port::Local];

    /// Storage index of this port.
    pub fn index(&self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::West => 2,
            Self::South => 3,
            Self::Local => 4,
        }
    }

    /// The port on the neighbouring tile that faces this one.
    pub fn opposite(&self) -> Port {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
            Self::Local => Self::Local,
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "n" | "north" => Some(Self::North),
            "e" | "east" => Some(Self::East),
            "w" | "west" => Some(Self::West),
            "s" | "south" => Some(Self::South),
            "l" | "local" => Some(Self::Local),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::North => "north",
            Self::East => "east",
            Self::West => "west",
            Self::South => "south",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a memory or host-link transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}
