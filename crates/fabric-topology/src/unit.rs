// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compute unit families hosted by tiles.

use std::fmt;

/// The architecture family of the compute unit placed on a tile.
///
/// Serialized in upper case (`"GN"`, `"CPU"`, ...), which is how topology
/// files and tile-set requests name them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitType {
    /// The tile hosts no compute unit (memory or routing only).
    #[default]
    None,
    /// Generic neural unit.
    Gn,
    /// General-purpose core.
    Cpu,
    /// Graphics/SIMT unit.
    Gpu,
    /// Reconfigurable fabric.
    Fpga,
}

impl UnitType {
    /// Parses a unit family name, case-insensitively.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "-" => Some(Self::None),
            "gn" => Some(Self::Gn),
            "cpu" => Some(Self::Cpu),
            "gpu" => Some(Self::Gpu),
            "fpga" => Some(Self::Fpga),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Gn => "GN",
            Self::Cpu => "CPU",
            Self::Gpu => "GPU",
            Self::Fpga => "FPGA",
        }
    }

    /// Returns `true` if the tile hosts a compute unit.
    pub fn is_compute(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
