// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Human-readable byte sizes.
//!
//! Topology files describe memory banks as `"1M"` or `"512K"` rather than raw
//! byte counts. [`ByteSize`] parses those strings.

use crate::MemoryError;
use std::fmt;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;
const TIB: u64 = 1024 * GIB;

/// Unit letters and their multipliers, largest first. The empty letter is
/// the plain byte count.
const UNITS: [(&str, u64); 5] = [("T", TIB), ("G", GIB), ("M", MIB), ("K", KIB), ("", 1)];

/// A byte count with human-readable parsing and display.
///
/// # Parsing
/// - `"512K"` or `"512KB"` → 512 × 1024 bytes
/// - `"1M"` or `"1MB"` → 1 × 1024² bytes
/// - `"2G"` or `"2GB"` → 2 × 1024³ bytes
/// - `"1T"` or `"1TB"` → 1 × 1024⁴ bytes
/// - `"4096"` → raw byte count
///
/// Zero is accepted: a zero-sized bank means "no memory attached".
///
/// # Examples
/// ```
/// use tile_memory::ByteSize;
///
/// let s = ByteSize::parse("1M").unwrap();
/// assert_eq!(s.as_bytes(), 1024 * 1024);
/// assert_eq!(s.to_string(), "1 MB");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize)]
pub struct ByteSize {
    bytes: u64,
}

impl ByteSize {
    /// Creates a size from a byte count.
    pub fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    /// Creates a size from kibibytes.
    pub fn from_kb(kb: u64) -> Self {
        Self { bytes: kb * KIB }
    }

    /// Creates a size from mebibytes.
    pub fn from_mb(mb: u64) -> Self {
        Self { bytes: mb * MIB }
    }

    /// Returns the size in bytes.
    pub fn as_bytes(&self) -> u64 {
        self.bytes
    }

    /// Returns `true` for a zero-byte size.
    pub fn is_zero(&self) -> bool {
        self.bytes == 0
    }

    /// Parses a human-readable size string. Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, MemoryError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MemoryError::InvalidSize("empty size string".into()));
        }

        let body = s.strip_suffix(|c: char| c.eq_ignore_ascii_case(&'b')).unwrap_or(s);
        let (digits, multiplier) = UNITS
            .iter()
            .find_map(|&(unit, mult)| {
                let rest = match unit.chars().next() {
                    Some(u) => body.strip_suffix(|c: char| c.eq_ignore_ascii_case(&u))?,
                    None => body,
                };
                Some((rest.trim(), mult))
            })
            .unwrap_or((body, 1));

        let value: u64 = digits.parse().map_err(|_| {
            MemoryError::InvalidSize(format!(
                "'{s}': expected a number followed by an optional suffix (K, M, G, T)"
            ))
        })?;
        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| MemoryError::InvalidSize(format!("'{s}' overflows 64 bits")))?;
        Ok(Self { bytes })
    }
}

impl fmt::Display for ByteSize {
    /// Uses the largest unit that divides the size exactly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (unit, mult) = UNITS
            .iter()
            .copied()
            .find(|&(_, mult)| self.bytes >= mult && self.bytes % mult == 0)
            .unwrap_or(("", 1));
        write!(f, "{} {unit}B", self.bytes / mult)
    }
}
