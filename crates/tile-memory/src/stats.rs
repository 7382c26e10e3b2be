// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocation statistics for one memory bank.
//!
//! [`AllocationStats`] tracks cumulative counters for a tile's free list:
//! how often it was allocated from, how often releases merged with a
//! neighbouring slot, and the high-water mark of bytes in use.

/// Cumulative statistics about a free list.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AllocationStats {
    /// Successful allocations.
    pub total_allocations: u64,
    /// Allocations rejected for lack of space or a bad address.
    pub failed_allocations: u64,
    /// Successful releases.
    pub total_releases: u64,
    /// Releases that merged into at least one existing slot.
    pub coalesced_releases: u64,
    /// Peak bytes in use.
    pub peak_used_bytes: u64,
    /// Total bytes ever allocated.
    pub cumulative_allocated_bytes: u64,
}

impl AllocationStats {
    /// Fraction of releases that coalesced, in `[0.0, 1.0]`.
    pub fn coalesce_ratio(&self) -> f64 {
        if self.total_releases == 0 {
            return 0.0;
        }
        self.coalesced_releases as f64 / self.total_releases as f64
    }

    pub(crate) fn record_allocation(&mut self, size: u64, used_bytes: u64) {
        self.total_allocations += 1;
        self.cumulative_allocated_bytes += size;
        if used_bytes > self.peak_used_bytes {
            self.peak_used_bytes = used_bytes;
        }
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed_allocations += 1;
    }

    pub(crate) fn record_release(&mut self, coalesced: bool) {
        self.total_releases += 1;
        if coalesced {
            self.coalesced_releases += 1;
        }
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Allocations: {} ok, {} failed, {} releases ({:.0}% coalesced), peak {} bytes",
            self.total_allocations,
            self.failed_allocations,
            self.total_releases,
            self.coalesce_ratio() * 100.0,
            self.peak_used_bytes,
        )
    }
}
