// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tile memory management.

/// Errors that can occur while allocating from or releasing to a tile's
/// memory bank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// No free slot is large enough for the request.
    #[error("not enough memory: requested {requested} bytes, largest free slot is {largest} bytes")]
    NotEnoughMemory { requested: u64, largest: u64 },

    /// The address does not name a free slot, or the released range is not
    /// a valid allocated range of this bank.
    #[error("memory lookup failed for range at {start_address:#x} ({size} bytes)")]
    FindMemoryError { start_address: u64, size: u64 },

    /// A size string could not be parsed.
    #[error("invalid size: {0}")]
    InvalidSize(String),

    /// An internal free-list inconsistency was detected.
    #[error("free list integrity error: {0}")]
    Corrupted(String),
}
