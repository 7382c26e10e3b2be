// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tile-memory
//!
//! Free-list bookkeeping for the memory bank attached to a fabric tile.
//!
//! # Key Components
//!
//! - [`FreeList`]: address-ordered list of free [`MemorySlot`]s with
//!   first-fit lookup, front-of-slot allocation and eager coalescing.
//! - [`ByteSize`]: human-readable sizes (`"512K"`, `"1M"`) for topology files.
//! - [`AllocationStats`]: cumulative per-bank counters.
//!
//! Addresses are tile-local and start at 0. The list never holds memory
//! itself; it only records which ranges of the bank are free.
//!
//! # Example
//! ```
//! use tile_memory::FreeList;
//!
//! let mut bank = FreeList::new(1024 * 1024);
//!
//! let a = bank.first_fit(512 * 1024).unwrap();
//! bank.allocate(a, 512 * 1024).unwrap();
//! let b = bank.first_fit(512 * 1024).unwrap();
//! assert_eq!(b, 524288);
//!
//! bank.release(a, 512 * 1024).unwrap();
//! assert_eq!(bank.free_bytes(), 512 * 1024);
//! ```

mod error;
pub mod free_list;
mod size;
mod stats;

pub use error::MemoryError;
pub use free_list::{FreeList, MemorySlot};
pub use size::ByteSize;
pub use stats::AllocationStats;
