// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Address-ordered free list for one tile's memory bank.
//!
//! The [`FreeList`] tracks the unallocated ranges of a bank whose address
//! space starts at 0. It:
//!
//! 1. Answers first-fit queries in ascending address order.
//! 2. Allocates from the front of an exactly-addressed slot.
//! 3. Coalesces released ranges with their neighbours so that no two free
//!    slots are ever address-adjacent.
//!
//! # Storage
//! Slots live in an index arena (`Vec<Node>`) linked through `next` indices.
//! Unlinked nodes are pushed onto a vacancy stack and reused by the next
//! insertion, so merge and split never leak a node or free one twice.
//!
//! ```text
//! head ─► [0x0000..0x3fff] ─► [0x8000..0xffff] ─► None
//! ```

use crate::{AllocationStats, MemoryError};

/// One free range of a memory bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MemorySlot {
    /// First free address.
    pub start_address: u64,
    /// Last free address (inclusive).
    pub end_address: u64,
    /// Number of free bytes, `end_address - start_address + 1`.
    pub size: u64,
}

impl MemorySlot {
    /// Creates a slot covering `[start_address, start_address + size)`.
    ///
    /// `size` must be non-zero.
    pub fn new(start_address: u64, size: u64) -> Self {
        Self {
            start_address,
            end_address: start_address + size - 1,
            size,
        }
    }

    /// One past the last free address.
    pub fn end_exclusive(&self) -> u64 {
        self.end_address + 1
    }
}

#[derive(Debug, Clone)]
struct Node {
    slot: MemorySlot,
    next: Option<usize>,
}

/// The free list of a single memory bank.
///
/// # Example
/// ```
/// use tile_memory::FreeList;
///
/// let mut bank = FreeList::new(1024);
/// let addr = bank.first_fit(256).unwrap();
/// bank.allocate(addr, 256).unwrap();
/// assert_eq!(bank.free_bytes(), 768);
///
/// bank.release(addr, 256).unwrap();
/// assert_eq!(bank.num_slots(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct FreeList {
    capacity: u64,
    free_bytes: u64,
    nodes: Vec<Node>,
    vacant: Vec<usize>,
    head: Option<usize>,
    stats: AllocationStats,
}

impl FreeList {
    /// Creates a bank of `capacity` bytes with a single free slot `[0, capacity)`.
    pub fn new(capacity: u64) -> Self {
        let mut list = Self {
            capacity,
            free_bytes: capacity,
            nodes: Vec::new(),
            vacant: Vec::new(),
            head: None,
            stats: AllocationStats::default(),
        };
        if capacity > 0 {
            let idx = list.new_node(MemorySlot::new(0, capacity), None);
            list.head = Some(idx);
        }
        list
    }

    /// Total size of the bank in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Bytes currently free.
    pub fn free_bytes(&self) -> u64 {
        self.free_bytes
    }

    /// Bytes currently allocated.
    pub fn used_bytes(&self) -> u64 {
        self.capacity - self.free_bytes
    }

    /// Number of slots in the free list.
    pub fn num_slots(&self) -> usize {
        self.slots().count()
    }

    /// Size of the largest free slot, 0 if the bank is full.
    pub fn largest_free_slot(&self) -> u64 {
        self.slots().map(|s| s.size).max().unwrap_or(0)
    }

    /// Cumulative allocation statistics.
    pub fn stats(&self) -> &AllocationStats {
        &self.stats
    }

    /// Iterates the free slots in ascending address order.
    pub fn slots(&self) -> Slots<'_> {
        Slots {
            list: self,
            cursor: self.head,
        }
    }

    /// First-fit lookup: the start address of the first slot (in address
    /// order) holding at least `size` bytes. Does not modify the list.
    pub fn first_fit(&self, size: u64) -> Result<u64, MemoryError> {
        self.slots()
            .find(|slot| slot.size >= size)
            .map(|slot| slot.start_address)
            .ok_or_else(|| MemoryError::NotEnoughMemory {
                requested: size,
                largest: self.largest_free_slot(),
            })
    }

    /// Allocates `size` bytes from the front of the slot starting exactly at
    /// `start_address`.
    ///
    /// A fully consumed slot is unlinked; otherwise it shrinks from the front.
    pub fn allocate(&mut self, start_address: u64, size: u64) -> Result<(), MemoryError> {
        let mut prev: Option<usize> = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let slot = self.nodes[idx].slot;
            if slot.start_address == start_address {
                break;
            }
            if slot.start_address > start_address {
                cursor = None;
                break;
            }
            prev = Some(idx);
            cursor = self.nodes[idx].next;
        }

        let Some(idx) = cursor else {
            self.stats.record_failure();
            return Err(MemoryError::FindMemoryError {
                start_address,
                size,
            });
        };

        let slot = self.nodes[idx].slot;
        if slot.size < size {
            self.stats.record_failure();
            return Err(MemoryError::NotEnoughMemory {
                requested: size,
                largest: slot.size,
            });
        }
        if size == 0 {
            return Ok(());
        }

        if slot.size == size {
            let next = self.nodes[idx].next;
            self.link(prev, next);
            self.vacant.push(idx);
        } else {
            self.nodes[idx].slot = MemorySlot::new(slot.start_address + size, slot.size - size);
        }

        self.free_bytes -= size;
        self.stats.record_allocation(size, self.used_bytes());
        Ok(())
    }

    /// Returns `[start_address, start_address + size)` to the free list,
    /// merging it with an adjacent slot on either side.
    ///
    /// The range must lie inside the bank and must not overlap a free slot;
    /// otherwise the list is left untouched and `FindMemoryError` is returned.
    pub fn release(&mut self, start_address: u64, size: u64) -> Result<(), MemoryError> {
        if size == 0 {
            return Ok(());
        }
        let invalid = MemoryError::FindMemoryError {
            start_address,
            size,
        };
        let end = match start_address.checked_add(size) {
            Some(end) if end <= self.capacity => end,
            _ => return Err(invalid),
        };

        // prev: last slot starting below the range; next: the slot after it.
        let mut prev: Option<usize> = None;
        let mut next = self.head;
        while let Some(idx) = next {
            if self.nodes[idx].slot.start_address >= start_address {
                break;
            }
            prev = Some(idx);
            next = self.nodes[idx].next;
        }

        let prev_slot = prev.map(|i| self.nodes[i].slot);
        let next_slot = next.map(|i| self.nodes[i].slot);

        if prev_slot.is_some_and(|p| p.end_address >= start_address)
            || next_slot.is_some_and(|n| n.start_address < end)
        {
            return Err(invalid);
        }

        let joins_prev = prev_slot.is_some_and(|p| p.end_exclusive() == start_address);
        let joins_next = next_slot.is_some_and(|n| n.start_address == end);

        match (prev, next) {
            (Some(p), Some(n)) if joins_prev && joins_next => {
                let merged = MemorySlot::new(
                    self.nodes[p].slot.start_address,
                    self.nodes[p].slot.size + size + self.nodes[n].slot.size,
                );
                self.nodes[p].slot = merged;
                self.nodes[p].next = self.nodes[n].next;
                self.vacant.push(n);
            }
            (Some(p), _) if joins_prev => {
                let grown = MemorySlot::new(
                    self.nodes[p].slot.start_address,
                    self.nodes[p].slot.size + size,
                );
                self.nodes[p].slot = grown;
            }
            (_, Some(n)) if joins_next => {
                let grown = MemorySlot::new(start_address, self.nodes[n].slot.size + size);
                self.nodes[n].slot = grown;
            }
            _ => {
                let idx = self.new_node(MemorySlot::new(start_address, size), next);
                self.link(prev, Some(idx));
            }
        }

        self.free_bytes += size;
        self.stats.record_release(joins_prev || joins_next);
        Ok(())
    }

    /// Checks the structural invariants: ascending, non-overlapping,
    /// non-adjacent slots whose sizes add up to the free byte count.
    pub fn validate(&self) -> Result<(), MemoryError> {
        let mut total = 0u64;
        let mut last_end: Option<u64> = None;
        for slot in self.slots() {
            if slot.size == 0 || slot.end_address != slot.start_address + slot.size - 1 {
                return Err(MemoryError::Corrupted(format!(
                    "malformed slot {:#x}..={:#x} ({} bytes)",
                    slot.start_address, slot.end_address, slot.size
                )));
            }
            if let Some(end) = last_end {
                if slot.start_address <= end {
                    return Err(MemoryError::Corrupted(format!(
                        "slot at {:#x} overlaps or precedes previous slot",
                        slot.start_address
                    )));
                }
                if slot.start_address == end + 1 {
                    return Err(MemoryError::Corrupted(format!(
                        "slot at {:#x} is adjacent to previous slot",
                        slot.start_address
                    )));
                }
            }
            if slot.end_exclusive() > self.capacity {
                return Err(MemoryError::Corrupted(format!(
                    "slot at {:#x} extends past capacity {}",
                    slot.start_address, self.capacity
                )));
            }
            total += slot.size;
            last_end = Some(slot.end_address);
        }
        if total != self.free_bytes {
            return Err(MemoryError::Corrupted(format!(
                "free bytes {} but slots sum to {total}",
                self.free_bytes
            )));
        }
        Ok(())
    }

    fn new_node(&mut self, slot: MemorySlot, next: Option<usize>) -> usize {
        let node = Node { slot, next };
        match self.vacant.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Points `prev` (or the head, if `prev` is `None`) at `next`.
    fn link(&mut self, prev: Option<usize>, next: Option<usize>) {
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
    }
}

/// Iterator over the slots of a [`FreeList`], in address order.
pub struct Slots<'a> {
    list: &'a FreeList,
    cursor: Option<usize>,
}

impl<'a> Iterator for Slots<'a> {
    type Item = &'a MemorySlot;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let list: &'a FreeList = self.list;
        let node = &list.nodes[idx];
        self.cursor = node.next;
        Some(&node.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KB: u64 = 1024;

    fn ranges(list: &FreeList) -> Vec<(u64, u64)> {
        list.slots().map(|s| (s.start_address, s.size)).collect()
    }

    #[test]
    fn test_new_bank_single_slot() {
        let list = FreeList::new(64 * KB);
        assert_eq!(ranges(&list), vec![(0, 64 * KB)]);
        assert_eq!(list.free_bytes(), 64 * KB);
        list.validate().unwrap();
    }

    #[test]
    fn test_zero_capacity_is_empty() {
        let list = FreeList::new(0);
        assert_eq!(list.num_slots(), 0);
        assert!(matches!(
            list.first_fit(1),
            Err(MemoryError::NotEnoughMemory { largest: 0, .. })
        ));
    }

    #[test]
    fn test_first_fit_skips_small_slots() {
        let mut list = FreeList::new(100);
        list.allocate(0, 100).unwrap();
        list.release(10, 5).unwrap();
        list.release(50, 20).unwrap();
        assert_eq!(list.first_fit(4).unwrap(), 10);
        assert_eq!(list.first_fit(6).unwrap(), 50);
        assert!(matches!(
            list.first_fit(21),
            Err(MemoryError::NotEnoughMemory {
                requested: 21,
                largest: 20
            })
        ));
    }

    #[test]
    fn test_allocate_shrinks_from_front() {
        let mut list = FreeList::new(KB);
        list.allocate(0, 256).unwrap();
        assert_eq!(ranges(&list), vec![(256, 768)]);
        assert_eq!(list.free_bytes(), 768);
        assert_eq!(list.used_bytes(), 256);
    }

    #[test]
    fn test_allocate_whole_slot_unlinks() {
        let mut list = FreeList::new(KB);
        list.allocate(0, KB).unwrap();
        assert_eq!(list.num_slots(), 0);
        assert_eq!(list.free_bytes(), 0);
        list.validate().unwrap();
    }

    #[test]
    fn test_allocate_requires_exact_address() {
        let mut list = FreeList::new(KB);
        let err = list.allocate(8, 16).unwrap_err();
        assert!(matches!(err, MemoryError::FindMemoryError { start_address: 8, .. }));
        assert_eq!(list.free_bytes(), KB);
        assert_eq!(list.stats().failed_allocations, 1);
    }

    #[test]
    fn test_allocate_too_large() {
        let mut list = FreeList::new(KB);
        let err = list.allocate(0, KB + 1).unwrap_err();
        assert!(matches!(err, MemoryError::NotEnoughMemory { .. }));
        assert_eq!(ranges(&list), vec![(0, KB)]);
    }

    #[test]
    fn test_allocate_zero_is_noop() {
        let mut list = FreeList::new(KB);
        list.allocate(0, 0).unwrap();
        assert_eq!(ranges(&list), vec![(0, KB)]);
        assert_eq!(list.stats().total_allocations, 0);
    }

    #[test]
    fn test_release_extends_previous() {
        let mut list = FreeList::new(100);
        list.allocate(0, 100).unwrap();
        list.release(0, 10).unwrap();
        list.release(10, 10).unwrap();
        assert_eq!(ranges(&list), vec![(0, 20)]);
        list.validate().unwrap();
    }

    #[test]
    fn test_release_extends_next() {
        let mut list = FreeList::new(100);
        list.allocate(0, 100).unwrap();
        list.release(50, 10).unwrap();
        list.release(40, 10).unwrap();
        assert_eq!(ranges(&list), vec![(40, 20)]);
        list.validate().unwrap();
    }

    #[test]
    fn test_release_bridges_both_neighbours() {
        let mut list = FreeList::new(100);
        list.allocate(0, 100).unwrap();
        list.release(0, 10).unwrap();
        list.release(20, 10).unwrap();
        assert_eq!(list.num_slots(), 2);
        list.release(10, 10).unwrap();
        assert_eq!(ranges(&list), vec![(0, 30)]);
        list.validate().unwrap();
    }

    #[test]
    fn test_release_inserts_head_middle_tail() {
        let mut list = FreeList::new(100);
        list.allocate(0, 100).unwrap();
        list.release(40, 10).unwrap();
        list.release(0, 10).unwrap(); // new head
        list.release(80, 10).unwrap(); // new tail
        list.release(60, 5).unwrap(); // middle
        assert_eq!(ranges(&list), vec![(0, 10), (40, 10), (60, 5), (80, 10)]);
        assert_eq!(list.free_bytes(), 35);
        list.validate().unwrap();
    }

    #[test]
    fn test_release_rejects_double_free() {
        let mut list = FreeList::new(100);
        list.allocate(0, 50).unwrap();
        list.release(0, 50).unwrap();
        let err = list.release(10, 10).unwrap_err();
        assert!(matches!(err, MemoryError::FindMemoryError { .. }));
        assert_eq!(ranges(&list), vec![(0, 100)]);
    }

    #[test]
    fn test_release_rejects_out_of_bank() {
        let mut list = FreeList::new(100);
        list.allocate(0, 100).unwrap();
        assert!(list.release(90, 20).is_err());
        assert!(list.release(u64::MAX, 2).is_err());
        assert_eq!(list.free_bytes(), 0);
    }

    #[test]
    fn test_round_trip_restores_single_slot() {
        let mut list = FreeList::new(64 * KB);
        let mut live = Vec::new();
        for size in [4 * KB, 8 * KB, KB, 16 * KB, 2 * KB] {
            let addr = list.first_fit(size).unwrap();
            list.allocate(addr, size).unwrap();
            live.push((addr, size));
        }
        // Release out of order to exercise every merge case.
        for &i in &[1, 3, 0, 4, 2] {
            let (addr, size) = live[i];
            list.release(addr, size).unwrap();
            list.validate().unwrap();
        }
        assert_eq!(ranges(&list), vec![(0, 64 * KB)]);
        assert_eq!(list.free_bytes(), 64 * KB);
    }

    #[test]
    fn test_node_reuse_after_merge() {
        let mut list = FreeList::new(100);
        for _ in 0..10 {
            list.allocate(0, 100).unwrap();
            list.release(0, 30).unwrap();
            list.release(60, 40).unwrap();
            list.release(30, 30).unwrap();
        }
        assert_eq!(ranges(&list), vec![(0, 100)]);
        assert!(list.nodes.len() <= 3);
    }

    #[test]
    fn test_stats_record_coalesces() {
        let mut list = FreeList::new(100);
        list.allocate(0, 40).unwrap();
        list.allocate(40, 40).unwrap();
        list.release(0, 40).unwrap(); // new node, no merge with [80,100)
        list.release(40, 40).unwrap(); // bridges both sides
        let stats = list.stats();
        assert_eq!(stats.total_allocations, 2);
        assert_eq!(stats.total_releases, 2);
        assert_eq!(stats.coalesced_releases, 1);
        assert_eq!(stats.peak_used_bytes, 80);
    }
}
