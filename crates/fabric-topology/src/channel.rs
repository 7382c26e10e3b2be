// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Capacity/available bandwidth pairs.
//!
//! Every bandwidth budget in the fabric (memory read/write ports, the five
//! router ports of a tile, the cluster host links) is a [`Channel`]. The
//! invariant `available <= capacity` is checked, never enforced by clamping:
//! a release that pushes `available` past `capacity` is reported as
//! [`BandwidthError::WrongBandwidthSetting`] and the value is left as is.

use crate::BandwidthError;

/// A static capacity and the part of it not yet reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Channel {
    capacity: u64,
    available: u64,
}

impl Channel {
    /// Creates a fully available channel.
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            available: capacity,
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn available(&self) -> u64 {
        self.available
    }

    /// Bandwidth currently reserved (0 if the channel is over capacity).
    pub fn reserved(&self) -> u64 {
        self.capacity.saturating_sub(self.available)
    }

    /// Takes `bw` out of the available budget. Fails without mutation when
    /// `bw > available`.
    pub fn reserve(&mut self, bw: u64) -> Result<(), BandwidthError> {
        if bw > self.available {
            return Err(BandwidthError::NotEnoughBandwidthAvailable {
                requested: bw,
                available: self.available,
            });
        }
        self.available -= bw;
        Ok(())
    }

    /// Returns `bw` to the available budget, then checks it against the
    /// capacity.
    pub fn release(&mut self, bw: u64) -> Result<(), BandwidthError> {
        self.available = self.available.saturating_add(bw);
        self.check()
    }

    /// Returns `true` if releasing `bw` would keep the channel within capacity.
    pub fn can_release(&self, bw: u64) -> bool {
        self.available
            .checked_add(bw)
            .is_some_and(|avail| avail <= self.capacity)
    }

    /// Zeroes the available bandwidth.
    pub fn close(&mut self) {
        self.available = 0;
    }

    /// Resets the available bandwidth to full capacity.
    pub fn restore(&mut self) {
        self.available = self.capacity;
    }

    /// Reports a channel whose available bandwidth exceeds its capacity.
    pub fn check(&self) -> Result<(), BandwidthError> {
        if self.available > self.capacity {
            return Err(BandwidthError::WrongBandwidthSetting {
                available: self.available,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}
