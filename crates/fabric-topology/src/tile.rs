// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A single grid cell of the fabric.

use crate::{Access, Channel, Port, UnitType};
use tile_memory::FreeList;

/// Static bandwidth capacities of a tile, as supplied by the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileBandwidth {
    pub read_memory_bw: u64,
    pub write_memory_bw: u64,
    pub north_port_bw: u64,
    pub east_port_bw: u64,
    pub west_port_bw: u64,
    pub south_port_bw: u64,
    pub local_port_bw: u64,
}

impl TileBandwidth {
    /// The same capacity on every port, memory direction included.
    pub fn uniform(bw: u64) -> Self {
        Self {
            read_memory_bw: bw,
            write_memory_bw: bw,
            north_port_bw: bw,
            east_port_bw: bw,
            west_port_bw: bw,
            south_port_bw: bw,
            local_port_bw: bw,
        }
    }
}

/// One tile: an optional compute unit, an optional memory bank and a mesh
/// router with five ports.
///
/// The `assigned` flag records that the tile belongs to a reserved tile
/// set. It does not say what is assigned; callers keep that mapping.
#[derive(Debug, Clone)]
pub struct Tile {
    unit_type: UnitType,
    subtype: u32,
    assigned: bool,
    memory: Option<FreeList>,
    read_memory: Channel,
    write_memory: Channel,
    ports: [Channel; 5],
}

impl Tile {
    /// Creates an unassigned tile. A `memory_size` of 0 means no bank.
    pub fn new(unit_type: UnitType, subtype: u32, memory_size: u64, bw: TileBandwidth) -> Self {
        let mut ports = [Channel::new(0); 5];
        ports[Port::North.index()] = Channel::new(bw.north_port_bw);
        ports[Port::East.index()] = Channel::new(bw.east_port_bw);
        ports[Port::West.index()] = Channel::new(bw.west_port_bw);
        ports[Port::South.index()] = Channel::new(bw.south_port_bw);
        ports[Port::Local.index()] = Channel::new(bw.local_port_bw);

        Self {
            unit_type,
            subtype,
            assigned: false,
            memory: (memory_size > 0).then(|| FreeList::new(memory_size)),
            read_memory: Channel::new(bw.read_memory_bw),
            write_memory: Channel::new(bw.write_memory_bw),
            ports,
        }
    }

    pub fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    pub fn subtype(&self) -> u32 {
        self.subtype
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned
    }

    pub fn set_assigned(&mut self, assigned: bool) {
        self.assigned = assigned;
    }

    pub fn has_memory(&self) -> bool {
        self.memory.is_some()
    }

    /// The memory bank's free list, if a bank is attached.
    pub fn memory(&self) -> Option<&FreeList> {
        self.memory.as_ref()
    }

    pub fn memory_mut(&mut self) -> Option<&mut FreeList> {
        self.memory.as_mut()
    }

    /// Bank size in bytes, 0 without a bank.
    pub fn memory_size(&self) -> u64 {
        self.memory.as_ref().map_or(0, FreeList::capacity)
    }

    /// Free bytes in the bank, 0 without a bank.
    pub fn free_memory(&self) -> u64 {
        self.memory.as_ref().map_or(0, FreeList::free_bytes)
    }

    pub fn memory_channel(&self, access: Access) -> &Channel {
        match access {
            Access::Read => &self.read_memory,
            Access::Write => &self.write_memory,
        }
    }

    pub fn memory_channel_mut(&mut self, access: Access) -> &mut Channel {
        match access {
            Access::Read => &mut self.read_memory,
            Access::Write => &mut self.write_memory,
        }
    }

    pub fn port(&self, port: Port) -> &Channel {
        &self.ports[port.index()]
    }

    pub fn port_mut(&mut self, port: Port) -> &mut Channel {
        &mut self.ports[port.index()]
    }
}
