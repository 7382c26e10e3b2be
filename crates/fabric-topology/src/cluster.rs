// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A cluster: one independent grid of tiles.
//!
//! ```text
//!          x=0   x=1   x=2   x=3   x=4
//!   y=0  [  0 ][  1 ][  2 ][  3 ][  4 ]
//!   y=1  [  5 ][  6 ][  7 ][  8 ][  9 ]      North ▲
//!   y=2  [ 10 ][ 11 ][ 12 ][ 13 ][ 14 ]  West ◄ ─ ┼ ─ ► East
//!   y=3  [ 15 ][ 16 ][ 17 ][ 18 ][ 19 ]      South ▼
//! ```
//!
//! Clusters share neither bandwidth nor address space. The tile vector is
//! sized once at construction and never resized.

use crate::{Access, Channel, ClusterId, Coord, Port, Tile, TileId, TopologyError};
use std::fmt;

/// One tile grid with its host-link bandwidth budgets.
#[derive(Debug, Clone)]
pub struct Cluster {
    id: ClusterId,
    arch_id: u32,
    num_rows: usize,
    num_cols: usize,
    read_link: Channel,
    write_link: Channel,
    tiles: Vec<Tile>,
}

/// Largest grid a single cluster may hold.
pub const MAX_TILES: usize = 1 << 16;

/// Tile count of a `num_rows` x `num_cols` grid.
///
/// Fails if the grid is empty, the product overflows or it exceeds
/// [`MAX_TILES`].
pub(crate) fn grid_size(
    cluster: ClusterId,
    num_rows: usize,
    num_cols: usize,
) -> Result<usize, TopologyError> {
    let invalid = |detail: String| TopologyError::InvalidCluster { cluster, detail };
    if num_rows == 0 || num_cols == 0 {
        return Err(invalid(format!(
            "grid must be non-empty, got {num_rows}x{num_cols}"
        )));
    }
    match num_rows.checked_mul(num_cols) {
        Some(n) if n <= MAX_TILES => Ok(n),
        _ => Err(invalid(format!(
            "{num_rows}x{num_cols} grid exceeds the {MAX_TILES}-tile limit"
        ))),
    }
}

impl Cluster {
    /// Creates a cluster from row-major tiles.
    ///
    /// Fails if the grid is empty, larger than [`MAX_TILES`], or
    /// `tiles.len() != num_rows * num_cols`.
    pub fn new(
        id: ClusterId,
        arch_id: u32,
        num_rows: usize,
        num_cols: usize,
        read_cluster_bw: u64,
        write_cluster_bw: u64,
        tiles: Vec<Tile>,
    ) -> Result<Self, TopologyError> {
        let num_tiles = grid_size(id, num_rows, num_cols)?;
        if tiles.len() != num_tiles {
            return Err(TopologyError::InvalidCluster {
                cluster: id,
                detail: format!(
                    "expected {num_tiles} tiles for a {num_rows}x{num_cols} grid, got {}",
                    tiles.len(),
                ),
            });
        }
        Ok(Self {
            id,
            arch_id,
            num_rows,
            num_cols,
            read_link: Channel::new(read_cluster_bw),
            write_link: Channel::new(write_cluster_bw),
            tiles,
        })
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn arch_id(&self) -> u32 {
        self.arch_id
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn num_tiles(&self) -> usize {
        self.tiles.len()
    }

    /// Largest Manhattan distance between two tiles of this grid.
    pub fn diameter(&self) -> usize {
        self.num_rows + self.num_cols - 2
    }

    pub fn contains(&self, tile: TileId) -> bool {
        tile < self.tiles.len()
    }

    pub fn tile(&self, tile: TileId) -> Option<&Tile> {
        self.tiles.get(tile)
    }

    pub fn tile_mut(&mut self, tile: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(tile)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Grid position of a tile id. Does not check that the id is in range.
    pub fn coord_of(&self, tile: TileId) -> Coord {
        Coord::new(tile % self.num_cols, tile / self.num_cols)
    }

    /// Tile id at a grid position, `None` outside the grid.
    pub fn tile_at(&self, coord: Coord) -> Option<TileId> {
        (coord.x < self.num_cols && coord.y < self.num_rows).then(|| coord.y * self.num_cols + coord.x)
    }

    /// The tile reached by leaving `tile` through `port`. `None` at the grid
    /// edge and for the local port.
    pub fn neighbor(&self, tile: TileId, port: Port) -> Option<TileId> {
        let Coord { x, y } = self.coord_of(tile);
        let next = match port {
            Port::North => Coord::new(x, y.checked_sub(1)?),
            Port::South => Coord::new(x, y + 1),
            Port::West => Coord::new(x.checked_sub(1)?, y),
            Port::East => Coord::new(x + 1, y),
            Port::Local => return None,
        };
        self.tile_at(next)
    }

    /// Manhattan distance between two tiles of this cluster.
    pub fn distance(&self, a: TileId, b: TileId) -> usize {
        self.coord_of(a).manhattan(self.coord_of(b))
    }

    pub fn link(&self, access: Access) -> &Channel {
        match access {
            Access::Read => &self.read_link,
            Access::Write => &self.write_link,
        }
    }

    pub fn link_mut(&mut self, access: Access) -> &mut Channel {
        match access {
            Access::Read => &mut self.read_link,
            Access::Write => &mut self.write_link,
        }
    }

    /// Ids of tiles that carry a memory bank, ascending.
    pub fn memory_tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.has_memory())
            .map(|(id, _)| id)
    }

    /// Returns a summary string describing the cluster.
    pub fn summary(&self) -> String {
        let banks = self.memory_tiles().count();
        let assigned = self.tiles.iter().filter(|t| t.is_assigned()).count();
        format!(
            "Cluster {} (arch {}): {}x{} tiles, {} memory banks, {} assigned",
            self.id, self.arch_id, self.num_rows, self.num_cols, banks, assigned,
        )
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for y in 0..self.num_rows {
            for x in 0..self.num_cols {
                let id = y * self.num_cols + x;
                let tile = &self.tiles[id];
                let mark = match (tile.is_assigned(), tile.has_memory()) {
                    (true, _) => '#',
                    (false, true) => 'M',
                    (false, false) => '.',
                };
                write!(f, " {:>4}{mark}", tile.unit_type())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
