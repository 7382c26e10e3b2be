// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tile-set reservation.
//!
//! Reserving a tile set marks every tile of its bounding rectangle as
//! assigned, including tiles that were not named in the request, and closes
//! the router links that cross the rectangle's border so other traffic
//! cannot route through it. The returned [`Reservation`] lists the tiles
//! actually taken.

use crate::{ResourceError, ResourceManager};
use fabric_topology::{Cluster, ClusterId, Coord, Port, TileId};
use std::fmt;

/// Axis-aligned rectangle of tiles, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Rect {
    pub min: Coord,
    pub max: Coord,
}

impl Rect {
    /// The smallest rectangle holding every tile in `tiles`.
    fn enclosing(cluster: &Cluster, tiles: &[TileId]) -> Option<Self> {
        let mut coords = tiles.iter().map(|&t| cluster.coord_of(t));
        let first = coords.next()?;
        Some(coords.fold(Self { min: first, max: first }, |r, c| Self {
            min: Coord::new(r.min.x.min(c.x), r.min.y.min(c.y)),
            max: Coord::new(r.max.x.max(c.x), r.max.y.max(c.y)),
        }))
    }

    pub fn width(&self) -> usize {
        self.max.x - self.min.x + 1
    }

    pub fn height(&self) -> usize {
        self.max.y - self.min.y + 1
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Tile ids inside the rectangle, ascending.
    fn tiles(&self, cluster: &Cluster) -> Vec<TileId> {
        (self.min.y..=self.max.y)
            .flat_map(|y| (self.min.x..=self.max.x).map(move |x| Coord::new(x, y)))
            .filter_map(|c| cluster.tile_at(c))
            .collect()
    }

    /// Links leaving the rectangle: `(inside tile, outward port, outside tile)`.
    fn boundary_links(&self, cluster: &Cluster) -> Vec<(TileId, Port, TileId)> {
        let mut links = Vec::new();
        for id in self.tiles(cluster) {
            let Coord { x, y } = cluster.coord_of(id);
            let outward = [
                (y == self.min.y, Port::North),
                (y == self.max.y, Port::South),
                (x == self.min.x, Port::West),
                (x == self.max.x, Port::East),
            ];
            for (on_edge, port) in outward {
                if !on_edge {
                    continue;
                }
                if let Some(outside) = cluster.neighbor(id, port) {
                    links.push((id, port, outside));
                }
            }
        }
        links
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{} ({}x{})", self.min, self.max, self.width(), self.height())
    }
}

/// What a reservation actually covers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Reservation {
    pub cluster: ClusterId,
    /// Tiles named by the caller, as given.
    pub requested: Vec<TileId>,
    /// Every tile of the bounding rectangle, ascending.
    pub tiles: Vec<TileId>,
    pub bounds: Rect,
}

impl Reservation {
    /// Tiles taken only because they lie inside the bounding rectangle.
    pub fn fillers(&self) -> impl Iterator<Item = TileId> + '_ {
        self.tiles
            .iter()
            .copied()
            .filter(|t| !self.requested.contains(t))
    }
}

impl ResourceManager {
    /// Validates ids and computes the bounding rectangle of `tiles`.
    fn bounds_of(&self, cluster: ClusterId, tiles: &[TileId]) -> Result<Rect, ResourceError> {
        let c = self.cluster(cluster)?;
        for &tile in tiles {
            self.tile(cluster, tile)?;
        }
        Rect::enclosing(c, tiles).ok_or(ResourceError::PartitionNotFound {
            requested: 0,
            matched: 0,
        })
    }

    /// Marks `tiles` and the rest of their bounding rectangle as assigned
    /// and closes every link crossing the rectangle's border.
    ///
    /// If any tile is already assigned (a repeated id counts), every tile
    /// marked by this call is unmarked again and the call fails. Filler tiles
    /// inside the rectangle are checked as strictly as the named ones: a
    /// filler held by another reservation fails the call with
    /// [`ResourceError::TileAssigned`].
    pub fn reserve_units_set(&mut self, cluster: ClusterId, tiles: &[TileId]) -> Result<Reservation, ResourceError> {
        let bounds = self.bounds_of(cluster, tiles)?;
        let c = self.cluster_mut(cluster)?;
        let rect_tiles = bounds.tiles(c);

        let fillers = rect_tiles.iter().filter(|t| !tiles.contains(*t));
        let mut marked: Vec<TileId> = Vec::with_capacity(rect_tiles.len());
        for &id in tiles.iter().chain(fillers) {
            let Some(tile) = c.tile_mut(id) else { continue };
            if tile.is_assigned() {
                tracing::warn!(
                    "cluster {cluster}: tile {id} already assigned, rolling back {} tile(s)",
                    marked.len(),
                );
                for &undo in &marked {
                    if let Some(t) = c.tile_mut(undo) {
                        t.set_assigned(false);
                    }
                }
                return Err(ResourceError::TileAssigned { cluster, tile: id });
            }
            tile.set_assigned(true);
            marked.push(id);
        }

        for (inside, port, outside) in bounds.boundary_links(c) {
            if let Some(t) = c.tile_mut(inside) {
                t.port_mut(port).close();
            }
            if let Some(t) = c.tile_mut(outside) {
                t.port_mut(port.opposite()).close();
            }
        }

        tracing::debug!(
            "cluster {cluster}: reserved {:?} as {bounds}, {} tile(s) total",
            tiles,
            rect_tiles.len(),
        );
        Ok(Reservation {
            cluster,
            requested: tiles.to_vec(),
            tiles: rect_tiles,
            bounds,
        })
    }

    /// Undoes [`reserve_units_set`](Self::reserve_units_set) for the same
    /// tile list. A border link is reopened only if the tile on its far
    /// side is not assigned.
    pub fn release_units_set(&mut self, cluster: ClusterId, tiles: &[TileId]) -> Result<Reservation, ResourceError> {
        let bounds = self.bounds_of(cluster, tiles)?;
        let c = self.cluster_mut(cluster)?;
        let rect_tiles = bounds.tiles(c);

        for &id in &rect_tiles {
            if let Some(t) = c.tile_mut(id) {
                t.set_assigned(false);
            }
        }

        let mut kept_closed = 0;
        for (inside, port, outside) in bounds.boundary_links(c) {
            if c.tile(outside).map_or(true, |t| t.is_assigned()) {
                kept_closed += 1;
                continue;
            }
            if let Some(t) = c.tile_mut(inside) {
                t.port_mut(port).restore();
            }
            if let Some(t) = c.tile_mut(outside) {
                t.port_mut(port.opposite()).restore();
            }
        }

        tracing::debug!(
            "cluster {cluster}: released {bounds}, {kept_closed} border link(s) still owned by neighbours",
        );
        Ok(Reservation {
            cluster,
            requested: tiles.to_vec(),
            tiles: rect_tiles,
            bounds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;
    use fabric_topology::config::DEFAULT_TILE_BW;

    fn rm() -> ResourceManager {
        ResourceManager::with_default_topology().unwrap()
    }

    fn port(rm: &ResourceManager, tile: TileId, port: Port) -> u64 {
        rm.available_port_bandwidth(0, tile, port).unwrap()
    }

    #[test]
    fn test_reserve_square_closes_border() {
        let mut rm = rm();
        // (1,1) (2,1) / (1,2) (2,2)
        let r = rm.reserve_units_set(0, &[6, 7, 11, 12]).unwrap();
        assert_eq!(r.tiles, vec![6, 7, 11, 12]);
        assert_eq!(r.bounds.area(), 4);
        assert_eq!(r.fillers().count(), 0);

        for t in [6, 7, 11, 12] {
            assert!(rm.tile(0, t).unwrap().is_assigned());
        }
        // Border on both sides.
        assert_eq!(port(&rm, 6, Port::North), 0);
        assert_eq!(port(&rm, 1, Port::South), 0);
        assert_eq!(port(&rm, 7, Port::East), 0);
        assert_eq!(port(&rm, 8, Port::West), 0);
        assert_eq!(port(&rm, 11, Port::West), 0);
        assert_eq!(port(&rm, 10, Port::East), 0);
        // Links inside the square stay open.
        assert_eq!(port(&rm, 6, Port::East), DEFAULT_TILE_BW);
        assert_eq!(port(&rm, 6, Port::South), DEFAULT_TILE_BW);
        assert_eq!(port(&rm, 6, Port::Local), DEFAULT_TILE_BW);
    }

    #[test]
    fn test_release_restores_everything() {
        let mut rm = rm();
        let before = rm.clone();
        rm.reserve_units_set(0, &[6, 7, 11, 12]).unwrap();
        rm.release_units_set(0, &[6, 7, 11, 12]).unwrap();
        for t in 0..20 {
            assert!(!rm.tile(0, t).unwrap().is_assigned());
            for p in Port::ALL {
                assert_eq!(port(&rm, t, p), port(&before, t, p), "tile {t} {p}");
            }
        }
    }

    #[test]
    fn test_fillers_are_assigned() {
        let mut rm = rm();
        // Diagonal pair (0,0) and (2,1) pulls in a 3x2 rectangle.
        let r = rm.reserve_units_set(0, &[0, 7]).unwrap();
        assert_eq!(r.tiles, vec![0, 1, 2, 5, 6, 7]);
        assert_eq!(r.fillers().collect::<Vec<_>>(), vec![1, 2, 5, 6]);
        assert!(rm.tile(0, 5).unwrap().is_assigned());
        // Grid edge: no neighbour, nothing to close.
        assert_eq!(port(&rm, 0, Port::North), DEFAULT_TILE_BW);
        assert_eq!(port(&rm, 2, Port::East), 0);
        assert_eq!(port(&rm, 3, Port::West), 0);
    }

    #[test]
    fn test_assigned_tile_rolls_back() {
        let mut rm = rm();
        rm.reserve_units_set(0, &[2]).unwrap();
        let err = rm.reserve_units_set(0, &[0, 7]).unwrap_err();
        assert_eq!(err, ResourceError::TileAssigned { cluster: 0, tile: 2 });
        assert_eq!(err.status(), Status::PartitionNotFound);
        for t in [0, 1, 5, 6, 7] {
            assert!(!rm.tile(0, t).unwrap().is_assigned(), "tile {t}");
        }
        assert!(rm.tile(0, 2).unwrap().is_assigned());
    }

    #[test]
    fn test_assigned_filler_rejected() {
        let mut rm = rm();
        rm.reserve_units_set(0, &[1]).unwrap();
        // Tiles 0 and 6 span the rectangle {0, 1, 5, 6}; tile 1 is a filler.
        let err = rm.reserve_units_set(0, &[0, 6]).unwrap_err();
        assert_eq!(err, ResourceError::TileAssigned { cluster: 0, tile: 1 });
        for t in [0, 5, 6] {
            assert!(!rm.tile(0, t).unwrap().is_assigned(), "tile {t}");
        }
        assert!(rm.tile(0, 1).unwrap().is_assigned());
    }

    #[test]
    fn test_duplicate_tile_rejected() {
        let mut rm = rm();
        let err = rm.reserve_units_set(0, &[3, 3]).unwrap_err();
        assert_eq!(err, ResourceError::TileAssigned { cluster: 0, tile: 3 });
        assert!(!rm.tile(0, 3).unwrap().is_assigned());
    }

    #[test]
    fn test_release_keeps_link_to_assigned_neighbour() {
        let mut rm = rm();
        rm.reserve_units_set(0, &[6]).unwrap();
        rm.reserve_units_set(0, &[7]).unwrap();
        rm.release_units_set(0, &[6]).unwrap();
        // 7 is still reserved, so the 6 <-> 7 link stays closed.
        assert_eq!(port(&rm, 6, Port::East), 0);
        assert_eq!(port(&rm, 7, Port::West), 0);
        assert_eq!(port(&rm, 6, Port::North), DEFAULT_TILE_BW);
        assert_eq!(port(&rm, 1, Port::South), DEFAULT_TILE_BW);
    }

    #[test]
    fn test_ids_and_empty_list() {
        let mut rm = rm();
        assert_eq!(
            rm.reserve_units_set(0, &[1, 20]).unwrap_err().status(),
            Status::TileNotFound
        );
        assert!(!rm.tile(0, 1).unwrap().is_assigned());
        assert_eq!(
            rm.reserve_units_set(4, &[1]).unwrap_err().status(),
            Status::ClusterNotFound
        );
        assert_eq!(
            rm.release_units_set(0, &[]).unwrap_err().status(),
            Status::PartitionNotFound
        );
    }

    #[test]
    fn test_reserved_tiles_leave_search() {
        let mut rm = rm();
        rm.reserve_units_set(0, &[0, 1, 5, 6]).unwrap();
        let set = rm.find_units_set(0, 1, &[fabric_topology::UnitType::Gn]).unwrap();
        assert_eq!(set.anchor, 4);
    }
}
