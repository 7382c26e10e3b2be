// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tile-set search: finding free tiles of the requested unit types close to
//! an anchor.
//!
//! The search walks von Neumann rings of growing radius around the anchor.
//! Within a ring of radius `d`, rows are visited from north to south and,
//! in each row, the western candidate before the eastern one. A tile is
//! picked when it is unassigned, not yet picked by the same search, and its
//! unit type matches a requested type that is still unfilled.
//!
//! Searches never mutate the manager; the set of picked tiles lives only for
//! the duration of the call.

use crate::{ResourceError, ResourceManager};
use fabric_topology::{Cluster, ClusterId, Coord, TileId, UnitType};
use std::collections::HashSet;

/// The outcome of a successful search.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UnitsSet {
    /// The tile the rings were centred on.
    pub anchor: TileId,
    /// Picked tiles, one per requested type, in request order.
    pub tiles: Vec<TileId>,
    /// Sum of the ring radii at which the tiles were picked.
    pub total_distance: usize,
}

/// Tiles on the ring of radius `d` around `anchor`, in visiting order.
fn ring(cluster: &Cluster, anchor: Coord, d: usize) -> impl Iterator<Item = TileId> + '_ {
    let d = d as isize;
    let (ax, ay) = (anchor.x as isize, anchor.y as isize);
    (-d..=d).flat_map(move |dy| {
        let dx = d - dy.abs();
        let xs = if dx == 0 { vec![ax] } else { vec![ax - dx, ax + dx] };
        let y = ay + dy;
        xs.into_iter().filter_map(move |x| {
            if x < 0 || y < 0 {
                return None;
            }
            cluster.tile_at(Coord::new(x as usize, y as usize))
        })
    })
}

fn check_request(num_tiles: usize, types: &[UnitType]) -> Result<(), ResourceError> {
    if num_tiles == 0 || num_tiles > types.len() {
        return Err(ResourceError::PartitionNotFound {
            requested: num_tiles,
            matched: 0,
        });
    }
    Ok(())
}

/// Ring search on one cluster. The request must already be checked.
fn search(
    cluster: &Cluster,
    anchor: TileId,
    num_tiles: usize,
    types: &[UnitType],
) -> Result<UnitsSet, ResourceError> {
    let centre = cluster.coord_of(anchor);
    let mut slots: Vec<Option<TileId>> = vec![None; types.len()];
    let mut picked = HashSet::with_capacity(num_tiles);
    let mut total_distance = 0;

    for d in 0..=cluster.diameter() {
        for id in ring(cluster, centre, d) {
            let Some(tile) = cluster.tile(id) else { continue };
            if tile.is_assigned() || picked.contains(&id) {
                continue;
            }
            let free_slot = slots
                .iter()
                .zip(types)
                .position(|(slot, ty)| slot.is_none() && *ty == tile.unit_type());
            if let Some(i) = free_slot {
                slots[i] = Some(id);
                picked.insert(id);
                total_distance += d;
                if picked.len() == num_tiles {
                    return Ok(UnitsSet {
                        anchor,
                        tiles: slots.into_iter().flatten().collect(),
                        total_distance,
                    });
                }
            }
        }
    }

    Err(ResourceError::PartitionNotFound {
        requested: num_tiles,
        matched: picked.len(),
    })
}

impl ResourceManager {
    /// Searches for `num_tiles` free tiles of the given types around one
    /// anchor tile.
    pub fn find_single_units_set(
        &self,
        cluster: ClusterId,
        anchor: TileId,
        num_tiles: usize,
        types: &[UnitType],
    ) -> Result<UnitsSet, ResourceError> {
        self.tile(cluster, anchor)?;
        check_request(num_tiles, types)?;
        search(self.cluster(cluster)?, anchor, num_tiles, types)
    }

    /// Runs the search from every free memory-bearing tile and returns the
    /// set with the smallest total distance. Ties go to the lowest anchor id.
    pub fn find_units_set(
        &self,
        cluster: ClusterId,
        num_tiles: usize,
        types: &[UnitType],
    ) -> Result<UnitsSet, ResourceError> {
        let c = self.cluster(cluster)?;
        check_request(num_tiles, types)?;

        let mut best: Option<UnitsSet> = None;
        let mut best_partial = 0;
        for anchor in anchors(c) {
            match search(c, anchor, num_tiles, types) {
                Ok(set) => {
                    if best.as_ref().map_or(true, |b| set.total_distance < b.total_distance) {
                        best = Some(set);
                    }
                }
                Err(ResourceError::PartitionNotFound { matched, .. }) => {
                    best_partial = best_partial.max(matched);
                }
                Err(e) => return Err(e),
            }
        }

        match best {
            Some(set) => {
                tracing::debug!(
                    "cluster {cluster}: best set around tile {} at distance {}: {:?}",
                    set.anchor,
                    set.total_distance,
                    set.tiles,
                );
                Ok(set)
            }
            None => Err(ResourceError::PartitionNotFound {
                requested: num_tiles,
                matched: best_partial,
            }),
        }
    }

    /// Every anchor's successful search, in ascending anchor order.
    pub fn find_units_sets(
        &self,
        cluster: ClusterId,
        num_tiles: usize,
        types: &[UnitType],
    ) -> Result<Vec<UnitsSet>, ResourceError> {
        let c = self.cluster(cluster)?;
        check_request(num_tiles, types)?;

        let mut sets = Vec::new();
        let mut best_partial = 0;
        for anchor in anchors(c) {
            match search(c, anchor, num_tiles, types) {
                Ok(set) => sets.push(set),
                Err(ResourceError::PartitionNotFound { matched, .. }) => {
                    best_partial = best_partial.max(matched);
                }
                Err(e) => return Err(e),
            }
        }
        if sets.is_empty() {
            return Err(ResourceError::PartitionNotFound {
                requested: num_tiles,
                matched: best_partial,
            });
        }
        tracing::debug!("cluster {cluster}: {} candidate set(s)", sets.len());
        Ok(sets)
    }
}

/// Free memory-bearing tiles, ascending.
fn anchors(cluster: &Cluster) -> impl Iterator<Item = TileId> + '_ {
    cluster
        .memory_tiles()
        .filter(|&id| cluster.tile(id).is_some_and(|t| !t.is_assigned()))
}
