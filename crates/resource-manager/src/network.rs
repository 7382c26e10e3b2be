// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Network path bandwidth between two tiles of a cluster.
//!
//! Paths follow dimension-ordered (XY) routing: first along the row towards
//! the destination column, then along the column towards the destination
//! row, and finally into the destination through its local port. Each
//! [`Hop`] names the tile a flit leaves from and the port it leaves through.
//!
//! Reservation and release are atomic over the whole path: either every hop
//! changes or none does.

use crate::{ResourceError, ResourceManager};
use fabric_topology::{BandwidthError, Channel, Cluster, ClusterId, Coord, Port, TileId};
use std::cmp::Ordering;
use std::fmt;

/// A tile addressed across the whole fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TileLocation {
    pub cluster: ClusterId,
    pub tile: TileId,
}

impl TileLocation {
    pub fn new(cluster: ClusterId, tile: TileId) -> Self {
        Self { cluster, tile }
    }
}

impl fmt::Display for TileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.cluster, self.tile)
    }
}

/// One step of a route: the outgoing `port` of `tile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Hop {
    pub tile: TileId,
    pub port: Port,
}

/// XY route from `src` to `dst`. Always ends with the local hop on `dst`.
///
/// Both ids must be in range for `cluster`.
pub fn xy_route(cluster: &Cluster, src: TileId, dst: TileId) -> Vec<Hop> {
    let target = cluster.coord_of(dst);
    let mut hops = Vec::with_capacity(cluster.distance(src, dst) + 1);
    let mut tile = src;

    loop {
        let Coord { x, y } = cluster.coord_of(tile);
        let port = match (x.cmp(&target.x), y.cmp(&target.y)) {
            (Ordering::Less, _) => Port::East,
            (Ordering::Greater, _) => Port::West,
            (Ordering::Equal, Ordering::Less) => Port::South,
            (Ordering::Equal, Ordering::Greater) => Port::North,
            (Ordering::Equal, Ordering::Equal) => Port::Local,
        };
        hops.push(Hop { tile, port });
        match cluster.neighbor(tile, port) {
            Some(next) => tile = next,
            None => break,
        }
    }
    hops
}

impl ResourceManager {
    /// Validates both ends and returns their common cluster.
    fn path_cluster(&self, src: TileLocation, dst: TileLocation) -> Result<ClusterId, ResourceError> {
        self.tile(src.cluster, src.tile)?;
        self.tile(dst.cluster, dst.tile)?;
        if src.cluster != dst.cluster {
            return Err(ResourceError::ClusterCrossingUnsupported {
                src: src.cluster,
                dst: dst.cluster,
            });
        }
        Ok(src.cluster)
    }

    /// The XY route between two tiles of `cluster`.
    pub fn route(&self, cluster: ClusterId, src: TileId, dst: TileId) -> Result<Vec<Hop>, ResourceError> {
        self.tile(cluster, src)?;
        self.tile(cluster, dst)?;
        Ok(xy_route(self.cluster(cluster)?, src, dst))
    }

    /// Bandwidth that can still be reserved along the path: the minimum
    /// available bandwidth over its hops.
    pub fn get_available_network_bandwidth(
        &self,
        src: TileLocation,
        dst: TileLocation,
    ) -> Result<u64, ResourceError> {
        let id = self.path_cluster(src, dst)?;
        let cluster = self.cluster(id)?;
        Ok(path_available(cluster, &xy_route(cluster, src.tile, dst.tile)))
    }

    /// Reserves `bw` on every hop of the path from `src` to `dst`.
    pub fn reserve_network_bandwidth(
        &mut self,
        src: TileLocation,
        dst: TileLocation,
        bw: u64,
    ) -> Result<(), ResourceError> {
        let id = self.path_cluster(src, dst)?;
        let cluster = self.cluster_mut(id)?;
        let hops = xy_route(cluster, src.tile, dst.tile);

        let available = path_available(cluster, &hops);
        if available < bw {
            return Err(BandwidthError::NotEnoughBandwidthAvailable {
                requested: bw,
                available,
            }
            .into());
        }

        for (i, hop) in hops.iter().enumerate() {
            if let Err(e) = channel_mut(cluster, hop)?.reserve(bw) {
                tracing::warn!("path {src} -> {dst}: hop {i} failed ({e}), rolling back");
                for done in &hops[..i] {
                    // Undoes a reservation made just above; cannot exceed capacity.
                    let _ = channel_mut(cluster, done)?.release(bw);
                }
                return Err(e.into());
            }
        }
        tracing::debug!("path {src} -> {dst}: reserved {bw} over {} hops", hops.len());
        Ok(())
    }

    /// Returns `bw` to every hop of the path. If any hop would end up over
    /// capacity the call fails with `WrongBandwidthSetting` and no hop is
    /// changed.
    pub fn release_network_bandwidth(
        &mut self,
        src: TileLocation,
        dst: TileLocation,
        bw: u64,
    ) -> Result<(), ResourceError> {
        let id = self.path_cluster(src, dst)?;
        let cluster = self.cluster_mut(id)?;
        let hops = xy_route(cluster, src.tile, dst.tile);

        for hop in &hops {
            let channel = channel_mut(cluster, hop)?;
            if !channel.can_release(bw) {
                let err = BandwidthError::WrongBandwidthSetting {
                    available: channel.available().saturating_add(bw),
                    capacity: channel.capacity(),
                };
                tracing::warn!("path {src} -> {dst}: tile {} {} port: {err}", hop.tile, hop.port);
                return Err(err.into());
            }
        }
        for hop in &hops {
            channel_mut(cluster, hop)?.release(bw)?;
        }
        tracing::debug!("path {src} -> {dst}: released {bw} over {} hops", hops.len());
        Ok(())
    }

    /// Manhattan distance between two tiles of the same cluster.
    pub fn get_network_distance(&self, src: TileLocation, dst: TileLocation) -> Result<usize, ResourceError> {
        let id = self.path_cluster(src, dst)?;
        Ok(self.cluster(id)?.distance(src.tile, dst.tile))
    }
}

fn path_available(cluster: &Cluster, hops: &[Hop]) -> u64 {
    hops.iter()
        .filter_map(|hop| cluster.tile(hop.tile).map(|t| t.port(hop.port).available()))
        .min()
        .unwrap_or(0)
}

fn channel_mut<'a>(cluster: &'a mut Cluster, hop: &Hop) -> Result<&'a mut Channel, ResourceError> {
    let id = cluster.id();
    cluster
        .tile_mut(hop.tile)
        .map(|t| t.port_mut(hop.port))
        .ok_or(ResourceError::TileNotFound {
            cluster: id,
            tile: hop.tile,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;
    use fabric_topology::config::DEFAULT_TILE_BW;
    use std::collections::HashSet;

    fn rm() -> ResourceManager {
        ResourceManager::with_default_topology().unwrap()
    }

    fn loc(tile: TileId) -> TileLocation {
        TileLocation::new(0, tile)
    }

    #[test]
    fn test_route_x_then_y() {
        let rm = rm();
        // (0,0) -> (2,1): east, east, south, local.
        let hops = rm.route(0, 0, 7).unwrap();
        let expected = [
            Hop { tile: 0, port: Port::East },
            Hop { tile: 1, port: Port::East },
            Hop { tile: 2, port: Port::South },
            Hop { tile: 7, port: Port::Local },
        ];
        assert_eq!(hops, expected);
    }

    #[test]
    fn test_route_west_and_north() {
        let rm = rm();
        // (4,3) -> (1,0)
        let hops = rm.route(0, 19, 1).unwrap();
        assert_eq!(hops.len(), 7);
        assert!(hops[..3].iter().all(|h| h.port == Port::West));
        assert!(hops[3..6].iter().all(|h| h.port == Port::North));
        assert_eq!(hops[6], Hop { tile: 1, port: Port::Local });
    }

    #[test]
    fn test_route_to_self_is_local_only() {
        let rm = rm();
        assert_eq!(rm.route(0, 12, 12).unwrap(), vec![Hop { tile: 12, port: Port::Local }]);
    }

    #[test]
    fn test_route_length_and_uniqueness() {
        let rm = rm();
        for src in 0..20 {
            for dst in 0..20 {
                let hops = rm.route(0, src, dst).unwrap();
                let d = rm.get_network_distance(loc(src), loc(dst)).unwrap();
                assert_eq!(hops.len(), d + 1);
                assert_eq!(hops.last().map(|h| (h.tile, h.port)), Some((dst, Port::Local)));
                let unique: HashSet<_> = hops.iter().collect();
                assert_eq!(unique.len(), hops.len());
            }
        }
    }

    #[test]
    fn test_available_is_path_minimum() {
        let mut rm = rm();
        rm.reserve_port_bandwidth(0, 1, Port::East, 70).unwrap();
        assert_eq!(rm.get_available_network_bandwidth(loc(0), loc(7)).unwrap(), 30);
        // A path that avoids tile 1's east port is unaffected.
        assert_eq!(
            rm.get_available_network_bandwidth(loc(5), loc(7)).unwrap(),
            DEFAULT_TILE_BW
        );
    }

    #[test]
    fn test_reserve_and_release_path() {
        let mut rm = rm();
        rm.reserve_network_bandwidth(loc(0), loc(7), 40).unwrap();
        for hop in rm.route(0, 0, 7).unwrap() {
            assert_eq!(rm.available_port_bandwidth(0, hop.tile, hop.port).unwrap(), 60);
        }
        rm.release_network_bandwidth(loc(0), loc(7), 40).unwrap();
        for hop in rm.route(0, 0, 7).unwrap() {
            assert_eq!(
                rm.available_port_bandwidth(0, hop.tile, hop.port).unwrap(),
                DEFAULT_TILE_BW
            );
        }
    }

    #[test]
    fn test_reserve_insufficient_changes_nothing() {
        let mut rm = rm();
        rm.reserve_port_bandwidth(0, 2, Port::South, 90).unwrap();
        let err = rm.reserve_network_bandwidth(loc(0), loc(7), 20).unwrap_err();
        assert_eq!(err.status(), Status::NotEnoughBandwidthAvailable);
        assert_eq!(rm.available_port_bandwidth(0, 0, Port::East).unwrap(), DEFAULT_TILE_BW);
        assert_eq!(rm.available_port_bandwidth(0, 1, Port::East).unwrap(), DEFAULT_TILE_BW);
        assert_eq!(rm.available_port_bandwidth(0, 2, Port::South).unwrap(), 10);
    }

    #[test]
    fn test_release_over_capacity_is_atomic() {
        let mut rm = rm();
        rm.reserve_network_bandwidth(loc(0), loc(7), 40).unwrap();
        // Give one hop back out of band so a full path release would overflow it.
        rm.release_port_bandwidth(0, 2, Port::South, 40).unwrap();
        let err = rm.release_network_bandwidth(loc(0), loc(7), 40).unwrap_err();
        assert_eq!(err.status(), Status::WrongBandwidthSetting);
        assert_eq!(rm.available_port_bandwidth(0, 0, Port::East).unwrap(), 60);
        assert_eq!(rm.available_port_bandwidth(0, 7, Port::Local).unwrap(), 60);
    }

    #[test]
    fn test_release_without_reserve_fails() {
        let mut rm = rm();
        let err = rm.release_network_bandwidth(loc(3), loc(3), 1).unwrap_err();
        assert_eq!(err.status(), Status::WrongBandwidthSetting);
        assert_eq!(rm.available_port_bandwidth(0, 3, Port::Local).unwrap(), DEFAULT_TILE_BW);
    }

    #[test]
    fn test_ids_validated_before_cluster_crossing() {
        let mut rm = ResourceManager::new(&two_clusters()).unwrap();
        let err = rm
            .reserve_network_bandwidth(TileLocation::new(0, 0), TileLocation::new(1, 99), 1)
            .unwrap_err();
        assert_eq!(err.status(), Status::TileNotFound);

        let err = rm
            .get_network_distance(TileLocation::new(0, 0), TileLocation::new(1, 0))
            .unwrap_err();
        assert_eq!(err, ResourceError::ClusterCrossingUnsupported { src: 0, dst: 1 });

        let err = rm
            .get_available_network_bandwidth(TileLocation::new(2, 0), TileLocation::new(0, 0))
            .unwrap_err();
        assert_eq!(err.status(), Status::ClusterNotFound);
    }

    #[test]
    fn test_distance() {
        let rm = rm();
        assert_eq!(rm.get_network_distance(loc(0), loc(19)).unwrap(), 7);
        assert_eq!(rm.get_network_distance(loc(6), loc(6)).unwrap(), 0);
    }

    fn two_clusters() -> fabric_topology::FabricConfig {
        let mut config = fabric_topology::FabricConfig::default();
        let second = config.clusters[0].clone();
        config.clusters.push(second);
        config
    }
}
