// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The resource manager instance and its memory operations.
//!
//! A [`ResourceManager`] owns the clusters built from a [`FabricConfig`].
//! Callers never touch cluster or tile state directly: every mutation goes
//! through a manager method, which validates the cluster id and then the
//! tile id before looking at anything else.
//!
//! The manager is a plain value. Mutating operations take `&mut self`, so a
//! single owner serialises access by construction; see
//! [`SharedResourceManager`](crate::SharedResourceManager) for sharing one
//! manager across threads.

use crate::ResourceError;
use fabric_topology::{Cluster, ClusterId, FabricConfig, Tile, TileId, TopologyError};
use tile_memory::FreeList;

/// Owner of the fabric's mutable resource state.
///
/// # Example
/// ```
/// use resource_manager::ResourceManager;
///
/// let mut rm = ResourceManager::with_default_topology().unwrap();
///
/// let a = rm.find_memory(0, 0, 512 * 1024).unwrap();
/// let b = rm.find_memory(0, 0, 512 * 1024).unwrap();
/// assert_eq!((a, b), (0, 524288));
/// assert!(rm.find_memory(0, 0, 1).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ResourceManager {
    clusters: Vec<Cluster>,
}

impl ResourceManager {
    /// Builds the clusters described by `config`.
    pub fn new(config: &FabricConfig) -> Result<Self, TopologyError> {
        let clusters = config.build()?;
        for cluster in &clusters {
            tracing::info!("{}", cluster.summary());
        }
        Ok(Self { clusters })
    }

    /// Builds the documented default topology.
    pub fn with_default_topology() -> Result<Self, TopologyError> {
        Self::new(&FabricConfig::default())
    }

    pub fn num_clusters(&self) -> usize {
        self.clusters.len()
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Read-only view of a cluster.
    pub fn cluster(&self, cluster: ClusterId) -> Result<&Cluster, ResourceError> {
        self.clusters
            .get(cluster)
            .ok_or(ResourceError::ClusterNotFound { cluster })
    }

    pub(crate) fn cluster_mut(&mut self, cluster: ClusterId) -> Result<&mut Cluster, ResourceError> {
        self.clusters
            .get_mut(cluster)
            .ok_or(ResourceError::ClusterNotFound { cluster })
    }

    /// Read-only view of a tile.
    pub fn tile(&self, cluster: ClusterId, tile: TileId) -> Result<&Tile, ResourceError> {
        self.cluster(cluster)?
            .tile(tile)
            .ok_or(ResourceError::TileNotFound { cluster, tile })
    }

    pub(crate) fn tile_mut(&mut self, cluster: ClusterId, tile: TileId) -> Result<&mut Tile, ResourceError> {
        self.cluster_mut(cluster)?
            .tile_mut(tile)
            .ok_or(ResourceError::TileNotFound { cluster, tile })
    }

    fn bank(&self, cluster: ClusterId, tile: TileId) -> Result<&FreeList, ResourceError> {
        self.tile(cluster, tile)?
            .memory()
            .ok_or(ResourceError::MemoryNotPresent { cluster, tile })
    }

    fn bank_mut(&mut self, cluster: ClusterId, tile: TileId) -> Result<&mut FreeList, ResourceError> {
        self.tile_mut(cluster, tile)?
            .memory_mut()
            .ok_or(ResourceError::MemoryNotPresent { cluster, tile })
    }

    // ── Memory slot allocator ──────────────────────────────────

    /// First-fit lookup of `size` free bytes on a tile's bank. Returns the
    /// start address of the first slot large enough; nothing is reserved.
    pub fn get_free_memory(&self, cluster: ClusterId, tile: TileId, size: u64) -> Result<u64, ResourceError> {
        self.bank(cluster, tile)?
            .first_fit(size)
            .map_err(|source| ResourceError::Memory {
                cluster,
                tile,
                source,
            })
    }

    /// Allocates `size` bytes from the front of the free slot starting at
    /// `start_address`.
    pub fn allocate_memory(
        &mut self,
        cluster: ClusterId,
        tile: TileId,
        start_address: u64,
        size: u64,
    ) -> Result<(), ResourceError> {
        self.bank_mut(cluster, tile)?
            .allocate(start_address, size)
            .map_err(|source| ResourceError::Memory {
                cluster,
                tile,
                source,
            })?;
        tracing::debug!("cluster {cluster} tile {tile}: allocated {size} bytes at {start_address:#x}");
        Ok(())
    }

    /// Returns `[start_address, start_address + size)` to a tile's bank.
    pub fn release_memory(
        &mut self,
        cluster: ClusterId,
        tile: TileId,
        start_address: u64,
        size: u64,
    ) -> Result<(), ResourceError> {
        self.bank_mut(cluster, tile)?
            .release(start_address, size)
            .map_err(|source| ResourceError::Memory {
                cluster,
                tile,
                source,
            })?;
        tracing::debug!("cluster {cluster} tile {tile}: released {size} bytes at {start_address:#x}");
        Ok(())
    }

    /// Finds and allocates `size` bytes on a tile's bank in one step,
    /// returning the start address.
    pub fn find_memory(&mut self, cluster: ClusterId, tile: TileId, size: u64) -> Result<u64, ResourceError> {
        let start_address = self.get_free_memory(cluster, tile, size)?;
        self.allocate_memory(cluster, tile, start_address, size)?;
        Ok(start_address)
    }

    /// Free bytes on a tile's bank.
    pub fn free_memory(&self, cluster: ClusterId, tile: TileId) -> Result<u64, ResourceError> {
        Ok(self.bank(cluster, tile)?.free_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    const KB: u64 = 1024;

    fn rm() -> ResourceManager {
        ResourceManager::with_default_topology().unwrap()
    }

    #[test]
    fn test_default_manager() {
        let rm = rm();
        assert_eq!(rm.num_clusters(), 1);
        assert_eq!(rm.cluster(0).unwrap().num_tiles(), 20);
    }

    #[test]
    fn test_ids_checked_first() {
        let mut rm = rm();
        let err = rm.get_free_memory(1, 0, 1).unwrap_err();
        assert_eq!(err.status(), Status::ClusterNotFound);
        let err = rm.allocate_memory(0, 20, 0, 1).unwrap_err();
        assert_eq!(err.status(), Status::TileNotFound);
        let err = rm.release_memory(3, 99, 0, 1).unwrap_err();
        assert_eq!(err.status(), Status::ClusterNotFound);
    }

    #[test]
    fn test_memory_not_present() {
        let mut rm = rm();
        let err = rm.get_free_memory(0, 1, 16).unwrap_err();
        assert_eq!(err, ResourceError::MemoryNotPresent { cluster: 0, tile: 1 });
        let err = rm.find_memory(0, 7, 16).unwrap_err();
        assert_eq!(err.status(), Status::MemoryNotPresent);
    }

    #[test]
    fn test_get_free_memory_is_read_only() {
        let rm = rm();
        assert_eq!(rm.get_free_memory(0, 0, 256 * KB).unwrap(), 0);
        assert_eq!(rm.get_free_memory(0, 0, 256 * KB).unwrap(), 0);
        assert_eq!(rm.free_memory(0, 0).unwrap(), 1024 * KB);
    }

    #[test]
    fn test_allocate_wrong_address() {
        let mut rm = rm();
        let err = rm.allocate_memory(0, 4, 100, 10).unwrap_err();
        assert_eq!(err.status(), Status::FindMemoryError);
        assert_eq!(rm.free_memory(0, 4).unwrap(), 1024 * KB);
    }

    #[test]
    fn test_find_memory_sequence() {
        let mut rm = rm();
        assert_eq!(rm.find_memory(0, 0, 512 * KB).unwrap(), 0);
        assert_eq!(rm.find_memory(0, 0, 512 * KB).unwrap(), 524288);
        let err = rm.find_memory(0, 0, 1).unwrap_err();
        assert_eq!(err.status(), Status::NotEnoughMemory);
        // Other banks are independent.
        assert_eq!(rm.find_memory(0, 19, 1).unwrap(), 0);
    }

    #[test]
    fn test_release_restores_bank() {
        let mut rm = rm();
        let a = rm.find_memory(0, 15, 100 * KB).unwrap();
        let b = rm.find_memory(0, 15, 200 * KB).unwrap();
        rm.release_memory(0, 15, a, 100 * KB).unwrap();
        rm.release_memory(0, 15, b, 200 * KB).unwrap();
        let bank = rm.tile(0, 15).unwrap().memory().unwrap();
        assert_eq!(bank.num_slots(), 1);
        assert_eq!(bank.free_bytes(), 1024 * KB);
    }

    #[test]
    fn test_double_release_rejected() {
        let mut rm = rm();
        let a = rm.find_memory(0, 0, 4 * KB).unwrap();
        rm.release_memory(0, 0, a, 4 * KB).unwrap();
        let err = rm.release_memory(0, 0, a, 4 * KB).unwrap_err();
        assert_eq!(err.status(), Status::FindMemoryError);
        assert_eq!(rm.free_memory(0, 0).unwrap(), 1024 * KB);
    }
}
