// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Bandwidth ledger: get/reserve/release triples for every budget.
//!
//! | Budget | Scope | Selector |
//! |---|---|---|
//! | memory port | tile | [`Access`] |
//! | router port | tile | [`Port`] |
//! | host link | cluster | [`Access`] |
//!
//! A reservation larger than the available bandwidth fails and changes
//! nothing. A release always adds back, then checks the channel against its
//! capacity; an over-capacity result is reported as
//! `WrongBandwidthSetting` (a release of more than was reserved).

use crate::{ResourceError, ResourceManager};
use fabric_topology::{Access, Channel, ClusterId, Port, TileId};

/// Releases `bw` on `channel`, logging a capacity violation.
fn release_logged(channel: &mut Channel, bw: u64, what: &str) -> Result<(), ResourceError> {
    channel.release(bw).map_err(|e| {
        tracing::warn!("{what}: {e}");
        ResourceError::from(e)
    })
}

impl ResourceManager {
    // ── Memory ports ───────────────────────────────────────────

    pub fn available_memory_bandwidth(
        &self,
        cluster: ClusterId,
        tile: TileId,
        access: Access,
    ) -> Result<u64, ResourceError> {
        Ok(self.tile(cluster, tile)?.memory_channel(access).available())
    }

    pub fn reserve_memory_bandwidth(
        &mut self,
        cluster: ClusterId,
        tile: TileId,
        access: Access,
        bw: u64,
    ) -> Result<(), ResourceError> {
        self.tile_mut(cluster, tile)?
            .memory_channel_mut(access)
            .reserve(bw)?;
        tracing::debug!("cluster {cluster} tile {tile}: reserved {bw} {access} memory bandwidth");
        Ok(())
    }

    pub fn release_memory_bandwidth(
        &mut self,
        cluster: ClusterId,
        tile: TileId,
        access: Access,
        bw: u64,
    ) -> Result<(), ResourceError> {
        let channel = self.tile_mut(cluster, tile)?.memory_channel_mut(access);
        release_logged(
            channel,
            bw,
            &format!("cluster {cluster} tile {tile} {access} memory port"),
        )
    }

    // ── Router ports ───────────────────────────────────────────

    pub fn available_port_bandwidth(
        &self,
        cluster: ClusterId,
        tile: TileId,
        port: Port,
    ) -> Result<u64, ResourceError> {
        Ok(self.tile(cluster, tile)?.port(port).available())
    }

    pub fn reserve_port_bandwidth(
        &mut self,
        cluster: ClusterId,
        tile: TileId,
        port: Port,
        bw: u64,
    ) -> Result<(), ResourceError> {
        self.tile_mut(cluster, tile)?.port_mut(port).reserve(bw)?;
        tracing::debug!("cluster {cluster} tile {tile}: reserved {bw} on {port} port");
        Ok(())
    }

    pub fn release_port_bandwidth(
        &mut self,
        cluster: ClusterId,
        tile: TileId,
        port: Port,
        bw: u64,
    ) -> Result<(), ResourceError> {
        let channel = self.tile_mut(cluster, tile)?.port_mut(port);
        release_logged(
            channel,
            bw,
            &format!("cluster {cluster} tile {tile} {port} port"),
        )
    }

    // ── Host links ─────────────────────────────────────────────

    pub fn available_cluster_bandwidth(
        &self,
        cluster: ClusterId,
        access: Access,
    ) -> Result<u64, ResourceError> {
        Ok(self.cluster(cluster)?.link(access).available())
    }

    pub fn reserve_cluster_bandwidth(
        &mut self,
        cluster: ClusterId,
        access: Access,
        bw: u64,
    ) -> Result<(), ResourceError> {
        self.cluster_mut(cluster)?.link_mut(access).reserve(bw)?;
        tracing::debug!("cluster {cluster}: reserved {bw} {access} host-link bandwidth");
        Ok(())
    }

    pub fn release_cluster_bandwidth(
        &mut self,
        cluster: ClusterId,
        access: Access,
        bw: u64,
    ) -> Result<(), ResourceError> {
        let channel = self.cluster_mut(cluster)?.link_mut(access);
        release_logged(channel, bw, &format!("cluster {cluster} {access} host link"))
    }
}
