// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `fabric-rm port` command: show, reserve or release one router port's
//! bandwidth.

use fabric_topology::Channel;
use std::path::Path;

pub fn execute(
    config: Option<&Path>,
    cluster: usize,
    tile: usize,
    port: &str,
    reserve: Option<u64>,
    release: Option<u64>,
) -> anyhow::Result<()> {
    let mut rm = super::load_manager(config)?;
    let port = super::parse_port(port)?;

    let before = *rm.tile(cluster, tile)?.port(port);
    print_channel("Before", &before);

    if let Some(bw) = reserve {
        rm.reserve_port_bandwidth(cluster, tile, port, bw)
            .map_err(|e| anyhow::anyhow!("{}: {e}", e.status()))?;
    }
    if let Some(bw) = release {
        rm.release_port_bandwidth(cluster, tile, port, bw)
            .map_err(|e| anyhow::anyhow!("{}: {e}", e.status()))?;
    }

    if reserve.is_some() || release.is_some() {
        let after = *rm.tile(cluster, tile)?.port(port);
        print_channel("After", &after);
    }
    println!("  Cluster {cluster} tile {tile}, {port} port");
    Ok(())
}

fn print_channel(label: &str, channel: &Channel) {
    let used = 1.0 - channel.available() as f64 / channel.capacity().max(1) as f64;
    println!(
        "  {label:<8} {:>8} / {:<8} available  {}",
        channel.available(),
        channel.capacity(),
        super::usage_bar(used),
    );
}
