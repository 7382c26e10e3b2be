// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `fabric-rm inspect` command: display the topology.
//!
//! Prints each cluster's grid of unit types and compute-tile count, followed
//! by the memory-bearing tiles and the host-link capacities.

use std::path::Path;
use tile_memory::ByteSize;

pub fn execute(config: Option<&Path>, dump: bool) -> anyhow::Result<()> {
    let fabric = super::load_config(config)?;
    if dump {
        print!("{}", fabric.to_toml()?);
        return Ok(());
    }

    let rm = resource_manager::ResourceManager::new(&fabric)?;

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             fabric-rm · Topology Inspector          ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    for cluster in rm.clusters() {
        // ── Grid ───────────────────────────────────────────────
        println!("{cluster}");
        let compute = cluster
            .tiles()
            .iter()
            .filter(|t| t.unit_type().is_compute())
            .count();
        println!("  Compute tiles: {compute}/{}", cluster.num_tiles());

        // ── Memory Banks ───────────────────────────────────────
        println!("  Memory banks:");
        let mut any = false;
        for id in cluster.memory_tiles() {
            let Some(tile) = cluster.tile(id) else { continue };
            any = true;
            println!(
                "   tile {:>3} {:<8} {:>8}",
                id,
                cluster.coord_of(id).to_string(),
                ByteSize::from_bytes(tile.memory_size()).to_string(),
            );
        }
        if !any {
            println!("   (none)");
        }

        // ── Links ──────────────────────────────────────────────
        println!(
            "  Host link: read {} / write {}",
            cluster.link(fabric_topology::Access::Read).capacity(),
            cluster.link(fabric_topology::Access::Write).capacity(),
        );
        println!("  Diameter: {} hops", cluster.diameter());
        println!();
    }

    Ok(())
}
