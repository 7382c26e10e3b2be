// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `fabric-rm status` command: display per-cluster resource state.

use resource_manager::ClusterSnapshot;
use std::path::Path;

pub fn execute(config: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let rm = super::load_manager(config)?;
    let snapshots = rm.snapshot_all();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            fabric-rm · Resource Status              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    for snap in &snapshots {
        print_snapshot(snap);
    }
    Ok(())
}

pub fn print_snapshot(snap: &ClusterSnapshot) {
    println!("  Cluster {} ({}x{})", snap.cluster, snap.num_rows, snap.num_cols);

    // ── Memory ─────────────────────────────────────────────────
    let mem = snap.memory_utilisation();
    println!("   Memory:       {:>5.1}% used  {}", mem * 100.0, super::usage_bar(mem));
    for t in snap.tiles.iter().filter(|t| t.memory_size > 0) {
        println!(
            "     tile {:>3}:  {} / {} bytes free",
            t.id, t.free_memory, t.memory_size,
        );
    }

    // ── Bandwidth ──────────────────────────────────────────────
    let ports = snap.port_utilisation();
    println!("   Ports:        {:>5.1}% used  {}", ports * 100.0, super::usage_bar(ports));
    println!(
        "   Host link:    read {}/{}  write {}/{}",
        snap.read_link.available(),
        snap.read_link.capacity(),
        snap.write_link.available(),
        snap.write_link.capacity(),
    );

    // ── Assignment ─────────────────────────────────────────────
    let assigned: Vec<_> = snap.tiles.iter().filter(|t| t.assigned).map(|t| t.id).collect();
    println!("   Assigned:     {assigned:?}");
    println!();
    println!("{}", snap.summary());
    println!();
}
