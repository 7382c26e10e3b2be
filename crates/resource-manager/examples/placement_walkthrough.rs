// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Example: place two workloads on the default fabric and watch the
//! resources move.
//!
//! Shows the implicit bounding-rectangle fillers, how a reservation's
//! closed border blocks a network path, and that releasing everything
//! returns the cluster to its initial state.
//!
//! ```bash
//! cargo run -p resource-manager --example placement_walkthrough
//! ```

use fabric_topology::UnitType;
use resource_manager::{ResourceManager, TileLocation};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing.
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .init();

    let mut rm = ResourceManager::with_default_topology()?;
    println!("{}\n", rm.cluster(0)?);

    // Workload A: three GN tiles around a memory bank.
    let types_a = [UnitType::Gn; 3];
    let set_a = rm.find_units_set(0, types_a.len(), &types_a)?;
    let res_a = rm.reserve_units_set(0, &set_a.tiles)?;
    let buf_a = rm.find_memory(0, set_a.anchor, 256 * 1024)?;
    println!(
        "A: anchor {} tiles {:?} -> reserved {} (fillers {:?}), buffer at {buf_a:#x}",
        set_a.anchor,
        set_a.tiles,
        res_a.bounds,
        res_a.fillers().collect::<Vec<_>>(),
    );

    // Workload B lands on the next free bank.
    let set_b = rm.find_units_set(0, 2, &[UnitType::Gn, UnitType::Gn])?;
    let res_b = rm.reserve_units_set(0, &set_b.tiles)?;
    println!("B: anchor {} tiles {:?} -> reserved {}", set_b.anchor, set_b.tiles, res_b.bounds);

    // A path from A's anchor that crosses its own border is now closed.
    let src = TileLocation::new(0, set_a.anchor);
    let dst = TileLocation::new(0, 12);
    match rm.reserve_network_bandwidth(src, dst, 10) {
        Ok(()) => println!("path {src} -> {dst}: reserved"),
        Err(e) => println!("path {src} -> {dst}: {} ({e})", e.status()),
    }

    println!("\n{}", rm.snapshot(0)?.summary());

    rm.release_memory(0, set_a.anchor, buf_a, 256 * 1024)?;
    rm.release_units_set(0, &res_b.requested)?;
    rm.release_units_set(0, &res_a.requested)?;
    println!("{}", rm.snapshot(0)?.summary());

    Ok(())
}
