// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `fabric-rm place` command: search for a tile set and optionally reserve it.

use std::path::Path;

pub fn execute(
    config: Option<&Path>,
    cluster: usize,
    types: Vec<String>,
    num_tiles: Option<usize>,
    anchor: Option<usize>,
    reserve: bool,
) -> anyhow::Result<()> {
    let mut rm = super::load_manager(config)?;
    let types = super::parse_types(&types)?;
    let num_tiles = num_tiles.unwrap_or(types.len());

    let set = match anchor {
        Some(a) => rm.find_single_units_set(cluster, a, num_tiles, &types),
        None => rm.find_units_set(cluster, num_tiles, &types),
    }
    .map_err(|e| anyhow::anyhow!("{}: {e}", e.status()))?;

    println!("  Anchor:          tile {}", set.anchor);
    println!("  Tiles:           {:?}", set.tiles);
    println!("  Total distance:  {}", set.total_distance);

    if anchor.is_none() {
        let candidates = rm.find_units_sets(cluster, num_tiles, &types)?;
        println!("  Candidates:");
        for c in &candidates {
            let marker = if c.anchor == set.anchor { "*" } else { " " };
            println!(
                "   {marker} anchor {:>3}  distance {:>3}  {:?}",
                c.anchor, c.total_distance, c.tiles,
            );
        }
    }

    if reserve {
        let reservation = rm.reserve_units_set(cluster, &set.tiles)?;
        println!();
        println!("  Reserved {}: {:?}", reservation.bounds, reservation.tiles);
        let fillers: Vec<_> = reservation.fillers().collect();
        if !fillers.is_empty() {
            println!("  Fillers (inside the bounding rectangle): {fillers:?}");
        }
        println!();
        super::status::print_snapshot(&rm.snapshot(cluster)?);
    }

    Ok(())
}
