// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `fabric-rm alloc` command: run allocations against one memory bank.
//!
//! Each `--size` is allocated first-fit, in order. A failing request is
//! reported with its status code and the sequence continues.

use std::path::Path;
use tile_memory::ByteSize;

pub fn execute(config: Option<&Path>, cluster: usize, tile: usize, sizes: Vec<String>) -> anyhow::Result<()> {
    let mut rm = super::load_manager(config)?;
    let sizes = sizes
        .iter()
        .map(|s| ByteSize::parse(s))
        .collect::<Result<Vec<_>, _>>()?;

    println!("  {:<4} {:>10} {:>12}  {}", "#", "Size", "Address", "Result");
    println!("  {}", "-".repeat(50));

    for (i, size) in sizes.iter().enumerate() {
        match rm.find_memory(cluster, tile, size.as_bytes()) {
            Ok(addr) => println!("  {:<4} {:>10} {:>#12x}  OK", i, size.to_string(), addr),
            Err(e) => println!("  {:<4} {:>10} {:>12}  {} ({e})", i, size.to_string(), "-", e.status()),
        }
    }

    let bank = rm
        .tile(cluster, tile)?
        .memory()
        .ok_or(resource_manager::ResourceError::MemoryNotPresent { cluster, tile })?;
    println!();
    println!("  Free slots:");
    for slot in bank.slots() {
        println!(
            "   [{:#x}, {:#x})  {} bytes",
            slot.start_address,
            slot.end_exclusive(),
            slot.size,
        );
    }
    println!("  {}", bank.stats().summary());

    Ok(())
}
