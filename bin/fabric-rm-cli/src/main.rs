// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # fabric-rm
//!
//! Command-line interface for the tile fabric resource manager.
//!
//! ## Usage
//! ```bash
//! # Show the grid, unit types and memory banks
//! fabric-rm inspect --config ./fabric.toml
//!
//! # Resource status of every cluster, as text or JSON
//! fabric-rm status --json
//!
//! # Find (and optionally reserve) a tile set
//! fabric-rm place --types GN,GN,CPU --reserve
//!
//! # Reserve bandwidth on one router port
//! fabric-rm port --tile 3 --port east --reserve 25
//!
//! # Run a sequence of allocations on one tile's bank
//! fabric-rm alloc --tile 0 --size 512K --size 512K --size 1
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fabric-rm",
    about = "Resource manager for tiled heterogeneous compute fabrics",
    version,
    author
)]
struct Cli {
    /// Path to a TOML (or .json) topology file. Uses the built-in default
    /// topology when omitted.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the topology: grid layout, unit types and memory banks.
    Inspect {
        /// Print the resolved topology as TOML instead.
        #[arg(long)]
        dump: bool,
    },

    /// Display the resource status of every cluster.
    Status {
        /// Emit JSON snapshots instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Search for a tile set of the given unit types.
    Place {
        /// Cluster to place on.
        #[arg(long, default_value_t = 0)]
        cluster: usize,

        /// Comma-separated unit types, e.g. "GN,GN,CPU".
        #[arg(short, long, value_delimiter = ',', required = true)]
        types: Vec<String>,

        /// Number of tiles to place (defaults to the number of types).
        #[arg(short, long)]
        num_tiles: Option<usize>,

        /// Search from this anchor tile only.
        #[arg(long)]
        anchor: Option<usize>,

        /// Reserve the best set and show the resulting state.
        #[arg(long)]
        reserve: bool,
    },

    /// Show, reserve or release bandwidth on one router port.
    Port {
        /// Cluster of the tile.
        #[arg(long, default_value_t = 0)]
        cluster: usize,

        /// Tile owning the port.
        #[arg(long)]
        tile: usize,

        /// Port name: north, east, west, south or local (or N/E/W/S/L).
        #[arg(short, long)]
        port: String,

        /// Bandwidth to reserve.
        #[arg(long)]
        reserve: Option<u64>,

        /// Bandwidth to release (after any reservation).
        #[arg(long)]
        release: Option<u64>,
    },

    /// Allocate memory on one tile's bank, in order.
    Alloc {
        /// Cluster of the tile.
        #[arg(long, default_value_t = 0)]
        cluster: usize,

        /// Tile whose bank to allocate from.
        #[arg(long)]
        tile: usize,

        /// Allocation size (e.g., "512K", "1M", "64"). Repeat for a sequence.
        #[arg(short, long, required = true)]
        size: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Inspect { dump } => commands::inspect::execute(config, dump),
        Commands::Status { json } => commands::status::execute(config, json),
        Commands::Place {
            cluster,
            types,
            num_tiles,
            anchor,
            reserve,
        } => commands::place::execute(config, cluster, types, num_tiles, anchor, reserve),
        Commands::Port {
            cluster,
            tile,
            port,
            reserve,
            release,
        } => commands::port::execute(config, cluster, tile, &port, reserve, release),
        Commands::Alloc {
            cluster,
            tile,
            size,
        } => commands::alloc::execute(config, cluster, tile, size),
    }
}
