// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and the helpers they share.

pub mod alloc;
pub mod inspect;
pub mod place;
pub mod port;
pub mod status;

use anyhow::Context;
use fabric_topology::{FabricConfig, Port, UnitType};
use resource_manager::ResourceManager;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// The configured topology, or the default one.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<FabricConfig> {
    match path {
        Some(p) => FabricConfig::from_file(p)
            .with_context(|| format!("failed to load topology from '{}'", p.display())),
        None => {
            tracing::info!("no --config given, using the default topology");
            Ok(FabricConfig::default())
        }
    }
}

pub fn load_manager(path: Option<&Path>) -> anyhow::Result<ResourceManager> {
    let config = load_config(path)?;
    ResourceManager::new(&config).context("invalid topology")
}

/// Parses unit type names such as `GN` or `cpu`.
pub fn parse_types(names: &[String]) -> anyhow::Result<Vec<UnitType>> {
    names
        .iter()
        .map(|n| {
            UnitType::from_str_loose(n)
                .with_context(|| format!("unknown unit type '{n}' (expected NONE, GN, CPU, GPU or FPGA)"))
        })
        .collect()
}

/// Parses a router port name such as `east` or `N`.
pub fn parse_port(name: &str) -> anyhow::Result<Port> {
    Port::from_str_loose(name).with_context(|| {
        format!("unknown port '{name}' (expected north, east, west, south or local)")
    })
}

const BAR_WIDTH: usize = 20;

/// Fill symbol per utilisation floor, highest first.
const BAR_LEVELS: [(f64, char); 3] = [(0.9, '#'), (0.7, '='), (0.0, '-')];

/// Renders a utilisation ratio as a fixed-width bar; out-of-range ratios
/// are clamped.
pub fn usage_bar(ratio: f64) -> String {
    let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
    let fill = BAR_LEVELS
        .iter()
        .find(|(floor, _)| ratio >= *floor)
        .map_or('-', |&(_, c)| c);
    let filled = (ratio * BAR_WIDTH as f64).round() as usize;
    let bar: String = (0..BAR_WIDTH)
        .map(|i| if i < filled { fill } else { '.' })
        .collect();
    format!("[{bar}]")
}
