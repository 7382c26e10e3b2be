// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: end-to-end resource management scenarios.
//!
//! These tests drive the public API the way a scheduler would: load a
//! topology, place a tile set, give it memory and a network path, then tear
//! everything down and check the fabric is back where it started.

use fabric_topology::{Access, FabricConfig, Port, TileOverride, UnitType};
use resource_manager::{ResourceManager, Status, TileLocation};

// ── Helpers ────────────────────────────────────────────────────

const KB: u64 = 1024;

fn default_manager() -> ResourceManager {
    ResourceManager::with_default_topology().unwrap()
}

/// Every channel of cluster 0 as `(available, capacity)`, plus assigned flags.
fn fingerprint(rm: &ResourceManager) -> Vec<(u64, u64, bool)> {
    let snap = rm.snapshot(0).unwrap();
    let mut out = vec![
        (snap.read_link.available(), snap.read_link.capacity(), false),
        (snap.write_link.available(), snap.write_link.capacity(), false),
    ];
    for t in &snap.tiles {
        out.push((t.free_memory, t.memory_size, t.assigned));
        out.push((t.read_memory.available(), t.read_memory.capacity(), t.assigned));
        out.push((t.write_memory.available(), t.write_memory.capacity(), t.assigned));
        for p in &t.ports {
            out.push((p.channel.available(), p.channel.capacity(), t.assigned));
        }
    }
    out
}

// ── Scenarios ──────────────────────────────────────────────────

#[test]
fn test_corner_bank_fills_up() {
    let mut rm = default_manager();

    assert_eq!(rm.find_memory(0, 0, 512 * KB).unwrap(), 0);
    assert_eq!(rm.find_memory(0, 0, 512 * KB).unwrap(), 524288);

    let err = rm.find_memory(0, 0, 1).unwrap_err();
    assert_eq!(err.status(), Status::NotEnoughMemory);
}

#[test]
fn test_single_gn_placement() {
    let rm = default_manager();
    let set = rm.find_units_set(0, 1, &[UnitType::Gn]).unwrap();
    assert_eq!(set.total_distance, 0);
    assert_eq!(set.tiles, vec![set.anchor]);
    assert!(rm.tile(0, set.anchor).unwrap().has_memory());
}

#[test]
fn test_square_reserve_release_restores_ports() {
    let mut rm = default_manager();
    let before = fingerprint(&rm);

    let tiles = [7, 8, 12, 13];
    let reservation = rm.reserve_units_set(0, &tiles).unwrap();
    assert_eq!(reservation.tiles, vec![7, 8, 12, 13]);
    assert_eq!(rm.available_port_bandwidth(0, 8, Port::East).unwrap(), 0);
    assert_eq!(rm.available_port_bandwidth(0, 9, Port::West).unwrap(), 0);

    rm.release_units_set(0, &tiles).unwrap();
    for t in tiles {
        assert!(!rm.tile(0, t).unwrap().is_assigned());
    }
    assert_eq!(fingerprint(&rm), before);
}

#[test]
fn test_full_workload_lifecycle() {
    let mut config = FabricConfig::default();
    config.clusters[0].tiles.push(TileOverride {
        id: 6,
        unit_type: Some(UnitType::Cpu),
        ..Default::default()
    });
    let mut rm = ResourceManager::new(&config).unwrap();
    let before = fingerprint(&rm);

    // Place a CPU next to a memory-bearing GN.
    let types = [UnitType::Cpu, UnitType::Gn];
    let set = rm.find_units_set(0, 2, &types).unwrap();
    assert_eq!(set.tiles, vec![6, 0]);
    let reservation = rm.reserve_units_set(0, &set.tiles).unwrap();
    assert_eq!(reservation.fillers().collect::<Vec<_>>(), vec![1, 5]);

    // Buffers and bandwidth for it.
    let addr = rm.find_memory(0, set.anchor, 256 * KB).unwrap();
    rm.reserve_memory_bandwidth(0, set.anchor, Access::Read, 50).unwrap();
    rm.reserve_cluster_bandwidth(0, Access::Read, 400).unwrap();
    let (a, b) = (TileLocation::new(0, 0), TileLocation::new(0, 6));
    rm.reserve_network_bandwidth(a, b, 30).unwrap();
    assert_eq!(rm.get_available_network_bandwidth(a, b).unwrap(), 70);

    // Tear down in reverse.
    rm.release_network_bandwidth(a, b, 30).unwrap();
    rm.release_cluster_bandwidth(0, Access::Read, 400).unwrap();
    rm.release_memory_bandwidth(0, set.anchor, Access::Read, 50).unwrap();
    rm.release_memory(0, set.anchor, addr, 256 * KB).unwrap();
    rm.release_units_set(0, &set.tiles).unwrap();

    assert_eq!(fingerprint(&rm), before);
}

// ── Properties ─────────────────────────────────────────────────

#[test]
fn test_allocator_round_trip_any_order() {
    let mut rm = default_manager();
    let sizes = [64 * KB, 1, 100 * KB, 3, 200 * KB, 4 * KB];
    let allocs: Vec<(u64, u64)> = sizes
        .iter()
        .map(|&s| (rm.find_memory(0, 19, s).unwrap(), s))
        .collect();

    // Release interleaved: odd indices first, then even in reverse.
    let order = [1, 3, 5, 4, 2, 0];
    for i in order {
        let (addr, size) = allocs[i];
        rm.release_memory(0, 19, addr, size).unwrap();
    }

    let bank = rm.tile(0, 19).unwrap().memory().unwrap();
    assert_eq!(bank.num_slots(), 1);
    assert_eq!(bank.free_bytes(), 1024 * KB);
    bank.validate().unwrap();
}

#[test]
fn test_path_reservation_is_all_or_nothing() {
    let mut rm = default_manager();
    let (src, dst) = (TileLocation::new(0, 0), TileLocation::new(0, 19));
    let hops = rm.route(0, 0, 19).unwrap();

    // Squeeze one hop in the middle of the route.
    let mid = hops[hops.len() / 2];
    rm.reserve_port_bandwidth(0, mid.tile, mid.port, 95).unwrap();
    let before = fingerprint(&rm);

    let err = rm.reserve_network_bandwidth(src, dst, 10).unwrap_err();
    assert_eq!(err.status(), Status::NotEnoughBandwidthAvailable);
    assert_eq!(fingerprint(&rm), before);

    rm.reserve_network_bandwidth(src, dst, 5).unwrap();
    assert_eq!(rm.get_available_network_bandwidth(src, dst).unwrap(), 0);
}

#[test]
fn test_search_is_deterministic() {
    let rm = default_manager();
    let before = fingerprint(&rm);
    let types = [UnitType::Gn; 6];
    let runs: Vec<_> = (0..5).map(|_| rm.find_units_sets(0, 6, &types).unwrap()).collect();
    assert!(runs.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(fingerprint(&rm), before);
}

#[test]
fn test_independent_managers() {
    let mut a = default_manager();
    let b = default_manager();
    a.reserve_units_set(0, &[0]).unwrap();
    assert!(a.tile(0, 0).unwrap().is_assigned());
    assert!(!b.tile(0, 0).unwrap().is_assigned());
}

#[test]
fn test_status_codes_across_operations() {
    let mut rm = default_manager();
    let cases = [
        (rm.find_memory(9, 0, 1).unwrap_err().status(), Status::ClusterNotFound),
        (rm.find_memory(0, 99, 1).unwrap_err().status(), Status::TileNotFound),
        (rm.find_memory(0, 2, 1).unwrap_err().status(), Status::MemoryNotPresent),
        (rm.allocate_memory(0, 0, 7, 1).unwrap_err().status(), Status::FindMemoryError),
        (
            rm.reserve_port_bandwidth(0, 0, Port::Local, 101).unwrap_err().status(),
            Status::NotEnoughBandwidthAvailable,
        ),
        (
            rm.release_port_bandwidth(0, 0, Port::Local, 1).unwrap_err().status(),
            Status::WrongBandwidthSetting,
        ),
        (
            rm.find_units_set(0, 1, &[UnitType::Gpu]).unwrap_err().status(),
            Status::PartitionNotFound,
        ),
    ];
    for (got, want) in cases {
        assert_eq!(got, want);
    }
}

#[test]
fn test_topology_from_toml() {
    let toml = r#"
        [[clusters]]
        num_rows = 2
        num_cols = 3

        [clusters.defaults]
        unit_type = "CPU"

        [[clusters.tiles]]
        id = 5
        unit_type = "FPGA"
        memory_size = "64K"
    "#;
    let config = FabricConfig::from_toml(toml).unwrap();
    let mut rm = ResourceManager::new(&config).unwrap();

    let set = rm.find_units_set(0, 2, &[UnitType::Fpga, UnitType::Cpu]).unwrap();
    assert_eq!(set.anchor, 5);
    assert_eq!(set.tiles, vec![5, 2]);
    assert_eq!(rm.find_memory(0, 5, 64 * KB).unwrap(), 0);
}
