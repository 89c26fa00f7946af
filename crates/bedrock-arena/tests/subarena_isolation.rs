//! Integration test: sub-arena carving and isolation.
//!
//! A root reservation is carved into per-subsystem regions; each region
//! must budget, commit, and zero independently, without observable
//! effect on its siblings or its parent.

use bedrock_arena::{Arena, MemoryPlan, ARENA_HEADER_SIZE};
use bedrock_vm::align::{kib, mib};

#[test]
fn three_carves_commit_independently() {
    let mut root = Arena::reserve(mib(16));
    let mut platform = root.subarena(mib(1));
    let mut renderer = root.subarena(mib(4));
    let mut game = root.subarena(mib(8));

    // Carving commits nothing beyond the header blocks.
    assert_eq!(platform.committed(), 0);
    assert_eq!(renderer.committed(), 0);
    assert_eq!(game.committed(), 0);

    let (_, buf) = platform.push(kib(4));
    buf.fill(b'p');
    let (_, buf) = renderer.push(kib(64));
    buf.fill(b'r');
    let (_, buf) = game.push(kib(256));
    buf.fill(b'g');

    // Each region's commit cursor reflects only its own pushes.
    assert_eq!(platform.committed(), kib(4));
    assert_eq!(renderer.committed(), kib(64));
    assert_eq!(game.committed(), kib(256));
    assert_eq!(root.committed_bytes(), 0);

    // No cross-contamination between sibling regions.
    assert!(platform.slice(0, kib(4)).iter().all(|&b| b == b'p'));
    assert!(renderer.slice(0, kib(64)).iter().all(|&b| b == b'r'));
    assert!(game.slice(0, kib(256)).iter().all(|&b| b == b'g'));
}

#[test]
fn a_carve_reduces_the_parent_by_capacity_plus_overhead() {
    let mut root = Arena::reserve(mib(1));
    let before = root.remaining();
    root.subarena(kib(64));
    // Position was aligned, so the overhead is exactly the header block.
    assert_eq!(before - root.remaining(), kib(64) + ARENA_HEADER_SIZE);
}

#[test]
fn sibling_writes_never_leak_into_parent_pushes() {
    let mut root = Arena::reserve(mib(1));
    let (front, buf) = root.push(128);
    buf.fill(b'x');

    let mut child = root.subarena(kib(16));
    let (_, buf) = child.push(kib(16));
    buf.fill(0xFF);

    // Parent bytes on both sides of the carve are what the parent wrote.
    assert!(root.slice(front, 128).iter().all(|&b| b == b'x'));
    let (after, buf) = root.push(128);
    assert!(buf.iter().all(|&b| b == 0));
    assert!(root.slice(after, 128).iter().all(|&b| b == 0));
}

#[test]
fn carves_nest_to_arbitrary_depth() {
    let mut root = Arena::reserve(mib(4));
    let mut coarse = root.subarena(mib(2));
    let mut fine = coarse.subarena(mib(1));
    let mut finest = fine.subarena(kib(256));

    assert_eq!(root.depth(), 0);
    assert_eq!(coarse.depth(), 1);
    assert_eq!(fine.depth(), 2);
    assert_eq!(finest.depth(), 3);

    let (_, buf) = finest.push(kib(8));
    assert!(buf.iter().all(|&b| b == 0));
}

#[test]
fn a_planned_application_layout_carves_cleanly() {
    // The classic up-front application budget: one root reservation
    // split by subsystem, each handed its region at startup.
    let mut arenas = MemoryPlan::new()
        .region("files", mib(2))
        .region("network", kib(16))
        .region("textures", mib(8))
        .region("meshes", mib(4))
        .reserve();

    let mut textures = arenas.take("textures").unwrap();
    let mut network = arenas.take("network").unwrap();

    let (_, buf) = textures.push(mib(1));
    buf.fill(0xAA);
    let (_, buf) = network.push(kib(10));
    buf.fill(0xBB);

    assert!(textures.slice(0, mib(1)).iter().all(|&b| b == 0xAA));
    assert!(network.slice(0, kib(10)).iter().all(|&b| b == 0xBB));

    // Untaken regions are still there, in declaration order.
    let names: Vec<_> = arenas.names().collect();
    assert_eq!(names, ["files", "meshes"]);
}
