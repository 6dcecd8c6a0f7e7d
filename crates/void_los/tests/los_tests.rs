//! Invariant tests for void_los
//!
//! These tests build the index from mesh files on disk and check the query
//! contract end to end.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use approx::assert_relative_eq;
use tempfile::TempDir;
use void_los::*;
use void_math::Vec3;

/// Single triangle in the plane x = 100 covering (y = 50, z = 100)
const WALL: &str = "\
# test wall
v 100 0 10
v 100 100 10
v 100 50 200
g wall
f 1 2 3
";

fn write_zone(dir: &Path, zone: ZoneId, contents: &str) {
    std::fs::write(dir.join(format!("{}.obj", zone)), contents).unwrap();
}

fn geometry_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn single_zone_layout(region: RegionId, zone: ZoneId) -> ZoneLayout {
    ZoneLayout::new().with_region(RegionLayout::new(region).with_zone(ZoneEntry::new(zone)))
}

fn from() -> Vec3 {
    Vec3::new(50.0, 50.0, 100.0)
}

/// INVARIANT: A wall between two points blocks; a segment stopping short does not
#[test]
fn invariant_wall_blocks_line_of_sight() {
    let dir = geometry_dir();
    write_zone(dir.path(), 0, WALL);
    let config = LosConfig::default().with_geometry_dir(dir.path());
    let los = LosCheckManager::initialize(&config, &single_zone_layout(1, 0));

    assert!(los.test_collision(1, from(), Vec3::new(150.0, 50.0, 100.0), None));
    assert!(!los.test_collision(1, from(), Vec3::new(80.0, 50.0, 100.0), None));
    // Both faces block
    assert!(los.test_collision(1, Vec3::new(150.0, 50.0, 100.0), from(), None));
}

/// INVARIANT: A wall with its base at ground level still blocks, even though
/// vertices at z = 0 are left out of the zone bounds
#[test]
fn invariant_ground_level_wall_blocks() {
    let dir = geometry_dir();
    write_zone(
        dir.path(),
        0,
        "\
v 100 0 0
v 100 100 0
v 100 50 200
f 1 2 3
",
    );
    let config = LosConfig::default().with_geometry_dir(dir.path());
    let los = LosCheckManager::initialize(&config, &single_zone_layout(1, 0));

    let tree = los.zone_trees(1).unwrap()[0].as_ref().unwrap();
    assert_eq!(tree.bounds().min.y, 50.0);
    assert_eq!(tree.bounds().max.y, 50.0);

    assert!(los.test_collision(1, from(), Vec3::new(150.0, 50.0, 100.0), None));
    assert!(!los.test_collision(1, from(), Vec3::new(80.0, 50.0, 100.0), None));
}

/// INVARIANT: A segment running exactly along a tree split plane still sees
/// the geometry on both sides of it
#[test]
fn invariant_split_plane_segment_blocked() {
    let dir = geometry_dir();
    write_zone(
        dir.path(),
        0,
        "\
g floor
v 0 0 10
v 1000 0 10
v 1000 1000 10
v 0 1000 10
f 1 2 3 4
g wall
v 700 200 10
v 700 800 10
v 700 800 400
v 700 200 400
f 5 6 7 8
",
    );
    let params = TreeParams::default().with_max_objects_per_node(1).with_max_level(1);
    let config = LosConfig::default()
        .with_geometry_dir(dir.path())
        .with_tree_params(params);
    let los = LosCheckManager::initialize(&config, &single_zone_layout(1, 0));
    assert_eq!(los.report().nodes, 5);

    // y = 500 is the split plane of the root
    for y in [500.0, 501.0] {
        let origin = Vec3::new(100.0, y, 150.0);
        assert!(
            los.test_collision(1, origin, Vec3::new(900.0, y, 150.0), None),
            "wall missed at y = {}",
            y
        );
    }
}

/// INVARIANT: Points closer than the near cutoff are never obstructed
#[test]
fn invariant_near_points_always_clear() {
    let dir = geometry_dir();
    write_zone(dir.path(), 0, WALL);
    let config = LosConfig::default().with_geometry_dir(dir.path());
    let los = LosCheckManager::initialize(&config, &single_zone_layout(1, 0));

    let mut stats = RayStats::new();
    let blocked = los.test_collision(
        1,
        Vec3::new(90.0, 50.0, 100.0),
        Vec3::new(120.0, 50.0, 100.0),
        Some(&mut stats),
    );
    assert!(!blocked, "30 units apart, through the wall");
    assert_eq!(stats.box_tests, 0, "geometry must not be touched");
}

/// INVARIANT: Points beyond the visibility distance are never obstructed
#[test]
fn invariant_far_points_always_clear() {
    let dir = geometry_dir();
    write_zone(dir.path(), 0, WALL);
    let layout = single_zone_layout(1, 0);
    let far = Vec3::new(3700.0, 50.0, 100.0);

    let config = LosConfig::default().with_geometry_dir(dir.path());
    let los = LosCheckManager::initialize(&config, &layout);
    assert!(!los.test_collision(1, from(), far, None));

    // Same geometry, longer visibility: now the wall counts
    let config = config.with_visibility_distance(5000.0);
    let los = LosCheckManager::initialize(&config, &layout);
    assert!(los.test_collision(1, from(), far, None));
}

/// INVARIANT: Regions without geometry never block
#[test]
fn invariant_unknown_and_empty_regions_clear() {
    let dir = geometry_dir();
    write_zone(dir.path(), 0, WALL);
    let layout = single_zone_layout(1, 0).with_region(RegionLayout::new(2));
    let config = LosConfig::default().with_geometry_dir(dir.path());
    let los = LosCheckManager::initialize(&config, &layout);

    let to = Vec3::new(150.0, 50.0, 100.0);
    assert!(los.has_region(2));
    assert_eq!(los.zone_trees(2).map(<[_]>::len), Some(0));
    assert!(!los.test_collision(2, from(), to, None));

    assert!(!los.has_region(3));
    assert!(!los.test_collision(3, from(), to, None));
}

/// INVARIANT: Missing or malformed zone files degrade to empty slots
#[test]
fn invariant_bad_zones_do_not_abort_build() {
    let dir = geometry_dir();
    write_zone(dir.path(), 0, "v 0 0 1\nf 1 2 3\n");
    write_zone(dir.path(), 2, WALL);
    let layout = ZoneLayout::new().with_region(
        RegionLayout::new(1)
            .with_zone(ZoneEntry::new(0))
            .with_zone(ZoneEntry::new(1))
            .with_zone(ZoneEntry::new(2)),
    );
    let config = LosConfig::default().with_geometry_dir(dir.path());
    let los = LosCheckManager::initialize(&config, &layout);

    let slots = los.zone_trees(1).unwrap();
    assert_eq!(slots.len(), 3);
    assert!(slots[0].is_none(), "malformed mesh");
    assert!(slots[1].is_none(), "missing mesh");
    assert!(slots[2].is_some());

    let report = los.report();
    assert_eq!(report.zones_requested, 3);
    assert_eq!(report.zones_loaded, 1);
    assert!(los.test_collision(1, from(), Vec3::new(150.0, 50.0, 100.0), None));
}

/// INVARIANT: Repeated queries return the same answer
#[test]
fn invariant_queries_are_idempotent() {
    let dir = geometry_dir();
    write_zone(dir.path(), 0, WALL);
    let config = LosConfig::default().with_geometry_dir(dir.path());
    let los = LosCheckManager::initialize(&config, &single_zone_layout(1, 0));

    let blocked = Vec3::new(150.0, 50.0, 100.0);
    let clear = Vec3::new(50.0, 50.0, 180.0);
    for _ in 0..100 {
        assert!(los.test_collision(1, from(), blocked, None));
        assert!(!los.test_collision(1, from(), clear, None));
    }
}

/// INVARIANT: Concurrent readers see the same results as a single reader
#[test]
fn invariant_shared_across_threads() {
    let dir = geometry_dir();
    write_zone(dir.path(), 0, WALL);
    let config = LosConfig::default().with_geometry_dir(dir.path());
    let los = Arc::new(LosCheckManager::initialize(&config, &single_zone_layout(1, 0)));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let los = Arc::clone(&los);
            thread::spawn(move || {
                (0..250).all(|_| {
                    los.test_collision(1, from(), Vec3::new(150.0, 50.0, 100.0), None)
                        && !los.test_collision(1, from(), Vec3::new(80.0, 50.0, 100.0), None)
                })
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

/// Zone offsets move the mesh into region coordinates
#[test]
fn test_zone_offset_applied() {
    let dir = geometry_dir();
    write_zone(dir.path(), 4, WALL);
    let zone = ZoneEntry::new(4).with_offset([1000.0, 0.0, 0.0]);
    let layout = ZoneLayout::new().with_region(RegionLayout::new(1).with_zone(zone));
    let config = LosConfig::default().with_geometry_dir(dir.path());
    let los = LosCheckManager::initialize(&config, &layout);

    assert!(!los.test_collision(1, from(), Vec3::new(150.0, 50.0, 100.0), None));
    assert!(los.test_collision(
        1,
        Vec3::new(1050.0, 50.0, 100.0),
        Vec3::new(1150.0, 50.0, 100.0),
        None
    ));
}

/// Vertices at or below z = 0 do not shape the bounds, but padding keeps
/// geometry just below ground queryable
#[test]
fn test_vertical_envelope_and_padding() {
    let dir = geometry_dir();
    write_zone(
        dir.path(),
        0,
        "\
g floor
v 0 0 10
v 200 0 10
v 0 200 10
f 1 2 3
g cellar_wall
v 100 0 -400
v 100 100 -400
v 100 50 300
f 4 5 6
",
    );
    let config = LosConfig::default().with_geometry_dir(dir.path());
    let los = LosCheckManager::initialize(&config, &single_zone_layout(1, 0));

    let tree = los.zone_trees(1).unwrap()[0].as_ref().unwrap();
    assert_relative_eq!(tree.bounds().min.z, -490.0);
    assert_relative_eq!(tree.bounds().max.z, 800.0);
    assert_eq!(tree.len(), 2);

    assert!(los.test_collision(
        1,
        Vec3::new(50.0, 50.0, -300.0),
        Vec3::new(150.0, 50.0, -300.0),
        None
    ));
}

/// A triangle straddling a split plane blocks rays on either side of it
#[test]
fn test_split_tree_end_to_end() {
    let dir = geometry_dir();
    write_zone(
        dir.path(),
        0,
        "\
g floor
v 0 0 10
v 1000 0 10
v 1000 1000 10
v 0 1000 10
f 1 2 3 4
g wall
v 300 0 10
v 300 1000 10
v 300 1000 400
v 300 0 400
f 5 6 7 8
",
    );
    let params = TreeParams::default().with_max_objects_per_node(1).with_max_level(3);
    let config = LosConfig::default()
        .with_geometry_dir(dir.path())
        .with_tree_params(params);
    let los = LosCheckManager::initialize(&config, &single_zone_layout(1, 0));

    let tree = los.zone_trees(1).unwrap()[0].as_ref().unwrap();
    assert!(tree.node_count() > 1);
    assert_eq!(tree.len(), 4);

    for y in [250.0, 750.0] {
        assert!(
            los.test_collision(1, Vec3::new(250.0, y, 200.0), Vec3::new(350.0, y, 200.0), None),
            "wall missed at y = {}",
            y
        );
        let behind = Vec3::new(350.0, y, 200.0);
        assert!(!los.test_collision(1, behind, Vec3::new(450.0, y, 200.0), None));
    }

    let hit = tree.collide_with_ray(Vec3::new(250.0, 250.0, 200.0), Vec3::X, 100.0, None);
    assert_relative_eq!(hit, 50.0, epsilon = 1e-3);
}

/// Every region of the layout is built, each from its own zones
#[test]
fn test_parallel_build_of_many_regions() {
    let dir = geometry_dir();
    let mut layout = ZoneLayout::new();
    for region in 0..8u16 {
        write_zone(dir.path(), region, WALL);
        layout = layout.with_region(RegionLayout::new(region).with_zone(ZoneEntry::new(region)));
    }
    let config = LosConfig::default().with_geometry_dir(dir.path());
    let los = LosCheckManager::initialize(&config, &layout);

    assert_eq!(los.region_count(), 8);
    assert_eq!(los.report().zones_loaded, 8);
    assert_eq!(los.report().triangles, 8);
    for region in 0..8u16 {
        assert!(los.test_collision(region, from(), Vec3::new(150.0, 50.0, 100.0), None));
    }
}

/// Config and layout files load from disk
#[test]
fn test_load_config_and_layout_files() {
    let dir = geometry_dir();
    write_zone(dir.path(), 7, WALL);

    let config_path = dir.path().join("los.toml");
    std::fs::write(
        &config_path,
        format!("[geometry]\ndirectory = {:?}\n\n[tree]\nkind = \"oct\"\n", dir.path()),
    )
    .unwrap();
    let layout_path = dir.path().join("zones.toml");
    std::fs::write(&layout_path, "[[regions]]\nid = 3\nzones = [{ id = 7 }]\n").unwrap();

    let config = LosConfig::load(&config_path).unwrap();
    let layout = ZoneLayout::load(&layout_path).unwrap();
    assert_eq!(config.tree.kind, TreeKind::Oct);

    let los = LosCheckManager::initialize(&config, &layout);
    assert!(los.test_collision(3, from(), Vec3::new(150.0, 50.0, 100.0), None));

    let missing = LosConfig::load(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(missing, LosError::Io { .. }));
}
