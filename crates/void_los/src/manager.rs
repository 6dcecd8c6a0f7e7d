//! Region registry and the line-of-sight query
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               LosCheckManager                │
//! │   region 1 ─► [Some(tree), None, Some(tree)] │
//! │   region 2 ─► [Some(tree)]                   │
//! │   region 9 ─► []                             │
//! └──────────────────────────────────────────────┘
//!          ▲ built once (one rayon task per region)
//!          │
//!   ZoneLayout + LosConfig + <zone>.obj files
//! ```
//!
//! The registry is assembled after every region task has joined and never
//! changes afterwards, so queries take `&self` and need no locking.

use crate::config::{GeometryConfig, LosConfig, QueryConfig};
use crate::layout::{RegionId, RegionLayout, ZoneLayout};
use crate::mesh::ZoneMesh;
use crate::stats::RayStats;
use crate::tree::{SpatialTree, TreeParams};
use crate::triangle::Triangle;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use void_math::{consts::EPSILON, Vec3};

/// Collision tree for a single zone
pub type ZoneTree = SpatialTree<Triangle>;

/// Summary of an index build
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BuildReport {
    /// Regions registered
    pub regions: usize,
    /// Zone slots across all regions
    pub zones_requested: usize,
    /// Zone slots holding a tree
    pub zones_loaded: usize,
    /// Triangles stored across all trees
    pub triangles: usize,
    /// Tree nodes across all trees
    pub nodes: usize,
    pub elapsed: Duration,
}

impl BuildReport {
    fn tally(regions: &HashMap<RegionId, Vec<Option<ZoneTree>>>, elapsed: Duration) -> Self {
        let mut report = Self {
            regions: regions.len(),
            elapsed,
            ..Default::default()
        };
        for slots in regions.values() {
            report.zones_requested += slots.len();
            for tree in slots.iter().flatten() {
                report.zones_loaded += 1;
                report.triangles += tree.len();
                report.nodes += tree.node_count();
            }
        }
        report
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} regions, {}/{} zones loaded, {} triangles, {} nodes in {:.2?}",
            self.regions,
            self.zones_loaded,
            self.zones_requested,
            self.triangles,
            self.nodes,
            self.elapsed
        )
    }
}

/// Immutable per-region collection of zone collision trees
#[derive(Debug)]
pub struct LosCheckManager {
    query: QueryConfig,
    regions: HashMap<RegionId, Vec<Option<ZoneTree>>>,
    report: BuildReport,
}

impl LosCheckManager {
    /// Load every zone of every region in `layout` and publish the registry
    ///
    /// Regions are built in parallel; zones inside a region are built in
    /// layout order. A zone whose mesh is missing, empty or malformed gets a
    /// `None` slot and never blocks a query.
    pub fn initialize(config: &LosConfig, layout: &ZoneLayout) -> Self {
        let start = Instant::now();

        let regions: HashMap<RegionId, Vec<Option<ZoneTree>>> = layout
            .regions
            .par_iter()
            .map(|region| (region.id, build_region(region, &config.geometry, config.tree)))
            .collect();

        let report = BuildReport::tally(&regions, start.elapsed());
        log::info!("LOS index built: {}", report);

        Self {
            query: config.query,
            regions,
            report,
        }
    }

    /// Publish trees built by the caller
    pub fn from_regions(
        config: &LosConfig,
        regions: HashMap<RegionId, Vec<Option<ZoneTree>>>,
    ) -> Self {
        let report = BuildReport::tally(&regions, Duration::ZERO);
        Self {
            query: config.query,
            regions,
            report,
        }
    }

    /// Whether geometry blocks the segment from `origin` to `target`
    ///
    /// Always `false` for unknown regions and for point pairs closer than the
    /// near cutoff or farther than the visibility distance. Never allocates
    /// and never locks.
    pub fn test_collision(
        &self,
        region: RegionId,
        origin: Vec3,
        target: Vec3,
        mut stats: Option<&mut RayStats>,
    ) -> bool {
        let Some(trees) = self.regions.get(&region) else {
            return false;
        };

        let diff = target - origin;
        let length = diff.length();
        let distance = length + EPSILON;
        // Negated so a NaN distance also reports clear
        if !(distance >= self.query.near_cutoff && distance <= self.query.visibility_distance) {
            return false;
        }

        let direction = diff / length;
        trees.iter().flatten().any(|tree| {
            tree.collide_with_ray(origin, direction, distance, stats.as_deref_mut()) < distance
        })
    }

    /// Zone slots of a region, in layout order
    pub fn zone_trees(&self, region: RegionId) -> Option<&[Option<ZoneTree>]> {
        self.regions.get(&region).map(Vec::as_slice)
    }

    pub fn has_region(&self, region: RegionId) -> bool {
        self.regions.contains_key(&region)
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }
}

/// Build the zone slots of one region, sequentially
pub fn build_region(
    region: &RegionLayout,
    geometry: &GeometryConfig,
    params: TreeParams,
) -> Vec<Option<ZoneTree>> {
    region
        .zones
        .iter()
        .map(|zone| {
            let path = geometry.zone_path(zone.id);
            let mut mesh = match ZoneMesh::load(&path) {
                Ok(Some(mesh)) => mesh,
                Ok(None) => {
                    log::warn!("Region {} zone {}: no geometry at {:?}", region.id, zone.id, path);
                    return None;
                }
                Err(e) => {
                    log::warn!("Region {} zone {}: {}", region.id, zone.id, e);
                    return None;
                }
            };

            mesh.translate(zone.offset());
            let tree = build_zone_tree(&mesh, geometry, params);
            match &tree {
                Some(tree) => log::debug!(
                    "Region {} zone {}: {} triangles, {} nodes, depth {}",
                    region.id,
                    zone.id,
                    tree.len(),
                    tree.node_count(),
                    tree.depth()
                ),
                None => log::warn!(
                    "Region {} zone {}: mesh has no usable faces",
                    region.id,
                    zone.id
                ),
            }
            tree
        })
        .collect()
}

/// Build a zone tree over a mesh already in region coordinates
///
/// The tree box is the bounds of the vertices inside the configured Z
/// envelope, padded by `z_padding` above and below. Returns `None` when the
/// mesh has no faces or no vertex inside the envelope.
pub fn build_zone_tree(
    mesh: &ZoneMesh,
    geometry: &GeometryConfig,
    params: TreeParams,
) -> Option<ZoneTree> {
    if mesh.is_empty() {
        return None;
    }

    let bounds = mesh
        .bounds_within(geometry.min_vertex_z, geometry.max_vertex_z)?
        .pad(Vec3::new(0.0, 0.0, geometry.z_padding));

    let mut tree = SpatialTree::new(bounds, params);
    let accepted = tree.add_objects(mesh.triangles());
    let rejected = mesh.face_count() - accepted;
    if rejected > 0 {
        log::debug!("{} triangles fall outside the zone bounds and were dropped", rejected);
    }
    Some(tree)
}
