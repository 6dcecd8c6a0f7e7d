//! Void LOS - Line-of-sight spatial index
//!
//! Answers one question for game-server AI: does static zone geometry block
//! the straight segment between two points in a region?
//!
//! # Features
//!
//! - Per-zone quadtree or octree over triangle meshes
//! - Branch-and-bound ray queries with nearest-first child ordering
//! - Parallel region build, lock-free read-only queries
//! - Optional per-query profiling counters
//!
//! # Example
//!
//! ```ignore
//! use void_los::prelude::*;
//!
//! let config = LosConfig::load("los.toml")?;
//! let layout = ZoneLayout::load("zones.toml")?;
//! let los = LosCheckManager::initialize(&config, &layout);
//!
//! let from = Vec3::new(50.0, 50.0, 100.0);
//! let blocked = los.test_collision(1, from, Vec3::new(150.0, 50.0, 100.0), None);
//! ```

pub mod collider;
pub mod config;
pub mod error;
pub mod layout;
pub mod manager;
pub mod mesh;
pub mod stats;
pub mod tree;
pub mod triangle;

pub use collider::Collider;
pub use config::{GeometryConfig, LosConfig, QueryConfig, NEAR_CUTOFF, VISIBILITY_DISTANCE};
pub use error::{LosError, Result};
pub use layout::{RegionId, RegionLayout, ZoneEntry, ZoneId, ZoneLayout};
pub use manager::{BuildReport, LosCheckManager, ZoneTree};
pub use mesh::{FaceGroup, ZoneMesh};
pub use stats::RayStats;
pub use tree::{SpatialTree, TreeKind, TreeParams};
pub use triangle::Triangle;

pub mod prelude {
    //! Common imports for line-of-sight queries
    pub use crate::collider::Collider;
    pub use crate::config::LosConfig;
    pub use crate::error::{LosError, Result};
    pub use crate::layout::{RegionId, ZoneLayout};
    pub use crate::manager::LosCheckManager;
    pub use crate::stats::RayStats;
    pub use crate::tree::{SpatialTree, TreeParams};
    pub use crate::triangle::Triangle;
    pub use void_math::{Vec3, AABB};
}
