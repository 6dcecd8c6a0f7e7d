//! Line-of-sight index configuration
//!
//! # Example Config File
//!
//! ```toml
//! [geometry]
//! directory = "geometry/zones"
//! extension = "obj"
//! min_vertex_z = 0.0
//! max_vertex_z = 65530.0
//! z_padding = 500.0
//!
//! [tree]
//! kind = "quad"              # quad, oct
//! max_objects_per_node = 1000
//! max_level = 20
//! min_split_diagonal = 256.0
//!
//! [query]
//! near_cutoff = 32.0
//! visibility_distance = 3600.0
//! ```
//!
//! Every table and key is optional; missing values take the defaults above.

use crate::error::{LosError, Result};
use crate::layout::ZoneId;
use crate::tree::TreeParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Distance beyond which two points are never considered obstructed
pub const VISIBILITY_DISTANCE: f32 = 3600.0;

/// Distance below which two points are never considered obstructed
pub const NEAR_CUTOFF: f32 = 32.0;

/// Vertical padding added above and below a zone's mesh bounds
pub const DEFAULT_Z_PADDING: f32 = 500.0;

/// Highest vertex Z that still counts toward a zone's bounds
pub const MAX_VERTEX_Z: f32 = 65530.0;

/// Where zone meshes live and how their bounds are derived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Directory holding one mesh file per zone
    pub directory: PathBuf,
    /// Mesh file extension, without the dot
    pub extension: String,
    /// Vertices at or below this Z are ignored when computing bounds
    pub min_vertex_z: f32,
    /// Vertices above this Z are ignored when computing bounds
    pub max_vertex_z: f32,
    /// Added to both ends of the Z extent of every zone tree
    pub z_padding: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("geometry"),
            extension: "obj".to_string(),
            min_vertex_z: 0.0,
            max_vertex_z: MAX_VERTEX_Z,
            z_padding: DEFAULT_Z_PADDING,
        }
    }
}

impl GeometryConfig {
    /// Mesh file path for a zone: `<directory>/<zone id>.<extension>`
    pub fn zone_path(&self, zone: ZoneId) -> PathBuf {
        self.directory.join(format!("{}.{}", zone, self.extension))
    }
}

/// Distance short-circuits applied before any geometry is touched
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Point pairs closer than this always report clear
    pub near_cutoff: f32,
    /// Point pairs farther than this always report clear
    pub visibility_distance: f32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            near_cutoff: NEAR_CUTOFF,
            visibility_distance: VISIBILITY_DISTANCE,
        }
    }
}

/// Complete line-of-sight configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LosConfig {
    pub geometry: GeometryConfig,
    pub tree: TreeParams,
    pub query: QueryConfig,
}

impl LosConfig {
    /// Load and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| LosError::io(path, e))?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded LOS config from {:?}", path);
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the index cannot work with
    pub fn validate(&self) -> Result<()> {
        let geometry = &self.geometry;
        if geometry.extension.is_empty() {
            return Err(LosError::InvalidConfig("geometry.extension must not be empty".into()));
        }
        if !(geometry.min_vertex_z < geometry.max_vertex_z) {
            return Err(LosError::InvalidConfig(format!(
                "geometry.min_vertex_z ({}) must be below max_vertex_z ({})",
                geometry.min_vertex_z, geometry.max_vertex_z
            )));
        }
        if !(geometry.z_padding >= 0.0) {
            return Err(LosError::InvalidConfig("geometry.z_padding must be >= 0".into()));
        }
        if self.tree.max_objects_per_node == 0 {
            return Err(LosError::InvalidConfig("tree.max_objects_per_node must be >= 1".into()));
        }
        if !(self.tree.min_split_diagonal >= 0.0) {
            return Err(LosError::InvalidConfig("tree.min_split_diagonal must be >= 0".into()));
        }
        if !(self.query.near_cutoff >= 0.0) {
            return Err(LosError::InvalidConfig("query.near_cutoff must be >= 0".into()));
        }
        if !(self.query.near_cutoff < self.query.visibility_distance) {
            return Err(LosError::InvalidConfig(format!(
                "query.near_cutoff ({}) must be below visibility_distance ({})",
                self.query.near_cutoff, self.query.visibility_distance
            )));
        }
        Ok(())
    }

    /// Set the mesh directory
    pub fn with_geometry_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.geometry.directory = directory.into();
        self
    }

    /// Set the tree parameters
    pub fn with_tree_params(mut self, params: TreeParams) -> Self {
        self.tree = params;
        self
    }

    /// Set the far short-circuit distance
    pub fn with_visibility_distance(mut self, distance: f32) -> Self {
        self.query.visibility_distance = distance;
        self
    }
}
