//! Region and zone layout
//!
//! Tells the index which zones make up each region, and where each zone's
//! mesh sits inside the region's coordinate space.
//!
//! ```toml
//! [[regions]]
//! id = 1
//! zones = [
//!     { id = 0 },
//!     { id = 1, offset = [65536.0, 0.0, 0.0] },
//! ]
//!
//! [[regions]]
//! id = 27
//! zones = []   # registered, but never blocks anything
//! ```

use crate::error::{LosError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use void_math::Vec3;

/// Identifier of a top-level world partition
pub type RegionId = u16;

/// Identifier of a zone; also names its mesh file
pub type ZoneId = u16;

/// One zone of a region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneEntry {
    pub id: ZoneId,
    /// Added to every vertex of the zone mesh at load time
    #[serde(default)]
    pub offset: [f32; 3],
}

impl ZoneEntry {
    pub const fn new(id: ZoneId) -> Self {
        Self {
            id,
            offset: [0.0; 3],
        }
    }

    pub fn with_offset(mut self, offset: [f32; 3]) -> Self {
        self.offset = offset;
        self
    }

    #[inline]
    pub fn offset(&self) -> Vec3 {
        Vec3::from_array(self.offset)
    }
}

/// A region and its zones, in query order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionLayout {
    pub id: RegionId,
    #[serde(default)]
    pub zones: Vec<ZoneEntry>,
}

impl RegionLayout {
    pub fn new(id: RegionId) -> Self {
        Self {
            id,
            zones: Vec::new(),
        }
    }

    pub fn with_zone(mut self, zone: ZoneEntry) -> Self {
        self.zones.push(zone);
        self
    }
}

/// Every region the index should build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneLayout {
    #[serde(default)]
    pub regions: Vec<RegionLayout>,
}

impl ZoneLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a TOML layout file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| LosError::io(path, e))?;
        let layout = Self::from_toml_str(&content)?;
        log::info!(
            "Loaded zone layout from {:?}: {} regions, {} zones",
            path,
            layout.regions.len(),
            layout.zone_count()
        );
        Ok(layout)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let layout: Self = toml::from_str(content)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Region ids must be unique
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.regions.len());
        for region in &self.regions {
            if !seen.insert(region.id) {
                return Err(LosError::InvalidConfig(format!(
                    "region {} listed more than once",
                    region.id
                )));
            }
        }
        Ok(())
    }

    pub fn with_region(mut self, region: RegionLayout) -> Self {
        self.regions.push(region);
        self
    }

    pub fn region(&self, id: RegionId) -> Option<&RegionLayout> {
        self.regions.iter().find(|region| region.id == id)
    }

    /// Zones across all regions
    pub fn zone_count(&self) -> usize {
        self.regions.iter().map(|region| region.zones.len()).sum()
    }
}
