//! # void_math - Geometry primitives for spatial queries
//!
//! Small, allocation-free math types shared by the line-of-sight index:
//! - [`Vec3`]: world positions and ray directions
//! - [`AABB`]: slab ray test, overlap test, quadrant/octant subdivision

pub mod vector;
pub mod bounds;

pub use vector::*;
pub use bounds::*;

/// Common math constants
pub mod consts {
    /// Tolerance for parallel-ray and behind-origin rejection
    pub const EPSILON: f32 = 1e-6;
}

pub mod prelude {
    pub use crate::vector::Vec3;
    pub use crate::bounds::AABB;
    pub use crate::consts::EPSILON;
}
