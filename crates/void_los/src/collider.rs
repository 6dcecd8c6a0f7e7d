//! The collider contract shared by primitives and trees

use crate::stats::RayStats;
use void_math::{Vec3, AABB};

/// Anything that can block a line-of-sight ray
///
/// Implemented by [`Triangle`](crate::Triangle) and by
/// [`SpatialTree`](crate::SpatialTree), so a tree can hold other trees.
pub trait Collider {
    /// Box enclosing every point of the collider
    fn bounds(&self) -> AABB;

    /// Distance along `direction` to the nearest hit
    ///
    /// `direction` is expected to be normalized. Returns `max_distance` when
    /// nothing is hit before it; a hit is never reported past `max_distance`.
    fn collide_with_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        stats: Option<&mut RayStats>,
    ) -> f32;

    /// Whether the collider overlaps `aabb` (used at insertion time)
    fn collide_with_aabb(&self, aabb: &AABB) -> bool;
}
