//! Triangle collision primitive
//!
//! Provides the two tests the index needs from a face:
//! - Ray intersection (Möller-Trumbore, two-sided)
//! - Triangle/box overlap (separating axis theorem, 13 axes)

use crate::collider::Collider;
use crate::stats::RayStats;
use void_math::{consts::EPSILON, Vec3, AABB};

/// Immutable triangle stored as an apex plus two edge vectors
///
/// The edge form is what the ray test consumes directly, so it is computed
/// once at load time instead of on every query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    a: Vec3,
    edge1: Vec3,
    edge2: Vec3,
}

impl Triangle {
    /// Create from three vertices
    #[inline]
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            a,
            edge1: b - a,
            edge2: c - a,
        }
    }

    /// The three vertices in construction order
    #[inline]
    pub fn vertices(&self) -> [Vec3; 3] {
        [self.a, self.a + self.edge1, self.a + self.edge2]
    }

    /// Unnormalized face normal (`edge1 x edge2`)
    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.edge1.cross(self.edge2)
    }

    /// Ray intersection using Möller-Trumbore without backface culling
    ///
    /// Returns the hit distance clamped to `max_distance`, or `max_distance`
    /// on a miss. Hits closer than `EPSILON` to the origin are ignored.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> f32 {
        let h = direction.cross(self.edge2);
        let a = self.edge1.dot(h);

        // Ray is parallel to the triangle plane
        if a.abs() < EPSILON {
            return max_distance;
        }

        let f = 1.0 / a;
        let s = origin - self.a;
        let u = f * s.dot(h);

        if !(0.0..=1.0).contains(&u) {
            return max_distance;
        }

        let q = s.cross(self.edge1);
        let v = f * direction.dot(q);

        if v < 0.0 || u + v > 1.0 {
            return max_distance;
        }

        let t = f * self.edge2.dot(q);

        if t < EPSILON {
            return max_distance;
        }

        t.min(max_distance)
    }

    /// Triangle/box overlap using the separating axis theorem
    ///
    /// Candidate axes: the three box face normals, the triangle normal, and
    /// the nine cross products of triangle edges with box axes. Touching
    /// counts as overlap.
    pub fn overlaps_aabb(&self, aabb: &AABB) -> bool {
        let center = aabb.center();
        let h = aabb.half_extents();
        let [p0, p1, p2] = self.vertices();
        let v = [p0 - center, p1 - center, p2 - center];

        // Box face normals
        for axis in 0..3 {
            let lo = v[0][axis].min(v[1][axis]).min(v[2][axis]);
            let hi = v[0][axis].max(v[1][axis]).max(v[2][axis]);
            if lo > h[axis] || hi < -h[axis] {
                return false;
            }
        }

        // Triangle normal: distance from box center to the plane
        let normal = self.normal();
        let radius = h.dot(normal.abs());
        if normal.dot(v[0]).abs() > radius {
            return false;
        }

        // Edge x axis
        let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];
        for edge in edges {
            for box_axis in Vec3::AXES {
                let axis = box_axis.cross(edge);
                if separated_on_axis(axis, &v, h) {
                    return false;
                }
            }
        }

        true
    }
}

/// Project the recentered vertices and the box onto `axis`
///
/// A zero axis (edge parallel to a box axis) projects everything to zero and
/// never separates.
#[inline]
fn separated_on_axis(axis: Vec3, v: &[Vec3; 3], half_extents: Vec3) -> bool {
    let p0 = axis.dot(v[0]);
    let p1 = axis.dot(v[1]);
    let p2 = axis.dot(v[2]);
    let radius = half_extents.dot(axis.abs());
    p0.min(p1).min(p2) > radius || p0.max(p1).max(p2) < -radius
}

impl Collider for Triangle {
    fn bounds(&self) -> AABB {
        AABB::from_points(self.vertices())
    }

    #[inline]
    fn collide_with_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        stats: Option<&mut RayStats>,
    ) -> f32 {
        let t = self.intersect_ray(origin, direction, max_distance);
        if let Some(stats) = stats {
            stats.object_tests += 1;
            if t < max_distance {
                stats.hits += 1;
            }
        }
        t
    }

    #[inline]
    fn collide_with_aabb(&self, aabb: &AABB) -> bool {
        self.overlaps_aabb(aabb)
    }
}
