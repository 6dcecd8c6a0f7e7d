//! Axis-aligned bounding boxes for spatial partitioning and ray culling

use crate::vector::Vec3;

/// Axis-Aligned Bounding Box
///
/// Boxes used as tree bounds always satisfy `min <= max` on every axis.
/// [`AABB::EMPTY`] is the inverted identity used while accumulating points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    /// Create an empty (inverted) AABB
    pub const EMPTY: Self = Self {
        min: Vec3::new(f32::MAX, f32::MAX, f32::MAX),
        max: Vec3::new(f32::MIN, f32::MIN, f32::MIN),
    };

    /// Create from min and max points
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create from a set of points
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        points
            .into_iter()
            .fold(Self::EMPTY, |aabb, point| aabb.expand_to_include(point))
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Length of the min-to-max diagonal
    #[inline]
    pub fn diagonal(&self) -> f32 {
        self.size().length()
    }

    /// Check if the AABB is empty (inverted on any axis)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand to include a point
    #[inline]
    pub fn expand_to_include(self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Grow by a per-axis amount on both sides
    #[inline]
    pub fn pad(&self, amount: Vec3) -> Self {
        Self {
            min: self.min - amount,
            max: self.max + amount,
        }
    }

    /// Check if a point is inside (bounds inclusive)
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if two AABBs overlap (bounds inclusive, symmetric)
    #[inline]
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Slab test against a ray
    ///
    /// Returns the distance along `direction` to the box, `0.0` when `origin`
    /// is already inside, and `max_distance` when the box is missed or lies
    /// behind the origin. Hits are clamped to `max_distance`, so callers can
    /// compare the result against their current cutoff directly.
    pub fn collide_with_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> f32 {
        if self.contains_point(origin) {
            return 0.0;
        }

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let (lo, hi, o, d) = (self.min[axis], self.max[axis], origin[axis], direction[axis]);

            // Parallel to this slab: inside it (faces included) or a miss
            if d == 0.0 {
                if o < lo || o > hi {
                    return max_distance;
                }
                continue;
            }

            let inv = 1.0 / d;
            let (near, far) = {
                let (a, b) = ((lo - o) * inv, (hi - o) * inv);
                if a <= b { (a, b) } else { (b, a) }
            };
            t_min = t_min.max(near);
            t_max = t_max.min(far);
            if t_min > t_max {
                return max_distance;
            }
        }

        // Box lies behind the origin
        if t_max < 0.0 {
            return max_distance;
        }

        let t = if t_min >= 0.0 { t_min } else { t_max };
        t.min(max_distance)
    }

    /// One of the four X/Y quadrants of this box
    ///
    /// Bit 0 of `index` selects the upper X half, bit 1 the upper Y half.
    /// Every quadrant keeps the full Z extent of `self`.
    pub fn quadrant(&self, index: usize) -> Self {
        debug_assert!(index < 4, "quadrant index out of range");
        let center = self.center();
        let (min_x, max_x) = if index & 1 == 0 {
            (self.min.x, center.x)
        } else {
            (center.x, self.max.x)
        };
        let (min_y, max_y) = if index & 2 == 0 {
            (self.min.y, center.y)
        } else {
            (center.y, self.max.y)
        };
        Self::new(
            Vec3::new(min_x, min_y, self.min.z),
            Vec3::new(max_x, max_y, self.max.z),
        )
    }

    /// One of the eight octants of this box
    ///
    /// Bits 0, 1 and 2 of `index` select the upper X, Y and Z halves.
    pub fn octant(&self, index: usize) -> Self {
        debug_assert!(index < 8, "octant index out of range");
        let quadrant = self.quadrant(index & 3);
        let center_z = self.center().z;
        let (min_z, max_z) = if index & 4 == 0 {
            (self.min.z, center_z)
        } else {
            (center_z, self.max.z)
        };
        Self::new(
            Vec3::new(quadrant.min.x, quadrant.min.y, min_z),
            Vec3::new(quadrant.max.x, quadrant.max.y, max_z),
        )
    }
}

impl Default for AABB {
    fn default() -> Self {
        Self::EMPTY
    }
}
