//! Quadtree / octree over arbitrary colliders
//!
//! Nodes live in a flat arena and are addressed by `u32` handles. A node is
//! either a leaf holding object indices or an internal node whose children
//! occupy a contiguous run of arena slots. Objects are stored once in the
//! tree; leaves reference them by index, so an object that straddles a split
//! plane is shared by every child it overlaps rather than being cut.
//!
//! # Example
//!
//! ```ignore
//! let mut tree = SpatialTree::new(zone_bounds, TreeParams::default());
//! for triangle in mesh.triangles() {
//!     tree.add_object(triangle);
//! }
//! let t = tree.collide_with_ray(origin, direction, distance, None);
//! let blocked = t < distance;
//! ```

use crate::collider::Collider;
use crate::stats::RayStats;
use serde::{Deserialize, Serialize};
use void_math::{Vec3, AABB};

/// Handle to a node in the arena
type NodeId = u32;

/// Subdivision scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeKind {
    /// Split X and Y only; children keep the parent's full Z extent
    Quad,
    /// Split all three axes
    Oct,
}

impl TreeKind {
    /// Number of children created by one split
    #[inline]
    pub const fn arity(self) -> usize {
        match self {
            Self::Quad => 4,
            Self::Oct => 8,
        }
    }

    #[inline]
    fn child_bounds(self, parent: &AABB, index: usize) -> AABB {
        match self {
            Self::Quad => parent.quadrant(index),
            Self::Oct => parent.octant(index),
        }
    }
}

impl Default for TreeKind {
    fn default() -> Self {
        Self::Quad
    }
}

impl std::fmt::Display for TreeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quad => write!(f, "quad"),
            Self::Oct => write!(f, "oct"),
        }
    }
}

/// Subdivision limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    /// Subdivision scheme
    pub kind: TreeKind,
    /// A leaf splits once it holds more than this many objects
    pub max_objects_per_node: usize,
    /// Leaves at this depth never split (root is depth 0)
    pub max_level: u32,
    /// Leaves whose box diagonal is not larger than this never split
    pub min_split_diagonal: f32,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            kind: TreeKind::Quad,
            max_objects_per_node: 1000,
            max_level: 20,
            min_split_diagonal: 256.0,
        }
    }
}

impl TreeParams {
    /// Octree variant with default limits
    pub fn octree() -> Self {
        Self {
            kind: TreeKind::Oct,
            ..Default::default()
        }
    }

    /// Set the per-leaf object limit
    pub fn with_max_objects_per_node(mut self, max_objects: usize) -> Self {
        self.max_objects_per_node = max_objects;
        self
    }

    /// Set the maximum depth
    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level;
        self
    }

    /// Set the minimum diagonal below which leaves stay leaves
    pub fn with_min_split_diagonal(mut self, diagonal: f32) -> Self {
        self.min_split_diagonal = diagonal;
        self
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    /// Indices into `SpatialTree::objects`
    Leaf(Vec<u32>),
    /// Children are `first_child .. first_child + arity`
    Internal { first_child: NodeId },
}

#[derive(Debug, Clone)]
struct Node {
    bounds: AABB,
    depth: u32,
    kind: NodeKind,
}

impl Node {
    fn leaf(bounds: AABB, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            kind: NodeKind::Leaf(Vec::new()),
        }
    }
}

/// Write-once spatial tree of colliders
///
/// Built by repeated [`add_object`](Self::add_object) calls, then only read.
/// There is no removal.
#[derive(Debug, Clone)]
pub struct SpatialTree<T> {
    params: TreeParams,
    nodes: Vec<Node>,
    objects: Vec<T>,
}

impl<T: Collider> SpatialTree<T> {
    /// Create an empty tree covering `bounds`
    pub fn new(bounds: AABB, params: TreeParams) -> Self {
        Self {
            params,
            nodes: vec![Node::leaf(bounds, 0)],
            objects: Vec::new(),
        }
    }

    /// Root bounds
    #[inline]
    pub fn bounds(&self) -> AABB {
        self.nodes[0].bounds
    }

    /// Number of accepted objects (each counted once)
    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Total nodes in the arena
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest node depth (0 for an unsplit tree)
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    /// Number of leaf references to objects, counting duplicates
    pub fn reference_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| match &node.kind {
                NodeKind::Leaf(items) => items.len(),
                NodeKind::Internal { .. } => 0,
            })
            .sum()
    }

    /// Insert an object
    ///
    /// Returns `false` (and drops the object) when it does not overlap the
    /// root bounds.
    pub fn add_object(&mut self, object: T) -> bool {
        if !object.collide_with_aabb(&self.nodes[0].bounds) {
            return false;
        }

        let index = u32::try_from(self.objects.len())
            .expect("spatial tree object count exceeds u32");
        self.objects.push(object);
        self.insert(0, index);
        true
    }

    /// Insert every object from `objects`, returning how many were accepted
    pub fn add_objects<I>(&mut self, objects: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        objects
            .into_iter()
            .map(|object| self.add_object(object))
            .filter(|&accepted| accepted)
            .count()
    }

    /// Route an already-stored object into the subtree at `node_id`
    ///
    /// The caller guarantees the object overlaps the node's bounds.
    fn insert(&mut self, node_id: NodeId, object: u32) {
        let arity = self.params.kind.arity() as NodeId;
        let node = &mut self.nodes[node_id as usize];

        match &mut node.kind {
            NodeKind::Internal { first_child } => {
                let first = *first_child;
                for child in first..first + arity {
                    let child_bounds = self.nodes[child as usize].bounds;
                    if self.objects[object as usize].collide_with_aabb(&child_bounds) {
                        self.insert(child, object);
                    }
                }
            }
            NodeKind::Leaf(items) => {
                items.push(object);
                let count = items.len();
                if self.should_split(node_id, count) {
                    self.split(node_id);
                }
            }
        }
    }

    fn should_split(&self, node_id: NodeId, count: usize) -> bool {
        let node = &self.nodes[node_id as usize];
        count > self.params.max_objects_per_node
            && node.depth < self.params.max_level
            && node.bounds.diagonal() > self.params.min_split_diagonal
    }

    /// Turn a leaf into an internal node and redistribute its objects
    fn split(&mut self, node_id: NodeId) {
        let kind = self.params.kind;
        let first_child = NodeId::try_from(self.nodes.len())
            .expect("spatial tree node count exceeds u32");
        let (bounds, depth) = {
            let node = &self.nodes[node_id as usize];
            (node.bounds, node.depth)
        };

        for index in 0..kind.arity() {
            self.nodes.push(Node::leaf(kind.child_bounds(&bounds, index), depth + 1));
        }

        let held = match std::mem::replace(
            &mut self.nodes[node_id as usize].kind,
            NodeKind::Internal { first_child },
        ) {
            NodeKind::Leaf(items) => items,
            NodeKind::Internal { .. } => unreachable!("split called on an internal node"),
        };

        for object in held {
            self.insert(node_id, object);
        }
    }

    /// Nearest hit distance along the ray, or `max_distance` on a miss
    pub fn collide_with_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mut stats: Option<&mut RayStats>,
    ) -> f32 {
        let root = &self.nodes[0];
        if let Some(stats) = stats.as_deref_mut() {
            stats.box_tests += 1;
        }
        let entry = root.bounds.collide_with_ray(origin, direction, max_distance);
        if entry >= max_distance {
            return max_distance;
        }
        self.ray_node(0, origin, direction, max_distance, stats)
    }

    /// Search a node whose box the ray already enters before `max_distance`
    fn ray_node(
        &self,
        node_id: NodeId,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mut stats: Option<&mut RayStats>,
    ) -> f32 {
        if let Some(stats) = stats.as_deref_mut() {
            stats.nodes_visited += 1;
        }

        let mut best = max_distance;
        match &self.nodes[node_id as usize].kind {
            NodeKind::Leaf(items) => {
                for &object in items {
                    let t = self.objects[object as usize].collide_with_ray(
                        origin,
                        direction,
                        best,
                        stats.as_deref_mut(),
                    );
                    best = best.min(t);
                }
            }
            NodeKind::Internal { first_child } => {
                // Visit children nearest-entry first so hits shrink the cutoff early
                let arity = self.params.kind.arity();
                let mut order: [(f32, NodeId); 8] = [(0.0, 0); 8];
                let mut count = 0;
                for child in *first_child..*first_child + arity as NodeId {
                    if let Some(stats) = stats.as_deref_mut() {
                        stats.box_tests += 1;
                    }
                    let entry = self.nodes[child as usize]
                        .bounds
                        .collide_with_ray(origin, direction, best);
                    if entry < best {
                        let mut slot = count;
                        while slot > 0 && order[slot - 1].0 > entry {
                            order[slot] = order[slot - 1];
                            slot -= 1;
                        }
                        order[slot] = (entry, child);
                        count += 1;
                    }
                }

                for &(entry, child) in &order[..count] {
                    if entry >= best {
                        break;
                    }
                    let t = self.ray_node(child, origin, direction, best, stats.as_deref_mut());
                    best = best.min(t);
                }
            }
        }
        best
    }
}

impl<T: Collider> Collider for SpatialTree<T> {
    #[inline]
    fn bounds(&self) -> AABB {
        SpatialTree::bounds(self)
    }

    #[inline]
    fn collide_with_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        stats: Option<&mut RayStats>,
    ) -> f32 {
        SpatialTree::collide_with_ray(self, origin, direction, max_distance, stats)
    }

    #[inline]
    fn collide_with_aabb(&self, aabb: &AABB) -> bool {
        self.nodes[0].bounds.intersects(aabb)
    }
}
