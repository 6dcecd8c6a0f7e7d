//! Zone mesh loading
//!
//! Zone geometry is a line-oriented text file:
//!
//! ```text
//! # comment
//! v 100.0 0.0 0.0        # vertex
//! g walls                # start a face group (`o` also accepted)
//! f 1 2 3                # face, 1-based vertex indices
//! f -3 -2 -1             # negative indices count back from the last vertex
//! f 1/1/1 2/2/2 3/3/3 4  # texture/normal suffixes are ignored, polygons are fanned
//! ```
//!
//! Any other record is skipped.

use crate::error::{LosError, Result};
use crate::triangle::Triangle;
use std::path::Path;
use void_math::{Vec3, AABB};

/// Named set of triangular faces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceGroup {
    pub name: String,
    /// Zero-based vertex indices
    pub faces: Vec<[u32; 3]>,
}

/// Raw zone geometry: a vertex list and grouped triangle index lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneMesh {
    pub vertices: Vec<Vec3>,
    pub groups: Vec<FaceGroup>,
}

impl ZoneMesh {
    /// Read a mesh file
    ///
    /// A missing file is not an error: it means the zone has no collision
    /// geometry and yields `Ok(None)`.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(source) => Self::parse(&source, path).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LosError::io(path, e)),
        }
    }

    /// Parse mesh text; `path` is only used in error messages
    pub fn parse(source: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut mesh = Self::default();
        let mut polygon = Vec::with_capacity(4);

        for (index, raw) in source.lines().enumerate() {
            let line_no = index + 1;
            let line = match raw.find('#') {
                Some(comment) => &raw[..comment],
                None => raw,
            };
            let mut fields = line.split_whitespace();

            match fields.next() {
                Some("v") => {
                    let mut coords = [0.0f32; 3];
                    for coord in &mut coords {
                        let field = fields.next().ok_or_else(|| {
                            parse_error(path, line_no, "vertex needs three coordinates")
                        })?;
                        *coord = field.parse().map_err(|_| {
                            parse_error(path, line_no, format!("invalid coordinate '{}'", field))
                        })?;
                    }
                    mesh.vertices.push(Vec3::from_array(coords));
                }
                Some("g") | Some("o") => {
                    let name = fields.collect::<Vec<_>>().join(" ");
                    match mesh.groups.last_mut() {
                        Some(group) if group.faces.is_empty() => group.name = name,
                        _ => mesh.groups.push(FaceGroup { name, faces: Vec::new() }),
                    }
                }
                Some("f") => {
                    polygon.clear();
                    for field in fields {
                        polygon.push(resolve_index(field, mesh.vertices.len(), path, line_no)?);
                    }
                    if polygon.len() < 3 {
                        return Err(parse_error(
                            path,
                            line_no,
                            "face needs at least three vertices",
                        ));
                    }

                    if mesh.groups.is_empty() {
                        mesh.groups.push(FaceGroup {
                            name: "default".to_string(),
                            faces: Vec::new(),
                        });
                    }
                    if let Some(group) = mesh.groups.last_mut() {
                        for i in 1..polygon.len() - 1 {
                            group.faces.push([polygon[0], polygon[i], polygon[i + 1]]);
                        }
                    }
                }
                _ => {}
            }
        }

        mesh.groups.retain(|group| !group.faces.is_empty());
        Ok(mesh)
    }

    /// Total triangles across all groups
    pub fn face_count(&self) -> usize {
        self.groups.iter().map(|group| group.faces.len()).sum()
    }

    /// True when the mesh has no faces to collide with
    pub fn is_empty(&self) -> bool {
        self.face_count() == 0
    }

    /// Shift every vertex by `offset`
    pub fn translate(&mut self, offset: Vec3) {
        if offset == Vec3::ZERO {
            return;
        }
        for vertex in &mut self.vertices {
            *vertex += offset;
        }
    }

    /// Bounds of the vertices with `min_z < z <= max_z`
    ///
    /// Returns `None` when no vertex falls inside the envelope.
    pub fn bounds_within(&self, min_z: f32, max_z: f32) -> Option<AABB> {
        let aabb = AABB::from_points(
            self.vertices
                .iter()
                .copied()
                .filter(|v| v.z > min_z && v.z <= max_z),
        );
        (!aabb.is_empty()).then_some(aabb)
    }

    /// Every face as a collision triangle
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.groups.iter().flat_map(move |group| {
            group.faces.iter().map(move |&[a, b, c]| {
                Triangle::new(
                    self.vertices[a as usize],
                    self.vertices[b as usize],
                    self.vertices[c as usize],
                )
            })
        })
    }
}

fn parse_error(path: &Path, line: usize, message: impl Into<String>) -> LosError {
    LosError::MeshParse {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

/// Turn a face field (`7`, `-1`, `7/2/3`) into a zero-based vertex index
fn resolve_index(field: &str, vertex_count: usize, path: &Path, line: usize) -> Result<u32> {
    let raw = field.split('/').next().unwrap_or(field);
    let value: i64 = raw
        .parse()
        .map_err(|_| parse_error(path, line, format!("invalid face index '{}'", field)))?;

    let count = vertex_count as i64;
    let resolved = match value {
        v if v > 0 => v - 1,
        v if v < 0 => count + v,
        _ => return Err(parse_error(path, line, "face index 0 is not valid")),
    };

    if resolved < 0 || resolved >= count {
        return Err(parse_error(
            path,
            line,
            format!("face index {} out of range ({} vertices)", value, vertex_count),
        ));
    }
    u32::try_from(resolved).map_err(|_| parse_error(path, line, "face index does not fit in u32"))
}
