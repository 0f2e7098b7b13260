// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSG boolean operations on solids
//!
//! Solids are triangulated into csgrs polygons, the boolean runs in
//! csgrs, and the resulting polygon soup is regrouped into planar faces:
//! polygons are bucketed by quantized plane, boundary edges are found by
//! edge counting, and the boundary loops are walked back into wires.

use crate::error::Result;
use crate::solid::{Face3, Solid, Wire3};
use crate::triangulate::{calculate_polygon_normal, signed_area, triangulate_face};
use nalgebra::{Point2, Point3, Vector3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Quantization for grouping polygon normals (round to nearest 0.01)
const NORMAL_QUANTUM: f64 = 0.01;
/// Quantization for the plane offset along the normal (mm)
const OFFSET_QUANTUM: f64 = 0.01;
/// Quantization for vertex positions when matching edge endpoints (mm)
const POINT_QUANTUM: f64 = 1e-6;

type QPoint = (i64, i64, i64);
type PlaneKey = (i32, i32, i32, i64);

/// Boolean engine wrapping csgrs
pub struct BooleanEngine {
    /// Epsilon for degenerate-geometry checks
    pub epsilon: f64,
}

impl BooleanEngine {
    /// Create a new engine with the default epsilon
    pub fn new() -> Self {
        Self { epsilon: 1e-6 }
    }

    /// Boolean difference `a - b`
    pub fn subtract(&self, a: &Solid, b: &Solid) -> Result<Solid> {
        use csgrs::traits::CSG;

        // Fast path: nothing to subtract
        if b.is_empty() {
            return Ok(a.clone());
        }
        if a.is_empty() {
            return Ok(Solid::new());
        }

        let a_csg = Self::solid_to_csgrs(a)?;
        let b_csg = Self::solid_to_csgrs(b)?;

        let result = a_csg.difference(&b_csg);
        self.csgrs_to_solid(&result)
    }

    /// Boolean union `a + b`
    pub fn fuse(&self, a: &Solid, b: &Solid) -> Result<Solid> {
        use csgrs::traits::CSG;

        if b.is_empty() {
            return Ok(a.clone());
        }
        if a.is_empty() {
            return Ok(b.clone());
        }

        let a_csg = Self::solid_to_csgrs(a)?;
        let b_csg = Self::solid_to_csgrs(b)?;

        let result = a_csg.union(&b_csg);
        self.csgrs_to_solid(&result)
    }

    /// Convert a solid to the csgrs mesh format, triangulating each face
    fn solid_to_csgrs(solid: &Solid) -> Result<csgrs::mesh::Mesh<()>> {
        use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CsgMesh};
        use std::sync::OnceLock;

        if solid.is_empty() {
            return Ok(CsgMesh {
                polygons: Vec::new(),
                bounding_box: OnceLock::new(),
                metadata: None,
            });
        }

        let mut polygons = Vec::new();

        for face in &solid.faces {
            // Skip faces that cannot be triangulated; one bad face must
            // not abort the whole solid
            let (vertices, indices) = match triangulate_face(face) {
                Ok(t) => t,
                Err(_) => continue,
            };

            for tri in indices.chunks(3) {
                if tri.len() != 3 {
                    continue;
                }
                let v0 = vertices[tri[0]];
                let v1 = vertices[tri[1]];
                let v2 = vertices[tri[2]];

                // Skip degenerate triangles to avoid NaN propagation
                let edge1 = v1 - v0;
                let edge2 = v2 - v0;
                if edge1.cross(&edge2).try_normalize(1e-10).is_none() {
                    continue;
                }

                let verts = vec![
                    Vertex::new(v0, face.normal),
                    Vertex::new(v1, face.normal),
                    Vertex::new(v2, face.normal),
                ];
                polygons.push(Polygon::new(verts, None));
            }
        }

        Ok(CsgMesh::from_polygons(&polygons, None))
    }

    /// Regroup the csgrs polygon soup into planar faces with wires
    fn csgrs_to_solid(&self, csg_mesh: &csgrs::mesh::Mesh<()>) -> Result<Solid> {
        // Plane key -> (normal, edge counter). The counter maps an edge
        // (quantized, order-independent) to its use count and original
        // endpoints; edges used exactly once bound the merged region.
        type EdgeMap = FxHashMap<(QPoint, QPoint), (usize, Point3<f64>, Point3<f64>)>;
        let mut groups: FxHashMap<PlaneKey, (Vector3<f64>, EdgeMap)> = FxHashMap::default();

        for polygon in &csg_mesh.polygons {
            let vertices = &polygon.vertices;
            if vertices.len() < 3 {
                continue;
            }

            let points: Vec<Point3<f64>> = vertices
                .iter()
                .map(|v| Point3::new(v.pos[0], v.pos[1], v.pos[2]))
                .collect();

            // Prefer the polygon's own normal, fall back to computing it
            let raw = Vector3::new(
                vertices[0].normal[0],
                vertices[0].normal[1],
                vertices[0].normal[2],
            );
            let normal = match raw.try_normalize(1e-10) {
                Some(n) if n.iter().all(|c| c.is_finite()) => n,
                _ => match calculate_polygon_normal(&points).try_normalize(1e-10) {
                    Some(n) => n,
                    None => continue, // degenerate polygon
                },
            };

            let key = plane_key(&normal, &points[0]);
            let entry = groups
                .entry(key)
                .or_insert_with(|| (normal, EdgeMap::default()));

            let n = points.len();
            for i in 0..n {
                let a = points[i];
                let b = points[(i + 1) % n];
                let qa = quantize(&a);
                let qb = quantize(&b);
                if qa == qb {
                    continue;
                }
                let edge_key = if qa < qb { (qa, qb) } else { (qb, qa) };
                entry
                    .1
                    .entry(edge_key)
                    .and_modify(|(count, _, _)| *count += 1)
                    .or_insert((1, a, b));
            }
        }

        // Deterministic face order regardless of hash iteration
        let mut keyed: Vec<(PlaneKey, (Vector3<f64>, EdgeMap))> = groups.into_iter().collect();
        keyed.sort_by_key(|(key, _)| *key);

        let mut faces = Vec::new();
        for (_, (normal, edges)) in keyed {
            let boundary: Vec<(Point3<f64>, Point3<f64>)> = edges
                .into_values()
                .filter(|(count, _, _)| *count == 1)
                .map(|(_, a, b)| (a, b))
                .collect();

            for face in self.assemble_faces(&normal, boundary) {
                faces.push(face);
            }
        }

        Ok(Solid::from_faces(faces))
    }

    /// Walk boundary edges into loops, then assign loops as outer wires
    /// or holes by area ordering and containment
    fn assemble_faces(
        &self,
        normal: &Vector3<f64>,
        mut boundary: Vec<(Point3<f64>, Point3<f64>)>,
    ) -> Vec<Face3> {
        if boundary.is_empty() {
            return Vec::new();
        }

        // Stable walk order
        boundary.sort_by(|(a1, _), (a2, _)| {
            quantize(a1)
                .cmp(&quantize(a2))
        });

        let mut adjacency: FxHashMap<QPoint, Vec<usize>> = FxHashMap::default();
        for (i, (a, b)) in boundary.iter().enumerate() {
            adjacency.entry(quantize(a)).or_default().push(i);
            adjacency.entry(quantize(b)).or_default().push(i);
        }

        let mut used = vec![false; boundary.len()];
        let mut loops: Vec<Vec<Point3<f64>>> = Vec::new();

        for start in 0..boundary.len() {
            if used[start] {
                continue;
            }

            let (p0, p1) = boundary[start];
            used[start] = true;
            let start_key = quantize(&p0);
            let mut chain = vec![p0, p1];
            let mut current = quantize(&p1);

            while current != start_key {
                let Some(neighbors) = adjacency.get(&current) else {
                    break;
                };
                let mut advanced = false;
                for &idx in neighbors {
                    if used[idx] {
                        continue;
                    }
                    let (a, b) = boundary[idx];
                    let next = if quantize(&a) == current { b } else { a };
                    used[idx] = true;
                    current = quantize(&next);
                    if current != start_key {
                        chain.push(next);
                    }
                    advanced = true;
                    break;
                }
                if !advanced {
                    break;
                }
            }

            // Only closed loops with area survive; open chains are
            // numeric debris from the boolean
            if current == start_key && chain.len() >= 3 {
                loops.push(chain);
            }
        }

        if loops.is_empty() {
            return Vec::new();
        }

        // Shared 2D basis for containment tests
        let (_, u, v, origin) = crate::triangulate::project_to_2d(&loops[0], normal);
        let to_2d = |pts: &[Point3<f64>]| -> Vec<Point2<f64>> {
            pts.iter()
                .map(|p| {
                    let d = p - origin;
                    Point2::new(d.dot(&u), d.dot(&v))
                })
                .collect()
        };

        let mut measured: Vec<(Vec<Point3<f64>>, Vec<Point2<f64>>, f64)> = loops
            .into_iter()
            .map(|lp| {
                let flat = to_2d(&lp);
                let area = signed_area(&flat).abs();
                (lp, flat, area)
            })
            .filter(|(_, _, area)| *area > self.epsilon)
            .collect();

        // Largest first: outers are found before the holes they contain
        measured.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

        let mut outers: Vec<(Wire3, SmallVec<[Wire3; 2]>, Vec<Point2<f64>>)> = Vec::new();
        for (lp, flat, _) in measured {
            let probe = flat[0];
            if let Some((_, holes, _)) = outers
                .iter_mut()
                .find(|(_, _, outer_flat)| point_in_polygon(&probe, outer_flat))
            {
                holes.push(Wire3::new(lp));
            } else {
                outers.push((Wire3::new(lp), SmallVec::new(), flat));
            }
        }

        outers
            .into_iter()
            .filter_map(|(outer, holes, _)| Face3::new(outer, holes, *normal).ok())
            .collect()
    }
}

impl Default for BooleanEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn quantize(p: &Point3<f64>) -> QPoint {
    let scale = 1.0 / POINT_QUANTUM;
    (
        (p.x * scale).round() as i64,
        (p.y * scale).round() as i64,
        (p.z * scale).round() as i64,
    )
}

fn plane_key(normal: &Vector3<f64>, anchor: &Point3<f64>) -> PlaneKey {
    let offset = normal.dot(&anchor.coords);
    (
        (normal.x / NORMAL_QUANTUM).round() as i32,
        (normal.y / NORMAL_QUANTUM).round() as i32,
        (normal.z / NORMAL_QUANTUM).round() as i32,
        (offset / OFFSET_QUANTUM).round() as i64,
    )
}

/// Point-in-polygon test using ray casting
fn point_in_polygon(p: &Point2<f64>, polygon: &[Point2<f64>]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = &polygon[i];
        let vj = &polygon[j];
        if ((vi.y > p.y) != (vj.y > p.y))
            && (p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
