// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar-face solid model
//!
//! A `Solid` is a closed set of planar faces; each face carries an outer
//! wire, optional hole wires and a unit normal. Wires are closed by
//! convention (the last point connects back to the first).

use crate::error::{Error, Result};
use crate::triangulate::{calculate_polygon_normal, project_to_2d, signed_area};
use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;

/// Minimum polygon area below which a face is considered degenerate (mm^2)
const MIN_FACE_AREA: f64 = 1e-9;

/// A closed loop of 3D points
#[derive(Debug, Clone, PartialEq)]
pub struct Wire3 {
    /// Ordered loop vertices; the wire closes back to the first point
    pub points: Vec<Point3<f64>>,
}

impl Wire3 {
    /// Create a wire from a point loop
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    /// Number of vertices
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the wire has no vertices
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate the wire as closed segments (last point connects to first)
    pub fn segments(&self) -> impl Iterator<Item = (Point3<f64>, Point3<f64>)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Translate every vertex by a vector
    pub fn translated(&self, offset: Vector3<f64>) -> Self {
        Self {
            points: self.points.iter().map(|p| p + offset).collect(),
        }
    }

    fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self { points }
    }
}

/// A planar face: outer wire, hole wires and a unit normal.
///
/// Winding invariant: the outer wire runs counter-clockwise when viewed
/// against the normal, holes run clockwise. `new` normalizes both.
#[derive(Debug, Clone)]
pub struct Face3 {
    /// Outer boundary
    pub outer: Wire3,
    /// Interior holes
    pub holes: SmallVec<[Wire3; 2]>,
    /// Unit normal
    pub normal: Vector3<f64>,
}

impl Face3 {
    /// Build a face from an outer wire, holes and a normal, normalizing
    /// the winding invariant. Fails on degenerate input.
    pub fn new(outer: Wire3, holes: SmallVec<[Wire3; 2]>, normal: Vector3<f64>) -> Result<Self> {
        if outer.len() < 3 {
            return Err(Error::DegenerateFace(format!(
                "outer wire has {} vertices, need at least 3",
                outer.len()
            )));
        }

        let normal = normal
            .try_normalize(1e-12)
            .ok_or_else(|| Error::DegenerateFace("zero-length normal".to_string()))?;

        let (points_2d, u, v, origin) = project_to_2d(&outer.points, &normal);
        let area = signed_area(&points_2d);
        if area.abs() < MIN_FACE_AREA {
            return Err(Error::DegenerateFace(format!(
                "outer wire collapses to area {area:e}"
            )));
        }

        // Outer counter-clockwise against the normal
        let outer = if area < 0.0 { outer.reversed() } else { outer };

        // Holes clockwise
        let holes = holes
            .into_iter()
            .filter(|h| h.len() >= 3)
            .map(|h| {
                let pts_2d: Vec<_> = h
                    .points
                    .iter()
                    .map(|p| {
                        let d = p - origin;
                        nalgebra::Point2::new(d.dot(&u), d.dot(&v))
                    })
                    .collect();
                if signed_area(&pts_2d) > 0.0 {
                    h.reversed()
                } else {
                    h
                }
            })
            .collect();

        Ok(Self {
            outer,
            holes,
            normal,
        })
    }

    /// Build a face from a list of wires; the first wire is the outer
    /// boundary, the rest are holes. The normal is derived from the
    /// outer wire. Fails on degenerate input.
    pub fn make_face_from_wires(mut wires: Vec<Wire3>) -> Result<Self> {
        if wires.is_empty() {
            return Err(Error::DegenerateFace("no wires".to_string()));
        }
        let outer = wires.remove(0);
        if outer.len() < 3 {
            return Err(Error::DegenerateFace(format!(
                "outer wire has {} vertices, need at least 3",
                outer.len()
            )));
        }
        let normal = calculate_polygon_normal(&outer.points);
        Self::new(outer, wires.into_iter().collect(), normal)
    }

    /// Iterate all wires, outer first
    pub fn wires(&self) -> impl Iterator<Item = &Wire3> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// All vertices of the face, outer wire first
    pub fn vertices(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.wires().flat_map(|w| w.points.iter())
    }

    /// Area-weighted centroid of the outer boundary
    pub fn centroid(&self) -> Point3<f64> {
        let (points_2d, u, v, origin) = project_to_2d(&self.outer.points, &self.normal);

        let n = points_2d.len();
        let mut area2 = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let p = &points_2d[i];
            let q = &points_2d[(i + 1) % n];
            let cross = p.x * q.y - q.x * p.y;
            area2 += cross;
            cx += (p.x + q.x) * cross;
            cy += (p.y + q.y) * cross;
        }

        if area2.abs() < 1e-12 {
            // Fall back to the vertex average for near-degenerate loops
            let mut acc = Vector3::zeros();
            for p in &self.outer.points {
                acc += p.coords;
            }
            return Point3::from(acc / n as f64);
        }

        cx /= 3.0 * area2;
        cy /= 3.0 * area2;
        origin + u * cx + v * cy
    }

    /// Plane offset: signed distance of the face plane from the origin
    pub fn plane_offset(&self) -> f64 {
        self.normal.dot(&self.outer.points[0].coords)
    }

    /// Unsigned area of the outer boundary
    pub fn area(&self) -> f64 {
        let (points_2d, _, _, _) = project_to_2d(&self.outer.points, &self.normal);
        signed_area(&points_2d).abs()
    }

    /// Axis-aligned bounds of the face
    pub fn bounds(&self) -> Bounds3 {
        // The outer wire always holds at least 3 points
        let first = self.outer.points[0];
        let mut bounds = Bounds3 {
            min: first,
            max: first,
        };
        for p in self.vertices() {
            bounds.include(p);
        }
        bounds
    }

    /// Flip the face: reverse wires and negate the normal
    pub fn reversed(&self) -> Self {
        Self {
            outer: self.outer.reversed(),
            holes: self.holes.iter().map(|h| h.reversed()).collect(),
            normal: -self.normal,
        }
    }

    /// Translate the face by a vector
    pub fn translated(&self, offset: Vector3<f64>) -> Self {
        Self {
            outer: self.outer.translated(offset),
            holes: self.holes.iter().map(|h| h.translated(offset)).collect(),
            normal: self.normal,
        }
    }
}

/// Axis-aligned 3D bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds3 {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Bounds3 {
    /// Bounds of a point cloud; `None` when the iterator is empty
    pub fn from_points(points: impl IntoIterator<Item = Point3<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.include(&p);
        }
        Some(bounds)
    }

    /// Grow to include a point
    pub fn include(&mut self, p: &Point3<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Grow to include another bounds
    pub fn merge(&mut self, other: &Bounds3) {
        self.include(&other.min);
        self.include(&other.max);
    }

    /// Maximum coordinate along an axis (0 = X, 1 = Y, 2 = Z)
    pub fn max_along(&self, axis: usize) -> f64 {
        self.max[axis]
    }

    /// The eight corner points
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(b.x, b.y, b.z),
            Point3::new(a.x, b.y, b.z),
        ]
    }
}

/// A solid bounded by planar faces
#[derive(Debug, Clone, Default)]
pub struct Solid {
    pub faces: Vec<Face3>,
}

impl Solid {
    /// Create an empty solid
    pub fn new() -> Self {
        Self { faces: Vec::new() }
    }

    /// Create a solid from faces
    pub fn from_faces(faces: Vec<Face3>) -> Self {
        Self { faces }
    }

    /// Axis-aligned box solid, the six faces oriented outward
    pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Self {
        let [v0, v1, v2, v3, v4, v5, v6, v7] = Bounds3 { min, max }.corners();

        let quad = |a, b, c, d, normal: Vector3<f64>| {
            Face3::new(Wire3::new(vec![a, b, c, d]), SmallVec::new(), normal)
                .expect("box face is planar")
        };

        Self::from_faces(vec![
            quad(v0, v3, v2, v1, Vector3::new(0.0, 0.0, -1.0)), // bottom
            quad(v4, v5, v6, v7, Vector3::new(0.0, 0.0, 1.0)),  // top
            quad(v0, v1, v5, v4, Vector3::new(0.0, -1.0, 0.0)), // front
            quad(v2, v3, v7, v6, Vector3::new(0.0, 1.0, 0.0)),  // back
            quad(v0, v4, v7, v3, Vector3::new(-1.0, 0.0, 0.0)), // left
            quad(v1, v2, v6, v5, Vector3::new(1.0, 0.0, 0.0)),  // right
        ])
    }

    /// True when the solid has no faces
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Axis-aligned bounds of all faces; `None` for an empty solid
    pub fn bounds(&self) -> Option<Bounds3> {
        Bounds3::from_points(self.faces.iter().flat_map(|f| f.vertices().copied()))
    }

    /// All wire segments of the solid, one pair per edge use
    pub fn edges(&self) -> impl Iterator<Item = (Point3<f64>, Point3<f64>)> + '_ {
        self.faces
            .iter()
            .flat_map(|f| f.wires())
            .flat_map(|w| w.segments())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square_face() -> Face3 {
        Face3::make_face_from_wires(vec![Wire3::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])])
        .unwrap()
    }

    #[test]
    fn face_normal_from_wires() {
        let face = unit_square_face();
        assert_relative_eq!(face.normal.z.abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn face_centroid_of_square() {
        let face = unit_square_face();
        let c = face.centroid();
        assert_relative_eq!(c.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(c.y, 0.5, epsilon = 1e-12);
        assert_relative_eq!(c.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_face_rejected() {
        let result = Face3::make_face_from_wires(vec![Wire3::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ])]);
        assert!(result.is_err());

        // Collinear points collapse to a line
        let result = Face3::make_face_from_wires(vec![Wire3::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ])]);
        assert!(result.is_err());
    }

    #[test]
    fn cuboid_has_six_outward_faces() {
        let solid = Solid::cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 3.0, 4.0));
        assert_eq!(solid.face_count(), 6);

        let center = Point3::new(1.0, 1.5, 2.0);
        for face in &solid.faces {
            let outward = face.centroid() - center;
            assert!(
                face.normal.dot(&outward) > 0.0,
                "face normal {:?} points inward",
                face.normal
            );
        }
    }

    #[test]
    fn bounds_merge_and_corners() {
        let solid = Solid::cuboid(Point3::new(-1.0, 0.0, 2.0), Point3::new(4.0, 5.0, 6.0));
        let bounds = solid.bounds().unwrap();
        assert_relative_eq!(bounds.min.x, -1.0);
        assert_relative_eq!(bounds.max.z, 6.0);
        assert_relative_eq!(bounds.max_along(1), 5.0);
    }
}
