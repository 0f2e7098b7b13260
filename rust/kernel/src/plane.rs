// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Working planes
//!
//! A placement (origin + rotation) defines the working frame all section
//! geometry is projected into: U/V span the plane, the normal is the view
//! axis.

use crate::error::{Error, Result};
use crate::solid::{Face3, Solid, Wire3};
use nalgebra::{Point3, UnitQuaternion, Vector3};
use smallvec::SmallVec;

/// Origin plus orientation, the caller-facing description of a cut plane
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub origin: Point3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl Placement {
    /// Create a placement from origin and rotation
    pub fn new(origin: Point3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self { origin, rotation }
    }

    /// Placement with identity rotation (plane normal along +Z)
    pub fn at(origin: Point3<f64>) -> Self {
        Self {
            origin,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Placement rotated around an axis by an angle in degrees
    pub fn from_axis_angle(origin: Point3<f64>, axis: Vector3<f64>, angle_deg: f64) -> Self {
        let axis = nalgebra::Unit::new_normalize(axis);
        Self {
            origin,
            rotation: UnitQuaternion::from_axis_angle(&axis, angle_deg.to_radians()),
        }
    }
}

/// Orthonormal working frame derived from a placement
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneFrame {
    pub origin: Point3<f64>,
    pub u: Vector3<f64>,
    pub v: Vector3<f64>,
    pub normal: Vector3<f64>,
}

impl PlaneFrame {
    /// Derive the frame from a placement: U/V/normal are the rotated
    /// X/Y/Z axes
    pub fn from_placement(placement: &Placement) -> Self {
        let rot = &placement.rotation;
        Self {
            origin: placement.origin,
            u: rot * Vector3::x(),
            v: rot * Vector3::y(),
            normal: rot * Vector3::z(),
        }
    }

    /// Map a point into frame coordinates; Z is the signed distance to
    /// the plane
    pub fn local_coords(&self, p: &Point3<f64>) -> Point3<f64> {
        let d = p - self.origin;
        Point3::new(d.dot(&self.u), d.dot(&self.v), d.dot(&self.normal))
    }

    /// Map a direction into frame coordinates
    pub fn local_dir(&self, dir: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(dir.dot(&self.u), dir.dot(&self.v), dir.dot(&self.normal))
    }

    /// Map frame coordinates back to world space
    pub fn global_coords(&self, p: &Point3<f64>) -> Point3<f64> {
        self.origin + self.u * p.x + self.v * p.y + self.normal * p.z
    }

    /// Signed distance of a world point to the plane
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        (p - self.origin).dot(&self.normal)
    }

    /// Finite rectangular plane face centered on the origin, `length`
    /// along U and `height` along V, facing the frame normal
    pub fn plane_face(&self, length: f64, height: f64) -> Result<Face3> {
        if length <= 0.0 || height <= 0.0 {
            return Err(Error::DegenerateFace(format!(
                "plane extent {length} x {height} must be positive"
            )));
        }
        let hl = length / 2.0;
        let hh = height / 2.0;
        let corners = [
            self.global_coords(&Point3::new(-hl, -hh, 0.0)),
            self.global_coords(&Point3::new(hl, -hh, 0.0)),
            self.global_coords(&Point3::new(hl, hh, 0.0)),
            self.global_coords(&Point3::new(-hl, hh, 0.0)),
        ];
        Face3::new(
            Wire3::new(corners.to_vec()),
            SmallVec::new(),
            self.normal,
        )
    }
}

/// Coplanarity predicate: the faces' planes agree within `tol`.
///
/// Normals must be parallel (either direction) and every outer vertex of
/// `a` must lie within `tol` of `b`'s plane.
pub fn is_coplanar(a: &Face3, b: &Face3, tol: f64) -> bool {
    let cos = a.normal.dot(&b.normal).abs();
    if cos < 1.0 - 1e-6 {
        return false;
    }

    let anchor = b.outer.points[0];
    a.outer
        .points
        .iter()
        .all(|p| (p - anchor).dot(&b.normal).abs() <= tol)
}

/// Extrude a face along a vector into a prism solid.
///
/// The result is oriented outward: translated face on the far side, the
/// reversed face on the near side, side quads in between. Hole wires
/// produce interior channel walls.
pub fn extrude(face: &Face3, vector: Vector3<f64>) -> Result<Solid> {
    if vector.norm() < 1e-12 {
        return Err(Error::DegenerateFace(
            "extrusion vector has zero length".to_string(),
        ));
    }

    // Work with the face oriented along the extrusion direction so the
    // side-quad winding below is always outward
    let base = if face.normal.dot(&vector) >= 0.0 {
        face.clone()
    } else {
        face.reversed()
    };

    let mut faces = Vec::with_capacity(2 + base.outer.len());
    faces.push(base.reversed()); // near cap
    faces.push(base.translated(vector)); // far cap

    for wire in base.wires() {
        for (a, b) in wire.segments() {
            let quad = Wire3::new(vec![a, b, b + vector, a + vector]);
            match Face3::make_face_from_wires(vec![quad]) {
                Ok(face) => faces.push(face),
                // A zero-length edge leaves no wall
                Err(_) => continue,
            }
        }
    }

    Ok(Solid::from_faces(faces))
}
