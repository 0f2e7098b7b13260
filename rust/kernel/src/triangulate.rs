// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Wrapper around earcutr plus the planar projection helpers shared by the
//! solid model and the CSG regrouping pass.

use crate::error::{Error, Result};
use crate::solid::Face3;
use nalgebra::{Point2, Point3, Vector3};

/// Newell's method: normal of a (possibly concave) 3D polygon.
/// The result is not normalized; its length is twice the polygon area.
pub fn calculate_polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    let n = points.len();
    for i in 0..n {
        let p = &points[i];
        let q = &points[(i + 1) % n];
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }
    normal
}

/// Signed area of a 2D polygon (positive = counter-clockwise)
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    let mut area2 = 0.0;
    for i in 0..n {
        let p = &points[i];
        let q = &points[(i + 1) % n];
        area2 += p.x * q.y - q.x * p.y;
    }
    area2 / 2.0
}

/// Project 3D points onto a 2D plane defined by a normal.
/// Returns 2D points and the coordinate system (u_axis, v_axis, origin);
/// the basis is right-handed so u × v points along the normal.
#[inline]
pub fn project_to_2d(
    points_3d: &[Point3<f64>],
    normal: &Vector3<f64>,
) -> (Vec<Point2<f64>>, Vector3<f64>, Vector3<f64>, Point3<f64>) {
    if points_3d.is_empty() {
        return (
            Vec::new(),
            Vector3::zeros(),
            Vector3::zeros(),
            Point3::origin(),
        );
    }

    let origin = points_3d[0];

    // Find the axis least parallel to the normal for a stable cross product
    let abs_x = normal.x.abs();
    let abs_y = normal.y.abs();
    let abs_z = normal.z.abs();

    let reference = if abs_x <= abs_y && abs_x <= abs_z {
        Vector3::new(1.0, 0.0, 0.0)
    } else if abs_y <= abs_z {
        Vector3::new(0.0, 1.0, 0.0)
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    };

    let u_axis = reference.cross(normal).normalize();
    let v_axis = normal.cross(&u_axis).normalize();

    let points_2d = points_3d
        .iter()
        .map(|p| {
            let d = p - origin;
            Point2::new(d.dot(&u_axis), d.dot(&v_axis))
        })
        .collect();

    (points_2d, u_axis, v_axis, origin)
}

/// Triangulate a simple polygon (no holes).
/// Returns triangle indices into the input points.
#[inline]
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::Triangulation(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    // FAST PATH: Triangle - no triangulation needed
    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    // FAST PATH: Quad - simple fan
    if n == 4 {
        return Ok(vec![0, 1, 2, 0, 2, 3]);
    }

    let mut vertices = Vec::with_capacity(n * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    earcutr::earcut(&vertices, &[], 2).map_err(|e| Error::Triangulation(format!("{e:?}")))
}

/// Triangulate a face, holes included.
/// Returns the flattened vertex list (outer wire first, then the hole
/// wires) and triangle indices into it.
pub fn triangulate_face(face: &Face3) -> Result<(Vec<Point3<f64>>, Vec<usize>)> {
    let (outer_2d, u, v, origin) = project_to_2d(&face.outer.points, &face.normal);

    let mut vertices_3d: Vec<Point3<f64>> = face.outer.points.clone();
    let mut flat = Vec::with_capacity(outer_2d.len() * 2);
    for p in &outer_2d {
        flat.push(p.x);
        flat.push(p.y);
    }

    if face.holes.is_empty() && outer_2d.len() <= 4 {
        let indices = triangulate_polygon(&outer_2d)?;
        return Ok((vertices_3d, indices));
    }

    let mut hole_indices = Vec::with_capacity(face.holes.len());
    for hole in &face.holes {
        if hole.len() < 3 {
            continue;
        }
        hole_indices.push(flat.len() / 2);
        for p in &hole.points {
            let d = p - origin;
            flat.push(d.dot(&u));
            flat.push(d.dot(&v));
            vertices_3d.push(*p);
        }
    }

    let indices =
        earcutr::earcut(&flat, &hole_indices, 2).map_err(|e| Error::Triangulation(format!("{e:?}")))?;

    if indices.is_empty() {
        return Err(Error::Triangulation(
            "earcut produced no triangles".to_string(),
        ));
    }

    Ok((vertices_3d, indices))
}
