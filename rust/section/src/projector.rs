// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plane projection
//!
//! Maps classified 3D faces and edges into the working plane's 2D frame.
//! Degenerate projections (a face reduced to a point or line by the cut)
//! yield `None` and are filtered downstream; this is expected, not an
//! error.

use crate::record::{Face2, FaceRecord, Wire2};
use nalgebra::{Point2, Point3};
use plancut_kernel::{Face3, PlaneFrame};
use tracing::debug;

/// Angle (radians) beyond which the rebuilt face is considered flipped
/// relative to the original normal
const FLIP_ANGLE: f64 = 1.0;

/// Projects faces and edges onto a working plane
#[derive(Debug, Clone)]
pub struct Projector {
    frame: PlaneFrame,
}

impl Projector {
    pub fn new(frame: PlaneFrame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &PlaneFrame {
        &self.frame
    }

    /// Project a record's face into the frame, populating `projected`.
    ///
    /// Returns `None` when a wire degenerates below 3 usable vertices or
    /// the rebuilt face has no area.
    pub fn project_face(&self, record: &FaceRecord) -> Option<FaceRecord> {
        let face2 = self.project(&record.original)?;
        let mut projected = record.clone();
        projected.projected = Some(face2);
        Some(projected)
    }

    /// Project a bare face; `None` on degenerate input
    pub fn project(&self, face: &Face3) -> Option<Face2> {
        let mut wires = Vec::new();

        for wire in face.wires() {
            let points: Vec<Point2<f64>> = wire
                .points
                .iter()
                .map(|p| {
                    let local = self.frame.local_coords(p);
                    Point2::new(local.x, local.y)
                })
                .collect();

            if points.len() < 3 {
                if wires.is_empty() {
                    debug!("Unable to project face: outer wire degenerated");
                    return None;
                }
                // A collapsed hole wire is dropped, the face survives
                continue;
            }

            wires.push(Wire2::from_points(&points));
        }

        if wires.is_empty() {
            return None;
        }

        let face2 = Face2::new(wires);
        if face2.signed_area().abs() < 1e-9 {
            debug!("Unable to project face: projection has no area");
            return None;
        }

        // Restore the original orientation: the rebuilt face's normal is
        // +Z for counter-clockwise winding; flip when it disagrees with
        // the projected input normal
        let local_normal = self.frame.local_dir(&face.normal);
        let rebuilt_z = if face2.signed_area() > 0.0 { 1.0 } else { -1.0 };
        let cos = (local_normal.z * rebuilt_z / local_normal.norm().max(1e-12)).clamp(-1.0, 1.0);
        if cos.acos() > FLIP_ANGLE {
            return Some(face2.reversed());
        }

        Some(face2)
    }

    /// Project a single edge; curved geometry is linearized between its
    /// endpoints
    pub fn project_edge(&self, edge: &(Point3<f64>, Point3<f64>)) -> (Point2<f64>, Point2<f64>) {
        let a = self.frame.local_coords(&edge.0);
        let b = self.frame.local_coords(&edge.1);
        (Point2::new(a.x, a.y), Point2::new(b.x, b.y))
    }
}
