// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Depth sorting for paint order
//!
//! SVG has no depth buffer; faces farther along the view axis must be
//! emitted first so nearer faces stack on top.

use crate::record::FaceRecord;
use nalgebra::Vector3;
use std::cmp::Ordering;

/// Dominant axis of the plane normal (0 = X, 1 = Y, 2 = Z) and its sign.
///
/// Components are rounded to 3 decimals before comparison; ties break
/// with axis priority Z > X > Y.
fn dominant_axis(normal: &Vector3<f64>) -> (usize, f64) {
    let rounded = [
        (normal.x * 1000.0).round() / 1000.0,
        (normal.y * 1000.0).round() / 1000.0,
        (normal.z * 1000.0).round() / 1000.0,
    ];

    let mut axis = 2;
    for candidate in [0usize, 1] {
        if rounded[candidate].abs() > rounded[axis].abs() {
            axis = candidate;
        }
    }

    (axis, rounded[axis])
}

/// Stable sort by the faces' 3D bounds maximum along the dominant view
/// axis: ascending for a positive normal component, descending for a
/// negative one.
pub fn sort_faces(faces: &mut [FaceRecord], plane_normal: &Vector3<f64>) {
    let (axis, component) = dominant_axis(plane_normal);
    if component == 0.0 {
        return;
    }

    faces.sort_by(|a, b| {
        let ka = a.original.bounds().max_along(axis);
        let kb = b.original.bounds().max_along(axis);
        let ord = ka.partial_cmp(&kb).unwrap_or(Ordering::Equal);
        if component > 0.0 {
            ord
        } else {
            ord.reverse()
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Color;
    use nalgebra::Point3;
    use plancut_kernel::{Face3, Wire3};

    fn face_at_z(z: f64) -> FaceRecord {
        FaceRecord::new(
            Face3::make_face_from_wires(vec![Wire3::new(vec![
                Point3::new(0.0, 0.0, z),
                Point3::new(1.0, 0.0, z),
                Point3::new(1.0, 1.0, z),
            ])])
            .unwrap(),
            Color::default(),
            None,
        )
    }

    fn z_order(faces: &[FaceRecord]) -> Vec<f64> {
        faces
            .iter()
            .map(|f| f.original.bounds().max_along(2))
            .collect()
    }

    #[test]
    fn positive_normal_sorts_ascending() {
        let mut faces = vec![face_at_z(5.0), face_at_z(1.0), face_at_z(3.0)];
        sort_faces(&mut faces, &Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(z_order(&faces), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn negative_normal_sorts_descending() {
        let mut faces = vec![face_at_z(1.0), face_at_z(5.0), face_at_z(3.0)];
        sort_faces(&mut faces, &Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(z_order(&faces), vec![5.0, 3.0, 1.0]);
    }

    #[test]
    fn dominant_axis_prefers_z_on_ties() {
        let (axis, component) = dominant_axis(&Vector3::new(0.7071, 0.0, 0.7071));
        assert_eq!(axis, 2);
        assert!(component > 0.0);

        let (axis, _) = dominant_axis(&Vector3::new(0.9, 0.1, 0.3));
        assert_eq!(axis, 0);
    }

    #[test]
    fn equal_keys_keep_insertion_order() {
        let mut faces = vec![face_at_z(2.0), face_at_z(2.0)];
        faces[0].color = Color::new(1.0, 0.0, 0.0);
        faces[1].color = Color::new(0.0, 1.0, 0.0);
        sort_faces(&mut faces, &Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(faces[0].color, Color::new(1.0, 0.0, 0.0));
    }
}
