// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Duplicate removal and orientation filtering
//!
//! Adjoining solids produce the same footprint twice after independent
//! boolean cuts; duplicates collapse to one face. Faces that match a
//! section face are dropped entirely, sections take priority.

use crate::record::FaceRecord;
use nalgebra::Vector3;

/// Index of the first face in `list` matching `face`, or `None`
pub fn index_of_match(list: &[FaceRecord], face: &FaceRecord, decimals: u32) -> Option<usize> {
    list.iter().position(|f| face.matches(f, decimals))
}

/// Collapse duplicate secondary faces and drop any that match a section
/// face.
///
/// On a duplicate the earlier kept face is removed and the current one
/// appended, so the later-inserted instance survives positionally.
pub fn remove_duplicates(
    sections: &[FaceRecord],
    secondary: Vec<FaceRecord>,
    decimals: u32,
) -> Vec<FaceRecord> {
    let mut kept: Vec<FaceRecord> = Vec::with_capacity(secondary.len());

    for face in secondary {
        if index_of_match(sections, &face, decimals).is_some() {
            continue;
        }

        if let Some(i) = index_of_match(&kept, &face, decimals) {
            kept.remove(i);
        }
        kept.push(face);
    }

    kept
}

/// Drop faces whose normal is edge-on to the view
pub fn filter_misoriented(
    faces: &mut Vec<FaceRecord>,
    plane_normal: &Vector3<f64>,
    angle_eps_deg: f64,
) {
    faces.retain(|f| f.correctly_oriented(plane_normal, angle_eps_deg));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Color, Face2, Wire2};
    use nalgebra::{Point2, Point3};
    use plancut_kernel::{Face3, Wire3};

    fn record(points: &[(f64, f64)], color: Color) -> FaceRecord {
        let face3 = Face3::make_face_from_wires(vec![Wire3::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ])])
        .unwrap();
        let pts: Vec<Point2<f64>> = points.iter().map(|(x, y)| Point2::new(*x, *y)).collect();
        let mut rec = FaceRecord::new(face3, color, None);
        rec.projected = Some(Face2::new(vec![Wire2::from_points(&pts)]));
        rec
    }

    const SQUARE: &[(f64, f64)] = &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
    const OTHER: &[(f64, f64)] = &[(20.0, 0.0), (30.0, 0.0), (30.0, 10.0), (20.0, 10.0)];

    #[test]
    fn duplicate_keeps_later_instance() {
        let first = record(SQUARE, Color::new(1.0, 0.0, 0.0));
        let middle = record(OTHER, Color::default());
        let second = record(SQUARE, Color::new(0.0, 1.0, 0.0));

        let kept = remove_duplicates(&[], vec![first, middle, second], 5);

        assert_eq!(kept.len(), 2);
        // The duplicate collapsed and the later-inserted instance
        // survives, at the end of the list
        assert_eq!(kept[1].color, Color::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn section_match_drops_secondary() {
        let section = record(SQUARE, Color::default());
        let shadow = record(SQUARE, Color::default());
        let other = record(OTHER, Color::default());

        let kept = remove_duplicates(&[section], vec![shadow, other], 5);

        assert_eq!(kept.len(), 1);
        assert!(kept[0].matches(&record(OTHER, Color::default()), 5));
    }

    #[test]
    fn misoriented_faces_filtered() {
        let flat = FaceRecord::new(
            Face3::make_face_from_wires(vec![Wire3::new(vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ])])
            .unwrap(),
            Color::default(),
            None,
        );
        let upright = FaceRecord::new(
            Face3::make_face_from_wires(vec![Wire3::new(vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 1.0),
            ])])
            .unwrap(),
            Color::default(),
            None,
        );

        let mut faces = vec![flat, upright];
        filter_misoriented(&mut faces, &Vector3::new(0.0, 0.0, 1.0), 1e-4);

        assert_eq!(faces.len(), 1);
        assert!(faces[0].original.normal.z.abs() > 0.9);
    }
}
