// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Kernel-level scenarios combining booleans, cut volumes and extrusion.

use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};
use plancut_kernel::{cut_volume, extrude, is_coplanar, BooleanEngine, Placement, PlaneFrame, Solid};

#[test]
fn cut_volume_subtraction_exposes_section_plane() {
    // A wall straddling a horizontal plane; subtracting the cut volume
    // must leave exactly one face lying in the plane.
    let frame = PlaneFrame::from_placement(&Placement::at(Point3::new(500.0, 500.0, 100.0)));
    let wall = Solid::cuboid(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1000.0, 1000.0, 200.0),
    );

    let cut = cut_volume(&frame, &[&wall], None).unwrap().unwrap();
    let residual = BooleanEngine::new().subtract(&wall, &cut.volume).unwrap();

    let coplanar: Vec<_> = residual
        .faces
        .iter()
        .filter(|f| is_coplanar(f, &cut.cut_face, 1e-5))
        .collect();
    assert_eq!(coplanar.len(), 1, "one face in the cut plane");
    assert_relative_eq!(coplanar[0].area(), 1000.0 * 1000.0, epsilon = 1e-3);

    let bounds = residual.bounds().unwrap();
    assert_relative_eq!(bounds.max.z, 100.0, epsilon = 1e-6);
    assert_relative_eq!(bounds.min.z, 0.0, epsilon = 1e-6);
}

#[test]
fn opening_survives_cut_as_hole() {
    // Punch a shaft through a slab, then cut the slab horizontally: the
    // section face must carry the shaft as a hole wire.
    let engine = BooleanEngine::new();
    let slab = Solid::cuboid(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2000.0, 2000.0, 300.0),
    );
    let shaft = Solid::cuboid(
        Point3::new(800.0, 800.0, -100.0),
        Point3::new(1200.0, 1200.0, 400.0),
    );
    let slab_with_shaft = engine.subtract(&slab, &shaft).unwrap();

    let frame = PlaneFrame::from_placement(&Placement::at(Point3::new(1000.0, 1000.0, 150.0)));
    let cut = cut_volume(&frame, &[&slab_with_shaft], None)
        .unwrap()
        .unwrap();
    let residual = engine.subtract(&slab_with_shaft, &cut.volume).unwrap();

    let section = residual
        .faces
        .iter()
        .find(|f| is_coplanar(f, &cut.cut_face, 1e-5))
        .expect("section face at z = 150");
    assert_eq!(section.holes.len(), 1, "shaft leaves a hole in the section");
    assert_relative_eq!(section.area(), 2000.0 * 2000.0, epsilon = 1e-2);
}

#[test]
fn extruded_plane_face_acts_as_half_space() {
    // The fallback volume the section engine synthesizes: a plane face
    // extruded along its normal removes exactly the half of a solid on
    // the positive side.
    let frame = PlaneFrame::from_placement(&Placement::at(Point3::new(0.0, 0.0, 50.0)));
    let face = frame.plane_face(4000.0, 4000.0).unwrap();
    let volume = extrude(&face, Vector3::new(0.0, 0.0, 1000.0)).unwrap();

    let boxy = Solid::cuboid(
        Point3::new(-100.0, -100.0, 0.0),
        Point3::new(100.0, 100.0, 100.0),
    );
    let residual = BooleanEngine::new().subtract(&boxy, &volume).unwrap();

    let bounds = residual.bounds().unwrap();
    assert_relative_eq!(bounds.max.z, 50.0, epsilon = 1e-6);
    assert_relative_eq!(bounds.min.z, 0.0, epsilon = 1e-6);
}

#[test]
fn rotated_frame_cut_keeps_clipped_extent() {
    // A vertical clipped plane looking along -Y: the finite rectangle
    // bounds the cut face regardless of the solids' extents.
    let placement = Placement::from_axis_angle(
        Point3::new(1500.0, 150.0, 1250.0),
        Vector3::x(),
        90.0,
    );
    let frame = PlaneFrame::from_placement(&placement);
    let wall = Solid::cuboid(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(3000.0, 300.0, 2500.0),
    );

    let cut = cut_volume(&frame, &[&wall], Some((1000.0, 800.0)))
        .unwrap()
        .unwrap();

    let fb = cut.cut_face.bounds();
    assert_relative_eq!(fb.max.x - fb.min.x, 1000.0, epsilon = 1e-9);
    assert_relative_eq!(fb.max.z - fb.min.z, 800.0, epsilon = 1e-9);
    assert_relative_eq!(fb.max.y - fb.min.y, 0.0, epsilon = 1e-9);
}
