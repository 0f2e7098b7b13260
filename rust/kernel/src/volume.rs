// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cut-volume construction
//!
//! Builds the half-space volumes bounded by a working plane, sized to the
//! joint extents of the solids being cut. The positive-side volume is
//! subtracted from each solid; the inverse volume yields hidden-line
//! geometry.

use crate::error::Result;
use crate::plane::{extrude, PlaneFrame};
use crate::solid::{Bounds3, Face3, Solid};

/// Margin added around the solids' extents so the volume fully encloses
/// them (mm)
const EXTENT_MARGIN: f64 = 1.0;

/// The planar cross-section and the two half-space volumes it bounds
#[derive(Debug, Clone)]
pub struct CutVolume {
    /// Rectangle lying in the plane, covering the cut extent
    pub cut_face: Face3,
    /// Volume on the positive-normal side (the removed half)
    pub volume: Solid,
    /// Volume on the negative-normal side
    pub inverse: Solid,
}

/// Build the cut volume for a plane against a set of solids.
///
/// With `clip` the rectangle is the finite plane extent (length, height);
/// otherwise it spans the solids' projected bounds. Returns `Ok(None)`
/// when there are no solids or nothing lies on the positive side of the
/// plane.
pub fn cut_volume(
    frame: &PlaneFrame,
    solids: &[&Solid],
    clip: Option<(f64, f64)>,
) -> Result<Option<CutVolume>> {
    let mut bounds: Option<Bounds3> = None;
    for solid in solids {
        if let Some(b) = solid.bounds() {
            match &mut bounds {
                Some(acc) => acc.merge(&b),
                None => bounds = Some(b),
            }
        }
    }
    let Some(bounds) = bounds else {
        return Ok(None);
    };

    // Extent of the solids in frame coordinates
    let mut d_min = f64::INFINITY;
    let mut d_max = f64::NEG_INFINITY;
    let mut u_min = f64::INFINITY;
    let mut u_max = f64::NEG_INFINITY;
    let mut v_min = f64::INFINITY;
    let mut v_max = f64::NEG_INFINITY;
    for corner in bounds.corners() {
        let local = frame.local_coords(&corner);
        u_min = u_min.min(local.x);
        u_max = u_max.max(local.x);
        v_min = v_min.min(local.y);
        v_max = v_max.max(local.y);
        d_min = d_min.min(local.z);
        d_max = d_max.max(local.z);
    }

    if d_max <= 0.0 {
        // Everything lies behind the plane; there is nothing to remove
        return Ok(None);
    }

    let (length, height) = match clip {
        Some((l, h)) => (l, h),
        None => {
            let span_u = (u_max - u_min).abs().max(EXTENT_MARGIN) + 2.0 * EXTENT_MARGIN;
            let span_v = (v_max - v_min).abs().max(EXTENT_MARGIN) + 2.0 * EXTENT_MARGIN;
            // Center the rectangle on the projected extents, not the
            // frame origin
            let center_u = (u_min + u_max) / 2.0;
            let center_v = (v_min + v_max) / 2.0;
            let shifted = PlaneFrame {
                origin: frame.global_coords(&nalgebra::Point3::new(center_u, center_v, 0.0)),
                u: frame.u,
                v: frame.v,
                normal: frame.normal,
            };
            let cut_face = shifted.plane_face(span_u, span_v)?;
            return build(frame, cut_face, d_min, d_max);
        }
    };

    let cut_face = frame.plane_face(length, height)?;
    build(frame, cut_face, d_min, d_max)
}

fn build(
    frame: &PlaneFrame,
    cut_face: Face3,
    d_min: f64,
    d_max: f64,
) -> Result<Option<CutVolume>> {
    let forward = frame.normal * (d_max + EXTENT_MARGIN);
    let backward = -frame.normal * (d_min.min(0.0).abs() + EXTENT_MARGIN);

    let volume = extrude(&cut_face, forward)?;
    let inverse = extrude(&cut_face, backward)?;

    Ok(Some(CutVolume {
        cut_face,
        volume,
        inverse,
    }))
}
