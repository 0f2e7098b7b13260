// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounding-box accumulation and viewBox computation
//!
//! Tracks the 2D extent of everything drawn and derives the viewBox that
//! centers the content on a page of given physical size at a given
//! scale.

use crate::path::format_number;
use nalgebra::Point2;
use plancut_section::FaceRecord;

/// Running 2D extent; the first update initializes instead of merging
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundBox {
    pub initialized: bool,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an extent; the first call replaces the empty state
    pub fn update(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        if !self.initialized {
            self.min_x = min_x;
            self.min_y = min_y;
            self.max_x = max_x;
            self.max_y = max_y;
            self.initialized = true;
            return;
        }

        if min_x < self.min_x {
            self.min_x = min_x;
        }
        if min_y < self.min_y {
            self.min_y = min_y;
        }
        if max_x > self.max_x {
            self.max_x = max_x;
        }
        if max_y > self.max_y {
            self.max_y = max_y;
        }
    }

    /// Grow over the projected bounds of face records
    pub fn adapt_from_faces(&mut self, faces: &[FaceRecord]) {
        for face in faces {
            if let Some((min_x, min_y, max_x, max_y)) =
                face.projected.as_ref().and_then(|p| p.bounds())
            {
                self.update(min_x, min_y, max_x, max_y);
            }
        }
    }

    /// Grow over a pair of 2D points (dimension endpoints)
    pub fn adapt_from_points(&mut self, start: &Point2<f64>, end: &Point2<f64>) {
        self.update(
            start.x.min(end.x),
            start.y.min(end.y),
            start.x.max(end.x),
            start.y.max(end.y),
        );
    }

    pub fn overall_width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn overall_height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// ViewBox placement for a page of `width` x `height` (mm) at
    /// `scale`: returns (scaled_width, scaled_height, origin_x,
    /// origin_y). Content smaller than the page is centered; larger
    /// content overflows symmetrically. Y is negated because the SVG Y
    /// axis points down.
    pub fn calculate_offset(&self, scale: f64, width: f64, height: f64) -> (f64, f64, f64, f64) {
        let scaled_width = width / scale;
        let scaled_height = height / scale;

        // Top left corner of the viewport
        let mut x = self.min_x;
        let mut y = -self.max_y;

        x -= (scaled_width - self.overall_width()) / 2.0;
        y -= (scaled_height - self.overall_height()) / 2.0;

        (scaled_width, scaled_height, x, y)
    }

    /// The viewBox attribute value
    pub fn build_viewbox(&self, scale: f64, width: f64, height: f64, precision: u32) -> String {
        let (scaled_width, scaled_height, x, y) = self.calculate_offset(scale, width, height);
        format!(
            "{} {} {} {}",
            format_number(x, precision),
            format_number(y, precision),
            format_number(scaled_width, precision),
            format_number(scaled_height, precision)
        )
    }
}
