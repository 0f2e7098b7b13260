// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face records and style tags
//!
//! A `FaceRecord` pairs an untouched 3D face with its style tags and,
//! after the projection step, its 2D image in the working plane.

use nalgebra::{Point2, Vector3};
use plancut_kernel::Face3;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// RGB color with components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Hex form used for SVG fills, e.g. "#cc8833"
    pub fn to_hex(&self) -> String {
        let channel = |c: f64| ((c.clamp(0.0, 1.0) * 255.0) as u8);
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        // Neutral gray, the fallback for untagged solids
        Self::new(0.8, 0.8, 0.8)
    }
}

/// Material hatch style resolved from a solid's material tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKind {
    /// Diagonal hatch
    Default,
    /// Diagonal grain
    Wood,
    /// Zig-zag
    InsulationHard,
    /// Coil
    InsulationSoft,
    /// Cross-hatch
    Window,
}

impl PatternKind {
    /// Identifier used in pattern ids and material tags
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Default => "DEFAULT",
            PatternKind::Wood => "WOOD",
            PatternKind::InsulationHard => "INSULATION_HARD",
            PatternKind::InsulationSoft => "INSULATION_SOFT",
            PatternKind::Window => "WINDOW",
        }
    }

    /// Resolve a material tag; unknown names fall back to the default
    /// hatch with a warning
    pub fn from_name(name: &str) -> Self {
        match name {
            "DEFAULT" => PatternKind::Default,
            "WOOD" => PatternKind::Wood,
            "INSULATION_HARD" => PatternKind::InsulationHard,
            "INSULATION_SOFT" => PatternKind::InsulationSoft,
            "WINDOW" => PatternKind::Window,
            other => {
                warn!("Unknown pattern type {other}, falling back to DEFAULT");
                PatternKind::Default
            }
        }
    }
}

/// Numeric tolerances of the pipeline, explicit and caller-overridable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tolerances {
    /// Coordinate tolerance for the coplanarity predicate (mm)
    pub coplanar: f64,
    /// Half-width of the "exactly 90 degrees" band of the orientation
    /// filter (degrees)
    pub angle_deg: f64,
    /// Decimal places used when rounding 2D vertices for matching
    pub coord_decimals: u32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            coplanar: 1e-5,
            angle_deg: 1e-4,
            coord_decimals: 5,
        }
    }
}

/// A projected 2D edge; arcs keep their radius for path emission
#[derive(Debug, Clone, PartialEq)]
pub enum Edge2 {
    Line {
        start: Point2<f64>,
        end: Point2<f64>,
    },
    Arc {
        start: Point2<f64>,
        end: Point2<f64>,
        radius: f64,
    },
}

impl Edge2 {
    pub fn start(&self) -> Point2<f64> {
        match self {
            Edge2::Line { start, .. } | Edge2::Arc { start, .. } => *start,
        }
    }

    pub fn end(&self) -> Point2<f64> {
        match self {
            Edge2::Line { end, .. } | Edge2::Arc { end, .. } => *end,
        }
    }
}

/// An ordered, connected loop of 2D edges
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wire2 {
    pub edges: Vec<Edge2>,
}

impl Wire2 {
    /// Wire from a closed polygon loop
    pub fn from_points(points: &[Point2<f64>]) -> Self {
        let n = points.len();
        let edges = (0..n)
            .map(|i| Edge2::Line {
                start: points[i],
                end: points[(i + 1) % n],
            })
            .collect();
        Self { edges }
    }

    /// Start vertices of all edges (the wire's vertex loop)
    pub fn points(&self) -> Vec<Point2<f64>> {
        self.edges.iter().map(|e| e.start()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn reversed(&self) -> Self {
        let edges = self
            .edges
            .iter()
            .rev()
            .map(|e| match e {
                Edge2::Line { start, end } => Edge2::Line {
                    start: *end,
                    end: *start,
                },
                Edge2::Arc { start, end, radius } => Edge2::Arc {
                    start: *end,
                    end: *start,
                    radius: *radius,
                },
            })
            .collect();
        Self { edges }
    }
}

/// A face projected into the working plane, outer wire first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Face2 {
    pub wires: Vec<Wire2>,
}

impl Face2 {
    pub fn new(wires: Vec<Wire2>) -> Self {
        Self { wires }
    }

    /// All vertices across all wires
    pub fn vertices(&self) -> impl Iterator<Item = Point2<f64>> + '_ {
        self.wires.iter().flat_map(|w| w.points())
    }

    /// 2D bounds as (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut iter = self.vertices();
        let first = iter.next()?;
        let mut b = (first.x, first.y, first.x, first.y);
        for p in iter {
            b.0 = b.0.min(p.x);
            b.1 = b.1.min(p.y);
            b.2 = b.2.max(p.x);
            b.3 = b.3.max(p.y);
        }
        Some(b)
    }

    /// Signed area of the outer wire (positive = counter-clockwise)
    pub fn signed_area(&self) -> f64 {
        let Some(outer) = self.wires.first() else {
            return 0.0;
        };
        let points = outer.points();
        let n = points.len();
        let mut area2 = 0.0;
        for i in 0..n {
            let p = &points[i];
            let q = &points[(i + 1) % n];
            area2 += p.x * q.y - q.x * p.y;
        }
        area2 / 2.0
    }

    /// Flip the face winding
    pub fn reversed(&self) -> Self {
        Self {
            wires: self.wires.iter().map(|w| w.reversed()).collect(),
        }
    }
}

/// A classified face: the untouched 3D original, its style tags and the
/// lazily populated 2D projection
#[derive(Debug, Clone)]
pub struct FaceRecord {
    pub original: Face3,
    pub color: Color,
    pub pattern: Option<PatternKind>,
    pub projected: Option<Face2>,
}

impl FaceRecord {
    pub fn new(original: Face3, color: Color, pattern: Option<PatternKind>) -> Self {
        Self {
            original,
            color,
            pattern,
            projected: None,
        }
    }

    /// Rounded 2D vertex keys of the projection
    fn vertex_keys(&self, decimals: u32) -> Option<(usize, FxHashSet<(i64, i64)>)> {
        let projected = self.projected.as_ref()?;
        let scale = 10f64.powi(decimals as i32);
        let mut count = 0usize;
        let keys = projected
            .vertices()
            .map(|p| {
                count += 1;
                ((p.x * scale).round() as i64, (p.y * scale).round() as i64)
            })
            .collect();
        Some((count, keys))
    }

    /// Two projected faces match when their rounded 2D vertex sets are
    /// equal as sets and of equal cardinality. The rounding absorbs
    /// floating-point noise from independent boolean operations.
    pub fn matches(&self, other: &FaceRecord, decimals: u32) -> bool {
        let (Some((count_a, keys_a)), Some((count_b, keys_b))) =
            (self.vertex_keys(decimals), other.vertex_keys(decimals))
        else {
            return false;
        };

        count_a == count_b && keys_a == keys_b
    }

    /// A face edge-on to the view collapses to a line in 2D; it is
    /// dropped when its normal sits within the tolerance band around
    /// exactly 90 degrees to the plane normal.
    pub fn correctly_oriented(&self, plane_normal: &Vector3<f64>, angle_eps_deg: f64) -> bool {
        let cos = self
            .original
            .normal
            .dot(plane_normal)
            .clamp(-1.0, 1.0);
        let angle_deg = cos.acos().to_degrees();
        (angle_deg - 90.0).abs() > angle_eps_deg
    }
}
