// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Annotation rendering
//!
//! Dimension lines, section-cut traces, markers and the title block.
//! Stroke widths, dash arrays and font sizes are emitted as placeholders
//! and substituted scale-relative at document assembly.

use crate::path::{format_number, path_data, xml_escape};
use nalgebra::{Point2, Point3, Vector2};
use plancut_section::{Color, Face3, Placement, PlaneFrame, Projector};

/// Half-length of a dimension end tick (document units)
const TICK_HALF_LENGTH: f64 = 50.0;
/// Arrowhead size and label offset of section-cut lines (document units)
const CUT_MARK_SIZE: f64 = 100.0;
/// Dimension values are stored in mm and labeled in cm
const DIMENSION_UNIT_DIVISOR: f64 = 10.0;

/// A straight dimension between two model points
#[derive(Debug, Clone)]
pub struct DimensionAnnotation {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    /// Anchor of the measurement text
    pub text_base: Point3<f64>,
    /// Decimal places of the rendered value
    pub decimals: u32,
}

/// An auxiliary section plane drawn as a cut-line marker in this view
#[derive(Debug, Clone)]
pub struct SectionCutShape {
    pub placement: Placement,
    pub length: f64,
    pub height: f64,
    pub label: String,
}

/// A highlighted flat region with a label
#[derive(Debug, Clone)]
pub struct MarkerShape {
    pub face: Face3,
    pub label: String,
    pub color: Color,
}

/// Angle of a 2D segment in degrees, normalized into [0, 90) by
/// repeated subtraction of 90
fn normalized_angle(start: &Point2<f64>, end: &Point2<f64>) -> f64 {
    let mut angle = (end.y - start.y).atan2(end.x - start.x).to_degrees();
    while angle < 0.0 {
        angle += 90.0;
    }
    while angle >= 90.0 {
        angle -= 90.0;
    }
    angle
}

fn text_element(x: f64, y: f64, rotation_deg: f64, anchor: &str, content: &str, precision: u32) -> String {
    let x = format_number(x, precision);
    let y = format_number(y, precision);
    let rotation = format_number(rotation_deg, precision);
    format!(
        "<text x=\"{x}\" y=\"{y}\" transform=\"rotate({rotation} {x} {y})\" \
         style=\"font-size:TEXT_FONT_SIZE;font-family:Arial;fill:#000000;text-anchor:{anchor};stroke:none;\">{}</text>\n",
        xml_escape(content)
    )
}

/// Dimension line: connecting path, perpendicular end ticks and the
/// measurement text rotated to the line
pub fn dimension_svg(dim: &DimensionAnnotation, projector: &Projector, precision: u32) -> String {
    let (start, end) = projector.project_edge(&(dim.start, dim.end));
    let frame = projector.frame();
    let base3 = frame.local_coords(&dim.text_base);
    let base = Point2::new(base3.x, base3.y);

    let angle = normalized_angle(&start, &end);
    let fmt = |v: f64| format_number(v, precision);

    let mut svg = format!(
        "<path d=\"M {} {} L {} {}\" stroke=\"#000000\" stroke-width=\"DIMENSION_STROKE_WIDTH\" fill=\"none\"/>\n",
        fmt(start.x),
        fmt(-start.y),
        fmt(end.x),
        fmt(-end.y)
    );

    for p in [&start, &end] {
        let x = fmt(p.x);
        let y_top = fmt(-p.y - TICK_HALF_LENGTH);
        let y_bottom = fmt(-p.y + TICK_HALF_LENGTH);
        let y = fmt(-p.y);
        let a = fmt(angle);
        svg.push_str(&format!(
            "<path d=\"M {x} {y_top} L {x} {y_bottom}\" stroke=\"#000000\" stroke-width=\"DIMENSION_STROKE_WIDTH\" fill=\"none\" transform=\"rotate({a} {x} {y})\"/>\n"
        ));
    }

    let distance = (dim.end - dim.start).norm();
    let value = format_number(distance / DIMENSION_UNIT_DIVISOR, dim.decimals);
    svg.push_str(&text_element(
        base.x, -base.y, angle, "middle", &value, precision,
    ));

    svg
}

/// Section-cut trace: the dashed line where an auxiliary cut plane lies
/// in the current view, with arrowheads and labels at both ends pointing
/// along the auxiliary plane's projected normal
pub fn section_cut_svg(
    shape: &SectionCutShape,
    frame: &PlaneFrame,
    tolerance: f64,
    precision: u32,
) -> String {
    let aux = PlaneFrame::from_placement(&shape.placement);
    let length = if shape.length > 0.0 { shape.length } else { 10_000.0 };
    let height = if shape.height > 0.0 { shape.height } else { 10_000.0 };
    let Ok(rect) = aux.plane_face(length, height) else {
        return String::new();
    };

    // Projected direction the auxiliary plane looks along
    let normal3 = frame.local_dir(&aux.normal);
    let Some(normal2) = Vector2::new(normal3.x, normal3.y).try_normalize(1e-9) else {
        // The auxiliary plane is parallel to this view; nothing to draw
        return String::new();
    };
    let perp = Vector2::new(-normal2.y, normal2.x);

    // Walk the rectangle boundary and collect where it meets the current
    // plane: edges lying in the plane contribute both endpoints, edges
    // crossing it contribute the interpolated crossing point
    let mut trace: Vec<Point2<f64>> = Vec::new();
    let mut push_point = |p: Point3<f64>, trace: &mut Vec<Point2<f64>>| {
        let local = frame.local_coords(&p);
        let p2 = Point2::new(local.x, local.y);
        if !trace.iter().any(|q| (q - p2).norm() < tolerance.max(1e-9)) {
            trace.push(p2);
        }
    };
    for (a, b) in rect.outer.segments() {
        let da = frame.signed_distance(&a);
        let db = frame.signed_distance(&b);
        let a_on = da.abs() <= tolerance;
        let b_on = db.abs() <= tolerance;

        if a_on {
            push_point(a, &mut trace);
        }
        if b_on {
            push_point(b, &mut trace);
        }
        if !a_on && !b_on && (da < 0.0) != (db < 0.0) {
            let t = da / (da - db);
            push_point(a + (b - a) * t, &mut trace);
        }
    }

    if trace.len() < 2 {
        return String::new();
    }

    let fmt = |v: f64| format_number(v, precision);
    let mut svg = String::new();

    {
        let p1 = trace[0];
        let p2 = trace[1];

        svg.push_str(&format!(
            "<path d=\"M {} {} L {} {}\" stroke=\"#000000\" stroke-width=\"CUTLINE_STROKE_WIDTH\" stroke-dasharray=\"CUTLINE_DASHARRAY\" fill=\"none\"/>\n",
            fmt(p1.x),
            fmt(-p1.y),
            fmt(p2.x),
            fmt(-p2.y)
        ));

        // Label rotation measured against the fixed (0, -1) reference
        let dir = (p2 - p1).normalize();
        let reference = Vector2::new(0.0, -1.0);
        let label_angle = (reference.x * dir.y - reference.y * dir.x)
            .atan2(reference.dot(&dir))
            .to_degrees();

        for p in [&p1, &p2] {
            let tip = p + normal2 * CUT_MARK_SIZE;
            let left = p + perp * (CUT_MARK_SIZE / 2.0);
            let right = p - perp * (CUT_MARK_SIZE / 2.0);
            svg.push_str(&format!(
                "<path d=\"M {} {} L {} {} L {} {} Z\" fill=\"#000000\" stroke=\"none\"/>\n",
                fmt(left.x),
                fmt(-left.y),
                fmt(right.x),
                fmt(-right.y),
                fmt(tip.x),
                fmt(-tip.y)
            ));

            svg.push_str(&text_element(
                tip.x,
                -tip.y,
                label_angle,
                "middle",
                &shape.label,
                precision,
            ));
        }
    }

    svg
}

/// Marker: the projected region as a low-opacity dashed outline with a
/// centered label
pub fn marker_svg(marker: &MarkerShape, projector: &Projector, precision: u32) -> String {
    let Some(face2) = projector.project(&marker.face) else {
        return String::new();
    };

    let mut pathdata = String::new();
    for wire in &face2.wires {
        pathdata.push_str(&path_data(wire, precision));
    }

    let fill = marker.color.to_hex();
    let mut svg = format!(
        "<path d=\"{pathdata}\" style=\"fill:{fill}; fill-opacity:0.2; fill-rule: evenodd; stroke:{fill}; stroke-width:MARKER_STROKE_WIDTH; stroke-dasharray:MARKER_DASHARRAY;\"/>\n"
    );

    let centroid3 = projector.frame().local_coords(&marker.face.centroid());
    svg.push_str(&text_element(
        centroid3.x,
        -centroid3.y,
        0.0,
        "middle",
        &marker.label,
        precision,
    ));

    svg
}

/// Right-aligned title and "1:N" scale block, placed relative to the
/// page offset computed by the bounding box
pub fn title_block_svg(
    label: &str,
    scale: f64,
    offset: (f64, f64, f64, f64),
    precision: u32,
) -> String {
    let (scaled_width, scaled_height, x, y) = offset;
    let margin = CUT_MARK_SIZE;
    let right = x + scaled_width - margin;
    let bottom = y + scaled_height - margin;

    let denominator = if scale > 0.0 { (1.0 / scale).round() } else { 0.0 };
    let scale_text = format!("1:{}", format_number(denominator, 0));

    let mut svg = String::new();
    if !label.is_empty() {
        svg.push_str(&text_element(
            right,
            bottom - 1.5 * CUT_MARK_SIZE,
            0.0,
            "end",
            label,
            precision,
        ));
    }
    svg.push_str(&text_element(
        right,
        bottom,
        0.0,
        "end",
        &scale_text,
        precision,
    ));

    svg
}
