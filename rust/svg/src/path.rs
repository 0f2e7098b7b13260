// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SVG path emission
//!
//! Converts projected 2D wires into path-data strings. The SVG Y axis
//! points down while the working plane's Y axis points up, so every Y
//! coordinate is negated at emission time.

use plancut_section::{Edge2, Wire2};

/// Round a value to `precision` decimals and render it; integers print
/// without a decimal point when the precision is 0
pub fn format_number(value: f64, precision: u32) -> String {
    if precision == 0 {
        return format!("{}", value.round() as i64);
    }

    let formatted = format!("{value:.prec$}", prec = precision as usize);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Escape a string for use in SVG text content
pub fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Path data for a 2D wire: `M` to the first vertex, `L` per line edge,
/// `A` per arc edge (sweep flag fixed at 1, assuming consistent winding
/// from the upstream wire ordering), `Z` when the wire has more than one
/// edge.
pub fn path_data(wire: &Wire2, precision: u32) -> String {
    if wire.edges.is_empty() {
        return String::new();
    }

    let cmd = |letter: char, x: f64, y: f64| {
        format!(
            "{letter} {} {} ",
            format_number(x, precision),
            format_number(-y, precision)
        )
    };

    let first = wire.edges[0].start();
    let mut svg = cmd('M', first.x, first.y);

    for edge in &wire.edges {
        match edge {
            Edge2::Line { end, .. } => {
                svg.push_str(&cmd('L', end.x, end.y));
            }
            Edge2::Arc { end, radius, .. } => {
                let r = format_number(*radius, precision);
                svg.push_str(&format!(
                    "A {r} {r} 0 0 1 {} {} ",
                    format_number(end.x, precision),
                    format_number(-end.y, precision)
                ));
            }
        }
    }

    if wire.edges.len() > 1 {
        svg.push_str("Z ");
    }

    svg
}
