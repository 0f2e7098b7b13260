// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Material legend
//!
//! A standalone A4 document listing one pattern swatch per material with
//! its label, sharing the pattern registry and the scale-normalization
//! pass with the section renderer.

use crate::path::{format_number, xml_escape};
use crate::patterns::{scale_patterns, PatternRegistry};
use plancut_section::{Color, PatternKind};

const LEGEND_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="210mm" height="297mm" viewBox="0 0 210 297"
     version="1.1">
    <g id="patterns">
        PATTERN_SVG
    </g>

    LEGEND_CONTENT
</svg>
"#;

/// Top-left corner of the first row (mm)
const TOP_LEFT: (f64, f64) = (20.0, 20.0);
/// Vertical advance per row (mm)
const ROW_ADVANCE: f64 = 12.0;

/// One material in the legend
#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    pub pattern: Option<PatternKind>,
}

fn entry_svg(index: usize, entry: &LegendEntry, registry: &mut PatternRegistry) -> String {
    let x = TOP_LEFT.0;
    let y = TOP_LEFT.1 + index as f64 * ROW_ADVANCE;
    let fill = format!("url(#{})", registry.resolve(entry.color, entry.pattern, 1.0));

    let rect = format!(
        "<rect x=\"{}\" y=\"{}\" height=\"10\" width=\"20\" stroke=\"#000000\" stroke-width=\"0.5\" style=\"fill:{fill}; fill-rule: evenodd; stroke-miterlimit:1; stroke-linejoin:round; stroke-dasharray:none;\"/>",
        format_number(x, 3),
        format_number(y, 3)
    );
    let text = format!(
        "<text x=\"{}\" y=\"{}\" style=\"font-size:5;font-family:Arial;fill:#000000;text-anchor:start;stroke:none;\">{}</text>",
        format_number(x + 30.0, 3),
        format_number(y + 7.0, 3),
        xml_escape(&entry.label)
    );

    format!("<g>\n{rect}\n{text}\n</g>\n")
}

/// Build the legend document
pub fn legend(entries: &[LegendEntry]) -> String {
    let mut registry = PatternRegistry::new();
    let mut content = String::new();

    for (index, entry) in entries.iter().enumerate() {
        content.push_str(&entry_svg(index, entry, &mut registry));
    }

    // Legend swatches are drawn at page scale
    let patterns = scale_patterns(&registry.pattern_svg(), 1.0);

    LEGEND_TEMPLATE
        .replace("PATTERN_SVG", &patterns)
        .replace("LEGEND_CONTENT", &content)
}
