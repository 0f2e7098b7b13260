// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Material fill patterns
//!
//! Each material maps to a tileable `<pattern>` definition. Tiles are
//! authored in document units and carry a scale placeholder; the
//! normalization pass substitutes `1 / scale` once over the final
//! pattern markup so hatch density stays constant on paper.

use crate::path::format_number;
use plancut_section::{Color, PatternKind};
use rustc_hash::FxHashSet;

/// Diagonal hatch, the fallback for untagged materials
const DEFAULT_PATTERN_TEMPLATE: &str = r#"
<pattern
    id="PATTERN_ID"
    patternUnits="userSpaceOnUse"
    x="0" y="0" width="100" height="100"
    patternTransform="scale(PATTERN_SCALE)">
        <g>
            <rect width="100" height="100"
                style="stroke:none; fill:#ffffff" />
            <path style="stroke:PATTERN_COLOR; stroke-width:10; stroke-linecap:butt; stroke-linejoin:miter; fill:none; opacity:PATTERN_OPACITY"
                  d="M0,0 l100,100" />
        </g>
</pattern>
"#;

/// Diagonal grain
const WOOD_PATTERN_TEMPLATE: &str = r#"
<pattern
    id="PATTERN_ID"
    patternUnits="userSpaceOnUse"
    x="0" y="0" width="100" height="100"
    patternTransform="scale(PATTERN_SCALE)">
        <g>
            <rect width="100" height="100"
                style="stroke:none; fill:#ffffff" />
            <path style="stroke:PATTERN_COLOR; stroke-width:10; stroke-linecap:butt; stroke-linejoin:miter; fill:none; opacity:PATTERN_OPACITY"
                  d="M 0,100 100,0 M 0,50 50,0 M 50,100 100,50 M 20,90 C 35,70 55,75 70,55" />
        </g>
</pattern>
"#;

/// Zig-zag
const INSULATION_HARD_PATTERN_TEMPLATE: &str = r#"
<pattern
    id="PATTERN_ID"
    patternUnits="userSpaceOnUse"
    x="0" y="0" width="100" height="100"
    patternTransform="scale(PATTERN_SCALE)">
        <g>
            <rect width="100" height="100"
                style="stroke:none; fill:#ffffff" />
            <path style="stroke:PATTERN_COLOR; stroke-width:10; stroke-linecap:butt; stroke-linejoin:miter; fill:none; opacity:PATTERN_OPACITY"
                  d="M 0,0 100,25 0,50 100,75 0,100" />
        </g>
</pattern>
"#;

/// Coil
const INSULATION_SOFT_PATTERN_TEMPLATE: &str = r#"
<pattern
    id="PATTERN_ID"
    patternUnits="userSpaceOnUse"
    x="0" y="0" width="100" height="100"
    patternTransform="scale(PATTERN_SCALE)">
        <g>
            <rect width="100" height="100"
                style="stroke:none; fill:#ffffff" />
            <path style="stroke:PATTERN_COLOR; stroke-width:10; stroke-linecap:butt; stroke-linejoin:miter; fill:none; opacity:PATTERN_OPACITY"
                  d="M 25,0 75,25 25,50 75,75 25,100 M 25,0 C 25,0 0,9.9768635 0,24.999995 0,40.023126 25,50 25,50 m 0,0 C 25,50 0,59.976863 0,74.999995 0,90.023126 25,100.00001 25,100.00001 M 75,75 c 0,0 25,9.976865 25,24.999997 C 100,115.02313 75,125 75,125 m 0,-150 c 0,0 25,9.976868 25,25 0,15.023131 -25,25 -25,25 m 0,0 c 0,0 25,9.976869 25,25 0,15.023131 -25,25 -25,25" />
        </g>
</pattern>
"#;

/// Cross-hatch
const WINDOW_PATTERN_TEMPLATE: &str = r#"
<pattern
    id="PATTERN_ID"
    patternUnits="userSpaceOnUse"
    x="0" y="0" width="100" height="100"
    patternTransform="scale(PATTERN_SCALE)">
        <g>
            <rect width="100" height="100"
                style="stroke:none; fill:#ffffff" />
            <path style="stroke:PATTERN_COLOR; stroke-width:10; stroke-linecap:butt; stroke-linejoin:miter; fill:none; opacity:PATTERN_OPACITY"
                  d="M 0,100 100,0 M 0,0 100,100" />
        </g>
</pattern>
"#;

fn template_for(kind: PatternKind) -> &'static str {
    match kind {
        PatternKind::Default => DEFAULT_PATTERN_TEMPLATE,
        PatternKind::Wood => WOOD_PATTERN_TEMPLATE,
        PatternKind::InsulationHard => INSULATION_HARD_PATTERN_TEMPLATE,
        PatternKind::InsulationSoft => INSULATION_SOFT_PATTERN_TEMPLATE,
        PatternKind::Window => WINDOW_PATTERN_TEMPLATE,
    }
}

/// Pass-scoped registry deduplicating pattern definitions.
///
/// Identical `(kind, color, opacity)` requests resolve to the same id and
/// emit a single `<pattern>`; markup is kept in insertion order so the
/// output is deterministic.
#[derive(Debug, Default)]
pub struct PatternRegistry {
    ids: FxHashSet<String>,
    entries: Vec<String>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a fill to a pattern id, registering the definition on
    /// first use. A missing kind resolves to the default hatch.
    pub fn resolve(&mut self, color: Color, kind: Option<PatternKind>, opacity: f64) -> String {
        let kind = kind.unwrap_or(PatternKind::Default);
        let fill = color.to_hex();
        let id = format!(
            "{}-{}-{}",
            kind.as_str().to_lowercase(),
            fill.trim_start_matches('#'),
            format_number(opacity, 3)
        );

        if !self.ids.contains(&id) {
            let markup = template_for(kind)
                .replace("PATTERN_ID", &id)
                .replace("PATTERN_COLOR", &fill)
                .replace("PATTERN_OPACITY", &format_number(opacity, 3));
            self.ids.insert(id.clone());
            self.entries.push(markup);
        }

        id
    }

    /// Concatenated pattern markup in insertion order, scale placeholders
    /// still in place
    pub fn pattern_svg(&self) -> String {
        let mut svg = String::new();
        for entry in &self.entries {
            svg.push_str(entry);
            svg.push('\n');
        }
        svg
    }

    /// Number of registered definitions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Substitute the scale placeholder over assembled pattern markup so
/// tiles keep constant on-paper density at the requested output scale
pub fn scale_patterns(svg: &str, scale: f64) -> String {
    let factor = if scale > 0.0 { 1.0 / scale } else { 1.0 };
    svg.replace("PATTERN_SCALE", &format_number(factor, 6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_requests_memoized() {
        let mut registry = PatternRegistry::new();
        let a = registry.resolve(Color::new(0.5, 0.5, 0.5), Some(PatternKind::Wood), 1.0);
        let b = registry.resolve(Color::new(0.5, 0.5, 0.5), Some(PatternKind::Wood), 1.0);

        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.pattern_svg().matches("<pattern").count(), 1);
    }

    #[test]
    fn distinct_opacity_gets_own_pattern() {
        let mut registry = PatternRegistry::new();
        let full = registry.resolve(Color::default(), Some(PatternKind::Default), 1.0);
        let faint = registry.resolve(Color::default(), Some(PatternKind::Default), 0.1);

        assert_ne!(full, faint);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn missing_kind_resolves_to_default() {
        let mut registry = PatternRegistry::new();
        let id = registry.resolve(Color::new(1.0, 0.0, 0.0), None, 1.0);
        assert!(id.starts_with("default-ff0000"));
        assert!(registry.pattern_svg().contains("stroke:#ff0000"));
    }

    #[test]
    fn scale_pass_normalizes_tiles() {
        let mut registry = PatternRegistry::new();
        registry.resolve(Color::default(), Some(PatternKind::Window), 1.0);

        let scaled = scale_patterns(&registry.pattern_svg(), 0.02);
        assert!(!scaled.contains("PATTERN_SCALE"));
        assert!(scaled.contains("scale(50)"));
    }

    #[test]
    fn every_kind_has_a_template() {
        let mut registry = PatternRegistry::new();
        for kind in [
            PatternKind::Default,
            PatternKind::Wood,
            PatternKind::InsulationHard,
            PatternKind::InsulationSoft,
            PatternKind::Window,
        ] {
            registry.resolve(Color::default(), Some(kind), 1.0);
        }
        assert_eq!(registry.len(), 5);
    }
}
