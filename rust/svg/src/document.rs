// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Document assembly
//!
//! The render entry point: filters and groups the scene, runs the cut
//! pipeline, emits every SVG fragment and composes them into one
//! document. Stroke widths, font sizes and pattern tiles are emitted as
//! placeholders and substituted exactly once here, divided by the output
//! scale, so line weights are constant on paper.

use crate::annotations::{
    dimension_svg, marker_svg, section_cut_svg, title_block_svg, DimensionAnnotation, MarkerShape,
    SectionCutShape,
};
use crate::bbox::BoundBox;
use crate::error::{Error, Result};
use crate::path::{format_number, path_data};
use crate::patterns::{scale_patterns, PatternRegistry};
use plancut_section::{
    Color, CutOptions, FaceRecord, PatternKind, Placement, Projector, SectionEngine, Solid,
    TaggedSolid,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Current configuration schema version
pub const CONFIG_VERSION: u32 = 2;

/// Default secondary-face pattern opacity
const SECONDARY_OPACITY: f64 = 0.1;

// Line weights and font size on paper (mm); divided by the output scale
// at assembly
const SECTION_STROKE_MM: f64 = 0.5;
const WINDOW_STROKE_MM: f64 = 0.1;
const SECONDARY_STROKE_MM: f64 = 0.1;
const DIMENSION_STROKE_MM: f64 = 0.1;
const CUTLINE_STROKE_MM: f64 = 0.35;
const MARKER_STROKE_MM: f64 = 0.2;
const FONT_SIZE_MM: f64 = 4.8;
const CUTLINE_DASH_MM: (f64, f64) = (3.5, 1.8);
const MARKER_DASH_MM: (f64, f64) = (1.0, 1.0);

const SVG_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="WIDTHmm" height="HEIGHTmm" viewBox="VIEWBOX_VALUES"
     version="1.1">
    <g id="everything">
        <g id="patterns">
            PATTERN_SVG
        </g>

        <g id="secondary">
            SECONDARY_SVG
        </g>

        <g id="sections">
            SECTION_SVG
        </g>

        <g id="windows">
            WINDOW_SVG
        </g>

        <g id="drafts">
            DRAFT_SVG
        </g>

        <g id="sectioncuts">
            SECTIONCUT_SVG
        </g>

        <g id="markers">
            MARKER_SVG
        </g>

        <g id="information">
            INFORMATION_SVG
        </g>
    </g>
</svg>
"#;

/// Render configuration. A plain versioned struct: older serialized
/// versions are upgraded by `migrate` once at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Schema version of this struct
    pub version: u32,
    /// Output scale (0.02 = 1:50); divides strokes, fonts and pattern
    /// tiles
    pub scale: f64,
    /// Page width in mm
    pub page_width: f64,
    /// Page height in mm
    pub page_height: f64,
    /// Finite cut-plane length along U; 0 = infinite
    pub clip_length: f64,
    /// Finite cut-plane height along V; 0 = infinite
    pub clip_height: f64,
    /// Secondary-face visibility cutoff; 0 = unlimited
    pub clip_depth: f64,
    /// Distance within which secondary faces render with section
    /// prominence; 0 = off
    pub face_highlight_distance: f64,
    /// Decimal places of emitted coordinates
    pub precision: u32,
    /// Title-block label
    pub label: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            scale: 1.0 / 50.0,
            page_width: 420.0,
            page_height: 297.0,
            clip_length: 0.0,
            clip_height: 0.0,
            clip_depth: 0.0,
            face_highlight_distance: 0.0,
            precision: 6,
            label: String::new(),
        }
    }
}

impl RenderConfig {
    /// Upgrade a configuration loaded from an older schema: missing
    /// fields deserialized as zero are filled with their defaults
    pub fn migrate(mut self) -> Self {
        if self.version < CONFIG_VERSION {
            let defaults = Self::default();
            if self.scale <= 0.0 {
                self.scale = defaults.scale;
            }
            if self.page_width <= 0.0 {
                self.page_width = defaults.page_width;
            }
            if self.page_height <= 0.0 {
                self.page_height = defaults.page_height;
            }
            if self.precision == 0 {
                self.precision = defaults.precision;
            }
            self.version = CONFIG_VERSION;
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if self.page_width <= 0.0 || self.page_height <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "page size must be positive, got {} x {}",
                self.page_width, self.page_height
            )));
        }
        Ok(())
    }
}

/// What a scene object contributes to the drawing
#[derive(Debug, Clone)]
pub enum ScenePayload {
    /// A solid to cut and classify
    Solid {
        solid: Solid,
        color: Color,
        pattern: Option<PatternKind>,
    },
    /// An opening solid, classified independently
    Window {
        solid: Solid,
        color: Color,
        pattern: Option<PatternKind>,
    },
    /// A draft dimension
    Dimension(DimensionAnnotation),
    /// Another section plane, drawn as a cut-line marker
    SectionCut(SectionCutShape),
    /// A labeled highlight region
    Marker(MarkerShape),
}

/// An identified scene object; ids drive include/exclude filtering
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub id: u32,
    pub payload: ScenePayload,
}

impl SceneObject {
    pub fn new(id: u32, payload: ScenePayload) -> Self {
        Self { id, payload }
    }
}

struct Groups {
    objects: Vec<TaggedSolid>,
    windows: Vec<TaggedSolid>,
    dimensions: Vec<DimensionAnnotation>,
    section_cuts: Vec<SectionCutShape>,
    markers: Vec<MarkerShape>,
}

fn group_objects(include: &[SceneObject], exclude: &[u32]) -> Groups {
    let mut groups = Groups {
        objects: Vec::new(),
        windows: Vec::new(),
        dimensions: Vec::new(),
        section_cuts: Vec::new(),
        markers: Vec::new(),
    };

    for object in include {
        if exclude.contains(&object.id) {
            continue;
        }
        match &object.payload {
            ScenePayload::Solid {
                solid,
                color,
                pattern,
            } => groups
                .objects
                .push(TaggedSolid::new(solid.clone(), *color, *pattern)),
            ScenePayload::Window {
                solid,
                color,
                pattern,
            } => groups
                .windows
                .push(TaggedSolid::new(solid.clone(), *color, *pattern)),
            ScenePayload::Dimension(dim) => groups.dimensions.push(dim.clone()),
            ScenePayload::SectionCut(cut) => groups.section_cuts.push(cut.clone()),
            ScenePayload::Marker(marker) => groups.markers.push(marker.clone()),
        }
    }

    groups
}

fn face_path(record: &FaceRecord, fill: &str, stroke_token: &str, precision: u32) -> String {
    let Some(projected) = record.projected.as_ref() else {
        return String::new();
    };

    let mut pathdata = String::new();
    for wire in &projected.wires {
        pathdata.push_str(&path_data(wire, precision));
    }

    format!(
        "<path d=\"{pathdata}\" stroke=\"#000000\" stroke-width=\"{stroke_token}\" \
         style=\"fill:{fill}; fill-rule: evenodd; stroke-width:{stroke_token}; stroke-miterlimit:1; stroke-linejoin:round; stroke-dasharray:none;\"/>\n"
    )
}

fn section_faces_svg(
    faces: &[FaceRecord],
    registry: &mut PatternRegistry,
    stroke_token: &str,
    precision: u32,
) -> String {
    let mut svg = String::new();
    for record in faces {
        let fill = format!(
            "url(#{})",
            registry.resolve(record.color, record.pattern, 1.0)
        );
        svg.push_str(&face_path(record, &fill, stroke_token, precision));
    }
    svg
}

fn secondary_faces_svg(
    engine: &SectionEngine,
    registry: &mut PatternRegistry,
    highlight_distance: f64,
    precision: u32,
) -> String {
    let mut svg = String::new();
    for record in &engine.secondary_faces {
        let highlight = engine.is_in_range(&record.original, highlight_distance);
        let opacity = if highlight { 1.0 } else { SECONDARY_OPACITY };
        let stroke_token = if highlight {
            "SECTION_STROKE_WIDTH"
        } else {
            "SECONDARY_STROKE_WIDTH"
        };

        let fill = format!(
            "url(#{})",
            registry.resolve(record.color, record.pattern, opacity)
        );
        svg.push_str(&face_path(record, &fill, stroke_token, precision));
    }
    svg
}

/// Dashed hidden-line fragment; not part of the default document
pub fn hidden_svg(engine: &SectionEngine, linewidth: f64, precision: u32) -> String {
    let width = format_number(linewidth, precision);
    let mut svg = format!(
        "<g stroke=\"#000000\" stroke-width=\"{width}\" style=\"stroke-width:{width};stroke-miterlimit:1;stroke-linejoin:round;stroke-dasharray:0.09,0.05;fill:none;\">\n"
    );
    for (a, b) in &engine.projected_hidden {
        svg.push_str(&format!(
            "<path d=\"M {} {} L {} {}\"/>\n",
            format_number(a.x, precision),
            format_number(-a.y, precision),
            format_number(b.x, precision),
            format_number(-b.y, precision)
        ));
    }
    svg.push_str("</g>\n");
    svg
}

/// Substitute every scale-relative placeholder once, globally
fn substitute_style_tokens(svg: String, scale: f64, precision: u32) -> String {
    let scaled = |mm: f64| format_number(mm / scale, precision);
    let dash = |d: (f64, f64)| format!("{},{}", scaled(d.0), scaled(d.1));

    svg.replace("SECTION_STROKE_WIDTH", &scaled(SECTION_STROKE_MM))
        .replace("WINDOW_STROKE_WIDTH", &scaled(WINDOW_STROKE_MM))
        .replace("SECONDARY_STROKE_WIDTH", &scaled(SECONDARY_STROKE_MM))
        .replace("DIMENSION_STROKE_WIDTH", &scaled(DIMENSION_STROKE_MM))
        .replace("CUTLINE_STROKE_WIDTH", &scaled(CUTLINE_STROKE_MM))
        .replace("MARKER_STROKE_WIDTH", &scaled(MARKER_STROKE_MM))
        .replace("CUTLINE_DASHARRAY", &dash(CUTLINE_DASH_MM))
        .replace("MARKER_DASHARRAY", &dash(MARKER_DASH_MM))
        .replace("TEXT_FONT_SIZE", &scaled(FONT_SIZE_MM))
}

/// Render a section drawing.
///
/// Filters `include` minus `exclude` by id, groups the payloads, cuts
/// the solids with the plane described by `placement` and assembles the
/// final document. Geometry faults degrade the drawing instead of
/// failing it; configuration problems fail eagerly.
pub fn render(
    placement: &Placement,
    include: &[SceneObject],
    exclude: &[u32],
    config: &RenderConfig,
) -> Result<String> {
    config.validate()?;

    let groups = group_objects(include, exclude);
    debug!(
        "Rendering {} objects, {} windows, {} drafts",
        groups.objects.len(),
        groups.windows.len(),
        groups.dimensions.len()
    );

    let mut engine = SectionEngine::new(placement);
    engine.add_objects(groups.objects);
    engine.add_windows(groups.windows);

    let clip = config.clip_length > 0.0 && config.clip_height > 0.0;
    engine.cut(&CutOptions {
        hidden: false,
        clip,
        length: config.clip_length,
        height: config.clip_height,
        clip_depth: config.clip_depth,
    })?;
    engine.finalize();

    let precision = config.precision;
    let mut registry = PatternRegistry::new();

    let section_svg = section_faces_svg(
        &engine.sections,
        &mut registry,
        "SECTION_STROKE_WIDTH",
        precision,
    );
    let window_svg = section_faces_svg(
        &engine.windows,
        &mut registry,
        "WINDOW_STROKE_WIDTH",
        precision,
    );
    let secondary_svg = secondary_faces_svg(
        &engine,
        &mut registry,
        config.face_highlight_distance,
        precision,
    );

    let projector = Projector::new(engine.frame().clone());

    let mut draft_svg = String::new();
    let mut bound_box = BoundBox::new();
    bound_box.adapt_from_faces(&engine.sections);
    bound_box.adapt_from_faces(&engine.secondary_faces);
    bound_box.adapt_from_faces(&engine.windows);

    for dimension in &groups.dimensions {
        draft_svg.push_str(&dimension_svg(dimension, &projector, precision));
        let (start, end) = projector.project_edge(&(dimension.start, dimension.end));
        bound_box.adapt_from_points(&start, &end);
    }

    let mut sectioncut_svg = String::new();
    for cut in &groups.section_cuts {
        sectioncut_svg.push_str(&section_cut_svg(
            cut,
            engine.frame(),
            engine.tolerances().coplanar,
            precision,
        ));
    }

    let mut marker_fragment = String::new();
    for marker in &groups.markers {
        marker_fragment.push_str(&marker_svg(marker, &projector, precision));
    }

    let offset = bound_box.calculate_offset(config.scale, config.page_width, config.page_height);
    let information_svg = title_block_svg(&config.label, config.scale, offset, precision);

    let pattern_svg = scale_patterns(&registry.pattern_svg(), config.scale);

    let document = SVG_TEMPLATE
        .replace(
            "VIEWBOX_VALUES",
            &bound_box.build_viewbox(config.scale, config.page_width, config.page_height, precision),
        )
        .replace("WIDTH", &format_number(config.page_width, precision))
        .replace("HEIGHT", &format_number(config.page_height, precision))
        .replace("PATTERN_SVG", &pattern_svg)
        .replace("SECONDARY_SVG", &secondary_svg)
        .replace("SECTION_SVG", &section_svg)
        .replace("WINDOW_SVG", &window_svg)
        .replace("DRAFT_SVG", &draft_svg)
        .replace("SECTIONCUT_SVG", &sectioncut_svg)
        .replace("MARKER_SVG", &marker_fragment)
        .replace("INFORMATION_SVG", &information_svg);

    Ok(substitute_style_tokens(
        document,
        config.scale,
        precision,
    ))
}
