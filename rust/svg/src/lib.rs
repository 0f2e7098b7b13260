//! Plancut SVG rendering
//!
//! Turns the finalized section pipeline output into a single SVG 1.1
//! document: material fill patterns, styled section/secondary/window
//! paths, dimension and section-cut annotations, markers, a material
//! legend and the auto-fit viewBox. Stroke widths, font sizes and
//! pattern tiles are scale-normalized once at assembly so line weights
//! stay constant on paper at any output scale.

pub mod annotations;
pub mod bbox;
pub mod document;
pub mod error;
pub mod legend;
pub mod path;
pub mod patterns;

pub use annotations::{DimensionAnnotation, MarkerShape, SectionCutShape};
pub use bbox::BoundBox;
pub use document::{hidden_svg, render, RenderConfig, SceneObject, ScenePayload, CONFIG_VERSION};
pub use error::{Error, Result};
pub use legend::{legend, LegendEntry};
pub use path::{format_number, path_data};
pub use patterns::{scale_patterns, PatternRegistry};
