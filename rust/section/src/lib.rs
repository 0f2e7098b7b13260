//! Plancut section pipeline
//!
//! Cuts tagged solids with a working plane, classifies the resulting
//! faces into sections, secondary faces and windows, projects them into
//! the plane's 2D frame, removes duplicates and sorts them for stable
//! paint order. The stages run in a fixed order (classify, project,
//! filter/dedup, sort); SVG emission happens downstream.

pub mod dedup;
pub mod engine;
pub mod error;
pub mod projector;
pub mod record;
pub mod sort;

// Re-export the kernel and nalgebra types callers need
pub use nalgebra::{Point2, Point3, Vector2, Vector3};
pub use plancut_kernel::{BooleanEngine, Bounds3, Face3, Placement, PlaneFrame, Solid, Wire3};

pub use engine::{CutOptions, SectionEngine, TaggedSolid};
pub use error::{Error, Result};
pub use projector::Projector;
pub use record::{Color, Edge2, Face2, FaceRecord, PatternKind, Tolerances, Wire2};
