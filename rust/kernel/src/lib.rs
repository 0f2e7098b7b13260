//! Plancut geometry kernel
//!
//! Planar-face solids, working-plane frames and CSG boolean operations.
//! Booleans are delegated to csgrs; the polygon soup it returns is
//! regrouped into planar faces with wires so the section pipeline can
//! classify and project them.

pub mod csg;
pub mod error;
pub mod plane;
pub mod solid;
pub mod triangulate;
pub mod volume;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, UnitQuaternion, Vector2, Vector3};

pub use csg::BooleanEngine;
pub use error::{Error, Result};
pub use plane::{extrude, is_coplanar, Placement, PlaneFrame};
pub use solid::{Bounds3, Face3, Solid, Wire3};
pub use triangulate::{calculate_polygon_normal, project_to_2d, triangulate_polygon};
pub use volume::{cut_volume, CutVolume};
