// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Section cut engine
//!
//! Subtracts the cut volume from every tagged solid, classifies the
//! residual faces into sections (coplanar with the cut plane) and
//! secondary faces, and runs the fixed finishing pipeline: project,
//! filter, deduplicate, sort. Windows go through the same classification
//! independently.

use crate::dedup::{filter_misoriented, remove_duplicates};
use crate::error::Result;
use crate::projector::Projector;
use crate::record::{Color, FaceRecord, PatternKind, Tolerances};
use crate::sort::sort_faces;
use nalgebra::{Point2, Point3};
use plancut_kernel::{
    cut_volume, extrude, is_coplanar, BooleanEngine, CutVolume, Face3, Placement, PlaneFrame,
    Solid,
};
use tracing::debug;

/// Plane extent used when the kernel cannot derive one from the solids
/// (mm)
const FALLBACK_PLANE_EXTENT: f64 = 10_000.0;
/// Extrusion depth of the synthesized fallback volume (mm)
const FALLBACK_VOLUME_DEPTH: f64 = 1_000_000.0;

/// A solid tagged with its classification color and material pattern
#[derive(Debug, Clone)]
pub struct TaggedSolid {
    pub solid: Solid,
    pub color: Color,
    pub pattern: Option<PatternKind>,
}

impl TaggedSolid {
    pub fn new(solid: Solid, color: Color, pattern: Option<PatternKind>) -> Self {
        Self {
            solid,
            color,
            pattern,
        }
    }
}

/// Options of a single cut
#[derive(Debug, Clone, Default)]
pub struct CutOptions {
    /// Also compute hidden-line geometry behind the plane
    pub hidden: bool,
    /// Restrict the cut to the plane's finite extent
    pub clip: bool,
    /// Finite plane length along U (used when `clip` is set)
    pub length: f64,
    /// Finite plane height along V (used when `clip` is set)
    pub height: f64,
    /// Drop secondary faces farther than this from the plane; 0 keeps
    /// everything
    pub clip_depth: f64,
}

/// The section cut engine; one instance per render pass
pub struct SectionEngine {
    frame: PlaneFrame,
    tolerances: Tolerances,
    booleans: BooleanEngine,

    object_shapes: Vec<TaggedSolid>,
    window_shapes: Vec<TaggedSolid>,

    /// Faces coplanar with the cut plane
    pub sections: Vec<FaceRecord>,
    /// Residual faces beyond the plane
    pub secondary_faces: Vec<FaceRecord>,
    /// Section faces of the window solids
    pub windows: Vec<FaceRecord>,
    /// Hidden-line segments (populated with `CutOptions::hidden`)
    pub hidden_edges: Vec<(Point3<f64>, Point3<f64>)>,
    /// Hidden-line segments after projection
    pub projected_hidden: Vec<(Point2<f64>, Point2<f64>)>,

    is_cut: bool,
    oriented: bool,
}

impl SectionEngine {
    /// Create an engine for a cut plane placement
    pub fn new(placement: &Placement) -> Self {
        Self::with_tolerances(placement, Tolerances::default())
    }

    /// Create an engine with explicit tolerances
    pub fn with_tolerances(placement: &Placement, tolerances: Tolerances) -> Self {
        Self {
            frame: PlaneFrame::from_placement(placement),
            tolerances,
            booleans: BooleanEngine::new(),
            object_shapes: Vec::new(),
            window_shapes: Vec::new(),
            sections: Vec::new(),
            secondary_faces: Vec::new(),
            windows: Vec::new(),
            hidden_edges: Vec::new(),
            projected_hidden: Vec::new(),
            is_cut: false,
            oriented: false,
        }
    }

    pub fn frame(&self) -> &PlaneFrame {
        &self.frame
    }

    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    /// Remove all shapes and results from this engine
    pub fn reset(&mut self) {
        self.object_shapes.clear();
        self.window_shapes.clear();
        self.reset_flags();
    }

    fn reset_flags(&mut self) {
        self.sections.clear();
        self.secondary_faces.clear();
        self.windows.clear();
        self.hidden_edges.clear();
        self.projected_hidden.clear();
        self.is_cut = false;
        self.oriented = false;
    }

    /// Add object solids; empty solids are ignored
    pub fn add_objects(&mut self, objects: impl IntoIterator<Item = TaggedSolid>) {
        self.object_shapes
            .extend(objects.into_iter().filter(|t| !t.solid.is_empty()));
        self.reset_flags();
    }

    /// Add window (opening) solids; empty solids are ignored
    pub fn add_windows(&mut self, windows: impl IntoIterator<Item = TaggedSolid>) {
        self.window_shapes
            .extend(windows.into_iter().filter(|t| !t.solid.is_empty()));
        self.reset_flags();
    }

    /// Cut through the added shapes and classify the resulting faces.
    ///
    /// Idempotent: a second call on an already-cut engine is a no-op.
    pub fn cut(&mut self, options: &CutOptions) -> Result<()> {
        if self.is_cut {
            return Ok(());
        }

        debug!("Starting cut");

        if self.object_shapes.is_empty() {
            debug!("No objects to make sections");
        } else {
            let shapes = std::mem::take(&mut self.object_shapes);
            let (residuals, sections, secondary) = self.do_cut(&shapes, options)?;
            self.object_shapes = residuals;
            self.sections = sections;
            self.secondary_faces = secondary;
            debug!("Built {} sections", self.sections.len());
        }

        if self.window_shapes.is_empty() {
            debug!("No objects to make windows");
        } else {
            let shapes = std::mem::take(&mut self.window_shapes);
            // Secondary faces of openings are not drawn
            let (residuals, windows, _) = self.do_cut(&shapes, options)?;
            self.window_shapes = residuals;
            self.windows = windows;
            debug!("Built {} windows", self.windows.len());
        }

        self.is_cut = true;
        self.oriented = false;
        Ok(())
    }

    fn do_cut(
        &mut self,
        shapes: &[TaggedSolid],
        options: &CutOptions,
    ) -> Result<(Vec<TaggedSolid>, Vec<FaceRecord>, Vec<FaceRecord>)> {
        let solids: Vec<&Solid> = shapes.iter().map(|t| &t.solid).collect();
        let clip = if options.clip && options.length > 0.0 && options.height > 0.0 {
            Some((options.length, options.height))
        } else {
            None
        };

        let cut = match cut_volume(&self.frame, &solids, clip)? {
            Some(cut) => cut,
            None => self.fallback_volume(options)?,
        };

        let mut residuals = Vec::with_capacity(shapes.len());
        let mut sections = Vec::new();
        let mut secondary = Vec::new();

        for tagged in shapes {
            let residual = match self.booleans.subtract(&tagged.solid, &cut.volume) {
                Ok(residual) => residual,
                Err(e) => {
                    // One failing solid must not abort the drawing
                    debug!("Boolean cut failed, skipping solid: {e}");
                    continue;
                }
            };

            for face in &residual.faces {
                let record = FaceRecord::new(face.clone(), tagged.color, tagged.pattern);
                if is_coplanar(face, &cut.cut_face, self.tolerances.coplanar) {
                    sections.push(record);
                } else {
                    secondary.push(record);
                }
            }

            if options.hidden {
                match self.booleans.subtract(&tagged.solid, &cut.inverse) {
                    Ok(behind) => self.hidden_edges.extend(behind.edges()),
                    Err(e) => debug!("Hidden-line cut failed, skipping solid: {e}"),
                }
            }

            residuals.push(TaggedSolid::new(residual, tagged.color, tagged.pattern));
        }

        if options.clip_depth > 0.0 {
            let frame = self.frame.clone();
            let limit = options.clip_depth;
            secondary.retain(|f| frame.signed_distance(&f.original.centroid()).abs() <= limit);
        }

        Ok((residuals, sections, secondary))
    }

    /// When the kernel cannot derive a volume from the object extents,
    /// extrude the cut plane itself to synthesize one
    fn fallback_volume(&self, options: &CutOptions) -> Result<CutVolume> {
        let (length, height) = if options.clip && options.length > 0.0 && options.height > 0.0 {
            (options.length, options.height)
        } else {
            (FALLBACK_PLANE_EXTENT, FALLBACK_PLANE_EXTENT)
        };

        let cut_face = self.frame.plane_face(length, height)?;
        let forward = self.frame.normal * FALLBACK_VOLUME_DEPTH;
        let volume = extrude(&cut_face, forward)?;
        let inverse = extrude(&cut_face, -forward)?;

        Ok(CutVolume {
            cut_face,
            volume,
            inverse,
        })
    }

    /// Whether a face's centroid lies within `max_distance` of the cut
    /// plane; used for secondary-face highlighting
    pub fn is_in_range(&self, face: &Face3, max_distance: f64) -> bool {
        if max_distance <= 0.0 {
            return false;
        }
        self.frame.signed_distance(&face.centroid()).abs() <= max_distance
    }

    /// Run the finishing pipeline: project every classified face into
    /// the plane frame, drop degenerate and edge-on faces, collapse
    /// duplicates and sort for paint order. Lazy: a second call is a
    /// no-op until the engine is reset or re-cut.
    pub fn finalize(&mut self) {
        if self.oriented {
            return;
        }

        let projector = Projector::new(self.frame.clone());

        let project_all = |faces: &mut Vec<FaceRecord>| {
            *faces = faces
                .iter()
                .filter_map(|f| projector.project_face(f))
                .collect();
        };

        project_all(&mut self.sections);
        project_all(&mut self.secondary_faces);
        project_all(&mut self.windows);

        let normal = self.frame.normal;
        let eps = self.tolerances.angle_deg;
        filter_misoriented(&mut self.sections, &normal, eps);
        filter_misoriented(&mut self.secondary_faces, &normal, eps);
        filter_misoriented(&mut self.windows, &normal, eps);

        let secondary = std::mem::take(&mut self.secondary_faces);
        self.secondary_faces =
            remove_duplicates(&self.sections, secondary, self.tolerances.coord_decimals);

        sort_faces(&mut self.sections, &normal);
        sort_faces(&mut self.secondary_faces, &normal);
        sort_faces(&mut self.windows, &normal);

        self.projected_hidden = self
            .hidden_edges
            .iter()
            .map(|e| projector.project_edge(e))
            .collect();

        self.oriented = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wall() -> TaggedSolid {
        // 1000 x 1000 x 200 mm wall slab
        TaggedSolid::new(
            Solid::cuboid(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1000.0, 1000.0, 200.0),
            ),
            Color::new(0.8, 0.2, 0.2),
            Some(PatternKind::Default),
        )
    }

    fn engine_through_wall() -> SectionEngine {
        // Horizontal plane through the middle of the slab
        let placement = Placement::at(Point3::new(500.0, 500.0, 100.0));
        let mut engine = SectionEngine::new(&placement);
        engine.add_objects([wall()]);
        engine
    }

    #[test]
    fn wall_cut_yields_single_section_face() {
        let mut engine = engine_through_wall();
        engine.cut(&CutOptions::default()).unwrap();
        engine.finalize();

        assert_eq!(engine.sections.len(), 1, "one section face");
        let section = &engine.sections[0];
        let projected = section.projected.as_ref().unwrap();
        let (min_x, min_y, max_x, max_y) = projected.bounds().unwrap();
        assert_relative_eq!(max_x - min_x, 1000.0, epsilon = 1e-6);
        assert_relative_eq!(max_y - min_y, 1000.0, epsilon = 1e-6);

        // Side faces are edge-on, the far face duplicates the section
        // footprint: nothing is left over
        assert!(engine.secondary_faces.is_empty());
    }

    #[test]
    fn cut_is_idempotent() {
        let mut engine = engine_through_wall();
        engine.cut(&CutOptions::default()).unwrap();
        engine.finalize();
        let sections = engine.sections.len();
        let secondary = engine.secondary_faces.len();

        engine.cut(&CutOptions::default()).unwrap();
        engine.finalize();
        assert_eq!(engine.sections.len(), sections);
        assert_eq!(engine.secondary_faces.len(), secondary);
    }

    #[test]
    fn windows_classified_independently() {
        let placement = Placement::at(Point3::new(500.0, 500.0, 100.0));
        let mut engine = SectionEngine::new(&placement);
        engine.add_objects([wall()]);
        engine.add_windows([TaggedSolid::new(
            Solid::cuboid(
                Point3::new(200.0, 200.0, 0.0),
                Point3::new(400.0, 400.0, 200.0),
            ),
            Color::new(0.2, 0.2, 0.9),
            Some(PatternKind::Window),
        )]);

        engine.cut(&CutOptions::default()).unwrap();
        engine.finalize();

        assert_eq!(engine.windows.len(), 1);
        assert_eq!(engine.windows[0].pattern, Some(PatternKind::Window));
    }

    #[test]
    fn clip_depth_prunes_distant_faces() {
        // A second slab far below the plane survives the cut untouched
        let far_slab = || {
            TaggedSolid::new(
                Solid::cuboid(
                    Point3::new(100.0, 100.0, -4200.0),
                    Point3::new(800.0, 800.0, -4000.0),
                ),
                Color::default(),
                None,
            )
        };
        let placement = Placement::at(Point3::new(500.0, 500.0, 100.0));

        let mut unlimited = SectionEngine::new(&placement);
        unlimited.add_objects([wall(), far_slab()]);
        unlimited.cut(&CutOptions::default()).unwrap();
        unlimited.finalize();
        assert!(
            unlimited
                .secondary_faces
                .iter()
                .any(|f| f.original.bounds().max.z < 0.0),
            "without a depth limit the far slab is drawn"
        );

        let mut limited = SectionEngine::new(&placement);
        limited.add_objects([wall(), far_slab()]);
        limited
            .cut(&CutOptions {
                clip_depth: 500.0,
                ..CutOptions::default()
            })
            .unwrap();
        limited.finalize();
        assert!(
            limited
                .secondary_faces
                .iter()
                .all(|f| f.original.bounds().max.z >= 0.0),
            "faces beyond the depth limit are pruned"
        );
    }

    #[test]
    fn empty_engine_produces_empty_lists() {
        let placement = Placement::at(Point3::new(0.0, 0.0, 0.0));
        let mut engine = SectionEngine::new(&placement);
        engine.cut(&CutOptions::default()).unwrap();
        engine.finalize();

        assert!(engine.sections.is_empty());
        assert!(engine.secondary_faces.is_empty());
        assert!(engine.windows.is_empty());
    }

    #[test]
    fn solid_missed_by_plane_has_no_sections() {
        // Plane above the solid: the fallback volume removes nothing
        let placement = Placement::at(Point3::new(500.0, 500.0, 10_000.0));
        let mut engine = SectionEngine::new(&placement);
        engine.add_objects([wall()]);
        engine.cut(&CutOptions::default()).unwrap();
        engine.finalize();

        assert!(engine.sections.is_empty());
    }

    #[test]
    fn hidden_edges_projected() {
        let mut engine = engine_through_wall();
        engine
            .cut(&CutOptions {
                hidden: true,
                ..CutOptions::default()
            })
            .unwrap();
        engine.finalize();

        assert!(!engine.hidden_edges.is_empty());
        assert_eq!(engine.projected_hidden.len(), engine.hidden_edges.len());
    }

    #[test]
    fn in_range_test_uses_centroid_distance() {
        let engine = engine_through_wall();
        let near = Face3::make_face_from_wires(vec![plancut_kernel::Wire3::new(vec![
            Point3::new(0.0, 0.0, 150.0),
            Point3::new(10.0, 0.0, 150.0),
            Point3::new(10.0, 10.0, 150.0),
        ])])
        .unwrap();

        assert!(engine.is_in_range(&near, 100.0));
        assert!(!engine.is_in_range(&near, 10.0));
        assert!(!engine.is_in_range(&near, 0.0));
    }
}
