// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end document rendering.

use nalgebra::{Point3, Vector3};
use plancut_section::{Color, PatternKind, Placement, Solid};
use plancut_svg::{
    render, DimensionAnnotation, LegendEntry, MarkerShape, RenderConfig, SceneObject,
    ScenePayload, SectionCutShape,
};

fn wall_scene() -> Vec<SceneObject> {
    vec![SceneObject::new(
        1,
        ScenePayload::Solid {
            solid: Solid::cuboid(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1000.0, 1000.0, 200.0),
            ),
            color: Color::new(0.8, 0.2, 0.2),
            pattern: Some(PatternKind::Default),
        },
    )]
}

fn mid_wall_placement() -> Placement {
    Placement::at(Point3::new(500.0, 500.0, 100.0))
}

#[test]
fn document_structure_and_group_order() {
    let svg = render(
        &mid_wall_placement(),
        &wall_scene(),
        &[],
        &RenderConfig::default(),
    )
    .unwrap();

    // Fixed z-order: patterns, secondary, sections, windows, drafts,
    // section cuts, markers, information
    let order = [
        "id=\"patterns\"",
        "id=\"secondary\"",
        "id=\"sections\"",
        "id=\"windows\"",
        "id=\"drafts\"",
        "id=\"sectioncuts\"",
        "id=\"markers\"",
        "id=\"information\"",
    ];
    let mut last = 0;
    for marker in order {
        let at = svg.find(marker).unwrap_or_else(|| panic!("missing {marker}"));
        assert!(at > last, "{marker} out of order");
        last = at;
    }

    assert!(svg.contains("width=\"420mm\""));
    assert!(svg.contains("height=\"297mm\""));
}

#[test]
fn section_face_rendered_with_pattern_fill() {
    let svg = render(
        &mid_wall_placement(),
        &wall_scene(),
        &[],
        &RenderConfig::default(),
    )
    .unwrap();

    assert!(svg.contains("url(#default-cc3333-1)"), "pattern fill: {svg}");
    assert_eq!(
        svg.matches("<pattern").count(),
        1,
        "one pattern definition for one material"
    );
    // Tile scaled by 1 / 0.02
    assert!(svg.contains("scale(50)"));
}

#[test]
fn stroke_widths_are_scale_relative() {
    let svg = render(
        &mid_wall_placement(),
        &wall_scene(),
        &[],
        &RenderConfig::default(),
    )
    .unwrap();

    // 0.5 mm section stroke at 1:50 is 25 document units
    assert!(svg.contains("stroke-width=\"25\""), "section stroke: {svg}");
    assert!(!svg.contains("SECTION_STROKE_WIDTH"));
    assert!(!svg.contains("TEXT_FONT_SIZE"));
}

#[test]
fn viewbox_centers_content() {
    let svg = render(
        &mid_wall_placement(),
        &wall_scene(),
        &[],
        &RenderConfig {
            precision: 0,
            ..RenderConfig::default()
        },
    )
    .unwrap();

    // 1000 x 1000 content centered on the 21000 x 14850 scaled page.
    // Local coordinates run from -500 to 500 around the plane origin.
    assert!(svg.contains("viewBox=\"-10500 -7425 21000 14850\""), "{svg}");
}

#[test]
fn dimension_scenario_renders_measurement() {
    let mut scene = wall_scene();
    scene.push(SceneObject::new(
        2,
        ScenePayload::Dimension(DimensionAnnotation {
            start: Point3::new(0.0, 0.0, 100.0),
            end: Point3::new(1000.0, 0.0, 100.0),
            text_base: Point3::new(500.0, -50.0, 100.0),
            decimals: 0,
        }),
    ));

    let svg = render(
        &mid_wall_placement(),
        &scene,
        &[],
        &RenderConfig::default(),
    )
    .unwrap();

    assert!(svg.contains(">100</text>"), "1000 mm labeled as 100: {svg}");
}

#[test]
fn highlight_distance_promotes_secondary_faces() {
    // A slab floating below the cut plane, within highlight range
    let scene = vec![
        SceneObject::new(
            1,
            ScenePayload::Solid {
                solid: Solid::cuboid(
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(1000.0, 1000.0, 200.0),
                ),
                color: Color::new(0.8, 0.2, 0.2),
                pattern: Some(PatternKind::Default),
            },
        ),
        SceneObject::new(
            2,
            ScenePayload::Solid {
                solid: Solid::cuboid(
                    Point3::new(200.0, 200.0, 40.0),
                    Point3::new(700.0, 700.0, 60.0),
                ),
                color: Color::new(0.1, 0.6, 0.3),
                pattern: Some(PatternKind::Wood),
            },
        ),
    ];

    let faint = render(
        &mid_wall_placement(),
        &scene,
        &[],
        &RenderConfig::default(),
    )
    .unwrap();
    assert!(faint.contains("-0.1)"), "low-opacity pattern fill: {faint}");

    let highlighted = render(
        &mid_wall_placement(),
        &scene,
        &[],
        &RenderConfig {
            face_highlight_distance: 100.0,
            ..RenderConfig::default()
        },
    )
    .unwrap();
    assert!(
        !highlighted.contains("-0.1)"),
        "near faces promoted to full opacity: {highlighted}"
    );
}

#[test]
fn section_cut_and_marker_groups_populated() {
    let mut scene = wall_scene();
    scene.push(SceneObject::new(
        3,
        ScenePayload::SectionCut(SectionCutShape {
            placement: Placement::from_axis_angle(
                Point3::new(500.0, 500.0, 100.0),
                Vector3::x(),
                90.0,
            ),
            length: 2000.0,
            height: 2000.0,
            label: "A".to_string(),
        }),
    ));
    scene.push(SceneObject::new(
        4,
        ScenePayload::Marker(MarkerShape {
            face: plancut_section::Face3::make_face_from_wires(vec![
                plancut_section::Wire3::new(vec![
                    Point3::new(100.0, 100.0, 100.0),
                    Point3::new(400.0, 100.0, 100.0),
                    Point3::new(400.0, 400.0, 100.0),
                    Point3::new(100.0, 400.0, 100.0),
                ]),
            ])
            .unwrap(),
            label: "Bad concrete".to_string(),
            color: Color::new(1.0, 0.3, 0.1),
        }),
    ));

    let svg = render(
        &mid_wall_placement(),
        &scene,
        &[],
        &RenderConfig {
            label: "Level 1".to_string(),
            ..RenderConfig::default()
        },
    )
    .unwrap();

    assert_eq!(svg.matches(">A</text>").count(), 2, "cut labels at both ends");
    assert!(svg.contains("Bad concrete"));
    assert!(svg.contains(">Level 1</text>"));
    assert!(svg.contains(">1:50</text>"));
    assert!(svg.contains("stroke-dasharray=\"175,90\""), "dashes scaled: {svg}");
}

#[test]
fn hidden_lines_emitted_as_dashed_group() {
    use plancut_section::{CutOptions, SectionEngine, TaggedSolid};

    let mut engine = SectionEngine::new(&mid_wall_placement());
    engine.add_objects([TaggedSolid::new(
        Solid::cuboid(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1000.0, 1000.0, 200.0),
        ),
        Color::default(),
        None,
    )]);
    engine
        .cut(&CutOptions {
            hidden: true,
            ..CutOptions::default()
        })
        .unwrap();
    engine.finalize();

    let svg = plancut_svg::hidden_svg(&engine, 0.02, 6);
    assert!(svg.contains("stroke-dasharray:0.09,0.05"));
    assert!(svg.matches("<path").count() > 0);
}

#[test]
fn legend_builds_standalone_document() {
    let svg = plancut_svg::legend(&[
        LegendEntry {
            label: "Brick".to_string(),
            color: Color::new(0.7, 0.3, 0.2),
            pattern: Some(PatternKind::Default),
        },
        LegendEntry {
            label: "Glass".to_string(),
            color: Color::new(0.4, 0.7, 0.9),
            pattern: Some(PatternKind::Window),
        },
    ]);

    assert!(svg.starts_with("<?xml"));
    assert!(svg.contains("210mm"));
    assert_eq!(svg.matches("<pattern").count(), 2);
}
