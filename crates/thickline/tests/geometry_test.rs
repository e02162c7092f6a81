//! Geometry, arc length and bounding volume integration tests.

use proptest::prelude::*;
use thickline::*;

fn points_strategy() -> impl Strategy<Value = Vec<Vec3>> {
    (1usize..16).prop_flat_map(|segments| {
        prop::collection::vec(
            (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0)
                .prop_map(|(x, y, z)| Vec3::new(x, y, z)),
            segments * 2,
        )
    })
}

#[test]
fn test_unit_segment_arc_length() {
    let mut lines = ThickLineSegments::from_points(&[Vec3::ZERO, Vec3::X], LineStyle::default());
    lines.compute_line_distances().unwrap();
    let distances = lines.geometry().line_distances().unwrap();
    assert_eq!(
        distances,
        &[SegmentDistances {
            start: 0.0,
            end: 1.0
        }]
    );
}

#[test]
fn test_arc_length_goes_stale_silently() {
    let mut lines = ThickLineSegments::from_points(&[Vec3::ZERO, Vec3::X], LineStyle::default());
    lines.compute_line_distances().unwrap();

    lines.geometry_mut().instances_mut()[0] = SegmentInstance::new(Vec3::ZERO, Vec3::splat(5.0));
    assert_eq!(lines.geometry().line_distances().unwrap()[0].end, 1.0);

    lines.compute_line_distances().unwrap();
    let end = lines.geometry().line_distances().unwrap()[0].end;
    assert!((end - Vec3::splat(5.0).length()).abs() < 1e-5);
}

#[test]
fn test_symmetric_box_sphere_radius() {
    let mut geometry = SegmentGeometry::new();
    geometry.set_positions(&[
        -2.0, -1.0, -3.0, 2.0, 1.0, 3.0, //
        2.0, -1.0, 3.0, -2.0, 1.0, -3.0,
    ]);
    let sphere = geometry.bounding_sphere().unwrap();
    let half_diagonal = Vec3::new(2.0, 1.0, 3.0).length();
    assert_eq!(sphere.center, Vec3::ZERO);
    assert!((sphere.radius - half_diagonal).abs() < 1e-6);
    assert!(sphere.radius.is_finite());
}

#[test]
fn test_world_bounding_box_follows_transform() {
    let mut lines = ThickLineSegments::from_points(&[Vec3::ZERO, Vec3::ONE], LineStyle::default());
    lines.set_transform(Mat4::from_translation(Vec3::X * 10.0));
    let aabb = lines.world_bounding_box().unwrap();
    assert_eq!(aabb.min, Vec3::new(10.0, 0.0, 0.0));
    assert_eq!(aabb.max, Vec3::new(11.0, 1.0, 1.0));
}

#[test]
fn test_style_changes_mark_material_dirty() {
    let mut lines = ThickLineSegments::from_points(&[Vec3::ZERO, Vec3::X], LineStyle::default());
    lines.material_mut().build().unwrap();
    assert!(!lines.material().needs_update());

    lines.material_mut().set_dash_size(0.25).set_dashed(true);
    assert!(lines.material().needs_update());
    let program = lines.material_mut().build().unwrap();
    assert_eq!(program.line_uniforms.dash_size, 0.25);
    assert_eq!(program.line_uniforms.dashed, 1);
}

#[test]
fn test_chunk_overrides_reach_program_text() {
    let mut material = LineMaterial::default();
    material.set_chunk("vertexStart", "// start %- vertexEnd -%");
    material.set_chunk("vertexEnd", "T");
    let program = material.build().unwrap();
    assert!(program.vertex_source.contains("// start T"));
}

proptest! {
    #[test]
    fn instance_count_matches_every_stream(points in points_strategy()) {
        let mut lines = ThickLineSegments::from_points(&points, LineStyle::default());
        lines.compute_line_distances().unwrap();
        let geometry = lines.geometry();

        let count = points.len() / 2;
        prop_assert_eq!(geometry.instance_count(), count);
        prop_assert_eq!(geometry.segment_indices().len(), count);
        prop_assert_eq!(geometry.line_distances().unwrap().len(), count);
    }

    #[test]
    fn arc_length_is_monotonic_and_continuous(points in points_strategy()) {
        let geometry = SegmentGeometry::from_line_segments(&points);
        let distances = line_distances(geometry.instances());

        prop_assert_eq!(distances[0].start, 0.0);
        for (i, d) in distances.iter().enumerate() {
            prop_assert!(d.end >= d.start);
            if i > 0 {
                prop_assert_eq!(d.start, distances[i - 1].end);
            }
        }
    }

    #[test]
    fn bounds_contain_every_endpoint(points in points_strategy()) {
        let geometry = SegmentGeometry::from_line_segments(&points);
        let aabb = geometry.bounding_box().unwrap();
        let sphere = geometry.bounding_sphere().unwrap();

        prop_assert!(sphere.radius >= 0.0);
        for p in &points {
            prop_assert!(aabb.contains_point(*p));
            prop_assert!(sphere.center.distance(*p) <= sphere.radius * (1.0 + 1e-5) + 1e-4);
        }
    }

    #[test]
    fn uniform_scale_scales_radius(
        points in points_strategy(),
        scale in prop_oneof![-5.0f32..-0.1, 0.1f32..5.0],
    ) {
        let mut geometry = SegmentGeometry::from_line_segments(&points);
        let radius = geometry.bounding_sphere().unwrap().radius;

        geometry.apply_matrix(&Mat4::from_scale(Vec3::splat(scale)));

        let scaled = geometry.bounding_sphere().unwrap().radius;
        let expected = radius * scale.abs();
        prop_assert!((scaled - expected).abs() <= expected * 1e-4 + 1e-3);

        for (instance, original) in geometry.instances().iter().zip(points.chunks_exact(2)) {
            prop_assert!(instance.start().distance(original[0] * scale) < 1e-2);
            prop_assert!(instance.end().distance(original[1] * scale) < 1e-2);
        }
    }

    #[test]
    fn recompute_is_idempotent(points in points_strategy()) {
        let mut geometry = SegmentGeometry::from_line_segments(&points);
        geometry.compute_bounding_box();
        geometry.compute_bounding_sphere();
        let first = (*geometry.bounding_box().unwrap(), *geometry.bounding_sphere().unwrap());
        geometry.compute_bounding_box();
        geometry.compute_bounding_sphere();
        let second = (*geometry.bounding_box().unwrap(), *geometry.bounding_sphere().unwrap());
        prop_assert_eq!(first, second);
    }
}
