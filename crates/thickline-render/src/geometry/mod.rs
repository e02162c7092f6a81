//! Instanced line segment geometry.
//!
//! A [`SegmentGeometry`] stores one [`SegmentInstance`] per line segment.
//! Every instance is drawn with the same quad (see [`topology`]), expanded
//! in screen space by the vertex shader.
//!
//! Bounding volumes are derived data: [`SegmentGeometry::set_positions`]
//! recomputes them, but mutating colors or distances, or editing the
//! instance stream directly, does not.

mod edges;
pub mod topology;

pub use edges::{feature_edges, wireframe_edges};

use glam::{Mat4, Vec3};
use thickline_core::{Aabb, BoundingSphere, Geometry, Result, ThicklineError};

/// Start and end point of one segment instance.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SegmentInstance {
    /// Segment start (xyz).
    pub start: [f32; 3],
    /// Segment end (xyz).
    pub end: [f32; 3],
}

impl SegmentInstance {
    /// Creates an instance from its endpoints.
    #[must_use]
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self {
            start: start.to_array(),
            end: end.to_array(),
        }
    }

    /// Segment start.
    #[must_use]
    pub fn start(&self) -> Vec3 {
        Vec3::from_array(self.start)
    }

    /// Segment end.
    #[must_use]
    pub fn end(&self) -> Vec3 {
        Vec3::from_array(self.end)
    }

    /// Euclidean segment length.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.start().distance(self.end())
    }
}

/// Start and end color of one segment instance.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SegmentColors {
    /// Color at the segment start (rgb).
    pub start: [f32; 3],
    /// Color at the segment end (rgb).
    pub end: [f32; 3],
}

/// Cumulative arc distance at both ends of one segment instance.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SegmentDistances {
    /// Arc distance at the segment start.
    pub start: f32,
    /// Arc distance at the segment end.
    pub end: f32,
}

/// Monotonic versions of each instance stream, bumped on every change.
///
/// GPU resources compare these against the versions they last uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamVersions {
    /// Version of the position (and segment index) stream.
    pub positions: u64,
    /// Version of the color stream.
    pub colors: u64,
    /// Version of the arc distance stream.
    pub distances: u64,
}

/// Floats per instance in a flat position or color array.
pub const FLOATS_PER_INSTANCE: usize = 6;

/// Instanced segment geometry with derived bounding volumes.
#[derive(Debug, Clone, Default)]
pub struct SegmentGeometry {
    instances: Vec<SegmentInstance>,
    segment_indices: Vec<u32>,
    colors: Option<Vec<SegmentColors>>,
    distances: Option<Vec<SegmentDistances>>,

    bounding_box: Option<Aabb>,
    bounding_sphere: Option<BoundingSphere>,

    versions: StreamVersions,
}

fn chunk_instances<'a>(
    array: &'a [f32],
    what: &str,
) -> impl Iterator<Item = ([f32; 3], [f32; 3])> + 'a {
    let remainder = array.len() % FLOATS_PER_INSTANCE;
    if remainder != 0 {
        log::warn!(
            "SegmentGeometry: {what} array length {} is not a multiple of {FLOATS_PER_INSTANCE}; ignoring the last {remainder} values",
            array.len()
        );
    }
    array
        .chunks_exact(FLOATS_PER_INSTANCE)
        .map(|c| ([c[0], c[1], c[2]], [c[3], c[4], c[5]]))
}

impl SegmentGeometry {
    /// Creates an empty geometry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a geometry from a list of segment endpoints (0-1, 2-3, ...).
    #[must_use]
    pub fn from_line_segments(points: &[Vec3]) -> Self {
        let mut geometry = Self::new();
        geometry.set_points(points);
        geometry
    }

    /// Creates a geometry drawing every unique edge of a triangle mesh.
    pub fn from_wireframe(vertices: &[Vec3], faces: &[[u32; 3]]) -> Result<Self> {
        let edges = wireframe_edges(vertices.len(), faces)?;
        Ok(Self::from_edge_list(vertices, &edges))
    }

    /// Creates a geometry drawing the feature edges of a triangle mesh.
    ///
    /// See [`feature_edges`].
    pub fn from_edges(
        vertices: &[Vec3],
        faces: &[[u32; 3]],
        threshold_degrees: f32,
    ) -> Result<Self> {
        let edges = feature_edges(vertices, faces, threshold_degrees)?;
        Ok(Self::from_edge_list(vertices, &edges))
    }

    fn from_edge_list(vertices: &[Vec3], edges: &[[u32; 2]]) -> Self {
        let points: Vec<Vec3> = edges
            .iter()
            .flat_map(|e| [vertices[e[0] as usize], vertices[e[1] as usize]])
            .collect();
        Self::from_line_segments(&points)
    }

    /// Replaces the instance stream from flat endpoint coordinates.
    ///
    /// Every six floats form one instance (start xyz, end xyz). A trailing
    /// partial instance is dropped with a warning. Recomputes the bounding
    /// box and sphere.
    pub fn set_positions(&mut self, array: &[f32]) -> &mut Self {
        self.instances = chunk_instances(array, "position")
            .map(|(start, end)| SegmentInstance { start, end })
            .collect();
        self.segment_indices = (0..self.instances.len() as u32).collect();
        self.versions.positions += 1;

        self.compute_bounding_box();
        self.compute_bounding_sphere();
        self
    }

    /// Replaces the instance stream from consecutive endpoint pairs.
    pub fn set_points(&mut self, points: &[Vec3]) -> &mut Self {
        let flat: Vec<f32> = points.iter().flat_map(|p| p.to_array()).collect();
        self.set_positions(&flat)
    }

    /// Replaces the color stream from flat colors (start rgb, end rgb).
    ///
    /// The color count is not checked against the instance count.
    pub fn set_colors(&mut self, array: &[f32]) -> &mut Self {
        self.colors = Some(
            chunk_instances(array, "color")
                .map(|(start, end)| SegmentColors { start, end })
                .collect(),
        );
        self.versions.colors += 1;
        self
    }

    /// Replaces the color stream from one color per endpoint.
    pub fn set_point_colors(&mut self, colors: &[Vec3]) -> &mut Self {
        let flat: Vec<f32> = colors.iter().flat_map(|c| c.to_array()).collect();
        self.set_colors(&flat)
    }

    /// Removes per-instance colors.
    pub fn clear_colors(&mut self) -> &mut Self {
        if self.colors.take().is_some() {
            self.versions.colors += 1;
        }
        self
    }

    /// Replaces the arc distance stream.
    ///
    /// Returns an error if the stream length differs from the instance count.
    pub fn set_line_distances(&mut self, distances: Vec<SegmentDistances>) -> Result<()> {
        if distances.len() != self.instances.len() {
            return Err(ThicklineError::SizeMismatch {
                expected: self.instances.len(),
                actual: distances.len(),
            });
        }
        self.distances = Some(distances);
        self.versions.distances += 1;
        Ok(())
    }

    /// Number of segment instances.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// The instance stream.
    #[must_use]
    pub fn instances(&self) -> &[SegmentInstance] {
        &self.instances
    }

    /// Mutable access to the instance stream.
    ///
    /// Marks the stream dirty for upload but does not touch bounding volumes
    /// or arc distances.
    pub fn instances_mut(&mut self) -> &mut [SegmentInstance] {
        self.versions.positions += 1;
        &mut self.instances
    }

    /// The implicit per-instance index stream.
    #[must_use]
    pub fn segment_indices(&self) -> &[u32] {
        &self.segment_indices
    }

    /// The color stream, if set.
    #[must_use]
    pub fn colors(&self) -> Option<&[SegmentColors]> {
        self.colors.as_deref()
    }

    /// The arc distance stream, if computed.
    #[must_use]
    pub fn line_distances(&self) -> Option<&[SegmentDistances]> {
        self.distances.as_deref()
    }

    /// Current stream versions.
    #[must_use]
    pub fn versions(&self) -> StreamVersions {
        self.versions
    }
}

impl Geometry for SegmentGeometry {
    fn bounding_box(&self) -> Option<&Aabb> {
        self.bounding_box.as_ref()
    }

    fn bounding_sphere(&self) -> Option<&BoundingSphere> {
        self.bounding_sphere.as_ref()
    }

    fn compute_bounding_box(&mut self) {
        let starts = Aabb::from_points(self.instances.iter().map(SegmentInstance::start));
        let ends = Aabb::from_points(self.instances.iter().map(SegmentInstance::end));
        self.bounding_box = Some(starts.union(&ends));
    }

    fn compute_bounding_sphere(&mut self) {
        if self.bounding_box.is_none() {
            self.compute_bounding_box();
        }
        let center = self.bounding_box.map_or(Vec3::ZERO, |b| b.center());

        // NaN must survive the fold so bad input shows up in the radius.
        let mut max_radius_sq = 0.0_f32;
        for instance in &self.instances {
            for p in [instance.start(), instance.end()] {
                let d = center.distance_squared(p);
                max_radius_sq = if d.is_nan() || max_radius_sq.is_nan() {
                    f32::NAN
                } else {
                    max_radius_sq.max(d)
                };
            }
        }

        let radius = max_radius_sq.sqrt();
        if !radius.is_finite() {
            log::warn!(
                "SegmentGeometry::compute_bounding_sphere(): computed radius is {radius}; the instance positions likely contain non-finite values"
            );
        }
        self.bounding_sphere = Some(BoundingSphere::new(center, radius));
    }

    fn apply_matrix(&mut self, matrix: &Mat4) {
        if !self.instances.is_empty() {
            for instance in &mut self.instances {
                *instance = SegmentInstance::new(
                    matrix.transform_point3(instance.start()),
                    matrix.transform_point3(instance.end()),
                );
            }
            self.versions.positions += 1;
        }

        if self.bounding_box.is_some() {
            self.compute_bounding_box();
        }
        if self.bounding_sphere.is_some() {
            self.compute_bounding_sphere();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symmetric_box() -> SegmentGeometry {
        let mut geometry = SegmentGeometry::new();
        geometry.set_positions(&[
            -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, //
            1.0, -1.0, -1.0, -1.0, 1.0, 1.0,
        ]);
        geometry
    }

    #[test]
    fn test_instance_count_is_points_over_two() {
        let geometry = SegmentGeometry::from_line_segments(&[
            Vec3::ZERO,
            Vec3::X,
            Vec3::Y,
            Vec3::Z,
            Vec3::ONE,
            Vec3::NEG_ONE,
        ]);
        assert_eq!(geometry.instance_count(), 3);
        assert_eq!(geometry.segment_indices(), &[0, 1, 2]);
        assert_eq!(geometry.instances()[1].start(), Vec3::Y);
        assert_eq!(geometry.instances()[1].end(), Vec3::Z);
    }

    #[test]
    fn test_partial_instance_is_dropped() {
        let mut geometry = SegmentGeometry::new();
        geometry.set_positions(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 5.0, 5.0]);
        assert_eq!(geometry.instance_count(), 1);
        assert_eq!(geometry.segment_indices().len(), 1);
    }

    #[test]
    fn test_bounding_volumes() {
        let geometry = symmetric_box();
        let aabb = geometry.bounding_box().unwrap();
        assert_eq!(aabb.min, Vec3::splat(-1.0));
        assert_eq!(aabb.max, Vec3::splat(1.0));

        let sphere = geometry.bounding_sphere().unwrap();
        assert_eq!(sphere.center, Vec3::ZERO);
        let half_diagonal = aabb.size().length() * 0.5;
        assert!((sphere.radius - half_diagonal).abs() < 1e-6);
    }

    #[test]
    fn test_empty_geometry_bounds() {
        let mut geometry = SegmentGeometry::new();
        geometry.set_positions(&[]);
        assert!(geometry.bounding_box().unwrap().is_empty());
        assert_eq!(geometry.bounding_sphere().unwrap().radius, 0.0);
    }

    #[test]
    fn test_nan_radius_is_stored() {
        let mut geometry = SegmentGeometry::new();
        geometry.set_positions(&[0.0, 0.0, 0.0, f32::NAN, 1.0, 0.0]);
        let radius = geometry.bounding_sphere().unwrap().radius;
        assert!(!radius.is_finite());
    }

    #[test]
    fn test_infinite_radius_is_stored() {
        let mut geometry = SegmentGeometry::new();
        geometry.set_positions(&[0.0, 0.0, 0.0, f32::INFINITY, 1.0, 0.0]);
        assert!(!geometry.bounding_sphere().unwrap().radius.is_finite());
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut geometry = symmetric_box();
        geometry.compute_bounding_box();
        geometry.compute_bounding_sphere();
        let first = (*geometry.bounding_box().unwrap(), *geometry.bounding_sphere().unwrap());
        geometry.compute_bounding_box();
        geometry.compute_bounding_sphere();
        let second = (*geometry.bounding_box().unwrap(), *geometry.bounding_sphere().unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_bounds_not_invalidated_by_stream_edits() {
        let mut geometry = symmetric_box();
        let before = *geometry.bounding_box().unwrap();
        geometry.instances_mut()[0] = SegmentInstance::new(Vec3::splat(10.0), Vec3::splat(20.0));
        assert_eq!(*geometry.bounding_box().unwrap(), before);

        geometry.compute_bounding_box();
        assert_eq!(geometry.bounding_box().unwrap().max, Vec3::splat(20.0));
    }

    #[test]
    fn test_apply_matrix_scales_endpoints_and_radius() {
        let mut geometry = symmetric_box();
        let radius = geometry.bounding_sphere().unwrap().radius;
        let version = geometry.versions().positions;

        geometry.apply_matrix(&Mat4::from_scale(Vec3::splat(-3.0)));

        assert_eq!(geometry.instances()[0].start(), Vec3::splat(3.0));
        assert_eq!(geometry.instances()[0].end(), Vec3::splat(-3.0));
        let scaled = geometry.bounding_sphere().unwrap().radius;
        assert!((scaled - radius * 3.0).abs() < 1e-5);
        assert!(geometry.versions().positions > version);
    }

    #[test]
    fn test_apply_matrix_does_not_create_bounds() {
        let mut geometry = SegmentGeometry::new();
        geometry.apply_matrix(&Mat4::from_translation(Vec3::X));
        assert!(geometry.bounding_box().is_none());
        assert!(geometry.bounding_sphere().is_none());
    }

    #[test]
    fn test_colors_are_independent_of_positions() {
        let mut geometry = symmetric_box();
        geometry.set_colors(&[1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        let colors = geometry.colors().unwrap();
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].end, [0.0, 1.0, 0.0]);
        assert_eq!(geometry.instance_count(), 2);

        let version = geometry.versions().colors;
        geometry.clear_colors();
        assert!(geometry.colors().is_none());
        assert!(geometry.versions().colors > version);
    }

    #[test]
    fn test_set_line_distances_checks_length() {
        let mut geometry = symmetric_box();
        let err = geometry
            .set_line_distances(vec![SegmentDistances::default()])
            .unwrap_err();
        assert!(matches!(
            err,
            ThicklineError::SizeMismatch {
                expected: 2,
                actual: 1
            }
        ));
        assert!(geometry.line_distances().is_none());
    }

    #[test]
    fn test_from_wireframe() {
        let vertices = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let geometry = SegmentGeometry::from_wireframe(&vertices, &[[0, 1, 2]]).unwrap();
        assert_eq!(geometry.instance_count(), 3);
        assert!(SegmentGeometry::from_wireframe(&vertices, &[[0, 1, 7]]).is_err());
    }

    #[test]
    fn test_from_edges_boundary_only() {
        let vertices = [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y];
        let faces = [[0, 1, 2], [0, 2, 3]];
        let geometry = SegmentGeometry::from_edges(&vertices, &faces, 1.0).unwrap();
        assert_eq!(geometry.instance_count(), 4);
    }

    #[test]
    fn test_pod_layout() {
        assert_eq!(std::mem::size_of::<SegmentInstance>(), 24);
        assert_eq!(std::mem::size_of::<SegmentColors>(), 24);
        assert_eq!(std::mem::size_of::<SegmentDistances>(), 8);
    }
}
