//! Pick records produced by line raycasting.

use glam::Vec3;

/// A hit between a pick ray and one line segment instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineIntersection {
    /// Closest point on the ray to the segment, in world space.
    pub point: Vec3,
    /// Closest point on the segment to the ray, in world space.
    pub point_on_line: Vec3,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
    /// Index of the segment instance that was hit.
    pub instance_index: usize,
}

impl LineIntersection {
    /// Sorts intersections by increasing distance from the ray origin.
    ///
    /// NaN distances sort last.
    pub fn sort_by_distance(intersections: &mut [LineIntersection]) {
        intersections.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    }
}
