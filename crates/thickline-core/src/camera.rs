//! Camera values consumed by picking and rendering.

use std::ops::RangeInclusive;

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::bounds::Aabb;
use crate::ray::Ray;

/// Camera projection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    /// Perspective projection.
    #[default]
    Perspective,
    /// Orthographic projection.
    Orthographic,
}

/// The camera interface needed for screen-space picking.
///
/// Matrices follow the right-handed, camera-looks-down `-Z` convention, so
/// visible points have negative camera-space depth.
pub trait ProjectionCamera {
    /// World-to-camera matrix.
    fn view_matrix(&self) -> Mat4;

    /// Camera-to-clip matrix.
    fn projection_matrix(&self) -> Mat4;

    /// Distance to the near clipping plane (positive).
    fn near(&self) -> f32;

    /// Whether the projection is a perspective one.
    fn is_perspective(&self) -> bool;

    /// Range of normalized device depth that is visible.
    ///
    /// wgpu-style projections map depth to `[0, 1]`.
    fn ndc_depth_range(&self) -> RangeInclusive<f32> {
        0.0..=1.0
    }
}

/// A look-at camera with a `[0, 1]` depth projection.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Viewport width / height.
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    pub projection_mode: ProjectionMode,
    /// Half of the visible height in orthographic mode.
    pub ortho_scale: f32,
}

impl Camera {
    /// A perspective camera three units in front of the origin.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4,
            aspect_ratio,
            near: 0.01,
            far: 1000.0,
            projection_mode: ProjectionMode::Perspective,
            ortho_scale: 1.0,
        }
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        if self.projection_mode == ProjectionMode::Perspective {
            return Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far);
        }
        let half_height = self.ortho_scale;
        let half_width = half_height * self.aspect_ratio;
        Mat4::orthographic_rh(
            -half_width,
            half_width,
            -half_height,
            half_height,
            self.near,
            self.far,
        )
    }

    /// Frames `aabb` from its `+Z` side, fitting the clip planes to its size.
    ///
    /// Empty boxes leave the camera unchanged.
    pub fn look_at_box(&mut self, aabb: &Aabb) {
        if aabb.is_empty() {
            return;
        }
        let center = aabb.center();
        let diagonal = aabb.size().length();

        self.target = center;
        self.position = center + Vec3::Z * (diagonal * 1.5);
        self.near = diagonal * 0.001;
        self.far = diagonal * 100.0;
        self.ortho_scale = (diagonal * 0.6).max(0.1);
    }

    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.projection_mode = mode;
    }

    /// Builds a world-space pick ray through a pixel.
    ///
    /// `pixel` is measured from the top-left corner of a viewport of size
    /// `viewport`. Returns `None` for an empty viewport or a degenerate
    /// unprojection.
    #[must_use]
    pub fn screen_ray(&self, pixel: Vec2, viewport: Vec2) -> Option<Ray> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }

        let ndc = Vec2::new(
            2.0 * pixel.x / viewport.x - 1.0,
            1.0 - 2.0 * pixel.y / viewport.y,
        );
        let clip_to_world = (self.projection_matrix() * self.view_matrix()).inverse();
        let unproject = |depth: f32| {
            let p = clip_to_world * Vec4::new(ndc.x, ndc.y, depth, 1.0);
            (p.w.abs() >= 1e-6).then(|| p.truncate() / p.w)
        };

        let origin = unproject(0.0)?;
        let direction = unproject(1.0)? - origin;
        if direction.length_squared() < 1e-12 {
            return None;
        }
        Some(Ray::new(origin, direction))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

impl ProjectionCamera for Camera {
    fn view_matrix(&self) -> Mat4 {
        Camera::view_matrix(self)
    }

    fn projection_matrix(&self) -> Mat4 {
        Camera::projection_matrix(self)
    }

    fn near(&self) -> f32 {
        self.near
    }

    fn is_perspective(&self) -> bool {
        self.projection_mode == ProjectionMode::Perspective
    }
}
