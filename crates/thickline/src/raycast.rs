//! Screen-space picking against the rendered width of a line.
//!
//! The zero-width segments are hit tested the way the vertex stage draws
//! them: each segment is trimmed against the near plane, projected to pixel
//! coordinates and compared with the projected pick ray, so a hit means the
//! cursor is over the visible line.

use std::ops::RangeInclusive;

use glam::{Mat4, Vec2, Vec3, Vec4};
use thickline_core::{Camera, LineIntersection, PickParams, ProjectionCamera, Ray};
use thickline_render::{LineStyle, SegmentGeometry};

/// A pick ray together with the camera it was cast from.
#[derive(Clone, Copy)]
pub struct Raycaster<'a> {
    /// World-space pick ray.
    pub ray: Ray,
    /// The camera used to project segments. Picking without one is
    /// meaningless and logs a warning.
    pub camera: Option<&'a dyn ProjectionCamera>,
    /// Picking tolerances.
    pub params: PickParams,
}

impl<'a> Raycaster<'a> {
    /// Creates a raycaster for `ray` cast from `camera`.
    #[must_use]
    pub fn new(ray: Ray, camera: &'a dyn ProjectionCamera) -> Self {
        Self {
            ray,
            camera: Some(camera),
            params: PickParams::default(),
        }
    }

    /// Creates a raycaster through a pixel of `camera`'s viewport.
    #[must_use]
    pub fn from_screen(camera: &'a Camera, pixel: Vec2, viewport: Vec2) -> Option<Self> {
        camera
            .screen_ray(pixel, viewport)
            .map(|ray| Self::new(ray, camera))
    }

    /// Replaces the picking tolerances.
    #[must_use]
    pub fn with_params(mut self, params: PickParams) -> Self {
        self.params = params;
        self
    }
}

impl std::fmt::Debug for Raycaster<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raycaster")
            .field("ray", &self.ray)
            .field("has_camera", &self.camera.is_some())
            .field("params", &self.params)
            .finish()
    }
}

struct Projection {
    view: Mat4,
    projection: Mat4,
    near: f32,
    depth_range: RangeInclusive<f32>,
}

impl Projection {
    fn from_raycaster(raycaster: &Raycaster<'_>) -> Self {
        match raycaster.camera {
            Some(camera) => {
                if !camera.is_perspective() {
                    log::warn!(
                        "raycast: camera is not a perspective camera; hits may be inaccurate"
                    );
                }
                Self {
                    view: camera.view_matrix(),
                    projection: camera.projection_matrix(),
                    near: camera.near(),
                    depth_range: camera.ndc_depth_range(),
                }
            }
            None => {
                log::warn!("raycast: a camera is required to pick thick lines");
                Self {
                    view: Mat4::IDENTITY,
                    projection: Mat4::IDENTITY,
                    near: 0.0,
                    depth_range: 0.0..=1.0,
                }
            }
        }
    }
}

/// Clip space to pixel space, keeping normalized depth in `z`.
fn to_screen(clip: Vec4, half_resolution: Vec2) -> Vec3 {
    let ndc = clip / clip.w;
    Vec3::new(
        ndc.x * half_resolution.x,
        ndc.y * half_resolution.y,
        ndc.z,
    )
}

/// Parameter of the point on segment `a`-`b` closest to `p`, clamped to
/// `[0, 1]`. A zero-length segment yields 0.
fn closest_point_parameter(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return 0.0;
    }
    (ab.dot(p - a) / len_sq).clamp(0.0, 1.0)
}

/// Appends a [`LineIntersection`] for every instance of `geometry` whose
/// drawn width covers the pick ray.
///
/// `model` is the model-to-world transform of the geometry; `style`
/// supplies the pixel width and viewport resolution. Results are appended
/// to `intersects` in instance order, unsorted.
pub fn raycast(
    geometry: &SegmentGeometry,
    style: &LineStyle,
    model: &Mat4,
    raycaster: &Raycaster<'_>,
    intersects: &mut Vec<LineIntersection>,
) {
    let Projection {
        view,
        projection,
        near,
        depth_range,
    } = Projection::from_raycaster(raycaster);

    let ray = &raycaster.ray;
    let line_width = style.linewidth + raycaster.params.line_threshold;
    let half_resolution = style.resolution * 0.5;

    // The camera looks down -Z.
    let near_z = -near;

    // A point one unit along the ray avoids w = 0 when the ray starts at the
    // camera origin.
    let screen_origin = to_screen(
        projection * view * ray.at(1.0).extend(1.0),
        half_resolution,
    )
    .truncate();

    let model_view = view * *model;

    for (index, instance) in geometry.instances().iter().enumerate() {
        let mut start = model_view * instance.start().extend(1.0);
        let mut end = model_view * instance.end().extend(1.0);

        if start.z > near_z && end.z > near_z {
            continue;
        }

        if start.z > near_z {
            let t = (start.z - near_z) / (start.z - end.z);
            start = start.lerp(end, t);
        } else if end.z > near_z {
            let t = (end.z - near_z) / (end.z - start.z);
            end = end.lerp(start, t);
        }

        let screen_start = to_screen(projection * start, half_resolution);
        let screen_end = to_screen(projection * end, half_resolution);

        let (start_2d, end_2d) = (screen_start.truncate(), screen_end.truncate());
        let param = closest_point_parameter(start_2d, end_2d, screen_origin);
        let closest = start_2d.lerp(end_2d, param);
        let depth = screen_start.z + (screen_end.z - screen_start.z) * param;

        let is_in_clip_space = depth_range.contains(&depth);
        let is_inside = screen_origin.distance(closest) < line_width * 0.5;

        if is_in_clip_space && is_inside {
            let closest = ray.distance_sq_to_segment(
                model.transform_point3(instance.start()),
                model.transform_point3(instance.end()),
            );
            intersects.push(LineIntersection {
                point: closest.point_on_ray,
                point_on_line: closest.point_on_segment,
                distance: ray.origin.distance(closest.point_on_ray),
                instance_index: index,
            });
        }
    }
}
