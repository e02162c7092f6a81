//! Rays and the ray/segment closest-point routine.

use glam::Vec3;

/// A half-infinite ray with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin in world space.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

/// Result of [`Ray::distance_sq_to_segment`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySegmentClosest {
    /// Squared distance between the two closest points.
    pub distance_sq: f32,
    /// Closest point on the ray.
    pub point_on_ray: Vec3,
    /// Closest point on the segment.
    pub point_on_segment: Vec3,
}

impl Ray {
    /// Creates a ray. The direction is normalized (a zero direction stays zero).
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Returns the point at parameter `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Computes the closest points between this ray and the segment `v0`-`v1`.
    ///
    /// The ray parameter is clamped to `t >= 0` and the segment parameter to
    /// the segment extent, so both returned points lie on their primitives.
    #[must_use]
    pub fn distance_sq_to_segment(&self, v0: Vec3, v1: Vec3) -> RaySegmentClosest {
        let seg_center = (v0 + v1) * 0.5;
        let seg_dir = (v1 - v0).normalize_or_zero();
        let diff = self.origin - seg_center;

        let seg_extent = v0.distance(v1) * 0.5;
        let a01 = -self.direction.dot(seg_dir);
        let b0 = diff.dot(self.direction);
        let b1 = -diff.dot(seg_dir);
        let c = diff.length_squared();
        let det = (1.0 - a01 * a01).abs();

        let clamp_extent = |s: f32| s.max(-seg_extent).min(seg_extent);

        let (s0, s1, distance_sq) = if det > 0.0 {
            // Not parallel: find the region of the (s0, s1) parameter plane.
            let mut s0 = a01 * b1 - b0;
            let mut s1 = a01 * b0 - b1;
            let ext_det = seg_extent * det;

            if s0 >= 0.0 {
                if s1 >= -ext_det {
                    if s1 <= ext_det {
                        // Interior of both primitives.
                        let inv_det = 1.0 / det;
                        s0 *= inv_det;
                        s1 *= inv_det;
                        let d = s0 * (s0 + a01 * s1 + 2.0 * b0)
                            + s1 * (a01 * s0 + s1 + 2.0 * b1)
                            + c;
                        (s0, s1, d)
                    } else {
                        let s1 = seg_extent;
                        let s0 = (-(a01 * s1 + b0)).max(0.0);
                        (s0, s1, -s0 * s0 + s1 * (s1 + 2.0 * b1) + c)
                    }
                } else {
                    let s1 = -seg_extent;
                    let s0 = (-(a01 * s1 + b0)).max(0.0);
                    (s0, s1, -s0 * s0 + s1 * (s1 + 2.0 * b1) + c)
                }
            } else if s1 <= -ext_det {
                let s0 = (-(-a01 * seg_extent + b0)).max(0.0);
                let s1 = if s0 > 0.0 {
                    -seg_extent
                } else {
                    clamp_extent(-b1)
                };
                (s0, s1, -s0 * s0 + s1 * (s1 + 2.0 * b1) + c)
            } else if s1 <= ext_det {
                let s1 = clamp_extent(-b1);
                (0.0, s1, s1 * (s1 + 2.0 * b1) + c)
            } else {
                let s0 = (-(a01 * seg_extent + b0)).max(0.0);
                let s1 = if s0 > 0.0 {
                    seg_extent
                } else {
                    clamp_extent(-b1)
                };
                (s0, s1, -s0 * s0 + s1 * (s1 + 2.0 * b1) + c)
            }
        } else {
            // Parallel.
            let s1 = if a01 > 0.0 { -seg_extent } else { seg_extent };
            let s0 = (-(a01 * s1 + b0)).max(0.0);
            (s0, s1, -s0 * s0 + s1 * (s1 + 2.0 * b1) + c)
        };

        RaySegmentClosest {
            distance_sq,
            point_on_ray: self.at(s0),
            point_on_segment: seg_center + seg_dir * s1,
        }
    }
}
