//! Shared bounding-volume and transform behavior.
//!
//! A [`Geometry`] owns derived bounding volumes that are recomputed only on
//! request. Mutating the underlying attributes never invalidates them.

use glam::Mat4;

use crate::bounds::{Aabb, BoundingSphere};

/// Geometry with explicitly recomputed bounding volumes.
pub trait Geometry {
    /// Returns the last computed bounding box, if any.
    fn bounding_box(&self) -> Option<&Aabb>;

    /// Returns the last computed bounding sphere, if any.
    fn bounding_sphere(&self) -> Option<&BoundingSphere>;

    /// Recomputes the bounding box from the current attributes.
    fn compute_bounding_box(&mut self);

    /// Recomputes the bounding sphere from the current attributes.
    fn compute_bounding_sphere(&mut self);

    /// Transforms the geometry in place.
    ///
    /// Bounding volumes that already exist are recomputed; absent ones stay
    /// absent.
    fn apply_matrix(&mut self, matrix: &Mat4);

    /// Returns the bounding box transformed into world space by `model`.
    fn world_bounding_box(&self, model: &Mat4) -> Option<Aabb> {
        self.bounding_box().map(|aabb| aabb.transformed(model))
    }
}
