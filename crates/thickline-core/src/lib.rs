//! Core value types for thickline.
//!
//! This crate provides the math-level building blocks shared by the render
//! backend and the facade crate:
//! - [`Aabb`] and [`BoundingSphere`] bounding volumes
//! - [`Ray`] with the ray/segment closest-point routine used for picking
//! - [`Camera`] and the [`ProjectionCamera`] trait consumed by the raycast
//! - the [`Geometry`] trait for shared bounding-volume and transform behavior
//! - [`LineIntersection`] pick records and [`PickParams`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Ray/segment math uses the short conventional names (a01, b0, s1)
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]

pub mod bounds;
pub mod camera;
pub mod error;
pub mod options;
pub mod pick;
pub mod ray;
pub mod structure;

pub use bounds::{Aabb, BoundingSphere};
pub use camera::{Camera, ProjectionCamera, ProjectionMode};
pub use error::{Result, ThicklineError};
pub use options::PickParams;
pub use pick::LineIntersection;
pub use ray::Ray;
pub use structure::Geometry;

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
