//! thickline: constant pixel-width line segments for wgpu, with picking
//! against the visible line.
//!
//! # Quick Start
//!
//! ```no_run
//! use thickline::*;
//!
//! let mut lines = ThickLineSegments::from_points(
//!     &[Vec3::ZERO, Vec3::X, Vec3::X, Vec3::new(1.0, 1.0, 0.0)],
//!     LineStyle {
//!         linewidth: 4.0,
//!         resolution: Vec2::new(800.0, 600.0),
//!         ..LineStyle::default()
//!     },
//! );
//! lines.compute_line_distances()?;
//!
//! let mut camera = Camera::new(800.0 / 600.0);
//! camera.position = Vec3::new(0.5, 0.5, 3.0);
//! camera.target = Vec3::new(0.5, 0.5, 0.0);
//!
//! if let Some(raycaster) =
//!     Raycaster::from_screen(&camera, Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0))
//! {
//!     for hit in lines.pick(&raycaster) {
//!         println!("segment {} at {:?}", hit.instance_index, hit.point_on_line);
//!     }
//! }
//! # Ok::<(), ThicklineError>(())
//! ```
//!
//! # Customizing the shader
//!
//! The default WGSL templates contain injection points that can be
//! overridden through [`LineMaterial::set_chunk`]:
//!
//! ```
//! use thickline::*;
//!
//! let mut material = LineMaterial::default();
//! material.set_chunk("color", "color = vec4<f32>(color.rgb * 0.5, color.a);");
//! let program = material.build().unwrap();
//! assert!(program.fragment_source.contains("color.rgb * 0.5"));
//! ```

mod line_distances;
mod raycast;
mod renderable;

pub use line_distances::line_distances;
pub use raycast::{raycast, Raycaster};
pub use renderable::ThickLineSegments;

// Re-export core types
pub use thickline_core::{
    Aabb, BoundingSphere, Camera, Geometry, LineIntersection, PickParams, ProjectionCamera,
    ProjectionMode, Ray, Result, ThicklineError,
};
pub use thickline_core::{Mat4, Vec2, Vec3, Vec4};

// Re-export render types
pub use thickline_render::{
    request_headless_device, BuiltProgram, ChunkName, ChunkStore, ExtraUniformBlock, LineMaterial,
    LinePipeline, LineRenderData, LineStyle, LineTargets, LineUniforms, RenderError,
    RenderResult, SegmentColors, SegmentDistances, SegmentGeometry, SegmentInstance,
    TemplateError, UniformValue,
};
