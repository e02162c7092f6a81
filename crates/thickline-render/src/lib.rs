//! Rendering side of thickline.
//!
//! This crate provides:
//! - Instanced segment geometry with bounding volumes ([`SegmentGeometry`])
//! - Line style state and its uniform layout ([`LineStyle`])
//! - Shader chunk overrides and template expansion ([`ChunkStore`])
//! - The line material that ties style and chunks together ([`LineMaterial`])
//! - wgpu resources for drawing lines ([`LinePipeline`], [`LineRenderData`])

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod buffer;
pub mod chunks;
pub mod device;
pub mod error;
pub mod geometry;
pub mod line_render;
pub mod material;
pub mod pipeline;
pub mod shader;
pub mod style;

pub use chunks::{ChunkName, ChunkStore, TemplateError};
pub use device::request_headless_device;
pub use error::{RenderError, RenderResult};
pub use geometry::{
    feature_edges, wireframe_edges, SegmentColors, SegmentDistances, SegmentGeometry,
    SegmentInstance, StreamVersions,
};
pub use line_render::{CameraUniforms, LineRenderData, TransformUniforms};
pub use material::{BuiltProgram, LineMaterial};
pub use pipeline::{LinePipeline, LineTargets};
pub use shader::ShaderBuilder;
pub use style::{
    ExtraUniformBlock, ExtraUniforms, LineStyle, LineUniforms, UniformValue, EXTRA_UNIFORM_SLOTS,
};
