//! Rendering error types.

use thickline_core::ThicklineError;
use thiserror::Error;

use crate::chunks::TemplateError;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Shader compilation failed.
    #[error("shader compilation failed: {0}")]
    ShaderCompilationFailed(String),

    /// Shader chunk expansion failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Geometry or configuration error.
    #[error(transparent)]
    Core(#[from] ThicklineError),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
