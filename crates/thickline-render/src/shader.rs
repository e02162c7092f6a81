//! Shader module assembly.

use crate::error::{RenderError, RenderResult};
use crate::material::BuiltProgram;

/// Builder for shader modules from separately expanded stage sources.
pub struct ShaderBuilder {
    vertex_source: Option<String>,
    fragment_source: Option<String>,
    label: Option<String>,
}

impl ShaderBuilder {
    /// Creates a new shader builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vertex_source: None,
            fragment_source: None,
            label: None,
        }
    }

    /// Creates a builder from both stages of a built material program.
    ///
    /// The extra uniform declaration goes first so both stages can read
    /// `extra`.
    #[must_use]
    pub fn from_program(program: &BuiltProgram) -> Self {
        Self::new()
            .with_vertex(format!(
                "{}\n{}",
                program.extra_block.declaration, program.vertex_source
            ))
            .with_fragment(program.fragment_source.clone())
    }

    /// Sets the vertex stage source (WGSL).
    pub fn with_vertex(mut self, source: impl Into<String>) -> Self {
        self.vertex_source = Some(source.into());
        self
    }

    /// Sets the fragment stage source (WGSL).
    pub fn with_fragment(mut self, source: impl Into<String>) -> Self {
        self.fragment_source = Some(source.into());
        self
    }

    /// Sets the shader label for debugging.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builds the shader module (does not create a pipeline).
    pub fn build_module(self, device: &wgpu::Device) -> RenderResult<wgpu::ShaderModule> {
        let source = self.combined_source()?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: self.label.as_deref(),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        Ok(module)
    }

    /// Joins both stages into a single WGSL module.
    ///
    /// The fragment stage relies on declarations made by the vertex stage.
    pub fn combined_source(&self) -> RenderResult<String> {
        let vertex = self
            .vertex_source
            .as_ref()
            .ok_or_else(|| RenderError::ShaderCompilationFailed("missing vertex shader".into()))?;

        let fragment = self.fragment_source.as_ref().ok_or_else(|| {
            RenderError::ShaderCompilationFailed("missing fragment shader".into())
        })?;

        if vertex == fragment {
            return Ok(vertex.clone());
        }

        Ok(format!("{vertex}\n\n{fragment}"))
    }
}

impl Default for ShaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
