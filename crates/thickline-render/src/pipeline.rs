//! Render pipeline for instanced thick line segments.

use std::num::NonZeroU64;

use crate::error::RenderResult;
use crate::geometry::topology::QuadVertex;
use crate::geometry::{SegmentColors, SegmentDistances, SegmentInstance};
use crate::line_render::{CameraUniforms, TransformUniforms};
use crate::material::BuiltProgram;
use crate::shader::ShaderBuilder;
use crate::style::{ExtraUniforms, LineUniforms};

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];
const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![2 => Float32x3, 3 => Float32x3];
const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![4 => Float32x3, 5 => Float32x3];
const DISTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![6 => Float32, 7 => Float32];
const INDEX_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![8 => Uint32];

/// Vertex buffer layouts, in slot order: quad, positions, colors,
/// distances, segment indices.
#[must_use]
pub fn vertex_buffer_layouts() -> [wgpu::VertexBufferLayout<'static>; 5] {
    [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &QUAD_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SegmentInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &INSTANCE_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SegmentColors>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &COLOR_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SegmentDistances>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &DISTANCE_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<u32>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &INDEX_ATTRIBUTES,
        },
    ]
}

fn uniform_entry(binding: u32, size: usize) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(size as u64),
        },
        count: None,
    }
}

/// Creates the bind group layout shared by every line pipeline.
///
/// Bindings: 0 camera, 1 line style, 2 model transform, 3 extra uniforms.
pub fn create_line_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("thick line bind group layout"),
        entries: &[
            uniform_entry(0, std::mem::size_of::<CameraUniforms>()),
            uniform_entry(1, std::mem::size_of::<LineUniforms>()),
            uniform_entry(2, std::mem::size_of::<TransformUniforms>()),
            uniform_entry(3, std::mem::size_of::<ExtraUniforms>()),
        ],
    })
}

/// Target formats for a line pipeline.
#[derive(Debug, Clone, Copy)]
pub struct LineTargets {
    /// Color attachment format.
    pub color_format: wgpu::TextureFormat,
    /// Depth attachment format, if depth testing is used.
    pub depth_format: Option<wgpu::TextureFormat>,
}

/// A compiled line program.
pub struct LinePipeline {
    /// The render pipeline.
    pub pipeline: wgpu::RenderPipeline,
    /// Layout of group 0.
    pub bind_group_layout: wgpu::BindGroupLayout,
    /// Generation of the material program this pipeline was built from.
    pub generation: u64,
}

impl LinePipeline {
    /// Compiles `program` into a render pipeline.
    pub fn new(
        device: &wgpu::Device,
        program: &BuiltProgram,
        targets: LineTargets,
    ) -> RenderResult<Self> {
        let bind_group_layout = create_line_bind_group_layout(device);
        let pipeline = create_render_pipeline(device, &bind_group_layout, program, targets)?;
        Ok(Self {
            pipeline,
            bind_group_layout,
            generation: program.generation,
        })
    }

    /// Recompiles the pipeline from a newer program.
    ///
    /// The bind group layout is kept, so existing bind groups stay valid.
    pub fn rebuild(
        &mut self,
        device: &wgpu::Device,
        program: &BuiltProgram,
        targets: LineTargets,
    ) -> RenderResult<()> {
        self.pipeline = create_render_pipeline(device, &self.bind_group_layout, program, targets)?;
        self.generation = program.generation;
        Ok(())
    }

    /// Whether this pipeline was built from an older program.
    #[must_use]
    pub fn is_stale(&self, program: &BuiltProgram) -> bool {
        self.generation != program.generation
    }
}

fn create_render_pipeline(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    program: &BuiltProgram,
    targets: LineTargets,
) -> RenderResult<wgpu::RenderPipeline> {
    let shader = ShaderBuilder::from_program(program)
        .with_label("thick line shader")
        .build_module(device)?;

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("thick line pipeline layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    let buffers = vertex_buffer_layouts();
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("thick line pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: targets.color_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None, // Quads flip with segment direction
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: targets.depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    log::info!(
        "created thick line pipeline (program generation {})",
        program.generation
    );
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layouts_cover_every_location() {
        let layouts = vertex_buffer_layouts();
        let mut locations: Vec<u32> = layouts
            .iter()
            .flat_map(|l| l.attributes.iter().map(|a| a.shader_location))
            .collect();
        locations.sort_unstable();
        assert_eq!(locations, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_only_quad_steps_per_vertex() {
        let layouts = vertex_buffer_layouts();
        assert_eq!(layouts[0].step_mode, wgpu::VertexStepMode::Vertex);
        assert!(layouts[1..]
            .iter()
            .all(|l| l.step_mode == wgpu::VertexStepMode::Instance));
    }

    #[test]
    fn test_strides_match_attribute_spans() {
        for layout in vertex_buffer_layouts() {
            let span: u64 = layout.attributes.iter().map(|a| a.format.size()).sum();
            assert_eq!(span, layout.array_stride);
        }
    }
}
