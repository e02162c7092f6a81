//! GPU resources for one set of thick line segments.

use glam::Mat4;
use thickline_core::ProjectionCamera;

use crate::buffer::{
    create_index_buffer, create_uniform_buffer, create_vertex_buffer, update_uniform_buffer,
    upload_vertex_data,
};
use crate::geometry::topology::{quad_vertices, QUAD_INDICES};
use crate::geometry::{SegmentColors, SegmentDistances, SegmentGeometry, StreamVersions};
use crate::material::BuiltProgram;

/// Camera uniforms.
/// Layout must match WGSL `CameraUniforms` exactly (128 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    /// World to camera.
    pub view: [[f32; 4]; 4],
    /// Camera to clip.
    pub projection: [[f32; 4]; 4],
}

impl CameraUniforms {
    /// Captures the matrices of `camera`.
    #[must_use]
    pub fn from_camera(camera: &dyn ProjectionCamera) -> Self {
        Self {
            view: camera.view_matrix().to_cols_array_2d(),
            projection: camera.projection_matrix().to_cols_array_2d(),
        }
    }
}

impl Default for CameraUniforms {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

/// Model transform uniforms (64 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniforms {
    /// Model to world.
    pub model: [[f32; 4]; 4],
}

impl From<Mat4> for TransformUniforms {
    fn from(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }
}

impl Default for TransformUniforms {
    fn default() -> Self {
        Self::from(Mat4::IDENTITY)
    }
}

/// One color pair per instance, white where the geometry has none.
fn color_stream(geometry: &SegmentGeometry) -> Vec<SegmentColors> {
    let white = SegmentColors {
        start: [1.0; 3],
        end: [1.0; 3],
    };
    let mut colors = geometry
        .colors()
        .map(<[SegmentColors]>::to_vec)
        .unwrap_or_default();
    // The shader reads exactly one color pair per instance.
    colors.resize(geometry.instance_count(), white);
    colors
}

fn distance_stream(geometry: &SegmentGeometry) -> Vec<SegmentDistances> {
    let mut distances = geometry
        .line_distances()
        .map(<[SegmentDistances]>::to_vec)
        .unwrap_or_default();
    // Stale distances may no longer match the instance count.
    distances.resize(geometry.instance_count(), SegmentDistances::default());
    distances
}

/// GPU buffers and bind group for drawing a [`SegmentGeometry`].
pub struct LineRenderData {
    /// Shared quad vertices.
    pub quad_vertex_buffer: wgpu::Buffer,
    /// Shared quad indices.
    pub quad_index_buffer: wgpu::Buffer,
    /// Segment endpoints, one entry per instance.
    pub instance_buffer: wgpu::Buffer,
    /// Segment endpoint colors.
    pub color_buffer: wgpu::Buffer,
    /// Segment arc distances.
    pub distance_buffer: wgpu::Buffer,
    /// Segment indices.
    pub segment_index_buffer: wgpu::Buffer,
    /// Camera uniforms.
    pub camera_buffer: wgpu::Buffer,
    /// Line style uniforms.
    pub line_buffer: wgpu::Buffer,
    /// Model transform uniforms.
    pub transform_buffer: wgpu::Buffer,
    /// Extra uniform block.
    pub extra_buffer: wgpu::Buffer,
    /// Bind group for group 0.
    pub bind_group: wgpu::BindGroup,
    /// Number of instances currently uploaded.
    pub num_instances: u32,

    uploaded: StreamVersions,
}

impl LineRenderData {
    /// Uploads `geometry` and creates the uniform buffers, filling the
    /// style blocks from `program`.
    ///
    /// Camera uniforms start as identity until [`Self::update_camera`].
    pub fn new(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        geometry: &SegmentGeometry,
        program: &BuiltProgram,
        model: Mat4,
    ) -> Self {
        let quad_vertex_buffer =
            create_vertex_buffer(device, &quad_vertices(), Some("thick line quad vertices"));
        let quad_index_buffer =
            create_index_buffer(device, &QUAD_INDICES, Some("thick line quad indices"));

        let instance_buffer = create_vertex_buffer(
            device,
            geometry.instances(),
            Some("thick line instance positions"),
        );
        let color_buffer = create_vertex_buffer(
            device,
            &color_stream(geometry),
            Some("thick line instance colors"),
        );
        let distance_buffer = create_vertex_buffer(
            device,
            &distance_stream(geometry),
            Some("thick line instance distances"),
        );
        let segment_index_buffer = create_vertex_buffer(
            device,
            geometry.segment_indices(),
            Some("thick line segment indices"),
        );

        let camera_buffer = create_uniform_buffer(
            device,
            &CameraUniforms::default(),
            Some("thick line camera uniforms"),
        );
        let line_buffer =
            create_uniform_buffer(device, &program.line_uniforms, Some("thick line uniforms"));
        let transform_buffer = create_uniform_buffer(
            device,
            &TransformUniforms::from(model),
            Some("thick line transform uniforms"),
        );
        let extra_buffer = create_uniform_buffer(
            device,
            &program.extra_block.data,
            Some("thick line extra uniforms"),
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("thick line bind group"),
            layout: bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: line_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: transform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: extra_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            quad_vertex_buffer,
            quad_index_buffer,
            instance_buffer,
            color_buffer,
            distance_buffer,
            segment_index_buffer,
            camera_buffer,
            line_buffer,
            transform_buffer,
            extra_buffer,
            bind_group,
            num_instances: geometry.instance_count() as u32,
            uploaded: geometry.versions(),
        }
    }

    /// Re-uploads the instance streams that changed since the last upload.
    ///
    /// A position change re-uploads every stream, since default colors and
    /// distances are sized by the instance count. Returns true if anything
    /// was uploaded.
    pub fn update_geometry(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        geometry: &SegmentGeometry,
    ) -> bool {
        let current = geometry.versions();
        if current == self.uploaded {
            return false;
        }

        let positions_changed = current.positions != self.uploaded.positions;
        if positions_changed {
            upload_vertex_data(
                device,
                queue,
                &mut self.instance_buffer,
                geometry.instances(),
                Some("thick line instance positions"),
            );
            upload_vertex_data(
                device,
                queue,
                &mut self.segment_index_buffer,
                geometry.segment_indices(),
                Some("thick line segment indices"),
            );
            self.num_instances = geometry.instance_count() as u32;
        }
        if positions_changed || current.colors != self.uploaded.colors {
            upload_vertex_data(
                device,
                queue,
                &mut self.color_buffer,
                &color_stream(geometry),
                Some("thick line instance colors"),
            );
        }
        if positions_changed || current.distances != self.uploaded.distances {
            upload_vertex_data(
                device,
                queue,
                &mut self.distance_buffer,
                &distance_stream(geometry),
                Some("thick line instance distances"),
            );
        }

        log::debug!(
            "LineRenderData: uploaded {} instances (versions {:?})",
            self.num_instances,
            current
        );
        self.uploaded = current;
        true
    }

    /// Updates the camera uniforms.
    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &dyn ProjectionCamera) {
        update_uniform_buffer(queue, &self.camera_buffer, &CameraUniforms::from_camera(camera));
    }

    /// Uploads the style and extra uniform blocks of `program`.
    pub fn update_style(&self, queue: &wgpu::Queue, program: &BuiltProgram) {
        update_uniform_buffer(queue, &self.line_buffer, &program.line_uniforms);
        update_uniform_buffer(queue, &self.extra_buffer, &program.extra_block.data);
    }

    /// Updates the model transform.
    pub fn update_transform(&self, queue: &wgpu::Queue, model: Mat4) {
        update_uniform_buffer(queue, &self.transform_buffer, &TransformUniforms::from(model));
    }

    /// Records the draw call. The line pipeline must already be set.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.num_instances == 0 {
            return;
        }
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.quad_vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        render_pass.set_vertex_buffer(2, self.color_buffer.slice(..));
        render_pass.set_vertex_buffer(3, self.distance_buffer.slice(..));
        render_pass.set_vertex_buffer(4, self.segment_index_buffer.slice(..));
        render_pass.set_index_buffer(self.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..self.num_instances);
    }
}
