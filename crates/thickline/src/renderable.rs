//! A drawable, pickable set of thick line segments.

use glam::{Mat4, Vec3};
use thickline_core::{Aabb, Geometry, LineIntersection, ProjectionCamera, Result};
use thickline_render::{
    LineMaterial, LinePipeline, LineRenderData, LineStyle, LineTargets, RenderResult,
    SegmentGeometry,
};

use crate::line_distances::line_distances;
use crate::raycast::{raycast, Raycaster};

/// Segment geometry drawn with a [`LineMaterial`] under a model transform.
#[derive(Debug, Clone)]
pub struct ThickLineSegments {
    geometry: SegmentGeometry,
    material: LineMaterial,
    transform: Mat4,
}

impl ThickLineSegments {
    /// Creates line segments from a geometry and a material.
    #[must_use]
    pub fn new(geometry: SegmentGeometry, material: LineMaterial) -> Self {
        Self {
            geometry,
            material,
            transform: Mat4::IDENTITY,
        }
    }

    /// Creates line segments from endpoint pairs (0-1, 2-3, ...) and a style.
    #[must_use]
    pub fn from_points(points: &[Vec3], style: LineStyle) -> Self {
        Self::new(
            SegmentGeometry::from_line_segments(points),
            LineMaterial::new(style),
        )
    }

    /// The segment geometry.
    #[must_use]
    pub fn geometry(&self) -> &SegmentGeometry {
        &self.geometry
    }

    /// Mutable access to the segment geometry.
    pub fn geometry_mut(&mut self) -> &mut SegmentGeometry {
        &mut self.geometry
    }

    /// The material.
    #[must_use]
    pub fn material(&self) -> &LineMaterial {
        &self.material
    }

    /// Mutable access to the material.
    pub fn material_mut(&mut self) -> &mut LineMaterial {
        &mut self.material
    }

    /// Model-to-world transform.
    #[must_use]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Sets the model-to-world transform.
    pub fn set_transform(&mut self, transform: Mat4) -> &mut Self {
        self.transform = transform;
        self
    }

    /// World-space bounding box, if one has been computed.
    #[must_use]
    pub fn world_bounding_box(&self) -> Option<Aabb> {
        self.geometry.world_bounding_box(&self.transform)
    }

    /// Computes cumulative arc distances from the current positions.
    ///
    /// The result is not updated when positions change later.
    pub fn compute_line_distances(&mut self) -> Result<&mut Self> {
        let distances = line_distances(self.geometry.instances());
        self.geometry.set_line_distances(distances)?;
        Ok(self)
    }

    /// Appends every segment hit by `raycaster` to `intersects`, unsorted.
    pub fn raycast(&self, raycaster: &Raycaster<'_>, intersects: &mut Vec<LineIntersection>) {
        raycast(
            &self.geometry,
            self.material.style(),
            &self.transform,
            raycaster,
            intersects,
        );
    }

    /// Returns every segment hit by `raycaster`, nearest first.
    #[must_use]
    pub fn pick(&self, raycaster: &Raycaster<'_>) -> Vec<LineIntersection> {
        let mut intersects = Vec::new();
        self.raycast(raycaster, &mut intersects);
        LineIntersection::sort_by_distance(&mut intersects);
        intersects
    }

    // === GPU ===

    /// Builds the material program and compiles it into a pipeline.
    pub fn create_pipeline(
        &mut self,
        device: &wgpu::Device,
        targets: LineTargets,
    ) -> RenderResult<LinePipeline> {
        let program = self.material.build()?;
        LinePipeline::new(device, program, targets)
    }

    /// Uploads the geometry and current style.
    pub fn create_render_data(
        &mut self,
        device: &wgpu::Device,
        pipeline: &LinePipeline,
    ) -> RenderResult<LineRenderData> {
        let program = self.material.build()?;
        Ok(LineRenderData::new(
            device,
            &pipeline.bind_group_layout,
            &self.geometry,
            program,
            self.transform,
        ))
    }

    /// Brings GPU state up to date before drawing.
    ///
    /// Rebuilds the pipeline if the material changed, re-uploads changed
    /// instance streams and writes the camera, style and transform
    /// uniforms.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &mut LinePipeline,
        targets: LineTargets,
        render_data: &mut LineRenderData,
        camera: &dyn ProjectionCamera,
    ) -> RenderResult<()> {
        let program = self.material.build()?;
        if pipeline.is_stale(program) {
            pipeline.rebuild(device, program, targets)?;
        }
        render_data.update_style(queue, program);
        render_data.update_geometry(device, queue, &self.geometry);
        render_data.update_transform(queue, self.transform);
        render_data.update_camera(queue, camera);
        Ok(())
    }
}
