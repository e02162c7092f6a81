//! Line material: style, shader chunk overrides and extra uniforms.
//!
//! A [`LineMaterial`] owns everything that goes into building a line shader
//! program. Every mutation marks the material as needing an update; the
//! next [`LineMaterial::build`] expands the templates and merges uniform
//! bindings again.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};

use crate::chunks::{ChunkName, ChunkStore, TemplateError};
use crate::style::{ExtraUniformBlock, LineStyle, LineUniforms, UniformValue};

/// Default vertex stage template (WGSL).
pub const DEFAULT_VERTEX_TEMPLATE: &str = include_str!("shaders/thick_line_vertex.wgsl");

/// Default fragment stage template (WGSL).
pub const DEFAULT_FRAGMENT_TEMPLATE: &str = include_str!("shaders/thick_line_fragment.wgsl");

/// The output of a material build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltProgram {
    /// Expanded vertex stage source.
    pub vertex_source: String,
    /// Expanded fragment stage source.
    pub fragment_source: String,
    /// Style bindings merged with the caller's extra bindings.
    pub uniforms: BTreeMap<String, UniformValue>,
    /// GPU block for the built-in bindings, extras applied.
    pub line_uniforms: LineUniforms,
    /// GPU block for the extra bindings without a built-in counterpart.
    pub extra_block: ExtraUniformBlock,
    /// Incremented on every rebuild.
    pub generation: u64,
}

/// Material for constant pixel-width lines.
#[derive(Debug, Clone)]
pub struct LineMaterial {
    style: LineStyle,
    chunks: ChunkStore,
    extra_uniforms: BTreeMap<String, UniformValue>,
    vertex_template: String,
    fragment_template: String,

    needs_update: bool,
    program: Option<BuiltProgram>,
    generation: u64,
}

impl Default for LineMaterial {
    fn default() -> Self {
        Self::new(LineStyle::default())
    }
}

impl LineMaterial {
    /// Creates a material using the default templates.
    #[must_use]
    pub fn new(style: LineStyle) -> Self {
        Self::with_templates(style, DEFAULT_VERTEX_TEMPLATE, DEFAULT_FRAGMENT_TEMPLATE)
    }

    /// Creates a material with caller-supplied templates.
    #[must_use]
    pub fn with_templates(
        style: LineStyle,
        vertex_template: impl Into<String>,
        fragment_template: impl Into<String>,
    ) -> Self {
        Self {
            style,
            chunks: ChunkStore::new(),
            extra_uniforms: BTreeMap::new(),
            vertex_template: vertex_template.into(),
            fragment_template: fragment_template.into(),
            needs_update: true,
            program: None,
            generation: 0,
        }
    }

    /// Whether the next use must rebuild the program.
    #[must_use]
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Forces a rebuild on next use.
    pub fn mark_needs_update(&mut self) {
        self.needs_update = true;
    }

    // === Style ===

    /// The current style.
    #[must_use]
    pub fn style(&self) -> &LineStyle {
        &self.style
    }

    /// Replaces the whole style.
    pub fn set_style(&mut self, style: LineStyle) -> &mut Self {
        self.style = style;
        self.mark_needs_update();
        self
    }

    /// Viewport resolution in pixels.
    #[must_use]
    pub fn resolution(&self) -> Vec2 {
        self.style.resolution
    }

    /// Sets the viewport resolution in pixels.
    pub fn set_resolution(&mut self, resolution: Vec2) -> &mut Self {
        self.style.resolution = resolution;
        self.mark_needs_update();
        self
    }

    /// Line width in pixels.
    #[must_use]
    pub fn linewidth(&self) -> f32 {
        self.style.linewidth
    }

    /// Sets the line width in pixels.
    pub fn set_linewidth(&mut self, linewidth: f32) -> &mut Self {
        self.style.linewidth = linewidth;
        self.mark_needs_update();
        self
    }

    /// Whether dashing is enabled.
    #[must_use]
    pub fn dashed(&self) -> bool {
        self.style.dashed
    }

    /// Enables or disables dashing.
    pub fn set_dashed(&mut self, dashed: bool) -> &mut Self {
        self.style.dashed = dashed;
        self.mark_needs_update();
        self
    }

    /// Arc distance scale used by dashing.
    #[must_use]
    pub fn dash_scale(&self) -> f32 {
        self.style.dash_scale
    }

    /// Sets the arc distance scale.
    pub fn set_dash_scale(&mut self, dash_scale: f32) -> &mut Self {
        self.style.dash_scale = dash_scale;
        self.mark_needs_update();
        self
    }

    /// Dash length.
    #[must_use]
    pub fn dash_size(&self) -> f32 {
        self.style.dash_size
    }

    /// Sets the dash length.
    pub fn set_dash_size(&mut self, dash_size: f32) -> &mut Self {
        self.style.dash_size = dash_size;
        self.mark_needs_update();
        self
    }

    /// Gap length.
    #[must_use]
    pub fn gap_size(&self) -> f32 {
        self.style.gap_size
    }

    /// Sets the gap length.
    pub fn set_gap_size(&mut self, gap_size: f32) -> &mut Self {
        self.style.gap_size = gap_size;
        self.mark_needs_update();
        self
    }

    /// Dash offset.
    #[must_use]
    pub fn dash_offset(&self) -> f32 {
        self.style.dash_offset
    }

    /// Sets the dash offset.
    pub fn set_dash_offset(&mut self, dash_offset: f32) -> &mut Self {
        self.style.dash_offset = dash_offset;
        self.mark_needs_update();
        self
    }

    /// Base color.
    #[must_use]
    pub fn color(&self) -> Vec3 {
        self.style.color
    }

    /// Sets the base color.
    pub fn set_color(&mut self, color: Vec3) -> &mut Self {
        self.style.color = color;
        self.mark_needs_update();
        self
    }

    /// Opacity.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.style.opacity
    }

    /// Sets the opacity.
    pub fn set_opacity(&mut self, opacity: f32) -> &mut Self {
        self.style.opacity = opacity;
        self.mark_needs_update();
        self
    }

    // === Extra uniforms ===

    /// Extra uniform bindings merged over the style bindings at build time.
    ///
    /// A binding named like a built-in (`opacity`, `diffuse`, ...) replaces
    /// the style value when its type matches. Any other name is packed into
    /// the `extra` uniform block that chunks can read.
    #[must_use]
    pub fn extra_uniforms(&self) -> &BTreeMap<String, UniformValue> {
        &self.extra_uniforms
    }

    /// Replaces the extra uniform bindings.
    pub fn set_uniforms(&mut self, uniforms: BTreeMap<String, UniformValue>) {
        self.extra_uniforms = uniforms;
        self.mark_needs_update();
    }

    /// Removes all extra uniform bindings.
    pub fn unset_uniforms(&mut self) {
        self.extra_uniforms.clear();
        self.mark_needs_update();
    }

    // === Chunks ===

    /// The chunk overrides.
    #[must_use]
    pub fn chunks(&self) -> &ChunkStore {
        &self.chunks
    }

    /// Overrides the chunk `name`. Unknown names are ignored.
    pub fn set_chunk(&mut self, name: &str, text: impl Into<String>) {
        if self.chunks.set_chunk(name, text) {
            self.mark_needs_update();
        }
    }

    /// Removes the override for chunk `name`. Unknown names are ignored.
    pub fn unset_chunk(&mut self, name: &str) {
        if self.chunks.unset_chunk(name) {
            self.mark_needs_update();
        }
    }

    /// Overrides a known chunk.
    pub fn set_named_chunk(&mut self, name: ChunkName, text: impl Into<String>) {
        self.chunks.set(name, text);
        self.mark_needs_update();
    }

    /// Removes every chunk override.
    pub fn clear_chunks(&mut self) {
        self.chunks.clear();
        self.mark_needs_update();
    }

    // === Building ===

    /// Returns the built program, rebuilding it first if anything changed.
    pub fn build(&mut self) -> Result<&BuiltProgram, TemplateError> {
        let program = match self.program.take() {
            Some(program) if !self.needs_update => program,
            previous => match self.build_program() {
                Ok(program) => {
                    log::debug!(
                        "LineMaterial: rebuilt program (generation {})",
                        program.generation
                    );
                    self.needs_update = false;
                    program
                }
                Err(err) => {
                    // The last good program stays available to callers.
                    self.program = previous;
                    return Err(err);
                }
            },
        };
        Ok(self.program.insert(program))
    }

    /// The last successfully built program, without rebuilding.
    #[must_use]
    pub fn program(&self) -> Option<&BuiltProgram> {
        self.program.as_ref()
    }

    /// Expands both templates against the current chunks.
    ///
    /// Does not touch the cached program.
    pub fn expand_sources(&self) -> Result<(String, String), TemplateError> {
        Ok((
            self.chunks.expand(&self.vertex_template)?,
            self.chunks.expand(&self.fragment_template)?,
        ))
    }

    fn build_program(&mut self) -> Result<BuiltProgram, TemplateError> {
        let (vertex_source, fragment_source) = self.expand_sources()?;

        let mut uniforms = self.style.uniform_bindings();
        let mut line_uniforms = LineUniforms::from(&self.style);
        let mut custom = Vec::new();
        for (name, value) in &self.extra_uniforms {
            if !uniforms.contains_key(name) {
                custom.push((name.as_str(), *value));
            } else if line_uniforms.apply_binding(name, *value) {
                uniforms.insert(name.clone(), *value);
            } else {
                log::warn!(
                    "LineMaterial: uniform '{name}' expects {:?}, got {value:?}; ignored",
                    uniforms[name]
                );
            }
        }
        let extra_block = ExtraUniformBlock::pack(custom.iter().copied());
        uniforms.extend(
            extra_block
                .members
                .iter()
                .filter_map(|name| Some((name.clone(), *self.extra_uniforms.get(name)?))),
        );

        self.generation += 1;
        Ok(BuiltProgram {
            vertex_source,
            fragment_source,
            uniforms,
            line_uniforms,
            extra_block,
            generation: self.generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material() -> LineMaterial {
        LineMaterial::with_templates(
            LineStyle::default(),
            "v[%- vertexStart -%]",
            "f[%- color -%]",
        )
    }

    #[test]
    fn test_new_material_needs_build() {
        let mut material = material();
        assert!(material.needs_update());
        assert!(material.program().is_none());
        let program = material.build().unwrap();
        assert_eq!(program.vertex_source, "v[]");
        assert_eq!(program.fragment_source, "f[]");
        assert_eq!(program.generation, 1);
        assert!(!material.needs_update());
    }

    #[test]
    fn test_build_is_cached_until_dirty() {
        let mut material = material();
        material.build().unwrap();
        assert_eq!(material.build().unwrap().generation, 1);

        material.set_linewidth(3.0);
        assert!(material.needs_update());
        let program = material.build().unwrap();
        assert_eq!(program.generation, 2);
        assert_eq!(program.uniforms["linewidth"], UniformValue::Float(3.0));
        assert_eq!(program.line_uniforms.linewidth, 3.0);
    }

    #[test]
    fn test_every_style_setter_marks_dirty() {
        let mut material = material();
        let setters: [fn(&mut LineMaterial); 9] = [
            |m| {
                m.set_resolution(Vec2::new(800.0, 600.0));
            },
            |m| {
                m.set_linewidth(2.0);
            },
            |m| {
                m.set_dashed(true);
            },
            |m| {
                m.set_dash_scale(2.0);
            },
            |m| {
                m.set_dash_size(2.0);
            },
            |m| {
                m.set_gap_size(2.0);
            },
            |m| {
                m.set_dash_offset(2.0);
            },
            |m| {
                m.set_color(Vec3::X);
            },
            |m| {
                m.set_opacity(0.5);
            },
        ];
        for setter in setters {
            material.build().unwrap();
            setter(&mut material);
            assert!(material.needs_update());
        }
        assert_eq!(material.resolution(), Vec2::new(800.0, 600.0));
        assert!(material.dashed());

        material.build().unwrap();
        material.set_style(LineStyle::default());
        assert!(material.needs_update());
        assert_eq!(material.resolution(), Vec2::ONE);
        assert!(!material.dashed());
    }

    #[test]
    fn test_chunks_expand_in_both_stages() {
        let mut material = material();
        material.set_chunk("vertexStart", "A");
        material.set_chunk("color", "B");
        let program = material.build().unwrap();
        assert_eq!(program.vertex_source, "v[A]");
        assert_eq!(program.fragment_source, "f[B]");
    }

    #[test]
    fn test_unknown_chunk_is_a_silent_no_op() {
        let mut material = material();
        let before = material.build().unwrap().clone();

        material.set_chunk("cVertexStart", "X");
        material.unset_chunk("bogus");
        assert!(!material.needs_update());

        let after = material.build().unwrap();
        assert_eq!(after.vertex_source, before.vertex_source);
        assert_eq!(after.fragment_source, before.fragment_source);
    }

    #[test]
    fn test_clear_chunks_marks_dirty() {
        let mut material = material();
        material.set_named_chunk(ChunkName::VertexStart, "A");
        material.build().unwrap();
        material.clear_chunks();
        assert!(material.needs_update());
        assert_eq!(material.build().unwrap().vertex_source, "v[]");
    }

    #[test]
    fn test_extra_uniforms_override_style() {
        let mut material = material();
        let mut extra = BTreeMap::new();
        extra.insert("time".to_string(), UniformValue::Float(1.5));
        extra.insert("opacity".to_string(), UniformValue::Float(0.1));
        material.set_uniforms(extra);

        let program = material.build().unwrap();
        assert_eq!(program.uniforms["time"], UniformValue::Float(1.5));
        assert_eq!(program.uniforms["opacity"], UniformValue::Float(0.1));
        assert_eq!(program.line_uniforms.color[3], 0.1);
        assert_eq!(program.extra_block.members, ["time"]);
        assert_eq!(program.extra_block.data.slots[1][0], 1.5_f32.to_bits());

        material.unset_uniforms();
        let program = material.build().unwrap();
        assert!(!program.uniforms.contains_key("time"));
        assert_eq!(program.uniforms["opacity"], UniformValue::Float(1.0));
        assert_eq!(program.line_uniforms.color[3], 1.0);
        assert!(program.extra_block.members.is_empty());
    }

    #[test]
    fn test_mistyped_builtin_uniform_is_ignored() {
        let mut material = material();
        material.set_uniforms(BTreeMap::from([(
            "linewidth".to_string(),
            UniformValue::Vec2(Vec2::ONE),
        )]));
        let program = material.build().unwrap();
        assert_eq!(program.uniforms["linewidth"], UniformValue::Float(1.0));
        assert_eq!(program.line_uniforms.linewidth, 1.0);
        assert!(program.extra_block.members.is_empty());
    }

    #[test]
    fn test_cycle_fails_build_and_keeps_dirty() {
        let mut material = material();
        material.set_chunk("vertexStart", "%- vertexEnd -%");
        material.set_chunk("vertexEnd", "%- vertexStart -%");
        assert!(material.build().is_err());
        assert!(material.needs_update());

        material.unset_chunk("vertexEnd");
        assert_eq!(material.build().unwrap().vertex_source, "v[]");
    }

    #[test]
    fn test_failed_rebuild_keeps_last_program() {
        let mut material = material();
        material.set_chunk("vertexStart", "A");
        material.build().unwrap();

        material.set_chunk("vertexStart", "%- vertexEnd -%");
        material.set_chunk("vertexEnd", "%- vertexStart -%");
        assert!(material.build().is_err());

        let program = material.program().expect("last good program");
        assert_eq!(program.vertex_source, "v[A]");
        assert_eq!(program.generation, 1);
        assert!(material.needs_update());

        material.unset_chunk("vertexEnd");
        assert_eq!(material.build().unwrap().generation, 2);
    }

    #[test]
    fn test_default_templates_expand_cleanly() {
        let mut material = LineMaterial::default();
        let program = material.build().unwrap();
        assert!(!program.vertex_source.contains("%- "));
        assert!(!program.fragment_source.contains("%- "));
        assert!(program.vertex_source.contains("fn vs_main"));
        assert!(program.fragment_source.contains("fn fs_main"));
    }

    #[test]
    fn test_default_templates_have_every_injection_point() {
        let combined = format!("{DEFAULT_VERTEX_TEMPLATE}{DEFAULT_FRAGMENT_TEMPLATE}");
        for name in ChunkName::ALL {
            assert!(combined.contains(&name.marker()), "missing marker for {name}");
        }
    }
}
