//! Line style configuration and its GPU uniform layout.

use std::collections::BTreeMap;

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Appearance parameters for constant pixel-width lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineStyle {
    /// Viewport size in pixels.
    pub resolution: Vec2,
    /// Line width in pixels.
    pub linewidth: f32,
    /// Whether the dash pattern is applied.
    pub dashed: bool,
    /// Scale applied to arc distances before dashing.
    pub dash_scale: f32,
    /// Length of a visible dash.
    pub dash_size: f32,
    /// Length of a gap between dashes.
    pub gap_size: f32,
    /// Offset of the dash pattern along the line.
    pub dash_offset: f32,
    /// Base color (linear rgb).
    pub color: Vec3,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            resolution: Vec2::ONE,
            linewidth: 1.0,
            dashed: false,
            dash_scale: 1.0,
            dash_size: 1.0,
            gap_size: 1.0,
            dash_offset: 0.0,
            color: Vec3::ONE,
            opacity: 1.0,
        }
    }
}

impl LineStyle {
    /// Parses a style preset from JSON. Missing fields take default values.
    pub fn from_json(json: &str) -> thickline_core::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes this style as pretty-printed JSON.
    pub fn to_json(&self) -> thickline_core::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the built-in uniform bindings for this style, keyed by the
    /// names used in the default shader templates.
    #[must_use]
    pub fn uniform_bindings(&self) -> BTreeMap<String, UniformValue> {
        [
            ("linewidth", UniformValue::Float(self.linewidth)),
            ("resolution", UniformValue::Vec2(self.resolution)),
            ("dashed", UniformValue::Bool(self.dashed)),
            ("dash_scale", UniformValue::Float(self.dash_scale)),
            ("dash_size", UniformValue::Float(self.dash_size)),
            ("gap_size", UniformValue::Float(self.gap_size)),
            ("dash_offset", UniformValue::Float(self.dash_offset)),
            ("diffuse", UniformValue::Vec3(self.color)),
            ("opacity", UniformValue::Float(self.opacity)),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
    }
}

/// A value bound to a named shader uniform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl UniformValue {
    /// WGSL type of this value inside [`ExtraUniforms`]. Booleans are
    /// stored as `u32` since WGSL uniforms cannot hold `bool`.
    #[must_use]
    pub fn wgsl_type(&self) -> &'static str {
        match self {
            UniformValue::Bool(_) | UniformValue::UInt(_) => "u32",
            UniformValue::Int(_) => "i32",
            UniformValue::Float(_) => "f32",
            UniformValue::Vec2(_) => "vec2<f32>",
            UniformValue::Vec3(_) => "vec3<f32>",
            UniformValue::Vec4(_) => "vec4<f32>",
            UniformValue::Mat4(_) => "mat4x4<f32>",
        }
    }

    /// Number of 16-byte slots this value occupies.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        match self {
            UniformValue::Mat4(_) => 4,
            _ => 1,
        }
    }

    fn write_slots(&self, slots: &mut [[u32; 4]]) {
        fn write_floats(slot: &mut [u32; 4], values: &[f32]) {
            for (word, value) in slot.iter_mut().zip(values) {
                *word = value.to_bits();
            }
        }

        match *self {
            UniformValue::Bool(v) => slots[0][0] = u32::from(v),
            UniformValue::Int(v) => slots[0][0] = u32::from_ne_bytes(v.to_ne_bytes()),
            UniformValue::UInt(v) => slots[0][0] = v,
            UniformValue::Float(v) => slots[0][0] = v.to_bits(),
            UniformValue::Vec2(v) => write_floats(&mut slots[0], &v.to_array()),
            UniformValue::Vec3(v) => write_floats(&mut slots[0], &v.to_array()),
            UniformValue::Vec4(v) => write_floats(&mut slots[0], &v.to_array()),
            UniformValue::Mat4(m) => {
                for (slot, column) in slots.iter_mut().zip(m.to_cols_array_2d()) {
                    write_floats(slot, &column);
                }
            }
        }
    }
}

/// Uniforms for line rendering.
/// Layout must match WGSL `LineUniforms` exactly (48 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineUniforms {
    /// Base color (rgb) and opacity (a).
    pub color: [f32; 4],
    /// Viewport size in pixels.
    pub resolution: [f32; 2],
    /// Line width in pixels.
    pub linewidth: f32,
    /// Arc distance scale.
    pub dash_scale: f32,
    /// Dash length.
    pub dash_size: f32,
    /// Gap length.
    pub gap_size: f32,
    /// Dash offset.
    pub dash_offset: f32,
    /// 1 when dashing is enabled.
    pub dashed: u32,
}

impl From<&LineStyle> for LineUniforms {
    fn from(style: &LineStyle) -> Self {
        Self {
            color: style.color.extend(style.opacity).to_array(),
            resolution: style.resolution.to_array(),
            linewidth: style.linewidth,
            dash_scale: style.dash_scale,
            dash_size: style.dash_size,
            gap_size: style.gap_size,
            dash_offset: style.dash_offset,
            dashed: u32::from(style.dashed),
        }
    }
}

impl Default for LineUniforms {
    fn default() -> Self {
        Self::from(&LineStyle::default())
    }
}

impl LineUniforms {
    /// Overwrites the field bound to the built-in uniform `name`.
    ///
    /// Returns false, leaving the block unchanged, if `name` is not a
    /// built-in binding or `value` has the wrong type for it.
    pub fn apply_binding(&mut self, name: &str, value: UniformValue) -> bool {
        match (name, value) {
            ("linewidth", UniformValue::Float(v)) => self.linewidth = v,
            ("resolution", UniformValue::Vec2(v)) => self.resolution = v.to_array(),
            ("dashed", UniformValue::Bool(v)) => self.dashed = u32::from(v),
            ("dash_scale", UniformValue::Float(v)) => self.dash_scale = v,
            ("dash_size", UniformValue::Float(v)) => self.dash_size = v,
            ("gap_size", UniformValue::Float(v)) => self.gap_size = v,
            ("dash_offset", UniformValue::Float(v)) => self.dash_offset = v,
            ("diffuse", UniformValue::Vec3(v)) => self.color[..3].copy_from_slice(&v.to_array()),
            ("opacity", UniformValue::Float(v)) => self.color[3] = v,
            _ => return false,
        }
        true
    }
}

/// Number of 16-byte slots in [`ExtraUniforms`], including the count slot.
pub const EXTRA_UNIFORM_SLOTS: usize = 16;

/// Raw contents of the custom uniform block at binding 3.
///
/// Slot 0 holds the number of packed bindings. Each binding starts on its
/// own slot, matching the `@align(16)` members of the generated WGSL struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ExtraUniforms {
    pub slots: [[u32; 4]; EXTRA_UNIFORM_SLOTS],
}

impl Default for ExtraUniforms {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

/// Custom uniform bindings packed for the GPU, with the WGSL that reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraUniformBlock {
    /// Bytes uploaded to binding 3.
    pub data: ExtraUniforms,
    /// WGSL struct and binding declaration. Chunks read `extra.<name>`.
    pub declaration: String,
    /// Packed binding names, in slot order.
    pub members: Vec<String>,
}

impl Default for ExtraUniformBlock {
    fn default() -> Self {
        Self::pack(std::iter::empty())
    }
}

impl ExtraUniformBlock {
    /// Packs bindings in iteration order.
    ///
    /// Names that are not valid WGSL identifiers and bindings that no
    /// longer fit are skipped with a warning.
    pub fn pack<'a>(bindings: impl IntoIterator<Item = (&'a str, UniformValue)>) -> Self {
        let mut data = ExtraUniforms::default();
        let mut members = Vec::new();
        let mut declaration = String::from("struct ExtraUniforms {\n    @align(16) count: u32,\n");
        let mut next_slot = 1;

        for (name, value) in bindings {
            if !is_wgsl_identifier(name) || name == "count" {
                log::warn!("extra uniform '{name}' is not a usable WGSL member name; skipped");
                continue;
            }
            let end = next_slot + value.slot_count();
            if end > EXTRA_UNIFORM_SLOTS {
                log::warn!("extra uniform '{name}' does not fit in the extra uniform block; skipped");
                continue;
            }
            value.write_slots(&mut data.slots[next_slot..end]);
            declaration.push_str(&format!("    @align(16) {name}: {},\n", value.wgsl_type()));
            members.push(name.to_string());
            next_slot = end;
        }

        data.slots[0][0] = members.len() as u32;
        declaration.push_str("}\n\n@group(0) @binding(3) var<uniform> extra: ExtraUniforms;\n");
        Self {
            data,
            declaration,
            members,
        }
    }
}

fn is_wgsl_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name != "_"
        && !name.starts_with("__")
}
