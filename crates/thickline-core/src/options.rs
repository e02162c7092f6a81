//! Configuration options for picking.

use serde::{Deserialize, Serialize};

/// Parameters controlling how generous line picking is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickParams {
    /// Extra pixels added to the rendered line width when hit testing.
    pub line_threshold: f32,
}

impl PickParams {
    /// Creates parameters with the given line threshold in pixels.
    pub fn with_line_threshold(line_threshold: f32) -> Self {
        Self { line_threshold }
    }

    /// Parses parameters from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for PickParams {
    fn default() -> Self {
        Self {
            line_threshold: 0.0,
        }
    }
}
