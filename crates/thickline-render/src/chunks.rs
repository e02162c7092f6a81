//! Named shader chunks and marker expansion.
//!
//! Shader templates contain markers of the form `%- name -%`. At build time
//! each marker is replaced by the override text registered for `name` (or
//! nothing), and the inserted text is expanded again, so chunks may
//! reference other chunks.
//!
//! Only the injection points listed in [`ChunkName`] can be overridden.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const MARKER_OPEN: &str = "%- ";
const MARKER_CLOSE: &str = " -%";

/// Errors produced while expanding chunk markers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A chunk (indirectly) contains a marker for itself.
    #[error("shader chunk cycle: {}", chain.join(" -> "))]
    ChunkCycle { chain: Vec<String> },
}

/// The fixed set of shader injection points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChunkName {
    /// Vertex stage, instance positions in model space.
    LocalSpace,
    /// Vertex stage, positions in camera space after near-plane trimming.
    ViewSpace,
    /// Vertex stage, positions in clip space.
    ProjectedSpace,
    /// Vertex module scope (declarations, helpers).
    VertexGlobal,
    /// Top of the vertex entry point.
    VertexStart,
    /// End of the vertex entry point.
    VertexEnd,
    /// Fragment stage, after the base color is computed.
    Color,
    /// Fragment module scope.
    FragmentGlobal,
    /// Top of the fragment entry point.
    FragmentStart,
    /// End of the fragment entry point.
    FragmentEnd,
}

impl ChunkName {
    /// Every injection point, in declaration order.
    pub const ALL: [ChunkName; 10] = [
        ChunkName::LocalSpace,
        ChunkName::ViewSpace,
        ChunkName::ProjectedSpace,
        ChunkName::VertexGlobal,
        ChunkName::VertexStart,
        ChunkName::VertexEnd,
        ChunkName::Color,
        ChunkName::FragmentGlobal,
        ChunkName::FragmentStart,
        ChunkName::FragmentEnd,
    ];

    /// The name used inside markers.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChunkName::LocalSpace => "localSpace",
            ChunkName::ViewSpace => "viewSpace",
            ChunkName::ProjectedSpace => "projectedSpace",
            ChunkName::VertexGlobal => "vertexGlobal",
            ChunkName::VertexStart => "vertexStart",
            ChunkName::VertexEnd => "vertexEnd",
            ChunkName::Color => "color",
            ChunkName::FragmentGlobal => "fragmentGlobal",
            ChunkName::FragmentStart => "fragmentStart",
            ChunkName::FragmentEnd => "fragmentEnd",
        }
    }

    /// The marker text for this chunk, e.g. `%- color -%`.
    #[must_use]
    pub fn marker(self) -> String {
        format!("{MARKER_OPEN}{}{MARKER_CLOSE}", self.as_str())
    }
}

impl fmt::Display for ChunkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChunkName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or(())
    }
}

/// Override text for the fixed set of injection points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkStore {
    chunks: BTreeMap<ChunkName, String>,
}

impl ChunkStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the override for `name`.
    ///
    /// Returns `false` without changing anything if `name` is not an
    /// injection point.
    pub fn set_chunk(&mut self, name: &str, text: impl Into<String>) -> bool {
        match name.parse::<ChunkName>() {
            Ok(chunk) => {
                self.set(chunk, text);
                true
            }
            Err(()) => false,
        }
    }

    /// Removes the override for `name`.
    ///
    /// Returns `false` without changing anything if `name` is not an
    /// injection point.
    pub fn unset_chunk(&mut self, name: &str) -> bool {
        match name.parse::<ChunkName>() {
            Ok(chunk) => {
                self.unset(chunk);
                true
            }
            Err(()) => false,
        }
    }

    /// Sets the override for a known injection point.
    pub fn set(&mut self, name: ChunkName, text: impl Into<String>) {
        self.chunks.insert(name, text.into());
    }

    /// Removes the override for a known injection point.
    pub fn unset(&mut self, name: ChunkName) {
        self.chunks.remove(&name);
    }

    /// Removes every override.
    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    /// Returns the override text for `name`, if any.
    #[must_use]
    pub fn get(&self, name: ChunkName) -> Option<&str> {
        self.chunks.get(&name).map(String::as_str)
    }

    /// Number of registered overrides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if no overrides are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Expands every marker in `source`.
    ///
    /// Markers naming unknown or unregistered chunks expand to nothing.
    pub fn expand(&self, source: &str) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(source.len());
        let mut active = Vec::new();
        self.expand_into(source, &mut active, &mut out)?;
        Ok(out)
    }

    fn expand_into(
        &self,
        source: &str,
        active: &mut Vec<ChunkName>,
        out: &mut String,
    ) -> Result<(), TemplateError> {
        let mut rest = source;
        while let Some((before, name, after)) = next_marker(rest) {
            out.push_str(before);
            rest = after;

            let Ok(chunk) = name.parse::<ChunkName>() else {
                continue;
            };
            let Some(text) = self.chunks.get(&chunk) else {
                continue;
            };

            if active.contains(&chunk) {
                let mut chain: Vec<String> = active.iter().map(ToString::to_string).collect();
                chain.push(chunk.to_string());
                return Err(TemplateError::ChunkCycle { chain });
            }

            active.push(chunk);
            self.expand_into(text, active, out)?;
            active.pop();
        }
        out.push_str(rest);
        Ok(())
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '/'
}

/// Finds the first well-formed marker, returning the text before it, the
/// marker name and the text after it.
fn next_marker(source: &str) -> Option<(&str, &str, &str)> {
    let mut search_from = 0;
    while let Some(offset) = source[search_from..].find(MARKER_OPEN) {
        let open = search_from + offset;
        let name_start = open + MARKER_OPEN.len();
        let name_len = source[name_start..]
            .find(|c: char| !is_name_char(c))
            .unwrap_or(source.len() - name_start);
        let name_end = name_start + name_len;

        if name_len > 0 && source[name_end..].starts_with(MARKER_CLOSE) {
            return Some((
                &source[..open],
                &source[name_start..name_end],
                &source[name_end + MARKER_CLOSE.len()..],
            ));
        }
        search_from = open + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_name_roundtrip() {
        for name in ChunkName::ALL {
            assert_eq!(name.as_str().parse::<ChunkName>(), Ok(name));
        }
        assert!("cVertexStart".parse::<ChunkName>().is_err());
        assert_eq!(ChunkName::Color.marker(), "%- color -%");
    }

    #[test]
    fn test_unknown_name_is_ignored() {
        let mut store = ChunkStore::new();
        assert!(!store.set_chunk("notAChunk", "x"));
        assert!(store.is_empty());
        assert!(!store.unset_chunk("notAChunk"));
    }

    #[test]
    fn test_expand_plain_text() {
        let store = ChunkStore::new();
        assert_eq!(store.expand("no markers here").unwrap(), "no markers here");
    }

    #[test]
    fn test_unregistered_markers_expand_to_nothing() {
        let store = ChunkStore::new();
        assert_eq!(
            store.expand("a%- vertexStart -%b%- unknown_thing -%c").unwrap(),
            "abc"
        );
    }

    #[test]
    fn test_nested_expansion() {
        let mut store = ChunkStore::new();
        store.set_chunk("vertexStart", "[%- vertexEnd -%]");
        store.set_chunk("vertexEnd", "T");
        assert_eq!(
            store.expand("fn main() { %- vertexStart -% }").unwrap(),
            "fn main() { [T] }"
        );
    }

    #[test]
    fn test_malformed_markers_are_kept() {
        let mut store = ChunkStore::new();
        store.set(ChunkName::Color, "X");
        let source = "%-color-% %- color-% %-  color -% %- -% 100%- color -%";
        assert_eq!(
            store.expand(source).unwrap(),
            "%-color-% %- color-% %-  color -% %- -% 100X"
        );
    }

    #[test]
    fn test_repeated_chunk_is_not_a_cycle() {
        let mut store = ChunkStore::new();
        store.set(ChunkName::VertexGlobal, "g");
        store.set(
            ChunkName::VertexStart,
            "%- vertexGlobal -%%- vertexGlobal -%",
        );
        assert_eq!(store.expand("%- vertexStart -%").unwrap(), "gg");
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut store = ChunkStore::new();
        store.set(ChunkName::VertexStart, "%- vertexEnd -%");
        store.set(ChunkName::VertexEnd, "%- vertexStart -%");
        let err = store.expand("%- vertexStart -%").unwrap_err();
        assert_eq!(
            err,
            TemplateError::ChunkCycle {
                chain: vec![
                    "vertexStart".to_string(),
                    "vertexEnd".to_string(),
                    "vertexStart".to_string()
                ]
            }
        );
    }

    #[test]
    fn test_self_reference_is_reported() {
        let mut store = ChunkStore::new();
        store.set(ChunkName::Color, "a%- color -%");
        assert!(store.expand("%- color -%").is_err());
    }

    #[test]
    fn test_unset_and_clear() {
        let mut store = ChunkStore::new();
        store.set_chunk("color", "c");
        store.set_chunk("fragmentEnd", "e");
        assert_eq!(store.len(), 2);
        assert!(store.unset_chunk("color"));
        assert_eq!(store.get(ChunkName::Color), None);
        store.clear();
        assert!(store.is_empty());
    }
}
