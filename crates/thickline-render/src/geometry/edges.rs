//! Edge extraction from triangle meshes.
//!
//! - [`wireframe_edges`] returns every unique edge.
//! - [`feature_edges`] keeps boundary edges and edges whose adjacent faces
//!   meet at more than a threshold angle.

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use thickline_core::{Result, ThicklineError};

fn check_faces(num_vertices: usize, faces: &[[u32; 3]]) -> Result<()> {
    for &index in faces.iter().flatten() {
        if index as usize >= num_vertices {
            return Err(ThicklineError::InvalidIndex {
                index,
                len: num_vertices,
            });
        }
    }
    Ok(())
}

fn sorted_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 {
        (v0, v1)
    } else {
        (v1, v0)
    }
}

/// Returns the unique edges of a triangle mesh as sorted vertex pairs.
pub fn wireframe_edges(num_vertices: usize, faces: &[[u32; 3]]) -> Result<Vec<[u32; 2]>> {
    check_faces(num_vertices, faces)?;

    let mut edge_set: HashSet<(u32, u32)> = HashSet::new();
    for face in faces {
        for i in 0..3 {
            edge_set.insert(sorted_edge(face[i], face[(i + 1) % 3]));
        }
    }

    let mut edges: Vec<[u32; 2]> = edge_set.into_iter().map(|(a, b)| [a, b]).collect();
    edges.sort_unstable(); // Sort for deterministic ordering
    Ok(edges)
}

/// Returns boundary edges plus edges whose two adjacent face normals differ
/// by more than `threshold_degrees`.
///
/// Degenerate (zero-area) faces are skipped.
pub fn feature_edges(
    vertices: &[Vec3],
    faces: &[[u32; 3]],
    threshold_degrees: f32,
) -> Result<Vec<[u32; 2]>> {
    check_faces(vertices.len(), faces)?;

    let threshold_dot = threshold_degrees.to_radians().cos();

    // Edges seen by exactly one face so far, with that face's normal.
    let mut open: HashMap<(u32, u32), Vec3> = HashMap::new();
    let mut edges: Vec<[u32; 2]> = Vec::new();

    for face in faces {
        let [a, b, c] = face.map(|i| vertices[i as usize]);
        let normal = (b - a).cross(c - a);
        if normal.length_squared() == 0.0 {
            continue;
        }
        let normal = normal.normalize();

        for i in 0..3 {
            let key = sorted_edge(face[i], face[(i + 1) % 3]);
            if let Some(other) = open.remove(&key) {
                if normal.dot(other) <= threshold_dot {
                    edges.push([key.0, key.1]);
                }
            } else {
                open.insert(key, normal);
            }
        }
    }

    // Whatever never found a partner is a boundary edge.
    edges.extend(open.into_keys().map(|(a, b)| [a, b]));
    edges.sort_unstable();
    Ok(edges)
}
