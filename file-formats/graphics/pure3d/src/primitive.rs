//! Expansion of primitive group index lists into triangle lists

use crate::chunks::PrimitiveType;
use crate::error::{Pure3dError, Result};

/// Append the triangles described by `indices` to `out`, adding
/// `vertex_offset` to every emitted index.
///
/// Returns the number of indices appended. Line topologies and unknown
/// topologies produce no triangles. If an offset index does not fit in a
/// `u32` the call fails and `out` is left as it was.
pub fn expand_indices(
    primitive_type: PrimitiveType,
    indices: &[u32],
    vertex_offset: u32,
    out: &mut Vec<u32>,
) -> Result<usize> {
    let before = out.len();
    match primitive_type {
        PrimitiveType::TriangleList => out.extend_from_slice(indices),
        PrimitiveType::TriangleStrip => expand_strip(indices, out),
        PrimitiveType::LineList | PrimitiveType::LineStrip | PrimitiveType::Other(_) => {}
    }

    for index in &mut out[before..] {
        match index.checked_add(vertex_offset) {
            Some(offset) => *index = offset,
            None => {
                let local = *index;
                out.truncate(before);
                return Err(Pure3dError::InvalidReference {
                    context: format!("index buffer at vertex offset {vertex_offset}"),
                    index: local as usize,
                    len: (u32::MAX - vertex_offset) as usize + 1,
                });
            }
        }
    }

    Ok(out.len() - before)
}

/// Walk a triangle strip, flipping the winding of every odd triangle and
/// dropping degenerate ones
fn expand_strip(indices: &[u32], out: &mut Vec<u32>) {
    for (k, window) in indices.windows(3).enumerate() {
        let (a, b, c) = if k % 2 == 0 {
            (window[0], window[1], window[2])
        } else {
            (window[0], window[2], window[1])
        };

        if a == b || b == c || c == a {
            continue;
        }

        out.extend([a, b, c]);
    }
}

/// Whether a topology produces triangles
pub fn is_triangle_topology(primitive_type: PrimitiveType) -> bool {
    matches!(
        primitive_type,
        PrimitiveType::TriangleList | PrimitiveType::TriangleStrip
    )
}
