//! Vertex buffer reordering to follow the index order

use crate::error::{Result, StripifyError};
use crate::tristrip::PrimitiveGroup;
use crate::{INVALID_INDEX, RESTART_INDEX};

/// Builds a table mapping each referenced vertex to the order of its first use.
///
/// Returns the table (with [INVALID_INDEX] for unused vertices) and the number of used vertices.
fn generate_remap<'a, I>(indices: I, vertex_count: usize) -> Result<(Vec<u32>, usize)>
where
    I: IntoIterator<Item = &'a u32>,
{
    let mut remap = vec![INVALID_INDEX; vertex_count];
    let mut next_vertex = 0;

    for index in indices {
        if *index == RESTART_INDEX {
            continue;
        }

        let entry = remap.get_mut(*index as usize).ok_or(StripifyError::VertexBufferTooSmall {
            index: *index,
            vertex_count,
        })?;

        if *entry == INVALID_INDEX {
            *entry = next_vertex as u32;
            next_vertex += 1;
        }
    }

    Ok((remap, next_vertex))
}

fn remap_index(index: u32, remap: &[u32]) -> u32 {
    if index == RESTART_INDEX {
        index
    } else {
        remap[index as usize]
    }
}

/// Renumbers vertices in the order the groups first use them.
///
/// The groups are walked in order as if they were one index buffer, so a vertex shared between groups gets the
/// same new index in all of them. Restart indices are left alone.
///
/// # Arguments
///
/// * `vertex_count`: number of vertices in the vertex buffer the groups index
pub fn remap_indices(groups: &[PrimitiveGroup], vertex_count: usize) -> Result<Vec<PrimitiveGroup>> {
    let (remap, _) = generate_remap(groups.iter().flat_map(PrimitiveGroup::trimmed_indices), vertex_count)?;

    Ok(groups
        .iter()
        .map(|group| {
            let indices = group.trimmed_indices().iter().map(|i| remap_index(*i, &remap)).collect();

            PrimitiveGroup::new(group.primitive_type, indices)
        })
        .collect())
}

/// Reorders a vertex buffer so that vertices are stored in the order `indices` first references them, and rewrites
/// `indices` in place to match.
///
/// Returns the number of referenced vertices; those come first in `vertices`, the unreferenced ones follow in their
/// original order.
///
/// # Arguments
///
/// * `vertices`: vertex buffer made of consecutive `vertex_size` long vertices (e.g. 3 floats per position)
pub fn remap_arrays<T>(vertices: &mut [T], vertex_size: usize, indices: &mut [u32]) -> Result<usize>
where
    T: Copy,
{
    if vertex_size == 0 || vertices.len() % vertex_size != 0 {
        return Err(StripifyError::InvalidVertexSize {
            len: vertices.len(),
            vertex_size,
        });
    }

    let vertex_count = vertices.len() / vertex_size;

    let (mut remap, used) = generate_remap(indices.iter(), vertex_count)?;

    // unused vertices keep their relative order after the used ones
    let mut next_vertex = used as u32;

    for entry in remap.iter_mut().filter(|e| **e == INVALID_INDEX) {
        *entry = next_vertex;
        next_vertex += 1;
    }

    let source = vertices.to_vec();

    for (src, dst) in remap.iter().enumerate() {
        let dst = *dst as usize;

        vertices[dst * vertex_size..(dst + 1) * vertex_size]
            .copy_from_slice(&source[src * vertex_size..(src + 1) * vertex_size]);
    }

    for index in indices.iter_mut() {
        *index = remap_index(*index, &remap);
    }

    Ok(used)
}
