//! Vertex transform cache simulation and analysis

use crate::INVALID_INDEX;
use crate::topology::Face;
use crate::tristrip::{PrimitiveGroup, PrimitiveType};

/// Fixed capacity FIFO of vertex indices modelling a post-transform vertex cache.
///
/// Membership is a linear scan; the capacity is expected to be small (8-24 entries).
#[derive(Clone, Debug)]
pub struct VertexCache {
    entries: Vec<u32>,
}

impl VertexCache {
    pub fn new(size: usize) -> Self {
        assert!(size > 0);

        Self {
            entries: vec![INVALID_INDEX; size],
        }
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn in_cache(&self, entry: u32) -> bool {
        self.entries.contains(&entry)
    }

    /// Pushes `entry` to the front, evicting the oldest entry.
    ///
    /// Returns the evicted entry, or `None` if that slot was still empty.
    pub fn add_entry(&mut self, entry: u32) -> Option<u32> {
        let removed = self.entries[self.entries.len() - 1];

        self.entries.rotate_right(1);
        self.entries[0] = entry;

        (removed != INVALID_INDEX).then_some(removed)
    }

    /// Adds `entry` unless it is already cached. Returns `true` on a hit.
    pub fn touch(&mut self, entry: u32) -> bool {
        let hit = self.in_cache(entry);

        if !hit {
            self.add_entry(entry);
        }

        hit
    }

    pub fn clear(&mut self) {
        self.entries.fill(INVALID_INDEX);
    }

    pub(crate) fn update_face(&mut self, face: &Face) {
        for v in face.vertices() {
            self.touch(v);
        }
    }

    pub(crate) fn hits_face(&self, face: &Face) -> usize {
        face.vertices().iter().filter(|v| self.in_cache(**v)).count()
    }
}

#[derive(Debug, Default)]
pub struct VertexCacheStatistics {
    pub vertices_transformed: u32,
    /// Transformed vertices / triangle count
    ///
    /// Best case 0.5, worst case 3.0, optimum depends on topology
    pub acmr: f32,
    /// Transformed vertices / vertex count
    ///
    /// Best case 1.0, worst case 6.0, optimum is 1.0 (each vertex is transformed once)
    pub atvr: f32,
}

/// Returns cache hit statistics of primitive groups using a simplified FIFO model.
///
/// Groups are submitted in order and share the cache, strips are walked index by index. Degenerate triangles
/// introduced by stitching are not counted as triangles.
///
/// Results may not match actual GPU performance.
pub fn analyze_vertex_cache(groups: &[PrimitiveGroup], vertex_count: usize, cache_size: usize) -> VertexCacheStatistics {
    assert!(cache_size >= 3);

    let mut result = VertexCacheStatistics::default();

    let mut cache_timestamps: Vec<u32> = vec![0; vertex_count];
    let mut timestamp = cache_size + 1;

    let mut triangle_count = 0;

    for group in groups {
        let indices = group.trimmed_indices();

        for index in indices {
            let index = *index as usize;

            // restart indices don't reference a vertex
            if index >= vertex_count {
                continue;
            }

            if timestamp - cache_timestamps[index] as usize > cache_size {
                cache_timestamps[index] = timestamp as u32;
                timestamp += 1;
                result.vertices_transformed += 1;
            }
        }

        triangle_count += match group.primitive_type {
            PrimitiveType::List => indices.len() / 3,
            PrimitiveType::Strip | PrimitiveType::Fan => group.triangles().len(),
        };
    }

    let unique_vertex_count = cache_timestamps.iter().filter(|t| **t > 0).count();

    result.acmr = if triangle_count == 0 {
        0.0
    } else {
        result.vertices_transformed as f32 / triangle_count as f32
    };
    result.atvr = if unique_vertex_count == 0 {
        0.0
    } else {
        result.vertices_transformed as f32 / unique_vertex_count as f32
    };

    result
}
