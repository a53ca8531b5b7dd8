//! Triangle list → cache friendly triangle strips
//!
//! Strips are grown over the face adjacency of the mesh. Every round seeds a batch of competing experiments at
//! different reset points, and the one producing the longest strips on average is committed. Once every face
//! belongs to a strip, strips are cut to the size of the vertex cache, small ones are demoted to a plain face list,
//! and the rest is reordered for cache reuse.

mod emit;
mod experiment;
mod optimize;
mod reset;
mod strip;

pub(crate) use emit::create_strips;

use crate::topology::{Face, Topology};

use self::experiment::find_all_strips;
use self::optimize::split_up_strips_and_optimize;
use self::reset::ResetCursor;
use self::strip::FaceMarks;

/// Number of cache entries assumed to be lost to the hardware's own inefficiencies.
pub const CACHE_INEFFICIENCY: usize = 6;

/// Reset points tried in every experiment round.
const NUM_SAMPLES: usize = 10;

/// Result of [stripify()].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stripified {
    /// Strips in rendering order, as faces. Zero area bridge faces may appear inside a strip.
    pub strips: Vec<Vec<Face>>,
    /// Faces of strips which were too short to keep, in cache friendly order.
    pub faces: Vec<Face>,
}

/// Splits a triangle list into triangle strips and a leftover face list.
///
/// Degenerate triangles of the input are skipped, and so are repeats of a triangle over the same three vertices in
/// any order. Every other triangle ends up in exactly one strip or in the face list, with its winding preserved:
/// a strip only crosses an edge into a face which runs that edge in the opposite direction.
///
/// # Arguments
///
/// * `cache_size`: size of the target vertex cache, strips are cut to `cache_size - CACHE_INEFFICIENCY` faces
/// * `min_strip_length`: strips with fewer faces are moved to the face list
/// * `max_index`: largest vertex index referenced by `indices`
pub fn stripify(indices: &[u32], cache_size: usize, min_strip_length: usize, max_index: u32) -> Stripified {
    assert!(indices.len() % 3 == 0);
    assert!(indices.iter().all(|i| *i <= max_index));

    let cache_size = cache_size.saturating_sub(CACHE_INEFFICIENCY).max(1);

    let topology = Topology::build(indices, max_index);
    let mut marks = FaceMarks::new(topology.faces.len());
    let mut cursor = ResetCursor::default();

    let all_strips = find_all_strips(&topology, &mut marks, &mut cursor, NUM_SAMPLES);

    let (strips, faces) = split_up_strips_and_optimize(&all_strips, &topology, cache_size, min_strip_length);

    Stripified { strips, faces }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sorted_faces(result: &Stripified) -> Vec<Face> {
        let mut faces: Vec<Face> = result
            .strips
            .iter()
            .flatten()
            .chain(result.faces.iter())
            .filter(|f| !f.is_degenerate())
            .copied()
            .collect();

        faces.sort_by_key(|f| f.vertices());
        faces
    }

    #[test]
    fn test_quad() {
        let result = stripify(&[0, 1, 2, 2, 1, 3], 16, 0, 3);

        assert_eq!(result.strips.len(), 1);
        assert_eq!(result.strips[0].len(), 2);
        assert!(result.faces.is_empty());
    }

    #[test]
    fn test_degenerate_input() {
        let result = stripify(&[5, 5, 6], 16, 0, 6);

        assert_eq!(result, Stripified::default());
    }

    #[test]
    fn test_min_strip_length() {
        let result = stripify(&[0, 1, 2, 2, 1, 3], 16, 5, 3);

        assert!(result.strips.is_empty());
        assert_eq!(result.faces.len(), 2);
    }

    #[test]
    fn test_long_strip_is_cut() {
        // a ribbon of 20 quads
        let mut indices = Vec::new();

        for x in 0..20u32 {
            indices.extend_from_slice(&[x, x + 21, x + 1, x + 1, x + 21, x + 22]);
        }

        let result = stripify(&indices, 16, 0, 41);

        // 40 faces with at most 10 faces per piece, plus up to 3 folded in
        assert!(result.strips.len() >= 3);
        assert!(result.strips.iter().all(|s| s.iter().filter(|f| !f.is_degenerate()).count() <= 13));

        let mut expected: Vec<Face> = indices.chunks_exact(3).map(|t| Face::new(t[0], t[1], t[2])).collect();
        expected.sort_by_key(|f| f.vertices());

        assert_eq!(sorted_faces(&result), expected);
    }

    #[test]
    fn test_any_order_duplicate_dropped() {
        let result = stripify(&[0, 1, 2, 2, 1, 3, 1, 2, 0], 16, 0, 3);

        assert_eq!(result.strips, vec![vec![Face::new(0, 1, 2), Face::new(2, 1, 3)]]);
        assert!(result.faces.is_empty());
    }

    #[test]
    fn test_misoriented_face_gets_own_strip() {
        let mut indices = Vec::new();

        for x in 0..6u32 {
            indices.extend_from_slice(&[x, x + 7, x + 1, x + 1, x + 7, x + 8]);
        }

        // runs along boundary edge 0-7 in the same direction as its neighbor
        indices.extend_from_slice(&[0, 7, 14]);

        let result = stripify(&indices, 16, 0, 14);

        let odd = Face::new(0, 7, 14);
        let holder = result.strips.iter().find(|s| s.contains(&odd)).unwrap();

        assert_eq!(holder.len(), 1);
        assert!(result.faces.is_empty());
    }

    #[test]
    fn test_tiny_cache() {
        let indices = [0, 1, 2, 2, 1, 3, 2, 3, 4];
        let result = stripify(&indices, 3, 0, 4);

        // every strip is cut down to a single face
        assert_eq!(result.strips.len(), 3);
        assert_eq!(sorted_faces(&result).len(), 3);
    }
}
