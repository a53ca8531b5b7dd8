//! Cutting strips to cache sized pieces and ordering them for vertex cache reuse

use log::debug;

use crate::stripify::emit::first_face_in_strip_order;
use crate::stripify::strip::{Strip, StripFace};
use crate::topology::{Face, Topology};
use crate::vertex::cache::VertexCache;

/// Cuts a strip into chunks of `threshold` real faces.
///
/// A remainder of less than four faces is appended to the last chunk instead of forming a tiny chunk of its own.
/// Bridge faces at the start of a chunk are dropped, the ones inside are kept.
fn split_strip(faces: &[StripFace], threshold: usize, chunks: &mut Vec<Vec<StripFace>>) {
    let actual_size = faces.iter().filter(|f| !f.is_degenerate()).count();

    if actual_size <= threshold {
        chunks.push(faces.to_vec());
        return;
    }

    let num_times = actual_size / threshold;
    let mut num_leftover = actual_size % threshold;

    let mut counter = 0;

    for j in 0..num_times {
        let mut chunk = Vec::with_capacity(threshold);
        let mut end = counter + threshold;
        let mut first_time = true;

        while counter < end {
            let face = faces[counter];
            counter += 1;

            if face.is_degenerate() {
                // doesn't count towards the chunk size
                end += 1;

                if !first_time {
                    chunk.push(face);
                }
            } else {
                chunk.push(face);
                first_time = false;
            }
        }

        if j == num_times - 1 && num_leftover > 0 && num_leftover < 4 {
            let mut taken = 0;

            while taken < num_leftover {
                let face = faces[counter];
                counter += 1;

                if !face.is_degenerate() {
                    taken += 1;
                }

                chunk.push(face);
            }

            num_leftover = 0;
        }

        chunks.push(chunk);
    }

    if num_leftover > 0 {
        let mut chunk = Vec::with_capacity(num_leftover);
        let mut taken = 0;

        while taken < num_leftover {
            let face = faces[counter];
            counter += 1;

            if !face.is_degenerate() {
                taken += 1;
                chunk.push(face);
            } else if taken > 0 {
                chunk.push(face);
            }
        }

        chunks.push(chunk);
    }
}

/// Separates strips shorter than `min_strip_length` and orders their faces for the cache.
///
/// Each step appends the face with the most vertices already in the cache, earlier faces winning ties. Bridge
/// faces of the removed strips are discarded.
fn remove_small_strips(
    chunks: Vec<Vec<StripFace>>,
    min_strip_length: usize,
    cache_size: usize,
) -> (Vec<Vec<StripFace>>, Vec<Face>) {
    let mut big_strips = Vec::with_capacity(chunks.len());
    let mut small_faces = Vec::new();

    for chunk in chunks {
        if chunk.len() < min_strip_length {
            small_faces.extend(chunk.iter().filter(|f| !f.is_degenerate()).map(|f| f.face));
        } else {
            big_strips.push(chunk);
        }
    }

    let mut cache = VertexCache::new(cache_size);
    let mut visited = vec![false; small_faces.len()];
    let mut faces = Vec::with_capacity(small_faces.len());

    loop {
        let mut best = None;
        let mut best_hits = 0;

        for (i, face) in small_faces.iter().enumerate() {
            if visited[i] {
                continue;
            }

            let hits = cache.hits_face(face);

            if best.is_none() || hits > best_hits {
                best = Some(i);
                best_hits = hits;
            }
        }

        let Some(best) = best else {
            break;
        };

        visited[best] = true;
        cache.update_face(&small_faces[best]);
        faces.push(small_faces[best]);
    }

    (big_strips, faces)
}

fn strip_faces(strip: &[StripFace]) -> Vec<Face> {
    strip.iter().map(|f| f.face).collect()
}

fn hits_per_face(cache: &VertexCache, strip: &[StripFace]) -> f32 {
    let hits: usize = strip.iter().map(|f| cache.hits_face(&f.face)).sum();

    hits as f32 / strip.len() as f32
}

/// Orders strips so that each one reuses as many cached vertices of the previous ones as possible.
///
/// Starts with the least connected strip, then greedily picks the strip with the most cache hits per face. On a
/// tie, the strip whose first triangle has the winding the running strip parity expects is preferred, which saves
/// a degenerate triangle when stitching.
fn reorder_strips(mut strips: Vec<Vec<StripFace>>, topology: &Topology, cache_size: usize) -> Vec<Vec<Face>> {
    let mut ordered = Vec::with_capacity(strips.len());

    if strips.is_empty() {
        return ordered;
    }

    let mut first_index = 0;
    let mut min_cost = f32::MAX;

    for (i, strip) in strips.iter().enumerate() {
        let neighbors: usize = strip.iter().map(|f| topology.neighbor_count(&f.face, f.id)).sum();
        let cost = neighbors as f32 / strip.len() as f32;

        if cost < min_cost {
            min_cost = cost;
            first_index = i;
        }
    }

    let mut cache = VertexCache::new(cache_size);

    // placed strips are left empty
    let mut place = |index: usize, strips: &mut [Vec<StripFace>], cache: &mut VertexCache| {
        let strip = std::mem::take(&mut strips[index]);

        for face in &strip {
            cache.update_face(&face.face);
        }

        let odd = strip.len() % 2 == 1;
        ordered.push(strip_faces(&strip));
        odd
    };

    let mut wants_cw = !place(first_index, &mut strips, &mut cache);

    loop {
        let mut best = None;
        let mut best_hits = 0.0;

        for (i, strip) in strips.iter().enumerate() {
            if strip.is_empty() {
                continue;
            }

            let hits = hits_per_face(&cache, strip);

            if best.is_none() || hits > best_hits {
                best = Some(i);
                best_hits = hits;
            } else if hits == best_hits {
                let faces = strip_faces(strip);
                let first = first_face_in_strip_order(&faces);

                if faces[0].is_cw(first.v0, first.v1) == wants_cw {
                    best = Some(i);
                }
            }
        }

        let Some(best) = best else {
            break;
        };

        if place(best, &mut strips, &mut cache) {
            wants_cw = !wants_cw;
        }
    }

    ordered
}

/// Splits committed strips into cache friendly pieces, demotes the small ones to a face list and reorders the rest.
///
/// # Arguments
///
/// * `cache_size`: effective cache size, also the maximum number of real faces per strip
pub(crate) fn split_up_strips_and_optimize(
    strips: &[Strip],
    topology: &Topology,
    cache_size: usize,
    min_strip_length: usize,
) -> (Vec<Vec<Face>>, Vec<Face>) {
    assert!(cache_size > 0);

    let mut chunks = Vec::with_capacity(strips.len());

    for strip in strips {
        split_strip(&strip.faces, cache_size, &mut chunks);
    }

    let chunk_count = chunks.len();

    let (big_strips, faces) = remove_small_strips(chunks, min_strip_length, cache_size);

    debug!(
        "split {} strips into {} pieces, {} demoted to a list of {} faces",
        strips.len(),
        chunk_count,
        chunk_count - big_strips.len(),
        faces.len()
    );

    (reorder_strips(big_strips, topology, cache_size), faces)
}
