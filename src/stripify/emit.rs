//! Turning strips of faces into strip index streams

use crate::RESTART_INDEX;
use crate::topology::Face;

/// Returns the first face of a strip with its vertices reordered for emission.
///
/// The vertex not shared with the second face goes first, and if there is a third face, the vertex shared with
/// it goes last so that the strip can continue from the last two indices.
pub(crate) fn first_face_in_strip_order(strip: &[Face]) -> Face {
    let mut first = strip[0];

    let Some(second) = strip.get(1) else {
        return first;
    };

    match first.unique_vertex_against(second) {
        Some(v) if v == first.v1 => std::mem::swap(&mut first.v0, &mut first.v1),
        Some(v) if v == first.v2 => std::mem::swap(&mut first.v0, &mut first.v2),
        _ => {}
    }

    if let Some(third) = strip.get(2) {
        if second.is_degenerate() {
            // bridge right after the first face pivots around its middle vertex
            if first.v1 == second.v1 {
                std::mem::swap(&mut first.v1, &mut first.v2);
            }
        } else if third.contains(first.v1) && !third.contains(first.v2) {
            // the strip pivots around the vertex shared by all three faces
            std::mem::swap(&mut first.v1, &mut first.v2);
        }
    }

    first
}

/// Writes strips as strip indices.
///
/// Stitched strips form one continuous strip joined with degenerate triangles; otherwise strips are separated by
/// [RESTART_INDEX]. Returns the indices and the number of separate strips in them.
pub(crate) fn create_strips<S>(strips: &[S], stitch_strips: bool) -> (Vec<u32>, usize)
where
    S: AsRef<[Face]>,
{
    let mut destination = Vec::new();
    let mut separate_strips = 0;

    // parity is inferred from the number of emitted indices, restart indices don't count
    let mut restart_count = 0;

    for (i, strip) in strips.iter().enumerate() {
        let strip = strip.as_ref();

        if strip.is_empty() {
            continue;
        }

        let first = first_face_in_strip_order(strip);
        let first_is_cw = strip[0].is_cw(first.v0, first.v1);

        if destination.is_empty() || !stitch_strips {
            // flip the strip if the first triangle would come out with the wrong winding
            if !first_is_cw {
                destination.push(first.v0);
            }
        } else {
            // double tap the first index of the new strip
            destination.push(first.v0);

            let next_is_cw = (destination.len() - restart_count) % 2 == 0;

            if next_is_cw != first_is_cw {
                destination.push(first.v0);
            }
        }

        destination.extend_from_slice(&first.vertices());
        let mut last = first;

        for face in &strip[1..] {
            match face.unique_vertex_against(&last) {
                Some(unique) => {
                    destination.push(unique);
                    last = Face::new(last.v1, last.v2, unique);
                }
                None => {
                    // degenerate bridge
                    destination.push(face.v2);
                    last = *face;
                }
            }
        }

        if stitch_strips {
            // double tap the last index towards the next strip
            if i != strips.len() - 1 {
                destination.push(last.v2);
            }
        } else {
            destination.push(RESTART_INDEX);
            restart_count += 1;
            separate_strips += 1;
        }
    }

    if stitch_strips && !destination.is_empty() {
        separate_strips = 1;
    }

    (destination, separate_strips)
}
