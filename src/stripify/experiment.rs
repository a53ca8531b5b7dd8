//! Running competing strip experiments and committing the most promising one

use std::collections::HashSet;

use log::{debug, trace};

use crate::hash::BuildNoopHasher;
use crate::stripify::reset::ResetCursor;
use crate::stripify::strip::{FaceMarks, Strip, StripStart};
use crate::topology::Topology;

/// Average number of real (non-bridge) faces per strip.
pub(crate) fn average_strip_size(strips: &[Strip]) -> f32 {
    if strips.is_empty() {
        return 0.0;
    }

    let size: usize = strips.iter().map(Strip::real_len).sum();

    size as f32 / strips.len() as f32
}

/// Finds a face to continue from once `strip` is built.
///
/// Looks at the edges around the vertex the strip was seeded towards, for one whose faces are split between the
/// strip and an untouched face.
pub(crate) fn find_traversal(topology: &Topology, marks: &FaceMarks, strip: &Strip) -> Option<StripStart> {
    let start_edge = topology.edge(strip.start.edge);
    let v = if strip.start.to_v1 {
        start_edge.v1
    } else {
        start_edge.v0
    };

    for edge_id in topology.vertex_edges(v) {
        let edge = topology.edge(edge_id);

        let (Some(face_a), Some(face_b)) = (edge.face_a, edge.face_b) else {
            continue;
        };

        let untouched = if !marks.is_in_strip(face_a, strip.key) && !marks.is_marked(face_b, strip.key) {
            face_b
        } else if !marks.is_in_strip(face_b, strip.key) && !marks.is_marked(face_a, strip.key) {
            face_a
        } else {
            continue;
        };

        let to_v1 = if strip.shares_edge(topology, marks, untouched) {
            edge.v0 == v
        } else {
            edge.v1 == v
        };

        return Some(StripStart {
            face: untouched,
            edge: edge_id,
            to_v1,
        });
    }

    None
}

/// Hands out strip and experiment ids; ids are never reused within one stripification.
#[derive(Default)]
struct IdAllocator {
    strip: u32,
    experiment: u32,
}

impl IdAllocator {
    fn next_strip(&mut self) -> u32 {
        self.strip += 1;
        self.strip - 1
    }

    fn next_experiment(&mut self) -> u32 {
        self.experiment += 1;
        self.experiment - 1
    }
}

/// Builds the strips of every face in the mesh.
///
/// Each round picks up to `num_samples` reset faces and seeds six experiments on each (every edge, both
/// directions). An experiment keeps chaining strips from where the previous one ended, and the experiment with
/// the longest average strip wins and gets committed. Rounds repeat until every face is committed.
pub(crate) fn find_all_strips(
    topology: &Topology,
    marks: &mut FaceMarks,
    cursor: &mut ResetCursor,
    num_samples: usize,
) -> Vec<Strip> {
    let mut all_strips = Vec::new();
    let mut ids = IdAllocator::default();

    let mut done = false;
    let mut round = 0;

    while !done {
        round += 1;

        // phase 1: seed the experiments
        let mut experiments: Vec<Vec<Strip>> = Vec::with_capacity(num_samples * 6);
        let mut reset_points: HashSet<usize, BuildNoopHasher> = HashSet::default();

        for _ in 0..num_samples {
            let Some(face) = cursor.find_good_reset_point(topology, marks) else {
                done = true;
                break;
            };

            // already tried in this round
            if !reset_points.insert(face) {
                continue;
            }

            for (a, b) in topology.faces[face].edges() {
                let Some(edge) = topology.find_edge(a, b) else {
                    continue;
                };

                for to_v1 in [true, false] {
                    let start = StripStart { face, edge, to_v1 };

                    experiments.push(vec![Strip::new(start, ids.next_strip(), Some(ids.next_experiment()))]);
                }
            }
        }

        // phase 2: grow each experiment as far as it gets
        for experiment in experiments.iter_mut() {
            experiment[0].build(topology, marks);

            let experiment_id = experiment[0].key.experiment;

            while let Some(start) = find_traversal(topology, marks, &experiment[experiment.len() - 1]) {
                let mut strip = Strip::new(start, ids.next_strip(), experiment_id);
                strip.build(topology, marks);

                experiment.push(strip);
            }
        }

        // phase 3: pick the most promising one, earlier experiments win ties
        let mut best_index = None;
        let mut best_value = 0.0;

        for (i, experiment) in experiments.iter().enumerate() {
            let value = average_strip_size(experiment);

            trace!(
                "round {} experiment {}: {} strips, average size {}",
                round,
                i,
                experiment.len(),
                value
            );

            if value > best_value {
                best_value = value;
                best_index = Some(i);
            }
        }

        // phase 4: commit it
        if let Some(best) = best_index.and_then(|i| experiments.into_iter().nth(i)) {
            debug!(
                "round {}: committing {} strips with average size {}",
                round,
                best.len(),
                best_value
            );

            commit_strips(&mut all_strips, best, marks);
        }
    }

    all_strips
}

/// Makes the strips permanent and appends them to `all_strips`.
pub(crate) fn commit_strips(all_strips: &mut Vec<Strip>, strips: Vec<Strip>, marks: &mut FaceMarks) {
    for mut strip in strips {
        strip.commit(marks);
        all_strips.push(strip);
    }
}
