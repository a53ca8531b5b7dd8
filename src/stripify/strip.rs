//! Growing a single triangle strip across face adjacency

use log::warn;

use crate::topology::{EdgeId, Face, FaceId, Topology};

/// Seed of a strip: a face, one of its edges and the direction to walk that edge in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct StripStart {
    pub face: FaceId,
    pub edge: EdgeId,
    pub to_v1: bool,
}

/// A face inside a strip. Degenerate bridge faces are synthesized and have no id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct StripFace {
    pub id: Option<FaceId>,
    pub face: Face,
}

impl StripFace {
    pub fn real(id: FaceId, face: Face) -> Self {
        Self { id: Some(id), face }
    }

    pub fn bridge(face: Face) -> Self {
        debug_assert!(face.is_degenerate());

        Self { id: None, face }
    }

    pub fn is_degenerate(&self) -> bool {
        self.face.is_degenerate()
    }
}

/// Identifies whose marks a strip observes: a committed strip id, or a trial strip inside an experiment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct StripKey {
    pub strip: u32,
    pub experiment: Option<u32>,
}

#[derive(Clone, Copy, Debug, Default)]
struct FaceTag {
    committed: Option<u32>,
    trial_strip: Option<u32>,
    trial_experiment: Option<u32>,
}

/// Ownership tags of every face of a topology.
///
/// Trial marks are only visible to strips of the same experiment, so experiments never see each other's
/// provisional claims; committed marks are visible to everyone.
pub(crate) struct FaceMarks {
    tags: Vec<FaceTag>,
}

impl FaceMarks {
    pub fn new(face_count: usize) -> Self {
        Self {
            tags: vec![FaceTag::default(); face_count],
        }
    }

    pub fn is_committed(&self, face: FaceId) -> bool {
        self.tags[face].committed.is_some()
    }

    /// Returns `true` if the face is unavailable to strips built under `key`.
    pub fn is_marked(&self, face: FaceId, key: StripKey) -> bool {
        let tag = &self.tags[face];

        tag.committed.is_some() || (key.experiment.is_some() && tag.trial_experiment == key.experiment)
    }

    pub fn is_in_strip(&self, face: FaceId, key: StripKey) -> bool {
        let tag = &self.tags[face];

        match key.experiment {
            Some(_) => tag.trial_strip == Some(key.strip),
            None => tag.committed == Some(key.strip),
        }
    }

    pub fn mark(&mut self, face: FaceId, key: StripKey) {
        debug_assert!(!self.is_marked(face, key));

        let tag = &mut self.tags[face];

        match key.experiment {
            Some(experiment) => {
                tag.trial_experiment = Some(experiment);
                tag.trial_strip = Some(key.strip);
            }
            None => {
                debug_assert!(tag.committed.is_none());

                tag.trial_experiment = None;
                tag.committed = Some(key.strip);
            }
        }
    }
}

/// Returns the vertex of `face` which follows the last two indices of the strip.
fn next_index(indices: &[u32], face: &Face) -> u32 {
    let v0 = indices[indices.len() - 2];
    let v1 = indices[indices.len() - 1];

    let mut outside = face.vertices().into_iter().filter(|v| *v != v0 && *v != v1);
    let next = outside.next();

    if outside.next().is_some() {
        warn!("triangle {:?} doesn't share edge {}-{} with the strip", face, v0, v1);
    }

    next.unwrap_or(face.v0)
}

/// Returns the face across edge `v0 v1` of `face` if a strip under `key` may continue onto it.
///
/// The face must be unmarked and use the edge in the opposite direction, so that both triangles keep their
/// winding inside one strip.
fn continuation(
    topology: &Topology,
    marks: &FaceMarks,
    key: StripKey,
    face: FaceId,
    v0: u32,
    v1: u32,
) -> Option<FaceId> {
    let other = topology.find_other_face(v0, v1, Some(face))?;

    if marks.is_marked(other, key) {
        return None;
    }

    if topology.faces[face].is_cw(v0, v1) == topology.faces[other].is_cw(v0, v1) {
        return None;
    }

    Some(other)
}

/// Returns `false` if every vertex of `face` already appears in `faces`.
fn is_unique(faces: &[Face], face: &Face) -> bool {
    let mut seen = [false; 3];

    for other in faces {
        for (s, v) in seen.iter_mut().zip(face.vertices()) {
            *s |= other.contains(v);
        }

        if seen.iter().all(|s| *s) {
            return false;
        }
    }

    true
}

#[derive(Clone, Debug)]
pub(crate) struct Strip {
    pub start: StripStart,
    pub faces: Vec<StripFace>,
    pub num_degenerates: usize,
    pub key: StripKey,
}

impl Strip {
    pub fn new(start: StripStart, strip_id: u32, experiment: Option<u32>) -> Self {
        Self {
            start,
            faces: Vec::new(),
            num_degenerates: 0,
            key: StripKey {
                strip: strip_id,
                experiment,
            },
        }
    }

    /// Number of faces excluding degenerate bridges.
    pub fn real_len(&self) -> usize {
        self.faces.len() - self.num_degenerates
    }

    /// Builds the strip forward and backward from its seed, marking every face it takes.
    pub fn build(&mut self, topology: &Topology, marks: &mut FaceMarks) {
        let start_face = topology.faces[self.start.face];
        let start_edge = topology.edge(self.start.edge);

        let mut forward = vec![StripFace::real(self.start.face, start_face)];
        marks.mark(self.start.face, self.key);

        let (v0, v1) = if self.start.to_v1 {
            (start_edge.v0, start_edge.v1)
        } else {
            (start_edge.v1, start_edge.v0)
        };

        let mut indices = vec![v0, v1];
        let v2 = next_index(&indices, &start_face);
        indices.push(v2);

        self.extend(topology, marks, &mut indices, (v1, v2), &mut forward, None);

        // faces taken so far; the backward walk refuses faces which would wrap around onto these
        let mut taken: Vec<Face> = forward.iter().map(|f| f.face).collect();

        let mut indices = vec![v2, v1, v0];
        let mut backward = Vec::new();

        self.extend(topology, marks, &mut indices, (v1, v0), &mut backward, Some(&mut taken));

        self.faces = backward.into_iter().rev().chain(forward).collect();
    }

    /// Walks across the edge `window` away from the seed face for as long as unmarked faces are found.
    ///
    /// Only faces wound consistently with the strip are taken, as a strip can't flip the winding of a single
    /// triangle. When the natural continuation of the next face is a dead end but the opposite edge leads
    /// somewhere, a degenerate face is inserted to swap the strip parity and the walk pivots onto that edge.
    fn extend(
        &mut self,
        topology: &Topology,
        marks: &mut FaceMarks,
        indices: &mut Vec<u32>,
        window: (u32, u32),
        faces: &mut Vec<StripFace>,
        mut taken: Option<&mut Vec<Face>>,
    ) {
        let key = self.key;

        let (mut nv0, mut nv1) = window;
        let mut current = self.start.face;

        while let Some(next) = continuation(topology, marks, key, current, nv0, nv1) {
            let next_face = topology.faces[next];

            if let Some(taken) = taken.as_deref() {
                if !is_unique(taken, &next_face) {
                    break;
                }
            }

            let mut test_nv0 = nv1;
            let test_nv1 = next_index(indices, &next_face);

            // check whether taking this face leads into a dead end, and swap if it buys us something
            if continuation(topology, marks, key, next, test_nv0, test_nv1).is_none()
                && continuation(topology, marks, key, next, nv0, test_nv1).is_some()
            {
                faces.push(StripFace::bridge(Face::new(nv0, nv1, nv0)));
                indices.push(nv0);
                test_nv0 = nv0;

                self.num_degenerates += 1;
            }

            faces.push(StripFace::real(next, next_face));
            marks.mark(next, key);

            if let Some(taken) = taken.as_deref_mut() {
                taken.push(next_face);
            }

            indices.push(test_nv1);

            nv0 = test_nv0;
            nv1 = test_nv1;
            current = next;
        }
    }

    /// Returns `true` if one of the face's edges borders a face of this strip.
    pub fn shares_edge(&self, topology: &Topology, marks: &FaceMarks, face: FaceId) -> bool {
        topology.faces[face].edges().into_iter().any(|(a, b)| {
            topology.find_edge(a, b).is_some_and(|e| {
                let edge = topology.edge(e);

                [edge.face_a, edge.face_b]
                    .into_iter()
                    .flatten()
                    .any(|f| marks.is_in_strip(f, self.key))
            })
        })
    }

    /// Makes the strip permanent: drops its experiment and marks its faces as committed.
    pub fn commit(&mut self, marks: &mut FaceMarks) {
        self.key.experiment = None;

        for face in self.faces.iter().filter_map(|f| f.id) {
            marks.mark(face, self.key);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn start(topology: &Topology, face: FaceId, a: u32, b: u32, to_v1: bool) -> StripStart {
        StripStart {
            face,
            edge: topology.find_edge(a, b).unwrap(),
            to_v1,
        }
    }

    // 0 - 1 - 2 - 3
    // | / | / | / |
    // 4 - 5 - 6 - 7
    const RIBBON: [u32; 18] = [0, 4, 1, 1, 4, 5, 1, 5, 2, 2, 5, 6, 2, 6, 3, 3, 6, 7];

    #[test]
    fn test_single_face() {
        let topology = Topology::build(&[0, 1, 2], 2);
        let mut marks = FaceMarks::new(topology.faces.len());

        let mut strip = Strip::new(start(&topology, 0, 0, 1, true), 0, Some(0));
        strip.build(&topology, &mut marks);

        assert_eq!(strip.faces.len(), 1);
        assert_eq!(strip.real_len(), 1);
        assert!(marks.is_marked(0, strip.key));
    }

    #[test]
    fn test_ribbon_takes_all_faces() {
        let topology = Topology::build(&RIBBON, 7);
        let mut marks = FaceMarks::new(topology.faces.len());

        let mut strip = Strip::new(start(&topology, 0, 0, 4, true), 0, Some(0));
        strip.build(&topology, &mut marks);

        let ids: Vec<FaceId> = strip.faces.iter().filter_map(|f| f.id).collect();

        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(strip.num_degenerates, 0);

        // consecutive faces always share an edge
        for pair in strip.faces.windows(2) {
            assert_eq!(pair[1].face.vertices().iter().filter(|v| pair[0].face.contains(**v)).count(), 2);
        }
    }

    #[test]
    fn test_experiments_do_not_interfere() {
        let topology = Topology::build(&RIBBON, 7);
        let mut marks = FaceMarks::new(topology.faces.len());

        let mut first = Strip::new(start(&topology, 0, 0, 4, true), 0, Some(0));
        first.build(&topology, &mut marks);

        let mut second = Strip::new(start(&topology, 5, 3, 6, true), 1, Some(1));
        second.build(&topology, &mut marks);

        assert_eq!(first.real_len(), 6);
        assert_eq!(second.real_len(), 6);

        assert!(!marks.is_committed(0));
        assert!(marks.is_in_strip(0, second.key));
        assert!(!marks.is_marked(0, StripKey { strip: 2, experiment: Some(2) }));
    }

    #[test]
    fn test_commit() {
        let topology = Topology::build(&RIBBON, 7);
        let mut marks = FaceMarks::new(topology.faces.len());

        let mut strip = Strip::new(start(&topology, 0, 0, 4, true), 3, Some(0));
        strip.build(&topology, &mut marks);
        strip.commit(&mut marks);

        assert_eq!(strip.key.experiment, None);
        assert!((0..6).all(|f| marks.is_committed(f) && marks.is_in_strip(f, strip.key)));

        // committed faces are off limits for every later experiment
        assert!(marks.is_marked(0, StripKey { strip: 9, experiment: Some(9) }));
    }

    #[test]
    fn test_swap_inserts_bridge() {
        let topology = Topology::build(&RIBBON, 7);
        let mut marks = FaceMarks::new(topology.faces.len());

        // walking backward from 1 5 2, the natural continuation of 1 4 5 is a boundary edge, so the strip
        // pivots onto edge 1-4 with a degenerate triangle
        let mut strip = Strip::new(start(&topology, 2, 1, 5, true), 0, Some(0));
        strip.build(&topology, &mut marks);

        let ids: Vec<Option<FaceId>> = strip.faces.iter().map(|f| f.id).collect();

        assert_eq!(ids, vec![Some(0), Some(1), None, Some(2)]);
        assert_eq!(strip.faces[2].face, Face::new(1, 5, 1));
        assert_eq!(strip.num_degenerates, 1);
        assert_eq!(strip.real_len(), 3);
    }

    #[test]
    fn test_inconsistent_winding_ends_strip() {
        // 0 4 8 runs along edge 0-4 in the same direction as 0 4 1
        let mut indices = RIBBON.to_vec();
        indices.extend_from_slice(&[0, 4, 8]);

        let topology = Topology::build(&indices, 8);

        for to_v1 in [true, false] {
            let mut marks = FaceMarks::new(topology.faces.len());

            let mut strip = Strip::new(start(&topology, 6, 0, 4, to_v1), 0, Some(0));
            strip.build(&topology, &mut marks);

            assert_eq!(strip.faces, vec![StripFace::real(6, Face::new(0, 4, 8))]);
            assert!(!marks.is_marked(0, strip.key));
        }

        let mut marks = FaceMarks::new(topology.faces.len());

        let mut strip = Strip::new(start(&topology, 0, 0, 4, true), 0, Some(0));
        strip.build(&topology, &mut marks);

        let ids: Vec<Option<FaceId>> = strip.faces.iter().map(|f| f.id).collect();

        assert_eq!(ids, vec![Some(0), Some(1), Some(2), Some(3), Some(4), Some(5)]);
        assert!(!marks.is_marked(6, strip.key));
    }

    #[test]
    fn test_is_unique() {
        let taken = [Face::new(0, 1, 2), Face::new(2, 1, 3)];

        assert!(is_unique(&taken, &Face::new(3, 1, 4)));
        assert!(!is_unique(&taken, &Face::new(0, 3, 1)));
    }
}
