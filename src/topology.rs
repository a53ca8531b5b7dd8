//! Mesh connectivity: triangles and the edges shared between them

use std::collections::{HashMap, HashSet};

use log::warn;

use crate::hash::BuildNoopHasher;

pub(crate) type FaceId = usize;
pub(crate) type EdgeId = usize;

/// A triangle given by three vertex indices in winding order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Face {
    pub v0: u32,
    pub v1: u32,
    pub v2: u32,
}

impl Face {
    pub fn new(v0: u32, v1: u32, v2: u32) -> Self {
        Self { v0, v1, v2 }
    }

    /// Returns `true` if any two of the indices are equal (zero area triangle).
    pub fn is_degenerate(&self) -> bool {
        self.v0 == self.v1 || self.v0 == self.v2 || self.v1 == self.v2
    }

    pub fn vertices(&self) -> [u32; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Rotates the indices so that the smallest one comes first. The winding is kept.
    pub fn canonical(&self) -> Face {
        let Self { v0, v1, v2 } = *self;

        if v0 <= v1 && v0 <= v2 {
            *self
        } else if v1 <= v2 {
            Face::new(v1, v2, v0)
        } else {
            Face::new(v2, v0, v1)
        }
    }

    /// The indices in ascending order; equal for every winding and rotation of the same triangle.
    pub(crate) fn sorted_vertices(&self) -> [u32; 3] {
        let mut vertices = self.vertices();
        vertices.sort_unstable();
        vertices
    }

    pub fn contains(&self, vertex: u32) -> bool {
        self.v0 == vertex || self.v1 == vertex || self.v2 == vertex
    }

    /// Edges in winding order: `v0 v1`, `v1 v2`, `v2 v0`.
    pub(crate) fn edges(&self) -> [(u32, u32); 3] {
        [(self.v0, self.v1), (self.v1, self.v2), (self.v2, self.v0)]
    }

    /// Returns the first vertex of `self` which is not part of `other`.
    pub(crate) fn unique_vertex_against(&self, other: &Face) -> Option<u32> {
        self.vertices().into_iter().find(|v| !other.contains(*v))
    }

    /// Returns `true` if `v0` directly followed by `v1` matches the winding of this face.
    pub(crate) fn is_cw(&self, v0: u32, v1: u32) -> bool {
        if self.v0 == v0 {
            self.v1 == v1
        } else if self.v1 == v0 {
            self.v2 == v1
        } else {
            self.v0 == v1
        }
    }
}

/// An undirected edge with the (up to) two faces bounding it.
#[derive(Clone, Debug)]
pub(crate) struct Edge {
    pub v0: u32,
    pub v1: u32,
    pub face_a: Option<FaceId>,
    pub face_b: Option<FaceId>,
}

impl Edge {
    fn connects(&self, v0: u32, v1: u32) -> bool {
        (self.v0 == v0 && self.v1 == v1) || (self.v0 == v1 && self.v1 == v0)
    }
}

/// Face and edge arenas of a triangle list, with per-vertex edge adjacency.
///
/// Built once per stripification and read-only afterwards; all cross references are arena indices.
pub(crate) struct Topology {
    pub faces: Vec<Face>,
    edges: Vec<Edge>,
    vertex_edges: HashMap<u32, Vec<EdgeId>, BuildNoopHasher>,
}

impl Topology {
    /// Builds the face list and edge table of a triangle list.
    ///
    /// Degenerate triangles are skipped. A triangle over the same three vertices as an earlier one is dropped
    /// whatever its winding, and an edge shared by more than two triangles keeps the first two; both cases are
    /// logged.
    ///
    /// # Arguments
    ///
    /// * `max_index`: largest vertex index referenced by `indices`, bounds the size of the adjacency table
    pub fn build(indices: &[u32], max_index: u32) -> Self {
        assert!(indices.len() % 3 == 0);

        let vertex_capacity = (max_index as usize).saturating_add(1).min(indices.len());

        let mut topology = Self {
            faces: Vec::with_capacity(indices.len() / 3),
            edges: Vec::with_capacity(indices.len()),
            vertex_edges: HashMap::with_capacity_and_hasher(vertex_capacity, BuildNoopHasher::default()),
        };

        let mut unique_faces: HashSet<[u32; 3]> = HashSet::with_capacity(indices.len() / 3);

        for abc in indices.chunks_exact(3) {
            let face = Face::new(abc[0], abc[1], abc[2]);

            if face.is_degenerate() {
                continue;
            }

            if !unique_faces.insert(face.sorted_vertices()) {
                warn!("dropping duplicate triangle {:?}", face);
                continue;
            }

            let id = topology.faces.len();

            for (a, b) in face.edges() {
                match topology.find_edge(a, b) {
                    Some(e) => {
                        let edge = &mut topology.edges[e];

                        if edge.face_b.is_some() {
                            warn!("more than two triangles on edge {}-{}, ignoring triangle {:?} for this edge", a, b, face);
                        } else {
                            edge.face_b = Some(id);
                        }
                    }
                    None => topology.add_edge(a, b, id),
                }
            }

            topology.faces.push(face);
        }

        topology
    }

    fn add_edge(&mut self, v0: u32, v1: u32, face: FaceId) {
        let id = self.edges.len();

        self.edges.push(Edge {
            v0,
            v1,
            face_a: Some(face),
            face_b: None,
        });

        self.vertex_edges.entry(v0).or_default().push(id);
        self.vertex_edges.entry(v1).or_default().push(id);
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    /// Edges touching `vertex`, most recently created first.
    pub fn vertex_edges(&self, vertex: u32) -> impl Iterator<Item = EdgeId> + '_ {
        self.vertex_edges
            .get(&vertex)
            .map_or(&[][..], |edges| edges.as_slice())
            .iter()
            .rev()
            .copied()
    }

    /// Finds the edge connecting `v0` and `v1` in either direction.
    pub fn find_edge(&self, v0: u32, v1: u32) -> Option<EdgeId> {
        self.vertex_edges(v0).find(|e| self.edges[*e].connects(v0, v1))
    }

    /// Finds the face on the other side of edge `v0 v1` from `face`.
    ///
    /// Synthetic faces (`face == None`) are not referenced by any edge, so the first face of the edge is returned.
    pub fn find_other_face(&self, v0: u32, v1: u32, face: Option<FaceId>) -> Option<FaceId> {
        if v0 == v1 {
            return None;
        }

        let edge = &self.edges[self.find_edge(v0, v1)?];

        if edge.face_a == face {
            edge.face_b
        } else {
            edge.face_a
        }
    }

    /// Number of edges of the face which have a face on their other side.
    pub fn neighbor_count(&self, face: &Face, id: Option<FaceId>) -> usize {
        face.edges()
            .into_iter()
            .filter(|(a, b)| self.find_other_face(*a, *b, id).is_some())
            .count()
    }

    /// Number of edges of the face which lie on the mesh boundary.
    pub fn boundary_edge_count(&self, id: FaceId) -> usize {
        3 - self.neighbor_count(&self.faces[id], Some(id))
    }
}
