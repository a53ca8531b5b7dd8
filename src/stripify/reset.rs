//! Choosing where the next batch of strip experiments starts

use crate::stripify::strip::FaceMarks;
use crate::topology::{FaceId, Topology};

/// Finds the face with the most boundary edges, the natural place for a strip to start.
///
/// Returns `None` if the mesh has no boundary at all.
pub(crate) fn find_start_point(topology: &Topology) -> Option<FaceId> {
    let mut best_count = 0;
    let mut best_index = None;

    for i in 0..topology.faces.len() {
        let count = topology.boundary_edge_count(i);

        if count > best_count {
            best_count = count;
            best_index = Some(i);
        }
    }

    best_index
}

/// Cursor hopping around the face array so that consecutive rounds start in different areas of the mesh.
///
/// Areas of small strips can just be left to triangle lists added at the end, while large open spans get
/// stripified early.
pub(crate) struct ResetCursor {
    mesh_jump: f32,
    first_time: bool,
}

impl Default for ResetCursor {
    fn default() -> Self {
        Self {
            mesh_jump: 0.0,
            first_time: true,
        }
    }
}

impl ResetCursor {
    /// Returns the first uncommitted face at or after the cursor (wrapping around), then advances the cursor.
    ///
    /// The very first call starts from a boundary face instead, if there is one.
    pub fn find_good_reset_point(&mut self, topology: &Topology, marks: &FaceMarks) -> Option<FaceId> {
        let face_count = topology.faces.len();

        if face_count == 0 {
            return None;
        }

        let jump = ((((face_count - 1) as f32) * self.mesh_jump) as usize).min(face_count - 1);

        let start = if self.first_time {
            self.first_time = false;
            find_start_point(topology).unwrap_or(jump)
        } else {
            jump
        };

        let result = (start..face_count).chain(0..start).find(|f| !marks.is_committed(*f));

        self.mesh_jump += 0.1;
        if self.mesh_jump > 1.0 {
            self.mesh_jump = 0.05;
        }

        result
    }
}
