//! Index buffer level interface: triangle list in, primitive groups out

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::RESTART_INDEX;
use crate::error::{Result, StripifyError};
use crate::stripify::{Stripified, create_strips, stripify};
use crate::topology::Face;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    List,
    Strip,
    /// Never produced by [TriStrip], only understood by [PrimitiveGroup::triangles].
    Fan,
}

/// Indices of one draw call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimitiveGroup {
    pub primitive_type: PrimitiveType,
    pub indices: Vec<u32>,
    /// Number of meaningful indices at the start of `indices`
    pub num_indices: usize,
}

impl PrimitiveGroup {
    pub fn new(primitive_type: PrimitiveType, indices: Vec<u32>) -> Self {
        let num_indices = indices.len();

        Self {
            primitive_type,
            indices,
            num_indices,
        }
    }

    pub fn trimmed_indices(&self) -> &[u32] {
        &self.indices[..self.num_indices.min(self.indices.len())]
    }

    /// Decodes the group into the triangles it renders.
    ///
    /// Strip and fan triangles are returned with their original winding. Zero area triangles are skipped, and
    /// [RESTART_INDEX] starts a new strip or fan.
    pub fn triangles(&self) -> Vec<Face> {
        let indices = self.trimmed_indices();

        let mut triangles = Vec::with_capacity(indices.len());
        let mut start = 0;

        for (i, index) in indices.iter().enumerate() {
            let face = match self.primitive_type {
                PrimitiveType::List => {
                    if i % 3 != 2 {
                        continue;
                    }

                    Face::new(indices[i - 2], indices[i - 1], *index)
                }
                _ if *index == RESTART_INDEX => {
                    start = i + 1;
                    continue;
                }
                _ if i - start < 2 => continue,
                PrimitiveType::Strip => {
                    let mut a = indices[i - 2];
                    let mut b = indices[i - 1];

                    // odd triangles have flipped winding
                    if (i - start) & 1 != 0 {
                        std::mem::swap(&mut a, &mut b);
                    }

                    Face::new(a, b, *index)
                }
                PrimitiveType::Fan => Face::new(indices[start], indices[i - 1], *index),
            };

            if !face.is_degenerate() {
                triangles.push(face);
            }
        }

        triangles
    }
}

/// Vertex cache sizes of common GPUs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheSize {
    GeForce1_2,
    GeForce3,
}

impl From<CacheSize> for usize {
    fn from(value: CacheSize) -> usize {
        match value {
            CacheSize::GeForce1_2 => 16,
            CacheSize::GeForce3 => 24,
        }
    }
}

/// Triangle strip generator settings.
///
/// # Example
///
/// ```
/// use tristrip_rs::{CacheSize, PrimitiveType, TriStrip};
///
/// let groups = TriStrip::default()
///     .with_cache_size(CacheSize::GeForce3.into())
///     .with_stitch_strips(false)
///     .generate_strips(&[0, 1, 2, 2, 1, 3])
///     .unwrap();
///
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].primitive_type, PrimitiveType::Strip);
/// assert_eq!(groups[0].indices, vec![0, 1, 2, 3]);
/// ```
#[derive(Clone, Debug)]
pub struct TriStrip {
    cache_size: usize,
    stitch_strips: bool,
    min_strip_size: usize,
    lists_only: bool,
    validate: bool,
}

impl Default for TriStrip {
    fn default() -> Self {
        Self {
            cache_size: CacheSize::GeForce1_2.into(),
            stitch_strips: true,
            min_strip_size: 0,
            lists_only: false,
            validate: false,
        }
    }
}

impl TriStrip {
    /// Size of the post-transform vertex cache to optimize for.
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    /// Joins all strips into a single one using degenerate triangles, instead of one group per strip.
    pub fn with_stitch_strips(mut self, stitch_strips: bool) -> Self {
        self.stitch_strips = stitch_strips;
        self
    }

    /// Strips with fewer triangles than this are moved to a trailing triangle list group.
    pub fn with_min_strip_size(mut self, min_strip_size: usize) -> Self {
        self.min_strip_size = min_strip_size;
        self
    }

    /// Outputs a single cache optimized triangle list instead of strips.
    pub fn with_lists_only(mut self, lists_only: bool) -> Self {
        self.lists_only = lists_only;
        self
    }

    /// Checks that the generated groups render exactly the input triangles, logging a warning if they don't.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    pub fn stitch_strips(&self) -> bool {
        self.stitch_strips
    }

    pub fn min_strip_size(&self) -> usize {
        self.min_strip_size
    }

    pub fn lists_only(&self) -> bool {
        self.lists_only
    }

    /// Converts a triangle list into primitive groups.
    ///
    /// Without `lists_only`, returns either one stitched strip or one group per strip, followed by a list group if
    /// any triangles were left out of strips. Degenerate input triangles are dropped, and so are repeats of a
    /// triangle over the same three vertices. [RESTART_INDEX] is reserved and can't be used as a vertex index.
    pub fn generate_strips(&self, indices: &[u32]) -> Result<Vec<PrimitiveGroup>> {
        if indices.len() % 3 != 0 {
            return Err(StripifyError::InvalidIndexCount { count: indices.len() });
        }

        if self.cache_size == 0 {
            return Err(StripifyError::InvalidCacheSize);
        }

        if let Some(index) = indices.iter().find(|i| **i == RESTART_INDEX) {
            return Err(StripifyError::IndexOutOfRange {
                index: *index,
                max: RESTART_INDEX - 1,
            });
        }

        let Some(max_index) = indices.iter().max() else {
            return Ok(Vec::new());
        };

        let result = stripify(indices, self.cache_size, self.min_strip_size, *max_index);

        let groups = self.assemble(result);

        if self.validate {
            validate(indices, &groups);
        }

        Ok(groups)
    }

    fn assemble(&self, result: Stripified) -> Vec<PrimitiveGroup> {
        let mut groups = Vec::new();

        if self.lists_only {
            let indices: Vec<u32> = result
                .strips
                .iter()
                .flatten()
                .chain(result.faces.iter())
                .filter(|f| !f.is_degenerate())
                .flat_map(Face::vertices)
                .collect();

            if !indices.is_empty() {
                groups.push(PrimitiveGroup::new(PrimitiveType::List, indices));
            }

            return groups;
        }

        let (strip_indices, strip_count) = create_strips(&result.strips, self.stitch_strips);

        debug!(
            "{} strips ({} separate) with {} indices, {} faces left in a list",
            result.strips.len(),
            strip_count,
            strip_indices.len(),
            result.faces.len()
        );

        groups.extend(
            strip_indices
                .split(|i| *i == RESTART_INDEX)
                .filter(|strip| !strip.is_empty())
                .map(|strip| PrimitiveGroup::new(PrimitiveType::Strip, strip.to_vec())),
        );

        if !result.faces.is_empty() {
            let indices = result.faces.iter().flat_map(Face::vertices).collect();

            groups.push(PrimitiveGroup::new(PrimitiveType::List, indices));
        }

        groups
    }
}

/// Compares the triangles rendered by `groups` with the input triangles, ignoring rotation.
///
/// Degenerate input triangles are not expected in the output, and of several input triangles over the same three
/// vertices only the first is. Everything else has to be rendered exactly once with its winding.
fn validate(indices: &[u32], groups: &[PrimitiveGroup]) -> bool {
    let mut seen = HashSet::new();
    let mut balance: HashMap<Face, isize> = HashMap::new();

    for face in indices.chunks_exact(3).map(|t| Face::new(t[0], t[1], t[2])) {
        if !face.is_degenerate() && seen.insert(face.sorted_vertices()) {
            *balance.entry(face.canonical()).or_default() += 1;
        }
    }

    for face in groups.iter().flat_map(PrimitiveGroup::triangles) {
        *balance.entry(face.canonical()).or_default() -= 1;
    }

    let missing: isize = balance.values().filter(|b| **b > 0).sum();
    let extra: isize = balance.values().filter(|b| **b < 0).map(|b| -b).sum();

    if missing > 0 || extra > 0 {
        warn!(
            "generated strips don't match the input: {} triangles missing, {} unexpected",
            missing, extra
        );

        return false;
    }

    true
}

#[cfg(test)]
mod test {
    use super::*;

    fn strip_groups(groups: &[PrimitiveGroup]) -> usize {
        groups.iter().filter(|g| g.primitive_type == PrimitiveType::Strip).count()
    }

    fn list_groups(groups: &[PrimitiveGroup]) -> usize {
        groups.iter().filter(|g| g.primitive_type == PrimitiveType::List).count()
    }

    #[test]
    fn test_quad() {
        let indices = [0, 1, 2, 2, 1, 3];
        let groups = TriStrip::default().generate_strips(&indices).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].primitive_type, PrimitiveType::Strip);
        assert_eq!(groups[0].num_indices, 4);
        assert!(validate(&indices, &groups));
    }

    #[test]
    fn test_disconnected_triangles() {
        let indices = [0, 1, 2, 3, 4, 5];

        let separate = TriStrip::default().with_stitch_strips(false).generate_strips(&indices).unwrap();

        assert_eq!(separate.len(), 2);
        assert_eq!(strip_groups(&separate), 2);
        assert!(separate.iter().all(|g| !g.indices.contains(&RESTART_INDEX)));
        assert!(validate(&indices, &separate));

        let stitched = TriStrip::default().generate_strips(&indices).unwrap();

        assert_eq!(stitched.len(), 1);
        assert_eq!(stitched[0].triangles().len(), 2);
        assert!(validate(&indices, &stitched));
    }

    #[test]
    fn test_degenerate_input() {
        let groups = TriStrip::default().generate_strips(&[5, 5, 6]).unwrap();

        assert!(groups.is_empty());

        let groups = TriStrip::default().generate_strips(&[5, 5, 6, 0, 1, 2]).unwrap();

        assert!(groups.iter().all(|g| !g.triangles().contains(&Face::new(5, 5, 6))));
        assert_eq!(groups.iter().map(|g| g.triangles().len()).sum::<usize>(), 1);
    }

    #[test]
    fn test_small_strips_demoted() {
        let indices = [0, 1, 2, 2, 1, 3, 4, 5, 6];

        for stitch in [false, true] {
            let groups = TriStrip::default()
                .with_min_strip_size(5)
                .with_stitch_strips(stitch)
                .generate_strips(&indices)
                .unwrap();

            assert_eq!(strip_groups(&groups), 0);
            assert_eq!(list_groups(&groups), 1);
            assert_eq!(groups[0].num_indices, 9);
            assert!(validate(&indices, &groups));
        }
    }

    #[test]
    fn test_lists_only() {
        let indices = [0, 1, 2, 2, 1, 3, 2, 3, 4, 4, 3, 5];
        let groups = TriStrip::default().with_lists_only(true).generate_strips(&indices).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].primitive_type, PrimitiveType::List);
        assert_eq!(groups[0].num_indices, indices.len());
        assert!(validate(&indices, &groups));
    }

    #[test]
    fn test_empty() {
        assert!(TriStrip::default().generate_strips(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            TriStrip::default().generate_strips(&[0, 1]),
            Err(StripifyError::InvalidIndexCount { count: 2 })
        );
        assert_eq!(
            TriStrip::default().with_cache_size(0).generate_strips(&[0, 1, 2]),
            Err(StripifyError::InvalidCacheSize)
        );
        assert_eq!(
            TriStrip::default().generate_strips(&[0, 1, RESTART_INDEX]),
            Err(StripifyError::IndexOutOfRange {
                index: RESTART_INDEX,
                max: RESTART_INDEX - 1
            })
        );
    }

    #[test]
    fn test_validate_detects_missing() {
        let groups = vec![PrimitiveGroup::new(PrimitiveType::List, vec![0, 1, 2])];

        assert!(validate(&[0, 1, 2], &groups));
        assert!(!validate(&[0, 1, 2, 2, 1, 3], &groups));
        assert!(!validate(&[0, 2, 1], &groups));

        // repeats over the same vertices are expected once
        assert!(validate(&[0, 1, 2, 1, 2, 0, 0, 2, 1], &groups));

        let twice = vec![PrimitiveGroup::new(PrimitiveType::List, vec![0, 1, 2, 1, 2, 0])];
        assert!(!validate(&[0, 1, 2], &twice));
    }

    #[test]
    fn test_triangles() {
        let strip = PrimitiveGroup::new(PrimitiveType::Strip, vec![0, 1, 2, 3, 3, 4, 4, 5, 6]);

        assert_eq!(
            strip.triangles(),
            vec![Face::new(0, 1, 2), Face::new(2, 1, 3), Face::new(4, 5, 6)]
        );

        let restarted = PrimitiveGroup::new(PrimitiveType::Strip, vec![0, 1, 2, RESTART_INDEX, 3, 4, 5, 6]);

        assert_eq!(
            restarted.triangles(),
            vec![Face::new(0, 1, 2), Face::new(3, 4, 5), Face::new(5, 4, 6)]
        );

        let fan = PrimitiveGroup::new(PrimitiveType::Fan, vec![0, 1, 2, 3]);

        assert_eq!(fan.triangles(), vec![Face::new(0, 1, 2), Face::new(0, 2, 3)]);

        let mut list = PrimitiveGroup::new(PrimitiveType::List, vec![0, 1, 2, 2, 1, 3]);
        list.num_indices = 3;

        assert_eq!(list.trimmed_indices(), &[0, 1, 2]);
        assert_eq!(list.triangles(), vec![Face::new(0, 1, 2)]);
    }
}
