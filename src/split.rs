use std::{borrow::Cow, collections::HashMap};

use log::debug;
use om_format::{Mesh, VertexRecord};

use crate::error::SplitError;

/// The result of [`short_index_head_tail_cut`].
///
/// `head` references at most the requested number of distinct vertices;
/// `tail` holds every triangle that did not fit. Both use local indices.
#[derive(Debug)]
pub struct HeadTailCut<'a> {
    pub head: Cow<'a, Mesh>,
    pub tail: Mesh,
}

// Tracks which source vertices a part uses and their compacted index.
// A triangle is admitted as a whole or not at all.
struct VertexIndexUsage {
    max_count: usize,
    old_to_new: HashMap<u32, u32>,
}

impl VertexIndexUsage {
    fn new(max_count: usize) -> Self {
        Self {
            max_count,
            old_to_new: HashMap::new(),
        }
    }

    fn used(&self) -> usize {
        self.old_to_new.len()
    }

    fn try_admit(&mut self, triangle: &[u32; 3]) -> bool {
        let mut fresh: Vec<u32> = Vec::with_capacity(3);
        for &index in triangle {
            if !self.old_to_new.contains_key(&index) && !fresh.contains(&index) {
                fresh.push(index);
            }
        }

        if self.used() + fresh.len() > self.max_count {
            return false;
        }

        for index in fresh {
            let new_index = self.used() as u32;
            self.old_to_new.insert(index, new_index);
        }
        true
    }

    fn materialize(&self, source: &Mesh, triangles: &[[u32; 3]]) -> Mesh {
        let mut mesh = source.descriptor_copy();
        mesh.vertices = vec![VertexRecord::default(); self.used()];
        for (&old, &new) in &self.old_to_new {
            mesh.vertices[new as usize] = source.vertices[old as usize];
        }
        mesh.indices = triangles
            .iter()
            .flatten()
            .map(|old| self.old_to_new[old])
            .collect();
        mesh
    }
}

/// Cuts a mesh into a head that fits `max_short_index` distinct vertices and
/// an unconstrained tail with the rest.
///
/// A mesh with fewer vertices than the bound is returned as the head as is,
/// together with an empty tail. Otherwise triangles are offered to the head
/// in two passes: first those whose indices are all below the bound, then
/// the remaining ones. The head and tail are compacted and have base vertex 0.
pub fn short_index_head_tail_cut(
    mesh: &Mesh,
    max_short_index: u32,
) -> Result<HeadTailCut<'_>, SplitError> {
    if max_short_index < 3 {
        return Err(SplitError::BoundTooSmall(max_short_index));
    }
    if mesh.indices.len() % 3 != 0 {
        return Err(SplitError::NotTriangleList(mesh.indices.len()));
    }

    if mesh.vertices.len() < max_short_index as usize {
        return Ok(HeadTailCut {
            head: Cow::Borrowed(mesh),
            tail: mesh.descriptor_copy(),
        });
    }

    let triangles: Vec<[u32; 3]> = mesh
        .indices
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]].map(|index| index - mesh.base_vertex))
        .collect();

    let mut head_usage = VertexIndexUsage::new(max_short_index as usize);
    let mut head = Vec::new();
    let mut provisional_tail = Vec::new();
    for triangle in triangles {
        if triangle.iter().all(|&index| index < max_short_index) && head_usage.try_admit(&triangle)
        {
            head.push(triangle);
        } else {
            provisional_tail.push(triangle);
        }
    }

    // skip-list pass: later triangles may still fit the head
    let mut tail = Vec::new();
    for triangle in provisional_tail {
        if head_usage.try_admit(&triangle) {
            head.push(triangle);
        } else {
            tail.push(triangle);
        }
    }

    let mut tail_usage = VertexIndexUsage::new(usize::MAX);
    for triangle in &tail {
        tail_usage.try_admit(triangle);
    }

    debug!(
        "Cut \"{}\": head {} triangles / {} vertices, tail {} triangles / {} vertices",
        mesh.group_face_name,
        head.len(),
        head_usage.used(),
        tail.len(),
        tail_usage.used()
    );

    Ok(HeadTailCut {
        head: Cow::Owned(head_usage.materialize(mesh, &head)),
        tail: tail_usage.materialize(mesh, &tail),
    })
}

/// Cuts the tail again until nothing is left over. Every returned part
/// references at most `max_short_index` distinct vertices.
pub fn split_to_short_indices(mesh: &Mesh, max_short_index: u32) -> Result<Vec<Mesh>, SplitError> {
    let HeadTailCut { head, tail } = short_index_head_tail_cut(mesh, max_short_index)?;
    let mut parts = vec![head.into_owned()];
    let mut tail = tail;

    while !tail.indices.is_empty() {
        let HeadTailCut { head, tail: rest } = short_index_head_tail_cut(&tail, max_short_index)?;
        parts.push(head.into_owned());
        tail = rest;
    }

    Ok(parts)
}

#[cfg(test)]
mod test {
    use super::*;
    use om_format::Material;
    use std::collections::HashSet;

    fn mesh(vertex_count: usize, indices: Vec<u32>) -> Mesh {
        let mut mesh = Mesh::new("strip", Material::new("m"));
        mesh.vertices = (0..vertex_count)
            .map(|i| VertexRecord::new([i as f32, 0.0, 0.0], [0.0; 3], [0.0; 2]))
            .collect();
        mesh.indices = indices;
        mesh
    }

    fn positions(mesh: &Mesh) -> Vec<[u32; 3]> {
        mesh.indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]].map(|i| mesh.vertices[i as usize].position[0] as u32))
            .collect()
    }

    #[test]
    fn test_usage_admission_is_atomic() {
        let mut usage = VertexIndexUsage::new(4);
        assert!(usage.try_admit(&[0, 1, 2]));
        assert!(!usage.try_admit(&[3, 4, 5]));
        assert_eq!(usage.used(), 3);
        assert!(usage.try_admit(&[2, 3, 3]));
        assert_eq!(usage.used(), 4);
        assert!(usage.try_admit(&[0, 3, 1]));
        assert!(!usage.try_admit(&[0, 1, 9]));
    }

    #[test]
    fn test_cut_is_noop_below_bound() -> Result<(), SplitError> {
        let source = mesh(4, vec![0, 1, 2, 0, 2, 3]);
        let cut = short_index_head_tail_cut(&source, 5)?;

        assert!(matches!(cut.head, Cow::Borrowed(head) if std::ptr::eq(head, &source)));
        assert!(cut.tail.is_empty());
        assert_eq!(cut.tail.group_face_name, source.group_face_name);
        Ok(())
    }

    #[test]
    fn test_cut_rejects_bad_input() {
        let source = mesh(4, vec![0, 1, 2, 0]);
        assert_eq!(
            short_index_head_tail_cut(&source, 2).err(),
            Some(SplitError::BoundTooSmall(2))
        );
        assert_eq!(
            short_index_head_tail_cut(&source, 3).err(),
            Some(SplitError::NotTriangleList(4))
        );
    }

    #[test]
    fn test_second_pass_fills_head() -> Result<(), SplitError> {
        let source = mesh(6, vec![0, 1, 2, 3, 4, 5, 0, 1, 5]);
        let cut = short_index_head_tail_cut(&source, 4)?;

        assert_eq!(positions(&cut.head), vec![[0, 1, 2], [0, 1, 5]]);
        assert_eq!(cut.head.vertices.len(), 4);
        assert_eq!(cut.head.indices, vec![0, 1, 2, 0, 1, 3]);
        assert_eq!(positions(&cut.tail), vec![[3, 4, 5]]);
        assert_eq!(cut.tail.indices, vec![0, 1, 2]);
        Ok(())
    }

    #[test]
    fn test_cut_uses_local_indices() -> Result<(), SplitError> {
        let mut source = mesh(4, vec![10, 11, 12, 10, 12, 13]);
        source.base_vertex = 10;
        let cut = short_index_head_tail_cut(&source, 3)?;

        assert_eq!(positions(&cut.head), vec![[0, 1, 2]]);
        assert_eq!(positions(&cut.tail), vec![[0, 2, 3]]);
        assert_eq!(cut.head.base_vertex, 0);
        assert_eq!(cut.tail.base_vertex, 0);
        Ok(())
    }

    #[test]
    fn test_split_is_complete() -> Result<(), SplitError> {
        // a triangle strip over 100 vertices
        let indices = (0..98u32).flat_map(|i| [i, i + 1, i + 2]).collect();
        let source = mesh(100, indices);
        let parts = split_to_short_indices(&source, 16)?;

        let mut seen = HashSet::new();
        for part in &parts {
            assert!(part.vertices.len() <= 16);
            let distinct: HashSet<u32> = part.indices.iter().copied().collect();
            assert_eq!(distinct.len(), part.vertices.len());
            for triangle in positions(part) {
                assert!(seen.insert(triangle));
            }
        }
        assert_eq!(seen.len(), 98);
        assert_eq!(parts.iter().map(Mesh::triangle_count).sum::<usize>(), 98);
        Ok(())
    }
}
