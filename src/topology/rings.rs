use crate::winding::Winding;

use super::FaceVertexId;

/// The same physical edge seen from the adjacent face.
///
/// `None` if the corner does not exist, has no adjacent face, or the
/// adjacent face does not point back.
#[must_use]
pub fn next_edge(windings: &[Winding], corner: FaceVertexId) -> Option<FaceVertexId> {
    let adjacent = windings
        .get(corner.face)?
        .vertices()
        .get(corner.vertex)?
        .adjacent?;
    let vertex = windings.get(adjacent)?.find_adjacent(corner.face)?;
    Some(FaceVertexId::new(adjacent, vertex))
}

/// The next corner around the same physical vertex.
///
/// Crosses the edge starting at `corner` into the adjacent face and steps to
/// the following corner there, which sits at the same position.
#[must_use]
pub fn next_vertex(windings: &[Winding], corner: FaceVertexId) -> Option<FaceVertexId> {
    let edge = next_edge(windings, corner)?;
    let vertex = windings[edge.face].next(edge.vertex);
    Some(FaceVertexId::new(edge.face, vertex))
}

/// Equivalence classes of a successor relation over `0..n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingClasses {
    /// Class of every element.
    pub class_of: Vec<usize>,
    /// Lowest element of each class.
    pub representatives: Vec<usize>,
    /// Elements whose ring did not close within the bound.
    pub unclosed: Vec<usize>,
}

/// Groups elements connected by `successor` links.
///
/// Classes are unions over the links, so the grouping is an equivalence even
/// if a ring is broken. Each element's ring is also walked for at most
/// `bound` steps; walks that do not return to their start are reported in
/// [`RingClasses::unclosed`]. Class ids follow first appearance.
#[must_use]
pub fn unique_rings(successor: &[Option<usize>], bound: usize) -> RingClasses {
    let n = successor.len();
    let mut parent: Vec<usize> = (0..n).collect();

    for (i, next) in successor.iter().enumerate() {
        if let Some(j) = *next {
            if j < n {
                union(&mut parent, i, j);
            }
        }
    }

    let mut unclosed = Vec::new();
    for start in 0..n {
        if !ring_closes(successor, start, bound) {
            unclosed.push(start);
        }
    }

    let mut class_of = vec![0; n];
    let mut class_of_root = vec![usize::MAX; n];
    let mut representatives = Vec::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        if class_of_root[root] == usize::MAX {
            class_of_root[root] = representatives.len();
            representatives.push(i);
        }
        class_of[i] = class_of_root[root];
    }

    RingClasses {
        class_of,
        representatives,
        unclosed,
    }
}

fn ring_closes(successor: &[Option<usize>], start: usize, bound: usize) -> bool {
    let mut current = start;
    for _ in 0..bound.max(1) {
        match successor.get(current).copied().flatten() {
            Some(next) if next == start => return true,
            Some(next) => current = next,
            None => return false,
        }
    }
    false
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[high] = low;
    }
}
