use crate::winding::Winding;

/// What the repair pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Winding vertices dropped because their outgoing edge had no length.
    pub degenerate_edges: usize,
    /// Two-point windings spliced out.
    pub degenerate_faces: usize,
    /// Consecutive edges to the same face collapsed.
    pub duplicate_edges: usize,
    /// Edges removed because the adjacent face did not point back.
    pub dangling_edges: usize,
}

impl RepairReport {
    /// `true` if nothing was changed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Cleans up the face adjacency graph after clipping.
///
/// Runs four passes in a fixed order, each relying on the previous one:
/// zero-length edges, knife-edge faces, repeated adjacency, then edges whose
/// neighbour does not reference them back. Afterwards every remaining edge
/// annotation is bidirectional.
pub fn repair_connectivity(windings: &mut [Winding], edge_epsilon: f64) -> RepairReport {
    RepairReport {
        degenerate_edges: remove_degenerate_edges(windings, edge_epsilon),
        degenerate_faces: remove_degenerate_faces(windings),
        duplicate_edges: remove_duplicate_edges(windings),
        dangling_edges: remove_dangling_edges(windings),
    }
}

/// Drops vertices whose outgoing edge is shorter than `epsilon`, together
/// with the matching edge in the adjacent face.
fn remove_degenerate_edges(windings: &mut [Winding], epsilon: f64) -> usize {
    let mut removed = 0;
    for i in 0..windings.len() {
        let mut j = 0;
        while j < windings[i].len() {
            let next = windings[i].next(j);
            let vertex = windings[i][j];
            let length = (windings[i][next].point - vertex.point).norm();
            if length < epsilon {
                if let Some(adjacent) = vertex.adjacent.filter(|&a| a != i) {
                    if let Some(other) = windings.get_mut(adjacent) {
                        if let Some(index) = other.find_adjacent(i) {
                            other.remove(index);
                        }
                    }
                }
                windings[i].remove(j);
                removed += 1;
            } else {
                j += 1;
            }
        }
    }
    removed
}

/// Splices out windings reduced to two points.
///
/// Such a face only grazes the solid along an edge. Each neighbour still
/// pointing at it is redirected to the face on the other side, and its
/// winding is cleared. A neighbour may already point across.
fn remove_degenerate_faces(windings: &mut [Winding]) -> usize {
    let mut removed = 0;
    for i in 0..windings.len() {
        if windings[i].len() != 2 {
            continue;
        }
        let first = windings[i][0].adjacent;
        let second = windings[i][1].adjacent;
        redirect(windings, first, i, second);
        redirect(windings, second, i, first);
        windings[i].clear();
        removed += 1;
    }
    removed
}

/// Points the edge of face `at` that references `from` at `to` instead.
fn redirect(windings: &mut [Winding], at: Option<usize>, from: usize, to: Option<usize>) {
    let Some(winding) = at.and_then(|a| windings.get_mut(a)) else {
        return;
    };
    if let Some(index) = winding.find_adjacent(from) {
        winding.vertices_mut()[index].adjacent = to;
    }
}

/// Collapses consecutive edges that share the same adjacent face.
fn remove_duplicate_edges(windings: &mut [Winding]) -> usize {
    let mut removed = 0;
    for winding in windings.iter_mut() {
        let mut j = 0;
        while j < winding.len() {
            let next = winding.next(j);
            if winding[j].adjacent == winding[next].adjacent {
                winding.remove(next);
                removed += 1;
            } else {
                j += 1;
            }
        }
    }
    removed
}

/// Removes edges whose adjacent face is missing or does not point back.
fn remove_dangling_edges(windings: &mut [Winding]) -> usize {
    let mut removed = 0;
    for i in 0..windings.len() {
        let mut j = 0;
        while j < windings[i].len() {
            let linked = windings[i][j]
                .adjacent
                .and_then(|a| windings.get(a))
                .and_then(|w| w.find_adjacent(i))
                .is_some();
            if linked {
                j += 1;
            } else {
                windings[i].remove(j);
                removed += 1;
            }
        }
    }
    removed
}
