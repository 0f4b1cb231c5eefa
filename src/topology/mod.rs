mod repair;
mod rings;

pub use repair::{repair_connectivity, RepairReport};
pub use rings::{next_edge, next_vertex, unique_rings, RingClasses};

use crate::math::{Aabb, Point3};
use crate::winding::Winding;

/// A corner of one face's winding: `(face index, vertex index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceVertexId {
    pub face: usize,
    pub vertex: usize,
}

impl FaceVertexId {
    #[must_use]
    pub fn new(face: usize, vertex: usize) -> Self {
        Self { face, vertex }
    }
}

/// A physical edge shared by two faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniqueEdge {
    /// The two incident faces.
    pub faces: (usize, usize),
    /// Midpoint of the edge.
    pub midpoint: Point3,
    /// The winding corner the edge starts at, in the first face.
    pub start: FaceVertexId,
}

/// Why a brush has no solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateReason {
    /// Some winding edge is not bounded by any face.
    Unbounded,
    /// Fewer than four faces have windings with area.
    TooFewFaces { contributing: usize },
    /// The total winding vertex count is odd, so edges cannot pair up.
    OddVertexCount { count: usize },
}

/// A connectivity defect found after repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyIssue {
    /// `V + F - E != 2`.
    EulerMismatch {
        vertices: usize,
        faces: usize,
        edges: usize,
    },
    /// A winding edge's adjacent face has no edge pointing back.
    MissingBackReference { at: FaceVertexId },
    /// A ring walk did not return to its start within the face bound.
    RingNotClosed { at: FaceVertexId },
}

/// Whether the connectivity graph passed every check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TopologyStatus {
    #[default]
    Consistent,
    Inconsistent(Vec<TopologyIssue>),
}

impl TopologyStatus {
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        matches!(self, Self::Consistent)
    }

    #[must_use]
    pub fn issues(&self) -> &[TopologyIssue] {
        match self {
            Self::Consistent => &[],
            Self::Inconsistent(issues) => issues,
        }
    }
}

/// Immutable boundary representation produced by one rebuild.
///
/// Indexed by face position in the brush. Collaborators such as renderers
/// or pickers pull from it; it is replaced wholesale on the next rebuild.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BRep {
    /// One winding per face, empty for faces that do not contribute.
    pub windings: Vec<Winding>,
    /// Distinct vertex positions.
    pub vertices: Vec<Point3>,
    /// Distinct edges with their incident faces.
    pub edges: Vec<UniqueEdge>,
    /// For each face, the unique vertex index of every winding corner.
    pub face_vertex_ids: Vec<Vec<usize>>,
    /// For each face, the unique edge index of every winding edge.
    pub face_edge_ids: Vec<Vec<usize>>,
    /// Area-weighted centroid of each contributing face.
    pub centroids: Vec<Option<Point3>>,
    /// Bounds of all winding vertices.
    pub bounds: Option<Aabb>,
    /// Faces skipped because their plane normal is not unit length.
    pub invalid_faces: Vec<usize>,
    /// Set when the brush encloses no volume.
    pub degenerate: Option<DegenerateReason>,
    /// Result of the connectivity checks.
    pub topology: TopologyStatus,
}

impl BRep {
    /// An empty representation for `face_count` faces.
    #[must_use]
    pub fn degenerate(face_count: usize, reason: DegenerateReason, invalid_faces: Vec<usize>) -> Self {
        Self {
            windings: vec![Winding::new(); face_count],
            face_vertex_ids: vec![Vec::new(); face_count],
            face_edge_ids: vec![Vec::new(); face_count],
            centroids: vec![None; face_count],
            invalid_faces,
            degenerate: Some(reason),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.degenerate.is_some()
    }

    /// Number of faces whose winding has area.
    #[must_use]
    pub fn contributing_faces(&self) -> usize {
        self.windings.iter().filter(|w| w.contributes()).count()
    }

    /// Indices of faces whose winding has area.
    pub fn contributing_face_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.windings
            .iter()
            .enumerate()
            .filter(|(_, w)| w.contributes())
            .map(|(i, _)| i)
    }

    /// `V + F - E`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn euler_characteristic(&self) -> isize {
        self.vertices.len() as isize + self.contributing_faces() as isize - self.edges.len() as isize
    }

    /// Every winding vertex of every face.
    pub fn all_points(&self) -> impl Iterator<Item = &Point3> + '_ {
        self.windings.iter().flat_map(Winding::points)
    }
}
