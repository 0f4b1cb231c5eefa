mod clip;

use std::ops::Index;

use crate::math::polygon_3d::{polygon_area_3d, polygon_centroid};
use crate::math::{Plane, PlaneSide, Point3};

/// One corner of a winding.
///
/// `adjacent` names the brush face sharing the edge that starts at this
/// vertex. `None` marks an edge that still lies on the seed polygon, i.e.
/// no face bounds it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindingVertex {
    pub point: Point3,
    pub adjacent: Option<usize>,
}

impl WindingVertex {
    #[must_use]
    pub fn new(point: Point3, adjacent: Option<usize>) -> Self {
        Self { point, adjacent }
    }
}

/// Ordered loop of vertices bounding one face, counter-clockwise when viewed
/// from in front of the face plane.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Winding {
    vertices: Vec<WindingVertex>,
}

/// Vertex counts of a winding or brush on each side of a plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitCounts {
    pub front: usize,
    pub back: usize,
    pub on: usize,
}

impl SplitCounts {
    /// Counts one classified vertex.
    pub fn add(&mut self, side: PlaneSide) {
        match side {
            PlaneSide::Front => self.front += 1,
            PlaneSide::Back => self.back += 1,
            PlaneSide::On => self.on += 1,
        }
    }

    /// `true` if vertices lie strictly on both sides.
    #[must_use]
    pub fn straddles(&self) -> bool {
        self.front != 0 && self.back != 0
    }
}

impl std::ops::AddAssign for SplitCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.front += rhs.front;
        self.back += rhs.back;
        self.on += rhs.on;
    }
}

impl Winding {
    /// Creates an empty winding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a winding from vertices already in order.
    #[must_use]
    pub fn from_vertices(vertices: Vec<WindingVertex>) -> Self {
        Self { vertices }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// A winding with two or fewer points bounds no area.
    #[must_use]
    pub fn contributes(&self) -> bool {
        self.vertices.len() > 2
    }

    /// `true` if every edge has an adjacent face.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.vertices.iter().all(|v| v.adjacent.is_some())
    }

    pub fn vertices(&self) -> &[WindingVertex] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut [WindingVertex] {
        &mut self.vertices
    }

    pub fn points(&self) -> impl Iterator<Item = &Point3> + '_ {
        self.vertices.iter().map(|v| &v.point)
    }

    pub fn push(&mut self, vertex: WindingVertex) {
        self.vertices.push(vertex);
    }

    /// Removes the vertex at `index`; the preceding edge then runs to the
    /// following vertex.
    pub fn remove(&mut self, index: usize) -> WindingVertex {
        self.vertices.remove(index)
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Index of the vertex after `index`, wrapping around.
    #[must_use]
    pub fn next(&self, index: usize) -> usize {
        if index + 1 >= self.vertices.len() {
            0
        } else {
            index + 1
        }
    }

    /// Index of the first vertex whose edge is shared with `face`.
    #[must_use]
    pub fn find_adjacent(&self, face: usize) -> Option<usize> {
        self.vertices.iter().position(|v| v.adjacent == Some(face))
    }

    /// Classifies every vertex against `plane`.
    #[must_use]
    pub fn classify_plane(&self, plane: &Plane, epsilon: f64) -> SplitCounts {
        let mut counts = SplitCounts::default();
        for point in self.points() {
            counts.add(plane.classify(point, epsilon));
        }
        counts
    }

    /// `true` if no vertex is strictly in front of `plane`, or, with
    /// `flipped`, strictly behind it.
    #[must_use]
    pub fn test_plane(&self, plane: &Plane, flipped: bool, epsilon: f64) -> bool {
        let rejected = if flipped {
            PlaneSide::Back
        } else {
            PlaneSide::Front
        };
        self.points().all(|p| plane.classify(p, epsilon) != rejected)
    }

    /// Area-weighted centroid on `plane`.
    #[must_use]
    pub fn centroid(&self, plane: &Plane) -> Option<Point3> {
        let points: Vec<Point3> = self.points().copied().collect();
        polygon_centroid(&points, plane)
    }

    /// Enclosed area measured along `plane`'s normal.
    #[must_use]
    pub fn area(&self, plane: &Plane) -> f64 {
        let points: Vec<Point3> = self.points().copied().collect();
        polygon_area_3d(&points, &plane.normal)
    }

    /// Midpoint of the edge starting at `index`.
    #[must_use]
    pub fn edge_midpoint(&self, index: usize) -> Point3 {
        let a = &self.vertices[index].point;
        let b = &self.vertices[self.next(index)].point;
        nalgebra::center(a, b)
    }
}

impl Index<usize> for Winding {
    type Output = WindingVertex;

    fn index(&self, index: usize) -> &Self::Output {
        &self.vertices[index]
    }
}
