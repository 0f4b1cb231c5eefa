use crate::brush::Brush;
use crate::math::{PlaneSide, Point3};

/// Classification of a point relative to a brush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClassification {
    Inside,
    Outside,
    Boundary,
}

/// Classifies a point as inside, outside, or on the boundary of a brush.
///
/// A convex brush needs no ray casting: the point is outside as soon as it
/// lies in front of one contributing face, on the boundary if it lies on
/// one and in front of none, and inside otherwise. Distances are measured
/// against the configured point tolerance.
pub struct ClassifyPoint<'a> {
    brush: &'a Brush,
    point: Point3,
}

impl<'a> ClassifyPoint<'a> {
    /// Creates a new `ClassifyPoint` query.
    #[must_use]
    pub fn new(brush: &'a Brush, point: Point3) -> Self {
        Self { brush, point }
    }

    /// Executes the query. A degenerate brush contains nothing.
    #[must_use]
    pub fn execute(&self) -> PointClassification {
        let brep = self.brush.brep();
        if brep.is_degenerate() {
            return PointClassification::Outside;
        }
        let epsilon = self.brush.config().point_epsilon;
        let mut on_boundary = false;
        for i in brep.contributing_face_indices() {
            match self.brush.faces()[i].plane().classify(&self.point, epsilon) {
                PlaneSide::Front => return PointClassification::Outside,
                PlaneSide::On => on_boundary = true,
                PlaneSide::Back => {}
            }
        }
        if on_boundary {
            PointClassification::Boundary
        } else {
            PointClassification::Inside
        }
    }
}
