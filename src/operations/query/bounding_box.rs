use crate::brush::Brush;
use crate::error::{GeometryError, Result};
use crate::math::Aabb;

/// Computes the axis-aligned bounding box of a brush.
pub struct BoundingBox<'a> {
    brush: &'a Brush,
}

impl<'a> BoundingBox<'a> {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(brush: &'a Brush) -> Self {
        Self { brush }
    }

    /// Executes the query, returning the AABB of every winding vertex.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the brush encloses no volume.
    pub fn execute(&self) -> Result<Aabb> {
        let brep = self.brush.brep();
        match (brep.degenerate, brep.bounds) {
            (None, Some(bounds)) => Ok(bounds),
            (Some(reason), _) => {
                Err(GeometryError::Degenerate(format!("brush has no bounds: {reason:?}")).into())
            }
            (None, None) => Err(GeometryError::Degenerate("brush has no vertices".into()).into()),
        }
    }
}
