use crate::brush::Brush;
use crate::error::Result;
use crate::math::Matrix4;

/// Applies an arbitrary affine 4x4 matrix to a brush.
///
/// Quake-format faces transform their three defining points; Doom3-format
/// faces transform the plane equation through the inverse transpose. A
/// mirroring matrix keeps every face facing outward.
pub struct GeneralTransform {
    matrix: Matrix4,
    preview: bool,
}

impl GeneralTransform {
    /// Creates a new `GeneralTransform` operation.
    #[must_use]
    pub fn new(matrix: Matrix4) -> Self {
        Self {
            matrix,
            preview: false,
        }
    }

    /// Leaves the transform on the working planes only, so it can be
    /// reverted.
    #[must_use]
    pub fn preview(mut self) -> Self {
        self.preview = true;
        self
    }

    /// Executes the transformation, modifying the brush in place.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GeometryError::Degenerate`] if the linear
    /// part of the matrix is singular; the brush is left unchanged.
    pub fn execute(&self, brush: &mut Brush) -> Result<()> {
        brush.transform(&self.matrix)?;
        if !self.preview {
            brush.freeze_transform();
        }
        Ok(())
    }
}
