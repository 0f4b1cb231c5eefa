use crate::brush::Brush;
use crate::error::Result;
use crate::math::{Matrix4, Vector3};

/// Translates a brush by a displacement vector.
pub struct Translate {
    displacement: Vector3,
    preview: bool,
}

impl Translate {
    /// Creates a new `Translate` operation.
    #[must_use]
    pub fn new(displacement: Vector3) -> Self {
        Self {
            displacement,
            preview: false,
        }
    }

    /// Leaves the move on the working planes only, so it can be reverted.
    #[must_use]
    pub fn preview(mut self) -> Self {
        self.preview = true;
        self
    }

    /// Executes the translation, modifying the brush in place.
    ///
    /// # Errors
    ///
    /// Returns an error only if [`Brush::transform`] rejects the matrix.
    pub fn execute(&self, brush: &mut Brush) -> Result<()> {
        brush.transform(&Matrix4::new_translation(&self.displacement))?;
        if !self.preview {
            brush.freeze_transform();
        }
        Ok(())
    }
}
