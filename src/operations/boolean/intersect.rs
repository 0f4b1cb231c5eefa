use tracing::debug;

use crate::brush::Brush;
use crate::config::KernelConfig;
use crate::error::{CsgError, Result};

/// Computes the common volume of two or more brushes.
///
/// Starts from the first brush and adds every face of the others that
/// actually trims what is left.
pub struct Intersect<'a> {
    brushes: Vec<&'a Brush>,
}

impl<'a> Intersect<'a> {
    /// Creates a new `Intersect` operation.
    #[must_use]
    pub fn new(brushes: impl IntoIterator<Item = &'a Brush>) -> Self {
        Self {
            brushes: brushes.into_iter().collect(),
        }
    }

    /// Executes the intersection.
    ///
    /// # Errors
    ///
    /// Returns [`CsgError::TooFewBrushes`] for fewer than two inputs,
    /// [`CsgError::DegenerateInput`] if an input encloses no volume,
    /// [`CsgError::NoContributingFaces`] if the inputs share no volume, or a
    /// capacity error if the result needs too many faces.
    pub fn execute(&self, config: &KernelConfig) -> Result<Brush> {
        let [first, rest @ ..] = self.brushes.as_slice() else {
            return Err(CsgError::TooFewBrushes { needed: 2, got: 0 }.into());
        };
        if rest.is_empty() {
            return Err(CsgError::TooFewBrushes { needed: 2, got: 1 }.into());
        }

        let mut acc = first.share_faces(config);
        let others: Vec<Brush> = rest.iter().map(|b| b.share_faces(config)).collect();
        if acc.is_degenerate() || others.iter().any(Brush::is_degenerate) {
            return Err(CsgError::DegenerateInput.into());
        }

        let mut added = 0;
        for other in &others {
            let brep = other.brep();
            for i in brep.contributing_face_indices() {
                let face = &other.faces()[i];
                if acc.classify_plane(&face.plane()).front > 0 {
                    acc.add_face((**face).clone())?;
                    added += 1;
                }
            }
        }

        acc.remove_empty_faces();
        if !acc.has_contributing_faces() {
            debug!("intersection is empty");
            return Err(CsgError::NoContributingFaces.into());
        }
        debug!(added, faces = acc.face_count(), "intersected brushes");
        Ok(acc)
    }
}
