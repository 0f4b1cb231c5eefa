use tracing::debug;

use crate::brush::{Brush, FacePayload};
use crate::config::KernelConfig;
use crate::error::{CsgError, GeometryError, Result};
use crate::math::Plane;

/// The two halves of a split. A half is `None` when the brush has no
/// volume on that side.
#[derive(Debug, Clone, Default)]
pub struct SplitResult {
    /// The part in front of the plane.
    pub front: Option<Brush>,
    /// The part behind the plane.
    pub back: Option<Brush>,
}

/// Splits a brush with a plane, producing up to two brushes.
///
/// Each half is a copy of the brush with one extra face on the split plane,
/// facing away from the half it bounds. The new faces carry `payload`.
pub struct Split<'a> {
    brush: &'a Brush,
    plane: Plane,
    payload: FacePayload,
}

impl<'a> Split<'a> {
    /// Creates a new `Split` operation.
    #[must_use]
    pub fn new(brush: &'a Brush, plane: Plane) -> Self {
        Self {
            brush,
            plane,
            payload: FacePayload::default(),
        }
    }

    /// Sets the payload of the faces created on the split plane.
    #[must_use]
    pub fn with_payload(mut self, payload: FacePayload) -> Self {
        self.payload = payload;
        self
    }

    /// Executes the split.
    ///
    /// A brush lying entirely on one side is returned whole on that side.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidPlane`] for a plane whose normal is
    /// not unit length, [`CsgError::DegenerateInput`] if the brush encloses
    /// no volume, or a capacity error if a half would need too many faces.
    pub fn execute(&self, config: &KernelConfig) -> Result<SplitResult> {
        if !self.plane.is_valid() {
            let n = self.plane.normal;
            return Err(GeometryError::InvalidPlane {
                normal: [n.x, n.y, n.z],
            }
            .into());
        }
        let brush = self.brush.share_faces(config);
        if brush.is_degenerate() {
            return Err(CsgError::DegenerateInput.into());
        }

        let counts = brush.classify_plane(&self.plane);
        if !counts.straddles() {
            debug!(?counts, "split plane misses the brush");
            return Ok(if counts.front > 0 {
                SplitResult {
                    front: Some(brush),
                    back: None,
                }
            } else {
                SplitResult {
                    front: None,
                    back: Some(brush),
                }
            });
        }

        let mut front = brush.clone();
        front.add_plane(self.plane.flipped(), self.payload.clone())?;
        let mut back = brush;
        back.add_plane(self.plane, self.payload.clone())?;

        let front = keep_if_solid(front);
        let back = keep_if_solid(back);
        debug!(
            front = front.is_some(),
            back = back.is_some(),
            "split brush"
        );
        Ok(SplitResult { front, back })
    }
}

fn keep_if_solid(mut half: Brush) -> Option<Brush> {
    half.remove_empty_faces();
    (!half.is_degenerate()).then_some(half)
}
