use crate::brush::{Brush, FacePayload};
use crate::config::KernelConfig;
use crate::error::{GeometryError, Result};
use crate::math::{Plane, Point3, Vector3};

/// Creates an axis-aligned box brush from two corner points.
pub struct MakeBox {
    min_corner: Point3,
    max_corner: Point3,
    payload: FacePayload,
}

impl MakeBox {
    /// Creates a new `MakeBox` operation.
    #[must_use]
    pub fn new(min_corner: Point3, max_corner: Point3) -> Self {
        Self {
            min_corner,
            max_corner,
            payload: FacePayload::default(),
        }
    }

    /// Sets the payload given to all six faces.
    #[must_use]
    pub fn with_payload(mut self, payload: FacePayload) -> Self {
        self.payload = payload;
        self
    }

    /// Executes the operation, returning a six-face brush.
    ///
    /// Faces come in the order -X, +X, -Y, +Y, -Z, +Z.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] unless `max_corner` exceeds
    /// `min_corner` on every axis.
    pub fn execute(&self, config: &KernelConfig) -> Result<Brush> {
        let (min, max) = (&self.min_corner, &self.max_corner);
        if (0..3).any(|i| max[i] - min[i] <= config.point_epsilon) {
            return Err(GeometryError::InvalidInput(format!(
                "box corners {min:?} and {max:?} do not span a volume"
            ))
            .into());
        }
        let planes = [
            Plane::new(-Vector3::x(), -min.x),
            Plane::new(Vector3::x(), max.x),
            Plane::new(-Vector3::y(), -min.y),
            Plane::new(Vector3::y(), max.y),
            Plane::new(-Vector3::z(), -min.z),
            Plane::new(Vector3::z(), max.z),
        ];
        Brush::from_planes(planes, &self.payload, config)
    }
}
