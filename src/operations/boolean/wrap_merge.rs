use tracing::debug;

use crate::brush::{Brush, Face, FacePayload};
use crate::config::KernelConfig;
use crate::error::{CsgError, Result};
use crate::math::{PlaneSide, Point3};

use super::hull::{convex_hull, unique_points};

/// Wraps brushes, and optionally extra points, in their convex hull.
///
/// Hull facets become faces. A facet lying on a face of one of the inputs
/// takes that face, so its payload survives; other facets get the default
/// payload.
pub struct WrapMerge<'a> {
    brushes: Vec<&'a Brush>,
    points: Vec<Point3>,
    payload: FacePayload,
}

impl<'a> WrapMerge<'a> {
    /// Creates a new `WrapMerge` operation.
    #[must_use]
    pub fn new(brushes: impl IntoIterator<Item = &'a Brush>) -> Self {
        Self {
            brushes: brushes.into_iter().collect(),
            points: Vec::new(),
            payload: FacePayload::default(),
        }
    }

    /// Adds points the hull must enclose besides the brush vertices.
    #[must_use]
    pub fn with_points(mut self, points: impl IntoIterator<Item = Point3>) -> Self {
        self.points.extend(points);
        self
    }

    /// Sets the payload for facets that match no input face.
    #[must_use]
    pub fn with_payload(mut self, payload: FacePayload) -> Self {
        self.payload = payload;
        self
    }

    /// Executes the wrap.
    ///
    /// # Errors
    ///
    /// - [`CsgError::TooFewPoints`] for fewer than four distinct points.
    /// - [`CsgError::Hull`] if the points are coplanar.
    /// - [`CsgError::TooFewPlanes`] if fewer than four bounding planes
    ///   survive.
    /// - [`CsgError::NoContributingFaces`] if the wrapped brush is empty.
    /// - A capacity error if the hull has too many faces.
    pub fn execute(&self, config: &KernelConfig) -> Result<Brush> {
        let inputs: Vec<Brush> = self.brushes.iter().map(|b| b.share_faces(config)).collect();
        let mut cloud = Vec::new();
        for input in &inputs {
            cloud.extend(input.brep().vertices.iter().copied());
        }
        cloud.extend(self.points.iter().copied());
        let points = unique_points(cloud, config.hull_unique_epsilon);
        if points.len() < 4 {
            return Err(CsgError::TooFewPoints(points.len()).into());
        }

        let hull = convex_hull(&points, config.hull_unique_epsilon)?;
        let mut planes = Vec::new();
        for plane in hull.planes() {
            if !plane.is_valid() {
                continue;
            }
            let side = |wanted| {
                points
                    .iter()
                    .any(|p| plane.classify(p, config.clip_epsilon) == wanted)
            };
            let plane = match (side(PlaneSide::Front), side(PlaneSide::Back)) {
                (false, _) => plane,
                (true, false) => plane.flipped(),
                (true, true) => continue,
            };
            if !planes.iter().any(|kept| config.planes_equal(kept, &plane)) {
                planes.push(plane);
            }
        }
        if planes.len() < 4 {
            return Err(CsgError::TooFewPlanes(planes.len()).into());
        }

        let faces = planes.iter().map(|plane| {
            inputs
                .iter()
                .flat_map(|input| input.faces().iter())
                .find(|face| config.planes_equal(&face.plane(), plane))
                .map_or_else(
                    || Face::from_plane(*plane, self.payload.clone(), config.format),
                    |face| (**face).clone(),
                )
        });
        let mut wrapped = Brush::from_faces(faces, config)?;
        wrapped.remove_empty_faces();
        if !wrapped.has_contributing_faces() {
            return Err(CsgError::NoContributingFaces.into());
        }
        debug!(
            points = points.len(),
            facets = hull.triangles.len(),
            faces = wrapped.face_count(),
            "wrapped brushes in hull"
        );
        Ok(wrapped)
    }
}
