mod builder;
mod face;
mod store;

pub use builder::{build_brep, plane_unique};
pub use face::{Face, FaceDefinition, FacePayload, TextureProjection};
pub use store::{BrushId, BrushStore, UndoSink};

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use tracing::trace;

use crate::config::KernelConfig;
use crate::error::{CapacityError, GeometryError, Result, TopologyError};
use crate::math::{Aabb, Matrix4, Plane, Point3};
use crate::topology::{BRep, DegenerateReason};
use crate::winding::SplitCounts;

/// Where a brush is in its rebuild cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Faces changed since the last rebuild.
    Dirty,
    /// A rebuild is running.
    Building,
    /// The cached B-Rep matches the faces.
    Clean,
    /// The cached B-Rep matches the faces and encloses no volume.
    Degenerate,
}

/// Outcome of [`Brush::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildStatus {
    Clean,
    Degenerate(DegenerateReason),
    /// A rebuild was requested while one was already running and was skipped.
    Deferred,
}

/// The face list of a brush at one point in time.
///
/// Holds shared handles, not copies, so taking one is cheap.
#[derive(Debug, Clone, Default)]
pub struct FaceSnapshot(Vec<Arc<Face>>);

impl FaceSnapshot {
    #[must_use]
    pub fn faces(&self) -> &[Arc<Face>] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A convex solid: the intersection of the back half-spaces of its faces.
///
/// Face order matters; it breaks ties between duplicate planes. The
/// boundary representation is derived lazily: edits only mark the brush
/// dirty and the next query rebuilds it.
#[derive(Debug, Clone)]
pub struct Brush {
    faces: Vec<Arc<Face>>,
    config: KernelConfig,
    state: Cell<BuildState>,
    brep: RefCell<Option<Arc<BRep>>>,
}

impl Brush {
    /// Creates a brush with no faces.
    #[must_use]
    pub fn new(config: &KernelConfig) -> Self {
        Self {
            faces: Vec::new(),
            config: config.clone(),
            state: Cell::new(BuildState::Dirty),
            brep: RefCell::new(None),
        }
    }

    /// Creates a brush from faces in order.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::TooManyFaces`] if there are more faces than
    /// the configuration allows.
    pub fn from_faces(faces: impl IntoIterator<Item = Face>, config: &KernelConfig) -> Result<Self> {
        let mut brush = Self::new(config);
        for face in faces {
            brush.add_face(face)?;
        }
        Ok(brush)
    }

    /// Creates a brush from planes that all share one payload.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::TooManyFaces`] if there are more planes than
    /// the configuration allows.
    pub fn from_planes(
        planes: impl IntoIterator<Item = Plane>,
        payload: &FacePayload,
        config: &KernelConfig,
    ) -> Result<Self> {
        let faces = planes
            .into_iter()
            .map(|plane| Face::from_plane(plane, payload.clone(), config.format));
        Self::from_faces(faces, config)
    }

    /// A brush sharing this brush's faces under `config`.
    ///
    /// Keeps the cached B-Rep when the configuration is unchanged.
    #[must_use]
    pub fn share_faces(&self, config: &KernelConfig) -> Self {
        if self.config == *config {
            return self.clone();
        }
        Self {
            faces: self.faces.clone(),
            ..Self::new(config)
        }
    }

    #[must_use]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    #[must_use]
    pub fn faces(&self) -> &[Arc<Face>] {
        &self.faces
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns the face at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::FaceOutOfRange`] for a bad index.
    pub fn face(&self, index: usize) -> Result<&Face> {
        self.faces
            .get(index)
            .map(|face| face.as_ref())
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Working planes of all faces, in order.
    #[must_use]
    pub fn planes(&self) -> Vec<Plane> {
        self.faces.iter().map(|face| face.plane()).collect()
    }

    #[must_use]
    pub fn state(&self) -> BuildState {
        self.state.get()
    }

    // --- Editing ---

    /// Appends a face and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::TooManyFaces`] when the brush is full; the
    /// brush is left unchanged.
    pub fn add_face(&mut self, face: Face) -> Result<usize> {
        if self.faces.len() >= self.config.max_faces {
            return Err(CapacityError::TooManyFaces {
                max: self.config.max_faces,
            }
            .into());
        }
        self.faces.push(Arc::new(face));
        self.mark_dirty();
        Ok(self.faces.len() - 1)
    }

    /// Appends a face for `plane` in the configured format.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::TooManyFaces`] when the brush is full.
    pub fn add_plane(&mut self, plane: Plane, payload: FacePayload) -> Result<usize> {
        let face = Face::from_plane(plane, payload, self.config.format);
        self.add_face(face)
    }

    /// Appends a face through three points, counter-clockwise from outside.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::TooManyFaces`] when the brush is full.
    pub fn add_face_points(&mut self, points: [Point3; 3], payload: FacePayload) -> Result<usize> {
        self.add_face(Face::from_points(points, payload))
    }

    /// Removes and returns the face at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::FaceOutOfRange`] for a bad index.
    pub fn remove_face(&mut self, index: usize) -> Result<Face> {
        if index >= self.faces.len() {
            return Err(self.out_of_range(index));
        }
        let face = self.faces.remove(index);
        self.mark_dirty();
        Ok(Arc::try_unwrap(face).unwrap_or_else(|shared| (*shared).clone()))
    }

    /// Mutable access to one face; marks the brush dirty.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::FaceOutOfRange`] for a bad index.
    pub fn face_mut(&mut self, index: usize) -> Result<&mut Face> {
        if index >= self.faces.len() {
            return Err(self.out_of_range(index));
        }
        self.mark_dirty();
        Ok(Arc::make_mut(&mut self.faces[index]))
    }

    /// Replaces the plane of one face.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::FaceOutOfRange`] for a bad index.
    pub fn set_face_plane(&mut self, index: usize, plane: Plane) -> Result<()> {
        self.face_mut(index)?.set_plane(plane);
        Ok(())
    }

    /// Drops every face that does not contribute a winding and returns how
    /// many were removed.
    pub fn remove_empty_faces(&mut self) -> usize {
        let brep = self.brep();
        let before = self.faces.len();
        let mut index = 0;
        self.faces.retain(|_| {
            let keep = brep
                .windings
                .get(index)
                .is_some_and(crate::winding::Winding::contributes);
            index += 1;
            keep
        });
        let removed = before - self.faces.len();
        if removed > 0 {
            trace!(removed, "removed empty faces");
            self.mark_dirty();
        }
        removed
    }

    /// Shallow copy of the face list for an undo collaborator.
    #[must_use]
    pub fn snapshot(&self) -> FaceSnapshot {
        FaceSnapshot(self.faces.clone())
    }

    /// Reinstates a face list taken with [`Brush::snapshot`].
    pub fn restore(&mut self, snapshot: FaceSnapshot) {
        self.faces = snapshot.0;
        self.mark_dirty();
    }

    // --- Transforms ---

    /// Applies `matrix` to the working plane of every face.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for a singular matrix; no face
    /// is changed.
    pub fn transform(&mut self, matrix: &Matrix4) -> Result<()> {
        let det = matrix.fixed_view::<3, 3>(0, 0).into_owned().determinant();
        if det.abs() < f64::EPSILON {
            return Err(GeometryError::Degenerate("singular transform".into()).into());
        }
        for face in &mut self.faces {
            Arc::make_mut(face).transform(matrix);
        }
        self.mark_dirty();
        Ok(())
    }

    /// `true` if any face has an uncommitted transform.
    #[must_use]
    pub fn is_transformed(&self) -> bool {
        self.faces.iter().any(|face| face.is_transformed())
    }

    /// Discards uncommitted transforms.
    pub fn revert_transform(&mut self) {
        if !self.is_transformed() {
            return;
        }
        for face in &mut self.faces {
            Arc::make_mut(face).revert_transform();
        }
        self.mark_dirty();
    }

    /// Commits transforms on every face.
    pub fn freeze_transform(&mut self) {
        for face in &mut self.faces {
            if face.is_transformed() {
                Arc::make_mut(face).freeze_transform();
            }
        }
    }

    // --- Derived geometry ---

    /// Rebuilds the B-Rep if the faces changed since the last rebuild.
    pub fn evaluate(&self) -> RebuildStatus {
        match self.state.get() {
            BuildState::Building => return RebuildStatus::Deferred,
            BuildState::Clean | BuildState::Degenerate => return self.cached_status(),
            BuildState::Dirty => {}
        }

        self.state.set(BuildState::Building);
        let brep = build_brep(&self.planes(), &self.config);
        let state = if brep.is_degenerate() {
            BuildState::Degenerate
        } else {
            BuildState::Clean
        };
        *self.brep.borrow_mut() = Some(Arc::new(brep));
        self.state.set(state);
        self.cached_status()
    }

    /// The current boundary representation, rebuilt if needed.
    #[must_use]
    pub fn brep(&self) -> Arc<BRep> {
        self.evaluate();
        self.brep.borrow().clone().unwrap_or_default()
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.brep().is_degenerate()
    }

    /// Bounds of all winding vertices; `None` for a degenerate brush.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        self.brep().bounds
    }

    /// `true` if any face has a winding with area.
    #[must_use]
    pub fn has_contributing_faces(&self) -> bool {
        self.contributing_face_count() > 0
    }

    #[must_use]
    pub fn contributing_face_count(&self) -> usize {
        self.brep().contributing_faces()
    }

    /// Counts every winding vertex on each side of `plane`.
    #[must_use]
    pub fn classify_plane(&self, plane: &Plane) -> SplitCounts {
        let brep = self.brep();
        let mut counts = SplitCounts::default();
        for winding in &brep.windings {
            counts += winding.classify_plane(plane, self.config.clip_epsilon);
        }
        counts
    }

    /// `true` if no winding vertex lies strictly in front of `plane` (or
    /// strictly behind it, with `flipped`).
    #[must_use]
    pub fn test_plane(&self, plane: &Plane, flipped: bool) -> bool {
        self.brep()
            .windings
            .iter()
            .all(|winding| winding.test_plane(plane, flipped, self.config.clip_epsilon))
    }

    fn cached_status(&self) -> RebuildStatus {
        match self.brep.borrow().as_ref().and_then(|brep| brep.degenerate) {
            Some(reason) => RebuildStatus::Degenerate(reason),
            None => RebuildStatus::Clean,
        }
    }

    fn mark_dirty(&mut self) {
        self.state.set(BuildState::Dirty);
        *self.brep.get_mut() = None;
    }

    fn out_of_range(&self, index: usize) -> crate::error::KernelError {
        TopologyError::FaceOutOfRange {
            index,
            len: self.faces.len(),
        }
        .into()
    }

    #[cfg(test)]
    pub(crate) fn force_state(&self, state: BuildState) {
        self.state.set(state);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::KernelError;
    use crate::math::Vector3;
    use approx::assert_abs_diff_eq;

    fn cube(half: f64) -> Brush {
        let planes = [
            Vector3::x(),
            -Vector3::x(),
            Vector3::y(),
            -Vector3::y(),
            Vector3::z(),
            -Vector3::z(),
        ]
        .map(|normal| Plane::new(normal, half));
        Brush::from_planes(planes, &FacePayload::default(), &KernelConfig::default()).unwrap()
    }

    // ── state machine ──

    #[test]
    fn rebuild_is_lazy() {
        let brush = cube(1.0);
        assert_eq!(brush.state(), BuildState::Dirty);
        assert_eq!(brush.evaluate(), RebuildStatus::Clean);
        assert_eq!(brush.state(), BuildState::Clean);
        let first = brush.brep();
        let second = brush.brep();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn edits_mark_dirty() {
        let mut brush = cube(1.0);
        brush.evaluate();
        brush.set_face_plane(0, Plane::new(Vector3::x(), 2.0)).unwrap();
        assert_eq!(brush.state(), BuildState::Dirty);
        assert_abs_diff_eq!(brush.bounds().unwrap().max.x, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_is_a_resting_state() {
        let mut brush = cube(1.0);
        brush.remove_face(5).unwrap();
        assert!(matches!(brush.evaluate(), RebuildStatus::Degenerate(_)));
        assert_eq!(brush.state(), BuildState::Degenerate);
        assert!(brush.bounds().is_none());
        brush
            .add_plane(Plane::new(-Vector3::z(), 1.0), FacePayload::default())
            .unwrap();
        assert_eq!(brush.state(), BuildState::Dirty);
        assert_eq!(brush.evaluate(), RebuildStatus::Clean);
    }

    #[test]
    fn nested_rebuild_is_deferred() {
        let brush = cube(1.0);
        brush.force_state(BuildState::Building);
        assert_eq!(brush.evaluate(), RebuildStatus::Deferred);
        assert!(brush.brep().windings.is_empty());
        brush.force_state(BuildState::Dirty);
        assert_eq!(brush.evaluate(), RebuildStatus::Clean);
    }

    // ── editing ──

    #[test]
    fn capacity_is_enforced() {
        let config = KernelConfig::default().with_max_faces(6);
        let faces = cube(1.0).faces().iter().map(|f| (**f).clone()).collect::<Vec<_>>();
        let mut brush = Brush::from_faces(faces, &config).unwrap();
        let err = brush
            .add_plane(Plane::new(Vector3::x(), 0.5), FacePayload::default())
            .unwrap_err();
        assert!(matches!(
            err,
            KernelError::Capacity(CapacityError::TooManyFaces { max: 6 })
        ));
        assert_eq!(brush.face_count(), 6);
    }

    #[test]
    fn bad_face_index_is_reported() {
        let mut brush = cube(1.0);
        assert!(matches!(
            brush.remove_face(9),
            Err(KernelError::Topology(TopologyError::FaceOutOfRange { index: 9, len: 6 }))
        ));
        assert!(brush.face(6).is_err());
    }

    #[test]
    fn empty_faces_are_removed() {
        let mut brush = cube(1.0);
        brush
            .add_plane(Plane::new(Vector3::x(), 5.0), FacePayload::default())
            .unwrap();
        brush
            .add_plane(Plane::new(Vector3::y(), 1.0), FacePayload::default())
            .unwrap();
        assert_eq!(brush.contributing_face_count(), 6);
        assert_eq!(brush.remove_empty_faces(), 2);
        assert_eq!(brush.face_count(), 6);
        assert!(brush.has_contributing_faces());
    }

    #[test]
    fn face_from_points_bounds_the_brush() {
        let mut brush = cube(1.0);
        // Counter-clockwise seen from +X, so the face keeps x <= 0.5.
        brush
            .add_face_points(
                [
                    Point3::new(0.5, 0.0, 0.0),
                    Point3::new(0.5, 1.0, 0.0),
                    Point3::new(0.5, 0.0, 1.0),
                ],
                FacePayload::with_shader("tools/clip"),
            )
            .unwrap();
        assert_abs_diff_eq!(brush.bounds().unwrap().max.x, 0.5, epsilon = 1e-9);
        assert_eq!(brush.remove_empty_faces(), 1);
        assert_eq!(brush.face(5).unwrap().payload().shader, "tools/clip");
    }

    #[test]
    fn snapshot_restores_previous_faces() {
        let mut brush = cube(1.0);
        let before = brush.snapshot();
        brush.set_face_plane(0, Plane::new(Vector3::x(), 4.0)).unwrap();
        assert_abs_diff_eq!(brush.bounds().unwrap().max.x, 4.0, epsilon = 1e-9);
        brush.restore(before);
        assert_abs_diff_eq!(brush.bounds().unwrap().max.x, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn snapshot_shares_faces() {
        let brush = cube(1.0);
        let snapshot = brush.snapshot();
        assert_eq!(snapshot.len(), 6);
        assert!(Arc::ptr_eq(&snapshot.faces()[0], &brush.faces()[0]));
    }

    #[test]
    fn retexturing_copies_only_the_edited_face() {
        let mut brush = cube(1.0);
        let snapshot = brush.snapshot();
        brush.face_mut(0).unwrap().payload_mut().shader = "base/metal".into();
        assert_eq!(brush.faces()[0].payload().shader, "base/metal");
        assert!(snapshot.faces()[0].payload().shader.is_empty());
        assert!(!Arc::ptr_eq(&snapshot.faces()[0], &brush.faces()[0]));
        assert!(Arc::ptr_eq(&snapshot.faces()[1], &brush.faces()[1]));
    }

    // ── transforms ──

    #[test]
    fn transform_then_revert() {
        let mut brush = cube(1.0);
        brush
            .transform(&Matrix4::new_translation(&Vector3::new(0.0, 0.0, 3.0)))
            .unwrap();
        assert!(brush.is_transformed());
        assert_abs_diff_eq!(brush.bounds().unwrap().min.z, 2.0, epsilon = 1e-9);
        brush.revert_transform();
        assert_abs_diff_eq!(brush.bounds().unwrap().min.z, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn singular_transform_leaves_brush_alone() {
        let mut brush = cube(1.0);
        let flatten = Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, 0.0));
        assert!(brush.transform(&flatten).is_err());
        assert!(!brush.is_transformed());
    }

    // ── classification ──

    #[test]
    fn classify_plane_counts_winding_vertices() {
        let brush = cube(1.0);
        let counts = brush.classify_plane(&Plane::new(Vector3::x(), 0.0));
        // Each corner sits in three windings.
        assert_eq!(counts.front, 12);
        assert_eq!(counts.back, 12);
        assert!(brush.test_plane(&Plane::new(Vector3::x(), 1.0), false));
        assert!(!brush.test_plane(&Plane::new(Vector3::x(), 0.0), false));
    }
}
