use crate::math::Plane;

/// How brush faces record their defining plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BrushFormat {
    /// Faces keep three defining points; the plane is derived from them.
    #[default]
    Quake,
    /// Faces keep the plane equation directly.
    Doom3,
}

/// Numeric tolerances and limits shared by the builder and the CSG operators.
///
/// Passed explicitly into every call instead of living in global state.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KernelConfig {
    /// Face definition format for newly created faces.
    pub format: BrushFormat,
    /// Maximum number of faces a brush may carry.
    pub max_faces: usize,
    /// Largest coordinate a brush vertex may reach.
    pub max_world_coord: f64,
    /// Per-component tolerance when comparing plane normals.
    pub plane_normal_epsilon: f64,
    /// Tolerance when comparing plane distances.
    pub plane_dist_epsilon: f64,
    /// Tolerance for classifying winding vertices while clipping and splitting.
    pub clip_epsilon: f64,
    /// Tolerance for classifying a single query point against a plane.
    pub point_epsilon: f64,
    /// Edges shorter than this are collapsed by the repair pass.
    pub degenerate_edge_epsilon: f64,
    /// Points closer than this are merged before hull construction.
    pub hull_unique_epsilon: f64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            format: BrushFormat::Quake,
            max_faces: 1024,
            max_world_coord: 65536.0,
            plane_normal_epsilon: 1e-4,
            plane_dist_epsilon: 2e-2,
            clip_epsilon: 1.0 / 4096.0,
            point_epsilon: 1.0 / 65536.0,
            degenerate_edge_epsilon: 1.0 / 4096.0,
            hull_unique_epsilon: 1e-3,
        }
    }
}

impl KernelConfig {
    /// Creates a configuration with default tolerances.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the face definition format.
    #[must_use]
    pub fn with_format(mut self, format: BrushFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the maximum face count per brush.
    #[must_use]
    pub fn with_max_faces(mut self, max_faces: usize) -> Self {
        self.max_faces = max_faces;
        self
    }

    /// Sets the world extent.
    #[must_use]
    pub fn with_max_world_coord(mut self, max_world_coord: f64) -> Self {
        self.max_world_coord = max_world_coord;
        self
    }

    /// Sets the clip classification tolerance.
    #[must_use]
    pub fn with_clip_epsilon(mut self, epsilon: f64) -> Self {
        self.clip_epsilon = epsilon;
        self
    }

    /// Sets the point classification tolerance.
    #[must_use]
    pub fn with_point_epsilon(mut self, epsilon: f64) -> Self {
        self.point_epsilon = epsilon;
        self
    }

    /// Half-size of the square seeded for every face before clipping.
    #[must_use]
    pub fn infinite_extent(&self) -> f64 {
        self.max_world_coord * 8.0
    }

    /// Plane equality using the configured normal and distance tolerances.
    #[must_use]
    pub fn planes_equal(&self, a: &Plane, b: &Plane) -> bool {
        a.equals(b, self.plane_normal_epsilon, self.plane_dist_epsilon)
    }

    /// Plane opposition using the configured normal and distance tolerances.
    #[must_use]
    pub fn planes_opposing(&self, a: &Plane, b: &Plane) -> bool {
        a.opposes(b, self.plane_normal_epsilon, self.plane_dist_epsilon)
    }
}
