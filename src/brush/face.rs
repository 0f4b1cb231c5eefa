use crate::config::BrushFormat;
use crate::math::{Matrix4, Plane, Point3};

/// Texture projection carried through edits and CSG untouched.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextureProjection {
    pub shift: [f64; 2],
    pub rotate: f64,
    pub scale: [f64; 2],
}

impl Default for TextureProjection {
    fn default() -> Self {
        Self {
            shift: [0.0, 0.0],
            rotate: 0.0,
            scale: [0.5, 0.5],
        }
    }
}

/// Per-face data the kernel stores but never interprets.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FacePayload {
    pub shader: String,
    pub content_flags: u32,
    pub surface_flags: u32,
    pub value: i32,
    pub projection: TextureProjection,
}

impl FacePayload {
    /// Payload with the given shader and default flags.
    #[must_use]
    pub fn with_shader(shader: impl Into<String>) -> Self {
        Self {
            shader: shader.into(),
            ..Self::default()
        }
    }
}

/// How a face records its plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FaceDefinition {
    /// Three points, counter-clockwise seen from the front.
    Points([Point3; 3]),
    /// Plane equation.
    Equation(Plane),
}

impl FaceDefinition {
    /// Definition of `plane` in the given format.
    #[must_use]
    pub fn for_plane(plane: &Plane, format: BrushFormat) -> Self {
        match format {
            BrushFormat::Doom3 => Self::Equation(*plane),
            BrushFormat::Quake => {
                if !plane.is_valid() {
                    return Self::Equation(*plane);
                }
                let (u, v) = plane.basis();
                let origin = plane.origin();
                Self::Points([origin, origin + u * 64.0, origin + v * 64.0])
            }
        }
    }

    /// The plane this definition describes.
    #[must_use]
    pub fn plane(&self) -> Plane {
        match self {
            Self::Points([p0, p1, p2]) => Plane::for_points(p0, p1, p2),
            Self::Equation(plane) => *plane,
        }
    }

    /// Reverses the facing direction.
    #[must_use]
    pub fn flipped(&self) -> Self {
        match self {
            Self::Points([p0, p1, p2]) => Self::Points([*p0, *p2, *p1]),
            Self::Equation(plane) => Self::Equation(plane.flipped()),
        }
    }

    /// Moves the plane by `amount` along its normal.
    #[must_use]
    pub fn offset(&self, amount: f64) -> Self {
        match self {
            Self::Points(points) => {
                let shift = self.plane().normal * amount;
                Self::Points(points.map(|p| p + shift))
            }
            Self::Equation(plane) => Self::Equation(plane.offset(amount)),
        }
    }

    /// Applies an affine transform. `None` if the matrix is singular.
    #[must_use]
    pub fn transformed(&self, matrix: &Matrix4) -> Option<Self> {
        match self {
            Self::Points(points) => {
                let linear = matrix.fixed_view::<3, 3>(0, 0).into_owned();
                let det = linear.determinant();
                if det.abs() < f64::EPSILON {
                    return None;
                }
                let [p0, p1, p2] = points.map(|p| matrix.transform_point(&p));
                // A mirroring transform reverses the point order.
                if det < 0.0 {
                    Some(Self::Points([p0, p2, p1]))
                } else {
                    Some(Self::Points([p0, p1, p2]))
                }
            }
            Self::Equation(plane) => plane.transformed(matrix).map(Self::Equation),
        }
    }
}

/// One face of a brush.
///
/// `committed` is the definition as last saved; `working` is the copy
/// edits are applied to and the one the B-Rep is built from, so an edit can
/// be previewed and then either frozen or reverted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Face {
    committed: FaceDefinition,
    working: FaceDefinition,
    payload: FacePayload,
}

impl Face {
    /// Creates a face from a definition.
    #[must_use]
    pub fn new(definition: FaceDefinition, payload: FacePayload) -> Self {
        Self {
            committed: definition,
            working: definition,
            payload,
        }
    }

    /// Creates a face from a plane, stored in the given format.
    #[must_use]
    pub fn from_plane(plane: Plane, payload: FacePayload, format: BrushFormat) -> Self {
        Self::new(FaceDefinition::for_plane(&plane, format), payload)
    }

    /// Creates a face from three points.
    #[must_use]
    pub fn from_points(points: [Point3; 3], payload: FacePayload) -> Self {
        Self::new(FaceDefinition::Points(points), payload)
    }

    /// The working plane.
    #[must_use]
    pub fn plane(&self) -> Plane {
        self.working.plane()
    }

    /// The last committed plane.
    #[must_use]
    pub fn committed_plane(&self) -> Plane {
        self.committed.plane()
    }

    #[must_use]
    pub fn definition(&self) -> &FaceDefinition {
        &self.working
    }

    #[must_use]
    pub fn payload(&self) -> &FacePayload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut FacePayload {
        &mut self.payload
    }

    /// `true` if the working plane differs from the committed one.
    #[must_use]
    pub fn is_transformed(&self) -> bool {
        self.working != self.committed
    }

    /// Replaces both definitions with `plane`, keeping the definition kind.
    pub fn set_plane(&mut self, plane: Plane) {
        let format = match self.working {
            FaceDefinition::Points(_) => BrushFormat::Quake,
            FaceDefinition::Equation(_) => BrushFormat::Doom3,
        };
        self.working = FaceDefinition::for_plane(&plane, format);
        self.committed = self.working;
    }

    /// Applies `matrix` to the working definition.
    ///
    /// Returns `false` and leaves the face untouched for a singular matrix.
    pub fn transform(&mut self, matrix: &Matrix4) -> bool {
        match self.working.transformed(matrix) {
            Some(definition) => {
                self.working = definition;
                true
            }
            None => false,
        }
    }

    /// Discards working edits.
    pub fn revert_transform(&mut self) {
        self.working = self.committed;
    }

    /// Commits working edits.
    pub fn freeze_transform(&mut self) {
        self.committed = self.working;
    }

    /// Reverses the face so it bounds the opposite half-space.
    pub fn flip(&mut self) {
        self.working = self.working.flipped();
        self.committed = self.committed.flipped();
    }

    /// Moves the face along its normal; positive grows the brush.
    pub fn offset(&mut self, amount: f64) {
        self.working = self.working.offset(amount);
        self.committed = self.committed.offset(amount);
    }

    /// A copy facing the other way.
    #[must_use]
    pub fn flipped(&self) -> Self {
        let mut face = self.clone();
        face.flip();
        face
    }

    /// A copy moved along its normal.
    #[must_use]
    pub fn offset_by(&self, amount: f64) -> Self {
        let mut face = self.clone();
        face.offset(amount);
        face
    }
}
