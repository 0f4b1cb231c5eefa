mod aabb;
mod plane;
pub mod polygon_3d;

pub use aabb::Aabb;
pub use plane::{Plane, PlaneSide};

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Tolerance used to decide whether a plane normal is unit length.
pub const NORMAL_LENGTH_TOLERANCE: f64 = 0.01;

/// Coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index of this axis.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// The axis along which `v` has its largest absolute component.
    ///
    /// Ties resolve towards the earlier axis.
    #[must_use]
    pub fn dominant(v: &Vector3) -> Self {
        let (x, y, z) = (v.x.abs(), v.y.abs(), v.z.abs());
        if x >= y && x >= z {
            Self::X
        } else if y >= z {
            Self::Y
        } else {
            Self::Z
        }
    }
}
