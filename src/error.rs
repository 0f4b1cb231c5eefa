use thiserror::Error;

/// Top-level error type for the brush kernel.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Csg(#[from] CsgError),

    #[error(transparent)]
    Capacity(#[from] CapacityError),
}

/// Errors related to plane and point input.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("invalid plane: normal {normal:?} is not unit length")]
    InvalidPlane { normal: [f64; 3] },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to brush handles and face indices.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("face index {index} out of range for brush with {len} faces")]
    FaceOutOfRange { index: usize, len: usize },
}

/// Reasons a CSG operator produced no result.
///
/// Inputs are never modified when one of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsgError {
    #[error("operation needs at least {needed} brushes, got {got}")]
    TooFewBrushes { needed: usize, got: usize },

    #[error("result would not be convex")]
    NotConvex,

    #[error("coincident faces carry different shaders")]
    ShaderMismatch,

    #[error("too few distinct points for a hull: {0}")]
    TooFewPoints(usize),

    #[error("too few bounding planes for a hull: {0}")]
    TooFewPlanes(usize),

    #[error("convex hull failed: {0}")]
    Hull(String),

    #[error("result has no contributing faces")]
    NoContributingFaces,

    #[error("input brush is degenerate")]
    DegenerateInput,
}

/// Errors raised when a brush would grow past its face budget.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CapacityError {
    #[error("brush would exceed the maximum of {max} faces")]
    TooManyFaces { max: usize },
}

/// Convenience type alias for results using [`KernelError`].
pub type Result<T> = std::result::Result<T, KernelError>;
