mod hull;
mod intersect;
mod merge;
mod subtract;
mod wrap_merge;

pub use hull::{convex_hull, spans_volume, unique_points, HullMesh};
pub use intersect::Intersect;
pub use merge::Merge;
pub use subtract::{Subtract, SubtractOutcome};
pub use wrap_merge::WrapMerge;
