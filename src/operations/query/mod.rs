mod bounding_box;
mod classify_point;
mod is_valid;
mod volume;

pub use bounding_box::BoundingBox;
pub use classify_point::{ClassifyPoint, PointClassification};
pub use is_valid::IsValid;
pub use volume::Volume;
