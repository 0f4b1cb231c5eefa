mod hollow;
mod split;

pub use hollow::{FaceExclusion, Hollow, HollowDirection, HollowStrategy};
pub use split::{Split, SplitResult};
