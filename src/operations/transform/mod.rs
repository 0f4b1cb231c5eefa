mod general;
mod translate;

pub use general::GeneralTransform;
pub use translate::Translate;
