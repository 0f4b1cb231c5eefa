//! Operations on brushes, one struct per operation.
//!
//! Every operation is built with `new(..)`, configured with `with_*`
//! setters and run with `execute(..)`. Operations that produce brushes
//! never modify their inputs; committing the results to a scene goes
//! through [`crate::brush::BrushStore::replace`].

pub mod boolean;
pub mod creation;
pub mod modification;
pub mod query;
pub mod transform;
