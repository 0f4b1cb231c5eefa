pub mod brush;
pub mod config;
pub mod error;
pub mod math;
pub mod operations;
pub mod topology;
pub mod winding;

pub use brush::{Brush, BrushId, BrushStore, Face, FacePayload, RebuildStatus};
pub use config::{BrushFormat, KernelConfig};
pub use error::{KernelError, Result};
pub use topology::BRep;

/// Routes `tracing` output to the test harness. Filter with `RUST_LOG`.
#[cfg(test)]
pub(crate) fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
