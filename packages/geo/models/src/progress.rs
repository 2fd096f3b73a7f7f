//! Progress of the per-point lookup stages.
//!
//! Street and place resolution each walk the point list once, hitting the
//! cache or a remote service for every point. They report through
//! [`ProgressCallback`]; the binary draws `indicatif` bars and everything
//! else passes [`null_progress`].

use std::sync::Arc;

/// Observer for a stage that looks up one point at a time.
///
/// Shared across concurrently running lookups, hence `Send + Sync`.
pub trait ProgressCallback: Send + Sync {
    /// A stage named `stage` is about to look up `points` points.
    fn begin(&self, stage: &str, points: u64);

    /// One point is done, whether it came from the cache, the service, or
    /// produced nothing.
    fn point_done(&self);

    /// The stage is over. `summary` says what it found.
    fn finish(&self, summary: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn begin(&self, _stage: &str, _points: u64) {}
    fn point_done(&self) {}
    fn finish(&self, _summary: String) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
