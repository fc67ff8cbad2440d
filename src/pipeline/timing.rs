//! Scoped stage timing

use std::time::Instant;
use tracing::{debug, info};

/// Logs a stage's elapsed time exactly once when dropped.
///
/// Bind it to a scope variable at the top of a stage; the duration line is
/// emitted on every exit path, early `?` returns included.
pub struct StageTimer {
    stage: &'static str,
    start: Instant,
}

impl StageTimer {
    /// Start timing a named stage
    pub fn start(stage: &'static str) -> Self {
        debug!(stage, "stage started");
        Self {
            stage,
            start: Instant::now(),
        }
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        info!(
            stage = self.stage,
            elapsed_ms = self.start.elapsed().as_millis() as u64,
            "stage finished"
        );
    }
}
