use std::time::Instant;

use crate::error::Result;

/// Round-trip timers for the remote APIs, in whole milliseconds.
pub trait LatencyProbe {
    fn platform_ping(&self) -> Result<u64>;
    /// `None` when no internal API is configured.
    fn internal_ping(&self) -> Result<Option<u64>>;
}

/// Elapsed time since `started`, truncated to whole milliseconds.
pub fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
