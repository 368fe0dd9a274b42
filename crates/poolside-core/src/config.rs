// ── Runtime tuning ──
//
// Timing knobs for a controller instance. Callers construct a
// `ControllerConfig` and hand it in; the core never reads config files.

use std::time::Duration;

/// Configuration for a single [`PoolController`](crate::PoolController).
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// How long the reachability monitor waits for bus traffic before
    /// declaring the hardware unreachable. The hardware broadcasts a system
    /// status every few seconds, so the default of 10s means several missed
    /// broadcasts in a row.
    pub reachability_timeout: Duration,

    /// Interval between recurring clock-set requests once
    /// [`synchronize_clock`](crate::PoolController::synchronize_clock) has
    /// been called. Hourly corrects drift and rides through daylight-saving
    /// transitions.
    pub clock_sync_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            reachability_timeout: Duration::from_secs(10),
            clock_sync_interval: Duration::from_secs(60 * 60),
        }
    }
}
