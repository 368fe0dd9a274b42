// ── Core error types ──
//
// User-facing errors from poolside-core. Command operations either succeed
// or fail with one of these; status observation never errors — it degrades
// to an explicit `PoolStatus::Unreachable` value instead.

use thiserror::Error;

use poolside_bus::BusError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The HEATER feature reflects the heater relay observed on the bus; it
    /// is derived state and cannot be commanded directly.
    #[error("HEATER power state cannot be set directly")]
    HeaterNotSettable,

    /// Transport failure while talking to the pool hardware. Propagated to
    /// the caller of the command that triggered it; best-effort polls
    /// swallow and log these instead.
    #[error(transparent)]
    Bus(#[from] BusError),
}
