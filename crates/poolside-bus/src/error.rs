use thiserror::Error;

/// Top-level error type for bus implementations.
///
/// Covers the failure modes a concrete transport can surface to the core:
/// I/O on the serial line and loss of the channel itself. Protocol-level
/// noise (collisions, mismatched responses) is *not* an error — the core
/// models it as a recoverable condition and retries.
#[derive(Debug, Error)]
pub enum BusError {
    /// I/O failure on the underlying serial line.
    #[error("bus I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bus has been torn down; no further traffic is possible.
    #[error("bus closed")]
    Closed,
}
