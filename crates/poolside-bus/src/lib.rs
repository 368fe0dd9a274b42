//! Hardware-binding contract for the poolside controller.
//!
//! A pool system's proprietary equipment (pump, heater, valves, lighting)
//! shares a single half-duplex serial bus. This crate defines the boundary
//! the controller core programs against, without implementing the physical
//! transport:
//!
//! - **[`Bus`]** — the access contract: a fan-out subscription feed for
//!   inbound traffic plus a synchronous send/receive primitive for
//!   request/response exchanges on the same channel.
//! - **[`BusFeed`]** — a single consumer's inbound message queue with a
//!   bounded wait, used by the core's reachability monitor.
//! - **[`Message`]** — the closed set of message kinds the controller
//!   consumes and produces. Wire framing and checksums are an
//!   implementation concern of the concrete bus, not part of this contract.
//! - **[`testing::FakeBus`]** — a scripted in-memory bus for exercising the
//!   controller without hardware.

pub mod bus;
pub mod error;
pub mod message;
pub mod testing;
pub mod types;

pub use bus::{Bus, BusFeed};
pub use error::BusError;
pub use message::{HeatStatus, Message, MessageKind, PumpStatus, SystemStatus};
pub use types::{Circuit, CircuitPowerState, CircuitSet, HeatMode};
