//! Supervisory controller for a residential pool/spa automation system.
//!
//! The hardware broadcasts status messages on a shared half-duplex serial
//! bus (abstracted by `poolside-bus`); this crate turns that lossy,
//! asynchronous stream into a consistent, observable view of the pool and
//! layers a synchronous command protocol on top of the same channel:
//!
//! - **[`PoolController`]** — Central façade. Construction spawns the
//!   reachability monitor task; callers issue commands
//!   ([`set_feature_power`](PoolController::set_feature_power),
//!   [`set_body_power`](PoolController::set_body_power),
//!   [`set_seek_temp`](PoolController::set_seek_temp),
//!   [`set_heat_source`](PoolController::set_heat_source),
//!   [`synchronize_clock`](PoolController::synchronize_clock)) and observe
//!   state through [`status()`](PoolController::status),
//!   [`subscribe()`](PoolController::subscribe), or push-style listeners.
//!
//! - **Reachability monitor** ([`monitor`]) — A single long-lived task that
//!   drains the bus feed, owns the live snapshot outright (the single-writer
//!   rule is enforced by ownership, not documentation), and publishes a new
//!   [`PoolStatus`] whenever a message changes something that matters. On
//!   silence beyond the reachability timeout it degrades to an explicit
//!   [`PoolStatus::Unreachable`] value rather than an error.
//!
//! - **Status fan-out** ([`publisher`]) — Latest-status cell with blocking
//!   retrieval for late joiners, plus per-subscriber unbounded queues so a
//!   slow consumer never stalls the monitor or its peers.
//!
//! - **Domain model** ([`model`]) — [`PoolStatus`] and the small closed
//!   enums ([`Body`], [`Feature`], [`HeatSource`], [`PowerState`]) that map
//!   pool concepts onto hardware circuits via lookup tables in [`convert`].

pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod monitor;
pub mod publisher;
mod snapshot;

pub use config::ControllerConfig;
pub use controller::PoolController;
pub use error::CoreError;
pub use model::{
    ActiveStatus, Body, Feature, FeatureSet, HeatSource, InactiveStatus, PoolStatus, PowerState,
};
pub use publisher::{StatusStream, Subscription};
