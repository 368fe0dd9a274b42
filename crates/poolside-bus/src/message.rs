// ── Bus message catalog ──
//
// The closed set of messages the controller consumes and produces. Payloads
// carry only the fields the core acts on; anything else in the frame is the
// concrete bus implementation's business.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::types::{Circuit, CircuitPowerState, CircuitSet, HeatMode};

/// Periodic status broadcast from the pool hardware.
///
/// Emitted by the hardware every few seconds without being asked; the
/// authoritative source for time-of-day, temperatures, and which circuits
/// are energized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// Hardware clock, accurate to the minute.
    pub time: NaiveTime,
    /// Ambient air temperature in degrees.
    pub air_temp: i32,
    /// Water temperature in degrees. Only meaningful while water circulates.
    pub water_temp: i32,
    /// Circuits currently energized.
    pub enabled_circuits: CircuitSet,
    /// Whether the heater relay is currently closed.
    pub heater_on: bool,
}

/// Heat configuration report: seek temperatures and heat modes per body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatStatus {
    pub pool_seek_temp: i32,
    pub spa_seek_temp: i32,
    pub pool_heat_mode: HeatMode,
    pub spa_heat_mode: HeatMode,
}

/// Pump telemetry report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpStatus {
    pub speed_rpm: u32,
    pub power_watts: u32,
}

/// A message on the pool bus.
///
/// Inbound observations ([`SystemStatus`], [`HeatStatus`], [`PumpStatus`],
/// `StateChangeResponse`) and outbound polls/commands share one type because
/// they share one physical channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    // ── Inbound observations ────────────────────────────────────────
    SystemStatus(SystemStatus),
    HeatStatus(HeatStatus),
    PumpStatus(PumpStatus),
    /// Acknowledgement of a state-change request.
    StateChangeResponse,

    // ── Outbound polls ──────────────────────────────────────────────
    /// Ask the hardware to report its heat configuration.
    HeatStatusQuery,
    /// Ask the pump to report speed and power draw.
    PumpStatusRequest,

    // ── Outbound commands ───────────────────────────────────────────
    CircuitStateChangeRequest {
        circuit: Circuit,
        state: CircuitPowerState,
    },
    /// Heat configuration is all-or-nothing across both bodies: the
    /// hardware accepts only the full tuple, never a single field.
    HeatConfigurationChangeRequest {
        pool_seek_temp: i32,
        spa_seek_temp: i32,
        pool_heat_mode: HeatMode,
        spa_heat_mode: HeatMode,
    },
    ClockChangeRequest(NaiveDateTime),
}

impl Message {
    /// The kind discriminant, used to match request/response pairs.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::SystemStatus(_) => MessageKind::SystemStatus,
            Message::HeatStatus(_) => MessageKind::HeatStatus,
            Message::PumpStatus(_) => MessageKind::PumpStatus,
            Message::StateChangeResponse => MessageKind::StateChangeResponse,
            Message::HeatStatusQuery => MessageKind::HeatStatusQuery,
            Message::PumpStatusRequest => MessageKind::PumpStatusRequest,
            Message::CircuitStateChangeRequest { .. } => MessageKind::CircuitStateChangeRequest,
            Message::HeatConfigurationChangeRequest { .. } => {
                MessageKind::HeatConfigurationChangeRequest
            }
            Message::ClockChangeRequest(_) => MessageKind::ClockChangeRequest,
        }
    }
}

/// Discriminant-only view of [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum MessageKind {
    SystemStatus,
    HeatStatus,
    PumpStatus,
    StateChangeResponse,
    HeatStatusQuery,
    PumpStatusRequest,
    CircuitStateChangeRequest,
    HeatConfigurationChangeRequest,
    ClockChangeRequest,
}
