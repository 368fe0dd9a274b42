// ── Pool status ──
//
// The one externally visible status shape. Exactly one variant is current
// at any time; consumers receive these through subscriptions or
// `PoolController::status()`.

use std::fmt;

use chrono::{DateTime, Local, NaiveTime};
use serde::{Deserialize, Serialize};

use super::types::{Body, Feature, FeatureSet, HeatSource};

// Status time is accurate only to the minute.
const TIME_FORMAT: &str = "%I:%M %p";

/// The status of the pool system.
///
/// `Unreachable` is a first-class status, not an error: consumers observe
/// loss of contact through the same stream as every other transition. An
/// `Unreachable` event is emitted only on the transition *into*
/// unreachability, never repeated while it persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PoolStatus {
    /// We cannot communicate with the pool hardware (typically a power
    /// failure has shut the system down).
    Unreachable {
        /// Time of last contact, or `None` if the hardware has never been
        /// reached.
        last_contact: Option<DateTime<Local>>,
    },
    /// Water is not circulating.
    Inactive(InactiveStatus),
    /// Water is circulating through the pool or the spa.
    Active(ActiveStatus),
}

/// Status fields for an inactive (pump off) pool system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactiveStatus {
    /// Hardware time of day, accurate to the minute.
    pub time: NaiveTime,
    /// Ambient air temperature in degrees.
    pub air_temp: i32,
    /// Features currently on (e.g. the light).
    pub active_features: FeatureSet,
    /// Temperature below which the pool heat source activates.
    pub pool_seek_temp: i32,
    /// Temperature below which the spa heat source activates.
    pub spa_seek_temp: i32,
    pub pool_heat_source: HeatSource,
    pub spa_heat_source: HeatSource,
}

/// Status fields for an active (water circulating) pool system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStatus {
    pub time: NaiveTime,
    pub air_temp: i32,
    pub active_features: FeatureSet,
    /// Which body the water is circulating through.
    pub active_body: Body,
    /// Water temperature in degrees.
    pub water_temp: i32,
    /// Pump speed in RPM.
    pub pump_speed_rpm: u32,
    /// Pump power draw in watts.
    pub pump_power_watts: u32,
    pub pool_seek_temp: i32,
    pub spa_seek_temp: i32,
    pub pool_heat_source: HeatSource,
    pub spa_heat_source: HeatSource,
}

impl PoolStatus {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, PoolStatus::Unreachable { .. })
    }

    /// The body currently circulating, if any.
    pub fn active_body(&self) -> Option<Body> {
        match self {
            PoolStatus::Active(status) => Some(status.active_body),
            PoolStatus::Inactive(_) | PoolStatus::Unreachable { .. } => None,
        }
    }

    /// The active feature set, if the hardware is reachable.
    pub fn active_features(&self) -> Option<FeatureSet> {
        match self {
            PoolStatus::Active(status) => Some(status.active_features),
            PoolStatus::Inactive(status) => Some(status.active_features),
            PoolStatus::Unreachable { .. } => None,
        }
    }
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolStatus::Unreachable { last_contact } => {
                write!(f, "Unable to contact pool controller")?;
                if let Some(when) = last_contact {
                    write!(f, " since {}", when.format("%Y-%m-%d %H:%M:%S"))?;
                }
                Ok(())
            }
            PoolStatus::Inactive(status) => write!(f, "{status}"),
            PoolStatus::Active(status) => write!(f, "{status}"),
        }
    }
}

impl fmt::Display for InactiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Pump off. Air: {}°,{} Pool seek: {}°, Spa seek: {}°, \
             Pool heat src: {}, Spa heat src: {}",
            self.time.format(TIME_FORMAT),
            self.air_temp,
            if self.active_features.contains(Feature::Light) {
                " Light on,"
            } else {
                ""
            },
            self.pool_seek_temp,
            self.spa_seek_temp,
            self.pool_heat_source,
            self.spa_heat_source,
        )
    }
}

impl fmt::Display for ActiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let features = if self.active_features.is_empty() {
            String::new()
        } else {
            format!("{}, ", self.active_features)
        };
        write!(
            f,
            "{}: {} on. Air: {}°, Water: {}°, Pump: {} RPM, {} watts, {}\
             Pool seek: {}°, Spa seek: {}°, Pool heat src: {}, Spa heat src: {}",
            self.time.format(TIME_FORMAT),
            self.active_body,
            self.air_temp,
            self.water_temp,
            self.pump_speed_rpm,
            self.pump_power_watts,
            features,
            self.pool_seek_temp,
            self.spa_seek_temp,
            self.pool_heat_source,
            self.spa_heat_source,
        )
    }
}
