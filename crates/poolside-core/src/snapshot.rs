// ── Live snapshot aggregation ──
//
// The monitor task's working set: the most recently observed value of every
// pool attribute. The task owns this struct by value, so the single-writer
// rule is enforced by the borrow checker rather than by convention — other
// tasks only ever see the snapshot indirectly, through published
// `PoolStatus` events.

use chrono::NaiveTime;

use poolside_bus::{Circuit, HeatStatus, PumpStatus, SystemStatus};

use crate::convert;
use crate::model::{
    ActiveStatus, Body, Feature, FeatureSet, HeatSource, InactiveStatus, PoolStatus,
};

/// Most recent observed value of every pool attribute.
///
/// Starts fully unknown and fills in as distinct message kinds arrive. A
/// full status can only be synthesized once at least one system status and
/// one heat status have been seen; until then [`to_status`](Self::to_status)
/// returns `None` and nothing is published.
#[derive(Debug, Default)]
pub(crate) struct LiveSnapshot {
    time: Option<NaiveTime>,
    air_temp: i32,
    water_temp: i32,
    active_body: Option<Body>,
    /// `None` until the first system status message.
    active_features: Option<FeatureSet>,
    pump_speed_rpm: u32,
    pump_power_watts: u32,
    pool_seek_temp: i32,
    spa_seek_temp: i32,
    /// `None` until the first heat status message.
    pool_heat_source: Option<HeatSource>,
    spa_heat_source: Option<HeatSource>,
}

impl LiveSnapshot {
    /// Apply a system status update. Returns whether the update represents
    /// a significant state change.
    ///
    /// Significance: air temperature or active body changed; or, with a
    /// body active, water temperature or the feature set changed at all;
    /// or, with no body active, the light's on/off state changed. The
    /// light-only test while inactive is deliberate and preserved as-is
    /// (water temperature and the remaining features are irrelevant while
    /// nothing circulates).
    pub(crate) fn apply_system_status(&mut self, update: &SystemStatus) -> bool {
        let old_air_temp = self.air_temp;
        let old_water_temp = self.water_temp;
        let old_active_body = self.active_body;
        let old_features = self.active_features.unwrap_or(FeatureSet::EMPTY);

        self.time = Some(update.time);
        self.air_temp = update.air_temp;
        self.water_temp = update.water_temp;
        self.active_body = if update.enabled_circuits.contains(Circuit::Spa) {
            Some(Body::Spa)
        } else if update.enabled_circuits.contains(Circuit::Pool) {
            Some(Body::Pool)
        } else {
            None
        };
        let features = convert::features_for(update.enabled_circuits, update.heater_on);
        self.active_features = Some(features);

        self.air_temp != old_air_temp
            || self.active_body != old_active_body
            || (self.active_body.is_some() && self.water_temp != old_water_temp)
            || (self.active_body.is_none()
                && features.contains(Feature::Light) != old_features.contains(Feature::Light))
            || (self.active_body.is_some() && features != old_features)
    }

    /// Apply a heat status update. Significant iff any of the four values
    /// changed.
    pub(crate) fn apply_heat_status(&mut self, update: &HeatStatus) -> bool {
        let old_pool_seek = self.pool_seek_temp;
        let old_spa_seek = self.spa_seek_temp;
        let old_pool_source = self.pool_heat_source;
        let old_spa_source = self.spa_heat_source;

        self.pool_seek_temp = update.pool_seek_temp;
        self.spa_seek_temp = update.spa_seek_temp;
        self.pool_heat_source = Some(convert::heat_source_from_mode(update.pool_heat_mode));
        self.spa_heat_source = Some(convert::heat_source_from_mode(update.spa_heat_mode));

        self.pool_seek_temp != old_pool_seek
            || self.spa_seek_temp != old_spa_seek
            || self.pool_heat_source != old_pool_source
            || self.spa_heat_source != old_spa_source
    }

    /// Apply a pump status update. Significant iff speed or power changed.
    pub(crate) fn apply_pump_status(&mut self, update: &PumpStatus) -> bool {
        let old_speed = self.pump_speed_rpm;
        let old_power = self.pump_power_watts;

        self.pump_speed_rpm = update.speed_rpm;
        self.pump_power_watts = update.power_watts;

        self.pump_speed_rpm != old_speed || self.pump_power_watts != old_power
    }

    /// Synthesize a full status, or `None` if we have not yet seen both a
    /// system status and a heat status.
    pub(crate) fn to_status(&self) -> Option<PoolStatus> {
        let time = self.time?;
        let active_features = self.active_features?;
        let pool_heat_source = self.pool_heat_source?;
        let spa_heat_source = self.spa_heat_source?;

        Some(match self.active_body {
            None => PoolStatus::Inactive(InactiveStatus {
                time,
                air_temp: self.air_temp,
                active_features,
                pool_seek_temp: self.pool_seek_temp,
                spa_seek_temp: self.spa_seek_temp,
                pool_heat_source,
                spa_heat_source,
            }),
            Some(active_body) => PoolStatus::Active(ActiveStatus {
                time,
                air_temp: self.air_temp,
                active_features,
                active_body,
                water_temp: self.water_temp,
                pump_speed_rpm: self.pump_speed_rpm,
                pump_power_watts: self.pump_power_watts,
                pool_seek_temp: self.pool_seek_temp,
                spa_seek_temp: self.spa_seek_temp,
                pool_heat_source,
                spa_heat_source,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use poolside_bus::{CircuitSet, HeatMode};

    fn system_status(circuits: &[Circuit], air: i32, water: i32) -> SystemStatus {
        SystemStatus {
            time: NaiveTime::from_hms_opt(9, 15, 0).expect("valid time"),
            air_temp: air,
            water_temp: water,
            enabled_circuits: circuits.iter().copied().collect(),
            heater_on: false,
        }
    }

    fn heat_status() -> HeatStatus {
        HeatStatus {
            pool_seek_temp: 78,
            spa_seek_temp: 102,
            pool_heat_mode: HeatMode::SolarPreferred,
            spa_heat_mode: HeatMode::Heater,
        }
    }

    #[test]
    fn no_status_until_both_message_kinds_seen() {
        let mut snapshot = LiveSnapshot::default();
        assert!(snapshot.to_status().is_none());

        snapshot.apply_system_status(&system_status(&[], 70, 0));
        assert!(snapshot.to_status().is_none());

        snapshot.apply_heat_status(&heat_status());
        assert!(matches!(snapshot.to_status(), Some(PoolStatus::Inactive(_))));
    }

    #[test]
    fn spa_circuit_takes_priority_over_pool() {
        let mut snapshot = LiveSnapshot::default();
        snapshot.apply_system_status(&system_status(&[Circuit::Pool, Circuit::Spa], 70, 100));
        snapshot.apply_heat_status(&heat_status());

        match snapshot.to_status() {
            Some(PoolStatus::Active(status)) => assert_eq!(status.active_body, Body::Spa),
            other => panic!("expected active status, got {other:?}"),
        }
    }

    #[test]
    fn identical_heat_status_is_insignificant() {
        let mut snapshot = LiveSnapshot::default();
        assert!(snapshot.apply_heat_status(&heat_status()));
        assert!(!snapshot.apply_heat_status(&heat_status()));
    }

    #[test]
    fn water_temp_change_is_insignificant_while_inactive() {
        let mut snapshot = LiveSnapshot::default();
        snapshot.apply_system_status(&system_status(&[], 70, 60));

        // Only the water temperature moves; nothing circulates, so this is
        // not a state change worth publishing.
        assert!(!snapshot.apply_system_status(&system_status(&[], 70, 61)));
    }

    #[test]
    fn water_temp_change_is_significant_while_active() {
        let mut snapshot = LiveSnapshot::default();
        snapshot.apply_system_status(&system_status(&[Circuit::Pool], 70, 80));
        assert!(snapshot.apply_system_status(&system_status(&[Circuit::Pool], 70, 81)));
    }

    #[test]
    fn light_toggle_is_significant_while_inactive() {
        let mut snapshot = LiveSnapshot::default();
        snapshot.apply_system_status(&system_status(&[], 70, 0));
        assert!(snapshot.apply_system_status(&system_status(&[Circuit::Aux1], 70, 0)));
        assert!(!snapshot.apply_system_status(&system_status(&[Circuit::Aux1], 70, 0)));
    }

    #[test]
    fn non_light_feature_toggle_is_insignificant_while_inactive() {
        let mut snapshot = LiveSnapshot::default();
        snapshot.apply_system_status(&system_status(&[], 70, 0));

        // Heat boost flips on with no body active: the light test is the
        // only feature comparison that applies while inactive.
        assert!(!snapshot.apply_system_status(&system_status(&[Circuit::HeatBoost], 70, 0)));
    }

    #[test]
    fn any_feature_change_is_significant_while_active() {
        let mut snapshot = LiveSnapshot::default();
        snapshot.apply_system_status(&system_status(&[Circuit::Spa], 70, 100));
        assert!(snapshot.apply_system_status(&system_status(
            &[Circuit::Spa, Circuit::HeatBoost],
            70,
            100
        )));
    }

    #[test]
    fn heater_relay_shows_up_as_feature() {
        let mut snapshot = LiveSnapshot::default();
        let mut update = system_status(&[Circuit::Spa], 70, 100);
        update.heater_on = true;
        snapshot.apply_system_status(&update);
        snapshot.apply_heat_status(&heat_status());

        match snapshot.to_status() {
            Some(PoolStatus::Active(status)) => {
                assert!(status.active_features.contains(Feature::Heater));
            }
            other => panic!("expected active status, got {other:?}"),
        }
    }

    #[test]
    fn pump_update_significant_only_on_change() {
        let mut snapshot = LiveSnapshot::default();
        let update = PumpStatus {
            speed_rpm: 2400,
            power_watts: 600,
        };
        assert!(snapshot.apply_pump_status(&update));
        assert!(!snapshot.apply_pump_status(&update));
        assert!(snapshot.apply_pump_status(&PumpStatus {
            speed_rpm: 3100,
            power_watts: 600,
        }));
    }
}
