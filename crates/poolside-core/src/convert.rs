// ── Domain ↔ hardware translation tables ──
//
// The boundary between pool vocabulary and the hardware's circuit/heat-mode
// identifiers. Plain lookup functions, specific to this pool system's
// wiring — adding equipment means extending these tables.

use poolside_bus::{Circuit, CircuitPowerState, CircuitSet, HeatMode};

use crate::model::{Body, Feature, FeatureSet, HeatSource, PowerState};

/// The circuit behind a feature, or `None` for the heater (whose relay is
/// driven by the hardware, not by a switchable circuit).
pub(crate) fn feature_circuit(feature: Feature) -> Option<Circuit> {
    match feature {
        Feature::Light => Some(Circuit::Aux1),
        Feature::Jets => Some(Circuit::Aux3),
        Feature::Heater => None,
        Feature::HeatBoost => Some(Circuit::HeatBoost),
    }
}

pub(crate) fn body_circuit(body: Body) -> Circuit {
    match body {
        Body::Pool => Circuit::Pool,
        Body::Spa => Circuit::Spa,
    }
}

pub(crate) fn power_circuit_state(state: PowerState) -> CircuitPowerState {
    match state {
        PowerState::On => CircuitPowerState::On,
        PowerState::Off => CircuitPowerState::Off,
    }
}

pub(crate) fn heat_source_mode(source: HeatSource) -> HeatMode {
    match source {
        HeatSource::Unheated => HeatMode::Unheated,
        HeatSource::Heater => HeatMode::Heater,
        HeatSource::SolarPreferred => HeatMode::SolarPreferred,
        HeatSource::Solar => HeatMode::Solar,
    }
}

pub(crate) fn heat_source_from_mode(mode: HeatMode) -> HeatSource {
    match mode {
        HeatMode::Unheated => HeatSource::Unheated,
        HeatMode::Heater => HeatSource::Heater,
        HeatMode::SolarPreferred => HeatSource::SolarPreferred,
        HeatMode::Solar => HeatSource::Solar,
    }
}

/// Derive the active feature set from the energized circuits plus the
/// heater-relay flag.
pub(crate) fn features_for(circuits: CircuitSet, heater_on: bool) -> FeatureSet {
    let mut features: FeatureSet = [
        Feature::Light,
        Feature::Jets,
        Feature::HeatBoost,
    ]
    .into_iter()
    .filter(|f| feature_circuit(*f).is_some_and(|c| circuits.contains(c)))
    .collect();

    if heater_on {
        features.insert(Feature::Heater);
    }

    features
}
