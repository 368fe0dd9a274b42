// ── Wire-level hardware identifiers ──
//
// These enums mirror what the pool hardware actually addresses: relay
// circuits, circuit power bits, and the heat-mode selector. The controller
// core translates its domain vocabulary (Body, Feature, HeatSource,
// PowerState) to and from these via plain lookup tables.

use serde::{Deserialize, Serialize};

/// A relay circuit addressable on the bus.
///
/// The mapping from circuit to physical equipment is specific to this pool
/// system's wiring — AUX1 drives the light, AUX3 is the virtual high-speed
/// "jets" circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum Circuit {
    Pool,
    Spa,
    Aux1,
    Aux3,
    HeatBoost,
}

impl Circuit {
    const ALL: [Circuit; 5] = [
        Circuit::Pool,
        Circuit::Spa,
        Circuit::Aux1,
        Circuit::Aux3,
        Circuit::HeatBoost,
    ];

    fn bit(self) -> u8 {
        match self {
            Circuit::Pool => 1 << 0,
            Circuit::Spa => 1 << 1,
            Circuit::Aux1 => 1 << 2,
            Circuit::Aux3 => 1 << 3,
            Circuit::HeatBoost => 1 << 4,
        }
    }
}

/// The set of circuits currently energized, as reported by a system status
/// message. The wire encodes this as a bitmask; so do we.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CircuitSet(u8);

impl CircuitSet {
    pub const EMPTY: CircuitSet = CircuitSet(0);

    pub fn insert(&mut self, circuit: Circuit) {
        self.0 |= circuit.bit();
    }

    pub fn contains(self, circuit: Circuit) -> bool {
        self.0 & circuit.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Circuit> {
        Circuit::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Circuit> for CircuitSet {
    fn from_iter<I: IntoIterator<Item = Circuit>>(iter: I) -> Self {
        let mut set = CircuitSet::EMPTY;
        for circuit in iter {
            set.insert(circuit);
        }
        set
    }
}

/// Power bit for a single circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum CircuitPowerState {
    On,
    Off,
}

/// The hardware's heat-mode selector for one body of water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum HeatMode {
    Unheated,
    Heater,
    SolarPreferred,
    Solar,
}
