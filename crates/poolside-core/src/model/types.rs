// ── Domain enumerations ──
//
// Small closed vocabularies describing this pool system. The hardware-facing
// circuit and heat-mode identifiers live in `poolside-bus`; the lookup
// tables between the two worlds are in `crate::convert`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A body of water that can be independently circulated. If water is
/// circulating through a body, the body is said to be active.
///
/// The hardware keeps independent power states for both and prioritizes the
/// spa: if both are commanded on, the spa runs. The command façade hides
/// that quirk (see
/// [`PoolController::set_body_power`](crate::PoolController::set_body_power)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum Body {
    #[strum(serialize = "Pool")]
    Pool,
    #[strum(serialize = "Spa")]
    Spa,
}

/// A controllable attribute of the pool system.
///
/// All features except [`Heater`](Feature::Heater) can be switched directly.
/// The heater is controlled by the pool hardware itself based on seek
/// temperatures; the `Heater` feature only reports the observed relay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum Feature {
    /// The pool light.
    Light,
    /// The jets: a virtual high-speed pump mode layered on the active body.
    Jets,
    /// The heater (gas or solar). Read-only, derived from the relay state.
    Heater,
    /// Heat boost, which temporarily raises the active body's temperature.
    HeatBoost,
}

impl Feature {
    const ALL: [Feature; 4] = [
        Feature::Light,
        Feature::Jets,
        Feature::Heater,
        Feature::HeatBoost,
    ];

    fn bit(self) -> u8 {
        match self {
            Feature::Light => 1 << 0,
            Feature::Jets => 1 << 1,
            Feature::Heater => 1 << 2,
            Feature::HeatBoost => 1 << 3,
        }
    }
}

/// The set of features currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureSet(u8);

impl FeatureSet {
    pub const EMPTY: FeatureSet = FeatureSet(0);

    pub fn insert(&mut self, feature: Feature) {
        self.0 |= feature.bit();
    }

    pub fn contains(self, feature: Feature) -> bool {
        self.0 & feature.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Feature> {
        Feature::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        let mut set = FeatureSet::EMPTY;
        for feature in iter {
            set.insert(feature);
        }
        set
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for feature in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{feature}")?;
            first = false;
        }
        Ok(())
    }
}

/// The heat source assigned to a body. Independent per body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum HeatSource {
    /// No heating.
    Unheated,
    /// The gas heater.
    Heater,
    /// Solar when available, falling back to the heater.
    SolarPreferred,
    /// Solar only.
    Solar,
}

/// The commanded power state of a body or feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum PowerState {
    On,
    Off,
}
