// ── Pool domain model ──

mod status;
mod types;

pub use status::{ActiveStatus, InactiveStatus, PoolStatus};
pub use types::{Body, Feature, FeatureSet, HeatSource, PowerState};
