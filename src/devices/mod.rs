//! Physical models: storage limits and synthetic PV generation.

/// Battery storage limits, efficiency, and SOC bookkeeping.
pub mod battery;
/// Synthetic PV output model.
pub mod solar;

pub use battery::Battery;
pub use solar::SolarProfile;
