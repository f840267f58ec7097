//! Interval aggregation, the ramp controller, the simulation engine and KPIs.

/// Interval aggregation of the raw power series.
pub mod aggregate;
pub mod controller;
pub mod engine;
pub mod kpi;
pub mod types;

pub use controller::RampController;
pub use engine::{Simulation, simulate, simulate_from};
pub use types::{ControllerState, Gains, IntervalResult, IntervalSample};
