//! PV ramp-rate smoothing with a battery-backed feedback controller.
//!
//! The controller in [`sim`] limits interval-to-interval changes of PV
//! output using a battery and optional curtailment. [`opt`] tunes its gains
//! with a shrinking-window grid search and sweeps battery sizes.

pub mod config;
pub mod devices;
pub mod error;
pub mod forecast;
pub mod io;
pub mod opt;
#[cfg(feature = "plot")]
pub mod plot;
pub mod series;
pub mod sim;

pub use error::{Error, Result};
