//! Simulation engine: a left-to-right scan of the controller over all intervals.

use crate::config::{ConfigError, Settings};
use crate::error::{Error, Result};

use super::controller::RampController;
use super::types::{ControllerState, Gains, IntervalResult, IntervalSample};

/// Output of one controller run over an interval sequence.
///
/// `results` is aligned 1:1 with the input intervals.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub results: Vec<IntervalResult>,
    /// Number of intervals flagged as ramp violations.
    pub violation_count: usize,
    /// Energy delivered to the grid (hours of nameplate).
    pub total_energy: f64,
    /// Interval length in hours.
    pub interval_hours: f64,
}

impl Simulation {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn pv_power(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.pv_power).collect()
    }

    pub fn out_power(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.out_power).collect()
    }

    pub fn battery_power(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.battery_power).collect()
    }

    pub fn battery_soc(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.battery_soc).collect()
    }

    pub fn curtailed_power(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.curtailed_power).collect()
    }

    pub fn violations(&self) -> Vec<bool> {
        self.results.iter().map(|r| r.violation).collect()
    }
}

/// Checks everything the scan relies on, before any interval is processed.
pub(crate) fn preflight(intervals: &[IntervalSample], settings: &Settings) -> Result<()> {
    settings.ensure_valid()?;

    if intervals.is_empty() {
        return Err(Error::InsufficientData("no intervals to simulate".into()));
    }
    let forecast = &settings.forecast;
    if forecast.enabled && intervals.len() < forecast.horizon {
        return Err(Error::InsufficientData(format!(
            "{} intervals are shorter than the {}-interval forecast horizon",
            intervals.len(),
            forecast.horizon
        )));
    }
    Ok(())
}

/// Runs the controller over `intervals` from an empty battery and zero output.
///
/// # Errors
///
/// Returns a configuration error for invalid settings, or
/// `InsufficientData` for an empty sequence or one shorter than the
/// forecast horizon. Nothing fails once the scan has started.
pub fn simulate(
    intervals: &[IntervalSample],
    settings: &Settings,
    gains: Gains,
) -> Result<Simulation> {
    simulate_from(ControllerState::default(), intervals, settings, gains)
}

/// Runs the controller over `intervals` starting from `initial`.
///
/// # Errors
///
/// As [`simulate`], plus a configuration error if the initial state of
/// charge lies outside `[0, battery.energy]`.
pub fn simulate_from(
    initial: ControllerState,
    intervals: &[IntervalSample],
    settings: &Settings,
    gains: Gains,
) -> Result<Simulation> {
    preflight(intervals, settings)?;
    if !(0.0..=settings.battery.energy).contains(&initial.battery_soc) {
        return Err(ConfigError::new(
            "state.battery_soc",
            format!("must be in [0.0, {}]", settings.battery.energy),
        )
        .into());
    }

    let controller = RampController::new(settings, gains);
    let (_, results) = intervals.iter().fold(
        (initial, Vec::with_capacity(intervals.len())),
        |(mut state, mut results), sample| {
            results.push(controller.step(&mut state, sample));
            (state, results)
        },
    );

    let interval_hours = settings.ramp.interval_hours();
    let violation_count = results.iter().filter(|r| r.violation).count();
    let total_energy = results.iter().map(|r| r.out_power).sum::<f64>() * interval_hours;

    Ok(Simulation {
        results,
        violation_count,
        total_energy,
        interval_hours,
    })
}

/// Counts violations without keeping per-interval records.
///
/// Same scan as [`simulate`], for scoring many gain candidates.
pub fn count_violations(controller: &RampController, intervals: &[IntervalSample]) -> usize {
    let mut state = ControllerState::default();
    intervals
        .iter()
        .filter(|sample| controller.step(&mut state, sample).violation)
        .count()
}
