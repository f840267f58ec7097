//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use rand::Rng;
use rand::rngs::StdRng;

use ramp_smooth::config::{CurtailmentPolicy, Settings};
use ramp_smooth::devices::SolarProfile;
use ramp_smooth::series::PowerSeries;
use ramp_smooth::sim::{Gains, IntervalSample};

/// Default settings (10-minute intervals, 0.1 ramp limit, 0.2 h battery).
pub fn default_settings() -> Settings {
    Settings::default()
}

/// Default settings with the given curtailment policy and battery size.
pub fn settings_with(curtailment: CurtailmentPolicy, battery_energy: f64) -> Settings {
    let mut s = Settings::default();
    s.curtailment = curtailment;
    s.battery.energy = battery_energy;
    s
}

/// `n` intervals of constant power.
pub fn flat_intervals(n: usize, power: f64) -> Vec<IntervalSample> {
    vec![IntervalSample::new(power, 0.0); n]
}

/// Zero power before `at`, `high` from `at` on.
pub fn step_intervals(n: usize, at: usize, high: f64) -> Vec<IntervalSample> {
    (0..n)
        .map(|i| IntervalSample::new(if i < at { 0.0 } else { high }, 0.0))
        .collect()
}

/// Random walk in `[0, 1]` with occasional large jumps, like broken cloud.
pub fn random_intervals(rng: &mut StdRng, n: usize) -> Vec<IntervalSample> {
    let mut p: f64 = 0.0;
    (0..n)
        .map(|_| {
            p = if rng.random_bool(0.15) {
                rng.random_range(0.0..=1.0)
            } else {
                (p + rng.random_range(-0.08..=0.08)).clamp(0.0, 1.0)
            };
            IntervalSample::new(p, rng.random_range(0.0..=0.5))
        })
        .collect()
}

/// Random gains spanning the default search ranges.
pub fn random_gains(rng: &mut StdRng) -> Gains {
    Gains::new(
        rng.random_range(0.0..=2.0),
        rng.random_range(0.0..=2.0),
        rng.random_range(0.0..=8.0),
        rng.random_range(0.0..=1.0),
    )
}

/// Seeded synthetic cloudy PV at one-minute resolution.
pub fn cloudy_series(days: usize, seed: u64) -> PowerSeries {
    SolarProfile::cloudy(1, seed).series(days)
}

/// Days of 10-minute samples: gentle dawn and dusk ramps around a 0.5
/// plateau that jumps by 0.28 every other pair of intervals.
///
/// The jumps exceed the 0.1 ramp limit, so only a battery resting near
/// half charge can smooth both edges.
pub fn bumpy_plateau(days: usize) -> PowerSeries {
    let day: Vec<f64> = (0..144usize)
        .map(|i| {
            if !(36..108).contains(&i) {
                return 0.0;
            }
            let ramp = ((i - 35) as f64 * 0.05).min((108 - i) as f64 * 0.05).min(0.5);
            if ramp >= 0.5 && ((i - 36) / 2) % 2 == 1 {
                0.5 + 0.28
            } else {
                ramp
            }
        })
        .collect();
    PowerSeries::new(10, day.repeat(days))
}
