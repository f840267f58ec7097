//! Hybrid battery/curtailment ramp-rate controller.

use crate::config::{CurtailmentPolicy, GridConfig, Settings};
use crate::devices::Battery;

use super::types::{ControllerState, Gains, IntervalResult, IntervalSample};

/// Tolerance on ramp comparisons, avoiding false positives at the boundary.
pub const RAMP_TOLERANCE: f64 = 1e-5;

/// Feedback controller computing battery dispatch and curtailment for one
/// ramp interval at a time.
///
/// The controller is immutable; all run state lives in the
/// [`ControllerState`] passed to [`RampController::step`].
#[derive(Debug, Clone)]
pub struct RampController {
    gains: Gains,
    max_ramp: f64,
    interval_hours: f64,
    grid: GridConfig,
    /// Forecast horizon in intervals, `None` when forecasting is off.
    horizon: Option<usize>,
    curtailment: CurtailmentPolicy,
    battery: Battery,
}

impl RampController {
    /// Creates a controller for validated settings.
    ///
    /// With forecasting disabled the feed-forward term is dropped, so `kf`
    /// has no effect whatever its value.
    ///
    /// # Panics
    ///
    /// Panics if the battery settings are out of range; call
    /// [`Settings::ensure_valid`] first.
    pub fn new(settings: &Settings, gains: Gains) -> Self {
        let forecast = &settings.forecast;
        Self {
            gains: Gains {
                kf: if forecast.enabled { gains.kf } else { 0.0 },
                ..gains
            },
            max_ramp: settings.ramp.max_ramp,
            interval_hours: settings.ramp.interval_hours(),
            grid: settings.grid.clone(),
            horizon: forecast.enabled.then_some(forecast.horizon),
            curtailment: settings.curtailment,
            battery: Battery::from_settings(settings),
        }
    }

    /// Effective gains (with `kf` zeroed when forecasting is off).
    pub fn gains(&self) -> Gains {
        self.gains
    }

    /// Combined controller error relative to the previous output.
    fn error(&self, state: &ControllerState, sample: &IntervalSample) -> f64 {
        let g = &self.gains;
        let h = self.interval_hours;
        let delta = sample.pv_power - state.previous_power;

        let proportional = delta;
        let integral = state.battery_soc + delta * h - g.soc_rest * self.battery.energy;
        let feed_forward = self.horizon.map_or(0.0, |horizon| {
            state.previous_power * horizon as f64 * h - sample.forecast_energy
        });

        g.kp * proportional + g.ki * integral - g.kf * feed_forward
    }

    /// Clamps a power to the enabled AC bounds.
    fn clamp_to_grid(&self, power: f64) -> f64 {
        let mut p = power;
        if self.grid.upper_bound_on && p > self.grid.upper_bound {
            p = self.grid.upper_bound;
        }
        if self.grid.lower_bound_on && p < self.grid.lower_bound {
            p = self.grid.lower_bound;
        }
        p
    }

    /// Advances the controller by one interval.
    ///
    /// Updates `state` in place and returns the interval's record.
    pub fn step(&self, state: &mut ControllerState, sample: &IntervalSample) -> IntervalResult {
        let previous = state.previous_power;
        let pv = sample.pv_power;

        // Ramp-limited target, then AC bounds.
        let error = self.error(state, sample);
        let step = self.max_ramp.min(error.abs());
        let target = if error > 0.0 {
            previous + step
        } else {
            previous - step
        };
        let target = self.clamp_to_grid(target);

        // Battery covers the gap as far as SOC and rating allow.
        let battery_power = self.battery.feasible_power(state.battery_soc, target - pv);
        let mut out_power = pv + battery_power;

        let mut violation = (out_power - previous).abs() > self.max_ramp + RAMP_TOLERANCE;

        let mut curtailed_power = 0.0;
        if self.curtailment.curtails() && out_power - previous > self.max_ramp - RAMP_TOLERANCE {
            out_power = previous + self.max_ramp;
            curtailed_power = pv + battery_power - out_power;
            if self.curtailment == CurtailmentPolicy::AsControl {
                violation = false;
            }
        }

        state.battery_soc = self.battery.next_soc(state.battery_soc, battery_power);
        state.previous_power = out_power;

        IntervalResult {
            pv_power: pv,
            out_power,
            battery_power,
            battery_soc: state.battery_soc,
            curtailed_power,
            violation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(pv: f64) -> IntervalSample {
        IntervalSample::new(pv, 0.0)
    }

    #[test]
    fn holds_output_when_pv_matches_previous_at_rest() {
        let settings = Settings::default();
        let gains = Gains::default();
        let controller = RampController::new(&settings, gains);
        let rest = gains.soc_rest * settings.battery.energy;
        let mut state = ControllerState::new(0.4, rest);

        let r = controller.step(&mut state, &sample(0.4));
        assert_eq!(r.out_power, 0.4);
        assert_eq!(r.battery_power, 0.0);
        assert!(!r.violation);
        assert_eq!(state.battery_soc, rest);
    }

    #[test]
    fn up_step_is_ramp_limited_by_charging() {
        let settings = Settings::default();
        let controller = RampController::new(&settings, Gains::default());
        let mut state = ControllerState::new(0.2, 0.1);

        let r = controller.step(&mut state, &sample(0.8));
        assert_relative_eq!(r.out_power, 0.3, epsilon = 1e-12);
        assert_relative_eq!(r.battery_power, -0.5, epsilon = 1e-12);
        assert!(!r.violation);
        assert!(state.battery_soc > 0.1);
    }

    #[test]
    fn down_step_is_ramp_limited_by_discharging() {
        let settings = Settings::default();
        let controller = RampController::new(&settings, Gains::default());
        let mut state = ControllerState::new(0.8, 0.1);

        let r = controller.step(&mut state, &sample(0.2));
        assert_relative_eq!(r.out_power, 0.7, epsilon = 1e-12);
        assert_relative_eq!(r.battery_power, 0.5, epsilon = 1e-12);
        assert!(!r.violation);
    }

    #[test]
    fn empty_battery_flags_down_ramp_violation_even_with_curtailment() {
        let mut settings = Settings::default();
        settings.curtailment = CurtailmentPolicy::AsControl;
        let controller = RampController::new(&settings, Gains::default());
        let mut state = ControllerState::new(0.8, 0.0);

        let r = controller.step(&mut state, &sample(0.2));
        assert_eq!(r.battery_power, 0.0);
        assert_eq!(r.out_power, 0.2);
        assert!(r.violation);
        assert_eq!(r.curtailed_power, 0.0);
    }

    #[test]
    fn pass_through_sends_unabsorbed_up_ramp_to_grid() {
        let mut settings = Settings::default();
        settings.battery.energy = 0.0;
        let controller = RampController::new(&settings, Gains::default());
        let mut state = ControllerState::default();

        let r = controller.step(&mut state, &sample(1.0));
        assert_eq!(r.out_power, 1.0);
        assert!(r.violation);
        assert_eq!(r.curtailed_power, 0.0);
    }

    #[test]
    fn curtail_as_control_clips_without_violation() {
        let mut settings = Settings::default();
        settings.battery.energy = 0.0;
        settings.curtailment = CurtailmentPolicy::AsControl;
        let controller = RampController::new(&settings, Gains::default());
        let mut state = ControllerState::default();

        let r = controller.step(&mut state, &sample(1.0));
        assert_relative_eq!(r.out_power, 0.1, epsilon = 1e-12);
        assert_relative_eq!(r.curtailed_power, 0.9, epsilon = 1e-12);
        assert!(!r.violation);
        assert_relative_eq!(state.previous_power, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn curtail_if_violation_clips_and_still_counts() {
        let mut settings = Settings::default();
        settings.battery.energy = 0.0;
        settings.curtailment = CurtailmentPolicy::IfViolation;
        let controller = RampController::new(&settings, Gains::default());
        let mut state = ControllerState::default();

        let r = controller.step(&mut state, &sample(1.0));
        assert_relative_eq!(r.out_power, 0.1, epsilon = 1e-12);
        assert_relative_eq!(r.curtailed_power, 0.9, epsilon = 1e-12);
        assert!(r.violation);
    }

    #[test]
    fn upper_bound_clamps_output() {
        let mut settings = Settings::default();
        settings.grid.upper_bound = 0.5;
        let controller = RampController::new(&settings, Gains::default());
        let mut state = ControllerState::new(0.5, 0.1);

        let r = controller.step(&mut state, &sample(0.55));
        assert!(r.out_power <= 0.5);
        assert!(r.battery_power < 0.0);
    }

    #[test]
    fn disabled_bound_is_not_checked() {
        let mut settings = Settings::default();
        settings.grid.upper_bound_on = false;
        settings.grid.upper_bound = 0.5;
        let controller = RampController::new(&settings, Gains::default());
        let mut state = ControllerState::new(0.5, 0.1);

        let r = controller.step(&mut state, &sample(0.6));
        assert!(r.out_power > 0.5);
    }

    #[test]
    fn kf_is_inert_without_forecast() {
        let settings = Settings::default();
        let a = RampController::new(&settings, Gains::new(1.2, 1.8, 0.0, 0.5));
        let b = RampController::new(&settings, Gains::new(1.2, 1.8, 50.0, 0.5));
        assert_eq!(b.gains().kf, 0.0);

        let s = IntervalSample::new(0.6, 5.0);
        let mut sa = ControllerState::new(0.3, 0.05);
        let mut sb = sa;
        assert_eq!(a.step(&mut sa, &s), b.step(&mut sb, &s));
    }

    #[test]
    fn feed_forward_pulls_output_towards_forecast() {
        let mut settings = Settings::default();
        settings.forecast.enabled = true;
        let gains = Gains::new(0.0, 0.0, 1.0, 0.5);
        let controller = RampController::new(&settings, gains);
        let mut state = ControllerState::new(0.5, 0.1);

        // Forecast energy above what holding 0.5 would deliver: push output up.
        let r = controller.step(&mut state, &IntervalSample::new(0.5, 1.0));
        assert!(r.out_power > 0.5);
    }
}
