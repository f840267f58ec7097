//! Core simulation types: gains, interval inputs, scan state, and results.

use std::fmt;

/// The controller's four tunable scalars.
///
/// # Examples
///
/// ```
/// use ramp_smooth::sim::types::Gains;
///
/// let g = Gains::default();
/// assert_eq!(g.to_array(), [1.2, 1.8, 0.3, 0.5]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    /// Proportional gain on the interval power step.
    pub kp: f64,
    /// Gain on the state-of-charge deviation from rest.
    pub ki: f64,
    /// Feed-forward gain on the forecast energy gap.
    pub kf: f64,
    /// Resting state of charge (fraction of capacity) the controller steers towards.
    pub soc_rest: f64,
}

impl Gains {
    pub fn new(kp: f64, ki: f64, kf: f64, soc_rest: f64) -> Self {
        Self {
            kp,
            ki,
            kf,
            soc_rest,
        }
    }

    /// Gains in `[kp, ki, kf, soc_rest]` order.
    pub fn to_array(self) -> [f64; 4] {
        [self.kp, self.ki, self.kf, self.soc_rest]
    }

    pub fn from_array([kp, ki, kf, soc_rest]: [f64; 4]) -> Self {
        Self::new(kp, ki, kf, soc_rest)
    }
}

impl Default for Gains {
    fn default() -> Self {
        Self::new(1.2, 1.8, 0.3, 0.5)
    }
}

impl fmt::Display for Gains {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "kp={:.4} ki={:.4} kf={:.4} soc_rest={:.4}",
            self.kp, self.ki, self.kf, self.soc_rest
        )
    }
}

/// One aggregated ramp interval, fed to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntervalSample {
    /// Interval-average PV power (fraction of nameplate).
    pub pv_power: f64,
    /// PV energy over the forecast horizon starting at this interval.
    pub forecast_energy: f64,
}

impl IntervalSample {
    pub fn new(pv_power: f64, forecast_energy: f64) -> Self {
        Self {
            pv_power,
            forecast_energy,
        }
    }
}

/// State threaded through the interval scan.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerState {
    /// Output power of the previous interval.
    pub previous_power: f64,
    /// Stored energy (same units as battery capacity).
    pub battery_soc: f64,
}

impl ControllerState {
    pub fn new(previous_power: f64, battery_soc: f64) -> Self {
        Self {
            previous_power,
            battery_soc,
        }
    }
}

/// Complete record of one controlled interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalResult {
    /// PV input power.
    pub pv_power: f64,
    /// Power delivered to the grid.
    pub out_power: f64,
    /// Battery terminal power (positive = discharging).
    pub battery_power: f64,
    /// State of charge after this interval.
    pub battery_soc: f64,
    /// Power discarded by curtailment.
    pub curtailed_power: f64,
    /// Whether the ramp limit was exceeded.
    pub violation: bool,
}

impl fmt::Display for IntervalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pv={:>6.3}  out={:>6.3}  bat={:>6.3} (SoC={:.4}) | curtail={:.3}{}",
            self.pv_power,
            self.out_power,
            self.battery_power,
            self.battery_soc,
            self.curtailed_power,
            if self.violation { "  VIOLATION" } else { "" },
        )
    }
}
