//! Forecasting utilities for the controller's feed-forward term.

/// Perfect-foresight energy forecast.
///
/// For each interval, sums the actual interval power over the next
/// `horizon` intervals (current one included), truncating at the end of the
/// series, and converts the sum to energy.
#[derive(Debug, Clone, Copy)]
pub struct PerfectForecast {
    /// Forecast window in intervals.
    pub horizon: usize,
    /// Interval length in hours.
    pub interval_hours: f64,
}

impl PerfectForecast {
    pub fn new(horizon: usize, interval_hours: f64) -> Self {
        Self {
            horizon,
            interval_hours,
        }
    }

    /// Produce the forecast energy for every interval.
    ///
    /// # Arguments
    ///
    /// * `powers` - Interval-average power values
    ///
    /// # Returns
    ///
    /// A vector of forecast energies with the same length as `powers`.
    pub fn forecast(&self, powers: &[f64]) -> Vec<f64> {
        if self.horizon == 0 {
            return vec![0.0; powers.len()];
        }

        // Reverse running sum over a sliding window.
        let mut out = vec![0.0; powers.len()];
        let mut window = 0.0;
        for i in (0..powers.len()).rev() {
            window += powers[i];
            if let Some(&leaving) = powers.get(i + self.horizon) {
                window -= leaving;
            }
            out[i] = window * self.interval_hours;
        }
        out
    }
}
