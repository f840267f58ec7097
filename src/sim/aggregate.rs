//! Reduction of a fine-grained power series into ramp intervals.

use crate::config::{ConfigError, Settings};
use crate::error::{Error, Result};
use crate::forecast::PerfectForecast;
use crate::series::PowerSeries;

use super::types::IntervalSample;

/// Number of input samples per ramp interval.
///
/// # Errors
///
/// Returns a configuration error if the ramp interval is not a whole
/// multiple of the sample spacing.
pub fn samples_per_interval(series: &PowerSeries, settings: &Settings) -> Result<usize> {
    let interval = settings.ramp.interval_minutes;
    if interval == 0 || interval % series.sample_minutes != 0 {
        return Err(ConfigError::new(
            "controller.ramp.interval_minutes",
            format!(
                "{interval} is not a multiple of the {}-minute sample spacing",
                series.sample_minutes
            ),
        )
        .into());
    }
    Ok((interval / series.sample_minutes) as usize)
}

/// Averages the series over each ramp interval and attaches the forecast.
///
/// Intervals are right-labelled bins of `samples_per_interval` samples; a
/// trailing partial bin averages the samples it has.
///
/// # Errors
///
/// Returns a configuration error for a misaligned interval, or
/// `InsufficientData` if the series does not cover one full interval.
pub fn aggregate(series: &PowerSeries, settings: &Settings) -> Result<Vec<IntervalSample>> {
    let n = samples_per_interval(series, settings)?;
    if series.len() < n {
        return Err(Error::InsufficientData(format!(
            "{} samples do not cover one {}-minute ramp interval",
            series.len(),
            settings.ramp.interval_minutes
        )));
    }

    let powers: Vec<f64> = series
        .values
        .chunks(n)
        .map(|chunk| chunk.iter().sum::<f64>() / chunk.len() as f64)
        .collect();

    let forecaster = PerfectForecast::new(settings.forecast.horizon, settings.ramp.interval_hours());
    let forecast = forecaster.forecast(&powers);

    Ok(powers
        .into_iter()
        .zip(forecast)
        .map(|(p, f)| IntervalSample::new(p, f))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(interval_minutes: u32) -> Settings {
        let mut s = Settings::default();
        s.ramp.interval_minutes = interval_minutes;
        s
    }

    #[test]
    fn averages_each_interval() {
        let series = PowerSeries::new(5, vec![0.0, 1.0, 0.5, 0.5, 1.0, 1.0]);
        let intervals = aggregate(&series, &settings(10)).ok().unwrap_or_default();
        let powers: Vec<f64> = intervals.iter().map(|i| i.pv_power).collect();
        assert_eq!(powers, vec![0.5, 0.5, 1.0]);
    }

    #[test]
    fn partial_tail_averages_available_samples() {
        let series = PowerSeries::new(1, vec![1.0, 1.0, 1.0, 0.4]);
        let intervals = aggregate(&series, &settings(3)).ok().unwrap_or_default();
        assert_eq!(intervals.len(), 2);
        assert!((intervals[1].pv_power - 0.4).abs() < 1e-12);
    }

    #[test]
    fn forecast_is_attached() {
        let mut s = settings(60);
        s.forecast.horizon = 2;
        let series = PowerSeries::new(60, vec![1.0, 2.0, 3.0]);
        let intervals = aggregate(&series, &s).ok().unwrap_or_default();
        let forecast: Vec<f64> = intervals.iter().map(|i| i.forecast_energy).collect();
        assert_eq!(forecast, vec![3.0, 5.0, 3.0]);
    }

    #[test]
    fn misaligned_interval_is_a_config_error() {
        let series = PowerSeries::new(3, vec![0.0; 100]);
        let err = aggregate(&series, &settings(10));
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn short_series_is_insufficient() {
        let series = PowerSeries::new(1, vec![0.0; 9]);
        let err = aggregate(&series, &settings(10));
        assert!(matches!(err, Err(Error::InsufficientData(_))));
    }
}
