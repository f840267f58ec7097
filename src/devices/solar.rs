//! Synthetic PV output with temporally correlated cloud variability (AR(1) process).

use std::f64::consts::PI;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::series::{MINUTES_PER_DAY, PowerSeries};

/// Minimum cloud multiplier (heavy overcast).
const MULTIPLIER_MIN: f64 = 0.2;
/// Maximum cloud multiplier (enhanced irradiance from cloud edges).
const MULTIPLIER_MAX: f64 = 1.2;

/// Normalized PV generator with an AR(1) cloud multiplier.
///
/// Produces a half-sine clear-sky curve between sunrise and sunset, scaled
/// by a cloud multiplier that evolves as:
/// ```text
/// m(t) = alpha * m(t-1) + (1 - alpha) * (1 + epsilon(t))
/// ```
/// where `epsilon` is Gaussian noise. The multiplier reverts towards 1 and
/// is clamped to \[0.2, 1.2\]. Output is non-negative and normalized to
/// nameplate, the same convention as imported data.
#[derive(Debug, Clone)]
pub struct SolarProfile {
    /// Clear-sky peak output (fraction of nameplate).
    pub peak: f64,

    /// Spacing of generated samples (minutes).
    pub sample_minutes: u32,

    /// Sunrise, hours after midnight.
    pub sunrise_hour: f64,

    /// Sunset, hours after midnight.
    pub sunset_hour: f64,

    /// AR(1) correlation coefficient (0.0 = uncorrelated, 1.0 = fully persistent).
    pub alpha: f64,

    /// Standard deviation of the AR(1) innovation noise.
    pub cloud_noise_std: f64,

    /// Current cloud multiplier state.
    multiplier: f64,

    rng: StdRng,
}

impl SolarProfile {
    /// Creates a new generator.
    ///
    /// # Arguments
    ///
    /// * `peak` - Clear-sky peak output (fraction of nameplate)
    /// * `sample_minutes` - Sample spacing in minutes
    /// * `sunrise_hour` - Sunrise in hours after midnight
    /// * `sunset_hour` - Sunset in hours after midnight
    /// * `alpha` - AR(1) correlation coefficient (typical: 0.8–0.98)
    /// * `cloud_noise_std` - Standard deviation of innovation noise
    /// * `seed` - Random seed for reproducible cloud sequences
    ///
    /// # Panics
    ///
    /// Panics if `sample_minutes` is zero or `0 <= sunrise < sunset <= 24` does not hold.
    pub fn new(
        peak: f64,
        sample_minutes: u32,
        sunrise_hour: f64,
        sunset_hour: f64,
        alpha: f64,
        cloud_noise_std: f64,
        seed: u64,
    ) -> Self {
        assert!(sample_minutes > 0, "sample_minutes must be > 0");
        assert!(
            (0.0..sunset_hour).contains(&sunrise_hour) && sunset_hour <= 24.0,
            "sunrise_hour must be < sunset_hour within one day"
        );
        Self {
            peak: peak.max(0.0),
            sample_minutes,
            sunrise_hour,
            sunset_hour,
            alpha: alpha.clamp(0.0, 1.0),
            cloud_noise_std: cloud_noise_std.max(0.0),
            multiplier: 1.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A 06:00–18:00 profile with moderately persistent clouds.
    pub fn cloudy(sample_minutes: u32, seed: u64) -> Self {
        Self::new(0.95, sample_minutes, 6.0, 18.0, 0.9, 0.6, seed)
    }

    /// Clear-sky output at sample index `t`.
    pub fn clear_sky(&self, t: usize) -> f64 {
        let minute = (t as u64 * u64::from(self.sample_minutes)) % u64::from(MINUTES_PER_DAY);
        let hour = minute as f64 / 60.0;
        if hour < self.sunrise_hour || hour >= self.sunset_hour {
            return 0.0;
        }
        let frac = (hour - self.sunrise_hour) / (self.sunset_hour - self.sunrise_hour);
        self.peak * (PI * frac).sin()
    }

    /// Advances the AR(1) cloud multiplier by one step and returns the new value.
    fn advance_multiplier(&mut self) -> f64 {
        let epsilon = gaussian_noise(&mut self.rng, self.cloud_noise_std);
        self.multiplier = self.alpha * self.multiplier + (1.0 - self.alpha) * (1.0 + epsilon);
        self.multiplier = self.multiplier.clamp(MULTIPLIER_MIN, MULTIPLIER_MAX);
        self.multiplier
    }

    /// Output at sample index `t`.
    ///
    /// The cloud multiplier evolves every sample regardless of daylight,
    /// maintaining temporal correlation.
    pub fn power(&mut self, t: usize) -> f64 {
        let m = self.advance_multiplier();
        (self.clear_sky(t) * m).max(0.0)
    }

    /// Generates `days` whole days of samples.
    pub fn series(&mut self, days: usize) -> PowerSeries {
        let spd = (MINUTES_PER_DAY / self.sample_minutes).max(1) as usize;
        let values = (0..days * spd).map(|t| self.power(t)).collect();
        PowerSeries::new(self.sample_minutes, values)
    }
}

/// Gaussian noise via the Box-Muller transform.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    z0 * std_dev
}
