//! Fixed-step normalized power series.

/// Minutes in a calendar day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// An ordered, evenly spaced sequence of non-negative power samples,
/// normalized to the AC nameplate.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSeries {
    /// Spacing between samples (minutes).
    pub sample_minutes: u32,
    /// Normalized power samples.
    pub values: Vec<f64>,
}

impl PowerSeries {
    /// Creates a series from samples spaced `sample_minutes` apart.
    ///
    /// # Panics
    ///
    /// Panics if `sample_minutes` is zero.
    pub fn new(sample_minutes: u32, values: Vec<f64>) -> Self {
        assert!(sample_minutes > 0, "sample_minutes must be > 0");
        Self {
            sample_minutes,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Samples in one calendar day (at least one).
    pub fn samples_per_day(&self) -> usize {
        (MINUTES_PER_DAY / self.sample_minutes).max(1) as usize
    }

    /// Number of calendar days covered, counting a trailing partial day.
    pub fn day_count(&self) -> usize {
        self.values.len().div_ceil(self.samples_per_day())
    }

    /// Total energy of the series (hours of nameplate).
    pub fn energy(&self) -> f64 {
        self.values.iter().sum::<f64>() * f64::from(self.sample_minutes) / 60.0
    }

    /// Returns a copy keeping only the listed days; every other sample is zero.
    ///
    /// Length and alignment are preserved so interval indices stay comparable.
    pub fn keep_days(&self, days: &[usize]) -> Self {
        let spd = self.samples_per_day();
        let mut keep = vec![false; self.day_count()];
        for &d in days {
            if let Some(k) = keep.get_mut(d) {
                *k = true;
            }
        }
        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| if keep[i / spd] { v } else { 0.0 })
            .collect();
        Self::new(self.sample_minutes, values)
    }
}
