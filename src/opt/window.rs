//! Immutable per-gain search windows for the shrinking grid search.

use crate::config::{CurtailmentPolicy, OptimizerConfig, Settings};
use crate::error::{Error, Result};
use crate::sim::types::Gains;

/// Gain names in `[kp, ki, kf, soc_rest]` order.
pub const GAIN_NAMES: [&str; 4] = ["kp", "ki", "kf", "soc_rest"];

/// A closed candidate interval `[low, high]` for one gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub low: f64,
    pub high: f64,
}

impl Range {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Range of half-width `half_width` around `center`.
    pub fn centered(center: f64, half_width: f64) -> Self {
        Self::new(center - half_width, center + half_width)
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn center(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    /// Width of one of `sections` equal sections.
    pub fn step(&self, sections: usize) -> f64 {
        self.width() / sections as f64
    }

    /// Midpoints of `sections` equal sections, ascending.
    pub fn midpoints(&self, sections: usize) -> Vec<f64> {
        let step = self.step(sections);
        (0..sections)
            .map(|i| self.low + step * (i as f64 + 0.5))
            .collect()
    }
}

impl From<[f64; 2]> for Range {
    fn from([low, high]: [f64; 2]) -> Self {
        Self::new(low, high)
    }
}

/// How one gain takes part in the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Axis {
    /// Candidates are section midpoints of the range.
    Searched(Range),
    /// Held at a constant value on every level.
    Fixed(f64),
}

impl Axis {
    fn values(&self, sections: usize) -> Vec<f64> {
        match *self {
            Self::Searched(range) => range.midpoints(sections),
            Self::Fixed(value) => vec![value],
        }
    }

    pub fn is_searched(&self) -> bool {
        matches!(self, Self::Searched(_))
    }

    pub fn center(&self) -> f64 {
        match *self {
            Self::Searched(range) => range.center(),
            Self::Fixed(value) => value,
        }
    }
}

/// The four gain axes of one search level, replaced wholesale per level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchWindow {
    /// Axes in `[kp, ki, kf, soc_rest]` order.
    pub axes: [Axis; 4],
}

impl SearchWindow {
    pub fn new(axes: [Axis; 4]) -> Self {
        Self { axes }
    }

    /// Default starting window for `settings`, with config overrides applied.
    ///
    /// `ki` scales with the ramp interval (the defaults suit 10 minutes), and
    /// when curtailment is the control the battery rests near full charge.
    pub fn initial(settings: &Settings, config: &OptimizerConfig) -> Self {
        let ki_scale = f64::from(settings.ramp.interval_minutes) / 10.0;
        let soc_rest_default = if settings.curtailment == CurtailmentPolicy::AsControl {
            [0.99, 1.0]
        } else {
            [0.3, 0.7]
        };

        let kp = config.kp_range.unwrap_or([0.0, 2.0]);
        let ki = config.ki_range.unwrap_or([0.0, 2.0 * ki_scale]);
        let kf = config.kf_range.unwrap_or([0.0, 8.0]);
        let soc_rest = config.soc_rest_range.unwrap_or(soc_rest_default);

        Self::new([
            Axis::Searched(kp.into()),
            Axis::Searched(ki.into()),
            if config.search_kf {
                Axis::Searched(kf.into())
            } else {
                Axis::Fixed(0.0)
            },
            Axis::Searched(soc_rest.into()),
        ])
    }

    /// Fails if any searched range has no positive finite width.
    ///
    /// # Errors
    ///
    /// Returns `DegenerateSearch` naming the collapsed gain.
    pub fn ensure_open(&self) -> Result<()> {
        for (name, axis) in GAIN_NAMES.iter().zip(&self.axes) {
            if let Axis::Searched(range) = axis {
                let width = range.width();
                if !(width.is_finite() && width > 0.0) {
                    return Err(Error::DegenerateSearch(format!(
                        "{name} window [{}, {}] has no width",
                        range.low, range.high
                    )));
                }
            }
        }
        Ok(())
    }

    /// Full cross product of per-axis candidate values.
    ///
    /// Ordered with `soc_rest` outermost and `kp` innermost.
    pub fn candidates(&self, sections: usize) -> Vec<Gains> {
        let [kp, ki, kf, soc_rest] = self.axes.map(|a| a.values(sections));
        let mut out = Vec::with_capacity(kp.len() * ki.len() * kf.len() * soc_rest.len());
        for &s in &soc_rest {
            for &f in &kf {
                for &i in &ki {
                    for &p in &kp {
                        out.push(Gains::new(p, i, f, s));
                    }
                }
            }
        }
        out
    }

    /// Window centered on `best`, each searched half-width being one section
    /// step of this window divided by `reduction_factor`.
    pub fn narrowed(&self, best: Gains, sections: usize, reduction_factor: f64) -> Self {
        let best = best.to_array();
        let mut axes = self.axes;
        for (axis, center) in axes.iter_mut().zip(best) {
            if let Axis::Searched(range) = axis {
                *range = Range::centered(center, range.step(sections) / reduction_factor);
            }
        }
        Self::new(axes)
    }

    /// Gains at the center of every axis.
    pub fn center(&self) -> Gains {
        Gains::from_array(self.axes.map(|a| a.center()))
    }
}
