//! Battery size sweep: tune and evaluate the controller per capacity.

use rand::Rng;
use tracing::{info, warn};

use crate::config::{OptimizerConfig, Settings};
use crate::error::{Error, Result};
use crate::series::PowerSeries;
use crate::sim::aggregate::aggregate;
use crate::sim::engine::simulate;
use crate::sim::types::Gains;

use super::optimizer::optimize;
use super::window::SearchWindow;

/// Outcome of tuning and simulating one battery size.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    /// Battery capacity (hours of nameplate).
    pub battery_energy: f64,
    /// `None` when no candidate gain changed the score at this size.
    pub train_score: Option<f64>,
    /// `None` when no candidate gain changed the score at this size.
    pub test_score: Option<usize>,
    /// Energy delivered over the full series with the tuned gains.
    pub total_energy: f64,
    /// Violations over the full series with the tuned gains.
    pub violations: usize,
    pub gains: Gains,
}

/// Optimizes and then simulates the full series once per battery size.
///
/// Sizes are processed in order and share `rng`, so a seeded generator
/// reproduces the whole sweep. A size where every candidate scores the same
/// (a zero-capacity battery, for one) cannot be tuned: it is simulated with
/// the center of the initial window and reported without scores.
///
/// # Errors
///
/// Propagates the first error from aggregation, optimization or simulation,
/// other than a degenerate search.
pub fn sweep<R: Rng + ?Sized>(
    series: &PowerSeries,
    settings: &Settings,
    config: &OptimizerConfig,
    sizes: &[f64],
    rng: &mut R,
) -> Result<Vec<SweepPoint>> {
    let intervals = aggregate(series, settings)?;
    let mut points = Vec::with_capacity(sizes.len());

    for &energy in sizes {
        let mut sized = settings.clone();
        sized.battery.energy = energy;

        let (gains, scores) = match optimize(series, &sized, config, rng) {
            Ok(tuned) => (tuned.gains, Some((tuned.train_score, tuned.test_score))),
            Err(Error::DegenerateSearch(reason)) => {
                warn!(battery_energy = energy, %reason, "gains not tunable at this size");
                (SearchWindow::initial(&sized, config).center(), None)
            }
            Err(e) => return Err(e),
        };
        let sim = simulate(&intervals, &sized, gains)?;
        info!(
            battery_energy = energy,
            scores = ?scores,
            violations = sim.violation_count,
            gains = %gains,
            "sweep point"
        );

        points.push(SweepPoint {
            battery_energy: energy,
            train_score: scores.map(|(train, _)| train),
            test_score: scores.map(|(_, test)| test),
            total_energy: sim.total_energy,
            violations: sim.violation_count,
            gains,
        });
    }
    Ok(points)
}
