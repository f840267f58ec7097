//! Gain tuning: a random day split scored by the ramp controller.

use rand::Rng;
use tracing::info;

use crate::config::{OptimizerConfig, Settings};
use crate::error::Result;
use crate::series::PowerSeries;
use crate::sim::aggregate::aggregate;
use crate::sim::controller::RampController;
use crate::sim::engine::{count_violations, preflight};
use crate::sim::types::Gains;

use super::search::{GridSearch, LevelSummary, Score, StopReason};
use super::split::split_by_day;
use super::window::SearchWindow;

/// Tuned gains and the scores that justified them.
#[derive(Debug, Clone)]
pub struct Optimization {
    pub gains: Gains,
    /// Twice the best level's mean training violation count.
    pub train_score: f64,
    /// Twice the lowest testing violation count seen on any level.
    pub test_score: usize,
    pub training_days: Vec<usize>,
    pub levels: Vec<LevelSummary>,
    pub stop: StopReason,
}

/// Tunes the controller gains for `series`.
///
/// Splits the series by day with `rng`, then runs the grid search with each
/// candidate scored by its violation count on the training and testing
/// subsets. Scores are doubled because each subset covers about half of the
/// days.
///
/// # Errors
///
/// Returns a configuration error for invalid settings or optimizer config,
/// `InsufficientData` if the series is too short to split or aggregate, and
/// `DegenerateSearch` if the search has nothing to distinguish.
pub fn optimize<R: Rng + ?Sized>(
    series: &PowerSeries,
    settings: &Settings,
    config: &OptimizerConfig,
    rng: &mut R,
) -> Result<Optimization> {
    settings.ensure_valid()?;
    config.ensure_valid()?;

    let split = split_by_day(series, rng)?;
    let training = aggregate(&split.training, settings)?;
    let testing = aggregate(&split.testing, settings)?;
    preflight(&training, settings)?;

    info!(
        days = series.day_count(),
        training_days = ?split.training_days,
        testing_days = ?split.testing_days(),
        intervals = training.len(),
        "optimizing gains"
    );

    let score = |gains: &Gains| {
        let controller = RampController::new(settings, *gains);
        Score {
            train: count_violations(&controller, &training),
            test: count_violations(&controller, &testing),
        }
    };

    let initial = SearchWindow::initial(settings, config);
    let outcome = GridSearch::from_config(config).run(initial, score)?;

    Ok(Optimization {
        gains: outcome.gains,
        train_score: 2.0 * outcome.best_train_mean,
        test_score: outcome.min_test.saturating_mul(2),
        training_days: split.training_days,
        levels: outcome.levels,
        stop: outcome.stop,
    })
}
