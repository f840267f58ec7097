//! Shrinking-window grid search over controller gains.
//!
//! Each level scores every candidate of the current [`SearchWindow`] in
//! parallel, picks a best gain set, and recenters a narrower window on it.
//! The search stops once a level fails to lower the mean training score,
//! after one extra attempt in a further narrowed window.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::OptimizerConfig;
use crate::error::{Error, Result};
use crate::sim::types::Gains;

use super::window::{Axis, SearchWindow};

/// How a level's candidate scores become the next window center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Take the single candidate with the lowest training score.
    BestCombination,
    /// Per gain, compare the mean score of candidates below and above the
    /// gain's mean value and keep the mean value of the better side.
    #[default]
    ParameterAverage,
}

/// Violation counts of one candidate on the training and testing subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub train: usize,
    pub test: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub gains: Gains,
    pub score: Score,
}

/// Statistics of one evaluated level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSummary {
    pub level: usize,
    pub window: SearchWindow,
    pub candidates: usize,
    pub train_mean: f64,
    pub train_min: usize,
    pub test_min: usize,
    /// Whether this level lowered the best mean training score.
    pub improved: bool,
}

/// Why a search returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A level failed to improve twice in a row.
    Converged,
    MaxIterations,
    TimeLimit,
}

/// Result of a completed grid search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub gains: Gains,
    /// Mean training score of the best level.
    pub best_train_mean: f64,
    /// Smallest testing score seen on any level.
    pub min_test: usize,
    pub levels: Vec<LevelSummary>,
    pub stop: StopReason,
}

/// Grid search parameters.
#[derive(Debug, Clone)]
pub struct GridSearch {
    pub sections: usize,
    pub window_reduction_factor: f64,
    pub max_iterations: usize,
    pub strategy: SelectionStrategy,
    pub time_limit: Option<Duration>,
}

impl GridSearch {
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self {
            sections: config.sections,
            window_reduction_factor: config.window_reduction_factor,
            max_iterations: config.max_iterations,
            strategy: config.strategy,
            time_limit: config.time_limit_secs.map(Duration::from_secs),
        }
    }

    /// Scores every candidate of `window`, preserving candidate order.
    pub fn evaluate<F>(&self, window: &SearchWindow, score: &F) -> Vec<Candidate>
    where
        F: Fn(&Gains) -> Score + Sync,
    {
        window
            .candidates(self.sections)
            .into_par_iter()
            .map(|gains| {
                let score = score(&gains);
                debug!(%gains, train = score.train, test = score.test, "candidate scored");
                Candidate { gains, score }
            })
            .collect()
    }

    /// Picks the next window center from a level's scored candidates.
    pub fn select(&self, candidates: &[Candidate], window: &SearchWindow) -> Gains {
        match self.strategy {
            SelectionStrategy::BestCombination => best_combination(candidates),
            SelectionStrategy::ParameterAverage => {
                parameter_average(candidates, window, self.sections)
            }
        }
    }

    /// Runs the search from `initial`, scoring candidates with `score`.
    ///
    /// # Errors
    ///
    /// Returns `DegenerateSearch` if `sections` is zero, a searched range
    /// has no width, or every first-level candidate scores the same nonzero
    /// count. A first level scoring zero everywhere returns the window
    /// center instead.
    pub fn run<F>(&self, initial: SearchWindow, score: F) -> Result<SearchOutcome>
    where
        F: Fn(&Gains) -> Score + Sync,
    {
        if self.sections == 0 {
            return Err(Error::DegenerateSearch("sections must be at least 1".into()));
        }
        initial.ensure_open()?;

        let started = Instant::now();
        let mut window = initial;
        let mut best: Option<Gains> = None;
        let mut best_mean = f64::INFINITY;
        let mut min_test = usize::MAX;
        let mut retry_available = true;
        let mut levels = Vec::new();
        let mut stop = StopReason::MaxIterations;

        for level in 0..self.max_iterations {
            if let Some(limit) = self.time_limit {
                if level > 0 && started.elapsed() >= limit {
                    warn!(level, ?limit, "search time limit reached");
                    stop = StopReason::TimeLimit;
                    break;
                }
            }
            window.ensure_open()?;

            let candidates = self.evaluate(&window, &score);
            let n = candidates.len();
            let train_mean =
                candidates.iter().map(|c| c.score.train as f64).sum::<f64>() / n as f64;
            let train_min = candidates.iter().map(|c| c.score.train).min().unwrap_or(0);
            let train_max = candidates.iter().map(|c| c.score.train).max().unwrap_or(0);
            let test_min = candidates
                .iter()
                .map(|c| c.score.test)
                .min()
                .unwrap_or(usize::MAX);
            min_test = min_test.min(test_min);

            if level == 0 && train_min == train_max {
                if train_max > 0 {
                    return Err(Error::DegenerateSearch(format!(
                        "all {n} candidates scored {train_max} violations"
                    )));
                }
                info!(candidates = n, "every candidate is violation-free");
                let summary = LevelSummary {
                    level,
                    window,
                    candidates: n,
                    train_mean,
                    train_min,
                    test_min,
                    improved: true,
                };
                return Ok(SearchOutcome {
                    gains: window.center(),
                    best_train_mean: 0.0,
                    min_test,
                    levels: vec![summary],
                    stop: StopReason::Converged,
                });
            }

            let improved = train_mean < best_mean;
            levels.push(LevelSummary {
                level,
                window,
                candidates: n,
                train_mean,
                train_min,
                test_min,
                improved,
            });

            if improved {
                let gains = self.select(&candidates, &window);
                info!(level, train_mean, train_min, %gains, "search level improved");
                best_mean = train_mean;
                best = Some(gains);
                retry_available = true;
                window = window.narrowed(gains, self.sections, self.window_reduction_factor);
            } else if retry_available {
                debug!(level, train_mean, best_mean, "no improvement, narrowing once more");
                retry_available = false;
                let center = best.unwrap_or_else(|| window.center());
                window = window.narrowed(center, self.sections, self.window_reduction_factor);
            } else {
                debug!(level, "no improvement after retry");
                stop = StopReason::Converged;
                break;
            }
        }

        if matches!(stop, StopReason::MaxIterations) {
            warn!(max_iterations = self.max_iterations, "search stopped before converging");
        }
        let gains = best.unwrap_or_else(|| initial.center());
        info!(levels = levels.len(), ?stop, %gains, "search finished");
        Ok(SearchOutcome {
            gains,
            best_train_mean: best_mean,
            min_test,
            levels,
            stop,
        })
    }
}

/// First candidate with the lowest training score.
fn best_combination(candidates: &[Candidate]) -> Gains {
    candidates
        .iter()
        .min_by_key(|c| c.score.train)
        .map(|c| c.gains)
        .unwrap_or_default()
}

fn parameter_average(candidates: &[Candidate], window: &SearchWindow, sections: usize) -> Gains {
    let mut best = [0.0; 4];
    for (i, axis) in window.axes.iter().enumerate() {
        best[i] = match *axis {
            Axis::Fixed(value) => value,
            Axis::Searched(range) => {
                let tolerance = range.step(sections) * 1e-6;
                let values: Vec<f64> = candidates.iter().map(|c| c.gains.to_array()[i]).collect();
                let mid = mean(values.iter().copied());

                let below = candidates.iter().zip(&values).filter(|(_, v)| **v < mid - tolerance);
                let above = candidates.iter().zip(&values).filter(|(_, v)| **v > mid + tolerance);
                let below_score = mean(below.clone().map(|(c, _)| c.score.train as f64));
                let above_score = mean(above.clone().map(|(c, _)| c.score.train as f64));

                if below_score < above_score {
                    mean(below.map(|(_, v)| *v))
                } else if above_score.is_finite() {
                    mean(above.map(|(_, v)| *v))
                } else {
                    mid
                }
            }
        };
    }
    Gains::from_array(best)
}

/// Mean of `values`, NaN when empty.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    sum / n as f64
}
