//! Day-based train/test split of a power series.

use rand::Rng;
use rand::seq::index;

use crate::error::{Error, Result};
use crate::series::PowerSeries;

/// Two full-length copies of a series, each zeroed outside its own days.
#[derive(Debug, Clone)]
pub struct Split {
    pub training: PowerSeries,
    pub testing: PowerSeries,
    /// Training day indices, ascending.
    pub training_days: Vec<usize>,
}

impl Split {
    /// Testing day indices, ascending.
    pub fn testing_days(&self) -> Vec<usize> {
        (0..self.training.day_count())
            .filter(|d| self.training_days.binary_search(d).is_err())
            .collect()
    }
}

/// Draws `floor(days / 2)` distinct training days at random; the rest test.
///
/// Night and unselected days become zero power, so both subsets keep the
/// original length and interval alignment.
///
/// # Errors
///
/// Returns `InsufficientData` if the series spans fewer than two days.
pub fn split_by_day<R: Rng + ?Sized>(series: &PowerSeries, rng: &mut R) -> Result<Split> {
    let days = series.day_count();
    if days < 2 {
        return Err(Error::InsufficientData(format!(
            "a train/test split needs at least 2 days, got {days}"
        )));
    }

    let mut training_days = index::sample(rng, days, days / 2).into_vec();
    training_days.sort_unstable();
    let testing_days: Vec<usize> = (0..days)
        .filter(|d| training_days.binary_search(d).is_err())
        .collect();

    Ok(Split {
        training: series.keep_days(&training_days),
        testing: series.keep_days(&testing_days),
        training_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn days(n: usize) -> PowerSeries {
        // Hourly samples, each day filled with its own index + 1.
        let values = (0..n * 24).map(|i| (i / 24 + 1) as f64).collect();
        PowerSeries::new(60, values)
    }

    #[test]
    fn halves_days_and_keeps_length() {
        let series = days(5);
        let split = split_by_day(&series, &mut StdRng::seed_from_u64(7)).ok();
        let split = split.as_ref();
        assert_eq!(split.map(|s| s.training_days.len()), Some(2));
        assert_eq!(split.map(|s| s.testing_days().len()), Some(3));
        assert_eq!(split.map(|s| s.training.len()), Some(series.len()));
        assert_eq!(split.map(|s| s.testing.len()), Some(series.len()));
    }

    #[test]
    fn subsets_partition_the_series() {
        let series = days(6);
        let split = split_by_day(&series, &mut StdRng::seed_from_u64(3));
        let Ok(split) = split else {
            panic!("split failed");
        };
        for ((t, e), v) in split.training.values.iter().zip(&split.testing.values).zip(&series.values) {
            assert!(*t == 0.0 || *e == 0.0);
            assert_eq!(t + e, *v);
        }
    }

    #[test]
    fn same_seed_same_split() {
        let series = days(10);
        let a = split_by_day(&series, &mut StdRng::seed_from_u64(42)).ok();
        let b = split_by_day(&series, &mut StdRng::seed_from_u64(42)).ok();
        assert!(a.is_some() && b.is_some());
        assert_eq!(a.map(|s| s.training_days), b.map(|s| s.training_days));
    }

    #[test]
    fn one_day_is_insufficient() {
        let err = split_by_day(&days(1), &mut StdRng::seed_from_u64(1));
        assert!(matches!(err, Err(Error::InsufficientData(_))));
    }
}
