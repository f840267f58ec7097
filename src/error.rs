//! Crate-wide error type.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised before or around a controller/optimizer run.
///
/// The controller itself never fails once its inputs pass the preflight
/// checks; every variant here is detected before the first interval is
/// processed, or comes from the I/O collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings are inconsistent (see [`ConfigError`] for the field).
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The input series is too short for the requested run.
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    /// The optimizer has nothing to discriminate between.
    #[error("degenerate search: {0}")]
    DegenerateSearch(String),
    /// A cell of the input file is not a number.
    #[error("line {line}: cannot parse {value:?} as power")]
    Parse { line: u64, value: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
