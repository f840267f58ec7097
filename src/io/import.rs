//! CSV reader for measured PV power.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::config::{ConfigError, InputConfig};
use crate::error::{Error, Result};
use crate::series::PowerSeries;

/// Reads a power series from CSV with a header row.
///
/// The column named `input.power_column` is divided by `input.nameplate`;
/// negative readings (inverter night draw) are clamped to zero. Other
/// columns are ignored.
///
/// # Errors
///
/// Returns a configuration error if the column is missing, `Parse` for a
/// non-numeric cell, `InsufficientData` for a file without data rows, and
/// `Csv` for malformed CSV.
pub fn read_series(reader: impl Read, input: &InputConfig) -> Result<PowerSeries> {
    if input.sample_minutes == 0 {
        return Err(ConfigError::new("input.sample_minutes", "must be > 0").into());
    }
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let column = rdr
        .headers()?
        .iter()
        .position(|h| h == input.power_column)
        .ok_or_else(|| {
            ConfigError::new(
                "input.power_column",
                format!("no column named {:?}", input.power_column),
            )
        })?;

    let mut values = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let cell = record.get(column).unwrap_or("");
        let raw: f64 = cell.parse().map_err(|_| Error::Parse {
            line: record.position().map_or(0, csv::Position::line),
            value: cell.to_string(),
        })?;
        values.push((raw / input.nameplate).max(0.0));
    }

    if values.is_empty() {
        return Err(Error::InsufficientData("input file has no data rows".into()));
    }
    Ok(PowerSeries::new(input.sample_minutes, values))
}

/// Reads a power series from the CSV file at `path`.
///
/// # Errors
///
/// As [`read_series`], plus `Io` if the file cannot be opened.
pub fn read_series_file(path: &Path, input: &InputConfig) -> Result<PowerSeries> {
    let file = File::open(path)?;
    read_series(file, input)
}
