//! CSV export for controller runs and battery size sweeps.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::opt::SweepPoint;
use crate::sim::Simulation;

/// Column header for per-interval telemetry.
const INTERVAL_HEADER: &str = "interval,time_hr,pv_power,out_power,battery_power,\
                               battery_soc,curtailed_power,violation";

/// Column header for sweep results.
const SWEEP_HEADER: &str = "battery_energy,train_score,test_score,total_energy,\
                            violations,kp,ki,kf,soc_rest";

/// Exports a controller run to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(sim: &Simulation, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_csv(sim, io::BufWriter::new(file))
}

/// Writes one row per interval to any writer.
///
/// `time_hr` is the end of the interval, in hours from the series start.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(sim: &Simulation, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(INTERVAL_HEADER.split(',').map(str::trim))?;

    for (i, r) in sim.results.iter().enumerate() {
        wtr.write_record(&[
            i.to_string(),
            format!("{:.4}", (i + 1) as f64 * sim.interval_hours),
            format!("{:.6}", r.pv_power),
            format!("{:.6}", r.out_power),
            format!("{:.6}", r.battery_power),
            format!("{:.6}", r.battery_soc),
            format!("{:.6}", r.curtailed_power),
            r.violation.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports sweep points to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_sweep_csv(points: &[SweepPoint], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_sweep_csv(points, io::BufWriter::new(file))
}

/// Writes one row per battery size to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_sweep_csv(points: &[SweepPoint], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(SWEEP_HEADER.split(',').map(str::trim))?;

    for p in points {
        wtr.write_record(&[
            p.battery_energy.to_string(),
            p.train_score.map(|s| s.to_string()).unwrap_or_default(),
            p.test_score.map(|s| s.to_string()).unwrap_or_default(),
            format!("{:.6}", p.total_energy),
            p.violations.to_string(),
            p.gains.kp.to_string(),
            p.gains.ki.to_string(),
            p.gains.kf.to_string(),
            p.gains.soc_rest.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::{Gains, IntervalResult};

    fn make_sim(n: usize) -> Simulation {
        let results = (0..n)
            .map(|i| IntervalResult {
                pv_power: 0.5,
                out_power: 0.4,
                battery_power: -0.1,
                battery_soc: 0.01 * i as f64,
                curtailed_power: 0.0,
                violation: i % 2 == 0,
            })
            .collect();
        Simulation {
            results,
            violation_count: n.div_ceil(2),
            total_energy: 0.4 * n as f64 / 6.0,
            interval_hours: 10.0 / 60.0,
        }
    }

    fn lines(buf: Vec<u8>) -> Vec<String> {
        String::from_utf8(buf)
            .ok()
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn interval_header() {
        let mut buf = Vec::new();
        write_csv(&make_sim(1), &mut buf).ok();
        assert_eq!(
            lines(buf).first().map(String::as_str),
            Some("interval,time_hr,pv_power,out_power,battery_power,battery_soc,curtailed_power,violation")
        );
    }

    #[test]
    fn row_count_matches_interval_count() {
        let mut buf = Vec::new();
        write_csv(&make_sim(144), &mut buf).ok();
        // 1 header + 144 data rows
        assert_eq!(lines(buf).len(), 145);
    }

    #[test]
    fn rows_parse_back() {
        let mut buf = Vec::new();
        write_csv(&make_sim(3), &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let mut rows = 0;
        for record in rdr.records() {
            let Ok(rec) = record else {
                panic!("every row should parse");
            };
            for i in 1..7 {
                assert!(rec[i].parse::<f64>().is_ok(), "column {i} should parse as f64");
            }
            assert!(rec[7].parse::<bool>().is_ok());
            rows += 1;
        }
        assert_eq!(rows, 3);
    }

    #[test]
    fn time_is_interval_end() {
        let mut buf = Vec::new();
        write_csv(&make_sim(6), &mut buf).ok();
        let last = lines(buf).pop().unwrap_or_default();
        assert!(last.starts_with("5,1.0000,"), "{last}");
    }

    #[test]
    fn sweep_rows() {
        let points = vec![
            SweepPoint {
                battery_energy: 0.2,
                train_score: Some(4.0),
                test_score: Some(6),
                total_energy: 12.5,
                violations: 5,
                gains: Gains::default(),
            };
            2
        ];
        let mut buf = Vec::new();
        write_sweep_csv(&points, &mut buf).ok();
        let lines = lines(buf);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "0.2,4,6,12.500000,5,1.2,1.8,0.3,0.5");
    }

    #[test]
    fn untuned_sweep_point_leaves_scores_empty() {
        let point = SweepPoint {
            battery_energy: 0.0,
            train_score: None,
            test_score: None,
            total_energy: 3.0,
            violations: 7,
            gains: Gains::default(),
        };
        let mut buf = Vec::new();
        write_sweep_csv(&[point], &mut buf).ok();
        assert!(lines(buf)[1].starts_with("0,,,3.000000,7,"));
    }
}
