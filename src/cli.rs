//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ramp-smooth")]
#[command(author, version, about = "PV ramp-rate smoothing with battery and curtailment")]
#[command(
    long_about = "Simulate, tune and size a battery-backed ramp-rate controller for a PV plant.\n\
    \nThe scenario comes from a TOML file (--scenario) or a built-in preset (--preset,\n\
    default baseline). PV data comes from a CSV file (--input) or a seeded synthetic\n\
    cloudy profile (--synthetic-days).\n\
    \nExamples:\n  \
    ramp-smooth simulate --preset curtail_as_control\n  \
    ramp-smooth optimize --input plant.csv --seed 7\n  \
    ramp-smooth sweep --scenario scenarios/baseline.toml --out sweep.csv"
)]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the scenario and the PV series come from.
#[derive(Args)]
pub struct SourceArgs {
    /// Load the scenario from a TOML file
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (baseline, forecast, curtail_as_control, curtail_if_violation)
    #[arg(long, global = true, value_name = "NAME")]
    pub preset: Option<String>,

    /// Read PV power from a CSV file
    #[arg(long, global = true, value_name = "CSV", conflicts_with = "synthetic_days")]
    pub input: Option<PathBuf>,

    /// Days of synthetic cloudy PV to generate when no input file is given
    #[arg(long, global = true, value_name = "DAYS")]
    pub synthetic_days: Option<usize>,

    /// Seed for synthetic data and the train/test split
    #[arg(long, global = true, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the controller once with fixed gains and report KPIs
    Simulate(SimulateArgs),

    /// Tune the gains on a random day split, then report full-series KPIs
    Optimize(OutputArgs),

    /// Tune and simulate once per battery size
    Sweep(SweepArgs),
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Proportional gain
    #[arg(long)]
    pub kp: Option<f64>,

    /// Integral (state-of-charge) gain
    #[arg(long)]
    pub ki: Option<f64>,

    /// Forecast feed-forward gain
    #[arg(long)]
    pub kf: Option<f64>,

    /// Resting state of charge as a fraction of capacity
    #[arg(long)]
    pub soc_rest: Option<f64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct OutputArgs {
    /// Export per-interval results to CSV
    #[arg(long, value_name = "PATH")]
    pub telemetry_out: Option<PathBuf>,

    /// Write a diagnostic PNG plot
    #[cfg(feature = "plot")]
    #[arg(long, value_name = "PATH")]
    pub plot: Option<PathBuf>,
}

#[derive(Args)]
pub struct SweepArgs {
    /// Battery sizes in hours of nameplate, overriding the scenario's list
    #[arg(long, value_delimiter = ',', value_name = "SIZES")]
    pub sizes: Option<Vec<f64>>,

    /// Export sweep points to CSV
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Write a PNG plot of violations against battery size
    #[cfg(feature = "plot")]
    #[arg(long, value_name = "PATH")]
    pub plot: Option<PathBuf>,
}
