//! ramp-smooth entry point: CLI wiring and config-driven runs.

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ramp_smooth::config::ScenarioConfig;
use ramp_smooth::devices::SolarProfile;
use ramp_smooth::io::export::{export_csv, export_sweep_csv};
use ramp_smooth::io::import::read_series_file;
use ramp_smooth::opt::{optimize, sweep};
use ramp_smooth::series::PowerSeries;
use ramp_smooth::sim::aggregate::aggregate;
use ramp_smooth::sim::kpi::KpiReport;
use ramp_smooth::sim::{Gains, Simulation, simulate};

use cli::{Cli, Command, OutputArgs, SimulateArgs, SourceArgs, SweepArgs};

/// Days of synthetic data generated when neither an input file nor a day
/// count is given.
const DEFAULT_SYNTHETIC_DAYS: usize = 4;

/// Seed offset for the split RNG so it does not replay the synthetic data.
const SPLIT_SEED_OFFSET: u64 = 1;

fn load_scenario(source: &SourceArgs) -> Result<ScenarioConfig> {
    let scenario = if let Some(path) = &source.scenario {
        ScenarioConfig::from_toml_file(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?
    } else {
        let name = source.preset.as_deref().unwrap_or("baseline");
        ScenarioConfig::from_preset(name)?
    };

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("{e}");
        }
        bail!("invalid scenario ({} errors)", errors.len());
    }
    Ok(scenario)
}

fn load_series(source: &SourceArgs, scenario: &ScenarioConfig) -> Result<PowerSeries> {
    if let Some(path) = &source.input {
        let series = read_series_file(path, &scenario.input)
            .with_context(|| format!("failed to read {}", path.display()))?;
        info!(
            samples = series.len(),
            days = series.day_count(),
            energy = series.energy(),
            "loaded input series"
        );
        return Ok(series);
    }

    let days = source.synthetic_days.unwrap_or(DEFAULT_SYNTHETIC_DAYS);
    info!(days, seed = source.seed, "generating synthetic cloudy PV");
    Ok(SolarProfile::cloudy(scenario.input.sample_minutes, source.seed).series(days))
}

/// Simulates the full series, prints the KPI report, and writes any outputs.
fn report(
    series: &PowerSeries,
    scenario: &ScenarioConfig,
    gains: Gains,
    output: &OutputArgs,
) -> Result<Simulation> {
    let settings = &scenario.controller;
    let intervals = aggregate(series, settings)?;
    let sim = simulate(&intervals, settings, gains)?;
    let kpi = KpiReport::from_simulation(&sim, settings.battery.energy);
    println!("{kpi}");

    if let Some(path) = &output.telemetry_out {
        export_csv(&sim, path).with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "telemetry written");
    }

    #[cfg(feature = "plot")]
    if let Some(path) = &output.plot {
        ramp_smooth::plot::plot_simulation(&sim, settings.battery.energy, path)
            .map_err(|e| anyhow::anyhow!("failed to plot {}: {e}", path.display()))?;
        info!(path = %path.display(), "plot written");
    }

    Ok(sim)
}

fn run_simulate(series: &PowerSeries, scenario: &ScenarioConfig, args: &SimulateArgs) -> Result<()> {
    let d = Gains::default();
    let gains = Gains::new(
        args.kp.unwrap_or(d.kp),
        args.ki.unwrap_or(d.ki),
        args.kf.unwrap_or(d.kf),
        args.soc_rest.unwrap_or(d.soc_rest),
    );
    println!("Gains: {gains}");
    report(series, scenario, gains, &args.output)?;
    Ok(())
}

fn run_optimize(
    series: &PowerSeries,
    scenario: &ScenarioConfig,
    output: &OutputArgs,
    seed: u64,
) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(SPLIT_SEED_OFFSET));
    let tuned = optimize(series, &scenario.controller, &scenario.optimizer, &mut rng)?;

    println!("Gains: {}", tuned.gains);
    println!("Training score: {:.2}", tuned.train_score);
    println!("Testing score: {}", tuned.test_score);
    println!("Search levels: {}", tuned.levels.len());
    report(series, scenario, tuned.gains, output)?;
    Ok(())
}

fn run_sweep(
    series: &PowerSeries,
    scenario: &ScenarioConfig,
    args: &SweepArgs,
    seed: u64,
) -> Result<()> {
    let sizes = args
        .sizes
        .as_deref()
        .unwrap_or(&scenario.sweep.battery_energies);
    if sizes.iter().any(|e| !(*e >= 0.0)) {
        bail!("battery sizes must be >= 0");
    }

    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(SPLIT_SEED_OFFSET));
    let points = sweep(
        series,
        &scenario.controller,
        &scenario.optimizer,
        sizes,
        &mut rng,
    )?;

    for p in &points {
        let scores = match (p.train_score, p.test_score) {
            (Some(train), Some(test)) => format!("training {train:.2}, testing {test}"),
            _ => "not tunable".to_string(),
        };
        println!(
            "Battery {:.3} h: violations {}, {scores}, energy {:.3} h, gains {}",
            p.battery_energy, p.violations, p.total_energy, p.gains
        );
    }

    if let Some(path) = &args.out {
        export_sweep_csv(&points, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "sweep written");
    }

    #[cfg(feature = "plot")]
    if let Some(path) = &args.plot {
        ramp_smooth::plot::plot_sweep(&points, path)
            .map_err(|e| anyhow::anyhow!("failed to plot {}: {e}", path.display()))?;
        info!(path = %path.display(), "plot written");
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let scenario = load_scenario(&cli.source)?;
    let series = load_series(&cli.source, &scenario)?;

    match &cli.command {
        Command::Simulate(args) => run_simulate(&series, &scenario, args),
        Command::Optimize(output) => run_optimize(&series, &scenario, output, cli.source.seed),
        Command::Sweep(args) => run_sweep(&series, &scenario, args, cli.source.seed),
    }
}
