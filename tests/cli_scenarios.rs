use std::path::PathBuf;
use std::process::{Command, Output};

#[derive(Debug)]
struct Kpis {
    violations: f64,
    total_energy: f64,
    curtailed_energy: f64,
}

fn ramp_smooth(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ramp-smooth"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("ramp-smooth process should run")
}

fn run_and_parse_kpis(args: &[&str]) -> Kpis {
    let output = ramp_smooth(args);
    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    Kpis {
        violations: parse_metric(&stdout, "Violations:", ""),
        total_energy: parse_metric(&stdout, "Total energy:", "h"),
        curtailed_energy: parse_metric(&stdout, "Curtailed energy:", "h"),
    }
}

fn parse_metric(stdout: &str, label: &str, unit: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing KPI line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid KPI format for line `{line}`"));
    raw.strip_suffix(unit)
        .unwrap_or(raw)
        .trim()
        .parse()
        .unwrap_or_else(|_| panic!("invalid number in `{line}`"))
}

#[test]
fn scenarios_simulate_via_cli() {
    let baseline = run_and_parse_kpis(&[
        "simulate",
        "--scenario",
        "scenarios/baseline.toml",
        "--synthetic-days",
        "2",
    ]);
    let as_control = run_and_parse_kpis(&[
        "simulate",
        "--scenario",
        "scenarios/curtail_as_control.toml",
        "--synthetic-days",
        "2",
    ]);

    assert_eq!(baseline.curtailed_energy, 0.0, "{baseline:?}");
    assert!(baseline.total_energy > 0.0);
    assert!(as_control.total_energy > 0.0);
    assert!(as_control.curtailed_energy >= 0.0);
    assert!(baseline.violations >= 0.0 && as_control.violations >= 0.0);
}

#[test]
fn every_preset_simulates() {
    for preset in ["baseline", "forecast", "curtail_as_control", "curtail_if_violation"] {
        let kpis = run_and_parse_kpis(&["simulate", "--preset", preset, "--synthetic-days", "1"]);
        assert!(kpis.total_energy > 0.0, "{preset}: {kpis:?}");
    }
}

#[test]
fn telemetry_has_one_row_per_interval() {
    let path: PathBuf = std::env::temp_dir().join(format!("ramp-smooth-{}.csv", std::process::id()));
    let path_str = path.to_string_lossy().to_string();
    run_and_parse_kpis(&[
        "simulate",
        "--preset",
        "baseline",
        "--synthetic-days",
        "2",
        "--telemetry-out",
        &path_str,
    ]);

    let content = std::fs::read_to_string(&path).expect("telemetry file should exist");
    std::fs::remove_file(&path).ok();
    // 2 days of 1-minute samples in 10-minute intervals, plus the header.
    assert_eq!(content.lines().count(), 289);
    assert!(content.starts_with("interval,time_hr,pv_power,out_power"));
}

#[test]
fn optimize_prints_tuned_gains() {
    let output = ramp_smooth(&["optimize", "--scenario", "scenarios/forecast.toml", "--synthetic-days", "2"]);
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Gains: kp="), "{stdout}");
    assert!(stdout.contains("Training score:"));
    assert!(stdout.contains("Violations:"));
}

#[test]
fn scenario_and_preset_are_mutually_exclusive() {
    let output = ramp_smooth(&[
        "simulate",
        "--scenario",
        "scenarios/baseline.toml",
        "--preset",
        "baseline",
    ]);
    assert!(!output.status.success());
}

#[test]
fn unknown_preset_fails() {
    let output = ramp_smooth(&["simulate", "--preset", "nope", "--synthetic-days", "1"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown preset"));
}
