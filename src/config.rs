//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::error::Result;
use crate::opt::search::SelectionStrategy;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Ramp controller settings.
    pub controller: Settings,
    /// Gain search parameters.
    pub optimizer: OptimizerConfig,
    /// Battery sizes for the size sweep.
    pub sweep: SweepConfig,
    /// How to read and normalize the input series.
    pub input: InputConfig,
}

/// Controller settings, immutable for the duration of one run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub ramp: RampConfig,
    pub grid: GridConfig,
    pub forecast: ForecastConfig,
    pub battery: BatteryConfig,
    /// What happens to up-ramp excess the battery could not absorb.
    pub curtailment: CurtailmentPolicy,
}

/// Ramp interval and limit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RampConfig {
    /// Interval over which average power is taken and the ramp is enforced (minutes).
    pub interval_minutes: u32,
    /// Maximum change of interval power between consecutive intervals (fraction of nameplate).
    pub max_ramp: f64,
}

impl RampConfig {
    /// Interval length in hours; converts interval-average power to energy.
    pub fn interval_hours(&self) -> f64 {
        f64::from(self.interval_minutes) / 60.0
    }
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 10,
            max_ramp: 0.1,
        }
    }
}

/// AC power bounds at the point of interconnection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub upper_bound_on: bool,
    /// Upper AC bound (times nameplate).
    pub upper_bound: f64,
    pub lower_bound_on: bool,
    /// Lower AC bound (times nameplate, negative when grid draw is allowed).
    pub lower_bound: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            upper_bound_on: true,
            upper_bound: 1.05,
            lower_bound_on: true,
            lower_bound: -0.01,
        }
    }
}

/// Short-term energy forecast used by the feed-forward term.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    pub enabled: bool,
    /// Forecast window in ramp intervals.
    pub horizon: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            horizon: 3,
        }
    }
}

/// Battery storage sizing, normalized to the PV nameplate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Energy capacity in hours of nameplate power.
    pub energy: f64,
    /// Power rating as a fraction of nameplate.
    pub power: f64,
    /// Round-trip efficiency in (0, 1], including power electronics.
    pub round_trip_efficiency: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            energy: 0.2,
            power: 1.0,
            round_trip_efficiency: 0.9,
        }
    }
}

/// Treatment of up-ramp excess that storage could not smooth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurtailmentPolicy {
    /// Excess passes through to the grid and counts as a violation.
    #[default]
    #[serde(rename = "none")]
    PassThrough,
    /// Curtailment is part of the control; clipped up-ramps are not violations.
    AsControl,
    /// Excess is curtailed but the interval still counts as a violation.
    IfViolation,
}

impl CurtailmentPolicy {
    /// Whether up-ramp excess is clipped to the ramp limit.
    pub fn curtails(self) -> bool {
        !matches!(self, Self::PassThrough)
    }
}

/// Parameters of the shrinking-window gain search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Equal sections each range is split into per level.
    pub sections: usize,
    /// Window shrink factor per level, in (1, 2].
    pub window_reduction_factor: f64,
    /// Hard cap on search levels.
    pub max_iterations: usize,
    pub strategy: SelectionStrategy,
    /// Search `kf` too; otherwise it is held at zero.
    pub search_kf: bool,
    /// Wall-clock budget checked between levels.
    pub time_limit_secs: Option<u64>,
    /// Initial range overrides (`[low, high]`).
    pub kp_range: Option<[f64; 2]>,
    pub ki_range: Option<[f64; 2]>,
    pub kf_range: Option<[f64; 2]>,
    pub soc_rest_range: Option<[f64; 2]>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            sections: 2,
            window_reduction_factor: 2.0,
            max_iterations: 25,
            strategy: SelectionStrategy::default(),
            search_kf: false,
            time_limit_secs: None,
            kp_range: None,
            ki_range: None,
            kf_range: None,
            soc_rest_range: None,
        }
    }
}

/// Candidate battery sizes for the sweep.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// Battery energy capacities (hours of nameplate).
    pub battery_energies: Vec<f64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            battery_energies: vec![0.2, 0.1, 0.05],
        }
    }
}

/// Input CSV layout and normalization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Spacing of input samples (minutes).
    pub sample_minutes: u32,
    /// Header of the power column.
    pub power_column: String,
    /// AC nameplate the raw power is divided by.
    pub nameplate: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            sample_minutes: 1,
            power_column: "Power".to_string(),
            nameplate: 500.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"controller.battery.power"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Settings {
    /// Validates controller settings and returns a list of errors.
    ///
    /// Returns an empty vector if the settings are valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let r = &self.ramp;
        if r.interval_minutes == 0 {
            errors.push(ConfigError::new("controller.ramp.interval_minutes", "must be > 0"));
        }
        if !(r.max_ramp > 0.0) {
            errors.push(ConfigError::new("controller.ramp.max_ramp", "must be > 0"));
        }

        let g = &self.grid;
        if g.upper_bound_on && g.lower_bound_on && g.lower_bound >= g.upper_bound {
            errors.push(ConfigError::new(
                "controller.grid.lower_bound",
                "must be < controller.grid.upper_bound",
            ));
        }

        if self.forecast.enabled && self.forecast.horizon == 0 {
            errors.push(ConfigError::new(
                "controller.forecast.horizon",
                "must be > 0 when forecasting is enabled",
            ));
        }

        let b = &self.battery;
        if !(b.energy >= 0.0) {
            errors.push(ConfigError::new("controller.battery.energy", "must be >= 0"));
        }
        if !(b.power >= 0.0) {
            errors.push(ConfigError::new("controller.battery.power", "must be >= 0"));
        }
        if !(b.round_trip_efficiency > 0.0 && b.round_trip_efficiency <= 1.0) {
            errors.push(ConfigError::new(
                "controller.battery.round_trip_efficiency",
                "must be in (0.0, 1.0]",
            ));
        }

        errors
    }

    /// Fails with the first validation error, if any.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` reported by [`Settings::validate`].
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        self.validate().into_iter().next().map_or(Ok(()), Err)
    }
}

impl OptimizerConfig {
    /// Validates search parameters and returns a list of errors.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.sections == 0 {
            errors.push(ConfigError::new("optimizer.sections", "must be > 0"));
        }
        if !(self.window_reduction_factor > 1.0 && self.window_reduction_factor <= 2.0) {
            errors.push(ConfigError::new(
                "optimizer.window_reduction_factor",
                "must be in (1.0, 2.0]",
            ));
        }
        if self.max_iterations == 0 {
            errors.push(ConfigError::new("optimizer.max_iterations", "must be > 0"));
        }
        errors
    }

    /// Fails with the first validation error, if any.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` reported by [`OptimizerConfig::validate`].
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        self.validate().into_iter().next().map_or(Ok(()), Err)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: battery smoothing, no forecast, no curtailment.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the forecast preset: feed-forward term enabled over a 3-interval horizon.
    pub fn forecast() -> Self {
        Self {
            controller: Settings {
                forecast: ForecastConfig {
                    enabled: true,
                    ..ForecastConfig::default()
                },
                ..Settings::default()
            },
            optimizer: OptimizerConfig {
                search_kf: true,
                ..OptimizerConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the curtail-as-control preset: up-ramps are clipped, battery floats near full.
    pub fn curtail_as_control() -> Self {
        Self {
            controller: Settings {
                curtailment: CurtailmentPolicy::AsControl,
                ..Settings::default()
            },
            ..Self::default()
        }
    }

    /// Returns the curtail-if-violation preset: excess is curtailed but still counted.
    pub fn curtail_if_violation() -> Self {
        Self {
            controller: Settings {
                curtailment: CurtailmentPolicy::IfViolation,
                ..Settings::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &[
        "baseline",
        "forecast",
        "curtail_as_control",
        "curtail_if_violation",
    ];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "forecast" => Ok(Self::forecast()),
            "curtail_as_control" => Ok(Self::curtail_as_control()),
            "curtail_if_violation" => Ok(Self::curtail_if_violation()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Validates all sections and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = self.controller.validate();
        errors.extend(self.optimizer.validate());

        if self.sweep.battery_energies.iter().any(|e| !(*e >= 0.0)) {
            errors.push(ConfigError::new(
                "sweep.battery_energies",
                "every size must be >= 0",
            ));
        }

        let i = &self.input;
        if i.sample_minutes == 0 {
            errors.push(ConfigError::new("input.sample_minutes", "must be > 0"));
        }
        if !(i.nameplate > 0.0) {
            errors.push(ConfigError::new("input.nameplate", "must be > 0"));
        }
        if i.sample_minutes > 0 && self.controller.ramp.interval_minutes % i.sample_minutes != 0 {
            errors.push(ConfigError::new(
                "controller.ramp.interval_minutes",
                format!(
                    "must be a multiple of input.sample_minutes ({})",
                    i.sample_minutes
                ),
            ));
        }

        errors
    }
}
