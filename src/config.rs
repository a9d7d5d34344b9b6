//! TOML-based run configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::bos::inputs::{InputValue, Overrides, keys};
use crate::lcoe::{BranchSpec, LcoeParams};

/// Top-level run configuration parsed from TOML.
///
/// Every section is optional. Load from TOML with
/// [`RunConfig::from_toml_file`] or start from a named preset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Where the project list, project data and weather live.
    #[serde(default)]
    pub inputs: InputsConfig,
    /// Scenario overrides applied to every project.
    #[serde(default)]
    pub overrides: Overrides,
    /// BOS batch output files.
    #[serde(default)]
    pub output: OutputConfig,
    /// LCOE pipeline files and constants.
    #[serde(default)]
    pub lcoe: LcoeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputsConfig {
    /// Directory holding the project list workbook.
    pub project_list_dir: PathBuf,
    /// Workbook name of the project list.
    pub project_list: String,
    /// Directory holding project data workbooks.
    pub project_data_dir: PathBuf,
    /// Weather CSV used when no `weather_file_path` override is given.
    pub default_weather: Option<PathBuf>,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            project_list_dir: PathBuf::from("inputs"),
            project_list: "project_list".to_string(),
            project_data_dir: PathBuf::from("inputs/project_data"),
            default_weather: None,
        }
    }
}

/// BOS batch output files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// One row per scenario.
    pub report_csv: PathBuf,
    pub report_json: PathBuf,
    /// Per-module costs consumed by the LCOE pipeline.
    pub line_items_csv: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_csv: PathBuf::from("bos_report.csv"),
            report_json: PathBuf::from("bos_report.json"),
            line_items_csv: PathBuf::from("bos_line_items.csv"),
        }
    }
}

/// LCOE pipeline files and constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LcoeConfig {
    pub line_items: PathBuf,
    pub aep: PathBuf,
    pub tcc: PathBuf,
    pub output: PathBuf,
    /// Fixed charge rate (per year, 0-1].
    pub fcr_per_yr: f64,
    /// Operating cost (USD per kW per year, >= 0).
    pub opex_usd_per_kw_yr: f64,
    /// Module aliases to discount, e.g. `"Erection"`.
    pub target_modules: Vec<String>,
    /// Cost multiplier for the targeted module (0-1].
    pub modification_fraction: f64,
}

impl Default for LcoeConfig {
    fn default() -> Self {
        let params = LcoeParams::default();
        let spec = BranchSpec::default();
        Self {
            line_items: PathBuf::from("bos_line_items.csv"),
            aep: PathBuf::from("aep.csv"),
            tcc: PathBuf::from("tcc.csv"),
            output: PathBuf::from("lcoe_analysis.csv"),
            fcr_per_yr: params.fcr_per_yr,
            opex_usd_per_kw_yr: params.opex_usd_per_kw_yr,
            target_modules: spec.aliases,
            modification_fraction: spec.fraction,
        }
    }
}

impl LcoeConfig {
    pub fn params(&self) -> LcoeParams {
        LcoeParams {
            fcr_per_yr: self.fcr_per_yr,
            opex_usd_per_kw_yr: self.opex_usd_per_kw_yr,
        }
    }

    pub fn branch_spec(&self) -> BranchSpec {
        BranchSpec {
            aliases: self.target_modules.clone(),
            fraction: self.modification_fraction,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"lcoe.fcr_per_yr"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl RunConfig {
    /// Returns the default configuration: project values as given, no overrides.
    pub fn default_run() -> Self {
        Self::default()
    }

    /// Returns the reference plant: 100 turbines of 1.5 MW, 77 m rotor, 80 m hub.
    pub fn reference_plant() -> Self {
        let overrides: Overrides = [
            (keys::INTERCONNECT_VOLTAGE_KV, 137.0),
            (keys::DISTANCE_TO_INTERCONNECT_MI, 10.0),
            (keys::NUM_TURBINES, 100.0),
            (keys::TURBINE_SPACING_ROTOR_DIAMETERS, 4.0),
            (keys::ROW_SPACING_ROTOR_DIAMETERS, 10.0),
            (keys::TURBINE_RATING_MW, 1.5),
            (keys::ROTOR_DIAMETER_M, 77.0),
            (keys::HUB_HEIGHT_METERS, 80.0),
            (keys::WIND_SHEAR_EXPONENT, 0.20),
            (keys::DEPTH, 2.36),
            (keys::RATED_THRUST_N, 589_000.0),
            (keys::LABOR_COST_MULTIPLIER, 1.0),
            (keys::GUST_VELOCITY_M_PER_S, 59.50),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), InputValue::Number(v)))
        .collect();
        Self {
            overrides,
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "reference_plant"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default_run()),
            "reference_plant" => Ok(Self::reference_plant()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let l = &self.lcoe;

        if !(l.fcr_per_yr > 0.0 && l.fcr_per_yr <= 1.0) {
            errors.push(ConfigError {
                field: "lcoe.fcr_per_yr".into(),
                message: "must be in (0, 1]".into(),
            });
        }
        if !(l.opex_usd_per_kw_yr >= 0.0) {
            errors.push(ConfigError {
                field: "lcoe.opex_usd_per_kw_yr".into(),
                message: "must be >= 0".into(),
            });
        }
        if !(l.modification_fraction > 0.0 && l.modification_fraction <= 1.0) {
            errors.push(ConfigError {
                field: "lcoe.modification_fraction".into(),
                message: "must be in (0, 1]".into(),
            });
        }
        if l.target_modules.is_empty() {
            errors.push(ConfigError {
                field: "lcoe.target_modules".into(),
                message: "must name at least one module".into(),
            });
        }
        for (i, alias) in l.target_modules.iter().enumerate() {
            if l.target_modules[..i].contains(alias) {
                errors.push(ConfigError {
                    field: "lcoe.target_modules".into(),
                    message: format!("\"{alias}\" is listed more than once"),
                });
            }
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ConfigError {
                field: "logging.level".into(),
                message: format!(
                    "must be one of {}, got \"{}\"",
                    LOG_LEVELS.join(", "),
                    self.logging.level
                ),
            });
        }

        errors
    }
}
