//! Scenario context, caller overrides and non-fatal input validation.
//!
//! Every scenario owns one [`ScenarioContext`]. The pipeline stages mutate it
//! in order (overrides, weather, geometry) and the cost modules only read it.
//! Validation problems land in the context's [`ErrorMap`]; they never abort
//! the run and every check reports independently.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::geometry::{ComponentTable, TurbineGeometry};
use super::modules::ModuleError;
use super::weather::WeatherWindow;
use crate::error::PipelineError;
use crate::table::{Cell, Row, Workbook};

/// Input keys shared between the override layer and the cost modules.
pub mod keys {
    pub const INTERCONNECT_VOLTAGE_KV: &str = "interconnect_voltage_kV";
    pub const DISTANCE_TO_INTERCONNECT_MI: &str = "distance_to_interconnect_mi";
    pub const NUM_TURBINES: &str = "num_turbines";
    pub const TURBINE_SPACING_ROTOR_DIAMETERS: &str = "turbine_spacing_rotor_diameters";
    pub const ROW_SPACING_ROTOR_DIAMETERS: &str = "row_spacing_rotor_diameters";
    pub const TURBINE_RATING_MW: &str = "turbine_rating_MW";
    pub const ROTOR_DIAMETER_M: &str = "rotor_diameter_m";
    pub const HUB_HEIGHT_METERS: &str = "hub_height_meters";
    pub const WIND_SHEAR_EXPONENT: &str = "wind_shear_exponent";
    pub const DEPTH: &str = "depth";
    pub const RATED_THRUST_N: &str = "rated_thrust_N";
    pub const LABOR_COST_MULTIPLIER: &str = "labor_cost_multiplier";
    pub const GUST_VELOCITY_M_PER_S: &str = "gust_velocity_m_per_s";
    pub const CRANE_BREAKDOWN_FRACTION: &str = "crane_breakdown_fraction";
    /// Reserved override key; consumed by the weather stage, never stored.
    pub const WEATHER_FILE_PATH: &str = "weather_file_path";
}

/// Project-list column labels and the input keys they populate.
pub const PROJECT_COLUMN_KEYS: &[(&str, &str)] = &[
    ("Interconnect voltage kV", keys::INTERCONNECT_VOLTAGE_KV),
    ("Distance to interconnect mi", keys::DISTANCE_TO_INTERCONNECT_MI),
    ("Number of turbines", keys::NUM_TURBINES),
    ("Turbine spacing (times rotor diameter)", keys::TURBINE_SPACING_ROTOR_DIAMETERS),
    ("Row spacing (times rotor diameter)", keys::ROW_SPACING_ROTOR_DIAMETERS),
    ("Turbine rating MW", keys::TURBINE_RATING_MW),
    ("Rotor diameter m", keys::ROTOR_DIAMETER_M),
    ("Hub height m", keys::HUB_HEIGHT_METERS),
    ("Wind shear exponent", keys::WIND_SHEAR_EXPONENT),
    ("Foundation depth m", keys::DEPTH),
    ("Rated thrust N", keys::RATED_THRUST_N),
    ("Labor cost multiplier", keys::LABOR_COST_MULTIPLIER),
    ("Gust velocity m per s", keys::GUST_VELOCITY_M_PER_S),
    ("Crane breakdown fraction", keys::CRANE_BREAKDOWN_FRACTION),
];

/// Name of the project data sheet holding the turbine component table.
pub const COMPONENTS_SHEET: &str = "components";

const MIN_TURBINE_COUNT: f64 = 10.0;
const MIN_RATING_MW: f64 = 1.0;
const MAX_RATING_MW: f64 = 8.0;

/// A scalar scenario input. Overrides carry no schema, so any of these may
/// show up under any key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl InputValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            InputValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            InputValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for InputValue {
    fn from(n: f64) -> Self {
        InputValue::Number(n)
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        InputValue::Text(s.to_string())
    }
}

/// Caller-supplied overrides, iterated in key order.
pub type Overrides = BTreeMap<String, InputValue>;

/// Kinds of recoverable scenario errors, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ErrorKind {
    NegativeInput,
    TurbineNumber,
    LargeTurbineSize,
    SmallTurbineSize,
    TurbineGeometry,
    WeatherData,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NegativeInput => "NegativeInputError",
            ErrorKind::TurbineNumber => "TurbineNumberError",
            ErrorKind::LargeTurbineSize => "LargeTurbineSizeError",
            ErrorKind::SmallTurbineSize => "SmallTurbineSizeError",
            ErrorKind::TurbineGeometry => "TurbineGeometryError",
            ErrorKind::WeatherData => "Weather_Data",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated scenario errors; one slot per kind, later writes win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorMap(BTreeMap<ErrorKind, String>);

impl ErrorMap {
    pub fn insert(&mut self, kind: ErrorKind, message: impl Into<String>) {
        let message = message.into();
        warn!(kind = kind.as_str(), %message, "scenario input rejected");
        self.0.insert(kind, message);
    }

    pub fn get(&self, kind: ErrorKind) -> Option<&str> {
        self.0.get(&kind).map(String::as_str)
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.0.contains_key(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ErrorKind> + '_ {
        self.0.keys().copied()
    }

    /// Renders each entry as `Error in <kind>: <message>`.
    pub fn messages(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|(kind, msg)| format!("Error in {kind}: {msg}"))
            .collect()
    }
}

/// Everything one scenario run reads and writes.
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    /// Project ID, or the serial ID when a parametric variation applies.
    pub project_id: String,
    inputs: BTreeMap<String, InputValue>,
    pub components: ComponentTable,
    pub weather: Option<WeatherWindow>,
    /// Remaining project data sheets, available to cost modules.
    pub project_data: Workbook,
    pub errors: ErrorMap,
}

impl ScenarioContext {
    pub fn new(project_id: impl Into<String>, components: ComponentTable) -> Self {
        Self {
            project_id: project_id.into(),
            inputs: BTreeMap::new(),
            components,
            weather: None,
            project_data: Workbook::default(),
            errors: ErrorMap::default(),
        }
    }

    /// Builds the master input set from an expanded project row and its data workbook.
    ///
    /// Known project-list labels are mapped to input keys; other non-null
    /// columns are carried under their label.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MissingSheet` if the workbook has no component sheet,
    /// or any error from parsing that sheet.
    pub fn from_project(
        project_id: impl Into<String>,
        row: &Row<'_>,
        project_data: Workbook,
    ) -> Result<Self, PipelineError> {
        let sheet = project_data
            .sheet(COMPONENTS_SHEET)
            .ok_or_else(|| PipelineError::MissingSheet {
                workbook: project_data.name.clone(),
                sheet: COMPONENTS_SHEET.to_string(),
            })?;
        let components = ComponentTable::from_table(sheet)?;

        let mut ctx = Self::new(project_id, components);
        for (label, cell) in row.iter() {
            let key = PROJECT_COLUMN_KEYS
                .iter()
                .find(|(l, _)| *l == label)
                .map_or(label, |(_, k)| *k);
            match cell {
                Cell::Number(n) => ctx.set_input(key, InputValue::Number(*n)),
                Cell::Text(s) => ctx.set_input(key, InputValue::Text(s.clone())),
                Cell::Null => {}
            }
        }
        ctx.project_data = project_data;
        Ok(ctx)
    }

    pub fn input(&self, key: &str) -> Option<&InputValue> {
        self.inputs.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.input(key).and_then(InputValue::as_f64)
    }

    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        self.number(key).unwrap_or(default)
    }

    /// Numeric input required by a cost module.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::MissingInput` if the key is absent or not numeric.
    pub fn require(&self, key: &'static str) -> Result<f64, ModuleError> {
        self.number(key).ok_or(ModuleError::MissingInput(key))
    }

    pub fn set_input(&mut self, key: impl Into<String>, value: InputValue) {
        self.inputs.insert(key.into(), value);
    }

    pub fn inputs(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.inputs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Geometry inputs, if rating, hub height and rotor diameter are all numeric.
    pub fn turbine_geometry(&self) -> Option<TurbineGeometry> {
        Some(TurbineGeometry {
            rating_mw: self.number(keys::TURBINE_RATING_MW)?,
            hub_height_m: self.number(keys::HUB_HEIGHT_METERS)?,
            rotor_diameter_m: self.number(keys::ROTOR_DIAMETER_M)?,
        })
    }
}

/// Merges overrides into the context and runs the three input checks.
///
/// All keys except the weather path and the two guarded keys
/// (`num_turbines`, `turbine_rating_MW`) are copied as-is. The guarded keys
/// are only copied when their check passes, so a rejected value leaves the
/// project value in place. A guarded key absent from `overrides` is not checked.
pub fn apply_overrides(ctx: &mut ScenarioContext, overrides: &Overrides) {
    check_negative_inputs(overrides, &mut ctx.errors);

    for (key, value) in overrides {
        match key.as_str() {
            keys::WEATHER_FILE_PATH | keys::NUM_TURBINES | keys::TURBINE_RATING_MW => {}
            _ => ctx.set_input(key.clone(), value.clone()),
        }
    }

    if let Some(value) = overrides.get(keys::NUM_TURBINES) {
        match value.as_f64() {
            Some(n) if n > MIN_TURBINE_COUNT => ctx.set_input(keys::NUM_TURBINES, value.clone()),
            _ => ctx.errors.insert(
                ErrorKind::TurbineNumber,
                "User selected 10 or fewer turbines. BOS estimates are only provided for \
                 utility scale projects of more than 10 turbines.",
            ),
        }
    }

    if let Some(value) = overrides.get(keys::TURBINE_RATING_MW) {
        match value.as_f64() {
            Some(r) if r > MAX_RATING_MW => ctx.errors.insert(
                ErrorKind::LargeTurbineSize,
                "User selected a turbine rated above 8 MW. Estimates are reasonable for \
                 turbines rated 1-8 MW.",
            ),
            Some(r) if r >= MIN_RATING_MW => ctx.set_input(keys::TURBINE_RATING_MW, value.clone()),
            _ => ctx.errors.insert(
                ErrorKind::SmallTurbineSize,
                "User selected a turbine rated below 1 MW. Estimates are reasonable for \
                 turbines rated 1-8 MW.",
            ),
        }
    }
}

/// Only the last negative key in iteration order is reported.
fn check_negative_inputs(overrides: &Overrides, errors: &mut ErrorMap) {
    let last_negative = overrides
        .iter()
        .filter(|(_, v)| v.as_f64().is_some_and(|n| n < 0.0))
        .map(|(k, _)| k)
        .last();
    if let Some(key) = last_negative {
        errors.insert(
            ErrorKind::NegativeInput,
            format!("User entered a negative value for {key}. This is an invalid entry"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ScenarioContext {
        let mut ctx = ScenarioContext::new("P1", ComponentTable::default());
        ctx.set_input(keys::NUM_TURBINES, 50.0.into());
        ctx.set_input(keys::TURBINE_RATING_MW, 2.0.into());
        ctx
    }

    fn overrides(pairs: &[(&str, InputValue)]) -> Overrides {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn valid_overrides_are_copied() {
        let mut c = ctx();
        apply_overrides(
            &mut c,
            &overrides(&[
                (keys::NUM_TURBINES, 100.0.into()),
                (keys::TURBINE_RATING_MW, 1.5.into()),
                (keys::DEPTH, 2.36.into()),
                ("custom_flag", InputValue::Flag(true)),
            ]),
        );
        assert!(c.errors.is_empty());
        assert_eq!(c.number(keys::NUM_TURBINES), Some(100.0));
        assert_eq!(c.number(keys::TURBINE_RATING_MW), Some(1.5));
        assert_eq!(c.number(keys::DEPTH), Some(2.36));
        assert_eq!(c.input("custom_flag"), Some(&InputValue::Flag(true)));
    }

    #[test]
    fn weather_path_is_not_stored() {
        let mut c = ctx();
        apply_overrides(
            &mut c,
            &overrides(&[(keys::WEATHER_FILE_PATH, "/tmp/w.srw".into())]),
        );
        assert!(c.input(keys::WEATHER_FILE_PATH).is_none());
    }

    #[test]
    fn all_three_checks_report_independently() {
        let mut c = ctx();
        apply_overrides(
            &mut c,
            &overrides(&[
                (keys::DEPTH, (-1.0).into()),
                (keys::NUM_TURBINES, 5.0.into()),
                (keys::TURBINE_RATING_MW, 9.0.into()),
            ]),
        );
        assert_eq!(c.errors.len(), 3);
        assert!(c.errors.contains(ErrorKind::NegativeInput));
        assert!(c.errors.contains(ErrorKind::TurbineNumber));
        assert!(c.errors.contains(ErrorKind::LargeTurbineSize));
    }

    #[test]
    fn rejected_guarded_values_keep_project_values() {
        let mut c = ctx();
        apply_overrides(
            &mut c,
            &overrides(&[
                (keys::NUM_TURBINES, 10.0.into()),
                (keys::TURBINE_RATING_MW, 0.5.into()),
            ]),
        );
        assert!(c.errors.contains(ErrorKind::TurbineNumber));
        assert!(c.errors.contains(ErrorKind::SmallTurbineSize));
        assert_eq!(c.number(keys::NUM_TURBINES), Some(50.0));
        assert_eq!(c.number(keys::TURBINE_RATING_MW), Some(2.0));
    }

    #[test]
    fn only_last_negative_key_is_reported() {
        let mut c = ctx();
        apply_overrides(
            &mut c,
            &overrides(&[
                (keys::DEPTH, (-2.0).into()),
                (keys::RATED_THRUST_N, (-5.0).into()),
                (keys::GUST_VELOCITY_M_PER_S, (-1.0).into()),
            ]),
        );
        let msg = c.errors.get(ErrorKind::NegativeInput).unwrap_or_default();
        // key order: depth < gust_velocity_m_per_s < rated_thrust_N
        assert!(msg.contains(keys::RATED_THRUST_N), "got: {msg}");
        assert!(!msg.contains(keys::DEPTH));
        assert_eq!(c.errors.len(), 1);
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        for rating in [1.0, 8.0] {
            let mut c = ctx();
            apply_overrides(&mut c, &overrides(&[(keys::TURBINE_RATING_MW, rating.into())]));
            assert!(c.errors.is_empty(), "{rating} MW should be accepted");
            assert_eq!(c.number(keys::TURBINE_RATING_MW), Some(rating));
        }
    }

    #[test]
    fn error_messages_are_prefixed_with_kind() {
        let mut errors = ErrorMap::default();
        errors.insert(ErrorKind::WeatherData, "file not found");
        assert_eq!(
            errors.messages(),
            vec!["Error in Weather_Data: file not found".to_string()]
        );
    }
}
