//! Per-scenario pipeline and batch driver.
//!
//! A scenario runs overrides, weather and geometry against its own context,
//! short-circuits on any recorded error, and otherwise executes the cost
//! modules and projects their outputs.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::Serialize;
use tracing::{info, warn};

use super::expansion::{
    PROJECT_DATA_FILE, PROJECT_ID, expand, resolved_project_id, split_project_sources, variations,
};
use super::geometry::scale_components;
use super::inputs::{ErrorKind, Overrides, ScenarioContext, apply_overrides, keys};
use super::manager::Manager;
use super::projector::{ScenarioOutcome, error_report, project_costs};
use super::weather::{WeatherError, WeatherSource, WeatherWindow, load_file};
use crate::error::PipelineError;
use crate::io::workbook::DataSource;
use crate::lcoe::types::CostLineItem;
use crate::table::Workbook;

/// Technical parameters that identify a scenario in the LCOE pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioKey {
    pub num_turbines: f64,
    pub turbine_rating_mw: f64,
    pub hub_height_m: f64,
    pub labor_cost_multiplier: f64,
    pub crane_breakdown_fraction: f64,
    pub rotor_diameter_m: f64,
}

impl ScenarioKey {
    /// `None` unless turbine count, rating, hub height and rotor diameter are numeric.
    pub fn from_context(ctx: &ScenarioContext) -> Option<Self> {
        Some(Self {
            num_turbines: ctx.number(keys::NUM_TURBINES)?,
            turbine_rating_mw: ctx.number(keys::TURBINE_RATING_MW)?,
            hub_height_m: ctx.number(keys::HUB_HEIGHT_METERS)?,
            labor_cost_multiplier: ctx.number_or(keys::LABOR_COST_MULTIPLIER, 1.0),
            crane_breakdown_fraction: ctx.number_or(keys::CRANE_BREAKDOWN_FRACTION, 0.0),
            rotor_diameter_m: ctx.number(keys::ROTOR_DIAMETER_M)?,
        })
    }
}

/// One scenario's identity and result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub project_id: String,
    pub outcome: ScenarioOutcome,
    #[serde(skip)]
    pub key: Option<ScenarioKey>,
}

impl ScenarioReport {
    /// One line item per cost module; empty for failed scenarios.
    pub fn line_items(&self) -> Vec<CostLineItem> {
        let (Some(report), Some(key)) = (self.outcome.report(), self.key) else {
            return Vec::new();
        };
        report
            .module_costs()
            .into_iter()
            .map(|(module, cost)| CostLineItem {
                project_id_with_serial: self.project_id.clone(),
                module: module.to_string(),
                cost_per_project: cost,
                num_turbines: key.num_turbines,
                turbine_rating_mw: key.turbine_rating_mw,
                hub_height_m: key.hub_height_m,
                labor_cost_multiplier: key.labor_cost_multiplier,
                crane_breakdown_fraction: key.crane_breakdown_fraction,
                rotor_diameter_m: key.rotor_diameter_m,
                modification: None,
            })
            .collect()
    }
}

/// Runs scenarios through the fixed BOS pipeline.
pub struct BosRunner {
    manager: Manager,
    default_weather: Option<WeatherSource>,
    /// Normalised default window, or the message it failed with.
    default_window: OnceLock<Result<WeatherWindow, String>>,
}

impl BosRunner {
    /// Creates a runner.
    ///
    /// # Arguments
    ///
    /// * `manager` - Cost module pipeline
    /// * `default_weather` - Weather used when a scenario does not name its own file
    pub fn new(manager: Manager, default_weather: Option<WeatherSource>) -> Self {
        Self {
            manager,
            default_weather,
            default_window: OnceLock::new(),
        }
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    /// Runs one scenario end to end.
    ///
    /// Validation and weather problems end up in the returned outcome; only
    /// module failures and incomplete module output are errors.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Module` or `PipelineError::MissingOutput` from the cost stages.
    pub fn run_scenario(
        &self,
        mut ctx: ScenarioContext,
        overrides: &Overrides,
    ) -> Result<ScenarioReport, PipelineError> {
        // 1. Overrides and input checks
        apply_overrides(&mut ctx, overrides);

        // 2. Weather window
        match self.resolve_weather(overrides) {
            Ok(window) => ctx.weather = Some(window),
            Err(message) => ctx.errors.insert(ErrorKind::WeatherData, message),
        }

        // 3. Component geometry
        scale_geometry(&mut ctx);

        let key = ScenarioKey::from_context(&ctx);
        if !ctx.errors.is_empty() {
            warn!(
                project_id = %ctx.project_id,
                errors = ctx.errors.len(),
                "scenario skipped"
            );
            return Ok(ScenarioReport {
                outcome: error_report(&ctx.errors),
                project_id: ctx.project_id,
                key,
            });
        }

        // 4. Cost modules and projection
        let out = self.manager.execute(&ctx)?;
        let report = project_costs(&out, &ctx.project_id)?;
        info!(
            project_id = %ctx.project_id,
            total_bos_cost = report.total_bos_cost,
            "scenario costed"
        );
        Ok(ScenarioReport {
            project_id: ctx.project_id,
            outcome: ScenarioOutcome::Costed(report),
            key,
        })
    }

    /// Expands a project list and runs every resulting scenario.
    ///
    /// Project data workbooks are read once per file name.
    ///
    /// # Errors
    ///
    /// Returns the first fatal `PipelineError`: bad sheet layout, unreadable
    /// project data, a missing component sheet, or a failing cost stage.
    pub fn run_batch<S: DataSource>(
        &self,
        source: &S,
        project_list: Workbook,
        overrides: &Overrides,
    ) -> Result<Vec<ScenarioReport>, PipelineError> {
        let (projects, params) = split_project_sources(project_list)?;
        let expanded = expand(&projects, &variations(&params)?)?;
        info!(scenarios = expanded.len(), "starting BOS batch");

        let mut project_data: HashMap<String, Workbook> = HashMap::new();
        let mut reports = Vec::with_capacity(expanded.len());
        for (idx, row) in expanded.rows().enumerate() {
            let project_id = resolved_project_id(&row).ok_or_else(|| blank(idx, PROJECT_ID))?;
            let data_file = row
                .text(PROJECT_DATA_FILE)
                .ok_or_else(|| blank(idx, PROJECT_DATA_FILE))?;

            let workbook = match project_data.get(&data_file) {
                Some(wb) => wb.clone(),
                None => {
                    let wb = source.read_workbook(&data_file)?;
                    project_data.insert(data_file, wb.clone());
                    wb
                }
            };

            let ctx = ScenarioContext::from_project(project_id, &row, workbook)?;
            reports.push(self.run_scenario(ctx, overrides)?);
        }

        let costed = reports.iter().filter(|r| r.outcome.is_costed()).count();
        info!(
            costed,
            failed = reports.len() - costed,
            "BOS batch finished"
        );
        Ok(reports)
    }

    /// Builds the context of the first base project, unexpanded and unvalidated.
    ///
    /// Returns `None` for an empty project list.
    ///
    /// # Errors
    ///
    /// Returns a `PipelineError` for a bad sheet layout, a blank project
    /// cell, or unreadable project data.
    pub fn first_project_context<S: DataSource>(
        source: &S,
        project_list: Workbook,
    ) -> Result<Option<ScenarioContext>, PipelineError> {
        let (projects, _) = split_project_sources(project_list)?;
        let Some(row) = projects.rows().next() else {
            return Ok(None);
        };
        let project_id = resolved_project_id(&row).ok_or_else(|| blank(0, PROJECT_ID))?;
        let data_file = row
            .text(PROJECT_DATA_FILE)
            .ok_or_else(|| blank(0, PROJECT_DATA_FILE))?;
        let workbook = source.read_workbook(&data_file)?;
        ScenarioContext::from_project(project_id, &row, workbook).map(Some)
    }

    /// A path override wins over the default source.
    fn resolve_weather(&self, overrides: &Overrides) -> Result<WeatherWindow, String> {
        if let Some(value) = overrides.get(keys::WEATHER_FILE_PATH) {
            let path = value
                .as_str()
                .ok_or_else(|| format!("`{}` must be a file path", keys::WEATHER_FILE_PATH))?;
            return load_file(Path::new(path)).map_err(|e| e.to_string());
        }
        self.default_window
            .get_or_init(|| match &self.default_weather {
                Some(source) => source.load().map_err(|e| e.to_string()),
                None => Err(WeatherError::NoSource.to_string()),
            })
            .clone()
    }
}

/// Rescales the component table, or records why the geometry was refused.
fn scale_geometry(ctx: &mut ScenarioContext) {
    let Some(geometry) = ctx.turbine_geometry() else {
        warn!(
            project_id = %ctx.project_id,
            "turbine geometry incomplete; component table left unscaled"
        );
        return;
    };
    match geometry.validate() {
        Ok(()) => ctx.components = scale_components(&ctx.components, geometry),
        Err(message) => ctx.errors.insert(ErrorKind::TurbineGeometry, message),
    }
}

fn blank(row: usize, column: &str) -> PipelineError {
    PipelineError::BadCell {
        stage: "project list",
        row,
        column: column.to_string(),
        message: "value is blank".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bos::inputs::InputValue;
    use crate::bos::modules::types::fixtures::reference_context;
    use crate::bos::weather::{HOURS_PER_YEAR, RawWeather};

    fn runner() -> BosRunner {
        let raw = RawWeather::new(
            (0..HOURS_PER_YEAR)
                .map(|_| vec!["10".into(), "1".into(), "180".into(), "6".into()])
                .collect(),
        );
        BosRunner::new(Manager::standard(), Some(WeatherSource::Table(raw)))
    }

    #[test]
    fn valid_scenario_is_costed() {
        let report = runner()
            .run_scenario(reference_context(), &Overrides::new())
            .expect("runs");
        let costs = report.outcome.report().expect("costed");
        assert!(costs.total_bos_cost > 0.0);
        assert_eq!(report.line_items().len(), 8);
    }

    #[test]
    fn rejected_scenario_skips_modules() {
        let overrides: Overrides = [(keys::NUM_TURBINES.to_string(), InputValue::Number(5.0))]
            .into_iter()
            .collect();
        let report = runner()
            .run_scenario(reference_context(), &overrides)
            .expect("runs");
        assert_eq!(report.outcome.errors().len(), 1);
        assert!(report.outcome.errors()[0].starts_with("Error in TurbineNumberError:"));
        assert!(report.line_items().is_empty());
    }

    #[test]
    fn missing_weather_is_recorded_not_raised() {
        let runner = BosRunner::new(Manager::standard(), None);
        let report = runner
            .run_scenario(reference_context(), &Overrides::new())
            .expect("runs");
        assert_eq!(
            report.outcome.errors(),
            ["Error in Weather_Data: no weather source configured".to_string()]
        );
    }

    #[test]
    fn weather_path_override_takes_precedence() {
        let overrides: Overrides = [(
            keys::WEATHER_FILE_PATH.to_string(),
            InputValue::from("/nonexistent/weather.srw"),
        )]
        .into_iter()
        .collect();
        let report = runner()
            .run_scenario(reference_context(), &overrides)
            .expect("runs");
        let errors = report.outcome.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Error in Weather_Data: cannot read weather file"));
    }

    #[test]
    fn scenario_key_reflects_overridden_inputs() {
        let overrides: Overrides = [
            (keys::ROTOR_DIAMETER_M.to_string(), InputValue::Number(120.0)),
            (keys::TURBINE_RATING_MW.to_string(), InputValue::Number(3.0)),
        ]
        .into_iter()
        .collect();
        let report = runner()
            .run_scenario(reference_context(), &overrides)
            .expect("runs");
        let key = report.key.expect("key");
        assert_eq!(key.rotor_diameter_m, 120.0);
        assert_eq!(key.turbine_rating_mw, 3.0);
        assert_eq!(key.crane_breakdown_fraction, 0.0);
    }

    #[test]
    fn absurd_hub_height_is_recorded_not_scaled() {
        let overrides: Overrides = [(
            keys::HUB_HEIGHT_METERS.to_string(),
            InputValue::Number(1e12),
        )]
        .into_iter()
        .collect();
        let report = runner()
            .run_scenario(reference_context(), &overrides)
            .expect("runs");
        let errors = report.outcome.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Error in TurbineGeometryError: hub height"));
        assert!(report.line_items().is_empty());
    }

    #[test]
    fn geometry_scaling_fills_components_only_when_usable() {
        let mut ctx = reference_context();
        scale_geometry(&mut ctx);
        assert_eq!(ctx.components.group("tower").count(), 3);
        assert!(ctx.errors.is_empty());

        let mut tall = reference_context();
        tall.set_input(keys::HUB_HEIGHT_METERS, 1e12.into());
        scale_geometry(&mut tall);
        assert!(tall.components.is_empty());
        assert!(tall.errors.contains(ErrorKind::TurbineGeometry));

        let mut partial = reference_context();
        partial.set_input(keys::ROTOR_DIAMETER_M, "n/a".into());
        scale_geometry(&mut partial);
        assert!(partial.components.is_empty());
        assert!(partial.errors.is_empty());
    }
}
