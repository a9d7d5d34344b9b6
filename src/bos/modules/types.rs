//! Shared contract for cost modules.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::bos::inputs::{ScenarioContext, keys};

/// Cost outputs keyed by name, shared by all stages of one scenario.
pub type OutputMap = BTreeMap<String, f64>;

/// Failure inside a single cost module. Fatal to the scenario run.
#[derive(Debug, Error, PartialEq)]
pub enum ModuleError {
    #[error("required input `{0}` is missing or not numeric")]
    MissingInput(&'static str),

    #[error("input `{key}` is out of range: {message}")]
    InvalidInput { key: &'static str, message: String },

    #[error("no weather window available")]
    NoWeather,

    /// An upstream output this module builds on has not been written.
    #[error("upstream output `{0}` has not been computed")]
    MissingUpstream(&'static str),
}

/// A named cost stage with a declared input/output key contract.
///
/// Modules read the scenario context and write their outputs into the shared
/// [`OutputMap`]. They must write every key returned by [`outputs`](Self::outputs).
pub trait CostModule: Send + Sync {
    /// Stage name as used in logs and errors.
    fn name(&self) -> &'static str;

    /// Input keys this module reads.
    fn required_inputs(&self) -> &'static [&'static str];

    /// Output keys this module writes.
    fn outputs(&self) -> &'static [&'static str];

    /// The output key holding this module's total cost.
    fn total_key(&self) -> &'static str;

    /// Computes the module's costs.
    ///
    /// # Errors
    ///
    /// Returns a `ModuleError` if a required input is missing or out of range.
    fn run(&self, ctx: &ScenarioContext, out: &mut OutputMap) -> Result<(), ModuleError>;
}

/// Rows-by-columns turbine arrangement used to estimate road and cable runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantLayout {
    pub turbines_per_row: usize,
    pub rows: usize,
    /// Distance between turbines within a row, in metres.
    pub turbine_spacing_m: f64,
    /// Distance between rows, in metres.
    pub row_spacing_m: f64,
}

impl PlantLayout {
    /// Squarest grid that holds every turbine.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::MissingInput` for any absent layout input, or
    /// `ModuleError::InvalidInput` for a non-positive turbine count.
    pub fn from_context(ctx: &ScenarioContext) -> Result<Self, ModuleError> {
        let n = ctx.require(keys::NUM_TURBINES)?;
        if n < 1.0 {
            return Err(ModuleError::InvalidInput {
                key: keys::NUM_TURBINES,
                message: format!("{n} turbines"),
            });
        }
        let rotor = ctx.require(keys::ROTOR_DIAMETER_M)?;
        let spacing = ctx.require(keys::TURBINE_SPACING_ROTOR_DIAMETERS)?;
        let row_spacing = ctx.require(keys::ROW_SPACING_ROTOR_DIAMETERS)?;

        let n = n.round() as usize;
        let turbines_per_row = (n as f64).sqrt().ceil() as usize;
        let rows = n.div_ceil(turbines_per_row);
        Ok(Self {
            turbines_per_row,
            rows,
            turbine_spacing_m: spacing * rotor,
            row_spacing_m: row_spacing * rotor,
        })
    }

    /// Length of a path that runs along every row and links the rows together.
    pub fn string_length_m(&self) -> f64 {
        let gaps_per_row = self.turbines_per_row.saturating_sub(1) as f64;
        let along_rows = self.rows as f64 * gaps_per_row * self.turbine_spacing_m;
        let between_rows = self.rows.saturating_sub(1) as f64 * self.row_spacing_m;
        along_rows + between_rows
    }
}

/// Sum of the listed output keys, treating absent keys as zero.
pub(crate) fn sum_outputs(out: &OutputMap, keys: &[&str]) -> f64 {
    keys.iter().filter_map(|k| out.get(*k)).sum()
}

/// Writes each `(key, value)` pair into the output map.
pub(crate) fn write_outputs(out: &mut OutputMap, values: &[(&str, f64)]) {
    for (key, value) in values {
        out.insert((*key).to_string(), *value);
    }
}

/// Plant capacity in MW.
pub(crate) fn plant_capacity_mw(ctx: &ScenarioContext) -> Result<f64, ModuleError> {
    Ok(ctx.require(keys::NUM_TURBINES)? * ctx.require(keys::TURBINE_RATING_MW)?)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::bos::geometry::ComponentTable;
    use crate::bos::inputs::{InputValue, ScenarioContext, keys};

    /// Context carrying the 13 reference plant inputs.
    pub fn reference_context() -> ScenarioContext {
        let mut ctx = ScenarioContext::new("ref", ComponentTable::default());
        for (key, value) in [
            (keys::INTERCONNECT_VOLTAGE_KV, 137.0),
            (keys::DISTANCE_TO_INTERCONNECT_MI, 10.0),
            (keys::NUM_TURBINES, 100.0),
            (keys::TURBINE_SPACING_ROTOR_DIAMETERS, 4.0),
            (keys::ROW_SPACING_ROTOR_DIAMETERS, 10.0),
            (keys::TURBINE_RATING_MW, 1.5),
            (keys::ROTOR_DIAMETER_M, 77.0),
            (keys::HUB_HEIGHT_METERS, 80.0),
            (keys::WIND_SHEAR_EXPONENT, 0.2),
            (keys::DEPTH, 2.36),
            (keys::RATED_THRUST_N, 589_000.0),
            (keys::LABOR_COST_MULTIPLIER, 1.0),
            (keys::GUST_VELOCITY_M_PER_S, 59.5),
        ] {
            ctx.set_input(key, InputValue::Number(value));
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_square_for_perfect_squares() {
        let ctx = fixtures::reference_context();
        let layout = PlantLayout::from_context(&ctx).expect("layout");
        assert_eq!(layout.turbines_per_row, 10);
        assert_eq!(layout.rows, 10);
        assert!((layout.turbine_spacing_m - 308.0).abs() < 1e-9);
        // 10 rows * 9 gaps * 308 m + 9 * 770 m
        assert!((layout.string_length_m() - 34_650.0).abs() < 1e-6);
    }

    #[test]
    fn layout_needs_a_turbine() {
        let mut ctx = fixtures::reference_context();
        ctx.set_input(keys::NUM_TURBINES, 0.0.into());
        assert!(matches!(
            PlantLayout::from_context(&ctx),
            Err(ModuleError::InvalidInput { .. })
        ));
    }

    #[test]
    fn sum_ignores_absent_keys() {
        let mut out = OutputMap::new();
        write_outputs(&mut out, &[("a", 1.0), ("b", 2.5)]);
        assert!((sum_outputs(&out, &["a", "b", "c"]) - 3.5).abs() < 1e-12);
    }
}
