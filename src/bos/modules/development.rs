//! Permitting, studies and developer labor.

use super::types::{CostModule, ModuleError, OutputMap, plant_capacity_mw, write_outputs};
use crate::bos::inputs::{ScenarioContext, keys};

const FIXED_LABOR_USD: f64 = 250_000.0;
const LABOR_USD_PER_MW: f64 = 10_000.0;

pub const DEVELOPMENT_LABOR: &str = "development_labor_cost_usd";
pub const TOTAL: &str = "summed_development_cost";

#[derive(Debug, Default, Clone, Copy)]
pub struct Development;

impl CostModule for Development {
    fn name(&self) -> &'static str {
        "Development"
    }

    fn required_inputs(&self) -> &'static [&'static str] {
        &[
            keys::NUM_TURBINES,
            keys::TURBINE_RATING_MW,
            keys::LABOR_COST_MULTIPLIER,
        ]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[DEVELOPMENT_LABOR, TOTAL]
    }

    fn total_key(&self) -> &'static str {
        TOTAL
    }

    fn run(&self, ctx: &ScenarioContext, out: &mut OutputMap) -> Result<(), ModuleError> {
        let multiplier = ctx.require(keys::LABOR_COST_MULTIPLIER)?;
        let labor = (FIXED_LABOR_USD + LABOR_USD_PER_MW * plant_capacity_mw(ctx)?) * multiplier;
        write_outputs(out, &[(DEVELOPMENT_LABOR, labor), (TOTAL, labor)]);
        Ok(())
    }
}
