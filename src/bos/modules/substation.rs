//! Project substation from the published parametric curve.

use super::types::{CostModule, ModuleError, OutputMap, plant_capacity_mw, write_outputs};
use crate::bos::inputs::{ScenarioContext, keys};

pub const TOTAL: &str = "summed_substation_cost";

#[derive(Debug, Default, Clone, Copy)]
pub struct Substation;

/// Substation cost in USD for a plant of `capacity_mw` tied in at `voltage_kv`.
pub fn substation_cost_usd(voltage_kv: f64, capacity_mw: f64) -> f64 {
    11_652.0 * (voltage_kv + capacity_mw) + 11_795.0 * capacity_mw.powf(0.3549) + 1_526_800.0
}

impl CostModule for Substation {
    fn name(&self) -> &'static str {
        "Substation"
    }

    fn required_inputs(&self) -> &'static [&'static str] {
        &[
            keys::INTERCONNECT_VOLTAGE_KV,
            keys::NUM_TURBINES,
            keys::TURBINE_RATING_MW,
        ]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[TOTAL]
    }

    fn total_key(&self) -> &'static str {
        TOTAL
    }

    fn run(&self, ctx: &ScenarioContext, out: &mut OutputMap) -> Result<(), ModuleError> {
        let voltage = ctx.require(keys::INTERCONNECT_VOLTAGE_KV)?;
        let cost = substation_cost_usd(voltage, plant_capacity_mw(ctx)?);
        write_outputs(out, &[(TOTAL, cost)]);
        Ok(())
    }
}
