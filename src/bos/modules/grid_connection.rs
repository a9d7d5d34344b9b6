//! Transmission line to the point of interconnection.

use super::types::{CostModule, ModuleError, OutputMap, write_outputs};
use crate::bos::inputs::{ScenarioContext, keys};

pub const TOTAL: &str = "trans_dist_usd";

#[derive(Debug, Default, Clone, Copy)]
pub struct GridConnection;

/// Line cost in USD; per-mile cost falls slowly with distance.
pub fn transmission_cost_usd(voltage_kv: f64, distance_mi: f64) -> f64 {
    if distance_mi <= 0.0 {
        return 0.0;
    }
    (1176.0 * voltage_kv + 218_257.0) * distance_mi.powf(-0.1063) * distance_mi
}

impl CostModule for GridConnection {
    fn name(&self) -> &'static str {
        "GridConnection"
    }

    fn required_inputs(&self) -> &'static [&'static str] {
        &[keys::INTERCONNECT_VOLTAGE_KV, keys::DISTANCE_TO_INTERCONNECT_MI]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[TOTAL]
    }

    fn total_key(&self) -> &'static str {
        TOTAL
    }

    fn run(&self, ctx: &ScenarioContext, out: &mut OutputMap) -> Result<(), ModuleError> {
        let voltage = ctx.require(keys::INTERCONNECT_VOLTAGE_KV)?;
        let distance = ctx.require(keys::DISTANCE_TO_INTERCONNECT_MI)?;
        write_outputs(out, &[(TOTAL, transmission_cost_usd(voltage, distance))]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_is_free() {
        assert_eq!(transmission_cost_usd(137.0, 0.0), 0.0);
    }

    #[test]
    fn reference_line_cost() {
        let cost = transmission_cost_usd(137.0, 10.0);
        // (1176 * 137 + 218257) * 10^0.8937
        assert!(cost > 2_900_000.0 && cost < 3_000_000.0, "cost = {cost}");
    }
}
