//! Project overheads, priced mostly as fractions of the direct BOS subtotal.

use super::types::{CostModule, ModuleError, OutputMap, plant_capacity_mw, write_outputs};
use crate::bos::inputs::{ScenarioContext, keys};

/// Sum of the direct module totals, written by the manager before this stage.
pub const BOS_SUBTOTAL: &str = "bos_subtotal_usd";

const INSURANCE_FRACTION: f64 = 0.0056;
const BONDING_FRACTION: f64 = 0.01;
const PROJECT_MANAGEMENT_FRACTION: f64 = 0.035;
const CONTINGENCY_FRACTION: f64 = 0.08;
const PERMITTING_USD_PER_KW: f64 = 2.0;
const ENGINEERING_FIXED_USD: f64 = 350_000.0;
const ENGINEERING_USD_PER_MW: f64 = 2_000.0;
const SITE_FACILITY_FIXED_USD: f64 = 200_000.0;
const SITE_FACILITY_USD_PER_TURBINE: f64 = 1_500.0;

pub const INSURANCE: &str = "insurance_usd";
pub const CONSTRUCTION_PERMITTING: &str = "construction_permitting_usd";
pub const BONDING: &str = "bonding_usd";
pub const PROJECT_MANAGEMENT: &str = "project_management_usd";
pub const MARKUP_CONTINGENCY: &str = "markup_contingency_usd";
pub const ENGINEERING: &str = "engineering_usd";
pub const SITE_FACILITY: &str = "site_facility_usd";
pub const TOTAL: &str = "total_management_cost";

#[derive(Debug, Default, Clone, Copy)]
pub struct Management;

impl CostModule for Management {
    fn name(&self) -> &'static str {
        "Management"
    }

    fn required_inputs(&self) -> &'static [&'static str] {
        &[keys::NUM_TURBINES, keys::TURBINE_RATING_MW]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[
            INSURANCE,
            CONSTRUCTION_PERMITTING,
            BONDING,
            PROJECT_MANAGEMENT,
            MARKUP_CONTINGENCY,
            ENGINEERING,
            SITE_FACILITY,
            TOTAL,
        ]
    }

    fn total_key(&self) -> &'static str {
        TOTAL
    }

    fn run(&self, ctx: &ScenarioContext, out: &mut OutputMap) -> Result<(), ModuleError> {
        let subtotal = *out
            .get(BOS_SUBTOTAL)
            .ok_or(ModuleError::MissingUpstream(BOS_SUBTOTAL))?;
        let capacity_mw = plant_capacity_mw(ctx)?;
        let turbines = ctx.require(keys::NUM_TURBINES)?;

        let parts = [
            (INSURANCE, INSURANCE_FRACTION * subtotal),
            (CONSTRUCTION_PERMITTING, PERMITTING_USD_PER_KW * capacity_mw * 1_000.0),
            (BONDING, BONDING_FRACTION * subtotal),
            (PROJECT_MANAGEMENT, PROJECT_MANAGEMENT_FRACTION * subtotal),
            (MARKUP_CONTINGENCY, CONTINGENCY_FRACTION * subtotal),
            (ENGINEERING, ENGINEERING_FIXED_USD + ENGINEERING_USD_PER_MW * capacity_mw),
            (SITE_FACILITY, SITE_FACILITY_FIXED_USD + SITE_FACILITY_USD_PER_TURBINE * turbines),
        ];
        let total: f64 = parts.iter().map(|(_, v)| v).sum();

        write_outputs(out, &parts);
        write_outputs(out, &[(TOTAL, total)]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bos::modules::types::fixtures::reference_context;

    #[test]
    fn requires_the_subtotal() {
        assert_eq!(
            Management.run(&reference_context(), &mut OutputMap::new()),
            Err(ModuleError::MissingUpstream(BOS_SUBTOTAL))
        );
    }

    #[test]
    fn fractional_overheads_track_subtotal() {
        let mut out = OutputMap::new();
        out.insert(BOS_SUBTOTAL.to_string(), 10_000_000.0);
        Management.run(&reference_context(), &mut out).expect("runs");
        assert!((out[INSURANCE] - 56_000.0).abs() < 1e-6);
        assert!((out[MARKUP_CONTINGENCY] - 800_000.0).abs() < 1e-6);
        let parts: f64 = Management.outputs()[..7].iter().map(|k| out[*k]).sum();
        assert!((out[TOTAL] - parts).abs() < 1e-6);
    }
}
