use super::types::{CostModule, ModuleError, OutputMap, PlantLayout, write_outputs};
use crate::bos::inputs::{ScenarioContext, keys};

/// Routing slack over the straight-line string length.
const CABLE_SLACK: f64 = 1.1;
const CABLE_BASE_USD_PER_M: f64 = 25.0;
/// Conductor upsizing per MW carried on the string.
const CABLE_USD_PER_M_PER_MW: f64 = 0.5;
const EQUIPMENT_USD_PER_M: f64 = 8.0;
const LABOR_USD_PER_M: f64 = 15.0;
const MOBILIZATION_FRACTION: f64 = 0.03;

pub const EQUIPMENT_RENTAL: &str = "collection_equipment_rental_usd";
pub const LABOR: &str = "collection_labor_usd";
pub const MATERIAL: &str = "collection_material_usd";
pub const MOBILIZATION: &str = "collection_mobilization_usd";
pub const TOTAL: &str = "summed_collection_cost";

#[derive(Debug, Default, Clone, Copy)]
pub struct Collection;

impl CostModule for Collection {
    fn name(&self) -> &'static str {
        "Collection"
    }

    fn required_inputs(&self) -> &'static [&'static str] {
        &[
            keys::NUM_TURBINES,
            keys::TURBINE_RATING_MW,
            keys::ROTOR_DIAMETER_M,
            keys::TURBINE_SPACING_ROTOR_DIAMETERS,
            keys::ROW_SPACING_ROTOR_DIAMETERS,
            keys::LABOR_COST_MULTIPLIER,
        ]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[EQUIPMENT_RENTAL, LABOR, MATERIAL, MOBILIZATION, TOTAL]
    }

    fn total_key(&self) -> &'static str {
        TOTAL
    }

    fn run(&self, ctx: &ScenarioContext, out: &mut OutputMap) -> Result<(), ModuleError> {
        let layout = PlantLayout::from_context(ctx)?;
        let rating = ctx.require(keys::TURBINE_RATING_MW)?;
        let multiplier = ctx.require(keys::LABOR_COST_MULTIPLIER)?;

        let cable_m = layout.string_length_m() * CABLE_SLACK;
        let string_mw = rating * layout.turbines_per_row as f64;

        let material = cable_m * (CABLE_BASE_USD_PER_M + CABLE_USD_PER_M_PER_MW * string_mw);
        let equipment = cable_m * EQUIPMENT_USD_PER_M;
        let labor = cable_m * LABOR_USD_PER_M * multiplier;
        let mobilization = MOBILIZATION_FRACTION * (material + equipment + labor);

        write_outputs(
            out,
            &[
                (EQUIPMENT_RENTAL, equipment),
                (LABOR, labor),
                (MATERIAL, material),
                (MOBILIZATION, mobilization),
                (TOTAL, material + equipment + labor + mobilization),
            ],
        );
        Ok(())
    }
}
