use super::types::{CostModule, ModuleError, OutputMap, PlantLayout, write_outputs};
use crate::bos::inputs::{ScenarioContext, keys};

const ACCESS_ROAD_M: f64 = 1_000.0;
const ROAD_WIDTH_M: f64 = 5.0;
const ROAD_DEPTH_M: f64 = 0.3;
const CRANE_PAD_M2: f64 = 900.0;
const AGGREGATE_USD_PER_M3: f64 = 35.0;
const EQUIPMENT_USD_PER_M: f64 = 18.0;
const LABOR_USD_PER_M: f64 = 22.0;
const MOBILIZATION_FRACTION: f64 = 0.05;

pub const EQUIPMENT_RENTAL: &str = "sitepreparation_equipment_rental_usd";
pub const LABOR: &str = "sitepreparation_labor_usd";
pub const MATERIAL: &str = "sitepreparation_material_usd";
pub const MOBILIZATION: &str = "sitepreparation_mobilization_usd";
pub const TOTAL: &str = "summed_sitepreparation_cost";

#[derive(Debug, Default, Clone, Copy)]
pub struct SitePreparation;

impl CostModule for SitePreparation {
    fn name(&self) -> &'static str {
        "SitePreparation"
    }

    fn required_inputs(&self) -> &'static [&'static str] {
        &[
            keys::NUM_TURBINES,
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
        let multiplier = ctx.require(keys::LABOR_COST_MULTIPLIER)?;
        let turbines = ctx.require(keys::NUM_TURBINES)?;

        let road_m = layout.string_length_m() + ACCESS_ROAD_M;
        let area_m2 = road_m * ROAD_WIDTH_M + turbines * CRANE_PAD_M2;

        let material = area_m2 * ROAD_DEPTH_M * AGGREGATE_USD_PER_M3;
        let equipment = road_m * EQUIPMENT_USD_PER_M;
        let labor = road_m * LABOR_USD_PER_M * multiplier;
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
