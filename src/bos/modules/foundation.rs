//! Foundations sized from the governing overturning moment.
//!
//! Two load cases are checked: rated thrust at hub height with a 1.5 safety
//! factor, and a gust acting on the swept area. The footing radius comes from
//! the governing moment, the soil bearing term and the foundation depth.

use std::f64::consts::PI;

use super::types::{CostModule, ModuleError, OutputMap, write_outputs};
use crate::bos::inputs::{ScenarioContext, keys};

const THRUST_SAFETY_FACTOR: f64 = 1.5;
const AIR_DENSITY_KG_M3: f64 = 1.225;
const GUST_DRAG_COEFFICIENT: f64 = 0.05;
/// Combined soil and concrete resistance term, N/m^2.
const BEARING_N_PER_M2: f64 = 23_500.0;

const CONCRETE_USD_PER_M3: f64 = 300.0;
const EQUIPMENT_USD_PER_M3: f64 = 60.0;
const LABOR_USD_PER_M3: f64 = 120.0;
const MOBILIZATION_FRACTION: f64 = 0.04;

pub const EQUIPMENT_RENTAL: &str = "foundation_equipment_rental_usd";
pub const LABOR: &str = "foundation_labor_usd";
pub const MATERIAL: &str = "foundation_material_usd";
pub const MOBILIZATION: &str = "foundation_mobilization_usd";
pub const TOTAL: &str = "summed_foundation_cost";

#[derive(Debug, Default, Clone, Copy)]
pub struct Foundation;

/// Governing overturning moment in N*m.
pub fn design_moment_nm(
    rated_thrust_n: f64,
    hub_height_m: f64,
    rotor_diameter_m: f64,
    gust_m_per_s: f64,
) -> f64 {
    let operating = rated_thrust_n * hub_height_m * THRUST_SAFETY_FACTOR;
    let swept_area = PI * (rotor_diameter_m / 2.0).powi(2);
    let gust_force =
        0.5 * AIR_DENSITY_KG_M3 * GUST_DRAG_COEFFICIENT * swept_area * gust_m_per_s.powi(2);
    operating.max(gust_force * hub_height_m)
}

/// Concrete volume of one footing in m^3.
pub fn footing_volume_m3(moment_nm: f64, depth_m: f64) -> f64 {
    let radius = (moment_nm / (BEARING_N_PER_M2 * PI * depth_m)).cbrt();
    PI * radius.powi(2) * depth_m
}

impl CostModule for Foundation {
    fn name(&self) -> &'static str {
        "Foundation"
    }

    fn required_inputs(&self) -> &'static [&'static str] {
        &[
            keys::NUM_TURBINES,
            keys::RATED_THRUST_N,
            keys::HUB_HEIGHT_METERS,
            keys::ROTOR_DIAMETER_M,
            keys::GUST_VELOCITY_M_PER_S,
            keys::DEPTH,
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
        let depth = ctx.require(keys::DEPTH)?;
        if depth <= 0.0 {
            return Err(ModuleError::InvalidInput {
                key: keys::DEPTH,
                message: format!("foundation depth must be positive, got {depth}"),
            });
        }
        let moment = design_moment_nm(
            ctx.require(keys::RATED_THRUST_N)?,
            ctx.require(keys::HUB_HEIGHT_METERS)?,
            ctx.require(keys::ROTOR_DIAMETER_M)?,
            ctx.require(keys::GUST_VELOCITY_M_PER_S)?,
        );
        let volume = footing_volume_m3(moment, depth) * ctx.require(keys::NUM_TURBINES)?;
        let multiplier = ctx.require(keys::LABOR_COST_MULTIPLIER)?;

        let material = volume * CONCRETE_USD_PER_M3;
        let equipment = volume * EQUIPMENT_USD_PER_M3;
        let labor = volume * LABOR_USD_PER_M3 * multiplier;
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
