//! Crane erection of turbine components.
//!
//! Lift time grows with the number of component picks, with wind downtime
//! (hours above the crane limit at hub height) and with crane breakdowns.

use super::types::{CostModule, ModuleError, OutputMap, write_outputs};
use crate::bos::inputs::{ScenarioContext, keys};
use crate::bos::weather::HOURS_PER_YEAR;

/// Wind speed above which cranes stand down.
pub const CRANE_WIND_LIMIT_M_PER_S: f64 = 9.8;
/// Height of the anemometer the weather window was recorded at.
pub const MEASUREMENT_HEIGHT_M: f64 = 10.0;

const HOURS_PER_PICK: f64 = 3.0;
/// Picks assumed when the component table is empty.
const DEFAULT_PICKS: usize = 8;
const WORK_HOURS_PER_DAY: f64 = 10.0;
/// Floor on the share of workable hours.
const MIN_WORKABLE_FRACTION: f64 = 0.1;
const DEFAULT_SHEAR_EXPONENT: f64 = 0.143;

const CRANE_BASE_USD_PER_DAY: f64 = 8_000.0;
const CRANE_USD_PER_DAY_PER_TONNE: f64 = 60.0;
const CREW_SIZE: f64 = 12.0;
const CREW_USD_PER_HOUR: f64 = 75.0;
const CONSUMABLES_USD_PER_TURBINE: f64 = 5_000.0;
const RIGGING_USD_PER_TURBINE_METRE: f64 = 100.0;
const MOBILIZATION_CRANE_DAYS: f64 = 10.0;
const FUEL_GALLONS_PER_HOUR: f64 = 40.0;
const FUEL_USD_PER_GALLON: f64 = 3.5;

pub const EQUIPMENT_RENTAL: &str = "erection_equipment_rental_usd";
pub const LABOR: &str = "erection_labor_usd";
pub const MATERIAL: &str = "erection_material_usd";
pub const OTHER: &str = "erection_other_usd";
pub const MOBILIZATION: &str = "erection_mobilization_usd";
pub const FUEL: &str = "erection_fuel_usd";
pub const TOTAL: &str = "total_cost_summed_erection";

#[derive(Debug, Default, Clone, Copy)]
pub struct Erection;

impl CostModule for Erection {
    fn name(&self) -> &'static str {
        "Erection"
    }

    fn required_inputs(&self) -> &'static [&'static str] {
        &[
            keys::NUM_TURBINES,
            keys::HUB_HEIGHT_METERS,
            keys::LABOR_COST_MULTIPLIER,
        ]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[EQUIPMENT_RENTAL, LABOR, MATERIAL, OTHER, MOBILIZATION, FUEL, TOTAL]
    }

    fn total_key(&self) -> &'static str {
        TOTAL
    }

    fn run(&self, ctx: &ScenarioContext, out: &mut OutputMap) -> Result<(), ModuleError> {
        let weather = ctx.weather.as_ref().ok_or(ModuleError::NoWeather)?;
        let turbines = ctx.require(keys::NUM_TURBINES)?;
        let hub_height = ctx.require(keys::HUB_HEIGHT_METERS)?;
        let multiplier = ctx.require(keys::LABOR_COST_MULTIPLIER)?;
        let shear = ctx.number_or(keys::WIND_SHEAR_EXPONENT, DEFAULT_SHEAR_EXPONENT);
        let breakdown = ctx.number_or(keys::CRANE_BREAKDOWN_FRACTION, 0.0);
        if !(0.0..1.0).contains(&breakdown) {
            return Err(ModuleError::InvalidInput {
                key: keys::CRANE_BREAKDOWN_FRACTION,
                message: format!("must be in [0, 1), got {breakdown}"),
            });
        }

        let picks = match ctx.components.len() {
            0 => DEFAULT_PICKS,
            n => n,
        };
        let heaviest_t = ctx
            .components
            .rows()
            .iter()
            .map(|c| c.mass_t)
            .fold(0.0, f64::max);

        let windy = weather.hours_above(
            CRANE_WIND_LIMIT_M_PER_S,
            hub_height,
            MEASUREMENT_HEIGHT_M,
            shear,
        );
        let workable = (1.0 - windy as f64 / HOURS_PER_YEAR as f64).max(MIN_WORKABLE_FRACTION);

        let lift_hours = turbines * picks as f64 * HOURS_PER_PICK / workable / (1.0 - breakdown);
        let crane_days = lift_hours / WORK_HOURS_PER_DAY;
        let crane_rate = CRANE_BASE_USD_PER_DAY + CRANE_USD_PER_DAY_PER_TONNE * heaviest_t;

        let equipment = crane_days * crane_rate;
        let labor = lift_hours * CREW_SIZE * CREW_USD_PER_HOUR * multiplier;
        let material = turbines * CONSUMABLES_USD_PER_TURBINE;
        let other = turbines * hub_height * RIGGING_USD_PER_TURBINE_METRE;
        let mobilization = MOBILIZATION_CRANE_DAYS * crane_rate;
        let fuel = lift_hours * FUEL_GALLONS_PER_HOUR * FUEL_USD_PER_GALLON;

        write_outputs(
            out,
            &[
                (EQUIPMENT_RENTAL, equipment),
                (LABOR, labor),
                (MATERIAL, material),
                (OTHER, other),
                (MOBILIZATION, mobilization),
                (FUEL, fuel),
                (TOTAL, equipment + labor + material + other + mobilization + fuel),
            ],
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bos::modules::types::fixtures::reference_context;
    use crate::bos::weather::{RawWeather, normalize};

    fn with_wind(speed: &str) -> ScenarioContext {
        let raw = RawWeather::new(
            (0..HOURS_PER_YEAR)
                .map(|_| vec!["15".into(), "1".into(), "270".into(), speed.into()])
                .collect(),
        );
        let mut ctx = reference_context();
        ctx.weather = Some(normalize(&raw).expect("weather"));
        ctx
    }

    #[test]
    fn needs_weather() {
        assert_eq!(
            Erection.run(&reference_context(), &mut OutputMap::new()),
            Err(ModuleError::NoWeather)
        );
    }

    #[test]
    fn windier_sites_cost_more() {
        let mut calm = OutputMap::new();
        Erection.run(&with_wind("3.0"), &mut calm).expect("runs");
        let mut windy = OutputMap::new();
        Erection.run(&with_wind("12.0"), &mut windy).expect("runs");
        assert!(windy[TOTAL] > calm[TOTAL]);
        assert_eq!(windy[MATERIAL], calm[MATERIAL]);
    }

    #[test]
    fn breakdowns_extend_crane_time() {
        let mut base = OutputMap::new();
        Erection.run(&with_wind("3.0"), &mut base).expect("runs");
        let mut ctx = with_wind("3.0");
        ctx.set_input(keys::CRANE_BREAKDOWN_FRACTION, 0.5.into());
        let mut broken = OutputMap::new();
        Erection.run(&ctx, &mut broken).expect("runs");
        assert!((broken[EQUIPMENT_RENTAL] - 2.0 * base[EQUIPMENT_RENTAL]).abs() < 1e-3);
    }

    #[test]
    fn breakdown_fraction_of_one_is_rejected() {
        let mut ctx = with_wind("3.0");
        ctx.set_input(keys::CRANE_BREAKDOWN_FRACTION, 1.0.into());
        assert!(matches!(
            Erection.run(&ctx, &mut OutputMap::new()),
            Err(ModuleError::InvalidInput { .. })
        ));
    }
}
