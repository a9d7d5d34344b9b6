//! Records flowing through the LCOE pipeline.
//!
//! Serde names follow the column headers of the CSV files exchanged with the
//! BOS batch and the AEP/TCC datasets.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// One module's cost for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLineItem {
    #[serde(rename = "Project ID with serial", default)]
    pub project_id_with_serial: String,
    #[serde(rename = "Module")]
    pub module: String,
    #[serde(rename = "Cost per project")]
    pub cost_per_project: f64,
    #[serde(rename = "Number of turbines")]
    pub num_turbines: f64,
    #[serde(rename = "Turbine rating MW")]
    pub turbine_rating_mw: f64,
    #[serde(rename = "Hub height m")]
    pub hub_height_m: f64,
    #[serde(rename = "Labor cost multiplier")]
    pub labor_cost_multiplier: f64,
    #[serde(rename = "Crane breakdown fraction")]
    pub crane_breakdown_fraction: f64,
    #[serde(rename = "Rotor diameter m")]
    pub rotor_diameter_m: f64,
    /// Scenario label; blank in BOS batch exports, set by the brancher.
    #[serde(rename = "Modifications", default)]
    pub modification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AepRecord {
    #[serde(rename = "Rating [kW]")]
    pub rating_kw: f64,
    #[serde(rename = "Rotor Diam [m]")]
    pub rotor_diameter_m: f64,
    #[serde(rename = "Hub height [m]")]
    pub hub_height_m: f64,
    #[serde(rename = "AEP [kWh/yr]")]
    pub aep_kwh_per_yr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TccRecord {
    #[serde(rename = "Rating [kW]")]
    pub rating_kw: f64,
    #[serde(rename = "Rotor Diam [m]")]
    pub rotor_diameter_m: f64,
    #[serde(rename = "Hub height [m]")]
    pub hub_height_m: f64,
    #[serde(rename = "TCC [USD/kW]")]
    pub tcc_usd_per_kw: f64,
}

/// Turbine-class key shared by the AEP and TCC tables.
pub type TurbineClassKey = (OrderedFloat<f64>, OrderedFloat<f64>, OrderedFloat<f64>);

/// Key of the final join: rating and hub height.
pub type RatingHubKey = (OrderedFloat<f64>, OrderedFloat<f64>);

/// Row of the AEP and TCC join.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AepTcc {
    pub rating_kw: f64,
    pub rotor_diameter_m: f64,
    pub hub_height_m: f64,
    pub aep_kwh_per_yr: f64,
    pub tcc_usd_per_kw: f64,
}

impl AepTcc {
    pub fn rating_hub(&self) -> RatingHubKey {
        (OrderedFloat(self.rating_kw), OrderedFloat(self.hub_height_m))
    }
}

/// Grouping key for BOS costs. Distinct project IDs with identical technical
/// parameters collapse into one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BosKey {
    pub rating_kw: OrderedFloat<f64>,
    pub rotor_diameter_m: OrderedFloat<f64>,
    pub num_turbines: OrderedFloat<f64>,
    pub hub_height_m: OrderedFloat<f64>,
    pub labor_cost_multiplier: OrderedFloat<f64>,
    pub crane_breakdown_fraction: OrderedFloat<f64>,
    pub modification: String,
}

impl BosKey {
    pub fn from_item(item: &CostLineItem) -> Self {
        Self {
            rating_kw: OrderedFloat(item.turbine_rating_mw * 1000.0),
            rotor_diameter_m: OrderedFloat(item.rotor_diameter_m),
            num_turbines: OrderedFloat(item.num_turbines),
            hub_height_m: OrderedFloat(item.hub_height_m),
            labor_cost_multiplier: OrderedFloat(item.labor_cost_multiplier),
            crane_breakdown_fraction: OrderedFloat(item.crane_breakdown_fraction),
            modification: item.modification.clone().unwrap_or_default(),
        }
    }

    pub fn rating_hub(&self) -> RatingHubKey {
        (self.rating_kw, self.hub_height_m)
    }
}

/// Summed BOS capex for one [`BosKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct BosAggregate {
    pub key: BosKey,
    pub bos_capex_usd: f64,
}

/// One row of the LCOE table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LcoeRow {
    #[serde(rename = "Rating [kW]")]
    pub rating_kw: f64,
    #[serde(rename = "Rotor Diam [m]")]
    pub rotor_diameter_m: f64,
    #[serde(rename = "Hub height [m]")]
    pub hub_height_m: f64,
    #[serde(rename = "AEP [kWh/yr]")]
    pub aep_kwh_per_yr: f64,
    #[serde(rename = "TCC [USD/kW]")]
    pub tcc_usd_per_kw: f64,
    /// Rotor diameter of the BOS group; the final join does not match on it.
    #[serde(rename = "BOS Rotor Diam [m]")]
    pub bos_rotor_diameter_m: f64,
    #[serde(rename = "Number of turbines")]
    pub num_turbines: f64,
    #[serde(rename = "Labor cost multiplier")]
    pub labor_cost_multiplier: f64,
    #[serde(rename = "Crane breakdown fraction")]
    pub crane_breakdown_fraction: f64,
    #[serde(rename = "Modifications")]
    pub modification: String,
    #[serde(rename = "BOS Capex [USD]")]
    pub bos_capex_usd: f64,
    #[serde(rename = "FCR [/yr]")]
    pub fcr_per_yr: f64,
    #[serde(rename = "Opex [USD/kW/yr]")]
    pub opex_usd_per_kw_yr: f64,
    #[serde(rename = "Total Opex [USD]")]
    pub total_opex_usd: f64,
    #[serde(rename = "Turbine Capex [USD]")]
    pub turbine_capex_usd: f64,
    #[serde(rename = "LCOE [USD/kWh]")]
    pub lcoe_usd_per_kwh: f64,
}
