//! Flattening of module outputs into the per-scenario report.

use serde::{Deserialize, Serialize};

use super::inputs::ErrorMap;
use super::manager::PROJECT_VALUE;
use super::modules::{
    OutputMap, collection, development, erection, foundation, grid_connection, management,
    site_preparation, substation,
};
use crate::error::PipelineError;

/// Flat BOS cost record for one successfully costed scenario, in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BosCostReport {
    pub total_bos_cost: f64,

    pub total_management_cost: f64,
    pub insurance_usd: f64,
    pub construction_permitting_usd: f64,
    pub project_management_usd: f64,
    pub bonding_usd: f64,
    pub markup_contingency_usd: f64,
    pub engineering_usd: f64,
    pub site_facility_usd: f64,

    pub total_development_cost: f64,
    pub development_equipment_rental_usd: f64,
    pub development_labor_usd: f64,
    pub development_material_usd: f64,
    pub development_mobilization_usd: f64,

    pub total_sitepreparation_cost: f64,
    pub sitepreparation_equipment_rental_usd: f64,
    pub sitepreparation_labor_usd: f64,
    pub sitepreparation_material_usd: f64,
    pub sitepreparation_mobilization_usd: f64,

    pub total_foundation_cost: f64,
    pub foundation_equipment_rental_usd: f64,
    pub foundation_labor_usd: f64,
    pub foundation_material_usd: f64,
    pub foundation_mobilization_usd: f64,

    pub total_erection_cost: f64,
    pub erection_equipment_rental_usd: f64,
    pub erection_labor_usd: f64,
    pub erection_material_usd: f64,
    pub erection_other_usd: f64,
    pub erection_mobilization_usd: f64,
    pub erection_fuel_usd: f64,

    pub total_gridconnection_cost: f64,

    pub total_collection_cost: f64,
    pub collection_equipment_rental_usd: f64,
    pub collection_labor_usd: f64,
    pub collection_material_usd: f64,
    pub collection_mobilization_usd: f64,

    pub total_substation_cost: f64,
}

impl BosCostReport {
    /// Field names in declaration order; matches [`values`](Self::values).
    pub const FIELDS: [&'static str; 38] = [
        "total_bos_cost",
        "total_management_cost",
        "insurance_usd",
        "construction_permitting_usd",
        "project_management_usd",
        "bonding_usd",
        "markup_contingency_usd",
        "engineering_usd",
        "site_facility_usd",
        "total_development_cost",
        "development_equipment_rental_usd",
        "development_labor_usd",
        "development_material_usd",
        "development_mobilization_usd",
        "total_sitepreparation_cost",
        "sitepreparation_equipment_rental_usd",
        "sitepreparation_labor_usd",
        "sitepreparation_material_usd",
        "sitepreparation_mobilization_usd",
        "total_foundation_cost",
        "foundation_equipment_rental_usd",
        "foundation_labor_usd",
        "foundation_material_usd",
        "foundation_mobilization_usd",
        "total_erection_cost",
        "erection_equipment_rental_usd",
        "erection_labor_usd",
        "erection_material_usd",
        "erection_other_usd",
        "erection_mobilization_usd",
        "erection_fuel_usd",
        "total_gridconnection_cost",
        "total_collection_cost",
        "collection_equipment_rental_usd",
        "collection_labor_usd",
        "collection_material_usd",
        "collection_mobilization_usd",
        "total_substation_cost",
    ];

    pub fn values(&self) -> [f64; 38] {
        [
            self.total_bos_cost,
            self.total_management_cost,
            self.insurance_usd,
            self.construction_permitting_usd,
            self.project_management_usd,
            self.bonding_usd,
            self.markup_contingency_usd,
            self.engineering_usd,
            self.site_facility_usd,
            self.total_development_cost,
            self.development_equipment_rental_usd,
            self.development_labor_usd,
            self.development_material_usd,
            self.development_mobilization_usd,
            self.total_sitepreparation_cost,
            self.sitepreparation_equipment_rental_usd,
            self.sitepreparation_labor_usd,
            self.sitepreparation_material_usd,
            self.sitepreparation_mobilization_usd,
            self.total_foundation_cost,
            self.foundation_equipment_rental_usd,
            self.foundation_labor_usd,
            self.foundation_material_usd,
            self.foundation_mobilization_usd,
            self.total_erection_cost,
            self.erection_equipment_rental_usd,
            self.erection_labor_usd,
            self.erection_material_usd,
            self.erection_other_usd,
            self.erection_mobilization_usd,
            self.erection_fuel_usd,
            self.total_gridconnection_cost,
            self.total_collection_cost,
            self.collection_equipment_rental_usd,
            self.collection_labor_usd,
            self.collection_material_usd,
            self.collection_mobilization_usd,
            self.total_substation_cost,
        ]
    }

    /// Per-module totals labelled the way cost line items name them.
    pub fn module_costs(&self) -> [(&'static str, f64); 8] {
        [
            ("DevelopmentCost", self.total_development_cost),
            ("SitePreparationCost", self.total_sitepreparation_cost),
            ("FoundationCost", self.total_foundation_cost),
            ("ErectionCost", self.total_erection_cost),
            ("CollectionCost", self.total_collection_cost),
            ("SubstationCost", self.total_substation_cost),
            ("GridConnectionCost", self.total_gridconnection_cost),
            ("ManagementCost", self.total_management_cost),
        ]
    }
}

/// What a scenario produced: its error messages or its costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioOutcome {
    Failed { errors: Vec<String> },
    Costed(BosCostReport),
}

impl ScenarioOutcome {
    pub fn is_costed(&self) -> bool {
        matches!(self, ScenarioOutcome::Costed(_))
    }

    pub fn report(&self) -> Option<&BosCostReport> {
        match self {
            ScenarioOutcome::Costed(report) => Some(report),
            ScenarioOutcome::Failed { .. } => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            ScenarioOutcome::Failed { errors } => errors,
            ScenarioOutcome::Costed(_) => &[],
        }
    }
}

/// Error outcome listing one `Error in <kind>: <message>` line per entry.
pub fn error_report(errors: &ErrorMap) -> ScenarioOutcome {
    ScenarioOutcome::Failed {
        errors: errors.messages(),
    }
}

/// Projects a completed output map into a [`BosCostReport`].
///
/// # Errors
///
/// Returns `PipelineError::MissingOutput` naming the first absent key.
pub fn project_costs(out: &OutputMap, project_id: &str) -> Result<BosCostReport, PipelineError> {
    let get = |key: &str| {
        out.get(key)
            .copied()
            .ok_or_else(|| PipelineError::MissingOutput {
                key: key.to_string(),
                project: project_id.to_string(),
            })
    };

    Ok(BosCostReport {
        total_bos_cost: get(PROJECT_VALUE)?,

        total_management_cost: get(management::TOTAL)?,
        insurance_usd: get(management::INSURANCE)?,
        construction_permitting_usd: get(management::CONSTRUCTION_PERMITTING)?,
        project_management_usd: get(management::PROJECT_MANAGEMENT)?,
        bonding_usd: get(management::BONDING)?,
        markup_contingency_usd: get(management::MARKUP_CONTINGENCY)?,
        engineering_usd: get(management::ENGINEERING)?,
        site_facility_usd: get(management::SITE_FACILITY)?,

        total_development_cost: get(development::TOTAL)?,
        development_equipment_rental_usd: 0.0,
        development_labor_usd: out
            .get(development::DEVELOPMENT_LABOR)
            .copied()
            .unwrap_or_default(),
        development_material_usd: 0.0,
        development_mobilization_usd: 0.0,

        total_sitepreparation_cost: get(site_preparation::TOTAL)?,
        sitepreparation_equipment_rental_usd: get(site_preparation::EQUIPMENT_RENTAL)?,
        sitepreparation_labor_usd: get(site_preparation::LABOR)?,
        sitepreparation_material_usd: get(site_preparation::MATERIAL)?,
        sitepreparation_mobilization_usd: get(site_preparation::MOBILIZATION)?,

        total_foundation_cost: get(foundation::TOTAL)?,
        foundation_equipment_rental_usd: get(foundation::EQUIPMENT_RENTAL)?,
        foundation_labor_usd: get(foundation::LABOR)?,
        foundation_material_usd: get(foundation::MATERIAL)?,
        foundation_mobilization_usd: get(foundation::MOBILIZATION)?,

        total_erection_cost: get(erection::TOTAL)?,
        erection_equipment_rental_usd: get(erection::EQUIPMENT_RENTAL)?,
        erection_labor_usd: get(erection::LABOR)?,
        erection_material_usd: get(erection::MATERIAL)?,
        erection_other_usd: get(erection::OTHER)?,
        erection_mobilization_usd: get(erection::MOBILIZATION)?,
        erection_fuel_usd: get(erection::FUEL)?,

        total_gridconnection_cost: get(grid_connection::TOTAL)?,

        total_collection_cost: get(collection::TOTAL)?,
        collection_equipment_rental_usd: get(collection::EQUIPMENT_RENTAL)?,
        collection_labor_usd: get(collection::LABOR)?,
        collection_material_usd: get(collection::MATERIAL)?,
        collection_mobilization_usd: get(collection::MOBILIZATION)?,

        total_substation_cost: get(substation::TOTAL)?,
    })
}
