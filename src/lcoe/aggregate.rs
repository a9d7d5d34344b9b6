//! BOS aggregation, AEP/TCC joins and the LCOE formula.

use std::collections::HashMap;

use ordered_float::OrderedFloat;
use tracing::info;

use super::branch::{BranchSpec, branch};
use super::types::{
    AepRecord, AepTcc, BosAggregate, BosKey, CostLineItem, LcoeRow, RatingHubKey, TccRecord,
    TurbineClassKey,
};
use crate::error::PipelineError;

/// Financial constants of the LCOE formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LcoeParams {
    /// Fixed charge rate, per year.
    pub fcr_per_yr: f64,
    pub opex_usd_per_kw_yr: f64,
}

impl Default for LcoeParams {
    fn default() -> Self {
        Self {
            fcr_per_yr: 0.079,
            opex_usd_per_kw_yr: 52.0,
        }
    }
}

/// Sums line item costs per [`BosKey`], keeping first-appearance order.
pub fn aggregate(items: &[CostLineItem]) -> Vec<BosAggregate> {
    let mut index: HashMap<BosKey, usize> = HashMap::new();
    let mut groups: Vec<BosAggregate> = Vec::new();
    for item in items {
        let key = BosKey::from_item(item);
        match index.get(&key) {
            Some(&idx) => groups[idx].bos_capex_usd += item.cost_per_project,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(BosAggregate {
                    key,
                    bos_capex_usd: item.cost_per_project,
                });
            }
        }
    }
    groups
}

/// Inner join on (rating, rotor diameter, hub height), in AEP row order.
///
/// # Errors
///
/// Returns `PipelineError::EmptyJoin` if no AEP row finds a TCC partner.
pub fn join_aep_tcc(aep: &[AepRecord], tcc: &[TccRecord]) -> Result<Vec<AepTcc>, PipelineError> {
    let mut by_class: HashMap<TurbineClassKey, Vec<&TccRecord>> = HashMap::new();
    for row in tcc {
        let key = (
            OrderedFloat(row.rating_kw),
            OrderedFloat(row.rotor_diameter_m),
            OrderedFloat(row.hub_height_m),
        );
        by_class.entry(key).or_default().push(row);
    }

    let mut joined = Vec::new();
    for a in aep {
        let key = (
            OrderedFloat(a.rating_kw),
            OrderedFloat(a.rotor_diameter_m),
            OrderedFloat(a.hub_height_m),
        );
        for t in by_class.get(&key).into_iter().flatten() {
            joined.push(AepTcc {
                rating_kw: a.rating_kw,
                rotor_diameter_m: a.rotor_diameter_m,
                hub_height_m: a.hub_height_m,
                aep_kwh_per_yr: a.aep_kwh_per_yr,
                tcc_usd_per_kw: t.tcc_usd_per_kw,
            });
        }
    }

    if joined.is_empty() {
        return Err(PipelineError::EmptyJoin { join: "aep_tcc" });
    }
    info!(rows = joined.len(), "joined AEP and TCC");
    Ok(joined)
}

/// Joins BOS groups onto AEP/TCC rows by (rating, hub height) and prices each match.
///
/// # Errors
///
/// Returns `PipelineError::EmptyInput` if `bos` is empty, or
/// `PipelineError::EmptyJoin` if no BOS group matches any AEP/TCC row.
pub fn compute_lcoe(
    aep_tcc: &[AepTcc],
    bos: &[BosAggregate],
    params: LcoeParams,
) -> Result<Vec<LcoeRow>, PipelineError> {
    if bos.is_empty() {
        return Err(PipelineError::EmptyInput("bos_sum"));
    }

    let mut by_rating_hub: HashMap<RatingHubKey, Vec<&BosAggregate>> = HashMap::new();
    for group in bos {
        by_rating_hub.entry(group.key.rating_hub()).or_default().push(group);
    }

    let mut rows = Vec::new();
    for turbine in aep_tcc {
        for group in by_rating_hub.get(&turbine.rating_hub()).into_iter().flatten() {
            rows.push(lcoe_row(turbine, group, params));
        }
    }

    if rows.is_empty() {
        return Err(PipelineError::EmptyJoin { join: "aep_tcc_bos" });
    }
    Ok(rows)
}

fn lcoe_row(turbine: &AepTcc, group: &BosAggregate, params: LcoeParams) -> LcoeRow {
    let turbines = group.key.num_turbines.into_inner();
    let rating_kw = turbine.rating_kw;

    let total_opex_usd = params.opex_usd_per_kw_yr * rating_kw * turbines;
    let turbine_capex_usd = turbine.tcc_usd_per_kw * rating_kw * turbines;
    let annualized_capex = (group.bos_capex_usd + turbine_capex_usd) * params.fcr_per_yr;
    let plant_aep = turbine.aep_kwh_per_yr * turbines;

    LcoeRow {
        rating_kw,
        rotor_diameter_m: turbine.rotor_diameter_m,
        hub_height_m: turbine.hub_height_m,
        aep_kwh_per_yr: turbine.aep_kwh_per_yr,
        tcc_usd_per_kw: turbine.tcc_usd_per_kw,
        bos_rotor_diameter_m: group.key.rotor_diameter_m.into_inner(),
        num_turbines: turbines,
        labor_cost_multiplier: group.key.labor_cost_multiplier.into_inner(),
        crane_breakdown_fraction: group.key.crane_breakdown_fraction.into_inner(),
        modification: group.key.modification.clone(),
        bos_capex_usd: group.bos_capex_usd,
        fcr_per_yr: params.fcr_per_yr,
        opex_usd_per_kw_yr: params.opex_usd_per_kw_yr,
        total_opex_usd,
        turbine_capex_usd,
        lcoe_usd_per_kwh: (annualized_capex + total_opex_usd) / plant_aep,
    }
}

/// Full LCOE pass: branch, aggregate, join and price.
///
/// # Arguments
///
/// * `items` - Conventional BOS line items
/// * `aep` - Annual energy production per turbine class
/// * `tcc` - Turbine capital cost per turbine class
/// * `spec` - Modules to discount
/// * `params` - Financial constants
///
/// # Errors
///
/// Returns `PipelineError::EmptyJoin` or `PipelineError::EmptyInput` as
/// described on [`join_aep_tcc`] and [`compute_lcoe`].
pub fn run_lcoe(
    items: &[CostLineItem],
    aep: &[AepRecord],
    tcc: &[TccRecord],
    spec: &BranchSpec,
    params: LcoeParams,
) -> Result<Vec<LcoeRow>, PipelineError> {
    let branched = branch(items, spec);
    let bos_sum = aggregate(&branched);
    info!(groups = bos_sum.len(), "aggregated BOS costs");

    let aep_tcc = join_aep_tcc(aep, tcc)?;
    let rows = compute_lcoe(&aep_tcc, &bos_sum, params)?;
    info!(rows = rows.len(), "computed LCOE");
    Ok(rows)
}
