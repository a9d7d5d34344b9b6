//! Synthetic cost scenarios derived from conventional line items.

use tracing::info;

use super::types::CostLineItem;

/// Label of unmodified rows.
pub const CONVENTIONAL: &str = "Conventional";

/// Which modules to discount and by how much.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchSpec {
    /// Module aliases; `Erection` targets line items named `ErectionCost`.
    pub aliases: Vec<String>,
    /// Multiplier applied to the targeted module's cost.
    pub fraction: f64,
}

impl Default for BranchSpec {
    fn default() -> Self {
        Self {
            aliases: vec!["Erection".to_string(), "Foundation".to_string()],
            fraction: 0.5,
        }
    }
}

/// Scenario label for a discounted module, e.g. `Erection 50%`.
pub fn modification_label(alias: &str, fraction: f64) -> String {
    format!("{alias} {}%", (fraction * 100.0).round() as i64)
}

/// Line item module name for an alias.
pub fn module_name(alias: &str) -> String {
    format!("{alias}Cost")
}

/// Returns the conventional rows followed by one full copy per alias.
///
/// In each copy only rows of the targeted module are scaled; every other
/// row keeps its conventional cost. Output length is
/// `(1 + aliases) * items.len()`.
pub fn branch(items: &[CostLineItem], spec: &BranchSpec) -> Vec<CostLineItem> {
    let mut out: Vec<CostLineItem> = items
        .iter()
        .map(|item| CostLineItem {
            modification: Some(CONVENTIONAL.to_string()),
            ..item.clone()
        })
        .collect();

    for alias in &spec.aliases {
        info!(alias = %alias, fraction = spec.fraction, "branching module cost");
        let label = modification_label(alias, spec.fraction);
        let module = module_name(alias);
        out.extend(items.iter().map(|item| {
            let mut row = item.clone();
            row.modification = Some(label.clone());
            if row.module == module {
                row.cost_per_project *= spec.fraction;
            }
            row
        }));
    }

    info!(
        original = items.len(),
        branched = out.len(),
        "branched BOS line items"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(module: &str, cost: f64) -> CostLineItem {
        CostLineItem {
            project_id_with_serial: "P1".into(),
            module: module.into(),
            cost_per_project: cost,
            num_turbines: 100.0,
            turbine_rating_mw: 1.5,
            hub_height_m: 80.0,
            labor_cost_multiplier: 1.0,
            crane_breakdown_fraction: 0.0,
            rotor_diameter_m: 77.0,
            modification: None,
        }
    }

    #[test]
    fn labels_round_the_percentage() {
        assert_eq!(modification_label("Erection", 0.5), "Erection 50%");
        assert_eq!(modification_label("Foundation", 0.333), "Foundation 33%");
    }

    #[test]
    fn one_row_two_targets_gives_three_rows() {
        let out = branch(&[item("ErectionCost", 100.0)], &BranchSpec::default());
        assert_eq!(out.len(), 3);
        let labels: Vec<_> = out.iter().filter_map(|r| r.modification.as_deref()).collect();
        assert_eq!(labels, vec!["Conventional", "Erection 50%", "Foundation 50%"]);
        assert_eq!(out[0].cost_per_project, 100.0);
        assert_eq!(out[1].cost_per_project, 50.0);
        assert_eq!(out[2].cost_per_project, 100.0);
    }

    #[test]
    fn untargeted_modules_keep_full_cost() {
        let items = [item("ErectionCost", 100.0), item("SubstationCost", 40.0)];
        let out = branch(&items, &BranchSpec::default());
        let erection_50: f64 = out
            .iter()
            .filter(|r| r.modification.as_deref() == Some("Erection 50%"))
            .map(|r| r.cost_per_project)
            .sum();
        assert_eq!(erection_50, 90.0);
    }
}
