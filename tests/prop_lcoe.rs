//! Property tests for cost-scenario branching and aggregation.

use proptest::prelude::*;

use windbos::lcoe::aggregate::aggregate;
use windbos::lcoe::branch::{CONVENTIONAL, branch};
use windbos::lcoe::{BranchSpec, CostLineItem};

const MODULES: [&str; 4] = ["ErectionCost", "FoundationCost", "SubstationCost", "CollectionCost"];

fn item(idx: usize, cost: f64) -> CostLineItem {
    CostLineItem {
        project_id_with_serial: format!("P{}", idx / MODULES.len()),
        module: MODULES[idx % MODULES.len()].to_string(),
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

fn items(costs: &[f64]) -> Vec<CostLineItem> {
    costs.iter().enumerate().map(|(i, c)| item(i, *c)).collect()
}

proptest! {
    #[test]
    fn branch_row_count(
        costs in prop::collection::vec(0.0f64..1e7, 1..40),
        targets in 1usize..4,
    ) {
        let spec = BranchSpec {
            aliases: ["Erection", "Foundation", "Substation"][..targets]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            fraction: 0.5,
        };
        let input = items(&costs);
        let out = branch(&input, &spec);
        prop_assert_eq!(out.len(), (1 + targets) * input.len());
        prop_assert!(out[..input.len()]
            .iter()
            .all(|r| r.modification.as_deref() == Some(CONVENTIONAL)));
    }

    #[test]
    fn branch_only_scales_the_targeted_module(
        costs in prop::collection::vec(1.0f64..1e7, 1..40),
        fraction in 0.05f64..1.0,
    ) {
        let spec = BranchSpec { aliases: vec!["Erection".into()], fraction };
        let input = items(&costs);
        let out = branch(&input, &spec);
        for (orig, copy) in input.iter().zip(&out[input.len()..]) {
            if copy.module == "ErectionCost" {
                let expected = orig.cost_per_project * fraction;
                prop_assert!((copy.cost_per_project - expected).abs() < 1e-6);
            } else {
                prop_assert_eq!(copy.cost_per_project, orig.cost_per_project);
            }
        }
    }

    #[test]
    fn aggregation_preserves_total_cost(costs in prop::collection::vec(0.0f64..1e7, 1..40)) {
        let input = items(&costs);
        let groups = aggregate(&branch(&input, &BranchSpec::default()));
        // one group per label: identical technical parameters collapse
        prop_assert_eq!(groups.len(), 3);
        let total: f64 = costs.iter().sum();
        prop_assert!((groups[0].bos_capex_usd - total).abs() <= 1e-6 * total.max(1.0));
    }
}
