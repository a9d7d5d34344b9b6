//! LCOE aggregation over branched BOS cost scenarios.

pub mod aggregate;
/// What-if module cost scenarios.
pub mod branch;
pub mod types;

pub use aggregate::{LcoeParams, run_lcoe};
pub use branch::BranchSpec;
pub use types::{AepRecord, CostLineItem, LcoeRow, TccRecord};
