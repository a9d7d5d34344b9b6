//! Wind plant balance-of-system cost scenarios and LCOE aggregation.

#[cfg(feature = "api")]
pub mod api;
/// Scenario pipeline: expansion, inputs, geometry, weather, cost modules.
pub mod bos;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
/// Cost-scenario branching, aggregation and LCOE.
pub mod lcoe;
pub mod table;
pub mod telemetry;
