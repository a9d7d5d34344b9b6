//! Balance-of-station scenario pipeline.

/// Project list expansion against the parametric list.
pub mod expansion;
/// Turbine component table and its scaling relations.
pub mod geometry;
pub mod inputs;
pub mod manager;
pub mod modules;
pub mod projector;
pub mod runner;
/// Hourly weather window.
pub mod weather;

pub use inputs::{ErrorKind, ErrorMap, InputValue, Overrides, ScenarioContext};
pub use manager::Manager;
pub use projector::{BosCostReport, ScenarioOutcome};
pub use runner::{BosRunner, ScenarioKey, ScenarioReport};
pub use weather::{WeatherSource, WeatherWindow};
