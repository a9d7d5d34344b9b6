//! Balance-of-station cost modules.

/// Medium-voltage cabling between turbines and the substation.
pub mod collection;
pub mod development;
/// Turbine crane lifts, sensitive to wind and crane availability.
pub mod erection;
/// Spread-footing foundations sized by overturning moment.
pub mod foundation;
pub mod grid_connection;
/// Overhead costs on top of the direct module subtotal.
pub mod management;
/// Access roads and crane pads.
pub mod site_preparation;
pub mod substation;
pub mod types;

pub use collection::Collection;
pub use development::Development;
pub use erection::Erection;
pub use foundation::Foundation;
pub use grid_connection::GridConnection;
pub use management::Management;
pub use site_preparation::SitePreparation;
pub use substation::Substation;
pub use types::{CostModule, ModuleError, OutputMap, PlantLayout};
