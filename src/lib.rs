//! fleetcost library
//!
//! Price declarations (resource map -> hourly and monthly price) and
//! capacity planning (services -> servers) behind the fleetcost CLI.

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod planner;
pub mod pricing;
pub mod report;
pub mod stack;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use error::{FleetError, Result};
pub use planner::{Plan, PlanOptions, Strategy};
pub use pricing::{monthly_price, PricingModule, ResourceDescriptor, ResourceMap, StaticCatalog};
pub use stack::{Declaration, Outputs};
