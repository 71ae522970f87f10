//! Resource descriptors and the pricing module seam
//!
//! A declaration hands a static map of resource descriptors to a pricing
//! module and gets back a total price per hour as a numeric string. The
//! string is kept opaque until the monthly conversion needs a number.

pub mod catalog;
pub mod monthly;

pub use catalog::StaticCatalog;
pub use monthly::{monthly_price, HOURS_PER_MONTH};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One billable item and its pricing-relevant attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub instance_type: String,
    /// Region code or display name; falls back to the provider region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(alias = "volume_api_name")]
    pub volume_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_size_gb: Option<u32>,
}

fn default_quantity() -> u32 {
    1
}

/// Resource identifier -> descriptor. Ordered so estimates are reproducible.
pub type ResourceMap = BTreeMap<String, ResourceDescriptor>;

/// Price breakdown for one descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedItem {
    pub id: String,
    pub instance_type: String,
    pub location: String,
    pub quantity: u32,
    /// USD/hour for one unit's compute
    pub compute_per_hour: f64,
    /// USD/hour for one unit's volume
    pub volume_per_hour: f64,
    /// USD/hour for all units
    pub total_per_hour: f64,
}

/// What a pricing module returns for a resource map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEstimate {
    /// Numeric string, e.g. "0.0957"
    pub total_price_per_hour: String,
    pub items: Vec<PricedItem>,
}

/// Maps resource descriptors to cost figures.
#[async_trait]
pub trait PricingModule: Send + Sync {
    /// Module name for logs and reports
    fn name(&self) -> &'static str;

    /// Price every descriptor in `resources`.
    ///
    /// `default_location` applies to descriptors without a location.
    async fn price(&self, resources: &ResourceMap, default_location: &str)
        -> Result<PriceEstimate>;
}

/// Render a price as the numeric string carried in estimates.
///
/// Rounded to 6 decimal places so summed floats do not leak noise digits.
pub fn format_price(value: f64) -> String {
    let rounded = (value * 1_000_000.0).round() / 1_000_000.0;
    // Avoid "-0" for tiny negative rounding residue
    if rounded == 0.0 {
        return "0".to_string();
    }
    rounded.to_string()
}
