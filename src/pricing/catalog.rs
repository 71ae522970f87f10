//! Built-in price catalog
//!
//! Approximate on-demand Linux prices for us-east-1 plus a flat per-region
//! factor. This is a lookup table, not a cost model: prices drift, so the
//! config file can override or extend every entry.

use super::{format_price, PriceEstimate, PricedItem, PricingModule, ResourceMap, HOURS_PER_MONTH};
use crate::config::PricingConfig;
use crate::error::{FleetError, Result};
use crate::validation::{validate_instance_type, validate_resource_id, validate_volume_size};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::debug;

/// USD per hour, us-east-1, on-demand, Linux
const INSTANCE_PRICES: &[(&str, f64)] = &[
    ("t3.nano", 0.0052),
    ("t3.micro", 0.0104),
    ("t3.small", 0.0208),
    ("t3.medium", 0.0416),
    ("t3.large", 0.0832),
    ("t3.xlarge", 0.1664),
    ("t3.2xlarge", 0.3328),
    ("t3a.medium", 0.0376),
    ("t3a.large", 0.0752),
    ("t4g.micro", 0.0084),
    ("t4g.small", 0.0168),
    ("t4g.medium", 0.0336),
    ("t4g.large", 0.0672),
    ("m5.large", 0.096),
    ("m5.xlarge", 0.192),
    ("m5.2xlarge", 0.384),
    ("m5.4xlarge", 0.768),
    ("m6i.large", 0.096),
    ("m6i.xlarge", 0.192),
    ("m6i.2xlarge", 0.384),
    ("m7i.large", 0.1008),
    ("m7i.xlarge", 0.2016),
    ("c5.large", 0.085),
    ("c5.xlarge", 0.17),
    ("c5.2xlarge", 0.34),
    ("c5.4xlarge", 0.68),
    ("c6i.large", 0.085),
    ("c6i.xlarge", 0.17),
    ("r5.large", 0.126),
    ("r5.xlarge", 0.252),
    ("r5.2xlarge", 0.504),
    ("r6i.large", 0.126),
    ("r6i.xlarge", 0.252),
    ("g4dn.xlarge", 0.526),
    ("g4dn.2xlarge", 0.752),
    ("p3.2xlarge", 3.06),
];

/// USD per GB-month, us-east-1
const VOLUME_PRICES: &[(&str, f64)] = &[
    ("gp3", 0.08),
    ("gp2", 0.10),
    ("io1", 0.125),
    ("io2", 0.125),
    ("st1", 0.045),
    ("sc1", 0.015),
    ("standard", 0.05),
];

/// (region code, location display name, price factor relative to us-east-1)
const REGIONS: &[(&str, &str, f64)] = &[
    ("us-east-1", "US East (N. Virginia)", 1.0),
    ("us-east-2", "US East (Ohio)", 1.0),
    ("us-west-1", "US West (N. California)", 1.17),
    ("us-west-2", "US West (Oregon)", 1.0),
    ("ca-central-1", "Canada (Central)", 1.1),
    ("eu-west-1", "EU (Ireland)", 1.11),
    ("eu-west-2", "EU (London)", 1.16),
    ("eu-west-3", "EU (Paris)", 1.16),
    ("eu-central-1", "EU (Frankfurt)", 1.15),
    ("eu-south-2", "EU (Spain)", 1.1),
    ("eu-north-1", "EU (Stockholm)", 1.06),
    ("ap-southeast-1", "Asia Pacific (Singapore)", 1.25),
    ("ap-northeast-1", "Asia Pacific (Tokyo)", 1.3),
    ("ap-south-1", "Asia Pacific (Mumbai)", 1.05),
    ("sa-east-1", "South America (Sao Paulo)", 1.55),
];

/// A resolved region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub code: &'static str,
    pub name: &'static str,
    pub factor: f64,
}

/// Resolve a region code or display name, case-insensitively.
pub fn resolve_region(location: &str) -> Result<Region> {
    let wanted = location.trim();
    REGIONS
        .iter()
        .find(|(code, name, _)| code.eq_ignore_ascii_case(wanted) || name.eq_ignore_ascii_case(wanted))
        .map(|&(code, name, factor)| Region { code, name, factor })
        .ok_or_else(|| FleetError::UnknownLocation(location.to_string()))
}

/// All known regions, in table order
pub fn regions() -> impl Iterator<Item = Region> {
    REGIONS
        .iter()
        .map(|&(code, name, factor)| Region { code, name, factor })
}

/// Pricing module backed by static tables
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    instance_prices: BTreeMap<String, f64>,
    volume_prices: BTreeMap<String, f64>,
    default_volume_size_gb: u32,
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::from_config(&PricingConfig::default())
    }
}

impl StaticCatalog {
    /// Built-in tables with the config overrides merged on top.
    pub fn from_config(pricing: &PricingConfig) -> Self {
        let mut instance_prices: BTreeMap<String, f64> = INSTANCE_PRICES
            .iter()
            .map(|&(k, v)| (k.to_string(), v))
            .collect();
        let mut volume_prices: BTreeMap<String, f64> = VOLUME_PRICES
            .iter()
            .map(|&(k, v)| (k.to_string(), v))
            .collect();

        for (k, v) in &pricing.instance_prices {
            debug!(instance_type = %k, price = v, "instance price override");
            instance_prices.insert(k.clone(), *v);
        }
        for (k, v) in &pricing.volume_prices {
            debug!(volume_type = %k, price = v, "volume price override");
            volume_prices.insert(k.clone(), *v);
        }

        Self {
            instance_prices,
            volume_prices,
            default_volume_size_gb: pricing.default_volume_size_gb,
        }
    }

    /// USD per hour for one instance in us-east-1
    pub fn instance_price(&self, instance_type: &str) -> Result<f64> {
        self.instance_prices
            .get(instance_type)
            .copied()
            .ok_or_else(|| FleetError::UnknownInstanceType(instance_type.to_string()))
    }

    /// USD per GB-month in us-east-1
    pub fn volume_price(&self, volume_type: &str) -> Result<f64> {
        self.volume_prices
            .get(volume_type)
            .copied()
            .ok_or_else(|| FleetError::UnknownVolumeType(volume_type.to_string()))
    }

    pub fn instance_prices(&self) -> &BTreeMap<String, f64> {
        &self.instance_prices
    }

    pub fn volume_prices(&self) -> &BTreeMap<String, f64> {
        &self.volume_prices
    }

    /// Price every descriptor. Synchronous core of the `PricingModule` impl.
    pub fn estimate(&self, resources: &ResourceMap, default_location: &str) -> Result<PriceEstimate> {
        let mut items = Vec::with_capacity(resources.len());
        let mut total = 0.0;

        for (id, descriptor) in resources {
            validate_resource_id(id)?;
            validate_instance_type(&descriptor.instance_type)?;

            let location = descriptor.location.as_deref().unwrap_or(default_location);
            let region = resolve_region(location)?;
            let size_gb = descriptor
                .volume_size_gb
                .unwrap_or(self.default_volume_size_gb);
            validate_volume_size(size_gb)?;

            let compute_per_hour = self.instance_price(&descriptor.instance_type)? * region.factor;
            let volume_per_hour =
                self.volume_price(&descriptor.volume_type)? * size_gb as f64 * region.factor
                    / HOURS_PER_MONTH;
            let item_total = (compute_per_hour + volume_per_hour) * descriptor.quantity as f64;

            debug!(
                id = %id,
                instance_type = %descriptor.instance_type,
                region = region.code,
                quantity = descriptor.quantity,
                per_hour = item_total,
                "priced resource"
            );

            total += item_total;
            items.push(PricedItem {
                id: id.clone(),
                instance_type: descriptor.instance_type.clone(),
                location: region.name.to_string(),
                quantity: descriptor.quantity,
                compute_per_hour,
                volume_per_hour,
                total_per_hour: item_total,
            });
        }

        Ok(PriceEstimate {
            total_price_per_hour: format_price(total),
            items,
        })
    }
}

#[async_trait]
impl PricingModule for StaticCatalog {
    fn name(&self) -> &'static str {
        "static-catalog"
    }

    async fn price(&self, resources: &ResourceMap, default_location: &str) -> Result<PriceEstimate> {
        self.estimate(resources, default_location)
    }
}
