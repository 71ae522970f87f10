//! Price declarations
//!
//! A declaration names a provider, a static resource map, and is evaluated
//! once into two outputs: the hourly price reported by the pricing module
//! and the monthly price derived from it.
//!
//! ```toml
//! [provider]
//! name = "aws"
//! region = "eu-west-1"
//!
//! [resources.web]
//! instance_type = "t3.medium"
//! location = "EU (Ireland)"
//! quantity = 2
//! volume_type = "gp3"
//! ```

use crate::config::ProviderConfig;
use crate::error::{ConfigError, FleetError, Result};
use crate::pricing::{monthly_price, PriceEstimate, PricingModule, ResourceMap};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Providers the built-in catalog can price
pub const SUPPORTED_PROVIDERS: &[&str] = &["aws"];

/// A parsed declaration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub resources: ResourceMap,
}

/// Values exposed at the end of evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outputs {
    /// Exactly the string the pricing module produced
    pub hourly_price: String,
    pub monthly_price: f64,
}

/// Outputs plus the per-resource breakdown behind them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub provider: String,
    pub pricing_module: String,
    pub outputs: Outputs,
    pub estimate: PriceEstimate,
}

impl Declaration {
    /// Build a declaration in code, with the same provider check as `parse`.
    pub fn new(provider: ProviderConfig, resources: ResourceMap) -> Result<Self> {
        let declaration = Declaration {
            provider,
            resources,
        };
        declaration.check_provider()?;
        Ok(declaration)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "read declaration");
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let declaration: Declaration = toml::from_str(content)?;
        declaration.check_provider()?;
        Ok(declaration)
    }

    fn check_provider(&self) -> Result<()> {
        if !SUPPORTED_PROVIDERS.contains(&self.provider.name.as_str()) {
            return Err(ConfigError::UnsupportedProvider(self.provider.name.clone()).into());
        }
        Ok(())
    }

    /// Evaluate the declaration against a pricing module.
    ///
    /// The first error from the module or the monthly conversion aborts
    /// evaluation; there are no partial outputs.
    pub async fn evaluate(&self, module: &dyn PricingModule) -> Result<Evaluation> {
        info!(
            provider = %self.provider.name,
            resources = self.resources.len(),
            module = module.name(),
            "evaluating declaration"
        );

        let estimate = module.price(&self.resources, &self.provider.region).await?;
        let outputs = outputs_from_hourly(&estimate.total_price_per_hour)?;

        Ok(Evaluation {
            provider: self.provider.name.clone(),
            pricing_module: module.name().to_string(),
            outputs,
            estimate,
        })
    }
}

/// Build both outputs from an hourly price string.
pub fn outputs_from_hourly(hourly: &str) -> Result<Outputs> {
    let monthly = monthly_price(hourly)?;
    Ok(Outputs {
        hourly_price: hourly.to_string(),
        monthly_price: monthly,
    })
}

impl std::str::FromStr for Declaration {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::StaticCatalog;

    const SAMPLE: &str = r#"
        [provider]
        name = "aws"
        region = "us-east-1"

        [resources.web]
        instance_type = "t3.large"
        quantity = 2
        volume_type = "gp3"
        volume_size_gb = 73
    "#;

    #[test]
    fn test_parse_sample() {
        let declaration: Declaration = SAMPLE.parse().unwrap();
        assert_eq!(declaration.provider.region, "us-east-1");
        assert_eq!(declaration.resources.len(), 1);
        assert_eq!(declaration.resources["web"].quantity, 2);
    }

    #[test]
    fn test_parse_rejects_unsupported_provider() {
        let err = Declaration::parse("[provider]\nname = \"gcp\"\nregion = \"us-central1\"\n")
            .unwrap_err();
        assert!(matches!(
            err,
            FleetError::Config(ConfigError::UnsupportedProvider(ref p)) if p == "gcp"
        ));
    }

    #[test]
    fn test_new_rejects_unsupported_provider() {
        let provider = ProviderConfig {
            name: "gcp".to_string(),
            region: "us-central1".to_string(),
        };
        let err = Declaration::new(provider, ResourceMap::new()).unwrap_err();
        assert!(matches!(
            err,
            FleetError::Config(ConfigError::UnsupportedProvider(ref p)) if p == "gcp"
        ));
        assert!(Declaration::new(ProviderConfig::default(), ResourceMap::new()).is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        assert!(matches!(
            Declaration::parse("[provider"),
            Err(FleetError::Config(ConfigError::ParseError(_)))
        ));
    }

    #[tokio::test]
    async fn test_evaluate_sample() {
        let declaration: Declaration = SAMPLE.parse().unwrap();
        let evaluation = declaration.evaluate(&StaticCatalog::default()).await.unwrap();

        assert_eq!(evaluation.outputs.hourly_price, "0.1824");
        assert!((evaluation.outputs.monthly_price - 133.152).abs() < 1e-9);
        assert_eq!(evaluation.pricing_module, "static-catalog");
    }

    #[test]
    fn test_outputs_from_hourly() {
        let outputs = outputs_from_hourly("10.0").unwrap();
        assert_eq!(outputs.hourly_price, "10.0");
        assert_eq!(outputs.monthly_price, 7300.0);
        assert!(outputs_from_hourly("ten").is_err());
    }
}
