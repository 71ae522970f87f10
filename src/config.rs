use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub pricing: PricingConfig,
    pub planner: PlannerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: String,
    /// Default location for resource descriptors that do not name one
    pub region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Volume size used when a descriptor does not give one
    pub default_volume_size_gb: u32,
    /// USD per hour, merged over the built-in instance table
    pub instance_prices: BTreeMap<String, f64>,
    /// USD per GB-month, merged over the built-in volume table
    pub volume_prices: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub seed: u64,
    /// Random resource orders tried on top of the criticality order
    pub permutation_samples: usize,
    pub plan_file: PathBuf,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "aws".to_string(),
            region: "us-east-1".to_string(),
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_volume_size_gb: 8,
            instance_prices: BTreeMap::new(),
            volume_prices: BTreeMap::new(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            permutation_samples: 100,
            plan_file: PathBuf::from("allocation_plan.json"),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            // Try .fleetcost.toml in current dir, then ~/.config/fleetcost/config.toml
            let local = PathBuf::from(".fleetcost.toml");
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("fleetcost").join("config.toml"))
                    .unwrap_or_else(|| PathBuf::from(".fleetcost.toml"))
            }
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
            let config: Config = toml::from_str(&content).with_context(|| {
                let mut err = format!("Failed to parse config: {}", config_path.display());
                err.push_str("\n  Common issues:");
                err.push_str("\n    - Invalid TOML syntax");
                err.push_str("\n    - Prices given as strings instead of numbers");
                err.push_str("\n  Tip: Run 'fleetcost init' to create a new config file");
                err
            })?;
            config.validate()?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            if path.is_some() {
                eprintln!("WARNING: Config file not found: {}", config_path.display());
                eprintln!("   Using default configuration. Run 'fleetcost init' to create a config file.");
            }
            Ok(Config::default())
        }
    }

    /// Reject price overrides that would produce nonsense estimates.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;

        let prices = self
            .pricing
            .instance_prices
            .iter()
            .map(|(k, v)| ("pricing.instance_prices", k, v))
            .chain(
                self.pricing
                    .volume_prices
                    .iter()
                    .map(|(k, v)| ("pricing.volume_prices", k, v)),
            );
        for (section, key, price) in prices {
            if !price.is_finite() || *price < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.{}", section, key),
                    reason: format!("price must be a non-negative number, got {}", price),
                }
                .into());
            }
        }

        if !crate::stack::SUPPORTED_PROVIDERS.contains(&self.provider.name.as_str()) {
            return Err(ConfigError::UnsupportedProvider(self.provider.name.clone()).into());
        }

        if self.provider.region.trim().is_empty() {
            return Err(ConfigError::MissingField("provider.region".to_string()).into());
        }

        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

pub fn init_config(output: &Path) -> Result<()> {
    let config = Config::default();
    config.save(output)?;
    println!("Created config file: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.provider.name, "aws");
        assert_eq!(config.provider.region, "us-east-1");
        assert_eq!(config.planner.seed, 1);
        assert_eq!(config.planner.permutation_samples, 100);
        assert_eq!(config.pricing.default_volume_size_gb, 8);
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let mut config = Config::default();
        config.planner.seed = 42;
        config
            .pricing
            .instance_prices
            .insert("m7i.large".to_string(), 0.1008);
        assert!(config.save(&config_path).is_ok());
        assert!(config_path.exists());

        let loaded = Config::load(Some(&config_path)).unwrap();
        assert_eq!(loaded.planner.seed, 42);
        assert_eq!(loaded.pricing.instance_prices.get("m7i.large"), Some(&0.1008));
    }

    #[test]
    fn test_config_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let fake_path = temp_dir.path().join("nonexistent.toml");

        // Should return default config
        let config = Config::load(Some(&fake_path)).unwrap();
        assert_eq!(config.planner.seed, 1);
    }

    #[test]
    fn test_config_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        std::fs::write(&config_path, "[provider]\nregion = \"eu-west-1\"\n").unwrap();

        let config = Config::load(Some(&config_path)).unwrap();
        assert_eq!(config.provider.region, "eu-west-1");
        assert_eq!(config.provider.name, "aws");
        assert_eq!(config.planner.plan_file, PathBuf::from("allocation_plan.json"));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "invalid toml content {").unwrap();

        let result = Config::load(Some(&config_path));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_rejects_negative_price() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("negative.toml");
        std::fs::write(
            &config_path,
            "[pricing.instance_prices]\n\"t3.micro\" = -1.0\n",
        )
        .unwrap();

        let err = Config::load(Some(&config_path)).unwrap_err();
        assert!(format!("{:#}", err).contains("t3.micro"));
    }

    #[test]
    fn test_config_rejects_unsupported_provider() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("gcp.toml");
        std::fs::write(
            &config_path,
            "[provider]\nname = \"gcp\"\nregion = \"us-central1\"\n",
        )
        .unwrap();

        let err = Config::load(Some(&config_path)).unwrap_err();
        assert!(format!("{:#}", err).contains("gcp"));
        assert_eq!(
            crate::exit_codes::exit_code_for_anyhow(&err),
            crate::exit_codes::codes::CONFIG_ERROR
        );
    }

    #[test]
    fn test_init_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("init_test.toml");

        assert!(init_config(&config_path).is_ok());
        assert!(config_path.exists());

        let config = Config::load(Some(&config_path)).unwrap();
        assert_eq!(config.provider.name, "aws");
    }
}
