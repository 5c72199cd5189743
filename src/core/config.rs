use crate::core::fiat::FiatOption;
use crate::core::state::DEFAULT_AMOUNT;
use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoinGeckoProviderConfig {
    pub base_url: String,
    /// Demo plan key, sent as `x-cg-demo-api-key`
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub coingecko: Option<CoinGeckoProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            coingecko: Some(CoinGeckoProviderConfig {
                base_url: DEFAULT_COINGECKO_URL.to_string(),
                api_key: None,
            }),
        }
    }
}

fn default_currency() -> String {
    FiatOption::default_option().code.to_string()
}

fn default_amount() -> String {
    DEFAULT_AMOUNT.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_amount")]
    pub amount: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            currency: default_currency(),
            amount: default_amount(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to built-in
    /// defaults when no file has been set up yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "cryptoconv", "cryptoconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn coingecko(&self) -> CoinGeckoProviderConfig {
        self.providers
            .coingecko
            .clone()
            .unwrap_or_else(|| CoinGeckoProviderConfig {
                base_url: DEFAULT_COINGECKO_URL.to_string(),
                api_key: None,
            })
    }

    /// The configured default fiat currency.
    pub fn fiat(&self) -> Result<&'static FiatOption> {
        FiatOption::find(&self.currency)
            .ok_or_else(|| anyhow!("Unsupported currency in config: {}", self.currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  coingecko:
    base_url: "http://example.com/coingecko"
    api_key: "CG-test"
currency: "eur"
amount: "250.5"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        let coingecko = config.coingecko();
        assert_eq!(coingecko.base_url, "http://example.com/coingecko");
        assert_eq!(coingecko.api_key.as_deref(), Some("CG-test"));
        assert_eq!(config.fiat().unwrap().code, "EUR");
        assert_eq!(config.amount, "250.5");
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config: AppConfig = serde_yaml::from_str("currency: SGD\n").unwrap();
        assert_eq!(config.coingecko().base_url, DEFAULT_COINGECKO_URL);
        assert!(config.coingecko().api_key.is_none());
        assert_eq!(config.amount, "1000");
        assert_eq!(config.fiat().unwrap().code, "SGD");

        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.currency, "USD");
    }

    #[test]
    fn test_unsupported_currency() {
        let config: AppConfig = serde_yaml::from_str("currency: GBP\n").unwrap();
        let err = config.fiat().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported currency in config: GBP");
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = AppConfig::load_from_path(dir.path().join("missing.yaml"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
