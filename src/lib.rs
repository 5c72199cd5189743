pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{FiatOption, MarketDataProvider};
use anyhow::{Result, anyhow};
use std::sync::Arc;
use tracing::{debug, info};

/// Commands that need configuration and market data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Currencies,
    Markets {
        fiat: Option<String>,
    },
    Convert {
        amount: Option<String>,
        fiat: Option<String>,
        coin: Option<String>,
    },
    Interactive {
        fiat: Option<String>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Crypto converter starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let coingecko = config.coingecko();
    let provider: Arc<dyn MarketDataProvider> = Arc::new(
        providers::coingecko::CoinGeckoProvider::new(&coingecko.base_url, coingecko.api_key),
    );

    match command {
        AppCommand::Currencies => {
            cli::currencies::run();
            Ok(())
        }
        AppCommand::Markets { fiat } => {
            let fiat = resolve_fiat(fiat.as_deref(), &config)?;
            cli::markets::run(provider.as_ref(), fiat).await
        }
        AppCommand::Convert { amount, fiat, coin } => {
            let fiat = resolve_fiat(fiat.as_deref(), &config)?;
            let amount = amount.as_deref().unwrap_or(&config.amount);
            cli::convert::run(provider.as_ref(), fiat, amount, coin.as_deref()).await
        }
        AppCommand::Interactive { fiat } => {
            let fiat = resolve_fiat(fiat.as_deref(), &config)?;
            cli::interactive::run_stdio(provider, fiat, &config.amount).await
        }
    }
}

/// Picks the fiat currency from an explicit code, falling back to the config.
pub fn resolve_fiat(code: Option<&str>, config: &AppConfig) -> Result<&'static FiatOption> {
    match code {
        Some(code) => FiatOption::find(code).ok_or_else(|| {
            let supported: Vec<&str> = FiatOption::all().iter().map(|f| f.code).collect();
            anyhow!(
                "Unsupported currency: {} (supported: {})",
                code,
                supported.join(", ")
            )
        }),
        None => config.fiat(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_fiat() {
        let config = AppConfig::default();
        assert_eq!(resolve_fiat(None, &config).unwrap().code, "USD");
        assert_eq!(resolve_fiat(Some("idr"), &config).unwrap().code, "IDR");

        let err = resolve_fiat(Some("GBP"), &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported currency: GBP (supported: USD, SGD, VND, THB, IDR, MYR, CNY, EUR)"
        );
    }
}
