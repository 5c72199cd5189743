use super::markets::resolve_instrument;
use super::{panel, ui};
use crate::core::market;
use crate::core::{ConverterStore, ConverterView, FiatOption, MarketDataProvider, Output, input};
use anyhow::{Result, anyhow, bail};
use chrono::Local;
use tracing::warn;

/// Loads current prices and converts `amount` into the instrument named by
/// `coin` (id or symbol), or into the top-ranked instrument when `coin` is absent.
pub async fn quote(
    provider: &dyn MarketDataProvider,
    fiat: &'static FiatOption,
    amount: &str,
    coin: Option<&str>,
) -> Result<ConverterView> {
    if !input::is_valid_amount_text(amount) {
        bail!("Invalid amount: {amount}");
    }

    let mut store = ConverterStore::new(fiat, amount);
    let ticket = store.start();

    let pb = ui::new_spinner(&format!("Fetching prices in {}...", fiat.code));
    let result = market::fetch_instruments(provider, ticket.fiat.code).await;
    pb.finish_and_clear();

    match result {
        Ok(instruments) => {
            store.on_fetch_complete(ticket.request_id, instruments, Local::now());
        }
        Err(e) => {
            warn!(error = %e, "Market data request failed");
            store.on_fetch_error(ticket.request_id, e);
        }
    }

    if let Some(query) = coin {
        if store.error().is_none() {
            let id = resolve_instrument(store.instruments(), query)
                .map(|i| i.id.clone())
                .ok_or_else(|| anyhow!("Unknown cryptocurrency: {query}"))?;
            store.on_instrument_select(&id);
        }
    }

    Ok(store.view())
}

pub async fn run(
    provider: &dyn MarketDataProvider,
    fiat: &'static FiatOption,
    amount: &str,
    coin: Option<&str>,
) -> Result<()> {
    let view = quote(provider, fiat, amount, coin).await?;
    println!("{}", panel::render(&view));

    if let Output::Error { message } = &view.output {
        bail!("{message}");
    }
    Ok(())
}
