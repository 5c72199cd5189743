//! Market instruments and the loader that produces instrument lists

use crate::core::error::FetchError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// Identifiers of stablecoins that never show up in an instrument list.
pub const STABLECOIN_EXCLUSIONS: [&str; 10] = [
    "tether",
    "usd-coin",
    "dai",
    "first-digital-usd",
    "ethena-usde",
    "usdd",
    "true-usd",
    "paxos-standard",
    "binance-usd",
    "frax",
];

/// Maximum number of instruments kept after exclusion.
pub const MAX_INSTRUMENTS: usize = 80;

/// Page size requested upstream so that enough entries survive exclusion.
pub const REQUEST_PAGE_SIZE: usize = 120;

pub fn is_excluded(id: &str) -> bool {
    STABLECOIN_EXCLUSIONS.contains(&id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketInstrument {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub current_price: Decimal,
    pub image_url: Option<String>,
}

impl MarketInstrument {
    /// "Bitcoin (BTC)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.symbol.to_uppercase())
    }
}

/// Ranked, filtered snapshot of instruments. Replaced wholesale on every fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentList {
    entries: Arc<[MarketInstrument]>,
}

impl InstrumentList {
    /// Builds a list from instruments in upstream rank order, dropping excluded
    /// stablecoins and keeping at most [`MAX_INSTRUMENTS`] entries.
    pub fn from_ranked<I>(ranked: I) -> Self
    where
        I: IntoIterator<Item = MarketInstrument>,
    {
        let entries: Vec<MarketInstrument> = ranked
            .into_iter()
            .filter(|instrument| !is_excluded(&instrument.id))
            .take(MAX_INSTRUMENTS)
            .collect();
        Self {
            entries: entries.into(),
        }
    }

    pub fn find(&self, id: &str) -> Option<&MarketInstrument> {
        self.entries.iter().find(|instrument| instrument.id == id)
    }

    pub fn first(&self) -> Option<&MarketInstrument> {
        self.entries.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarketInstrument> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Source of ranked market instruments.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Returns up to `per_page` instruments priced in `vs_currency`, ordered by
    /// descending market capitalization.
    async fn fetch_markets(
        &self,
        vs_currency: &str,
        per_page: usize,
    ) -> Result<Vec<MarketInstrument>, FetchError>;
}

/// Loads a fresh [`InstrumentList`] priced in `fiat_code`.
pub async fn fetch_instruments(
    provider: &dyn MarketDataProvider,
    fiat_code: &str,
) -> Result<InstrumentList, FetchError> {
    let vs_currency = fiat_code.trim().to_lowercase();
    let ranked = provider
        .fetch_markets(&vs_currency, REQUEST_PAGE_SIZE)
        .await?;
    let received = ranked.len();
    let list = InstrumentList::from_ranked(ranked);
    debug!(
        vs_currency = %vs_currency,
        received,
        kept = list.len(),
        "Built instrument list"
    );
    Ok(list)
}
