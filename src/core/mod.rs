//! Core business logic abstractions

pub mod config;
pub mod convert;
pub mod error;
pub mod fiat;
pub mod input;
pub mod log;
pub mod market;
pub mod state;

// Re-export main types for cleaner imports
pub use error::FetchError;
pub use fiat::FiatOption;
pub use market::{InstrumentList, MarketDataProvider, MarketInstrument};
pub use state::{ConverterStore, ConverterView, FetchTicket, Output};
