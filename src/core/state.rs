//! Converter state and its transitions
//!
//! [`ConverterStore`] owns every piece of mutable converter state. Events from
//! the interface are applied through the `on_*` transitions; network work is
//! requested by handing out a [`FetchTicket`] which the caller resolves with
//! [`ConverterStore::on_fetch_complete`] or [`ConverterStore::on_fetch_error`].
//! Tickets carry a monotonically increasing request id and only the most
//! recently issued ticket is allowed to change state.

use crate::core::convert::{self, EMPTY_QUANTITY};
use crate::core::error::FetchError;
use crate::core::fiat::FiatOption;
use crate::core::input;
use crate::core::market::{InstrumentList, MarketInstrument};
use chrono::{DateTime, Local};
use tracing::debug;

/// Initial content of the amount field.
pub const DEFAULT_AMOUNT: &str = "1000";

/// A dispatched market data request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub request_id: u64,
    pub fiat: &'static FiatOption,
}

/// What the output region should show.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// First load still outstanding, nothing to show yet
    Loading,
    /// Last fetch failed; retry is offered
    Error { message: String },
    Quote {
        quantity: String,
        instrument: Option<MarketInstrument>,
        quote_line: Option<String>,
    },
}

/// Immutable snapshot of the store used for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterView {
    pub fiat: &'static FiatOption,
    pub amount_text: String,
    pub instruments: InstrumentList,
    pub selected: Option<MarketInstrument>,
    pub loading: bool,
    pub refresh_enabled: bool,
    pub last_updated: Option<DateTime<Local>>,
    pub output: Output,
}

#[derive(Debug, Clone)]
pub struct ConverterStore {
    fiat: &'static FiatOption,
    amount_text: String,
    instruments: InstrumentList,
    selected: Option<MarketInstrument>,
    error: Option<FetchError>,
    last_updated: Option<DateTime<Local>>,
    last_request_id: u64,
    in_flight: Option<u64>,
}

impl ConverterStore {
    pub fn new(fiat: &'static FiatOption, amount_text: &str) -> Self {
        let amount_text = input::filter_amount_input("", amount_text).to_string();
        Self {
            fiat,
            amount_text,
            instruments: InstrumentList::default(),
            selected: None,
            error: None,
            last_updated: None,
            last_request_id: 0,
            in_flight: None,
        }
    }

    /// Issues the startup load.
    pub fn start(&mut self) -> FetchTicket {
        self.dispatch()
    }

    fn dispatch(&mut self) -> FetchTicket {
        self.last_request_id += 1;
        self.in_flight = Some(self.last_request_id);
        self.error = None;
        debug!(
            request_id = self.last_request_id,
            fiat = self.fiat.code,
            "Dispatching market data request"
        );
        FetchTicket {
            request_id: self.last_request_id,
            fiat: self.fiat,
        }
    }

    /// Switches the fiat currency. A change always triggers a reload, even
    /// while another request is outstanding.
    pub fn on_fiat_change(&mut self, fiat: &'static FiatOption) -> Option<FetchTicket> {
        if fiat.code == self.fiat.code {
            return None;
        }
        self.fiat = fiat;
        Some(self.dispatch())
    }

    /// Manual refresh or retry. Refused while a request is outstanding.
    pub fn request_refresh(&mut self) -> Option<FetchTicket> {
        if self.is_loading() {
            debug!("Refresh ignored, request already in flight");
            return None;
        }
        Some(self.dispatch())
    }

    /// Applies a successful load. Returns false when the response belongs to a
    /// superseded request and was discarded.
    pub fn on_fetch_complete(
        &mut self,
        request_id: u64,
        instruments: InstrumentList,
        at: DateTime<Local>,
    ) -> bool {
        if !self.accepts(request_id) {
            return false;
        }
        self.in_flight = None;
        self.error = None;
        self.selected = reconcile_selection(self.selected.take(), &instruments);
        self.instruments = instruments;
        self.last_updated = Some(at);
        true
    }

    /// Records a failed load. The current list and selection are kept.
    pub fn on_fetch_error(&mut self, request_id: u64, error: FetchError) -> bool {
        if !self.accepts(request_id) {
            return false;
        }
        self.in_flight = None;
        self.error = Some(error);
        true
    }

    fn accepts(&self, request_id: u64) -> bool {
        if request_id != self.last_request_id {
            debug!(
                request_id,
                latest = self.last_request_id,
                "Discarding response from superseded request"
            );
            return false;
        }
        true
    }

    /// Applies an edit of the amount field. Invalid text is refused silently.
    pub fn on_amount_input(&mut self, raw: &str) -> bool {
        if input::is_valid_amount_text(raw) {
            self.amount_text = raw.to_string();
            true
        } else {
            false
        }
    }

    /// Selects an instrument of the current list by id.
    pub fn on_instrument_select(&mut self, id: &str) -> bool {
        match self.instruments.find(id) {
            Some(instrument) => {
                self.selected = Some(instrument.clone());
                true
            }
            None => false,
        }
    }

    /// Conversion only runs fiat to crypto, so swapping has no effect.
    pub fn on_swap(&self) {}

    pub fn fiat(&self) -> &'static FiatOption {
        self.fiat
    }

    pub fn amount_text(&self) -> &str {
        &self.amount_text
    }

    pub fn instruments(&self) -> &InstrumentList {
        &self.instruments
    }

    pub fn selected(&self) -> Option<&MarketInstrument> {
        self.selected.as_ref()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Converted quantity of the selected instrument for the current amount.
    pub fn quantity(&self) -> String {
        convert::convert(
            &self.amount_text,
            self.selected.as_ref().map(|i| i.current_price),
        )
    }

    pub fn output(&self) -> Output {
        if self.is_loading() && self.selected.is_none() {
            Output::Loading
        } else if let Some(error) = &self.error {
            Output::Error {
                message: error.user_message().to_string(),
            }
        } else {
            Output::Quote {
                quantity: self.quantity(),
                instrument: self.selected.clone(),
                quote_line: self
                    .selected
                    .as_ref()
                    .map(|i| convert::quote_line(i, self.fiat)),
            }
        }
    }

    pub fn view(&self) -> ConverterView {
        ConverterView {
            fiat: self.fiat,
            amount_text: self.amount_text.clone(),
            instruments: self.instruments.clone(),
            selected: self.selected.clone(),
            loading: self.is_loading(),
            refresh_enabled: !self.is_loading(),
            last_updated: self.last_updated,
            output: self.output(),
        }
    }
}

impl Default for ConverterStore {
    fn default() -> Self {
        Self::new(FiatOption::default_option(), DEFAULT_AMOUNT)
    }
}

/// Carries a selection over to a freshly loaded list.
///
/// A selection still present is replaced by its refreshed entry. A missing
/// selection, or one that vanished from the list, falls back to the
/// highest-ranked entry.
pub fn reconcile_selection(
    current: Option<MarketInstrument>,
    instruments: &InstrumentList,
) -> Option<MarketInstrument> {
    if let Some(current) = current {
        if let Some(refreshed) = instruments.find(&current.id) {
            return Some(refreshed.clone());
        }
        debug!(id = %current.id, "Selected instrument missing after reload");
    }
    instruments.first().cloned()
}

impl Output {
    pub fn quantity(&self) -> &str {
        match self {
            Output::Quote { quantity, .. } => quantity,
            _ => EMPTY_QUANTITY,
        }
    }
}
