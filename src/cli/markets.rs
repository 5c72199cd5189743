use super::ui;
use crate::core::convert::format_unit_price;
use crate::core::market::{self, InstrumentList, MarketInstrument};
use crate::core::{FiatOption, MarketDataProvider};
use anyhow::{Context, Result};
use comfy_table::Cell;

/// Finds an instrument by id, or failing that by ticker symbol.
pub fn resolve_instrument<'a>(
    instruments: &'a InstrumentList,
    query: &str,
) -> Option<&'a MarketInstrument> {
    let query = query.trim();
    instruments.find(query).or_else(|| {
        instruments
            .iter()
            .find(|i| i.symbol.eq_ignore_ascii_case(query))
    })
}

pub fn display_as_table(
    instruments: &InstrumentList,
    fiat: &FiatOption,
    selected: Option<&str>,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Id"),
        ui::header_cell("Name"),
        ui::header_cell(&format!("Price ({})", fiat.code)),
    ]);

    for (rank, instrument) in instruments.iter().enumerate() {
        let name = instrument.label();
        let name_cell = if selected == Some(instrument.id.as_str()) {
            ui::selected_cell(&format!("{name} *"))
        } else {
            Cell::new(name)
        };
        table.add_row(vec![
            ui::right_cell(&(rank + 1).to_string()),
            Cell::new(&instrument.id),
            name_cell,
            ui::right_cell(&format!(
                "{}{}",
                fiat.symbol,
                format_unit_price(instrument.current_price)
            )),
        ]);
    }

    table.to_string()
}

pub async fn run(provider: &dyn MarketDataProvider, fiat: &'static FiatOption) -> Result<()> {
    let pb = ui::new_spinner(&format!("Fetching markets in {}...", fiat.code));
    let result = market::fetch_instruments(provider, fiat.code).await;
    pb.finish_and_clear();

    let instruments =
        result.with_context(|| format!("Failed to load markets in {}", fiat.code))?;

    println!(
        "Top {} cryptocurrencies in {}\n",
        instruments.len(),
        ui::style_text(&fiat.to_string(), ui::StyleType::Title)
    );
    println!("{}", display_as_table(&instruments, fiat, None));
    Ok(())
}
