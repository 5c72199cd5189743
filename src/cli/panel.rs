//! Text rendering of the converter panel

use super::ui::{self, StyleType};
use crate::core::market::MAX_INSTRUMENTS;
use crate::core::{ConverterView, Output};

pub fn render(view: &ConverterView) -> String {
    let amount = if view.amount_text.is_empty() {
        "0"
    } else {
        view.amount_text.as_str()
    };

    let mut output = format!(
        "{}\n  {} {}  {}\n\n{}\n",
        ui::style_text("You Pay", StyleType::Label),
        ui::style_text(amount, StyleType::Value),
        view.fiat.code,
        ui::style_text(&view.fiat.to_string(), StyleType::Subtle),
        ui::style_text("You Receive", StyleType::Label),
    );

    match &view.output {
        Output::Loading => {
            output.push_str(&format!(
                "  {}\n",
                ui::style_text("Loading market prices...", StyleType::Subtle)
            ));
        }
        Output::Error { message } => {
            output.push_str(&format!(
                "  {}\n  {}\n",
                ui::style_text(message, StyleType::Error),
                ui::style_text("Type `retry` to try again.", StyleType::Subtle)
            ));
        }
        Output::Quote {
            quantity,
            instrument,
            quote_line,
        } => {
            let label = instrument
                .as_ref()
                .map_or_else(|| "No instrument selected".to_string(), |i| i.label());
            output.push_str(&format!(
                "  {}  {}\n",
                ui::style_text(quantity, StyleType::Value),
                label
            ));
            if let Some(line) = quote_line {
                output.push_str(&format!(
                    "  {} {}\n",
                    ui::style_text("Current Price", StyleType::Subtle),
                    line
                ));
            }
        }
    }

    let updated = match view.last_updated {
        Some(at) => format!("Rates updated: {}", at.format("%H:%M:%S")),
        None => "Connecting to market...".to_string(),
    };
    let refreshing = if view.loading { " (refreshing)" } else { "" };
    output.push_str(&format!(
        "\n{}\n{}",
        ui::style_text(&format!("{updated}{refreshing}"), StyleType::Subtle),
        ui::style_text(
            &format!(
                "Data provided by CoinGecko API | Top {MAX_INSTRUMENTS} Cryptos (Excl. Stablecoins)"
            ),
            StyleType::Subtle
        ),
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::market::tests::instrument;
    use crate::core::{ConverterStore, FetchError, InstrumentList};
    use chrono::{Local, TimeZone};

    #[test]
    fn test_render_loading() {
        let mut store = ConverterStore::default();
        store.start();
        let text = render(&store.view());
        assert!(text.contains("1000"));
        assert!(text.contains("US Dollar"));
        assert!(text.contains("Loading market prices..."));
        assert!(text.contains("Connecting to market..."));
    }

    #[test]
    fn test_render_quote() {
        let mut store = ConverterStore::default();
        let ticket = store.start();
        let at = Local.with_ymd_and_hms(2026, 10, 16, 9, 30, 5).unwrap();
        store.on_fetch_complete(
            ticket.request_id,
            InstrumentList::from_ranked(vec![instrument("bitcoin", 50000)]),
            at,
        );

        let text = render(&store.view());
        assert!(text.contains("0.0200"));
        assert!(text.contains("BITCOIN (BIT)"));
        assert!(text.contains("1 BIT = $50,000"));
        assert!(text.contains("Rates updated: 09:30:05"));
        assert!(text.contains("Top 80 Cryptos"));
    }

    #[test]
    fn test_render_error() {
        let mut store = ConverterStore::default();
        let ticket = store.start();
        store.on_fetch_error(ticket.request_id, FetchError::Transport("refused".into()));

        let text = render(&store.view());
        assert!(text.contains("Could not reach the market data service."));
        assert!(text.contains("retry"));
        assert!(!text.contains("refreshing"));
    }
}
