//! Fiat to crypto conversion and quantity formatting

use crate::core::fiat::FiatOption;
use crate::core::market::MarketInstrument;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Shown whenever there is nothing to convert.
pub const EMPTY_QUANTITY: &str = "0.00";

/// Parses user-entered amount text, ignoring comma grouping separators.
///
/// Returns `None` for empty or non-numeric text. A leading or trailing decimal
/// point is accepted (`".5"`, `"12."`), as long as at least one digit is present.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let mut cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if cleaned.ends_with('.') {
        cleaned.pop();
    }
    if let Some(fraction) = cleaned.strip_prefix('.') {
        cleaned = format!("0.{fraction}");
    }
    Decimal::from_str(&cleaned).ok()
}

/// Converts `fiat_amount_text` into a quantity of an instrument priced at
/// `unit_price`, formatted for display.
pub fn convert(fiat_amount_text: &str, unit_price: Option<Decimal>) -> String {
    let (Some(amount), Some(price)) = (parse_amount(fiat_amount_text), unit_price) else {
        return EMPTY_QUANTITY.to_string();
    };
    match amount.checked_div(price) {
        Some(value) => format_quantity(value),
        None => EMPTY_QUANTITY.to_string(),
    }
}

/// Number of decimal places used for a quantity of this size.
pub fn quantity_precision(value: Decimal) -> u32 {
    if value < Decimal::new(1, 5) {
        8
    } else if value < Decimal::new(1, 2) {
        6
    } else if value < Decimal::ONE {
        4
    } else {
        2
    }
}

/// Fixed-point rendering with [`quantity_precision`] decimal places.
pub fn format_quantity(value: Decimal) -> String {
    let dp = quantity_precision(value);
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.prec$}", prec = dp as usize)
}

/// Renders a price with thousands grouping and at most two fraction digits.
pub fn format_unit_price(price: Decimal) -> String {
    let rounded = price
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

/// "1 BTC = $65,000.12"
pub fn quote_line(instrument: &MarketInstrument, fiat: &FiatOption) -> String {
    format!(
        "1 {} = {}{}",
        instrument.symbol.to_uppercase(),
        fiat.symbol,
        format_unit_price(instrument.current_price)
    )
}
