//! Amount field input filtering

/// True when `text` is empty or an unsigned decimal: digits with at most one
/// decimal point anywhere.
pub fn is_valid_amount_text(text: &str) -> bool {
    let mut seen_point = false;
    for c in text.chars() {
        match c {
            '0'..='9' => {}
            '.' if !seen_point => seen_point = true,
            _ => return false,
        }
    }
    true
}

/// Returns the text the amount field should hold after an edit: the new text
/// when it is acceptable, otherwise the previous text unchanged.
pub fn filter_amount_input<'a>(previous: &'a str, raw: &'a str) -> &'a str {
    if is_valid_amount_text(raw) {
        raw
    } else {
        previous
    }
}
