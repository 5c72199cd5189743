//! Supported fiat currencies

use std::fmt::Display;

/// A fiat currency the converter can price instruments in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiatOption {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
    pub display_glyph: &'static str,
}

/// The supported currencies. The first entry is the default selection.
pub const FIAT_OPTIONS: [FiatOption; 8] = [
    FiatOption {
        code: "USD",
        name: "US Dollar",
        symbol: "$",
        display_glyph: "🇺🇸",
    },
    FiatOption {
        code: "SGD",
        name: "Singapore Dollar",
        symbol: "S$",
        display_glyph: "🇸🇬",
    },
    FiatOption {
        code: "VND",
        name: "Vietnamese Dong",
        symbol: "₫",
        display_glyph: "🇻🇳",
    },
    FiatOption {
        code: "THB",
        name: "Thai Baht",
        symbol: "฿",
        display_glyph: "🇹🇭",
    },
    FiatOption {
        code: "IDR",
        name: "Indonesian Rupiah",
        symbol: "Rp",
        display_glyph: "🇮🇩",
    },
    FiatOption {
        code: "MYR",
        name: "Malaysian Ringgit",
        symbol: "RM",
        display_glyph: "🇲🇾",
    },
    FiatOption {
        code: "CNY",
        name: "Chinese Yuan",
        symbol: "¥",
        display_glyph: "🇨🇳",
    },
    FiatOption {
        code: "EUR",
        name: "Euro",
        symbol: "€",
        display_glyph: "🇪🇺",
    },
];

impl FiatOption {
    pub fn all() -> &'static [FiatOption] {
        &FIAT_OPTIONS
    }

    pub fn default_option() -> &'static FiatOption {
        &FIAT_OPTIONS[0]
    }

    /// Case-insensitive lookup by ISO code.
    pub fn find(code: &str) -> Option<&'static FiatOption> {
        let code = code.trim();
        FIAT_OPTIONS
            .iter()
            .find(|f| f.code.eq_ignore_ascii_case(code))
    }

    /// Code as sent to the market data API.
    pub fn request_code(&self) -> String {
        self.code.to_lowercase()
    }
}

impl Display for FiatOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.display_glyph, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_is_usd() {
        assert_eq!(FiatOption::default_option().code, "USD");
        assert_eq!(FiatOption::all().len(), 8);
    }

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<_> = FiatOption::all().iter().map(|f| f.code).collect();
        assert_eq!(codes.len(), FiatOption::all().len());
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let eur = FiatOption::find("eur").expect("EUR should be supported");
        assert_eq!(eur.symbol, "€");
        assert_eq!(FiatOption::find(" Sgd ").map(|f| f.code), Some("SGD"));
        assert!(FiatOption::find("GBP").is_none());
    }

    #[test]
    fn test_request_code_is_lowercase() {
        assert_eq!(FiatOption::find("MYR").unwrap().request_code(), "myr");
    }
}
