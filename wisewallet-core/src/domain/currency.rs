//! Supported display currencies and amount formatting

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
}

pub const CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo { code: "USD", symbol: "$", name: "US Dollar" },
    CurrencyInfo { code: "EUR", symbol: "€", name: "Euro" },
    CurrencyInfo { code: "GBP", symbol: "£", name: "British Pound" },
    CurrencyInfo { code: "JPY", symbol: "¥", name: "Japanese Yen" },
    CurrencyInfo { code: "INR", symbol: "₹", name: "Indian Rupee" },
    CurrencyInfo { code: "CAD", symbol: "C$", name: "Canadian Dollar" },
    CurrencyInfo { code: "AUD", symbol: "A$", name: "Australian Dollar" },
    CurrencyInfo { code: "CNY", symbol: "¥", name: "Chinese Yuan" },
    CurrencyInfo { code: "BRL", symbol: "R$", name: "Brazilian Real" },
    CurrencyInfo { code: "MXN", symbol: "Mex$", name: "Mexican Peso" },
    CurrencyInfo { code: "KRW", symbol: "₩", name: "South Korean Won" },
    CurrencyInfo { code: "RUB", symbol: "₽", name: "Russian Ruble" },
    CurrencyInfo { code: "ZAR", symbol: "R", name: "South African Rand" },
    CurrencyInfo { code: "NGN", symbol: "₦", name: "Nigerian Naira" },
    CurrencyInfo { code: "XAF", symbol: "FCFA", name: "Central African CFA Franc" },
];

/// Look up a currency by ISO code (case-insensitive)
pub fn find_currency(code: &str) -> Option<&'static CurrencyInfo> {
    let code = normalize_currency(code);
    CURRENCIES.iter().find(|c| c.code == code)
}

/// Normalize currency code to uppercase
pub fn normalize_currency(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Format an amount for display: symbol, thousands separators, at most two
/// decimals with trailing zeros dropped. Unknown codes fall back to
/// `"<CODE> 12.34"`.
pub fn format_amount(amount: Decimal, currency_code: &str) -> String {
    let Some(info) = find_currency(currency_code) else {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        return format!("{} {:.2}", normalize_currency(currency_code), rounded);
    };

    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}{}.{}", sign, info.symbol, grouped, frac),
        None => format!("{}{}{}", sign, info.symbol, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_known_currency() {
        assert_eq!(format_amount(Decimal::new(123456, 1), "USD"), "$12,345.6");
        assert_eq!(format_amount(Decimal::new(50, 0), "eur"), "€50");
        assert_eq!(format_amount(Decimal::new(-1999, 2), "GBP"), "-£19.99");
        assert_eq!(format_amount(Decimal::new(1000000, 0), "INR"), "₹1,000,000");
    }

    #[test]
    fn test_format_unknown_currency_falls_back() {
        assert_eq!(format_amount(Decimal::new(5, 0), "XYZ"), "XYZ 5.00");
    }

    #[test]
    fn test_find_currency() {
        assert_eq!(find_currency(" usd ").map(|c| c.symbol), Some("$"));
        assert!(find_currency("ZZZ").is_none());
    }
}
