//! BRL amount formatting and lenient amount parsing.
//!
//! Model replies and user input mix Brazilian (`1.234,56`) and English
//! (`1,234.56`) separators, sometimes with an `R$` prefix or a stray
//! trailing point. [`normalize_amount`] collapses all of these into a plain
//! decimal-point literal before conversion.
//!
//! # Separator rule
//!
//! - Both `.` and `,` present: whichever occurs last is the decimal mark.
//! - Only `,`: a single comma followed by one or two digits is a decimal
//!   comma (`6000,50`); otherwise commas group thousands (`1,234,567`).
//! - Only `.`: several dots group thousands (`1.234.567`), and so does a
//!   single dot followed by exactly three digits (`4.500`); any other single
//!   dot is the decimal point.
//! - A trailing `.` is dropped (`9000.` reads as `9000`).

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::AmountError;

/// Normalise an amount string into a decimal-point numeric literal.
///
/// Does not validate that the result is a number; see [`parse_amount`].
pub fn normalize_amount(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('*').trim();
    let without_currency = trimmed.strip_prefix("R$").unwrap_or(trimmed);
    let mut compact: String = without_currency
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if compact.ends_with('.') {
        compact.pop();
    }

    resolve_separators(&compact)
}

/// Normalise and convert an amount string.
pub fn parse_amount(raw: &str) -> Result<Decimal, AmountError> {
    let literal = normalize_amount(raw);
    if literal.is_empty() {
        return Err(AmountError::Empty);
    }
    Decimal::from_str(&literal).map_err(|_| AmountError::Invalid(raw.trim().to_string()))
}

/// Format an amount as a plain two-decimal literal: `4000.00`.
///
/// This is the shape the model is asked to answer in.
pub fn format_plain(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Format an amount the Brazilian way: `R$ 1.234,56`.
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*d as char);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("R$ {sign}{grouped},{frac_part}")
}

fn resolve_separators(s: &str) -> String {
    match (s.rfind('.'), s.rfind(',')) {
        (Some(dot), Some(comma)) => {
            if comma > dot {
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        (None, Some(comma)) => {
            let decimals = &s[comma + 1..];
            let single = s.matches(',').count() == 1;
            if single
                && (1..=2).contains(&decimals.len())
                && decimals.bytes().all(|b| b.is_ascii_digit())
            {
                s.replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        (Some(dot), None) => {
            let decimals = &s[dot + 1..];
            let single = s.matches('.').count() == 1;
            if single && decimals.len() != 3 {
                s.to_string()
            } else {
                s.replace('.', "")
            }
        }
        (None, None) => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn plain_decimal_point() {
        assert_eq!(parse_amount("4000.00"), Ok(dec("4000.00")));
        assert_eq!(parse_amount("  12.5 "), Ok(dec("12.5")));
    }

    #[test]
    fn trailing_point_dropped() {
        assert_eq!(normalize_amount("9000."), "9000");
        assert_eq!(parse_amount("9000."), Ok(dec("9000")));
    }

    #[test]
    fn decimal_comma() {
        assert_eq!(parse_amount("6000,50"), Ok(dec("6000.50")));
        assert_eq!(parse_amount("6000,5"), Ok(dec("6000.5")));
    }

    #[test]
    fn thousands_commas_stripped() {
        assert_eq!(parse_amount("1,234"), Ok(dec("1234")));
        assert_eq!(parse_amount("1,234,567"), Ok(dec("1234567")));
        assert_eq!(parse_amount("12,500.75"), Ok(dec("12500.75")));
    }

    #[test]
    fn brazilian_grouping() {
        assert_eq!(parse_amount("1.234.567"), Ok(dec("1234567")));
        assert_eq!(parse_amount("R$ 12.500,75"), Ok(dec("12500.75")));
    }

    #[test]
    fn single_dot_with_three_digits_groups_thousands() {
        assert_eq!(parse_amount("4.500"), Ok(dec("4500")));
        assert_eq!(parse_amount("R$ 12.000"), Ok(dec("12000")));
        assert_eq!(parse_amount("4.5"), Ok(dec("4.5")));
        assert_eq!(parse_amount("4.50"), Ok(dec("4.50")));
        assert_eq!(parse_amount("4.5000"), Ok(dec("4.5000")));
    }

    #[test]
    fn plain_format() {
        assert_eq!(format_plain(dec("4000")), "4000.00");
        assert_eq!(format_plain(dec("5500.505")), "5500.50");
        assert_eq!(parse_amount(&format_plain(dec("1234.5"))), Ok(dec("1234.50")));
    }

    #[test]
    fn currency_prefix_and_markdown_stripped() {
        assert_eq!(parse_amount("**R$ 4.000,00**"), Ok(dec("4000")));
        assert_eq!(parse_amount("R$4000"), Ok(dec("4000")));
    }

    #[test]
    fn empty_and_garbage() {
        assert_eq!(parse_amount(""), Err(AmountError::Empty));
        assert_eq!(parse_amount("  R$ "), Err(AmountError::Empty));
        assert_eq!(parse_amount("abc"), Err(AmountError::Invalid("abc".into())));
        assert!(parse_amount("4000 a 5000").is_err());
    }

    #[test]
    fn format_groups_thousands() {
        assert_eq!(format_brl(dec("0")), "R$ 0,00");
        assert_eq!(format_brl(dec("999.9")), "R$ 999,90");
        assert_eq!(format_brl(dec("1000")), "R$ 1.000,00");
        assert_eq!(format_brl(dec("1234567.891")), "R$ 1.234.567,89");
        assert_eq!(format_brl(dec("-2500.5")), "R$ -2.500,50");
    }

    #[test]
    fn format_then_parse_recovers_value() {
        for s in [
            "0.01", "1", "99.99", "100", "1000", "4000.00", "6000.50", "12345.67",
            "1000000", "987654321.12", "-2500.50",
        ] {
            let value = dec(s);
            let formatted = format_brl(value);
            assert_eq!(parse_amount(&formatted), Ok(value), "via {formatted}");
        }
    }
}
