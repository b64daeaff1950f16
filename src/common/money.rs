// src/common/money.rs

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

pub const PESO_SIGN: char = '₱';

/// Converte texto livre em valor monetário. Entrada inválida vira zero, nunca erro.
///
/// Lê o maior prefixo numérico (sinal, dígitos, um ponto decimal), ignorando o
/// símbolo do peso e espaços iniciais: `"1500.50abc"` vale 1500.50 e `"abc"` vale 0.
pub fn parse_amount(raw: &str) -> Decimal {
    let trimmed = raw.trim().trim_start_matches(PESO_SIGN).trim_start();

    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '-' | '+' if idx == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + ch.len_utf8();
    }

    if !seen_digit {
        return Decimal::ZERO;
    }

    let numeric = trimmed[..end].trim_end_matches('.');
    Decimal::from_str(numeric).unwrap_or(Decimal::ZERO)
}

/// Formata com o símbolo do peso e separador de milhar: `₱15,000`, `₱1,234.5`.
pub fn format_peso(amount: Decimal) -> String {
    format!("{}{}", PESO_SIGN, group_thousands(amount))
}

fn group_thousands(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text.clone(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    #[test]
    fn parses_like_a_form_field() {
        assert_eq!(parse_amount("5000"), Decimal::from(5000));
        assert_eq!(parse_amount(" 1500.50 "), Decimal::from_str("1500.50").unwrap());
        assert_eq!(parse_amount("₱250"), Decimal::from(250));
        assert_eq!(parse_amount("12abc"), Decimal::from(12));
        assert_eq!(parse_amount("-40"), Decimal::from(-40));
    }

    #[test]
    fn invalid_amounts_fall_back_to_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("."), Decimal::ZERO);
        assert_eq!(parse_amount("-"), Decimal::ZERO);
    }

    #[test]
    fn formats_with_peso_sign_and_separators() {
        assert_eq!(format_peso(Decimal::from(15000)), "₱15,000");
        assert_eq!(format_peso(Decimal::from(500)), "₱500");
        assert_eq!(format_peso(Decimal::from(1234567)), "₱1,234,567");
        assert_eq!(format_peso(Decimal::from_f64(1234.5).unwrap()), "₱1,234.5");
        assert_eq!(format_peso(Decimal::from_str("8200.00").unwrap()), "₱8,200");
        assert_eq!(format_peso(Decimal::from(-500)), "₱-500");
    }
}
