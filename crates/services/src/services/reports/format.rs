//! Display formatting for rendered reports: pt-BR money, dates, CNPJ and
//! HTML escaping. Aggregation never depends on any of this.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::aggregate::money;

/// Placeholder for absent values in rendered output.
pub const EMPTY: &str = "—";

/// HTML-escapes, rendering `None`/empty as the placeholder dash.
pub fn escape_html(text: Option<&str>) -> String {
    match text.filter(|t| !t.is_empty()) {
        None => EMPTY.to_string(),
        Some(t) => t
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#039;"),
    }
}

/// `1234567.8` → `1.234.567,80` (pt-BR separators, two fraction digits).
pub fn format_brl(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    let digits = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{frac_part}")
}

/// `R$`-prefixed money, dash when absent.
pub fn format_money(value: Option<f64>) -> String {
    match value {
        None => EMPTY.to_string(),
        Some(v) => format!("R$ {}", format_brl(money(Some(v)))),
    }
}

pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn format_opt_date(date: Option<NaiveDate>) -> String {
    match date {
        None => EMPTY.to_string(),
        Some(d) => d.format("%d/%m/%Y").to_string(),
    }
}

pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%H:%M").to_string()
}

pub fn format_opt_time(at: Option<DateTime<Utc>>) -> String {
    at.map(format_time).unwrap_or_else(|| EMPTY.to_string())
}

/// Duration in hours with pt-BR decimals, e.g. `2,50h`.
pub fn format_hours(hours: Option<f64>) -> String {
    match hours.and_then(Decimal::from_f64_retain) {
        None => EMPTY.to_string(),
        Some(h) => format!("{}h", format_brl(h)),
    }
}

/// Formats a 14-digit CNPJ as `XX.XXX.XXX/XXXX-XX`; anything else is
/// returned untouched.
pub fn format_cnpj(tax_id: &str) -> String {
    let digits: String = tax_id.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 14 {
        return tax_id.to_string();
    }
    format!(
        "{}.{}.{}/{}-{}",
        &digits[0..2],
        &digits[2..5],
        &digits[5..8],
        &digits[8..12],
        &digits[12..14]
    )
}

/// Canonical status strings read better with spaces in rendered output.
pub fn display_status(raw: &str) -> String {
    raw.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn brl_groups_thousands_and_keeps_two_digits() {
        assert_eq!(format_brl(dec("0")), "0,00");
        assert_eq!(format_brl(dec("1234.5")), "1.234,50");
        assert_eq!(format_brl(dec("1234567.891")), "1.234.567,89");
        assert_eq!(format_brl(dec("-42.1")), "-42,10");
    }

    #[test]
    fn money_renders_dash_for_absent_values() {
        assert_eq!(format_money(None), "—");
        assert_eq!(format_money(Some(1500.0)), "R$ 1.500,00");
    }

    #[test]
    fn cnpj_formats_only_full_numbers() {
        assert_eq!(format_cnpj("12345678000199"), "12.345.678/0001-99");
        assert_eq!(format_cnpj("12.345.678/0001-99"), "12.345.678/0001-99");
        assert_eq!(format_cnpj("123"), "123");
    }

    #[test]
    fn html_escaping_covers_the_usual_suspects() {
        assert_eq!(escape_html(None), "—");
        assert_eq!(escape_html(Some("")), "—");
        assert_eq!(
            escape_html(Some("<b>\"A&B\"</b>")),
            "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn status_display_swaps_underscores() {
        assert_eq!(display_status("Aprovação_Cliente"), "Aprovação Cliente");
    }
}
