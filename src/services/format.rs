use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::services::dataset::{Dataset, DatasetKind, Value};

// Same characters the legacy dashboard stripped before re-parsing a
// formatted amount.
static CURRENCY_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[R$\s,]").expect("currency strip pattern"));

/// Fixed "R$ #,##0.00" rendering, independent of the system locale.
pub fn format_currency(value: f64) -> String {
    format!("R$ {}", format_with_commas(value))
}

fn format_with_commas(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, dec_part)
}

/// Exact left inverse of `format_currency` for everything it can produce.
/// `None` only for input the forward direction never emits. The summary
/// metric sums the numeric column directly and never goes through here.
#[allow(dead_code)]
pub fn parse_currency(text: &str) -> Option<f64> {
    CURRENCY_NOISE.replace_all(text, "").parse::<f64>().ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn display_value(kind: DatasetKind, column: &str, value: &Value) -> String {
    match value {
        Value::Number(n) if kind.currency_columns().contains(&column) => format_currency(*n),
        Value::Date(d) => format_date(*d),
        other => other.as_text(),
    }
}

/// Renders a page of rows into display strings, column by column.
pub fn display_rows(kind: DatasetKind, dataset: &Dataset, rows: &[Vec<Value>]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            dataset
                .columns
                .iter()
                .zip(row.iter())
                .map(|(column, value)| display_value(kind, column, value))
                .collect()
        })
        .collect()
}
