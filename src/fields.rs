//! Attribute derivations applied to every source record.
//!
//! Block codes look like `LBC-L3A-L` (bank code, lateral, side) and WUA
//! codes carry the association identifier as their last dash-separated
//! segment.

use crate::constants::LEFT_BANK_CODE;
use crate::models::Bank;
use shapefile::dbase::FieldValue;

/// Split a block code into its lateral and bank
///
/// Codes that do not split into exactly three parts yield `(None, None)`.
/// Any bank code other than `LBC` maps to the right bank.
pub fn split_block_code(code: &str) -> (Option<String>, Option<Bank>) {
    let parts: Vec<&str> = code.split('-').collect();
    if parts.len() != 3 {
        return (None, None);
    }

    let bank = if parts[0].eq_ignore_ascii_case(LEFT_BANK_CODE) {
        Bank::Left
    } else {
        Bank::Right
    };

    (Some(parts[1].to_string()), Some(bank))
}

/// Last dash-separated segment of a WUA code
pub fn normalize_wua(value: &str) -> String {
    value.rsplit('-').next().unwrap_or_default().to_string()
}

/// Render a dBASE value the way a dynamically typed `str()` would
///
/// Missing text and logical values render as `None`, missing numbers as
/// `nan`, and float values always keep a fractional part (`12.0`).
pub fn stringify_field(value: &FieldValue) -> String {
    match value {
        FieldValue::Numeric(None) | FieldValue::Float(None) => "nan".to_string(),
        FieldValue::Logical(Some(true)) => "True".to_string(),
        FieldValue::Logical(Some(false)) => "False".to_string(),
        other => field_to_string(other).unwrap_or_else(|| "None".to_string()),
    }
}

/// Render a dBASE value as text, keeping nulls as `None`
pub fn field_to_string(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Character(text) => text.clone(),
        FieldValue::Memo(text) => Some(text.clone()),
        FieldValue::Numeric(number) => number.map(format_float),
        FieldValue::Float(number) => number.map(|n| format_float(f64::from(n))),
        FieldValue::Double(number) => Some(format_float(*number)),
        FieldValue::Currency(number) => Some(format_float(*number)),
        FieldValue::Integer(number) => Some(number.to_string()),
        FieldValue::Logical(flag) => flag.map(|b| if b { "True" } else { "False" }.to_string()),
        FieldValue::Date(date) => date
            .as_ref()
            .map(|d| format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day())),
        _ => None,
    }
}

/// Read a dBASE value as a float
///
/// Character values are parsed when they hold a number.
pub fn field_to_f64(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Numeric(number) => *number,
        FieldValue::Float(number) => number.map(f64::from),
        FieldValue::Double(number) => Some(*number),
        FieldValue::Currency(number) => Some(*number),
        FieldValue::Integer(number) => Some(f64::from(*number)),
        FieldValue::Character(Some(text)) => text.trim().parse().ok(),
        _ => None,
    }
}

fn format_float(number: f64) -> String {
    if number.is_nan() {
        "nan".to_string()
    } else if number.is_finite() && number.fract() == 0.0 {
        format!("{number:.1}")
    } else {
        number.to_string()
    }
}
