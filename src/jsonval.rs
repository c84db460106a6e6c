//! Small helpers for reading typed fields out of the free-form
//! `serde_json::Value` meta blobs carried by evidence items and
//! reconciliation snapshots.

use crate::calendar::parse_lenient_date;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

pub fn get_str<'a>(v: &'a Value, key: &str) -> Option<&'a str> {
    v.get(key).and_then(Value::as_str)
}

pub fn get_bool(v: &Value, key: &str) -> Option<bool> {
    v.get(key).and_then(Value::as_bool)
}

pub fn get_i64(v: &Value, key: &str) -> Option<i64> {
    v.get(key).and_then(Value::as_i64)
}

/// Decimal fields may arrive as JSON strings (preferred, exact) or numbers.
pub fn get_decimal(v: &Value, key: &str) -> Option<Decimal> {
    match v.get(key) {
        Some(Value::String(s)) => s.parse::<Decimal>().ok(),
        Some(Value::Number(n)) => n
            .as_f64()
            .and_then(|f| Decimal::try_from(f).ok())
            .or_else(|| n.to_string().parse::<Decimal>().ok()),
        _ => None,
    }
}

pub fn get_date(v: &Value, key: &str) -> Option<NaiveDate> {
    get_str(v, key).and_then(parse_lenient_date)
}
