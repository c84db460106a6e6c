//! Canonical bank/credit-card reconciliation snapshot.

use crate::calendar::parse_lenient_date;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationSnapshot {
    pub account_ref: String,
    pub account_name: String,
    pub statement_end_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub statement_ending_balance: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub book_balance_as_of_statement_end: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub book_balance_as_of_period_end: Option<Decimal>,
    #[serde(default = "default_meta")]
    pub meta: Value,
}

fn default_meta() -> Value {
    Value::Object(Default::default())
}

/// A single uncleared register item, in either accepted shape.
#[derive(Debug, Clone, PartialEq)]
pub struct UnclearedItem {
    /// Parsed transaction date, or `None` if absent/unparseable.
    pub txn_date: Option<NaiveDate>,
    /// Raw date string as supplied, kept for diagnostics when unparseable.
    pub raw_txn_date: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub item_type: Option<String>,
    pub reference: Option<String>,
}

impl UnclearedItem {
    fn from_json(v: &Value) -> Self {
        let raw_txn_date = v.get("txn_date").and_then(Value::as_str).map(str::to_owned);
        let txn_date = raw_txn_date.as_deref().and_then(parse_lenient_date);
        let amount = v
            .get("amount")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<Decimal>().ok())
            .or_else(|| v.get("amount").and_then(Value::as_f64).and_then(|f| Decimal::try_from(f).ok()));
        Self {
            txn_date,
            raw_txn_date,
            description: v.get("description").and_then(Value::as_str).map(str::to_owned),
            amount,
            item_type: v.get("type").and_then(Value::as_str).map(str::to_owned),
            reference: v.get("reference").and_then(Value::as_str).map(str::to_owned),
        }
    }
}

impl ReconciliationSnapshot {
    /// "As at" uncleared items, from either the nested canonical shape
    /// (`meta.uncleared_items.as_at`) or the flat adapter-convenience key
    /// (`meta.uncleared_items_as_at`). The "after date" section is
    /// intentionally never read.
    pub fn uncleared_items_as_at(&self) -> Vec<UnclearedItem> {
        let nested = self
            .meta
            .get("uncleared_items")
            .and_then(|u| u.get("as_at"))
            .and_then(Value::as_array);
        let flat = self.meta.get("uncleared_items_as_at").and_then(Value::as_array);
        nested
            .or(flat)
            .map(|arr| arr.iter().map(UnclearedItem::from_json).collect())
            .unwrap_or_default()
    }
}
