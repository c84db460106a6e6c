//! Canonical evidence manifest entries.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single evidence manifest entry. `meta` is free-form — its shape
/// depends on `evidence_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub evidence_type: String,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub as_of_date: Option<NaiveDate>,
    #[serde(default)]
    pub statement_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default = "default_meta")]
    pub meta: Value,
}

fn default_meta() -> Value {
    Value::Object(Default::default())
}

impl EvidenceItem {
    pub fn as_of_matches(&self, period_end: NaiveDate) -> bool {
        self.as_of_date == Some(period_end)
    }

    /// Read `meta.<key>` as a string.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.get(key).and_then(Value::as_str)
    }

    /// Read `meta.items` as a slice, if present and an array.
    pub fn meta_items(&self) -> &[Value] {
        self.meta
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Unordered collection of evidence items, looked up by `evidence_type`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub items: Vec<EvidenceItem>,
}

impl EvidenceBundle {
    /// First item with a matching `evidence_type`.
    pub fn first_of_type(&self, evidence_type: &str) -> Option<&EvidenceItem> {
        self.items.iter().find(|i| i.evidence_type == evidence_type)
    }

    /// All items with a matching `evidence_type`.
    pub fn all_of_type<'a>(&'a self, evidence_type: &'a str) -> impl Iterator<Item = &'a EvidenceItem> {
        self.items.iter().filter(move |i| i.evidence_type == evidence_type)
    }

    /// First item of `evidence_type` whose `meta.account_ref` matches.
    pub fn first_for_account(&self, evidence_type: &str, account_ref: &str) -> Option<&EvidenceItem> {
        self.all_of_type(evidence_type)
            .find(|i| i.meta_str("account_ref") == Some(account_ref))
    }
}
