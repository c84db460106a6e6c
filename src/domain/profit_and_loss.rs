//! Canonical profit-and-loss snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitAndLossSnapshot {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(default)]
    pub totals: HashMap<String, Decimal>,
}

impl ProfitAndLossSnapshot {
    /// The only total the core reads by name.
    pub fn revenue(&self) -> Option<Decimal> {
        self.totals.get("revenue").copied()
    }
}
