//! Canonical balance-sheet snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Prefix marking a "report totals" row (an aggregate line, never a leaf
/// account).
pub const REPORT_ROW_PREFIX: &str = "report::";

/// A single account row on a balance-sheet snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_ref: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
}

impl AccountBalance {
    /// A "report totals" aggregate row, never matched as a leaf account.
    pub fn is_report_row(&self) -> bool {
        self.account_ref.starts_with(REPORT_ROW_PREFIX)
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_report_row()
    }

    /// Case-insensitive substring match against the display name.
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Balance-sheet snapshot as of a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheetSnapshot {
    pub as_of_date: NaiveDate,
    pub accounts: Vec<AccountBalance>,
}

impl BalanceSheetSnapshot {
    pub fn leaf_accounts(&self) -> impl Iterator<Item = &AccountBalance> {
        self.accounts.iter().filter(|a| a.is_leaf())
    }

    pub fn report_rows(&self) -> impl Iterator<Item = &AccountBalance> {
        self.accounts.iter().filter(|a| a.is_report_row())
    }

    /// Find a leaf or report row by its exact `account_ref`.
    pub fn find_by_ref(&self, account_ref: &str) -> Option<&AccountBalance> {
        self.accounts.iter().find(|a| a.account_ref == account_ref)
    }

    /// Find a `report::` row whose name exactly matches `name` (used for
    /// subtotal lookups like "Total Accounts Payable").
    pub fn find_report_row_by_name(&self, name: &str) -> Option<&AccountBalance> {
        self.report_rows().find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Case-insensitive substring match on leaf account names.
    pub fn find_leaf_by_name_contains(&self, needle: &str) -> Vec<&AccountBalance> {
        self.leaf_accounts().filter(|a| a.name_contains(needle)).collect()
    }
}
