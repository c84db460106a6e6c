//! Fixture builders shared by this crate's internal unit tests only.
//! External integration tests (`tests/integration_tests.rs`) build their
//! own fixtures directly against the public API instead of importing
//! these helpers.

use crate::config::ClientRulesConfig;
use crate::domain::{
    AccountBalance, BalanceSheetSnapshot, EvidenceBundle, EvidenceItem, ProfitAndLossSnapshot,
    ReconciliationSnapshot, RuleContext,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;

pub fn period_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
}

pub fn account(account_ref: &str, name: &str, balance: Decimal) -> AccountBalance {
    AccountBalance {
        account_ref: account_ref.to_string(),
        name: name.to_string(),
        balance,
        r#type: None,
        subtype: None,
    }
}

pub fn account_typed(account_ref: &str, name: &str, balance: Decimal, ty: &str) -> AccountBalance {
    let mut a = account(account_ref, name, balance);
    a.r#type = Some(ty.to_string());
    a
}

/// An essentially empty, valid context: no accounts, no evidence, no
/// reconciliations, default config for every rule. Every rule should
/// either PASS or return NOT_APPLICABLE/NEEDS_REVIEW on this without
/// panicking.
pub fn minimal_context() -> RuleContext {
    RuleContext {
        period_end: period_end(),
        balance_sheet: BalanceSheetSnapshot {
            as_of_date: period_end(),
            accounts: Vec::new(),
        },
        prior_balance_sheet: None,
        profit_and_loss: None,
        evidence: EvidenceBundle::default(),
        reconciliations: Vec::new(),
        client_config: ClientRulesConfig::new(),
    }
}

pub fn evidence(evidence_type: &str, amount: Option<Decimal>) -> EvidenceItem {
    EvidenceItem {
        evidence_type: evidence_type.to_string(),
        amount,
        as_of_date: None,
        statement_end_date: None,
        uri: None,
        source: None,
        meta: json!({}),
    }
}

pub fn reconciliation(
    account_ref: &str,
    statement_end_date: NaiveDate,
    statement_ending_balance: Decimal,
    book_balance_as_of_statement_end: Decimal,
) -> ReconciliationSnapshot {
    ReconciliationSnapshot {
        account_ref: account_ref.to_string(),
        account_name: account_ref.to_string(),
        statement_end_date,
        statement_ending_balance,
        book_balance_as_of_statement_end,
        book_balance_as_of_period_end: None,
        meta: json!({}),
    }
}

pub fn pnl_with_revenue(revenue: Decimal) -> ProfitAndLossSnapshot {
    let mut totals = std::collections::HashMap::new();
    totals.insert("revenue".to_string(), revenue);
    ProfitAndLossSnapshot {
        period_start: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
        period_end: period_end(),
        totals,
    }
}
