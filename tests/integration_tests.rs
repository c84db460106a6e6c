//! End-to-end scenarios over the public API, built against their own
//! fixtures rather than importing the crate's internal test helpers.

use chrono::NaiveDate;
use mer_rules_engine::config::ClientRulesConfig;
use mer_rules_engine::domain::{
    AccountBalance, BalanceSheetSnapshot, EvidenceBundle, EvidenceItem, ProfitAndLossSnapshot,
    ReconciliationSnapshot, RuleContext,
};
use mer_rules_engine::result::{RuleStatus, Severity};
use mer_rules_engine::rule::Rule;
use mer_rules_engine::rules::bank_reconciled::BankReconciledRule;
use mer_rules_engine::rules::clearing_zero::ClearingZeroRule;
use mer_rules_engine::rules::petty_cash::PettyCashRule;
use mer_rules_engine::rules::tax_filings::TaxFilingsRule;
use mer_rules_engine::rules::uncleared_items::UnclearedItemsRule;
use rust_decimal_macros::dec;

fn period_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
}

fn account(account_ref: &str, name: &str, balance: rust_decimal::Decimal, ty: &str) -> AccountBalance {
    AccountBalance {
        account_ref: account_ref.to_string(),
        name: name.to_string(),
        balance,
        r#type: Some(ty.to_string()),
        subtype: None,
    }
}

fn base_context(accounts: Vec<AccountBalance>) -> RuleContext {
    RuleContext {
        period_end: period_end(),
        balance_sheet: BalanceSheetSnapshot {
            as_of_date: period_end(),
            accounts,
        },
        prior_balance_sheet: None,
        profit_and_loss: None,
        evidence: EvidenceBundle::default(),
        reconciliations: Vec::new(),
        client_config: ClientRulesConfig::new(),
    }
}

#[test]
fn scenario_1_bank_reconciled_clean_pass() {
    let mut ctx = base_context(vec![account("acct::BANK1", "Operating Bank", dec!(1000.00), "Bank")]);
    ctx.reconciliations.push(ReconciliationSnapshot {
        account_ref: "acct::BANK1".to_string(),
        account_name: "Operating Bank".to_string(),
        statement_end_date: period_end(),
        statement_ending_balance: dec!(1000.00),
        book_balance_as_of_statement_end: dec!(1000.00),
        book_balance_as_of_period_end: Some(dec!(1000.00)),
        meta: serde_json::json!({}),
    });
    ctx.evidence.items.push(EvidenceItem {
        evidence_type: "statement_balance_attachment".to_string(),
        amount: Some(dec!(1000.00)),
        as_of_date: None,
        statement_end_date: Some(period_end()),
        uri: None,
        source: None,
        meta: serde_json::json!({"account_ref": "acct::BANK1"}),
    });

    let result = BankReconciledRule.evaluate(&ctx);
    assert_eq!(result.status, RuleStatus::Pass);
    assert_eq!(result.severity, Severity::Info);
}

#[test]
fn scenario_2_bank_reconciled_coverage_fail() {
    let mut ctx = base_context(vec![account("acct::BANK1", "Operating Bank", dec!(1000.00), "Bank")]);
    let stale_end = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
    ctx.reconciliations.push(ReconciliationSnapshot {
        account_ref: "acct::BANK1".to_string(),
        account_name: "Operating Bank".to_string(),
        statement_end_date: stale_end,
        statement_ending_balance: dec!(1000.00),
        book_balance_as_of_statement_end: dec!(1000.00),
        book_balance_as_of_period_end: Some(dec!(1000.00)),
        meta: serde_json::json!({}),
    });
    ctx.evidence.items.push(EvidenceItem {
        evidence_type: "statement_balance_attachment".to_string(),
        amount: Some(dec!(1000.00)),
        as_of_date: None,
        statement_end_date: Some(stale_end),
        uri: None,
        source: None,
        meta: serde_json::json!({"account_ref": "acct::BANK1"}),
    });

    let result = BankReconciledRule.evaluate(&ctx);
    assert_eq!(result.status, RuleStatus::Fail);
    assert_eq!(result.severity, Severity::High);
    let (_, fields) = &result.details[0];
    let coverage = fields.iter().find(|(k, _)| k == "coverage").expect("coverage sub-check present");
    assert_eq!(coverage.1, mer_rules_engine::result::DetailValue::Status(RuleStatus::Fail));
}

#[test]
fn scenario_3_clearing_tolerance_warn() {
    let mut ctx = base_context(vec![account("acct::CLR", "Shopify Clearing", dec!(5.00), "Other Current Asset")]);
    ctx.profit_and_loss = Some(ProfitAndLossSnapshot {
        period_start: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
        period_end: period_end(),
        totals: [("revenue".to_string(), dec!(100000.00))].into_iter().collect(),
    });
    ctx.client_config.rules.insert(
        ClearingZeroRule.rule_id().to_string(),
        serde_json::json!({"floor_amount": "0", "pct_of_revenue": "0.001"}),
    );

    let result = ClearingZeroRule.evaluate(&ctx);
    assert_eq!(result.status, RuleStatus::Warn);
    assert_eq!(result.severity, Severity::Low);
}

#[test]
fn scenario_4_petty_cash_mismatch_fail() {
    let mut ctx = base_context(vec![account("acct::PC", "Petty Cash", dec!(250.00), "Bank")]);
    ctx.client_config.rules.insert(
        PettyCashRule.rule_id().to_string(),
        serde_json::json!({"account_ref": "acct::PC"}),
    );
    ctx.evidence.items.push(EvidenceItem {
        evidence_type: "petty_cash_support".to_string(),
        amount: Some(dec!(200.00)),
        as_of_date: None,
        statement_end_date: None,
        uri: None,
        source: None,
        meta: serde_json::json!({}),
    });

    let result = PettyCashRule.evaluate(&ctx);
    assert_eq!(result.status, RuleStatus::Fail);
    assert_eq!(result.severity, Severity::High);
    let (_, fields) = &result.details[0];
    let difference = fields.iter().find(|(k, _)| k == "difference").expect("difference recorded");
    assert_eq!(difference.1, mer_rules_engine::result::DetailValue::Decimal(dec!(50.00)));
}

#[test]
fn scenario_5_tax_filings_delinquent_fail() {
    let mut ctx = base_context(Vec::new());
    let mut agencies = EvidenceItem {
        evidence_type: "tax_agencies".to_string(),
        amount: None,
        as_of_date: None,
        statement_end_date: None,
        uri: None,
        source: None,
        meta: serde_json::json!({}),
    };
    agencies.meta = serde_json::json!({"items": [
        {"id": "CRA-GST", "display_name": "CRA GST", "last_file_date": "2025-07-15", "tax_tracked_on_sales": true}
    ]});
    let mut returns = agencies.clone();
    returns.evidence_type = "tax_returns".to_string();
    returns.meta = serde_json::json!({"items": [
        {"agency_id": "CRA-GST", "start_date": "2025-01-01", "end_date": "2025-03-31", "file_date": "2025-04-15", "net_tax_amount_due": "500.00"},
        {"agency_id": "CRA-GST", "start_date": "2025-04-01", "end_date": "2025-06-30", "file_date": "2025-07-15", "net_tax_amount_due": "500.00"}
    ]});
    ctx.evidence.items.push(agencies);
    ctx.evidence.items.push(returns);

    let result = TaxFilingsRule.evaluate(&ctx);
    assert_eq!(result.status, RuleStatus::Fail);
    assert_eq!(result.severity, Severity::High);
}

#[test]
fn scenario_6_uncleared_items_old_warn() {
    let mut ctx = base_context(vec![account("acct::BANK1", "Operating Bank", dec!(1000.00), "Bank")]);
    let stale_end = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
    ctx.reconciliations.push(ReconciliationSnapshot {
        account_ref: "acct::BANK1".to_string(),
        account_name: "Operating Bank".to_string(),
        statement_end_date: stale_end,
        statement_ending_balance: dec!(1000.00),
        book_balance_as_of_statement_end: dec!(1000.00),
        book_balance_as_of_period_end: None,
        meta: serde_json::json!({
            "uncleared_items": {
                "as_at": [
                    {"txn_date": "2025-08-15", "description": "stale check", "amount": "10.00"},
                    {"txn_date": "2025-10-20", "description": "recent deposit", "amount": "20.00"}
                ]
            }
        }),
    });

    let result = UnclearedItemsRule.evaluate(&ctx);
    assert_eq!(result.status, RuleStatus::Warn);
    assert_eq!(result.severity, Severity::Low);
    assert_eq!(result.details.len(), 1, "only the one stale item should be flagged");
}
