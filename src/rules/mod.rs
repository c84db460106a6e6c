//! The built-in catalog of MER rules. Each submodule is
//! one independent, self-contained rule; [`common`] holds mechanisms
//! shared by two or more of them.

pub mod common;

pub mod ap_ar_aged_items;
pub mod ap_ar_negative_items;
pub mod ap_ar_year_end_adjustments;
pub mod ap_subledger;
pub mod ar_subledger;
pub mod balance_unchanged;
pub mod bank_reconciled;
pub mod clearing_non_sales;
pub mod clearing_zero;
pub mod intercompany_balances;
pub mod intercompany_shareholder_paid;
pub mod investment_balance;
pub mod loan_balance;
pub mod petty_cash;
pub mod plooto_clearing;
pub mod plooto_instant_disclosure;
pub mod tax_filings;
pub mod tax_payable_suspense;
pub mod uncleared_items;
pub mod undeposited_funds;
pub mod working_paper;

use crate::registry::RuleRegistry;

/// Build a fresh registry with every built-in rule, in catalog order.
/// Infallible: none of these ids collide.
pub fn register_builtin_rules() -> RuleRegistry {
    let mut registry = RuleRegistry::new();
    let rules: Vec<Box<dyn crate::rule::Rule>> = vec![
        Box::new(bank_reconciled::BankReconciledRule),
        Box::new(uncleared_items::UnclearedItemsRule),
        Box::new(undeposited_funds::UndepositedFundsRule),
        Box::new(clearing_zero::ClearingZeroRule),
        Box::new(clearing_non_sales::ClearingNonSalesRule),
        Box::new(plooto_clearing::PlootoClearingRule),
        Box::new(plooto_instant_disclosure::PlootoInstantDisclosureRule),
        Box::new(petty_cash::PettyCashRule),
        Box::new(ap_subledger::ApSubledgerRule),
        Box::new(ar_subledger::ArSubledgerRule),
        Box::new(ap_ar_aged_items::ApArAgedItemsRule),
        Box::new(ap_ar_negative_items::ApArNegativeItemsRule),
        Box::new(intercompany_shareholder_paid::IntercompanyShareholderPaidRule),
        Box::new(ap_ar_year_end_adjustments::ApArYearEndAdjustmentsRule),
        Box::new(intercompany_balances::IntercompanyBalancesRule),
        Box::new(loan_balance::LoanBalanceRule),
        Box::new(investment_balance::InvestmentBalanceRule),
        Box::new(working_paper::WorkingPaperRule),
        Box::new(tax_filings::TaxFilingsRule),
        Box::new(tax_payable_suspense::TaxPayableSuspenseRule),
        Box::new(balance_unchanged::BalanceUnchangedRule),
    ];
    for rule in rules {
        registry.register(rule).expect("built-in rule ids never collide");
    }
    registry
}
