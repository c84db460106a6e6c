//! The immutable input envelope every rule evaluates against.

use super::{BalanceSheetSnapshot, EvidenceBundle, ProfitAndLossSnapshot, ReconciliationSnapshot};
use crate::config::ClientRulesConfig;
use chrono::NaiveDate;

/// Everything a rule needs to produce a `RuleResult`. Immutable for the
/// duration of a run; rules read but never mutate it.
#[derive(Debug, Clone)]
pub struct RuleContext {
    pub period_end: NaiveDate,
    pub balance_sheet: BalanceSheetSnapshot,
    pub prior_balance_sheet: Option<BalanceSheetSnapshot>,
    pub profit_and_loss: Option<ProfitAndLossSnapshot>,
    pub evidence: EvidenceBundle,
    pub reconciliations: Vec<ReconciliationSnapshot>,
    pub client_config: ClientRulesConfig,
}

impl RuleContext {
    /// Latest reconciliation snapshot for `account_ref`, by
    /// `statement_end_date`.
    pub fn latest_reconciliation_for(&self, account_ref: &str) -> Option<&ReconciliationSnapshot> {
        self.reconciliations
            .iter()
            .filter(|r| r.account_ref == account_ref)
            .max_by_key(|r| r.statement_end_date)
    }
}
