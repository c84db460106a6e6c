//! BS-BANK-RECONCILED-THROUGH-PERIOD-END.

use super::common::{accounts_by_category, accounts_by_refs, apply_include_exclude};
use crate::config::{ClientRulesConfig, CommonRuleConfig, MissingDataPolicy};
use crate::decimal::quantized_eq;
use crate::domain::{AccountBalance, ReconciliationSnapshot, RuleContext};
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-BANK-RECONCILED-THROUGH-PERIOD-END";
const RULE_TITLE: &str = "Bank and credit card accounts reconciled through period end";

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankReconciledConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default)]
    pub expected_accounts: Option<Vec<String>>,
    #[serde(default)]
    pub include_accounts: Option<Vec<String>>,
    #[serde(default)]
    pub exclude_accounts: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub require_statement_end_date_gte_period_end: bool,
    #[serde(default)]
    pub missing_data_policy: MissingDataPolicy,
}

const BANK_CATEGORIES: &[&str] = &["Bank", "Credit Card"];

pub struct BankReconciledRule;

impl Rule for BankReconciledRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "AICPA month-end close checklist: all cash/CC accounts reconciled before books are closed."
    }
    fn sources(&self) -> &'static [&'static str] {
        &["balance_sheet", "reconciliations", "statement_balance_attachment"]
    }
    fn config_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "enabled": {"type": "boolean", "default": true},
                "amount_quantize": {"type": ["string", "null"]},
                "expected_accounts": {"type": ["array", "null"], "items": {"type": "string"}},
                "include_accounts": {"type": ["array", "null"], "items": {"type": "string"}},
                "exclude_accounts": {"type": ["array", "null"], "items": {"type": "string"}},
                "require_statement_end_date_gte_period_end": {"type": "boolean", "default": true},
                "missing_data_policy": {"enum": ["needs_review", "not_applicable"], "default": "needs_review"}
            }
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

fn infer_scope<'a>(context: &'a RuleContext, cfg: &BankReconciledConfig) -> (Vec<&'a AccountBalance>, Option<(usize, usize)>) {
    match &cfg.expected_accounts {
        Some(refs) => {
            let explicit = accounts_by_refs(&context.balance_sheet, refs);
            let inferred_count = accounts_by_category(&context.balance_sheet, BANK_CATEGORIES).len();
            (
                apply_include_exclude(explicit, cfg.include_accounts.as_deref(), cfg.exclude_accounts.as_deref()),
                Some((refs.len(), inferred_count)),
            )
        }
        None => {
            let inferred = accounts_by_category(&context.balance_sheet, BANK_CATEGORIES);
            (
                apply_include_exclude(inferred, cfg.include_accounts.as_deref(), cfg.exclude_accounts.as_deref()),
                None,
            )
        }
    }
}

/// Whether any leaf account in the balance sheet carries `type`/`subtype`
/// classification at all — if none do, name-based inference is
/// impossible and the rule must not guess.
fn classification_available(context: &RuleContext) -> bool {
    context.balance_sheet.leaf_accounts().any(|a| a.r#type.is_some() || a.subtype.is_some())
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: BankReconciledConfig = match client_config.parse(RULE_ID) {
        Ok(cfg) => cfg,
        Err(e) => {
            return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
                .status(RuleStatus::NeedsReview)
                .summary(format!("configuration invalid: {e}"))
                .build()
        }
    };
    if !cfg.common.enabled {
        return RuleResult::not_applicable(RULE_ID, RULE_TITLE, "rule disabled by client configuration");
    }
    let quantize_inc = cfg.common.quantize_increment();

    if cfg.expected_accounts.is_none() && !classification_available(context) {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NeedsReview)
            .summary("no bank/credit-card accounts could be inferred: balance sheet rows carry no type/subtype classification")
            .human_action("Tag bank and credit-card accounts with a type/subtype, or configure expected_accounts explicitly.")
            .build()
    }

    let (scope, count_check) = infer_scope(context, &cfg);

    let mut builder = RuleResultBuilder::new(RULE_ID, RULE_TITLE);
    let mut overall = RuleStatus::Pass;
    let mut non_pass_count = 0usize;

    if let Some((expected_len, inferred_len)) = count_check {
        if expected_len != inferred_len {
            overall = overall.worst(RuleStatus::Fail);
            builder = builder.detail(
                "scope_count",
                vec![
                    ("check".into(), "scope_count".into()),
                    ("status".into(), RuleStatus::Fail.into()),
                    ("expected_accounts_count".into(), (expected_len as i64).into()),
                    ("inferred_accounts_count".into(), (inferred_len as i64).into()),
                ],
            );
        }
    }

    if scope.is_empty() {
        return builder
            .status(overall.worst(RuleStatus::NotApplicable))
            .summary("no bank/credit-card accounts in scope")
            .build();
    }

    for account in &scope {
        let (status, fields) = evaluate_account(context, account, &cfg, quantize_inc);
        if status != RuleStatus::Pass {
            non_pass_count += 1;
        }
        overall = overall.worst(status);
        builder = builder.detail(account.account_ref.clone(), fields);
    }

    let summary = match overall {
        RuleStatus::Pass => format!("{} account(s) reconciled through period end", scope.len()),
        _ => format!("{non_pass_count} of {} account(s) failed reconciliation checks", scope.len()),
    };

    builder.status(overall).summary(summary).build()
}

fn evaluate_account(
    context: &RuleContext,
    account: &AccountBalance,
    cfg: &BankReconciledConfig,
    quantize_inc: Option<rust_decimal::Decimal>,
) -> (RuleStatus, Vec<(String, crate::result::DetailValue)>) {
    let recon = match context.latest_reconciliation_for(&account.account_ref) {
        Some(r) => r,
        None => {
            let status = cfg.missing_data_policy.status();
            return (
                status,
                vec![
                    ("account_name".into(), account.name.clone().into()),
                    ("status".into(), status.into()),
                    ("reason".into(), "no reconciliation snapshot found".into()),
                ],
            );
        }
    };

    let mut fields = vec![
        ("account_name".into(), account.name.clone().into()),
        ("statement_end_date".into(), recon.statement_end_date.into()),
    ];

    let coverage_status = if cfg.require_statement_end_date_gte_period_end && recon.statement_end_date < context.period_end {
        RuleStatus::Fail
    } else {
        RuleStatus::Pass
    };
    fields.push(("coverage".into(), coverage_status.into()));

    let statement_tie_out = if quantized_eq(recon.book_balance_as_of_statement_end, recon.statement_ending_balance, quantize_inc) {
        RuleStatus::Pass
    } else {
        RuleStatus::Fail
    };
    fields.push(("statement_tie_out".into(), statement_tie_out.into()));
    fields.push(("statement_ending_balance".into(), recon.statement_ending_balance.into()));
    fields.push(("book_balance_as_of_statement_end".into(), recon.book_balance_as_of_statement_end.into()));

    let attachment_tie_out = match context.evidence.first_for_account("statement_balance_attachment", &account.account_ref) {
        None => cfg.missing_data_policy.status(),
        Some(evidence) => match evidence.amount {
            None => cfg.missing_data_policy.status(),
            Some(amount) => {
                let amount_ok = quantized_eq(amount, recon.statement_ending_balance, quantize_inc);
                let date_ok = evidence
                    .statement_end_date
                    .map_or(true, |d| d == recon.statement_end_date);
                if amount_ok && date_ok {
                    RuleStatus::Pass
                } else {
                    RuleStatus::Fail
                }
            }
        },
    };
    fields.push(("attachment_tie_out".into(), attachment_tie_out.into()));

    let period_end_tie_out = match recon.book_balance_as_of_period_end {
        None => cfg.missing_data_policy.status(),
        Some(book_balance) => {
            if quantized_eq(book_balance, account.balance, quantize_inc) {
                RuleStatus::Pass
            } else {
                RuleStatus::Fail
            }
        }
    };
    fields.push(("period_end_tie_out".into(), period_end_tie_out.into()));

    let status = RuleStatus::worst_of([coverage_status, statement_tie_out, attachment_tie_out, period_end_tie_out]);
    fields.push(("status".into(), status.into()));
    (status, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn clean_context() -> RuleContext {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account_typed("acct::BANK1", "Operating Bank", dec!(1000.00), "Bank"));
        ctx.reconciliations.push({
            let mut r = reconciliation("acct::BANK1", period_end(), dec!(1000.00), dec!(1000.00));
            r.book_balance_as_of_period_end = Some(dec!(1000.00));
            r
        });
        let mut ev = evidence("statement_balance_attachment", Some(dec!(1000.00)));
        ev.meta = serde_json::json!({"account_ref": "acct::BANK1"});
        ev.statement_end_date = Some(period_end());
        ctx.evidence.items.push(ev);
        ctx
    }

    #[test]
    fn clean_pass_scenario_1() {
        let ctx = clean_context();
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::Pass);
        assert_eq!(result.severity, crate::result::Severity::Info);
    }

    #[test]
    fn coverage_fail_scenario_2() {
        let mut ctx = clean_context();
        ctx.reconciliations[0].statement_end_date = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::Fail);
        assert_eq!(result.severity, crate::result::Severity::High);
        let (_, fields) = result.details.iter().find(|(k, _)| k == "acct::BANK1").unwrap();
        let coverage = fields.iter().find(|(k, _)| k == "coverage").unwrap();
        assert_eq!(coverage.1, crate::result::DetailValue::Status(RuleStatus::Fail));
    }

    #[test]
    fn disabled_is_not_applicable() {
        let mut ctx = clean_context();
        ctx.client_config.rules.insert(RULE_ID.to_string(), serde_json::json!({"enabled": false}));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::NotApplicable);
        assert!(result.details.is_empty());
    }

    #[test]
    fn missing_classification_without_expected_accounts_is_needs_review() {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::BANK1", "Operating Bank", dec!(1000.00)));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::NeedsReview);
    }

    #[test]
    fn scope_count_mismatch_fails() {
        let mut ctx = clean_context();
        ctx.client_config.rules.insert(
            RULE_ID.to_string(),
            serde_json::json!({"expected_accounts": ["acct::BANK1", "acct::BANK2"]}),
        );
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::Fail);
    }
}
