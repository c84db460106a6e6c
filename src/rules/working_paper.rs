//! BS-WORKING-PAPER-RECONCILES.

use super::common::name_matches_any_pattern;
use crate::config::{ClientRulesConfig, CommonRuleConfig, MissingDataPolicy};
use crate::domain::RuleContext;
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-WORKING-PAPER-RECONCILES";
const RULE_TITLE: &str = "Balance-sheet line reconciles to its supporting working paper";

fn default_name_patterns() -> Vec<String> {
    ["prepaid", "deferred revenue", "accrual"].iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkingPaperConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default = "default_name_patterns")]
    pub name_patterns: Vec<String>,
    #[serde(default)]
    pub missing_data_policy: MissingDataPolicy,
}

impl Default for WorkingPaperConfig {
    fn default() -> Self {
        Self {
            common: CommonRuleConfig::default(),
            name_patterns: default_name_patterns(),
            missing_data_policy: MissingDataPolicy::default(),
        }
    }
}

pub struct WorkingPaperRule;

impl Rule for WorkingPaperRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "Prepaid, deferred-revenue, and accrual balances must tie to their supporting amortization schedule."
    }
    fn sources(&self) -> &'static [&'static str] {
        &["balance_sheet", "working_paper_balance"]
    }
    fn config_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "enabled": {"type": "boolean", "default": true},
                "amount_quantize": {"type": ["string", "null"]},
                "name_patterns": {"type": "array", "items": {"type": "string"}},
                "missing_data_policy": {"enum": ["needs_review", "not_applicable"], "default": "needs_review"}
            }
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: WorkingPaperConfig = match client_config.parse(RULE_ID) {
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

    let accounts: Vec<_> = context
        .balance_sheet
        .leaf_accounts()
        .filter(|a| name_matches_any_pattern(&a.name, &cfg.name_patterns))
        .collect();
    if accounts.is_empty() {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NotApplicable)
            .summary("no accounts match the configured working-paper name patterns")
            .build();
    }

    let quantize_inc = cfg.common.quantize_increment();
    let mut builder = RuleResultBuilder::new(RULE_ID, RULE_TITLE);
    let mut overall = RuleStatus::Pass;

    for account in accounts {
        let working_paper = context
            .evidence
            .all_of_type("working_paper_balance")
            .find(|e| e.as_of_matches(context.period_end) && e.meta_str("account_ref") == Some(account.account_ref.as_str()));

        let (status, wp_amount) = match working_paper.and_then(|e| e.amount.map(|a| (e, a))) {
            None => (cfg.missing_data_policy.status(), None),
            Some((_, amount)) => {
                let status = if crate::decimal::quantized_eq(account.balance, amount, quantize_inc) {
                    RuleStatus::Pass
                } else {
                    RuleStatus::Fail
                };
                (status, Some(amount))
            }
        };
        overall = overall.worst(status);
        let mut fields = vec![
            ("account_name".into(), account.name.clone().into()),
            ("bs_balance".into(), account.balance.into()),
            ("status".into(), status.into()),
        ];
        fields.push(("working_paper_balance".into(), wp_amount.into()));
        builder = builder.detail(account.account_ref.clone(), fields);
    }

    let summary = if overall == RuleStatus::Pass {
        "working papers reconcile to the balance sheet".to_string()
    } else {
        format!("one or more working papers do not reconcile ({overall:?})")
    };
    builder.status(overall).summary(summary).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use rust_decimal_macros::dec;

    #[test]
    fn matching_working_paper_passes() {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::PREPAID", "Prepaid Insurance", dec!(1200.00)));
        let mut e = evidence("working_paper_balance", Some(dec!(1200.00)));
        e.as_of_date = Some(period_end());
        e.meta = serde_json::json!({"account_ref": "acct::PREPAID"});
        ctx.evidence.items.push(e);
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::Pass);
    }

    #[test]
    fn mismatch_fails() {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::PREPAID", "Prepaid Insurance", dec!(1200.00)));
        let mut e = evidence("working_paper_balance", Some(dec!(1000.00)));
        e.as_of_date = Some(period_end());
        e.meta = serde_json::json!({"account_ref": "acct::PREPAID"});
        ctx.evidence.items.push(e);
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::Fail);
    }

    #[test]
    fn no_matching_accounts_not_applicable() {
        let ctx = minimal_context();
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::NotApplicable);
    }
}
