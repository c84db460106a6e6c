//! BS-INTERCOMPANY-BALANCES-RECONCILE.

use super::common::evaluate_intercompany_style;
use crate::config::{ClientRulesConfig, CommonRuleConfig};
use crate::domain::RuleContext;
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-INTERCOMPANY-BALANCES-RECONCILE";
const RULE_TITLE: &str = "Intercompany and shareholder loan balances reconcile";

fn default_name_patterns() -> Vec<String> {
    [
        "due to",
        "due from",
        "intercompany",
        "inter-company",
        "intercompany loan",
        "loan from",
        "loan to",
        "shareholder loan",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntercompanyBalancesConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default = "default_name_patterns")]
    pub name_patterns: Vec<String>,
}

impl Default for IntercompanyBalancesConfig {
    fn default() -> Self {
        Self {
            common: CommonRuleConfig::default(),
            name_patterns: default_name_patterns(),
        }
    }
}

pub struct IntercompanyBalancesRule;

impl Rule for IntercompanyBalancesRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "Intercompany and shareholder loan balances must agree with the counterparty's books."
    }
    fn sources(&self) -> &'static [&'static str] {
        &["balance_sheet", "intercompany_balance_sheet"]
    }
    fn config_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "enabled": {"type": "boolean", "default": true},
                "amount_quantize": {"type": ["string", "null"]},
                "name_patterns": {"type": "array", "items": {"type": "string"}}
            }
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: IntercompanyBalancesConfig = match client_config.parse(RULE_ID) {
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

    let evidence = context.evidence.first_of_type("intercompany_balance_sheet");
    let items = evidence.map(|e| e.meta_items());

    match evaluate_intercompany_style(&context.balance_sheet, &cfg.name_patterns, items, cfg.common.quantize_increment()) {
        None => RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NotApplicable)
            .summary("no intercompany/shareholder loan accounts found")
            .build(),
        Some((status, details)) => {
            let mut builder = RuleResultBuilder::new(RULE_ID, RULE_TITLE).status(status);
            for (key, fields) in details {
                builder = builder.detail(key, fields);
            }
            builder
                .summary(if status == RuleStatus::Pass {
                    "intercompany balances reconcile".to_string()
                } else {
                    "intercompany balances need review".to_string()
                })
                .build()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use rust_decimal_macros::dec;

    #[test]
    fn shareholder_loan_matching_counterparty_passes() {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::SHL", "Shareholder Loan Payable", dec!(-10000.00)));
        let mut e = evidence("intercompany_balance_sheet", None);
        e.meta = serde_json::json!({"items": [{"counterparty": "Shareholder Loan Payable", "balance": "10000.00"}]});
        ctx.evidence.items.push(e);
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::Pass);
    }

    #[test]
    fn mismatch_needs_review() {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::SHL", "Loan to Parent Co", dec!(-10000.00)));
        let mut e = evidence("intercompany_balance_sheet", None);
        e.meta = serde_json::json!({"items": [{"counterparty": "Loan to Parent Co", "balance": "9500.00"}]});
        ctx.evidence.items.push(e);
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::NeedsReview);
    }
}
