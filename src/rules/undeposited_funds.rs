//! BS-UNDEPOSITED-FUNDS-ZERO.

use super::common::{accounts_by_name_contains_any, accounts_by_refs, evaluate_zero_balance_accounts};
use crate::config::{ClientRulesConfig, CommonRuleConfig};
use crate::domain::RuleContext;
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-UNDEPOSITED-FUNDS-ZERO";
const RULE_TITLE: &str = "Undeposited Funds account is zero (or within tolerance)";

fn default_unconfigured_threshold_policy() -> RuleStatus {
    RuleStatus::NeedsReview
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UndepositedFundsConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default)]
    pub account_refs: Option<Vec<String>>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub floor_amount: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub pct_of_revenue: Option<Decimal>,
    #[serde(default = "default_unconfigured_threshold_policy")]
    pub unconfigured_threshold_policy: RuleStatus,
}

impl Default for UndepositedFundsConfig {
    fn default() -> Self {
        Self {
            common: CommonRuleConfig::default(),
            account_refs: None,
            floor_amount: None,
            pct_of_revenue: None,
            unconfigured_threshold_policy: default_unconfigured_threshold_policy(),
        }
    }
}

pub struct UndepositedFundsRule;

impl Rule for UndepositedFundsRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "Undeposited Funds is an interim clearing account and should be empty once deposits are matched."
    }
    fn sources(&self) -> &'static [&'static str] {
        &["balance_sheet", "profit_and_loss"]
    }
    fn config_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "enabled": {"type": "boolean", "default": true},
                "amount_quantize": {"type": ["string", "null"]},
                "account_refs": {"type": ["array", "null"], "items": {"type": "string"}},
                "floor_amount": {"type": ["string", "null"]},
                "pct_of_revenue": {"type": ["string", "null"]},
                "unconfigured_threshold_policy": {"enum": ["NEEDS_REVIEW", "WARN", "FAIL"], "default": "NEEDS_REVIEW"}
            }
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: UndepositedFundsConfig = match client_config.parse(RULE_ID) {
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

    let accounts = match &cfg.account_refs {
        Some(refs) => accounts_by_refs(&context.balance_sheet, refs),
        None => accounts_by_name_contains_any(&context.balance_sheet, &["undeposited"]),
    };
    if accounts.is_empty() {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NotApplicable)
            .summary("no Undeposited Funds account found")
            .build();
    }

    let (status, details) = evaluate_zero_balance_accounts(
        &accounts,
        context.profit_and_loss.as_ref().and_then(|p| p.revenue()),
        cfg.floor_amount,
        cfg.pct_of_revenue,
        cfg.unconfigured_threshold_policy,
        cfg.common.quantize_increment(),
    );

    let mut builder = RuleResultBuilder::new(RULE_ID, RULE_TITLE).status(status);
    for (key, fields) in details {
        builder = builder.detail(key, fields);
    }
    let summary = if status == RuleStatus::Pass {
        "Undeposited Funds is zero".to_string()
    } else {
        format!("Undeposited Funds outside tolerance ({status:?})")
    };
    builder.summary(summary).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_balance_passes() {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::UF", "Undeposited Funds", dec!(0)));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::Pass);
    }

    #[test]
    fn no_account_is_not_applicable() {
        let ctx = minimal_context();
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::NotApplicable);
    }

    #[test]
    fn nonzero_without_threshold_needs_review() {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::UF", "Undeposited Funds", dec!(25)));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::NeedsReview);
    }

    #[test]
    fn nonzero_within_tolerance_warns() {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::UF", "Undeposited Funds", dec!(25)));
        ctx.client_config.rules.insert(RULE_ID.to_string(), serde_json::json!({"floor_amount": "50"}));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::Warn);
    }
}
