//! BS-PETTY-CASH-MATCH.

use crate::config::{ClientRulesConfig, CommonRuleConfig};
use crate::domain::RuleContext;
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-PETTY-CASH-MATCH";
const RULE_TITLE: &str = "Petty cash balance matches supporting count";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PettyCashConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    pub account_ref: Option<String>,
}

pub struct PettyCashRule;

impl Rule for PettyCashRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "Petty cash on the books should tie exactly to the physical/voucher count."
    }
    fn sources(&self) -> &'static [&'static str] {
        &["balance_sheet", "petty_cash_support"]
    }
    fn config_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "enabled": {"type": "boolean", "default": true},
                "amount_quantize": {"type": ["string", "null"]},
                "account_ref": {"type": ["string", "null"]}
            },
            "required": ["account_ref"]
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: PettyCashConfig = match client_config.parse(RULE_ID) {
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

    let Some(account_ref) = cfg.account_ref.as_deref() else {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NeedsReview)
            .summary("configuration invalid: account_ref is required")
            .build();
    };

    let Some(account) = context.balance_sheet.find_by_ref(account_ref) else {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NotApplicable)
            .summary("configured petty cash account not found on the balance sheet")
            .build();
    };

    let support = context.evidence.first_of_type("petty_cash_support");
    let support_amount = support.and_then(|e| e.amount);
    let Some(support_amount) = support_amount else {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NeedsReview)
            .summary("petty cash support evidence (or its amount) is missing")
            .detail(
                account.account_ref.clone(),
                vec![("account_name".into(), account.name.clone().into()), ("bs_balance".into(), account.balance.into())],
            )
            .build();
    };

    let quantize_inc = cfg.common.quantize_increment();
    let difference = crate::decimal::quantize(account.balance, quantize_inc) - crate::decimal::quantize(support_amount, quantize_inc);
    let status = if difference.is_zero() { RuleStatus::Pass } else { RuleStatus::Fail };

    RuleResultBuilder::new(RULE_ID, RULE_TITLE)
        .status(status)
        .summary(if status == RuleStatus::Pass {
            "petty cash ties to support".to_string()
        } else {
            format!("petty cash difference of {}", difference.abs())
        })
        .detail(
            account.account_ref.clone(),
            vec![
                ("account_name".into(), account.name.clone().into()),
                ("bs_balance".into(), account.balance.into()),
                ("support_amount".into(), support_amount.into()),
                ("difference".into(), difference.abs().into()),
                ("status".into(), status.into()),
            ],
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use rust_decimal_macros::dec;

    fn context_with(bs_balance: rust_decimal::Decimal, support: Option<rust_decimal::Decimal>) -> RuleContext {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::PC", "Petty Cash", bs_balance));
        if let Some(amt) = support {
            ctx.evidence.items.push(evidence("petty_cash_support", Some(amt)));
        }
        ctx.client_config.rules.insert(RULE_ID.to_string(), serde_json::json!({"account_ref": "acct::PC"}));
        ctx
    }

    #[test]
    fn scenario_4_mismatch_fails() {
        let ctx = context_with(dec!(250.00), Some(dec!(200.00)));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::Fail);
        assert_eq!(result.severity, crate::result::Severity::High);
        let (_, fields) = &result.details[0];
        let diff = fields.iter().find(|(k, _)| k == "difference").unwrap();
        assert_eq!(diff.1, crate::result::DetailValue::Decimal(dec!(50.00)));
    }

    #[test]
    fn matching_balance_passes() {
        let ctx = context_with(dec!(200.00), Some(dec!(200.00)));
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::Pass);
    }

    #[test]
    fn missing_support_needs_review() {
        let ctx = context_with(dec!(200.00), None);
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::NeedsReview);
    }

    #[test]
    fn missing_account_not_applicable() {
        let mut ctx = minimal_context();
        ctx.client_config.rules.insert(RULE_ID.to_string(), serde_json::json!({"account_ref": "acct::NOPE"}));
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::NotApplicable);
    }
}
