//! BS-PLOOTO-INSTANT-BALANCE-DISCLOSURE.

use crate::config::{ClientRulesConfig, CommonRuleConfig, MissingDataPolicy};
use crate::domain::RuleContext;
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-PLOOTO-INSTANT-BALANCE-DISCLOSURE";
const RULE_TITLE: &str = "Plooto Instant balance disclosed";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlootoInstantConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default)]
    pub account_ref: Option<String>,
    #[serde(default)]
    pub missing_data_policy: MissingDataPolicy,
}

pub struct PlootoInstantDisclosureRule;

impl Rule for PlootoInstantDisclosureRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "Disclosure-only: a non-zero Plooto Instant balance is flagged for reviewer awareness, not treated as an error."
    }
    fn sources(&self) -> &'static [&'static str] {
        &["balance_sheet"]
    }
    fn config_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "enabled": {"type": "boolean", "default": true},
                "amount_quantize": {"type": ["string", "null"]},
                "account_ref": {"type": ["string", "null"]},
                "missing_data_policy": {"enum": ["needs_review", "not_applicable"], "default": "needs_review"}
            }
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: PlootoInstantConfig = match client_config.parse(RULE_ID) {
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

    let matches: Vec<_> = match &cfg.account_ref {
        Some(r) => context.balance_sheet.find_by_ref(r).into_iter().collect(),
        None => context.balance_sheet.find_leaf_by_name_contains("plooto instant"),
    };
    if matches.is_empty() {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(cfg.missing_data_policy.status())
            .summary("no Plooto Instant account found")
            .build();
    }

    let quantize_inc = cfg.common.quantize_increment();
    let mut builder = RuleResultBuilder::new(RULE_ID, RULE_TITLE);
    let mut overall = RuleStatus::Pass;
    for account in &matches {
        let balance = crate::decimal::quantize(account.balance, quantize_inc);
        let status = if balance.is_zero() { RuleStatus::Pass } else { RuleStatus::Warn };
        overall = overall.worst(status);
        builder = builder.detail(
            account.account_ref.clone(),
            vec![
                ("account_name".into(), account.name.clone().into()),
                ("balance".into(), account.balance.into()),
                ("status".into(), status.into()),
            ],
        );
    }

    let summary = if overall == RuleStatus::Pass {
        "Plooto Instant is zero".to_string()
    } else {
        "Plooto Instant carries a balance (disclosure only)".to_string()
    };
    builder
        .status(overall)
        .summary(summary)
        .human_action(if overall == RuleStatus::Pass {
            String::new()
        } else {
            "Disclose the Plooto Instant balance to the reviewer; no correction required.".to_string()
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_passes() {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::PI", "Plooto Instant", dec!(0)));
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::Pass);
    }

    #[test]
    fn nonzero_warns_disclosure_only() {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::PI", "Plooto Instant", dec!(42)));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::Warn);
    }

    #[test]
    fn missing_account_needs_review_by_default() {
        let ctx = minimal_context();
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::NeedsReview);
    }
}
