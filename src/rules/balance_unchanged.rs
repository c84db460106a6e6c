//! BS-BALANCE-UNCHANGED-PRIOR-MONTH.

use crate::config::{ClientRulesConfig, CommonRuleConfig};
use crate::domain::RuleContext;
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-BALANCE-UNCHANGED-PRIOR-MONTH";
const RULE_TITLE: &str = "Balances have moved from the prior period";

fn default_include_zero_balances() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BalanceUnchangedConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default = "default_include_zero_balances")]
    pub include_zero_balances: bool,
}

impl Default for BalanceUnchangedConfig {
    fn default() -> Self {
        Self {
            common: CommonRuleConfig::default(),
            include_zero_balances: default_include_zero_balances(),
        }
    }
}

pub struct BalanceUnchangedRule;

impl Rule for BalanceUnchangedRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "An account balance identical to the prior period is often a sign a subledger roll-forward never ran."
    }
    fn sources(&self) -> &'static [&'static str] {
        &["balance_sheet", "prior_balance_sheet"]
    }
    fn config_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "enabled": {"type": "boolean", "default": true},
                "amount_quantize": {"type": ["string", "null"]},
                "include_zero_balances": {"type": "boolean", "default": true}
            }
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: BalanceUnchangedConfig = match client_config.parse(RULE_ID) {
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

    let Some(prior) = context.prior_balance_sheet.as_ref() else {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NotApplicable)
            .summary("no prior balance sheet available for comparison")
            .build();
    };

    let quantize_inc = cfg.common.quantize_increment();
    let mut builder = RuleResultBuilder::new(RULE_ID, RULE_TITLE);
    let mut flagged = 0usize;

    for account in context.balance_sheet.leaf_accounts() {
        let Some(prior_account) = prior.find_by_ref(&account.account_ref) else {
            continue;
        };
        if !cfg.include_zero_balances && account.balance == Decimal::ZERO {
            continue;
        }
        let unchanged = crate::decimal::quantized_eq(account.balance, prior_account.balance, quantize_inc);
        if unchanged {
            flagged += 1;
            builder = builder.detail(
                account.account_ref.clone(),
                vec![
                    ("account_name".into(), account.name.clone().into()),
                    ("balance".into(), account.balance.into()),
                    ("prior_balance".into(), prior_account.balance.into()),
                ],
            );
        }
    }

    let status = if flagged > 0 { RuleStatus::Warn } else { RuleStatus::Pass };
    let summary = if flagged > 0 {
        format!("{flagged} account(s) are unchanged from the prior period")
    } else {
        "all account balances moved from the prior period".to_string()
    };
    builder.status(status).summary(summary).build()
}
