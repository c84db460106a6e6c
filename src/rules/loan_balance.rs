//! BS-LOAN-BALANCE-MATCH.

use super::common::{locate_single_account, SingleAccountMatch};
use crate::config::{ClientRulesConfig, CommonRuleConfig, MissingDataPolicy};
use crate::domain::RuleContext;
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-LOAN-BALANCE-MATCH";
const RULE_TITLE: &str = "Loan balance matches the lender's schedule";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoanBalanceConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default)]
    pub account_ref: Option<String>,
    #[serde(default)]
    pub missing_data_policy: MissingDataPolicy,
}

pub struct LoanBalanceRule;

impl Rule for LoanBalanceRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "Outstanding loan balance should tie exactly to the lender's amortization schedule as of period end."
    }
    fn sources(&self) -> &'static [&'static str] {
        &["balance_sheet", "loan_schedule_balance"]
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
    let cfg: LoanBalanceConfig = match client_config.parse(RULE_ID) {
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

    let account = match locate_single_account(&context.balance_sheet, cfg.account_ref.as_deref(), "loan") {
        SingleAccountMatch::NoMatch => {
            return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
                .status(RuleStatus::NotApplicable)
                .summary("no loan account found")
                .build()
        }
        SingleAccountMatch::Ambiguous => {
            return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
                .status(RuleStatus::NeedsReview)
                .summary("multiple loan accounts match and no account_ref was configured to disambiguate")
                .build()
        }
        SingleAccountMatch::Found(a) => a,
    };

    let Some(schedule) = context
        .evidence
        .all_of_type("loan_schedule_balance")
        .find(|e| e.amount.is_some() && e.as_of_matches(context.period_end))
    else {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(cfg.missing_data_policy.status())
            .summary("no loan_schedule_balance evidence matching period end")
            .build();
    };

    let quantize_inc = cfg.common.quantize_increment();
    let schedule_amount = schedule.amount.expect("checked by find predicate");
    let status = if crate::decimal::quantized_eq(account.balance, schedule_amount, quantize_inc) {
        RuleStatus::Pass
    } else {
        RuleStatus::Fail
    };

    RuleResultBuilder::new(RULE_ID, RULE_TITLE)
        .status(status)
        .summary(if status == RuleStatus::Pass {
            "loan balance matches the lender's schedule".to_string()
        } else {
            "loan balance does not match the lender's schedule".to_string()
        })
        .detail(
            account.account_ref.clone(),
            vec![
                ("account_name".into(), account.name.clone().into()),
                ("bs_balance".into(), account.balance.into()),
                ("schedule_balance".into(), schedule_amount.into()),
                ("status".into(), status.into()),
            ],
        )
        .evidence(schedule.clone())
        .build()
}
