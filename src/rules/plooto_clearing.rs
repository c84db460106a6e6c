//! BS-PLOOTO-CLEARING-ZERO.

use crate::config::{ClientRulesConfig, CommonRuleConfig};
use crate::domain::RuleContext;
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-PLOOTO-CLEARING-ZERO";
const RULE_TITLE: &str = "Plooto Clearing account is zero";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlootoClearingConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default)]
    pub account_ref: Option<String>,
}

pub struct PlootoClearingRule;

impl Rule for PlootoClearingRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "Payment-processor clearing accounts (Plooto) should clear to zero after settlement."
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
                "account_ref": {"type": ["string", "null"]}
            }
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: PlootoClearingConfig = match client_config.parse(RULE_ID) {
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
        None => context.balance_sheet.find_leaf_by_name_contains("plooto clearing"),
    };
    if matches.is_empty() {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NotApplicable)
            .summary("no Plooto Clearing account found")
            .build();
    }

    let quantize_inc = cfg.common.quantize_increment();
    let mut builder = RuleResultBuilder::new(RULE_ID, RULE_TITLE);
    let mut overall = RuleStatus::Pass;
    for account in &matches {
        let balance = crate::decimal::quantize(account.balance, quantize_inc);
        let status = if balance.is_zero() { RuleStatus::Pass } else { RuleStatus::Fail };
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
        "Plooto Clearing is zero".to_string()
    } else {
        "Plooto Clearing has a non-zero balance".to_string()
    };
    builder.status(overall).summary(summary).build()
}
