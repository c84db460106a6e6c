//! BS-CLEARING-ACCOUNTS-NON-SALES-ZERO.

use super::common::accounts_by_name_contains_any;
use crate::config::{ClientRulesConfig, CommonRuleConfig, MissingDataPolicy};
use crate::domain::RuleContext;
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-CLEARING-ACCOUNTS-NON-SALES-ZERO";
const RULE_TITLE: &str = "Non-sales clearing accounts are zero";

const DEFAULT_CURRENT_ASSET_TYPES: &[&str] = &["Bank", "Accounts Receivable", "Other Current Asset", "Cash and Cash Equivalents"];

fn default_current_asset_types() -> Vec<String> {
    DEFAULT_CURRENT_ASSET_TYPES.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClearingNonSalesConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default = "default_current_asset_types")]
    pub current_asset_types: Vec<String>,
    #[serde(default)]
    pub missing_data_policy: MissingDataPolicy,
}

impl Default for ClearingNonSalesConfig {
    fn default() -> Self {
        Self {
            common: CommonRuleConfig::default(),
            current_asset_types: default_current_asset_types(),
            missing_data_policy: MissingDataPolicy::default(),
        }
    }
}

pub struct ClearingNonSalesRule;

impl Rule for ClearingNonSalesRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "Clearing accounts outside the normal current-asset types warrant zero tolerance, not a variance band."
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
                "current_asset_types": {"type": "array", "items": {"type": "string"}},
                "missing_data_policy": {"enum": ["needs_review", "not_applicable"], "default": "needs_review"}
            }
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: ClearingNonSalesConfig = match client_config.parse(RULE_ID) {
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

    let candidates = accounts_by_name_contains_any(&context.balance_sheet, &["clearing"]);
    if candidates.is_empty() {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NotApplicable)
            .summary("no clearing accounts found")
            .build();
    }

    let quantize_inc = cfg.common.quantize_increment();
    let mut builder = RuleResultBuilder::new(RULE_ID, RULE_TITLE);
    let mut overall = RuleStatus::Pass;
    let mut in_scope = 0usize;

    for account in &candidates {
        let classified = account
            .r#type
            .as_deref()
            .into_iter()
            .chain(account.subtype.as_deref())
            .any(|t| cfg.current_asset_types.iter().any(|c| c.eq_ignore_ascii_case(t)));

        if account.r#type.is_none() && account.subtype.is_none() {
            overall = overall.worst(cfg.missing_data_policy.status());
            builder = builder.detail(
                account.account_ref.clone(),
                vec![
                    ("account_name".into(), account.name.clone().into()),
                    ("status".into(), cfg.missing_data_policy.status().into()),
                    ("reason".into(), "type/subtype not classified".into()),
                ],
            );
            continue;
        }
        if classified {
            // In the current-asset set: this is BS-CLEARING-ACCOUNTS-ZERO's
            // territory, not this rule's.
            continue;
        }

        in_scope += 1;
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

    if in_scope == 0 && overall == RuleStatus::Pass {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NotApplicable)
            .summary("no non-sales clearing accounts found")
            .build();
    }

    let summary = format!("{in_scope} non-sales clearing account(s) evaluated");
    builder.status(overall).summary(summary).build()
}
