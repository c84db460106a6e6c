//! BS-CLEARING-ACCOUNTS-ZERO.

use super::common::{accounts_by_name_contains_any, accounts_by_refs, evaluate_zero_balance_accounts};
use crate::config::{ClientRulesConfig, CommonRuleConfig};
use crate::domain::{AccountBalance, RuleContext};
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-CLEARING-ACCOUNTS-ZERO";
const RULE_TITLE: &str = "Clearing accounts are zero (or within tolerance)";

const DEFAULT_CURRENT_ASSET_TYPES: &[&str] = &["Bank", "Accounts Receivable", "Other Current Asset", "Cash and Cash Equivalents"];

fn default_unconfigured_threshold_policy() -> RuleStatus {
    RuleStatus::NeedsReview
}
fn default_current_asset_types() -> Vec<String> {
    DEFAULT_CURRENT_ASSET_TYPES.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClearingZeroConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default)]
    pub account_refs: Option<Vec<String>>,
    #[serde(default = "default_current_asset_types")]
    pub current_asset_types: Vec<String>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub floor_amount: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub pct_of_revenue: Option<Decimal>,
    #[serde(default = "default_unconfigured_threshold_policy")]
    pub unconfigured_threshold_policy: RuleStatus,
}

impl Default for ClearingZeroConfig {
    fn default() -> Self {
        Self {
            common: CommonRuleConfig::default(),
            account_refs: None,
            current_asset_types: default_current_asset_types(),
            floor_amount: None,
            pct_of_revenue: None,
            unconfigured_threshold_policy: default_unconfigured_threshold_policy(),
        }
    }
}

pub struct ClearingZeroRule;

impl Rule for ClearingZeroRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "Clearing/suspense accounts should net to zero once matched inflows and outflows post."
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
                "current_asset_types": {"type": "array", "items": {"type": "string"}},
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

/// Split name-inferred clearing candidates into (qualifying, needs-review).
/// An account qualifies if its type/subtype is classified into
/// `current_asset_types`; one with no type/subtype at all can't be
/// confirmed either way and is reported separately as NEEDS_REVIEW.
fn partition_by_classification<'a>(
    candidates: Vec<&'a AccountBalance>,
    current_asset_types: &[String],
) -> (Vec<&'a AccountBalance>, Vec<&'a AccountBalance>) {
    let mut qualifying = Vec::new();
    let mut unclassified = Vec::new();
    for account in candidates {
        let classified = account
            .r#type
            .as_deref()
            .into_iter()
            .chain(account.subtype.as_deref())
            .any(|t| current_asset_types.iter().any(|c| c.eq_ignore_ascii_case(t)));
        if classified {
            qualifying.push(account);
        } else if account.r#type.is_none() && account.subtype.is_none() {
            unclassified.push(account);
        }
        // classified == false but type/subtype present and simply not in
        // the configured set: excluded silently, it's not a clearing
        // account by this rule's inference.
    }
    (qualifying, unclassified)
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: ClearingZeroConfig = match client_config.parse(RULE_ID) {
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

    let (accounts, unclassified) = match &cfg.account_refs {
        Some(refs) => (accounts_by_refs(&context.balance_sheet, refs), Vec::new()),
        None => {
            let candidates = accounts_by_name_contains_any(&context.balance_sheet, &["clearing"]);
            partition_by_classification(candidates, &cfg.current_asset_types)
        }
    };

    if accounts.is_empty() && unclassified.is_empty() {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NotApplicable)
            .summary("no clearing accounts found")
            .build();
    }

    let (mut status, mut details) = evaluate_zero_balance_accounts(
        &accounts,
        context.profit_and_loss.as_ref().and_then(|p| p.revenue()),
        cfg.floor_amount,
        cfg.pct_of_revenue,
        cfg.unconfigured_threshold_policy,
        cfg.common.quantize_increment(),
    );

    for account in &unclassified {
        status = status.worst(RuleStatus::NeedsReview);
        details.push((
            account.account_ref.clone(),
            vec![
                ("account_name".into(), account.name.clone().into()),
                ("status".into(), RuleStatus::NeedsReview.into()),
                ("reason".into(), "type/subtype not classified; cannot confirm as a clearing account".into()),
            ],
        ));
    }

    let mut builder = RuleResultBuilder::new(RULE_ID, RULE_TITLE).status(status);
    for (key, fields) in details {
        builder = builder.detail(key, fields);
    }
    let summary = if status == RuleStatus::Pass {
        "clearing accounts are zero".to_string()
    } else {
        format!("clearing accounts outside tolerance ({status:?})")
    };
    builder.summary(summary).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use rust_decimal_macros::dec;

    #[test]
    fn scenario_3_clearing_tolerance_warn() {
        let mut ctx = minimal_context();
        ctx.balance_sheet
            .accounts
            .push(account_typed("acct::CLR", "Shopify Clearing", dec!(5.00), "Other Current Asset"));
        ctx.profit_and_loss = Some(pnl_with_revenue(dec!(100000.00)));
        ctx.client_config.rules.insert(
            RULE_ID.to_string(),
            serde_json::json!({"floor_amount": "0", "pct_of_revenue": "0.001"}),
        );
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::Warn);
        assert_eq!(result.severity, crate::result::Severity::Low);
    }

    #[test]
    fn unclassified_name_match_needs_review() {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::CLR", "Mystery Clearing", dec!(5.00)));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::NeedsReview);
    }

    #[test]
    fn non_matching_type_excluded() {
        let mut ctx = minimal_context();
        ctx.balance_sheet
            .accounts
            .push(account_typed("acct::CLR", "Fixed Asset Clearing", dec!(500.00), "Fixed Asset"));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::NotApplicable);
    }
}
