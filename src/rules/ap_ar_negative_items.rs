//! BS-AP-AR-NEGATIVE-OPEN-ITEMS.

use crate::config::{ClientRulesConfig, CommonRuleConfig, MissingDataPolicy};
use crate::domain::RuleContext;
use crate::jsonval::{get_decimal, get_str};
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-AP-AR-NEGATIVE-OPEN-ITEMS";
const RULE_TITLE: &str = "No negative open AP/AR items";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApArNegativeItemsConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default)]
    pub missing_data_policy: MissingDataPolicy,
}

pub struct ApArNegativeItemsRule;

impl Rule for ApArNegativeItemsRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "A negative open balance in AP/AR aging detail usually indicates a misapplied payment or credit."
    }
    fn sources(&self) -> &'static [&'static str] {
        &["ap_aging_detail_rows", "ar_aging_detail_rows"]
    }
    fn config_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "enabled": {"type": "boolean", "default": true},
                "amount_quantize": {"type": ["string", "null"]},
                "missing_data_policy": {"enum": ["needs_review", "not_applicable"], "default": "needs_review"}
            }
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: ApArNegativeItemsConfig = match client_config.parse(RULE_ID) {
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

    let ap_rows = context.evidence.first_of_type("ap_aging_detail_rows");
    let ar_rows = context.evidence.first_of_type("ar_aging_detail_rows");
    let (ap_rows, ar_rows) = match (ap_rows, ar_rows) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
                .status(cfg.missing_data_policy.status())
                .summary("AP/AR aging detail rows evidence is missing")
                .build()
        }
    };
    if !ap_rows.as_of_matches(context.period_end) || !ar_rows.as_of_matches(context.period_end) {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(cfg.missing_data_policy.status())
            .summary("AP/AR aging detail rows as_of_date does not match period end")
            .build();
    }

    let mut overall = RuleStatus::Pass;
    let mut builder = RuleResultBuilder::new(RULE_ID, RULE_TITLE);
    let mut negative_count = 0usize;

    for (label, evidence) in [("ap", ap_rows), ("ar", ar_rows)] {
        for item in evidence.meta_items() {
            let Some(open_balance) = get_decimal(item, "open_balance") else {
                continue;
            };
            if open_balance.is_sign_negative() && !open_balance.is_zero() {
                negative_count += 1;
                overall = overall.worst(RuleStatus::NeedsReview);
                builder = builder.detail(
                    format!("{label}::{}", get_str(item, "name").unwrap_or("unknown")),
                    vec![
                        ("name".into(), get_str(item, "name").unwrap_or("unknown").into()),
                        ("open_balance".into(), open_balance.into()),
                        ("status".into(), RuleStatus::NeedsReview.into()),
                    ],
                );
            }
        }
    }

    let summary = if negative_count == 0 {
        "no negative open AP/AR items".to_string()
    } else {
        format!("{negative_count} negative open AP/AR item(s)")
    };
    builder.status(overall).summary(summary).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    fn rows_evidence(evidence_type: &str, items: serde_json::Value) -> crate::domain::EvidenceItem {
        let mut e = evidence(evidence_type, None);
        e.as_of_date = Some(period_end());
        e.meta = serde_json::json!({"items": items});
        e
    }

    #[test]
    fn negative_open_balance_needs_review() {
        let mut ctx = minimal_context();
        ctx.evidence
            .items
            .push(rows_evidence("ap_aging_detail_rows", serde_json::json!([{"name": "Vendor A", "open_balance": "-25.00"}])));
        ctx.evidence
            .items
            .push(rows_evidence("ar_aging_detail_rows", serde_json::json!([{"name": "Cust A", "open_balance": "10.00"}])));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::NeedsReview);
    }

    #[test]
    fn all_positive_passes() {
        let mut ctx = minimal_context();
        ctx.evidence
            .items
            .push(rows_evidence("ap_aging_detail_rows", serde_json::json!([{"name": "Vendor A", "open_balance": "25.00"}])));
        ctx.evidence
            .items
            .push(rows_evidence("ar_aging_detail_rows", serde_json::json!([{"name": "Cust A", "open_balance": "10.00"}])));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::Pass);
    }

    #[test]
    fn missing_evidence_needs_review() {
        let ctx = minimal_context();
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::NeedsReview);
    }
}
