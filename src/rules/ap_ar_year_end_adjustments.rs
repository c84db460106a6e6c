//! BS-AP-AR-YEAR_END_BATCH_ADJUSTMENTS.

use super::common::name_starts_with_any;
use crate::config::{ClientRulesConfig, CommonRuleConfig};
use crate::domain::RuleContext;
use crate::jsonval::get_str;
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-AP-AR-YEAR_END_BATCH_ADJUSTMENTS";
const RULE_TITLE: &str = "Year-end batch adjustment entries in AP/AR detail are flagged";

fn default_name_patterns() -> Vec<String> {
    ["yer supplier", "year-end review", "ye adj", "year end", "y/e"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
const START_PREFIXES: &[&str] = &["YE", "Y/E", "Year End"];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApArYearEndAdjustmentsConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default = "default_name_patterns")]
    pub name_patterns: Vec<String>,
}

impl Default for ApArYearEndAdjustmentsConfig {
    fn default() -> Self {
        Self {
            common: CommonRuleConfig::default(),
            name_patterns: default_name_patterns(),
        }
    }
}

pub struct ApArYearEndAdjustmentsRule;

impl Rule for ApArYearEndAdjustmentsRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "Year-end batch adjustments buried in AP/AR detail rows should be surfaced for reviewer sign-off."
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
                "name_patterns": {"type": "array", "items": {"type": "string"}}
            }
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: ApArYearEndAdjustmentsConfig = match client_config.parse(RULE_ID) {
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
                .status(RuleStatus::NotApplicable)
                .summary("AP/AR aging detail rows evidence is missing")
                .build()
        }
    };
    if !ap_rows.as_of_matches(context.period_end) || !ar_rows.as_of_matches(context.period_end) {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NotApplicable)
            .summary("AP/AR aging detail rows as_of_date does not match period end")
            .build();
    }

    let mut builder = RuleResultBuilder::new(RULE_ID, RULE_TITLE);
    let mut overall = RuleStatus::Pass;
    let mut flagged = 0usize;

    for (label, rows) in [("ap", ap_rows), ("ar", ar_rows)] {
        for item in rows.meta_items() {
            let Some(name) = get_str(item, "name") else { continue };
            let lowered = name.to_lowercase();
            let matches_pattern = cfg.name_patterns.iter().any(|p| lowered.contains(&p.to_lowercase()));
            let matches_prefix = name_starts_with_any(name, START_PREFIXES);
            if matches_pattern || matches_prefix {
                flagged += 1;
                overall = overall.worst(RuleStatus::NeedsReview);
                builder = builder.detail(
                    format!("{label}::{name}"),
                    vec![
                        ("name".into(), name.into()),
                        ("status".into(), RuleStatus::NeedsReview.into()),
                    ],
                );
            }
        }
    }

    let summary = if flagged == 0 {
        "no year-end batch adjustment entries found".to_string()
    } else {
        format!("{flagged} year-end batch adjustment entr(ies) found in AP/AR detail")
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
    fn matching_pattern_needs_review() {
        let mut ctx = minimal_context();
        ctx.evidence
            .items
            .push(rows_evidence("ap_aging_detail_rows", serde_json::json!([{"name": "YE Adjustment Co"}])));
        ctx.evidence.items.push(rows_evidence("ar_aging_detail_rows", serde_json::json!([])));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::NeedsReview);
    }

    #[test]
    fn no_matches_passes() {
        let mut ctx = minimal_context();
        ctx.evidence
            .items
            .push(rows_evidence("ap_aging_detail_rows", serde_json::json!([{"name": "Acme Supplies"}])));
        ctx.evidence.items.push(rows_evidence("ar_aging_detail_rows", serde_json::json!([])));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::Pass);
    }

    #[test]
    fn missing_evidence_not_applicable() {
        let ctx = minimal_context();
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::NotApplicable);
    }
}
