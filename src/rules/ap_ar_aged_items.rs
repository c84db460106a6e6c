//! BS-AP-AR-ITEMS-OLDER-THAN-60-DAYS.

use crate::config::{ClientRulesConfig, CommonRuleConfig, MissingDataPolicy};
use crate::domain::{EvidenceItem, RuleContext};
use crate::jsonval::{get_decimal, get_i64, get_str};
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const RULE_ID: &str = "BS-AP-AR-ITEMS-OLDER-THAN-60-DAYS";
const RULE_TITLE: &str = "AP/AR items older than the age threshold are flagged for review";

fn default_age_threshold_days() -> i64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApArAgedItemsConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default = "default_age_threshold_days")]
    pub age_threshold_days: i64,
    #[serde(default)]
    pub missing_data_policy: MissingDataPolicy,
}

impl Default for ApArAgedItemsConfig {
    fn default() -> Self {
        Self {
            common: CommonRuleConfig::default(),
            age_threshold_days: default_age_threshold_days(),
            missing_data_policy: MissingDataPolicy::default(),
        }
    }
}

pub struct ApArAgedItemsRule;

impl Rule for ApArAgedItemsRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "Aged payables/receivables beyond the normal terms window should be investigated, not left open."
    }
    fn sources(&self) -> &'static [&'static str] {
        &[
            "ap_aging_summary_over_60",
            "ap_aging_detail_over_60",
            "ar_aging_summary_over_60",
            "ar_aging_detail_over_60",
        ]
    }
    fn config_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "enabled": {"type": "boolean", "default": true},
                "amount_quantize": {"type": ["string", "null"]},
                "age_threshold_days": {"type": "integer", "default": 60},
                "missing_data_policy": {"enum": ["needs_review", "not_applicable"], "default": "needs_review"}
            }
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

struct NamedAmount {
    name: String,
    amount: Decimal,
}

fn named_amounts(items: &[serde_json::Value]) -> Vec<NamedAmount> {
    items
        .iter()
        .filter_map(|v| {
            let name = get_str(v, "name")?.to_string();
            let amount = get_decimal(v, "amount")?;
            Some(NamedAmount { name, amount })
        })
        .collect()
}

fn aggregate_by_name(items: &[NamedAmount]) -> BTreeMap<String, Decimal> {
    let mut map = BTreeMap::new();
    for item in items {
        *map.entry(item.name.clone()).or_insert(Decimal::ZERO) += item.amount;
    }
    map
}

/// Whether a detail item is older than `age_threshold_days`, preferring an
/// explicit `txn_date`, falling back to `days_past_due` or a leading
/// number parsed out of `age_bucket` (e.g. `"61-90"` → 61).
fn item_is_aged(v: &serde_json::Value, period_end: chrono::NaiveDate, age_threshold_days: i64) -> Option<bool> {
    if let Some(txn_date) = crate::jsonval::get_date(v, "txn_date") {
        return Some((period_end - txn_date).num_days() > age_threshold_days);
    }
    if let Some(days) = get_i64(v, "days_past_due") {
        return Some(days > age_threshold_days);
    }
    if let Some(bucket) = get_str(v, "age_bucket") {
        let leading_digits: String = bucket.chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(days) = leading_digits.parse::<i64>() {
            return Some(days > age_threshold_days);
        }
    }
    None
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: ApArAgedItemsConfig = match client_config.parse(RULE_ID) {
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

    let ap_summary = context.evidence.first_of_type("ap_aging_summary_over_60");
    let ap_detail = context.evidence.first_of_type("ap_aging_detail_over_60");
    let ar_summary = context.evidence.first_of_type("ar_aging_summary_over_60");
    let ar_detail = context.evidence.first_of_type("ar_aging_detail_over_60");

    let (ap_summary, ap_detail, ar_summary, ar_detail) = match (ap_summary, ap_detail, ar_summary, ar_detail) {
        (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
        _ => {
            return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
                .status(cfg.missing_data_policy.status())
                .summary("AP/AR over-60 summary or detail evidence is missing")
                .build()
        }
    };

    let all: [&EvidenceItem; 4] = [ap_summary, ap_detail, ar_summary, ar_detail];
    if all.iter().any(|e| !e.as_of_matches(context.period_end)) {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NeedsReview)
            .summary("AP/AR over-60 evidence as_of_date does not match period end")
            .build();
    }

    let mut overall = RuleStatus::Pass;
    let mut builder = RuleResultBuilder::new(RULE_ID, RULE_TITLE);
    let mut flagged_count = 0usize;

    for (label, detail, summary) in [("ap", ap_detail, ap_summary), ("ar", ar_detail, ar_summary)] {
        let detail_items = named_amounts(detail.meta_items());
        let summary_items = named_amounts(summary.meta_items());

        for item in detail.meta_items() {
            if item_is_aged(item, context.period_end, cfg.age_threshold_days) == Some(true) {
                flagged_count += 1;
                overall = overall.worst(RuleStatus::NeedsReview);
                builder = builder.detail(
                    format!("{label}::{}", get_str(item, "name").unwrap_or("unknown")),
                    vec![
                        ("name".into(), get_str(item, "name").unwrap_or("unknown").into()),
                        ("amount".into(), get_decimal(item, "amount").into()),
                        ("status".into(), RuleStatus::NeedsReview.into()),
                    ],
                );
            }
        }

        let detail_by_name = aggregate_by_name(&detail_items);
        let summary_by_name = aggregate_by_name(&summary_items);
        if detail_by_name != summary_by_name {
            overall = overall.worst(RuleStatus::NeedsReview);
            builder = builder.detail(
                format!("{label}::summary_vs_detail"),
                vec![
                    ("check".into(), "summary_vs_detail_by_name".into()),
                    ("status".into(), RuleStatus::NeedsReview.into()),
                ],
            );
        }
    }

    let summary = if overall == RuleStatus::Pass {
        "no AP/AR items older than the age threshold".to_string()
    } else {
        format!("{flagged_count} AP/AR item(s) older than the age threshold, or a summary/detail mismatch")
    };

    builder.status(overall).summary(summary).build()
}
