//! BS-UNCLEARED-ITEMS-INVESTIGATED-AND-FLAGGED.

use crate::calendar::subtract_months;
use crate::config::{ClientRulesConfig, CommonRuleConfig, MissingDataPolicy};
use crate::domain::RuleContext;
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-UNCLEARED-ITEMS-INVESTIGATED-AND-FLAGGED";
const RULE_TITLE: &str = "Uncleared reconciliation items investigated and flagged";

fn default_months_old_threshold() -> u32 {
    2
}
fn default_max_flagged() -> usize {
    20
}
fn default_stale_item_status() -> RuleStatus {
    RuleStatus::Warn
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UnclearedItemsConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default = "default_months_old_threshold")]
    pub months_old_threshold: u32,
    #[serde(default = "default_stale_item_status")]
    pub stale_item_status: RuleStatus,
    #[serde(default = "default_max_flagged")]
    pub max_flagged_items_in_detail: usize,
    #[serde(default)]
    pub missing_data_policy: MissingDataPolicy,
}

impl Default for UnclearedItemsConfig {
    fn default() -> Self {
        Self {
            common: CommonRuleConfig::default(),
            months_old_threshold: default_months_old_threshold(),
            stale_item_status: default_stale_item_status(),
            max_flagged_items_in_detail: default_max_flagged(),
            missing_data_policy: MissingDataPolicy::default(),
        }
    }
}

pub struct UnclearedItemsRule;

impl Rule for UnclearedItemsRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "Reconciliation review: aged uncleared items are investigated, not left open indefinitely."
    }
    fn sources(&self) -> &'static [&'static str] {
        &["reconciliations"]
    }
    fn config_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "enabled": {"type": "boolean", "default": true},
                "amount_quantize": {"type": ["string", "null"]},
                "months_old_threshold": {"type": "integer", "default": 2},
                "stale_item_status": {"enum": ["WARN", "FAIL"], "default": "WARN"},
                "max_flagged_items_in_detail": {"type": "integer", "default": 20},
                "missing_data_policy": {"enum": ["needs_review", "not_applicable"], "default": "needs_review"}
            }
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: UnclearedItemsConfig = match client_config.parse(RULE_ID) {
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

    if context.reconciliations.is_empty() {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(cfg.missing_data_policy.status())
            .summary("no reconciliation snapshots available")
            .build();
    }

    let mut builder = RuleResultBuilder::new(RULE_ID, RULE_TITLE);
    let mut overall = RuleStatus::Pass;
    let mut total_flagged = 0usize;
    let mut emitted = 0usize;

    for recon in &context.reconciliations {
        let threshold_date = subtract_months(recon.statement_end_date, cfg.months_old_threshold);
        let items = recon.uncleared_items_as_at();
        let mut account_flagged = 0usize;
        let mut account_status = RuleStatus::Pass;

        for item in &items {
            let flagged_or_unparseable = match item.txn_date {
                None => true,
                Some(date) => date < threshold_date,
            };
            if !flagged_or_unparseable {
                continue;
            }
            if item.txn_date.is_none() {
                account_status = account_status.worst(cfg.missing_data_policy.status());
            } else {
                account_status = account_status.worst(cfg.stale_item_status);
            }
            account_flagged += 1;

            if emitted < cfg.max_flagged_items_in_detail {
                builder = builder.detail(
                    format!("{}::{}", recon.account_ref, account_flagged),
                    vec![
                        ("account_ref".into(), recon.account_ref.clone().into()),
                        ("description".into(), item.description.clone().unwrap_or_default().into()),
                        ("amount".into(), item.amount.into()),
                        ("txn_date".into(), item.txn_date.into()),
                        ("raw_txn_date".into(), item.raw_txn_date.clone().unwrap_or_default().into()),
                    ],
                );
                emitted += 1;
            }
        }

        total_flagged += account_flagged;
        overall = overall.worst(account_status);
    }

    let summary = if total_flagged == 0 {
        "no stale uncleared items".to_string()
    } else {
        format!("{total_flagged} uncleared item(s) older than the threshold")
    };

    builder.status(overall).summary(summary).build()
}
