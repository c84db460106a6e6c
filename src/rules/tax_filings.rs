//! BS-TAX-FILINGS-UP-TO-DATE.

use super::common::{infer_cadence_months, roll_forward_expected_period_end};
use crate::calendar::inclusive_day_span;
use crate::config::{ClientRulesConfig, CommonRuleConfig, MissingDataPolicy};
use crate::domain::RuleContext;
use crate::jsonval::{get_bool, get_date, get_str};
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-TAX-FILINGS-UP-TO-DATE";
const RULE_TITLE: &str = "Sales-tax filings are up to date";

fn default_exclude_agency_name_patterns() -> Vec<String> {
    vec!["no tax agency".to_string()]
}
fn default_delinquent_status() -> RuleStatus {
    RuleStatus::Fail
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaxFilingsConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default = "default_exclude_agency_name_patterns")]
    pub exclude_agency_name_patterns: Vec<String>,
    #[serde(default = "default_delinquent_status")]
    pub delinquent_status: RuleStatus,
    #[serde(default)]
    pub missing_data_policy: MissingDataPolicy,
}

impl Default for TaxFilingsConfig {
    fn default() -> Self {
        Self {
            common: CommonRuleConfig::default(),
            exclude_agency_name_patterns: default_exclude_agency_name_patterns(),
            delinquent_status: default_delinquent_status(),
            missing_data_policy: MissingDataPolicy::default(),
        }
    }
}

pub struct TaxFilingsRule;

impl Rule for TaxFilingsRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "Sales-tax agencies expect filings on a regular cadence; a missed filing compounds penalties."
    }
    fn sources(&self) -> &'static [&'static str] {
        &["tax_agencies", "tax_returns"]
    }
    fn config_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "enabled": {"type": "boolean", "default": true},
                "amount_quantize": {"type": ["string", "null"]},
                "exclude_agency_name_patterns": {"type": "array", "items": {"type": "string"}},
                "delinquent_status": {"enum": ["WARN", "FAIL"], "default": "FAIL"},
                "missing_data_policy": {"enum": ["needs_review", "not_applicable"], "default": "needs_review"}
            }
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

struct Agency<'a> {
    id: String,
    display_name: &'a str,
}

struct TaxReturn {
    agency_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

fn parse_agencies(items: &[serde_json::Value], exclude_patterns: &[String]) -> Vec<Agency<'_>> {
    items
        .iter()
        .filter(|v| get_bool(v, "tax_tracked_on_sales") == Some(true))
        .filter_map(|v| {
            let id = get_str(v, "id")?.to_string();
            let display_name = get_str(v, "display_name").unwrap_or("");
            Some(Agency { id, display_name })
        })
        .filter(|a| !exclude_patterns.iter().any(|p| a.display_name.to_lowercase().contains(&p.to_lowercase())))
        .collect()
}

fn parse_returns(items: &[serde_json::Value]) -> Vec<TaxReturn> {
    items
        .iter()
        .filter_map(|v| {
            Some(TaxReturn {
                agency_id: get_str(v, "agency_id")?.to_string(),
                start_date: get_date(v, "start_date")?,
                end_date: get_date(v, "end_date")?,
            })
        })
        .collect()
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: TaxFilingsConfig = match client_config.parse(RULE_ID) {
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

    let agencies_evidence = context.evidence.first_of_type("tax_agencies");
    let returns_evidence = context.evidence.first_of_type("tax_returns");
    let (agencies_evidence, returns_evidence) = match (agencies_evidence, returns_evidence) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
                .status(cfg.missing_data_policy.status())
                .summary("tax_agencies or tax_returns evidence is missing")
                .build()
        }
    };

    let agencies = parse_agencies(agencies_evidence.meta_items(), &cfg.exclude_agency_name_patterns);
    if agencies.is_empty() {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NotApplicable)
            .summary("no sales-tax agencies tracked")
            .build();
    }
    let returns = parse_returns(returns_evidence.meta_items());

    let mut builder = RuleResultBuilder::new(RULE_ID, RULE_TITLE);
    let mut overall = RuleStatus::Pass;

    for agency in &agencies {
        let mut agency_returns: Vec<_> = returns.iter().filter(|r| r.agency_id == agency.id).collect();
        agency_returns.sort_by_key(|r| r.end_date);

        let Some(latest) = agency_returns.last() else {
            overall = overall.worst(cfg.missing_data_policy.status());
            builder = builder.detail(
                agency.id.clone(),
                vec![
                    ("agency".into(), agency.display_name.into()),
                    ("status".into(), cfg.missing_data_policy.status().into()),
                    ("reason".into(), "no filed returns for this agency".into()),
                ],
            );
            continue;
        };

        let period_days = inclusive_day_span(latest.start_date, latest.end_date);
        let Some(cadence_months) = infer_cadence_months(period_days) else {
            overall = overall.worst(RuleStatus::NeedsReview);
            builder = builder.detail(
                agency.id.clone(),
                vec![
                    ("agency".into(), agency.display_name.into()),
                    ("status".into(), RuleStatus::NeedsReview.into()),
                    ("reason".into(), "latest return period length does not match a known cadence".into()),
                    ("period_days".into(), period_days.into()),
                ],
            );
            continue;
        };

        let expected_period_end = roll_forward_expected_period_end(latest.end_date, cadence_months);
        let status = if expected_period_end <= context.period_end {
            cfg.delinquent_status
        } else {
            RuleStatus::Pass
        };
        overall = overall.worst(status);
        builder = builder.detail(
            agency.id.clone(),
            vec![
                ("agency".into(), agency.display_name.into()),
                ("cadence_months".into(), (cadence_months as i64).into()),
                ("latest_filed_end".into(), latest.end_date.into()),
                ("expected_period_end".into(), expected_period_end.into()),
                ("status".into(), status.into()),
            ],
        );
    }

    let summary = if overall == RuleStatus::Pass {
        "sales-tax filings are up to date".to_string()
    } else {
        format!("one or more sales-tax agencies are delinquent ({overall:?})")
    };
    builder.status(overall).summary(summary).build()
}
