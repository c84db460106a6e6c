//! BS-TAX-PAYABLE-AND-SUSPENSE-RECONCILE-TO-RETURN.

use super::common::{infer_cadence_months, name_matches_any_pattern, roll_forward_expected_period_end};
use crate::calendar::inclusive_day_span;
use crate::config::{ClientRulesConfig, CommonRuleConfig, MissingDataPolicy};
use crate::domain::{AccountBalance, RuleContext};
use crate::jsonval::{get_bool, get_decimal, get_date, get_str};
use crate::result::{DetailValue, RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-TAX-PAYABLE-AND-SUSPENSE-RECONCILE-TO-RETURN";
const RULE_TITLE: &str = "Tax payable and suspense accounts reconcile to the filed return";

fn default_account_name_patterns() -> Vec<String> {
    [
        "gst payable",
        "hst payable",
        "pst payable",
        "gst suspense",
        "hst suspense",
        "pst suspense",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_delinquent_status() -> RuleStatus {
    RuleStatus::Fail
}
fn default_refund_grace_days() -> i64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaxPayableSuspenseConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default = "default_account_name_patterns")]
    pub account_name_patterns: Vec<String>,
    #[serde(default = "default_delinquent_status")]
    pub delinquent_status: RuleStatus,
    #[serde(default = "default_refund_grace_days")]
    pub refund_grace_days: i64,
    #[serde(default)]
    pub missing_data_policy: MissingDataPolicy,
}

impl Default for TaxPayableSuspenseConfig {
    fn default() -> Self {
        Self {
            common: CommonRuleConfig::default(),
            account_name_patterns: default_account_name_patterns(),
            delinquent_status: default_delinquent_status(),
            refund_grace_days: default_refund_grace_days(),
            missing_data_policy: MissingDataPolicy::default(),
        }
    }
}

pub struct TaxPayableSuspenseRule;

impl Rule for TaxPayableSuspenseRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "Tax payable/suspense balances should equal the net amount owed on the return, net of payments made."
    }
    fn sources(&self) -> &'static [&'static str] {
        &["balance_sheet", "tax_agencies", "tax_returns", "tax_payments"]
    }
    fn config_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "enabled": {"type": "boolean", "default": true},
                "amount_quantize": {"type": ["string", "null"]},
                "account_name_patterns": {"type": "array", "items": {"type": "string"}},
                "delinquent_status": {"enum": ["WARN", "FAIL"], "default": "FAIL"},
                "refund_grace_days": {"type": "integer", "default": 60},
                "missing_data_policy": {"enum": ["needs_review", "not_applicable"], "default": "needs_review"}
            }
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

/// `"GST"`/`"HST"` accounts map to the CRA; `"PST"` accounts map to the
/// provincial Ministry/Department of Finance.
fn agency_key_for_account(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    if lower.contains("gst") || lower.contains("hst") {
        Some("cra")
    } else if lower.contains("pst") {
        Some("finance")
    } else {
        None
    }
}

fn agency_display_name_matches(display_name: &str, key: &str) -> bool {
    let lower = display_name.to_lowercase();
    match key {
        "cra" => lower.contains("cra"),
        "finance" => lower.contains("finance"),
        _ => false,
    }
}

struct TaxReturn {
    agency_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    net_tax_amount_due: Decimal,
}

struct TaxPayment {
    agency_id: Option<String>,
    payment_date: NaiveDate,
    payment_amount: Decimal,
}

fn parse_returns(items: &[serde_json::Value]) -> Vec<TaxReturn> {
    items
        .iter()
        .filter_map(|v| {
            Some(TaxReturn {
                agency_id: get_str(v, "agency_id")?.to_string(),
                start_date: get_date(v, "start_date")?,
                end_date: get_date(v, "end_date")?,
                net_tax_amount_due: get_decimal(v, "net_tax_amount_due")?,
            })
        })
        .collect()
}

fn parse_payments(items: &[serde_json::Value]) -> Vec<TaxPayment> {
    items
        .iter()
        .filter_map(|v| {
            Some(TaxPayment {
                agency_id: get_str(v, "agency_id").map(|s| s.to_string()),
                payment_date: get_date(v, "payment_date")?,
                payment_amount: get_decimal(v, "payment_amount")?,
            })
        })
        .collect()
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: TaxPayableSuspenseConfig = match client_config.parse(RULE_ID) {
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

    let accounts: Vec<&AccountBalance> = context
        .balance_sheet
        .leaf_accounts()
        .filter(|a| name_matches_any_pattern(&a.name, &cfg.account_name_patterns))
        .collect();
    if accounts.is_empty() {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NotApplicable)
            .summary("no tax payable or suspense accounts found")
            .build();
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
    let returns = parse_returns(returns_evidence.meta_items());
    let payments = context
        .evidence
        .first_of_type("tax_payments")
        .map(|e| parse_payments(e.meta_items()))
        .unwrap_or_default();

    let quantize_inc = cfg.common.quantize_increment();
    let mut builder = RuleResultBuilder::new(RULE_ID, RULE_TITLE);
    let mut overall = RuleStatus::Pass;
    let mut any_unmapped = false;

    for key in ["cra", "finance"] {
        let group: Vec<&AccountBalance> = accounts
            .iter()
            .filter(|a| agency_key_for_account(&a.name) == Some(key))
            .copied()
            .collect();
        if group.is_empty() {
            continue;
        }

        let Some(agency_id) = agencies_evidence
            .meta_items()
            .iter()
            .filter(|v| get_bool(v, "tax_tracked_on_sales") == Some(true))
            .find_map(|v| {
                let display_name = get_str(v, "display_name")?;
                if agency_display_name_matches(display_name, key) {
                    get_str(v, "id").map(|s| s.to_string())
                } else {
                    None
                }
            })
        else {
            any_unmapped = true;
            for a in &group {
                builder = builder.detail(
                    a.account_ref.clone(),
                    vec![
                        ("account_name".into(), a.name.clone().into()),
                        ("reason".into(), "no tax agency maps to this account".into()),
                    ],
                );
            }
            continue;
        };

        let mut agency_returns: Vec<_> = returns.iter().filter(|r| r.agency_id == agency_id).collect();
        agency_returns.sort_by_key(|r| r.end_date);
        let Some(latest) = agency_returns.last() else {
            overall = overall.worst(cfg.missing_data_policy.status());
            continue;
        };

        let period_days = inclusive_day_span(latest.start_date, latest.end_date);
        let Some(cadence_months) = infer_cadence_months(period_days) else {
            overall = overall.worst(RuleStatus::NeedsReview);
            continue;
        };
        let expected_period_end = roll_forward_expected_period_end(latest.end_date, cadence_months);

        let target_return = agency_returns
            .iter()
            .find(|r| r.end_date == expected_period_end)
            .or_else(|| agency_returns.iter().filter(|r| r.end_date <= expected_period_end).max_by_key(|r| r.end_date));
        let Some(target_return) = target_return else {
            overall = overall.worst(cfg.missing_data_policy.status());
            continue;
        };

        let payments_to_date: Decimal = payments
            .iter()
            .filter(|p| p.agency_id.as_deref() == Some(agency_id.as_str()) && p.payment_date <= context.period_end)
            .map(|p| p.payment_amount)
            .sum();
        let expected_total = target_return.net_tax_amount_due - payments_to_date;

        let combined_balance: Decimal = group.iter().map(|a| a.balance).sum();
        let matches = crate::decimal::quantized_eq(combined_balance, expected_total, quantize_inc);
        let mut status = if matches { RuleStatus::Pass } else { cfg.delinquent_status };

        if expected_total < Decimal::ZERO && matches {
            let age_days = inclusive_day_span(target_return.end_date, context.period_end) - 1;
            if age_days > cfg.refund_grace_days {
                status = status.worst(RuleStatus::Warn);
            }
        }

        let payable_negative = group
            .iter()
            .any(|a| !a.name.to_lowercase().contains("suspense") && a.balance < Decimal::ZERO && expected_total >= Decimal::ZERO);
        if payable_negative {
            status = status.worst(RuleStatus::Warn);
        }

        overall = overall.worst(status);
        builder = builder.detail(
            format!("agency::{key}"),
            vec![
                ("agency_id".into(), agency_id.clone().into()),
                ("combined_balance".into(), combined_balance.into()),
                ("expected_total".into(), expected_total.into()),
                ("expected_period_end".into(), expected_period_end.into()),
                ("status".into(), status.into()),
                (
                    "payable_negative_anomaly".into(),
                    DetailValue::Bool(payable_negative),
                ),
            ],
        );
    }

    if any_unmapped {
        overall = overall.worst(cfg.missing_data_policy.status());
    }

    let summary = if overall == RuleStatus::Pass {
        "tax payable and suspense accounts reconcile to the filed return".to_string()
    } else {
        format!("tax payable or suspense accounts do not reconcile ({overall:?})")
    };
    builder.status(overall).summary(summary).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use rust_decimal_macros::dec;

    fn agencies_evidence(items: serde_json::Value) -> crate::domain::EvidenceItem {
        let mut e = evidence("tax_agencies", None);
        e.meta = serde_json::json!({"items": items});
        e
    }
    fn returns_evidence(items: serde_json::Value) -> crate::domain::EvidenceItem {
        let mut e = evidence("tax_returns", None);
        e.meta = serde_json::json!({"items": items});
        e
    }
    fn payments_evidence(items: serde_json::Value) -> crate::domain::EvidenceItem {
        let mut e = evidence("tax_payments", None);
        e.meta = serde_json::json!({"items": items});
        e
    }

    #[test]
    fn matching_balance_passes() {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::GST", "GST Payable", dec!(500.00)));
        ctx.evidence.items.push(agencies_evidence(serde_json::json!([
            {"id": "CRA-GST", "display_name": "CRA GST", "last_file_date": "2025-10-15", "tax_tracked_on_sales": true}
        ])));
        ctx.evidence.items.push(returns_evidence(serde_json::json!([
            {"agency_id": "CRA-GST", "start_date": "2025-10-01", "end_date": "2025-12-31", "file_date": "2026-01-15", "net_tax_amount_due": "500.00"}
        ])));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::Pass);
    }

    #[test]
    fn mismatch_fails() {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::GST", "GST Payable", dec!(300.00)));
        ctx.evidence.items.push(agencies_evidence(serde_json::json!([
            {"id": "CRA-GST", "display_name": "CRA GST", "last_file_date": "2025-10-15", "tax_tracked_on_sales": true}
        ])));
        ctx.evidence.items.push(returns_evidence(serde_json::json!([
            {"agency_id": "CRA-GST", "start_date": "2025-10-01", "end_date": "2025-12-31", "file_date": "2026-01-15", "net_tax_amount_due": "500.00"}
        ])));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::Fail);
    }

    #[test]
    fn payment_reduces_expected_total() {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::GST", "GST Payable", dec!(200.00)));
        ctx.evidence.items.push(agencies_evidence(serde_json::json!([
            {"id": "CRA-GST", "display_name": "CRA GST", "last_file_date": "2025-10-15", "tax_tracked_on_sales": true}
        ])));
        ctx.evidence.items.push(returns_evidence(serde_json::json!([
            {"agency_id": "CRA-GST", "start_date": "2025-10-01", "end_date": "2025-12-31", "file_date": "2026-01-15", "net_tax_amount_due": "500.00"}
        ])));
        ctx.evidence.items.push(payments_evidence(serde_json::json!([
            {"agency_id": "CRA-GST", "payment_date": "2025-12-20", "payment_amount": "300.00"}
        ])));
        let result = evaluate(&ctx, &ctx.client_config);
        assert_eq!(result.status, RuleStatus::Pass);
    }

    #[test]
    fn no_matching_accounts_not_applicable() {
        let ctx = minimal_context();
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::NotApplicable);
    }
}
