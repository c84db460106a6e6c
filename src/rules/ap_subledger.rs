//! BS-AP-SUBLEDGER-RECONCILES.

use super::common::{compute_bs_subledger_total, SubledgerTotal};
use crate::config::{ClientRulesConfig, CommonRuleConfig};
use crate::domain::RuleContext;
use crate::result::{RuleResult, RuleResultBuilder, RuleStatus};
use crate::rule::Rule;
use serde::{Deserialize, Serialize};

pub const RULE_ID: &str = "BS-AP-SUBLEDGER-RECONCILES";
const RULE_TITLE: &str = "Accounts Payable subledger reconciles to the balance sheet";

fn default_true() -> bool {
    true
}
fn default_account_name_match() -> String {
    "accounts payable".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApSubledgerConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    #[serde(default)]
    pub account_refs: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub allow_name_inference: bool,
    #[serde(default = "default_account_name_match")]
    pub account_name_match: String,
}

impl Default for ApSubledgerConfig {
    fn default() -> Self {
        Self {
            common: CommonRuleConfig::default(),
            account_refs: None,
            allow_name_inference: default_true(),
            account_name_match: default_account_name_match(),
        }
    }
}

pub struct ApSubledgerRule;

impl Rule for ApSubledgerRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }
    fn rule_title(&self) -> &'static str {
        RULE_TITLE
    }
    fn best_practices_reference(&self) -> &'static str {
        "AP aging subledger total must tie to the Accounts Payable balance-sheet line."
    }
    fn sources(&self) -> &'static [&'static str] {
        &["balance_sheet", "ap_aging_summary_total", "ap_aging_detail_total"]
    }
    fn config_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "enabled": {"type": "boolean", "default": true},
                "amount_quantize": {"type": ["string", "null"]},
                "account_refs": {"type": ["array", "null"], "items": {"type": "string"}},
                "allow_name_inference": {"type": "boolean", "default": true},
                "account_name_match": {"type": "string", "default": "accounts payable"}
            }
        })
    }

    fn evaluate(&self, context: &RuleContext) -> RuleResult {
        evaluate(context, &context.client_config)
    }
}

fn evaluate(context: &RuleContext, client_config: &ClientRulesConfig) -> RuleResult {
    let cfg: ApSubledgerConfig = match client_config.parse(RULE_ID) {
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

    let bs_total = compute_bs_subledger_total(
        &context.balance_sheet,
        "Total Accounts Payable",
        cfg.account_refs.as_deref(),
        cfg.allow_name_inference,
        &cfg.account_name_match,
        "a/p",
    );
    let bs_total = match bs_total {
        SubledgerTotal::NoMatches => {
            return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
                .status(RuleStatus::NotApplicable)
                .summary("no Accounts Payable balance identified")
                .build()
        }
        SubledgerTotal::MissingConfiguredRefs => {
            return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
                .status(RuleStatus::NeedsReview)
                .summary("configured account_refs did not match any balance-sheet account")
                .build()
        }
        SubledgerTotal::Found(total) => total,
    };

    let summary_evidence = context.evidence.first_of_type("ap_aging_summary_total");
    let detail_evidence = context.evidence.first_of_type("ap_aging_detail_total");
    let (summary_evidence, detail_evidence) = match (summary_evidence, detail_evidence) {
        (Some(s), Some(d)) => (s, d),
        _ => {
            return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
                .status(RuleStatus::NeedsReview)
                .summary("AP aging summary or detail total evidence is missing")
                .build()
        }
    };

    if !summary_evidence.as_of_matches(context.period_end) || !detail_evidence.as_of_matches(context.period_end) {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NeedsReview)
            .summary("AP aging evidence as_of_date does not match period end")
            .build();
    }

    let quantize_inc = cfg.common.quantize_increment();
    let (Some(summary_amount), Some(detail_amount)) = (summary_evidence.amount, detail_evidence.amount) else {
        return RuleResultBuilder::new(RULE_ID, RULE_TITLE)
            .status(RuleStatus::NeedsReview)
            .summary("AP aging evidence is missing an amount")
            .build();
    };

    let bs_q = crate::decimal::quantize(bs_total, quantize_inc);
    let summary_q = crate::decimal::quantize(summary_amount, quantize_inc);
    let detail_q = crate::decimal::quantize(detail_amount, quantize_inc);
    let status = if bs_q == summary_q && bs_q == detail_q {
        RuleStatus::Pass
    } else {
        RuleStatus::Fail
    };

    RuleResultBuilder::new(RULE_ID, RULE_TITLE)
        .status(status)
        .summary(if status == RuleStatus::Pass {
            "AP subledger reconciles to the balance sheet".to_string()
        } else {
            "AP subledger does not reconcile to the balance sheet".to_string()
        })
        .detail(
            "ap_subledger",
            vec![
                ("bs_total".into(), bs_total.into()),
                ("summary_total".into(), summary_amount.into()),
                ("detail_total".into(), detail_amount.into()),
                ("status".into(), status.into()),
            ],
        )
        .evidence(summary_evidence.clone())
        .evidence(detail_evidence.clone())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use rust_decimal_macros::dec;

    fn context_with(bs_balance: rust_decimal::Decimal, summary: rust_decimal::Decimal, detail: rust_decimal::Decimal) -> RuleContext {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("report::ap", "Total Accounts Payable", bs_balance));
        let mut s = evidence("ap_aging_summary_total", Some(summary));
        s.as_of_date = Some(period_end());
        let mut d = evidence("ap_aging_detail_total", Some(detail));
        d.as_of_date = Some(period_end());
        ctx.evidence.items.push(s);
        ctx.evidence.items.push(d);
        ctx
    }

    #[test]
    fn matching_totals_pass() {
        let ctx = context_with(dec!(1000), dec!(1000), dec!(1000));
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::Pass);
    }

    #[test]
    fn mismatched_detail_fails() {
        let ctx = context_with(dec!(1000), dec!(1000), dec!(950));
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::Fail);
    }

    #[test]
    fn no_ap_accounts_is_not_applicable() {
        let ctx = minimal_context();
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::NotApplicable);
    }

    #[test]
    fn name_inferred_initialism_match() {
        let mut ctx = minimal_context();
        ctx.balance_sheet.accounts.push(account("acct::ap1", "Trade A/P", dec!(500)));
        let mut s = evidence("ap_aging_summary_total", Some(dec!(500)));
        s.as_of_date = Some(period_end());
        let mut d = evidence("ap_aging_detail_total", Some(dec!(500)));
        d.as_of_date = Some(period_end());
        ctx.evidence.items.push(s);
        ctx.evidence.items.push(d);
        assert_eq!(evaluate(&ctx, &ctx.client_config).status, RuleStatus::Pass);
    }
}
