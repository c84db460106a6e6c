//! Property-based tests for the engine's universal invariants:
//! determinism, purity, disabled → NOT_APPLICABLE, quantization
//! stability, and worst-wins aggregation.

use chrono::NaiveDate;
use mer_rules_engine::config::ClientRulesConfig;
use mer_rules_engine::domain::{AccountBalance, BalanceSheetSnapshot, EvidenceBundle, RuleContext};
use mer_rules_engine::result::RuleStatus;
use mer_rules_engine::rule::Rule;
use mer_rules_engine::rules::{petty_cash::PettyCashRule, register_builtin_rules};
use mer_rules_engine::runner::RuleRunner;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

fn period_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
}

fn context_with_accounts(accounts: Vec<AccountBalance>) -> RuleContext {
    RuleContext {
        period_end: period_end(),
        balance_sheet: BalanceSheetSnapshot {
            as_of_date: period_end(),
            accounts,
        },
        prior_balance_sheet: None,
        profit_and_loss: None,
        evidence: EvidenceBundle::default(),
        reconciliations: Vec::new(),
        client_config: ClientRulesConfig::new(),
    }
}

fn results_equal(a: &mer_rules_engine::result::RuleResult, b: &mer_rules_engine::result::RuleResult) -> bool {
    a.rule_id == b.rule_id
        && a.status == b.status
        && a.severity == b.severity
        && a.summary == b.summary
        && a.details == b.details
        && a.evidence_used == b.evidence_used
        && a.human_action == b.human_action
}

fn cents_strategy() -> impl Strategy<Value = i64> {
    -1_000_000i64..1_000_000i64
}

fn decimal_from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

proptest! {
    /// Determinism: re-running the full registry against the same context
    /// byte-for-byte reproduces every rule's status, severity, details and
    /// evidence.
    #[test]
    fn determinism_across_repeated_runs(cents in cents_strategy()) {
        let balance = decimal_from_cents(cents);
        let ctx = context_with_accounts(vec![AccountBalance {
            account_ref: "acct::BANK1".to_string(),
            name: "Operating Bank".to_string(),
            balance,
            r#type: Some("Bank".to_string()),
            subtype: None,
        }]);
        let registry = register_builtin_rules();
        let runner = RuleRunner::new(&registry);
        let first = runner.run_sequential(&ctx);
        let second = runner.run_sequential(&ctx);
        prop_assert_eq!(first.results.len(), second.results.len());
        for (a, b) in first.results.iter().zip(second.results.iter()) {
            prop_assert!(results_equal(a, b));
        }
    }

    /// Purity: evaluating does not mutate the context; a subsequent run
    /// against the same (unmoved) context yields identical results.
    #[test]
    fn purity_context_is_unaffected_by_a_run(cents in cents_strategy()) {
        let balance = decimal_from_cents(cents);
        let ctx = context_with_accounts(vec![AccountBalance {
            account_ref: "acct::CLR".to_string(),
            name: "Shopify Clearing".to_string(),
            balance,
            r#type: Some("Other Current Asset".to_string()),
            subtype: None,
        }]);
        let registry = register_builtin_rules();
        let runner = RuleRunner::new(&registry);
        let before = runner.run_sequential(&ctx);
        let _ = runner.run_sequential(&ctx);
        let after = runner.run_sequential(&ctx);
        for (a, b) in before.results.iter().zip(after.results.iter()) {
            prop_assert!(results_equal(a, b));
        }
    }

    /// Disabled → NOT_APPLICABLE/INFO/no findings, for every registered rule.
    #[test]
    fn disabled_rules_are_always_not_applicable(cents in cents_strategy()) {
        let balance = decimal_from_cents(cents);
        let mut ctx = context_with_accounts(vec![AccountBalance {
            account_ref: "acct::BANK1".to_string(),
            name: "Operating Bank".to_string(),
            balance,
            r#type: Some("Bank".to_string()),
            subtype: None,
        }]);
        let registry = register_builtin_rules();
        for rule in registry.iter() {
            ctx.client_config.rules.insert(rule.rule_id().to_string(), serde_json::json!({"enabled": false}));
        }
        let runner = RuleRunner::new(&registry);
        let report = runner.run_sequential(&ctx);
        for result in &report.results {
            prop_assert_eq!(result.status, RuleStatus::NotApplicable);
            prop_assert_eq!(result.severity, mer_rules_engine::result::Severity::Info);
            prop_assert!(result.details.is_empty());
        }
    }

    /// Quantization stability: shifting both the balance and its support by
    /// less than half the configured increment never flips PASS to FAIL.
    #[test]
    fn quantization_stability_petty_cash(
        base_cents in -100_000i64..100_000i64,
        noise_a in -49i64..50i64,
        noise_b in -49i64..50i64,
    ) {
        let base = decimal_from_cents(base_cents);
        let mut ctx = context_with_accounts(vec![AccountBalance {
            account_ref: "acct::PC".to_string(),
            name: "Petty Cash".to_string(),
            balance: base + Decimal::new(noise_a, 4),
            r#type: None,
            subtype: None,
        }]);
        ctx.client_config.rules.insert(
            PettyCashRule.rule_id().to_string(),
            serde_json::json!({"account_ref": "acct::PC", "amount_quantize": "0.01"}),
        );
        ctx.evidence.items.push(mer_rules_engine::domain::EvidenceItem {
            evidence_type: "petty_cash_support".to_string(),
            amount: Some(base + Decimal::new(noise_b, 4)),
            as_of_date: None,
            statement_end_date: None,
            uri: None,
            source: None,
            meta: serde_json::json!({}),
        });
        let result = PettyCashRule.evaluate(&ctx);
        prop_assert_eq!(result.status, RuleStatus::Pass);
    }

    /// Worst-wins aggregation: folding any set of statuses always yields
    /// the single worst one under the lattice (or PASS for the empty set).
    #[test]
    fn worst_of_matches_lattice_minimum(
        statuses in prop::collection::vec(status_strategy(), 0..10)
    ) {
        let folded = RuleStatus::worst_of(statuses.iter().copied());
        let expected = statuses.iter().copied().min_by_key(rank).unwrap_or(RuleStatus::Pass);
        prop_assert_eq!(folded, expected);
    }
}

fn status_strategy() -> impl Strategy<Value = RuleStatus> {
    prop_oneof![
        Just(RuleStatus::Fail),
        Just(RuleStatus::NeedsReview),
        Just(RuleStatus::Warn),
        Just(RuleStatus::Pass),
        Just(RuleStatus::NotApplicable),
    ]
}

fn rank(status: &RuleStatus) -> u8 {
    match status {
        RuleStatus::Fail => 0,
        RuleStatus::NeedsReview => 1,
        RuleStatus::Warn => 2,
        RuleStatus::Pass => 3,
        RuleStatus::NotApplicable => 4,
    }
}

#[test]
fn parse_increment_sanity_for_property_noise_bound() {
    // 49 hundredths-of-a-basis-point (1e-4 scale) is comfortably under half
    // of a one-cent increment; this just documents the bound chosen above.
    assert!(Decimal::new(49, 4) < Decimal::from_str("0.005").unwrap());
}
