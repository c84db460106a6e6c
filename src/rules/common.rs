//! Shared helpers used across the rule catalog: account matching,
//! evidence lookups, and tolerance arithmetic. Keeping these in one place
//! avoids re-deriving the same "match by ref, else by name" and
//! "allowed_variance = max(floor, pct*revenue)" logic in each of the 21
//! rule modules.

use crate::domain::{AccountBalance, BalanceSheetSnapshot};
use crate::result::{DetailValue, RuleStatus};
use rust_decimal::Decimal;

/// Accounts matching any of `refs` exactly.
pub fn accounts_by_refs<'a>(bs: &'a BalanceSheetSnapshot, refs: &[String]) -> Vec<&'a AccountBalance> {
    bs.leaf_accounts().filter(|a| refs.iter().any(|r| r == &a.account_ref)).collect()
}

/// Leaf accounts whose `type` or `subtype` case-insensitively equals one
/// of `categories`.
pub fn accounts_by_category<'a>(bs: &'a BalanceSheetSnapshot, categories: &[&str]) -> Vec<&'a AccountBalance> {
    bs.leaf_accounts()
        .filter(|a| {
            let type_match = a.r#type.as_deref().is_some_and(|t| categories.iter().any(|c| c.eq_ignore_ascii_case(t)));
            let subtype_match = a
                .subtype
                .as_deref()
                .is_some_and(|t| categories.iter().any(|c| c.eq_ignore_ascii_case(t)));
            type_match || subtype_match
        })
        .collect()
}

/// Leaf accounts whose name contains any of `needles`, case-insensitive.
pub fn accounts_by_name_contains_any<'a>(bs: &'a BalanceSheetSnapshot, needles: &[&str]) -> Vec<&'a AccountBalance> {
    bs.leaf_accounts().filter(|a| needles.iter().any(|n| a.name_contains(n))).collect()
}

/// Apply `include_accounts`/`exclude_accounts` refinement lists (by
/// `account_ref`) to a candidate set.
pub fn apply_include_exclude<'a>(
    candidates: Vec<&'a AccountBalance>,
    include: Option<&[String]>,
    exclude: Option<&[String]>,
) -> Vec<&'a AccountBalance> {
    candidates
        .into_iter()
        .filter(|a| include.map_or(true, |inc| inc.iter().any(|r| r == &a.account_ref)))
        .filter(|a| !exclude.map_or(false, |exc| exc.iter().any(|r| r == &a.account_ref)))
        .collect()
}

/// Case-insensitive substring containment, matching whole "tokens" for
/// slash-alternates like `A/P` / `A/R`. Splits on whitespace
/// and common punctuation other than the internal slash.
pub fn name_has_token(name: &str, token: &str) -> bool {
    let lowered_name = name.to_lowercase();
    let lowered_token = token.to_lowercase();
    lowered_name
        .split(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | ',' | ';' | ':'))
        .any(|word| word.trim_matches(|c: char| matches!(c, '.' | ',')) == lowered_token)
}

/// Whether `name` contains any of `patterns` as a case-insensitive plain
/// substring.
pub fn name_matches_any_pattern(name: &str, patterns: &[String]) -> bool {
    let lowered = name.to_lowercase();
    patterns.iter().any(|p| lowered.contains(&p.to_lowercase()))
}

/// Whether `name` starts with any of `prefixes`, case-insensitive.
pub fn name_starts_with_any(name: &str, prefixes: &[&str]) -> bool {
    let lowered = name.to_lowercase();
    prefixes.iter().any(|p| lowered.starts_with(&p.to_lowercase()))
}

/// Outcome of checking a single account's balance against a
/// floor/percent-of-revenue tolerance band.
pub struct ToleranceOutcome {
    /// `None` means neither `floor_amount` nor `pct_of_revenue` was
    /// configured — the caller must apply its `unconfigured_threshold_policy`.
    pub status: Option<RuleStatus>,
    pub allowed_variance: Decimal,
}

/// `allowed_variance = max(floor_amount, |revenue| * pct_of_revenue)`, with
/// the revenue component treated as zero if revenue is missing or
/// `pct_of_revenue` is absent. Zero balance is always a clean PASS.
pub fn zero_tolerance(
    balance: Decimal,
    revenue: Option<Decimal>,
    floor_amount: Option<Decimal>,
    pct_of_revenue: Option<Decimal>,
    quantize_increment: Option<Decimal>,
) -> ToleranceOutcome {
    let quantized = crate::decimal::quantize(balance, quantize_increment);
    if quantized.is_zero() {
        return ToleranceOutcome {
            status: Some(RuleStatus::Pass),
            allowed_variance: Decimal::ZERO,
        };
    }

    if floor_amount.is_none() && pct_of_revenue.is_none() {
        return ToleranceOutcome {
            status: None,
            allowed_variance: Decimal::ZERO,
        };
    }

    let revenue_component = match (revenue, pct_of_revenue) {
        (Some(rev), Some(pct)) => rev.abs() * pct,
        _ => Decimal::ZERO,
    };
    let allowed_variance = floor_amount.unwrap_or(Decimal::ZERO).max(revenue_component);

    let abs_balance = quantized.abs();
    let status = if abs_balance <= allowed_variance {
        RuleStatus::Warn
    } else {
        RuleStatus::Fail
    };
    ToleranceOutcome {
        status: Some(status),
        allowed_variance,
    }
}

/// Evaluate "this account should be zero, else within tolerance" across a
/// set of accounts (shared by BS-UNDEPOSITED-FUNDS-ZERO,
/// BS-CLEARING-ACCOUNTS-ZERO and BS-CLEARING-ACCOUNTS-NON-SALES-ZERO).
/// Returns the worst-wins status plus one detail row per account.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_zero_balance_accounts(
    accounts: &[&AccountBalance],
    revenue: Option<Decimal>,
    floor_amount: Option<Decimal>,
    pct_of_revenue: Option<Decimal>,
    unconfigured_threshold_status: RuleStatus,
    quantize_increment: Option<Decimal>,
) -> (RuleStatus, Vec<(String, Vec<(String, DetailValue)>)>) {
    let mut overall = RuleStatus::Pass;
    let mut details = Vec::new();
    for account in accounts {
        let outcome = zero_tolerance(account.balance, revenue, floor_amount, pct_of_revenue, quantize_increment);
        let status = outcome.status.unwrap_or(unconfigured_threshold_status);
        overall = overall.worst(status);
        details.push((
            account.account_ref.clone(),
            vec![
                ("account_name".into(), account.name.clone().into()),
                ("balance".into(), account.balance.into()),
                ("allowed_variance".into(), outcome.allowed_variance.into()),
                ("status".into(), status.into()),
            ],
        ));
    }
    (overall, details)
}

/// Outcome of locating the balance-sheet subledger total for
/// BS-AP-SUBLEDGER-RECONCILES / BS-AR-SUBLEDGER-RECONCILES.
pub enum SubledgerTotal {
    Found(Decimal),
    /// `account_refs` was configured but none of them matched a leaf account.
    MissingConfiguredRefs,
    /// No report-row, no configured refs, and either inference is disabled
    /// or nothing matched by name.
    NoMatches,
}

#[allow(clippy::too_many_arguments)]
pub fn compute_bs_subledger_total(
    bs: &BalanceSheetSnapshot,
    report_row_name: &str,
    account_refs: Option<&[String]>,
    allow_name_inference: bool,
    account_name_match: &str,
    initialism: &str,
) -> SubledgerTotal {
    if let Some(row) = bs.find_report_row_by_name(report_row_name) {
        return SubledgerTotal::Found(row.balance);
    }
    if let Some(refs) = account_refs {
        let matched = accounts_by_refs(bs, refs);
        return if matched.is_empty() {
            SubledgerTotal::MissingConfiguredRefs
        } else {
            SubledgerTotal::Found(matched.iter().map(|a| a.balance).sum())
        };
    }
    if allow_name_inference {
        let matched: Vec<_> = bs
            .leaf_accounts()
            .filter(|a| a.name_contains(account_name_match) || name_has_token(&a.name, initialism))
            .collect();
        if !matched.is_empty() {
            return SubledgerTotal::Found(matched.iter().map(|a| a.balance).sum());
        }
    }
    SubledgerTotal::NoMatches
}

/// Shared evaluator for the "account name matches an intercompany/related-
/// party pattern, confirm it reconciles against a counterparty balance"
/// family: locate BS accounts by
/// `name_patterns`, then for each, find its counterparty in
/// `intercompany_balance_sheet` evidence by substring and compare absolute
/// balances.
pub fn evaluate_intercompany_style(
    bs: &BalanceSheetSnapshot,
    name_patterns: &[String],
    counterparty_items: Option<&[serde_json::Value]>,
    quantize_increment: Option<Decimal>,
) -> Option<(RuleStatus, Vec<(String, Vec<(String, crate::result::DetailValue)>)>)> {
    let matches: Vec<_> = bs.leaf_accounts().filter(|a| name_matches_any_pattern(&a.name, name_patterns)).collect();
    if matches.is_empty() {
        return None;
    }

    let mut overall = RuleStatus::Pass;
    let mut details = Vec::new();
    for account in matches {
        let counterparty = counterparty_items.and_then(|items| {
            items.iter().find(|v| {
                v.get("counterparty")
                    .and_then(|c| c.as_str())
                    .is_some_and(|cp| account.name.to_lowercase().contains(&cp.to_lowercase()))
            })
        });
        let status = match counterparty.and_then(|v| crate::jsonval::get_decimal(v, "balance")) {
            None => RuleStatus::NeedsReview,
            Some(counterparty_balance) => {
                let a = crate::decimal::quantize(account.balance.abs(), quantize_increment);
                let b = crate::decimal::quantize(counterparty_balance.abs(), quantize_increment);
                if a == b {
                    RuleStatus::Pass
                } else {
                    RuleStatus::NeedsReview
                }
            }
        };
        overall = overall.worst(status);
        details.push((
            account.account_ref.clone(),
            vec![
                ("account_name".into(), account.name.clone().into()),
                ("balance".into(), account.balance.into()),
                ("status".into(), status.into()),
            ],
        ));
    }
    Some((overall, details))
}

/// Outcome of locating a single account by `account_ref` or a name
/// substring.
pub enum SingleAccountMatch<'a> {
    NoMatch,
    /// More than one candidate and no `account_ref` to disambiguate.
    Ambiguous,
    Found(&'a AccountBalance),
}

pub fn locate_single_account<'a>(
    bs: &'a BalanceSheetSnapshot,
    account_ref: Option<&str>,
    name_needle: &str,
) -> SingleAccountMatch<'a> {
    if let Some(r) = account_ref {
        return match bs.find_by_ref(r) {
            Some(a) => SingleAccountMatch::Found(a),
            None => SingleAccountMatch::NoMatch,
        };
    }
    let matches = bs.find_leaf_by_name_contains(name_needle);
    match matches.len() {
        0 => SingleAccountMatch::NoMatch,
        1 => SingleAccountMatch::Found(matches[0]),
        _ => SingleAccountMatch::Ambiguous,
    }
}

/// Infer a tax-filing cadence, in months, from a return's inclusive period
/// length. `None` means the
/// length falls outside the observed ranges and the caller should emit
/// NEEDS_REVIEW rather than guess.
pub fn infer_cadence_months(period_days: i64) -> Option<u32> {
    match period_days {
        28..=31 => Some(1),
        89..=92 => Some(3),
        365..=366 => Some(12),
        _ => None,
    }
}

/// The next scheduled filing period end after `latest_filed_end`, one
/// cadence step ahead. A filer is delinquent when this date has already
/// passed (`expected_period_end <= period_end`) and no return covers it —
/// callers compare the two, they are not folded together here so that the
/// expected period end itself stays meaningful to display regardless of
/// how the comparison turns out.
pub fn roll_forward_expected_period_end(latest_filed_end: chrono::NaiveDate, cadence_months: u32) -> chrono::NaiveDate {
    crate::calendar::add_months(latest_filed_end, cadence_months)
}
