//! Rule outcomes: status/severity lattice, findings, and the aggregate
//! run report.

use crate::domain::EvidenceItem;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Outcome of evaluating a single rule.
///
/// Ordered worst-first: `Fail > NeedsReview > Warn > Pass > NotApplicable`
///. Several rules use this ordering to
/// aggregate per-account sub-results into an overall rule status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleStatus {
    Fail,
    NeedsReview,
    Warn,
    Pass,
    NotApplicable,
}

impl RuleStatus {
    fn rank(self) -> u8 {
        match self {
            RuleStatus::Fail => 0,
            RuleStatus::NeedsReview => 1,
            RuleStatus::Warn => 2,
            RuleStatus::Pass => 3,
            RuleStatus::NotApplicable => 4,
        }
    }

    /// The default status -> severity mapping; a rule may
    /// override this per-status if its domain semantics call for it.
    pub fn default_severity(self) -> Severity {
        match self {
            RuleStatus::Pass => Severity::Info,
            RuleStatus::Warn => Severity::Low,
            RuleStatus::Fail => Severity::High,
            RuleStatus::NeedsReview => Severity::Medium,
            RuleStatus::NotApplicable => Severity::Info,
        }
    }

    /// Worst of `self` and `other` under the status lattice.
    pub fn worst(self, other: Self) -> Self {
        if self.rank() <= other.rank() {
            self
        } else {
            other
        }
    }

    /// Fold an iterator of statuses into the single worst one, defaulting
    /// to `Pass` for an empty iterator (nothing to disagree with).
    pub fn worst_of(statuses: impl IntoIterator<Item = RuleStatus>) -> RuleStatus {
        statuses
            .into_iter()
            .fold(RuleStatus::Pass, RuleStatus::worst)
    }
}

impl PartialOrd for RuleStatus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RuleStatus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// A value held in a `RuleResult` detail entry. Kept as an explicit enum
/// (rather than `serde_json::Value`) so amounts round-trip as exact
/// decimals rather than floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Str(String),
    Decimal(Decimal),
    Int(i64),
    Bool(bool),
    Date(NaiveDate),
    Status(RuleStatus),
    Null,
}

impl From<&str> for DetailValue {
    fn from(v: &str) -> Self {
        DetailValue::Str(v.to_string())
    }
}
impl From<String> for DetailValue {
    fn from(v: String) -> Self {
        DetailValue::Str(v)
    }
}
impl From<Decimal> for DetailValue {
    fn from(v: Decimal) -> Self {
        DetailValue::Decimal(v)
    }
}
impl From<i64> for DetailValue {
    fn from(v: i64) -> Self {
        DetailValue::Int(v)
    }
}
impl From<usize> for DetailValue {
    fn from(v: usize) -> Self {
        DetailValue::Int(v as i64)
    }
}
impl From<bool> for DetailValue {
    fn from(v: bool) -> Self {
        DetailValue::Bool(v)
    }
}
impl From<NaiveDate> for DetailValue {
    fn from(v: NaiveDate) -> Self {
        DetailValue::Date(v)
    }
}
impl From<RuleStatus> for DetailValue {
    fn from(v: RuleStatus) -> Self {
        DetailValue::Status(v)
    }
}
impl<T: Into<DetailValue>> From<Option<T>> for DetailValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(DetailValue::Null)
    }
}

/// A single finding, keyed by an identifier (usually an `account_ref`).
/// `details[]` within a rule is ordered — insertion order of evaluation,
/// and that order is observable/tested.
pub type Detail = (String, Vec<(String, DetailValue)>);

/// Outcome of evaluating one rule against a `RuleContext`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_id: String,
    pub rule_title: String,
    pub status: RuleStatus,
    pub severity: Severity,
    pub summary: String,
    pub details: Vec<Detail>,
    pub evidence_used: Vec<EvidenceItem>,
    pub human_action: String,
}

impl RuleResult {
    pub fn builder(rule_id: &'static str, rule_title: &'static str) -> RuleResultBuilder {
        RuleResultBuilder::new(rule_id, rule_title)
    }

    /// A clean `NOT_APPLICABLE`, `enabled=false` result with no findings.
    pub fn not_applicable(rule_id: &'static str, rule_title: &'static str, reason: impl Into<String>) -> Self {
        RuleResultBuilder::new(rule_id, rule_title)
            .status(RuleStatus::NotApplicable)
            .summary(reason)
            .build()
    }
}

/// Ergonomic, fluent construction of a [`RuleResult`].
pub struct RuleResultBuilder {
    rule_id: &'static str,
    rule_title: &'static str,
    status: RuleStatus,
    severity: Option<Severity>,
    summary: String,
    details: Vec<Detail>,
    evidence_used: Vec<EvidenceItem>,
    human_action: Option<String>,
}

impl RuleResultBuilder {
    pub fn new(rule_id: &'static str, rule_title: &'static str) -> Self {
        Self {
            rule_id,
            rule_title,
            status: RuleStatus::Pass,
            severity: None,
            summary: String::new(),
            details: Vec::new(),
            evidence_used: Vec::new(),
            human_action: None,
        }
    }

    pub fn status(mut self, status: RuleStatus) -> Self {
        self.status = status;
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn detail(mut self, key: impl Into<String>, fields: Vec<(String, DetailValue)>) -> Self {
        self.details.push((key.into(), fields));
        self
    }

    pub fn evidence(mut self, item: EvidenceItem) -> Self {
        self.evidence_used.push(item);
        self
    }

    pub fn evidence_all(mut self, items: impl IntoIterator<Item = EvidenceItem>) -> Self {
        self.evidence_used.extend(items);
        self
    }

    pub fn human_action(mut self, action: impl Into<String>) -> Self {
        self.human_action = Some(action.into());
        self
    }

    pub fn build(self) -> RuleResult {
        let status = self.status;
        let severity = self.severity.unwrap_or_else(|| status.default_severity());
        let human_action = self.human_action.unwrap_or_else(|| {
            if status == RuleStatus::Pass {
                String::new()
            } else {
                format!("Review {} findings for {}.", status_word(status), self.rule_title)
            }
        });
        RuleResult {
            rule_id: self.rule_id.to_string(),
            rule_title: self.rule_title.to_string(),
            status,
            severity,
            summary: self.summary,
            details: self.details,
            evidence_used: self.evidence_used,
            human_action,
        }
    }
}

fn status_word(status: RuleStatus) -> &'static str {
    match status {
        RuleStatus::Pass => "passing",
        RuleStatus::Warn => "warning",
        RuleStatus::Fail => "failing",
        RuleStatus::NeedsReview => "needs-review",
        RuleStatus::NotApplicable => "not-applicable",
    }
}

/// Aggregate report for a full rule run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleRunReport {
    /// In registration order, even when rules were executed concurrently.
    pub results: Vec<RuleResult>,
    pub totals: std::collections::BTreeMap<RuleStatus, usize>,
    /// Observability only — never read by any rule.
    #[serde(skip)]
    pub timings: Vec<(String, std::time::Duration)>,
}

impl RuleRunReport {
    pub fn from_results(results: Vec<RuleResult>, timings: Vec<(String, std::time::Duration)>) -> Self {
        let mut totals = std::collections::BTreeMap::new();
        for r in &results {
            *totals.entry(r.status).or_insert(0) += 1;
        }
        Self {
            results,
            totals,
            timings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worst_wins_ordering() {
        assert_eq!(RuleStatus::Fail.worst(RuleStatus::Pass), RuleStatus::Fail);
        assert_eq!(RuleStatus::Warn.worst(RuleStatus::Pass), RuleStatus::Warn);
        assert_eq!(RuleStatus::NotApplicable.worst(RuleStatus::Pass), RuleStatus::Pass);
        assert_eq!(
            RuleStatus::worst_of([RuleStatus::Pass, RuleStatus::Warn, RuleStatus::NotApplicable]),
            RuleStatus::Warn
        );
    }

    #[test]
    fn worst_of_empty_is_pass() {
        assert_eq!(RuleStatus::worst_of([]), RuleStatus::Pass);
    }

    #[test]
    fn default_severity_mapping() {
        assert_eq!(RuleStatus::Pass.default_severity(), Severity::Info);
        assert_eq!(RuleStatus::Fail.default_severity(), Severity::High);
        assert_eq!(RuleStatus::NeedsReview.default_severity(), Severity::Medium);
    }

    #[test]
    fn builder_defaults_clean_pass() {
        let r = RuleResult::builder("BS-EXAMPLE", "Example").build();
        assert_eq!(r.status, RuleStatus::Pass);
        assert_eq!(r.severity, Severity::Info);
        assert!(r.human_action.is_empty());
    }

    #[test]
    fn builder_non_pass_gets_human_action() {
        let r = RuleResult::builder("BS-EXAMPLE", "Example")
            .status(RuleStatus::Fail)
            .build();
        assert!(!r.human_action.is_empty());
    }
}
