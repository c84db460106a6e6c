//! The rule contract.

use crate::domain::RuleContext;
use crate::result::RuleResult;

/// A named, pure evaluator over a [`RuleContext`].
///
/// Implementations MUST NOT perform I/O or mutate the context, and MUST be
/// deterministic for identical inputs. Every rule shares the same
/// preamble: if its config is `enabled = false` it returns
/// `NOT_APPLICABLE` without evaluating anything further.
pub trait Rule: Send + Sync {
    /// Stable identifier, e.g. `"BS-BANK-RECONCILED-THROUGH-PERIOD-END"`.
    fn rule_id(&self) -> &'static str;

    /// Short human title, e.g. "Bank accounts reconciled through period end".
    fn rule_title(&self) -> &'static str;

    /// Best-practices citation shown to reviewers.
    fn best_practices_reference(&self) -> &'static str;

    /// Source documents/evidence types this rule draws on.
    fn sources(&self) -> &'static [&'static str];

    /// JSON Schema (as a `serde_json::Value`) describing this rule's
    /// config payload, for catalog export.
    fn config_schema(&self) -> serde_json::Value;

    /// Evaluate the rule against `context`, producing exactly one result.
    fn evaluate(&self, context: &RuleContext) -> RuleResult;
}
