//! Error taxonomy for the rules engine.
//!
//! A `thiserror`-derived enum with a `pub fn` constructor per variant and
//! a crate-wide `Result` alias.
//!
//! Per the engine's propagation policy, values of this type never escape
//! [`crate::runner::RuleRunner::run`] — they are always converted into a
//! `RuleResult` before the run report is returned.

use thiserror::Error;

/// Errors that can occur while evaluating a single rule.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A rule's configuration payload failed to parse/validate.
    #[error("configuration invalid for rule '{rule_id}': {reason}")]
    Configuration { rule_id: String, reason: String },

    /// A required input (snapshot row, evidence item, field) was absent.
    #[error("missing data: {0}")]
    MissingData(String),

    /// The rule could not resolve an ambiguity in the input (e.g. multiple
    /// candidate accounts without a disambiguating `account_ref`).
    #[error("inconsistent input: {0}")]
    Inconsistent(String),

    /// A business condition was violated (tie-out failed, non-zero balance
    /// where zero was required, etc).
    #[error("mismatch: {0}")]
    Mismatch(String),

    /// An unexpected internal error occurred while evaluating a rule. The
    /// runner catches these and reports the owning rule as NEEDS_REVIEW.
    #[error("internal error: {0}")]
    Internal(String),

    /// A duplicate rule id was registered with a rule that is not
    /// identical to the one already registered.
    #[error("duplicate rule id '{0}' registered with a different rule")]
    DuplicateRuleId(String),
}

impl EngineError {
    pub fn configuration(rule_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            rule_id: rule_id.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_data(msg: impl Into<String>) -> Self {
        Self::MissingData(msg.into())
    }

    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::Inconsistent(msg.into())
    }

    pub fn mismatch(msg: impl Into<String>) -> Self {
        Self::Mismatch(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result alias used internally by rule implementations.
pub type EngineResult<T> = Result<T, EngineError>;
