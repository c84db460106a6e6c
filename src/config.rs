//! Per-client, per-rule configuration.
//!
//! Configuration payloads are a tagged union over `rule_id -> typed
//! payload`. Each rule defines its own config struct and embeds
//! [`CommonRuleConfig`] via `#[serde(flatten)]` for the fields every rule
//! supports, using `#[serde(default = "default_true")]` for booleans
//! that default to enabled.

use crate::error::EngineError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Client-level envelope: `rule_id -> raw config payload`. Unknown ids are
/// ignored; a missing entry means the rule takes its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientRulesConfig {
    #[serde(default)]
    pub rules: HashMap<String, Value>,
}

impl ClientRulesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, rule_id: &str) -> Option<&Value> {
        self.rules.get(rule_id)
    }

    /// Parse the payload for `rule_id` into `T`, falling back to `T::default()`
    /// when no payload was supplied. A payload present but failing to
    /// deserialize is a `ConfigurationError` the caller should surface as a
    /// NEEDS_REVIEW result for that rule, never a panic.
    pub fn parse<T: DeserializeOwned + Default>(&self, rule_id: &str) -> Result<T, EngineError> {
        match self.raw(rule_id) {
            None => Ok(T::default()),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| EngineError::configuration(rule_id, e.to_string())),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Fields every rule supports at minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonRuleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// A decimal increment string, e.g. `"0.01"`.
    #[serde(default)]
    pub amount_quantize: Option<String>,
}

impl Default for CommonRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            amount_quantize: None,
        }
    }
}

impl CommonRuleConfig {
    pub fn quantize_increment(&self) -> Option<rust_decimal::Decimal> {
        self.amount_quantize
            .as_deref()
            .and_then(crate::decimal::parse_increment)
    }
}

/// How a rule should behave when required data is absent. Most rules
/// default to `NeedsReview`; some (disclosure-only rules) default to
/// `NotApplicable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDataPolicy {
    NeedsReview,
    NotApplicable,
}

impl Default for MissingDataPolicy {
    fn default() -> Self {
        Self::NeedsReview
    }
}

impl MissingDataPolicy {
    pub fn status(self) -> crate::result::RuleStatus {
        match self {
            Self::NeedsReview => crate::result::RuleStatus::NeedsReview,
            Self::NotApplicable => crate::result::RuleStatus::NotApplicable,
        }
    }
}
