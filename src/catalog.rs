//! Machine-readable catalog export.
//!
//! Side-effect free: callers serialize the returned entries wherever they
//! like. Ordering matches registration order.

use crate::registry::RuleRegistry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub rule_id: String,
    pub rule_title: String,
    pub sources: Vec<String>,
    pub best_practices_reference: String,
    pub config_schema: serde_json::Value,
}

/// Build the catalog from a registry, in registration order.
pub fn build_catalog(registry: &RuleRegistry) -> Vec<CatalogEntry> {
    registry
        .iter()
        .map(|rule| CatalogEntry {
            rule_id: rule.rule_id().to_string(),
            rule_title: rule.rule_title().to_string(),
            sources: rule.sources().iter().map(|s| s.to_string()).collect(),
            best_practices_reference: rule.best_practices_reference().to_string(),
            config_schema: rule.config_schema(),
        })
        .collect()
}

/// Serialize the catalog as pretty-printed JSON.
pub fn to_json(catalog: &[CatalogEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(catalog)
}

/// Serialize the catalog as YAML.
pub fn to_yaml(catalog: &[CatalogEntry]) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(catalog)
}
