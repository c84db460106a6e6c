//! Process-wide mapping of `rule_id -> rule`.
//!
//! The registry is built once (via [`crate::rules::register_builtin_rules`])
//! and treated as read-only during runs: initialization is an explicit
//! call, never an import side effect.

use crate::error::EngineError;
use crate::rule::Rule;
use std::collections::HashMap;

pub struct RuleRegistry {
    /// Registration order is preserved; `order[i]` indexes into `entries`.
    order: Vec<String>,
    entries: HashMap<String, Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }

    /// Register a rule. Idempotent for re-registering the identical id
    /// (a no-op); rejects a *different* rule trying to claim an id that's
    /// already taken.
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<(), EngineError> {
        let id = rule.rule_id().to_string();
        if let Some(existing) = self.entries.get(&id) {
            if existing.rule_title() == rule.rule_title() {
                return Ok(()); // idempotent re-registration
            }
            return Err(EngineError::DuplicateRuleId(id));
        }
        self.order.push(id.clone());
        self.entries.insert(id, rule);
        Ok(())
    }

    pub fn get(&self, rule_id: &str) -> Option<&dyn Rule> {
        self.entries.get(rule_id).map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Rules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.order.iter().filter_map(move |id| self.entries.get(id).map(AsRef::as_ref))
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RuleContext;
    use crate::result::RuleResult;

    struct Dummy(&'static str);
    impl Rule for Dummy {
        fn rule_id(&self) -> &'static str {
            self.0
        }
        fn rule_title(&self) -> &'static str {
            "Dummy"
        }
        fn best_practices_reference(&self) -> &'static str {
            "n/a"
        }
        fn sources(&self) -> &'static [&'static str] {
            &[]
        }
        fn config_schema(&self) -> serde_json::Value {
            serde_json::json!({})
        }
        fn evaluate(&self, _context: &RuleContext) -> RuleResult {
            RuleResult::builder(self.0, "Dummy").build()
        }
    }

    #[test]
    fn registration_order_is_preserved() {
        let mut reg = RuleRegistry::new();
        reg.register(Box::new(Dummy("B"))).unwrap();
        reg.register(Box::new(Dummy("A"))).unwrap();
        let ids: Vec<_> = reg.iter().map(Rule::rule_id).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn duplicate_same_rule_is_idempotent() {
        let mut reg = RuleRegistry::new();
        reg.register(Box::new(Dummy("A"))).unwrap();
        reg.register(Box::new(Dummy("A"))).unwrap();
        assert_eq!(reg.len(), 1);
    }
}
