//! Executes every registered rule against a context.

use crate::domain::RuleContext;
use crate::registry::RuleRegistry;
use crate::result::{RuleResult, RuleRunReport, RuleStatus};
use crate::rule::Rule;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

pub struct RuleRunner<'a> {
    registry: &'a RuleRegistry,
}

impl<'a> RuleRunner<'a> {
    pub fn new(registry: &'a RuleRegistry) -> Self {
        Self { registry }
    }

    /// Evaluate every registered rule in parallel, then restore
    /// registration order before returning the report.
    pub fn run(&self, context: &RuleContext) -> RuleRunReport {
        let rules: Vec<&dyn Rule> = self.registry.iter().collect();
        let evaluated: Vec<(RuleResult, std::time::Duration)> = rules
            .par_iter()
            .map(|rule| evaluate_isolated(*rule, context))
            .collect();
        self.finish(evaluated)
    }

    /// Strictly single-threaded evaluation, in registration order. Useful
    /// for callers that need deterministic wall-clock behavior or run
    /// under harnesses that disallow extra threads.
    pub fn run_sequential(&self, context: &RuleContext) -> RuleRunReport {
        let evaluated: Vec<_> = self
            .registry
            .iter()
            .map(|rule| evaluate_isolated(rule, context))
            .collect();
        self.finish(evaluated)
    }

    fn finish(&self, evaluated: Vec<(RuleResult, std::time::Duration)>) -> RuleRunReport {
        let order: Vec<&str> = self.registry.iter().map(Rule::rule_id).collect();
        let mut by_id: std::collections::HashMap<String, (RuleResult, std::time::Duration)> =
            evaluated.into_iter().map(|(r, d)| (r.rule_id.clone(), (r, d))).collect();

        let mut results = Vec::with_capacity(order.len());
        let mut timings = Vec::with_capacity(order.len());
        for id in order {
            if let Some((result, duration)) = by_id.remove(id) {
                timings.push((result.rule_id.clone(), duration));
                results.push(result);
            }
        }
        RuleRunReport::from_results(results, timings)
    }
}

/// Run one rule, converting a panic into a NEEDS_REVIEW result rather
/// than propagating it.
fn evaluate_isolated(rule: &dyn Rule, context: &RuleContext) -> (RuleResult, std::time::Duration) {
    let started = Instant::now();
    let rule_id = rule.rule_id();
    let rule_title = rule.rule_title();
    let outcome = catch_unwind(AssertUnwindSafe(|| rule.evaluate(context)));
    let result = match outcome {
        Ok(result) => result,
        Err(panic) => {
            let reason = panic_message(&panic);
            tracing::error!(rule_id, reason = %reason, "rule panicked during evaluation");
            RuleResult::builder(rule_id, rule_title)
                .status(RuleStatus::NeedsReview)
                .summary(format!("internal error: {reason}"))
                .human_action(format!(
                    "Rule '{rule_id}' failed unexpectedly and must be re-run manually; see logs."
                ))
                .build()
        }
    };
    (result, started.elapsed())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::register_builtin_rules;
    use crate::test_support::minimal_context;

    #[test]
    fn run_preserves_registration_order() {
        let registry = register_builtin_rules();
        let context = minimal_context();
        let report = RuleRunner::new(&registry).run(&context);
        let ids: Vec<_> = report.results.iter().map(|r| r.rule_id.clone()).collect();
        let expected: Vec<_> = registry.iter().map(|r| r.rule_id().to_string()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn sequential_and_parallel_runs_agree() {
        let registry = register_builtin_rules();
        let context = minimal_context();
        let runner = RuleRunner::new(&registry);
        let parallel = runner.run(&context);
        let sequential = runner.run_sequential(&context);
        assert_eq!(
            parallel.results.iter().map(|r| (r.rule_id.clone(), r.status)).collect::<Vec<_>>(),
            sequential.results.iter().map(|r| (r.rule_id.clone(), r.status)).collect::<Vec<_>>(),
        );
    }
}
