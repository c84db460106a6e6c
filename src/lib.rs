//! Month-end review (MER) balance-sheet controls: a deterministic rules
//! engine over canonical bookkeeping snapshots and evidence.
//!
//! This crate is the rules engine only. It ingests a [`domain::RuleContext`]
//! (balance sheet, optional prior balance sheet and P&L, evidence bundle,
//! reconciliation snapshots, and per-client rule configuration) and, via
//! [`runner::RuleRunner`], produces a [`result::RuleRunReport`]: one
//! [`result::RuleResult`] per registered rule, in registration order.
//!
//! Adapters that parse upstream payloads into the canonical inputs,
//! connectors, file extractors, UI, and persistence are all out of scope.
//!
//! # Example
//!
//! ```
//! use mer_rules_engine::rules::register_builtin_rules;
//! use mer_rules_engine::runner::RuleRunner;
//!
//! let registry = register_builtin_rules();
//! // let context = /* built by an adapter, out of scope for this crate */;
//! // let report = RuleRunner::new(&registry).run(&context);
//! assert!(registry.len() >= 20);
//! ```

pub mod calendar;
pub mod catalog;
pub mod config;
pub mod decimal;
pub mod domain;
pub mod error;
pub mod jsonval;
pub mod registry;
pub mod result;
pub mod rule;
pub mod rules;
pub mod runner;

#[cfg(test)]
pub(crate) mod test_support;
