//! Canonical domain entities: immutable snapshots produced by adapters
//! (out of scope for this crate) and consumed by rules.

mod balance_sheet;
mod context;
mod evidence;
mod profit_and_loss;
mod reconciliation;

pub use balance_sheet::{AccountBalance, BalanceSheetSnapshot, REPORT_ROW_PREFIX};
pub use context::RuleContext;
pub use evidence::{EvidenceBundle, EvidenceItem};
pub use profit_and_loss::ProfitAndLossSnapshot;
pub use reconciliation::{ReconciliationSnapshot, UnclearedItem};
