//! Per-user purchase ledger and derived positions

pub mod ledger;
pub mod position;

pub use ledger::{PortfolioLedger, PurchaseRecord};
pub use position::{PositionSummary, group_by_symbol};
