//! Portfolio aggregation over investment snapshots.

pub mod allocation;
pub mod valuation;

pub use allocation::{allocation_by_type, TypeAllocation};
pub use valuation::{valuate, PortfolioTotals};
