//! Finsight Core - investment price synchronization and portfolio valuation.
//!
//! This crate takes a snapshot of investments from the persistence layer,
//! reprices the market-priced ones through `finsight-market-data`, and
//! aggregates the result into portfolio totals. It owns no storage: callers
//! hand in records and persist what comes back.

pub mod config;
pub mod errors;
pub mod investments;
pub mod portfolio;
pub mod sync;

pub use config::{SyncConfig, SyncSettings};
pub use investments::{Investment, InvestmentType};
pub use portfolio::{allocation_by_type, valuate, PortfolioTotals, TypeAllocation};
pub use sync::{ItemOutcome, ItemState, SyncFailure, SyncOrchestrator, SyncReport};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
