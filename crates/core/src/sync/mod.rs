//! Investment price synchronization.

mod orchestrator;
mod report;


pub use orchestrator::SyncOrchestrator;
pub use report::{AttemptSummary, ItemOutcome, ItemState, SkippedItem, SyncFailure, SyncReport};
