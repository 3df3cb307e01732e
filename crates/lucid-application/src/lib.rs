//! Orchestration layer of the Lucid reconciliation core.
//!
//! Hosts the synchronization engine that drains the outbox and merges
//! remote snapshots into local state, and the orchestrating facade that
//! presentation code calls for all reads and writes.

pub mod journal_service;
pub mod sync;

pub use journal_service::JournalService;
pub use sync::{DrainReport, SyncEngine};

#[cfg(test)]
pub(crate) mod testing;
