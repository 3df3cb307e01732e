//! Background synchronization.

pub mod engine;

pub use engine::{DrainReport, SyncEngine};
