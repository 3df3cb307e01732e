//! Journal entry domain types.

pub mod model;

pub use model::{Draft, JournalEntry};
