//! Dream interpretation domain types.

pub mod model;

pub use model::{ChatMessage, ChatRole, Interpretation};
