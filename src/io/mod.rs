//! Input/output helpers.
//!
//! - plan JSON export/import (`export`)

pub mod export;

pub use export::*;
