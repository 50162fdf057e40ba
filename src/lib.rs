//! `fit-plan` library crate.
//!
//! The binary (`fitplan`) is a thin wrapper around this library so that:
//!
//! - planning logic is testable without spawning processes
//! - modules are reusable (e.g., embedding the planner inside a fitting engine)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plan;
pub mod probe;
pub mod report;
