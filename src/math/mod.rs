//! Small integer utilities shared by the planning pipeline.

pub mod scale;

pub use scale::*;
