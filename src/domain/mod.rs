//! Domain types used throughout the planning pipeline.
//!
//! This module defines:
//!
//! - model/estimator identifier enums (`ModelId`, `EstimatorId`)
//! - the caller-facing fit configuration (`FitConfig`)
//! - the exportable plan file schema (`PlanFile`)

pub mod types;

pub use types::*;
