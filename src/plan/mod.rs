//! Fit-batch planning core.
//!
//! Responsibilities:
//!
//! - count free parameters and pad the point count for parallel reduction
//! - bound fits-per-block by the device's thread-occupancy limit
//! - bound the per-launch chunk size by memory, block count, overflow safety,
//!   and the total workload, then declutter it to a round number
//!
//! The planner performs no device allocation and no fitting; it only derives
//! the sizes and counts the fitting engine uses to allocate and launch.

pub mod memory;
pub mod occupancy;
pub mod planner;

pub use memory::*;
pub use occupancy::*;
pub use planner::*;

#[cfg(test)]
pub mod test_support;

/// Planning failure, distinguishable by kind.
///
/// `UnsatisfiableMemory` is fatal and non-retryable: if a single fit's
/// working set does not fit in device memory, no chunking strategy helps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    UnsatisfiableMemory {
        /// Bytes required to hold one fit's working set.
        required_bytes: usize,
        /// Free device memory reported by the probe.
        available_bytes: usize,
    },
    InvalidConfig(String),
}

impl std::fmt::Display for PlanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanError::UnsatisfiableMemory {
                required_bytes,
                available_bytes,
            } => write!(
                f,
                "Not enough free device memory: one fit needs {required_bytes} B, \
                 {available_bytes} B available."
            ),
            PlanError::InvalidConfig(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for PlanError {}

impl From<PlanError> for crate::error::AppError {
    fn from(err: PlanError) -> Self {
        let exit_code = match err {
            PlanError::UnsatisfiableMemory { .. } => 3,
            PlanError::InvalidConfig(_) => 2,
        };
        crate::error::AppError::new(exit_code, err.to_string())
    }
}
