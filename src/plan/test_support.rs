//! Shared fixtures for planner tests.

use crate::domain::{EstimatorId, FitConfig, ModelId};
use crate::probe::DeviceLimits;

/// A small, valid Gauss-1D configuration (4 parameters, all free).
pub fn gauss1d_config() -> FitConfig {
    FitConfig {
        point_count: 25,
        parameter_count: 4,
        free_parameter_mask: vec![true; 4],
        total_fit_count: 10_000,
        uses_weights: false,
        model: ModelId::Gauss1d,
        estimator: EstimatorId::Lse,
        user_info_size: 0,
        max_iterations: 25,
        tolerance: 1e-4,
    }
}

/// Generous device limits so that, unless a test narrows one of them, no
/// hardware bound binds before the workload clamp.
pub fn wide_limits() -> DeviceLimits {
    DeviceLimits {
        max_threads_per_block: 1024,
        max_blocks: 2_147_483_647,
        available_memory_bytes: 1 << 34,
    }
}
