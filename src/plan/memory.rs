//! Memory-bounded chunk-size planning.
//!
//! The fitting engine keeps, per resident fit: the input data (and weights,
//! when supplied), current and trial parameter vectors, gradient and step
//! vectors over the free parameters, a Hessian-like matrix over the free
//! parameters, a model-evaluation buffer (derivatives per point), and a few
//! scalars (chi-square, lambda, iteration/state counters). The chunk size is
//! the largest fit count whose combined working set stays inside the probed
//! free memory, further clamped by the device's block limit, by overflow
//! safety of the engine's own size arithmetic, and by the total workload.

use crate::domain::FitConfig;
use crate::math::round_down_to_decade;
use crate::plan::PlanError;
use crate::probe::DeviceLimits;

/// Device float width. The engine computes in single precision.
const FLOAT_SIZE: usize = size_of::<f32>();
/// Device integer width (state, iteration and finished flags).
const INT_SIZE: usize = size_of::<i32>();

/// Per-fit scalar floats: chi-square, previous chi-square, lambda, degrees term.
const SCALAR_FLOATS: usize = 4;
/// Per-fit scalar ints: state, iteration counter, finished flag.
const SCALAR_INTS: usize = 3;

/// Chunk-size decision with every clamp stage recorded.
///
/// Stages are monotonically non-increasing from `raw_quotient` down to
/// `max_chunk_size`; the trace exists for reporting and debug bundles, the
/// engine only reads the final value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDecision {
    /// Byte footprint of one resident fit.
    pub one_fit_memory: usize,
    /// Largest per-fit multiplier in the engine's internal size arithmetic.
    pub highest_factor: usize,
    /// `available_memory_bytes / one_fit_memory`.
    pub raw_quotient: usize,
    /// After clamping to the device block limit.
    pub after_block_clamp: usize,
    /// After clamping so `chunk * highest_factor` cannot wrap `usize`.
    pub after_overflow_clamp: usize,
    /// After rounding down to a power-of-ten magnitude.
    pub after_declutter: usize,
    /// After the final clamp to the total workload.
    pub max_chunk_size: usize,
}

/// Byte footprint of all per-fit buffers the fitting engine allocates.
pub fn one_fit_memory(config: &FitConfig, free_parameter_count: usize) -> usize {
    let points = config.point_count;
    let parameters = config.parameter_count;
    let free = free_parameter_count;

    let mut bytes = FLOAT_SIZE
        * (2 * points
            + 2 * parameters
            + 2 * free
            + free * free
            + points * parameters
            + SCALAR_FLOATS)
        + INT_SIZE * SCALAR_INTS;

    if config.uses_weights {
        bytes += FLOAT_SIZE * points;
    }

    bytes
}

/// Largest per-fit multiplier appearing in the engine's buffer-size
/// arithmetic: the Hessian-decomposition workspace when any parameter is
/// free, otherwise the model-evaluation buffer.
pub fn highest_factor(config: &FitConfig, free_parameter_count: usize) -> usize {
    if free_parameter_count > 0 {
        config.point_count * free_parameter_count * free_parameter_count * FLOAT_SIZE
    } else {
        config.point_count * config.parameter_count
    }
}

/// Compute the chunk size through the full clamp pipeline.
///
/// Fails with `PlanError::UnsatisfiableMemory` when not even one fit's
/// working set fits in the probed free memory; every other stage is total.
pub fn plan_chunk(
    config: &FitConfig,
    free_parameter_count: usize,
    limits: &DeviceLimits,
) -> Result<ChunkDecision, PlanError> {
    let per_fit = one_fit_memory(config, free_parameter_count);

    let raw_quotient = limits.available_memory_bytes / per_fit;
    if raw_quotient == 0 {
        return Err(PlanError::UnsatisfiableMemory {
            required_bytes: per_fit,
            available_bytes: limits.available_memory_bytes,
        });
    }

    let after_block_clamp = raw_quotient.min(limits.max_blocks);

    // Guard the engine's downstream `chunk * highest_factor` multiplication
    // from wrapping.
    let factor = highest_factor(config, free_parameter_count);
    let after_overflow_clamp = after_block_clamp.min(usize::MAX / factor);

    let after_declutter = round_down_to_decade(after_overflow_clamp);

    let max_chunk_size = after_declutter.min(config.total_fit_count);

    Ok(ChunkDecision {
        one_fit_memory: per_fit,
        highest_factor: factor,
        raw_quotient,
        after_block_clamp,
        after_overflow_clamp,
        after_declutter,
        max_chunk_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::test_support::{gauss1d_config, wide_limits};

    fn reference_config() -> FitConfig {
        // The worked example: 50 points, 3 parameters, all free, 1M fits,
        // no weights.
        let mut config = gauss1d_config();
        config.point_count = 50;
        config.parameter_count = 3;
        config.free_parameter_mask = vec![true; 3];
        config.total_fit_count = 1_000_000;
        config.uses_weights = false;
        config
    }

    #[test]
    fn one_fit_memory_matches_hand_computation() {
        let config = reference_config();
        // 4 * (2*50 + 2*3 + 2*3 + 9 + 150 + 4) + 4*3 = 4*275 + 12
        assert_eq!(one_fit_memory(&config, 3), 1112);

        let mut weighted = config;
        weighted.uses_weights = true;
        assert_eq!(one_fit_memory(&weighted, 3), 1112 + 4 * 50);
    }

    #[test]
    fn user_info_size_is_tracked_but_not_charged() {
        // The engine uploads user info once per launch, not per resident
        // fit, so growing it must not shrink the chunk.
        let base = reference_config();
        let mut with_user_info = base.clone();
        with_user_info.user_info_size = 1 << 20;

        assert_eq!(
            one_fit_memory(&with_user_info, 3),
            one_fit_memory(&base, 3)
        );

        let limits = wide_limits();
        assert_eq!(
            plan_chunk(&with_user_info, 3, &limits).unwrap(),
            plan_chunk(&base, 3, &limits).unwrap()
        );
    }

    #[test]
    fn chunk_is_decluttered_and_clamped_to_workload() {
        let config = reference_config();
        let mut limits = wide_limits();
        limits.available_memory_bytes = 1_000_000_000;

        let decision = plan_chunk(&config, 3, &limits).unwrap();
        assert_eq!(decision.raw_quotient, 1_000_000_000 / 1112);
        assert_eq!(decision.after_declutter, 800_000);
        assert_eq!(decision.max_chunk_size, 800_000);
        assert!(decision.max_chunk_size <= config.total_fit_count);
    }

    #[test]
    fn block_limit_binds_before_decluttering() {
        let config = reference_config();
        let mut limits = wide_limits();
        limits.available_memory_bytes = 1_000_000_000;
        limits.max_blocks = 65_535;

        let decision = plan_chunk(&config, 3, &limits).unwrap();
        assert_eq!(decision.after_block_clamp, 65_535);
        assert_eq!(decision.max_chunk_size, 60_000);
    }

    #[test]
    fn unsatisfiable_memory_is_a_hard_error() {
        let config = reference_config();
        let mut limits = wide_limits();
        limits.available_memory_bytes = 1000; // below one_fit_memory = 1112

        let err = plan_chunk(&config, 3, &limits).unwrap_err();
        assert_eq!(
            err,
            PlanError::UnsatisfiableMemory {
                required_bytes: 1112,
                available_bytes: 1000,
            }
        );
    }

    #[test]
    fn overflow_clamp_keeps_size_arithmetic_in_range() {
        // Large free-parameter count and point count make highest_factor
        // dominate one_fit_memory, so the raw quotient on a huge memory
        // figure would wrap the downstream multiplication without the clamp.
        let mut config = gauss1d_config();
        config.point_count = 10_000;
        config.parameter_count = 100;
        config.free_parameter_mask = vec![true; 100];
        config.total_fit_count = usize::MAX;

        let mut limits = wide_limits();
        limits.available_memory_bytes = usize::MAX;
        limits.max_blocks = usize::MAX;

        let decision = plan_chunk(&config, 100, &limits).unwrap();
        assert!(decision.after_overflow_clamp < decision.after_block_clamp);
        assert!(
            decision
                .max_chunk_size
                .checked_mul(decision.highest_factor)
                .is_some()
        );
    }

    #[test]
    fn no_free_parameters_is_a_valid_degenerate_case() {
        let mut config = reference_config();
        config.free_parameter_mask = vec![false; 3];
        let limits = wide_limits();

        let decision = plan_chunk(&config, 0, &limits).unwrap();
        assert_eq!(decision.highest_factor, 50 * 3);
        assert!(decision.max_chunk_size >= 1);
    }

    #[test]
    fn clamp_stages_are_monotone_non_increasing() {
        let config = reference_config();
        for memory in [1112usize, 10_000, 1_000_000, 1_000_000_000] {
            for blocks in [1usize, 100, 65_535, usize::MAX] {
                let limits = DeviceLimits {
                    max_threads_per_block: 1024,
                    max_blocks: blocks,
                    available_memory_bytes: memory,
                };
                let d = plan_chunk(&config, 3, &limits).unwrap();
                assert!(d.after_block_clamp <= d.raw_quotient);
                assert!(d.after_overflow_clamp <= d.after_block_clamp);
                assert!(d.after_declutter <= d.after_overflow_clamp);
                assert!(d.max_chunk_size <= d.after_declutter);
                assert!(d.max_chunk_size >= 1);
            }
        }
    }
}
