//! The planning pipeline: configuration + device limits in, `Plan` out.
//!
//! One `Planner` instance serves exactly one planning session. The pipeline
//! order is fixed: pad the point count, count free parameters, bound the
//! chunk size, then pick fits-per-block for that chunk. The resulting `Plan`
//! is read-only; a new session takes a fresh planner.

use serde::{Deserialize, Serialize};

use crate::domain::FitConfig;
use crate::math::{count_free_parameters, next_power_of_two};
use crate::plan::{ChunkDecision, PlanError, fits_per_block, plan_chunk};
use crate::probe::DeviceLimits;

/// Derived execution plan consumed by the fitting engine.
///
/// The engine iterates `total_fit_count` in chunks no larger than
/// `max_chunk_size` and honors `fits_per_block` when building a full chunk's
/// execution blocks (use `Planner::fits_per_block_for` for a smaller trailing
/// chunk).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Count of mask entries that are `true`.
    pub free_parameter_count: usize,
    /// Smallest power of two `>= point_count`, for parallel reduction.
    pub padded_point_count: usize,
    /// Fits grouped into one execution block.
    pub fits_per_block: usize,
    /// Maximum fits per device launch.
    pub max_chunk_size: usize,
}

/// Fit-batch planner: owns one session's configuration and device limits.
#[derive(Debug)]
pub struct Planner {
    config: FitConfig,
    limits: DeviceLimits,
}

impl Planner {
    /// Validate the configuration and bind it to the probed limits.
    ///
    /// The planning arithmetic itself assumes these preconditions, so they
    /// are checked once here and surfaced as `PlanError::InvalidConfig`
    /// rather than left as undefined behavior.
    pub fn new(config: FitConfig, limits: DeviceLimits) -> Result<Self, PlanError> {
        if config.point_count == 0 {
            return Err(PlanError::InvalidConfig(
                "point_count must be positive (no fitting problem has zero points).".into(),
            ));
        }
        if config.parameter_count == 0 {
            return Err(PlanError::InvalidConfig(
                "parameter_count must be positive.".into(),
            ));
        }
        if config.free_parameter_mask.len() != config.parameter_count {
            return Err(PlanError::InvalidConfig(format!(
                "free_parameter_mask has {} entries, expected parameter_count = {}.",
                config.free_parameter_mask.len(),
                config.parameter_count
            )));
        }
        if config.total_fit_count == 0 {
            return Err(PlanError::InvalidConfig(
                "total_fit_count must be positive.".into(),
            ));
        }
        Ok(Self { config, limits })
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    pub fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    /// Run the full pipeline and derive the plan.
    ///
    /// Order: pad the point count, count free parameters, bound the chunk
    /// size, then pick fits-per-block for the chosen chunk.
    pub fn configure(&self) -> Result<Plan, PlanError> {
        let padded_point_count = next_power_of_two(self.config.point_count);
        let free_parameter_count = count_free_parameters(&self.config.free_parameter_mask);
        let decision = plan_chunk(&self.config, free_parameter_count, &self.limits)?;
        Ok(Plan {
            free_parameter_count,
            padded_point_count,
            fits_per_block: self.fits_per_block_for(decision.max_chunk_size),
            max_chunk_size: decision.max_chunk_size,
        })
    }

    /// Like `configure`, but returns the full chunk clamp trace
    /// (for reports and debug bundles).
    pub fn configure_with_trace(&self) -> Result<ChunkDecision, PlanError> {
        let free_parameter_count = count_free_parameters(&self.config.free_parameter_mask);
        plan_chunk(&self.config, free_parameter_count, &self.limits)
    }

    /// Occupancy search for a given chunk size.
    ///
    /// The engine calls this again for the final partial chunk, whose size is
    /// the workload remainder rather than `max_chunk_size`.
    pub fn fits_per_block_for(&self, current_chunk_size: usize) -> usize {
        fits_per_block(
            current_chunk_size,
            self.config.point_count,
            self.limits.max_threads_per_block,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::test_support::{gauss1d_config, wide_limits};

    #[test]
    fn configure_derives_all_four_quantities() {
        let mut config = gauss1d_config();
        config.point_count = 50;
        config.parameter_count = 3;
        config.free_parameter_mask = vec![true; 3];
        config.total_fit_count = 1_000_000;

        let mut limits = wide_limits();
        limits.available_memory_bytes = 1_000_000_000;

        let plan = Planner::new(config, limits).unwrap().configure().unwrap();
        assert_eq!(plan.free_parameter_count, 3);
        assert_eq!(plan.padded_point_count, 64);
        assert_eq!(plan.max_chunk_size, 800_000);
        // 8 divides 800_000 and 8 * 50 = 400 > 256, 4 * 50 = 200 < 256.
        assert_eq!(plan.fits_per_block, 4);
    }

    #[test]
    fn chunk_never_exceeds_workload_or_block_limit() {
        let mut config = gauss1d_config();
        config.total_fit_count = 137;
        let limits = wide_limits();

        let planner = Planner::new(config, limits).unwrap();
        let plan = planner.configure().unwrap();
        assert!(plan.max_chunk_size <= 137);
        assert!(plan.max_chunk_size <= limits.max_blocks);
    }

    #[test]
    fn fixed_parameters_reduce_the_free_count() {
        let mut config = gauss1d_config();
        config.free_parameter_mask = vec![true, false, true, false];

        let plan = Planner::new(config, wide_limits())
            .unwrap()
            .configure()
            .unwrap();
        assert_eq!(plan.free_parameter_count, 2);
    }

    #[test]
    fn trailing_chunk_gets_its_own_group_size() {
        let mut config = gauss1d_config();
        config.point_count = 16;
        config.free_parameter_mask = vec![true; 4];

        let planner = Planner::new(config, wide_limits()).unwrap();
        // A remainder of 6 is divisible by 2 but not by 8 or 4.
        assert_eq!(planner.fits_per_block_for(6), 2);
        assert_eq!(planner.fits_per_block_for(8), 8);
    }

    #[test]
    fn invalid_configurations_are_rejected_up_front() {
        let limits = wide_limits();

        let mut zero_points = gauss1d_config();
        zero_points.point_count = 0;
        assert!(matches!(
            Planner::new(zero_points, limits).unwrap_err(),
            PlanError::InvalidConfig(_)
        ));

        let mut short_mask = gauss1d_config();
        short_mask.free_parameter_mask = vec![true; 2];
        assert!(matches!(
            Planner::new(short_mask, limits).unwrap_err(),
            PlanError::InvalidConfig(_)
        ));

        let mut no_fits = gauss1d_config();
        no_fits.total_fit_count = 0;
        assert!(matches!(
            Planner::new(no_fits, limits).unwrap_err(),
            PlanError::InvalidConfig(_)
        ));
    }
}
