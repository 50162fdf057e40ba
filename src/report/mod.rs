//! Formatted terminal output for plans and device profiles.
//!
//! We keep formatting code in one place so:
//! - the planning/math code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::FitConfig;
use crate::plan::{ChunkDecision, Plan};
use crate::probe::DeviceLimits;

/// Format the full plan summary (problem + device + derived plan).
pub fn format_plan_summary(
    config: &FitConfig,
    limits: &DeviceLimits,
    plan: &Plan,
    trace: &ChunkDecision,
) -> String {
    let mut out = String::new();

    out.push_str("=== fitplan - Fit Batch Plan ===\n");
    out.push_str(&format!(
        "Model: {} (id={}) | Estimator: {}\n",
        config.model.display_name(),
        config.model.id(),
        config.estimator.display_name()
    ));
    out.push_str(&format!(
        "Problem: fits={} | points/fit={} | parameters={} (free={}) | weights={}\n",
        config.total_fit_count,
        config.point_count,
        config.parameter_count,
        plan.free_parameter_count,
        if config.uses_weights { "yes" } else { "no" }
    ));
    out.push_str(&format!(
        "Device: threads/block={} | blocks={} | memory={} B\n",
        limits.max_threads_per_block, limits.max_blocks, limits.available_memory_bytes
    ));

    out.push_str("\nDerived plan:\n");
    out.push_str(&format!(
        "- padded points   : {} (power of two >= {})\n",
        plan.padded_point_count, config.point_count
    ));
    out.push_str(&format!(
        "- free parameters : {}\n",
        plan.free_parameter_count
    ));
    out.push_str(&format!("- fits per block  : {}\n", plan.fits_per_block));
    out.push_str(&format!("- max chunk size  : {}\n", plan.max_chunk_size));
    out.push_str(&format!(
        "- per-fit memory  : {} B\n",
        trace.one_fit_memory
    ));
    out.push_str(&format!(
        "- launches        : {}\n",
        format_launch_schedule(config.total_fit_count, plan.max_chunk_size)
    ));

    out
}

/// Format a probed device profile.
pub fn format_limits(limits: &DeviceLimits) -> String {
    let mut out = String::new();
    out.push_str("=== fitplan - Device Profile ===\n");
    out.push_str(&format!(
        "- threads/block : {}\n",
        limits.max_threads_per_block
    ));
    out.push_str(&format!("- blocks        : {}\n", limits.max_blocks));
    out.push_str(&format!(
        "- free memory   : {} B\n",
        limits.available_memory_bytes
    ));
    out
}

/// Describe how the engine will iterate the workload in chunks.
fn format_launch_schedule(total_fit_count: usize, max_chunk_size: usize) -> String {
    let full = total_fit_count / max_chunk_size;
    let remainder = total_fit_count % max_chunk_size;
    match (full, remainder) {
        (full, 0) => format!("{full} ({full} x {max_chunk_size})"),
        (0, remainder) => format!("1 (1 x {remainder})"),
        (full, remainder) => format!(
            "{} ({full} x {max_chunk_size} + 1 x {remainder})",
            full + 1
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Planner;
    use crate::plan::test_support::{gauss1d_config, wide_limits};

    #[test]
    fn launch_schedule_covers_exact_and_remainder_splits() {
        assert_eq!(format_launch_schedule(1_000_000, 500_000), "2 (2 x 500000)");
        assert_eq!(
            format_launch_schedule(1_000_000, 800_000),
            "2 (1 x 800000 + 1 x 200000)"
        );
        assert_eq!(format_launch_schedule(137, 200_000), "1 (1 x 137)");
    }

    #[test]
    fn summary_mentions_the_headline_quantities() {
        let config = gauss1d_config();
        let limits = wide_limits();
        let planner = Planner::new(config, limits).unwrap();
        let plan = planner.configure().unwrap();
        let trace = planner.configure_with_trace().unwrap();

        let summary = format_plan_summary(planner.config(), planner.limits(), &plan, &trace);
        assert!(summary.contains("GAUSS_1D"));
        assert!(summary.contains("max chunk size"));
        assert!(summary.contains(&plan.max_chunk_size.to_string()));
    }
}
