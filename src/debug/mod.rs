//! Debug bundle writer for inspecting a planning session.
//!
//! The bundle records everything needed to explain a chunk size after the
//! fact: the inputs, the per-fit memory breakdown, each clamp stage, and the
//! occupancy candidate table.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::error::AppError;
use crate::plan::{
    ChunkDecision, FITS_PER_BLOCK_CANDIDATES, Plan, Planner, one_fit_memory,
};

pub fn write_debug_bundle(
    planner: &Planner,
    plan: &Plan,
    trace: &ChunkDecision,
) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    create_dir_all(&dir).map_err(|e| AppError::new(2, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("plan_debug_{ts}.md"));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(2, format!("Failed to create debug file: {e}")))?;

    let config = planner.config();
    let limits = planner.limits();

    writeln!(file, "# fitplan debug bundle")
        .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(file, "- generated: {}", Local::now().to_rfc3339())
        .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(
        file,
        "- model: {} (id={}) | estimator: {}",
        config.model.display_name(),
        config.model.id(),
        config.estimator.display_name()
    )
    .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(
        file,
        "- problem: fits={} points={} parameters={} free={} weights={} user_info={}B",
        config.total_fit_count,
        config.point_count,
        config.parameter_count,
        plan.free_parameter_count,
        config.uses_weights,
        config.user_info_size
    )
    .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(
        file,
        "- device: threads/block={} blocks={} memory={}B",
        limits.max_threads_per_block, limits.max_blocks, limits.available_memory_bytes
    )
    .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;

    writeln!(file, "\n## Per-fit memory")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    write_memory_breakdown(&mut file, config, plan)?;
    writeln!(file, "| total | {} |", trace.one_fit_memory)
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;

    writeln!(file, "\n## Chunk clamp stages")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    writeln!(file, "| stage | chunk |")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    writeln!(file, "| - | - |")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    for (stage, value) in [
        ("memory quotient", trace.raw_quotient),
        ("block clamp", trace.after_block_clamp),
        ("overflow clamp", trace.after_overflow_clamp),
        ("declutter", trace.after_declutter),
        ("workload clamp", trace.max_chunk_size),
    ] {
        writeln!(file, "| {stage} | {value} |")
            .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    }
    writeln!(file, "- highest_factor: {}", trace.highest_factor)
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;

    writeln!(file, "\n## Occupancy candidates (chunk={})", plan.max_chunk_size)
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    writeln!(file, "| fits/block | divisible | threads | budget | accepted |")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    writeln!(file, "| - | - | - | - | - |")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    let budget = limits.max_threads_per_block / 4;
    for candidate in FITS_PER_BLOCK_CANDIDATES {
        let divisible = plan.max_chunk_size % candidate == 0;
        let threads = candidate * config.point_count;
        let accepted = candidate == plan.fits_per_block;
        writeln!(
            file,
            "| {candidate} | {divisible} | {threads} | {budget} | {} |",
            if accepted { "*" } else { "" }
        )
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    }

    writeln!(file, "\n## Derived plan")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    writeln!(file, "- padded_point_count: {}", plan.padded_point_count)
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    writeln!(file, "- free_parameter_count: {}", plan.free_parameter_count)
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    writeln!(file, "- fits_per_block: {}", plan.fits_per_block)
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    writeln!(file, "- max_chunk_size: {}", plan.max_chunk_size)
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;

    Ok(path)
}

fn write_memory_breakdown(
    file: &mut File,
    config: &crate::domain::FitConfig,
    plan: &Plan,
) -> Result<(), AppError> {
    let points = config.point_count;
    let parameters = config.parameter_count;
    let free = plan.free_parameter_count;
    let float = size_of::<f32>();
    let int = size_of::<i32>();

    writeln!(file, "| buffer | bytes |")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    writeln!(file, "| - | - |")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;

    let mut rows = vec![
        ("data + model values", 2 * points * float),
        ("parameters (current + trial)", 2 * parameters * float),
        ("gradient + step (free)", 2 * free * float),
        ("hessian (free x free)", free * free * float),
        ("derivatives (points x parameters)", points * parameters * float),
        ("scalar floats (chi2, lambda, ...)", 4 * float),
        ("scalar ints (state, iteration, done)", 3 * int),
    ];
    if config.uses_weights {
        rows.push(("weights", points * float));
    }
    for (label, bytes) in rows {
        writeln!(file, "| {label} | {bytes} |")
            .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    }

    // The rows above must always reproduce the formula the planner uses.
    debug_assert_eq!(
        {
            let sum: usize = [
                2 * points * float,
                2 * parameters * float,
                2 * free * float,
                free * free * float,
                points * parameters * float,
                4 * float,
                3 * int,
            ]
            .iter()
            .sum();
            sum + if config.uses_weights { points * float } else { 0 }
        },
        one_fit_memory(config, free)
    );

    Ok(())
}
