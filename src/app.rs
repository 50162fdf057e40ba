//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the device profile (env probe + flag overrides)
//! - runs the planning pipeline
//! - prints the plan report
//! - writes optional exports / debug bundles

use clap::Parser;

use crate::cli::{Command, DeviceArgs, PlanArgs, ProbeArgs};
use crate::domain::FitConfig;
use crate::error::AppError;
use crate::plan::Planner;
use crate::probe::{DeviceLimits, DeviceProbe, EnvProbe};

/// Entry point for the `fitplan` binary.
pub fn run() -> Result<(), AppError> {
    // We want `fitplan -n 50 -f 1000000` to behave like `fitplan plan ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Plan(args) => handle_plan(args),
        Command::Probe(args) => handle_probe(args),
    }
}

fn handle_plan(args: PlanArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args)?;
    let limits = resolve_limits(&args.device)?;

    let planner = Planner::new(config, limits).map_err(AppError::from)?;
    let plan = planner.configure().map_err(AppError::from)?;
    let trace = planner.configure_with_trace().map_err(AppError::from)?;

    println!(
        "{}",
        crate::report::format_plan_summary(planner.config(), planner.limits(), &plan, &trace)
    );

    if let Some(path) = &args.export {
        crate::io::export::write_plan_json(path, planner.config(), planner.limits(), &plan)?;
    }
    if args.debug_bundle {
        let path = crate::debug::write_debug_bundle(&planner, &plan, &trace)?;
        println!("Debug bundle written to {}", path.display());
    }

    Ok(())
}

fn handle_probe(args: ProbeArgs) -> Result<(), AppError> {
    let limits = resolve_limits(&args.device)?;
    println!("{}", crate::report::format_limits(&limits));
    Ok(())
}

/// Build the fit configuration from CLI arguments.
///
/// The free-parameter mask starts all-true and clears the `--fix` indices;
/// an index outside the parameter range is a configuration error, not a
/// silent no-op.
pub fn fit_config_from_args(args: &PlanArgs) -> Result<FitConfig, AppError> {
    let parameter_count = args.parameters.unwrap_or(args.model.parameter_count());

    let mut free_parameter_mask = vec![true; parameter_count];
    for &index in &args.fixed {
        if index >= parameter_count {
            return Err(AppError::new(
                2,
                format!("--fix {index} is out of range (model has {parameter_count} parameters)."),
            ));
        }
        free_parameter_mask[index] = false;
    }

    Ok(FitConfig {
        point_count: args.points,
        parameter_count,
        free_parameter_mask,
        total_fit_count: args.fits,
        uses_weights: args.weights,
        model: args.model,
        estimator: args.estimator,
        user_info_size: args.user_info_size,
        max_iterations: args.max_iterations,
        tolerance: args.tolerance,
    })
}

/// Probe the environment for a device profile, then apply flag overrides.
fn resolve_limits(device: &DeviceArgs) -> Result<DeviceLimits, AppError> {
    let mut limits = EnvProbe.query()?;
    if let Some(threads) = device.max_threads {
        limits.max_threads_per_block = threads;
    }
    if let Some(blocks) = device.max_blocks {
        limits.max_blocks = blocks;
    }
    if let Some(memory) = device.memory {
        limits.available_memory_bytes = memory;
    }
    Ok(limits)
}

/// Rewrite argv so `fitplan` defaults to `fitplan plan`.
///
/// Rules:
/// - `fitplan`                     -> `fitplan plan` (help for missing args)
/// - `fitplan -n 50 ...`           -> `fitplan plan -n 50 ...`
/// - `fitplan --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("plan".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "plan" | "probe");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "plan flags".
    if arg1.starts_with('-') {
        argv.insert(1, "plan".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
