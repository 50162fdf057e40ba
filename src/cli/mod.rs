//! Command-line parsing for the fit-batch planner.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the planning/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{EstimatorId, ModelId};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fitplan", version, about = "Batch planner for accelerator curve fitting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the execution plan for a fitting workload and print it.
    Plan(PlanArgs),
    /// Print the device limits the planner would use (env profile + overrides).
    Probe(ProbeArgs),
}

/// Options describing the fitting workload and the device profile.
#[derive(Debug, Parser, Clone)]
pub struct PlanArgs {
    /// Data points per individual fit.
    #[arg(short = 'n', long)]
    pub points: usize,

    /// Total number of independent fits in the workload.
    #[arg(short = 'f', long)]
    pub fits: usize,

    /// Fit model (defines the default parameter count).
    #[arg(short = 'm', long, value_enum, default_value_t = ModelId::Gauss1d)]
    pub model: ModelId,

    /// Override the model's parameter count (custom models).
    #[arg(short = 'p', long)]
    pub parameters: Option<usize>,

    /// Zero-based indices of parameters held fixed during fitting (repeatable).
    #[arg(long = "fix", value_name = "INDEX")]
    pub fixed: Vec<usize>,

    /// Fit estimator.
    #[arg(short = 'e', long, value_enum, default_value_t = EstimatorId::Lse)]
    pub estimator: EstimatorId,

    /// A per-point weight array is supplied to the engine.
    #[arg(short = 'w', long)]
    pub weights: bool,

    /// Size in bytes of the opaque per-fit user-info buffer.
    #[arg(long, default_value_t = 0)]
    pub user_info_size: usize,

    /// Solver iteration cap (forwarded to the engine).
    #[arg(long, default_value_t = 25)]
    pub max_iterations: usize,

    /// Solver convergence tolerance (forwarded to the engine).
    #[arg(long, default_value_t = 1e-4)]
    pub tolerance: f32,

    /// Export the plan (inputs + derived quantities) to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Write a markdown debug bundle with the full clamp trace.
    #[arg(long)]
    pub debug_bundle: bool,

    #[command(flatten)]
    pub device: DeviceArgs,
}

/// Device-profile overrides; unset values come from the environment
/// (`FITPLAN_*` variables) or conservative defaults.
#[derive(Debug, Parser, Clone)]
pub struct DeviceArgs {
    /// Maximum threads per execution block.
    #[arg(long)]
    pub max_threads: Option<usize>,

    /// Maximum concurrently schedulable blocks.
    #[arg(long)]
    pub max_blocks: Option<usize>,

    /// Free device memory in bytes.
    #[arg(long)]
    pub memory: Option<usize>,
}

/// Options for probing the device profile.
#[derive(Debug, Parser)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
}
