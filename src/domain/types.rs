//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during planning
//! - exported to JSON for downstream tooling
//! - reloaded later for comparing plans across devices or runs

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::plan::Plan;
use crate::probe::DeviceLimits;

/// Fit model identifier, forwarded verbatim to the fitting engine.
///
/// The planner never interprets the model; the enum exists so the CLI can
/// default `parameter_count` from the model's well-known parameter layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ModelId {
    /// 1D Gaussian: amplitude, center, width, offset.
    Gauss1d,
    /// 2D symmetric Gaussian: amplitude, center x/y, width, offset.
    Gauss2d,
    /// 2D elliptic Gaussian: amplitude, center x/y, width x/y, offset.
    Gauss2dElliptic,
    /// 2D rotated elliptic Gaussian: elliptic parameters plus rotation angle.
    Gauss2dRotated,
    /// 2D elliptic Cauchy (Lorentzian).
    Cauchy2dElliptic,
    /// Straight line: offset, slope.
    Linear1d,
}

impl ModelId {
    /// Wire identifier understood by the fitting engine.
    pub fn id(self) -> u32 {
        match self {
            ModelId::Gauss1d => 0,
            ModelId::Gauss2d => 1,
            ModelId::Gauss2dElliptic => 2,
            ModelId::Gauss2dRotated => 3,
            ModelId::Cauchy2dElliptic => 4,
            ModelId::Linear1d => 5,
        }
    }

    /// Number of model parameters (free and fixed combined).
    pub fn parameter_count(self) -> usize {
        match self {
            ModelId::Gauss1d => 4,
            ModelId::Gauss2d => 5,
            ModelId::Gauss2dElliptic => 6,
            ModelId::Gauss2dRotated => 7,
            ModelId::Cauchy2dElliptic => 6,
            ModelId::Linear1d => 2,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ModelId::Gauss1d => "GAUSS_1D",
            ModelId::Gauss2d => "GAUSS_2D",
            ModelId::Gauss2dElliptic => "GAUSS_2D_ELLIPTIC",
            ModelId::Gauss2dRotated => "GAUSS_2D_ROTATED",
            ModelId::Cauchy2dElliptic => "CAUCHY_2D_ELLIPTIC",
            ModelId::Linear1d => "LINEAR_1D",
        }
    }
}

impl std::fmt::Display for ModelId {
    /// Matches the CLI value spelling so clap can render defaults.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            ModelId::Gauss1d => "gauss1d",
            ModelId::Gauss2d => "gauss2d",
            ModelId::Gauss2dElliptic => "gauss2d-elliptic",
            ModelId::Gauss2dRotated => "gauss2d-rotated",
            ModelId::Cauchy2dElliptic => "cauchy2d-elliptic",
            ModelId::Linear1d => "linear1d",
        };
        write!(f, "{value}")
    }
}

/// Fit estimator identifier, forwarded verbatim to the fitting engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorId {
    /// Least squares.
    Lse,
    /// Maximum likelihood (Poisson).
    Mle,
}

impl EstimatorId {
    /// Wire identifier understood by the fitting engine.
    pub fn id(self) -> u32 {
        match self {
            EstimatorId::Lse => 0,
            EstimatorId::Mle => 1,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            EstimatorId::Lse => "LSE",
            EstimatorId::Mle => "MLE",
        }
    }
}

impl std::fmt::Display for EstimatorId {
    /// Matches the CLI value spelling so clap can render defaults.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            EstimatorId::Lse => "lse",
            EstimatorId::Mle => "mle",
        };
        write!(f, "{value}")
    }
}

/// Caller-facing fit configuration, set once per planning session.
///
/// `model`, `estimator`, `max_iterations`, `tolerance` and `user_info_size`
/// are passthroughs for the fitting engine; only the counts, the mask and the
/// weights flag enter the planning arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    /// Data points per individual fit.
    pub point_count: usize,
    /// Total model parameters (free and fixed combined).
    pub parameter_count: usize,
    /// Per-parameter flag: `true` means the parameter varies during fitting.
    ///
    /// Must have length `parameter_count`. An all-false mask is a valid
    /// (degenerate) configuration with zero free parameters.
    pub free_parameter_mask: Vec<bool>,
    /// Total number of independent fits in the workload.
    pub total_fit_count: usize,
    /// Whether a per-point weight array is supplied (adds one float buffer per fit).
    pub uses_weights: bool,
    /// Model identifier (opaque to the planner).
    pub model: ModelId,
    /// Estimator identifier (opaque to the planner).
    pub estimator: EstimatorId,
    /// Size in bytes of the opaque per-fit user-info buffer.
    ///
    /// Tracked for the engine; not charged into the per-fit memory formula
    /// because the engine uploads it once, not per resident fit.
    pub user_info_size: usize,
    /// Solver iteration cap, forwarded to the fitting engine.
    pub max_iterations: usize,
    /// Solver convergence tolerance, forwarded to the fitting engine.
    pub tolerance: f32,
}

impl FitConfig {
    /// Number of `true` entries in the free-parameter mask.
    pub fn free_parameter_count(&self) -> usize {
        crate::math::count_free_parameters(&self.free_parameter_mask)
    }
}

/// Portable plan export schema: inputs plus the derived plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanFile {
    pub tool: String,
    /// RFC 3339 timestamp of when the plan was computed.
    pub generated: String,
    pub config: FitConfig,
    pub limits: DeviceLimits,
    pub plan: Plan,
}
