//! Read/write plan JSON files.
//!
//! Plan JSON is the "portable" representation of a planning session:
//! - the caller's fit configuration
//! - the device limits the plan was computed against
//! - the derived plan itself
//!
//! The schema is defined by `domain::PlanFile`. Downstream tooling (or a
//! fitting engine on another host) can reload the file and check whether the
//! plan is still valid for its device.

use std::fs::File;
use std::path::Path;

use crate::domain::{FitConfig, PlanFile};
use crate::error::AppError;
use crate::plan::Plan;
use crate::probe::DeviceLimits;

/// Write a plan JSON file.
pub fn write_plan_json(
    path: &Path,
    config: &FitConfig,
    limits: &DeviceLimits,
    plan: &Plan,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create plan JSON '{}': {e}", path.display())))?;

    let plan_file = PlanFile {
        tool: "fitplan".to_string(),
        generated: chrono::Local::now().to_rfc3339(),
        config: config.clone(),
        limits: *limits,
        plan: *plan,
    };

    serde_json::to_writer_pretty(file, &plan_file)
        .map_err(|e| AppError::new(2, format!("Failed to write plan JSON: {e}")))?;

    Ok(())
}

/// Read a plan JSON file.
pub fn read_plan_json(path: &Path) -> Result<PlanFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open plan JSON '{}': {e}", path.display())))?;
    let plan_file: PlanFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid plan JSON: {e}")))?;
    Ok(plan_file)
}
