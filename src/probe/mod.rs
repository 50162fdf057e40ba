//! Device capability probe.
//!
//! The planner treats the probed limits as authoritative: one query per
//! planning session, no retries, no averaging. The probe is the only seam
//! that reaches outside pure arithmetic, so it sits behind a trait:
//!
//! - `StaticProbe` wraps known limits (tests, embedding inside an engine
//!   that already queried its runtime)
//! - `EnvProbe` reads limits from the environment, which is how the CLI is
//!   pointed at a device profile without linking an accelerator runtime

use serde::{Deserialize, Serialize};

use crate::error::AppError;

const ENV_MAX_THREADS: &str = "FITPLAN_MAX_THREADS";
const ENV_MAX_BLOCKS: &str = "FITPLAN_MAX_BLOCKS";
const ENV_AVAILABLE_MEMORY: &str = "FITPLAN_AVAILABLE_MEMORY";

/// Hardware limits of the selected accelerator device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLimits {
    /// Maximum threads schedulable in one execution block.
    pub max_threads_per_block: usize,
    /// Maximum concurrently schedulable blocks (grid dimension limit).
    pub max_blocks: usize,
    /// Free device memory available to the fitting engine, in bytes.
    pub available_memory_bytes: usize,
}

impl DeviceLimits {
    /// Conservative defaults matching a common discrete accelerator:
    /// 1024 threads/block, 2^31-1 schedulable blocks, 1 GiB free memory.
    pub fn defaults() -> Self {
        Self {
            max_threads_per_block: 1024,
            max_blocks: 2_147_483_647,
            available_memory_bytes: 1 << 30,
        }
    }
}

/// One-shot device capability query.
pub trait DeviceProbe {
    fn query(&self) -> Result<DeviceLimits, AppError>;
}

/// Probe returning fixed, already-known limits.
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe {
    pub limits: DeviceLimits,
}

impl DeviceProbe for StaticProbe {
    fn query(&self) -> Result<DeviceLimits, AppError> {
        Ok(self.limits)
    }
}

/// Probe reading a device profile from the environment.
///
/// Recognized variables (all optional, defaults from `DeviceLimits::defaults`):
///
/// - `FITPLAN_MAX_THREADS` — threads per block
/// - `FITPLAN_MAX_BLOCKS` — schedulable blocks
/// - `FITPLAN_AVAILABLE_MEMORY` — free device memory in bytes
///
/// A variable that is set but not a positive integer is a probe failure, not
/// a silent fallback to the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProbe;

impl DeviceProbe for EnvProbe {
    fn query(&self) -> Result<DeviceLimits, AppError> {
        dotenvy::dotenv().ok();
        let defaults = DeviceLimits::defaults();
        Ok(DeviceLimits {
            max_threads_per_block: read_env_limit(ENV_MAX_THREADS, defaults.max_threads_per_block)?,
            max_blocks: read_env_limit(ENV_MAX_BLOCKS, defaults.max_blocks)?,
            available_memory_bytes: read_env_limit(
                ENV_AVAILABLE_MEMORY,
                defaults.available_memory_bytes,
            )?,
        })
    }
}

fn read_env_limit(name: &str, default: usize) -> Result<usize, AppError> {
    match std::env::var(name) {
        Ok(raw) => {
            let value: usize = raw
                .trim()
                .parse()
                .map_err(|_| AppError::new(3, format!("{name} is not a valid integer: '{raw}'")))?;
            if value == 0 {
                return Err(AppError::new(3, format!("{name} must be positive")));
            }
            Ok(value)
        }
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(AppError::new(3, format!("Failed to read {name}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_probe_returns_its_limits() {
        let limits = DeviceLimits {
            max_threads_per_block: 256,
            max_blocks: 1000,
            available_memory_bytes: 1 << 20,
        };
        let probed = StaticProbe { limits }.query().unwrap();
        assert_eq!(probed, limits);
    }

    #[test]
    fn env_probe_rejects_malformed_or_zero_values() {
        // `set_var` is process-global, so this single test owns every
        // mutation of the FITPLAN_* variables.
        unsafe { std::env::set_var(ENV_MAX_THREADS, "abc") };
        let err = EnvProbe.query().unwrap_err();
        assert_eq!(err.exit_code(), 3);

        unsafe { std::env::set_var(ENV_MAX_THREADS, "0") };
        let err = EnvProbe.query().unwrap_err();
        assert_eq!(err.exit_code(), 3);

        unsafe { std::env::set_var(ENV_MAX_THREADS, "512") };
        let limits = EnvProbe.query().unwrap();
        assert_eq!(limits.max_threads_per_block, 512);
        // Untouched variables fall back to the defaults.
        assert_eq!(limits.max_blocks, DeviceLimits::defaults().max_blocks);

        unsafe { std::env::remove_var(ENV_MAX_THREADS) };
    }

    #[test]
    fn defaults_are_positive() {
        let d = DeviceLimits::defaults();
        assert!(d.max_threads_per_block > 0);
        assert!(d.max_blocks > 0);
        assert!(d.available_memory_bytes > 0);
    }
}
