pub mod env;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Re-export section config types
pub use crate::entity::MotionConfig;
pub use crate::filter::FilterConfig;
pub use crate::registry::{RegistryConfig, MAX_PRUNE_INTERVAL_SECONDS};
pub use crate::tracker::RenderConfig;

/// Complete tracker configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

impl TrackerConfig {
    /// Reject values that would break filtering or the tracker loop
    pub fn validate(&self) -> Result<()> {
        let max_jump = self.filter.max_jump_distance;
        ensure!(
            max_jump.is_finite() && max_jump >= 0.0,
            "filter.max_jump_distance must be finite and >= 0, got {}",
            max_jump
        );

        let smoothing = self.filter.smoothing_factor;
        ensure!(
            (0.0..=1.0).contains(&smoothing),
            "filter.smoothing_factor must be within [0, 1], got {}",
            smoothing
        );

        let min_movement = self.motion.min_movement;
        ensure!(
            min_movement.is_finite() && min_movement >= 0.0,
            "motion.min_movement must be finite and >= 0, got {}",
            min_movement
        );

        ensure!(
            self.registry.prune_interval_seconds <= MAX_PRUNE_INTERVAL_SECONDS,
            "registry.prune_interval_seconds must be <= {}, got {}",
            MAX_PRUNE_INTERVAL_SECONDS,
            self.registry.prune_interval_seconds
        );

        Ok(())
    }
}

/// Load and validate configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<TrackerConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: TrackerConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}
