mod loader;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::renderer::Shading;

pub use loader::load_config;

/// Longest pause accepted between frames
pub const MAX_FRAME_INTERVAL_MS: u64 = 60 * 60 * 1000;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Frame pacing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnimationConfig {
    /// Pause after each frame, in milliseconds
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Stop after this many frames; run forever when unset
    #[serde(default)]
    pub frames: Option<u64>,
}

// ~33 fps
fn default_frame_interval_ms() -> u64 {
    30
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            frames: None,
        }
    }
}

impl AnimationConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Rendering options
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Render rows on the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default)]
    pub shading: Shading,
}

fn default_parallel() -> bool {
    true
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            shading: Shading::default(),
        }
    }
}

impl AppConfig {
    /// Load and validate configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Use the given file, or built-in defaults when no path is supplied
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.animation.frame_interval_ms > MAX_FRAME_INTERVAL_MS {
            return Err(ConfigError::Validation(format!(
                "animation.frame_interval_ms must be at most {} (got {})",
                MAX_FRAME_INTERVAL_MS, self.animation.frame_interval_ms
            )));
        }
        if self.animation.frames == Some(0) {
            return Err(ConfigError::Validation(
                "animation.frames must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
