//! Collector configuration
//!
//! All values default to the tuned constants the collector ships with. A
//! config can be loaded from JSON; missing sections and fields fall back to
//! those defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SignalError;

/// Upper bound on waiting for the host to become idle
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 1200;

/// Delay used when the host cannot signal idleness
pub const DEFAULT_FALLBACK_DELAY_MS: u64 = 300;

/// Minimum outer/inner gap (px) that counts as a docked devtools panel
pub const DEFAULT_DEVTOOLS_BASE_THRESHOLD_PX: u32 = 160;

/// Fraction of the smaller outer dimension used as the dynamic threshold
pub const DEFAULT_DEVTOOLS_THRESHOLD_RATIO: f64 = 0.12;

/// Devtools sampling period
pub const DEFAULT_DEVTOOLS_SAMPLE_INTERVAL_MS: u64 = 1000;

/// Viewports narrower than this are never suspected
pub const DEFAULT_SMALL_VIEWPORT_WIDTH: u32 = 700;

/// Viewports shorter than this are never suspected
pub const DEFAULT_SMALL_VIEWPORT_HEIGHT: u32 = 500;

/// Top-level collector configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub scheduler: SchedulerConfig,
    pub devtools: DevToolsConfig,
}

/// When the one-shot signal collection starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum wait for the host's idle signal
    pub idle_timeout_ms: u64,
    /// Flat delay when the host has no idle signal
    pub fallback_delay_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            fallback_delay_ms: DEFAULT_FALLBACK_DELAY_MS,
        }
    }
}

impl SchedulerConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }
}

/// Devtools heuristic tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevToolsConfig {
    /// Fixed floor for the gap threshold, in CSS pixels
    pub base_threshold_px: u32,
    /// Ratio of the smaller outer dimension that scales the threshold
    pub threshold_ratio: f64,
    /// Sampling period
    pub sample_interval_ms: u64,
    /// Inner width below which the viewport counts as small
    pub small_viewport_width: u32,
    /// Inner height below which the viewport counts as small
    pub small_viewport_height: u32,
}

impl Default for DevToolsConfig {
    fn default() -> Self {
        Self {
            base_threshold_px: DEFAULT_DEVTOOLS_BASE_THRESHOLD_PX,
            threshold_ratio: DEFAULT_DEVTOOLS_THRESHOLD_RATIO,
            sample_interval_ms: DEFAULT_DEVTOOLS_SAMPLE_INTERVAL_MS,
            small_viewport_width: DEFAULT_SMALL_VIEWPORT_WIDTH,
            small_viewport_height: DEFAULT_SMALL_VIEWPORT_HEIGHT,
        }
    }
}

impl DevToolsConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

impl CollectorConfig {
    /// Parse and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, SignalError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty JSON
    pub fn to_json(&self) -> Result<String, SignalError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.scheduler.idle_timeout_ms == 0 {
            return Err(SignalError::InvalidConfig(
                "scheduler.idle_timeout_ms must be positive".to_string(),
            ));
        }
        if self.devtools.sample_interval_ms == 0 {
            // tokio intervals panic on a zero period
            return Err(SignalError::InvalidConfig(
                "devtools.sample_interval_ms must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.devtools.threshold_ratio) {
            return Err(SignalError::InvalidConfig(format!(
                "devtools.threshold_ratio must be within [0, 1], got {}",
                self.devtools.threshold_ratio
            )));
        }
        Ok(())
    }
}
