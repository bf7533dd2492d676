//! Designer configuration.

use crate::history::DEFAULT_MAX_HISTORY;
use crate::layout::{DEFAULT_CONTAINER, FALLBACK_ASPECT_RATIO};
use crate::markers::{BoundsDefaults, RoleDefaults};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables for the layout designer. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignerConfig {
    /// Maximum number of undo steps.
    pub max_history: usize,
    /// Content aspect ratio (height / width) when no image is loaded.
    pub fallback_aspect_ratio: f64,
    /// Container size before the first measurement.
    pub default_container: Size,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom factor per zoom step.
    pub zoom_step: f64,
    /// Return to the pointer tool after placing a marker.
    pub revert_to_pointer_after_place: bool,
    /// Keyboard nudge distance in percent.
    pub nudge_step: f64,
    pub seat_defaults: BoundsDefaults,
    pub section_defaults: BoundsDefaults,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            fallback_aspect_ratio: FALLBACK_ASPECT_RATIO,
            default_container: DEFAULT_CONTAINER,
            min_zoom: 0.25,
            max_zoom: 5.0,
            zoom_step: 1.2,
            revert_to_pointer_after_place: false,
            nudge_step: 0.5,
            seat_defaults: BoundsDefaults::SEAT,
            section_defaults: BoundsDefaults::SECTION,
        }
    }
}

impl DesignerConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        log::info!("Loaded designer config from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as pretty JSON.
    pub fn save_to_file(&self, path: &Path) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn role_defaults(&self) -> RoleDefaults {
        RoleDefaults {
            seat: self.seat_defaults,
            section: self.section_defaults,
        }
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> ConfigResult<()> {
        fn positive(key: &'static str, value: f64) -> ConfigResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    key,
                    reason: format!("must be a positive number, got {value}"),
                })
            }
        }

        if self.max_history == 0 {
            return Err(ConfigError::Invalid {
                key: "maxHistory",
                reason: "must be at least 1".to_string(),
            });
        }
        positive("fallbackAspectRatio", self.fallback_aspect_ratio)?;
        positive("defaultContainer.width", self.default_container.width)?;
        positive("defaultContainer.height", self.default_container.height)?;
        positive("minZoom", self.min_zoom)?;
        positive("maxZoom", self.max_zoom)?;
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::Invalid {
                key: "minZoom",
                reason: format!("{} exceeds maxZoom {}", self.min_zoom, self.max_zoom),
            });
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(ConfigError::Invalid {
                key: "zoomStep",
                reason: format!("must be greater than 1, got {}", self.zoom_step),
            });
        }
        positive("nudgeStep", self.nudge_step)?;
        for (key, defaults) in [
            ("seatDefaults", &self.seat_defaults),
            ("sectionDefaults", &self.section_defaults),
        ] {
            let sizes = [defaults.radius, defaults.width, defaults.height];
            if sizes.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "sizes must be finite and non-negative".to_string(),
                });
            }
        }
        Ok(())
    }
}
