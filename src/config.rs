//! Controller configuration
//!
//! Loaded from JSON; every field except `source_url` has a default.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::WaveformStyle;
use crate::error::{Result, ReviewError};
use crate::playback::ZoomPolicy;
use crate::regions::RegionDraft;

/// Default load timeout in milliseconds
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 15_000;

/// Default viewport width used to fit the visible window
pub const DEFAULT_VIEWPORT_WIDTH_PX: f64 = 800.0;

pub const DEFAULT_MIN_ZOOM: f64 = 10.0;
pub const DEFAULT_MAX_ZOOM: f64 = 1000.0;
pub const DEFAULT_ZOOM: f64 = 50.0;

/// Factor applied by one zoom-in/zoom-out step
pub const DEFAULT_ZOOM_STEP: f64 = 1.2;

/// Seconds moved by the skip-forward/backward buttons
pub const DEFAULT_SKIP_SECONDS: f64 = 10.0;

/// Configuration of one playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub source_url: String,
    pub load_timeout_ms: u64,
    /// When set, initial zoom fits this many seconds into the viewport
    pub max_visible_window_seconds: Option<f64>,
    pub viewport_width_px: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub default_zoom: f64,
    pub zoom_step: f64,
    pub skip_seconds: f64,
    /// Presentation container handed to the engine
    pub container: String,
    pub style: WaveformStyle,
    /// Regions present from construction
    pub regions: Vec<RegionDraft>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            source_url: String::new(),
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
            max_visible_window_seconds: None,
            viewport_width_px: DEFAULT_VIEWPORT_WIDTH_PX,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            default_zoom: DEFAULT_ZOOM,
            zoom_step: DEFAULT_ZOOM_STEP,
            skip_seconds: DEFAULT_SKIP_SECONDS,
            container: "waveform".to_string(),
            style: WaveformStyle::default(),
            regions: Vec::new(),
        }
    }
}

impl ControllerConfig {
    /// Default configuration for a source
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Self::default()
        }
    }

    pub fn with_load_timeout_ms(mut self, ms: u64) -> Self {
        self.load_timeout_ms = ms;
        self
    }

    pub fn with_visible_window(mut self, seconds: f64) -> Self {
        self.max_visible_window_seconds = Some(seconds);
        self
    }

    pub fn with_region(mut self, region: RegionDraft) -> Self {
        self.regions.push(region);
        self
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ControllerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ReviewError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&content)
    }

    /// Reject configurations the controller cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.source_url.trim().is_empty() {
            return Err(ReviewError::config("source_url is required"));
        }
        if self.load_timeout_ms == 0 {
            return Err(ReviewError::config("load_timeout_ms must be positive"));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom.is_finite()) {
            return Err(ReviewError::config("min_zoom must be positive"));
        }
        if !(self.max_zoom >= self.min_zoom && self.max_zoom.is_finite()) {
            return Err(ReviewError::config("max_zoom must be at least min_zoom"));
        }
        if !(self.zoom_step > 1.0 && self.zoom_step.is_finite()) {
            return Err(ReviewError::config("zoom_step must be greater than 1"));
        }
        if !(self.viewport_width_px > 0.0 && self.viewport_width_px.is_finite()) {
            return Err(ReviewError::config("viewport_width_px must be positive"));
        }
        if !(self.skip_seconds > 0.0 && self.skip_seconds.is_finite()) {
            return Err(ReviewError::config("skip_seconds must be positive"));
        }
        if let Some(window) = self.max_visible_window_seconds {
            if !(window > 0.0 && window.is_finite()) {
                return Err(ReviewError::config(
                    "max_visible_window_seconds must be positive",
                ));
            }
        }
        Ok(())
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn zoom_policy(&self) -> ZoomPolicy {
        ZoomPolicy::new(self.min_zoom, self.max_zoom, self.zoom_step)
    }
}
