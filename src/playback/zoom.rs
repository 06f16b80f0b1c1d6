//! Zoom bounds and stepping

use serde::Serialize;

/// Zoom limits and step factor, in pixels per second
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomPolicy {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ZoomPolicy {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Clamp any input into `[min, max]`; NaN maps to `min`
    pub fn clamp(&self, pixels_per_second: f64) -> f64 {
        if pixels_per_second.is_nan() {
            return self.min;
        }
        pixels_per_second.clamp(self.min, self.max)
    }

    pub fn zoom_in(&self, current: f64) -> f64 {
        self.clamp(current * self.step)
    }

    pub fn zoom_out(&self, current: f64) -> f64 {
        self.clamp(current / self.step)
    }

    /// Zoom that fits `min(duration, window)` seconds into `viewport_px`
    ///
    /// Returns `None` when nothing sensible can be computed (unknown
    /// duration or empty window).
    pub fn fit_window(&self, viewport_px: f64, duration: f64, window: f64) -> Option<f64> {
        let visible = duration.min(window);
        if visible <= 0.0 || viewport_px <= 0.0 {
            return None;
        }
        Some(self.clamp(viewport_px / visible))
    }
}
