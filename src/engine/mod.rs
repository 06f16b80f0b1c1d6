//! Waveform Engine Module
//!
//! The controller never renders or decodes audio itself. It drives an
//! external waveform engine through the [`WaveformEngine`] trait and receives
//! the engine's lifecycle callbacks as [`EngineEvent`]s tagged with the
//! [`LoadTicket`] of the load that produced them.

mod mock;

pub use mock::{EngineCommand, MockEngine};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generation token identifying one load attempt
///
/// Every `load`/`reset` issues a fresh ticket. Events carrying any other
/// ticket belong to a superseded load and are dropped by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// The ticket issued after this one
    pub fn next(self) -> Self {
        LoadTicket(self.0 + 1)
    }

    /// Raw generation number
    pub fn generation(self) -> u64 {
        self.0
    }
}

impl Default for LoadTicket {
    fn default() -> Self {
        LoadTicket(1)
    }
}

impl fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "load#{}", self.0)
    }
}

/// Typed handle returned when the engine's region overlay plugin is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionOverlayHandle(pub u32);

/// Visual styling forwarded to the engine at load time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformStyle {
    pub height: u32,
    pub wave_color: String,
    pub progress_color: String,
    pub cursor_color: String,
    pub bar_width: u32,
    pub bar_radius: u32,
}

impl Default for WaveformStyle {
    fn default() -> Self {
        Self {
            height: 120,
            wave_color: "#8b5cf6".to_string(),
            progress_color: "#7c3aed".to_string(),
            cursor_color: "#fbbf24".to_string(),
            bar_width: 2,
            bar_radius: 1,
        }
    }
}

/// Construction options for one engine load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineOptions {
    /// Presentation container the engine renders into
    pub container: String,
    pub style: WaveformStyle,
    /// Initial zoom in pixels per second
    pub min_px_per_sec: f64,
}

/// A region as pushed to the engine's overlay plugin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayRegion {
    pub id: String,
    pub start: f64,
    pub end: f64,
    pub color: &'static str,
    pub content: String,
    pub draggable: bool,
    pub resizable: bool,
}

/// Lifecycle callbacks emitted by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Audio decoded; duration is now known
    Ready { duration: f64 },
    /// Load progress in percent
    LoadProgress { percent: f64 },
    /// Load or runtime failure
    Error { message: String },
    Play,
    Pause,
    /// Playback reached the end of the stream
    Finish,
    /// Playback position tick in seconds
    TimeUpdate { position: f64 },
    /// Zoom changed inside the engine (e.g. mouse wheel)
    ZoomChanged { pixels_per_second: f64 },
}

impl EngineEvent {
    /// Short event name for logging
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::Ready { .. } => "ready",
            EngineEvent::LoadProgress { .. } => "load_progress",
            EngineEvent::Error { .. } => "error",
            EngineEvent::Play => "play",
            EngineEvent::Pause => "pause",
            EngineEvent::Finish => "finish",
            EngineEvent::TimeUpdate { .. } => "time_update",
            EngineEvent::ZoomChanged { .. } => "zoom_changed",
        }
    }
}

/// Commands the controller issues to the external waveform engine
///
/// Implementations deliver their callbacks back through
/// `PlaybackController::handle_engine_event`, tagged with the ticket passed
/// to [`WaveformEngine::load`].
pub trait WaveformEngine {
    /// Start loading `source_url`; completion arrives later as an event
    fn load(&mut self, ticket: LoadTicket, source_url: &str, options: &EngineOptions);

    /// Toggle playback
    fn play_pause(&mut self);

    /// Seek to a fraction of the duration in `0.0..=1.0`
    fn seek_to_fraction(&mut self, fraction: f64);

    /// Set zoom in pixels per second
    fn zoom(&mut self, pixels_per_second: f64);

    /// Duration reported by the engine, 0 when unknown
    fn duration(&self) -> f64;

    /// Current playback time reported by the engine
    fn current_time(&self) -> f64;

    /// Drop every callback subscription belonging to `ticket`
    fn detach(&mut self, ticket: LoadTicket);

    /// Release the engine and everything it renders
    fn destroy(&mut self);

    /// Register the region overlay plugin, if the engine has one
    fn register_region_overlay(&mut self) -> Option<RegionOverlayHandle>;

    fn add_overlay_region(&mut self, overlay: RegionOverlayHandle, region: &OverlayRegion);

    fn clear_overlay_regions(&mut self, overlay: RegionOverlayHandle);

    /// Regions currently shown by the overlay
    fn overlay_regions(&self, overlay: RegionOverlayHandle) -> Vec<OverlayRegion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_sequence() {
        let first = LoadTicket::default();
        let second = first.next();
        assert_ne!(first, second);
        assert_eq!(second.generation(), first.generation() + 1);
        assert_eq!(format!("{}", first), "load#1");
    }

    #[test]
    fn test_engine_event_json() {
        let event: EngineEvent =
            serde_json::from_str(r#"{"type":"ready","duration":40.0}"#).unwrap();
        assert_eq!(event, EngineEvent::Ready { duration: 40.0 });
        assert_eq!(event.name(), "ready");

        let event: EngineEvent = serde_json::from_str(r#"{"type":"finish"}"#).unwrap();
        assert_eq!(event, EngineEvent::Finish);
    }

    #[test]
    fn test_default_style() {
        let style = WaveformStyle::default();
        assert_eq!(style.height, 120);
        assert_eq!(style.bar_width, 2);
    }
}
