//! Playback state and its transition table
//!
//! ```text
//! Uninitialized --load--> Loading --ready--> Ready <--> Playing <--> Paused
//!                            |                 \          |          /
//!                     timeout/error             +---runtime error---+
//!                            v                            v
//!                          Error <------------------------+
//!                            |
//!                          reset --> Loading
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of the controlled playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    /// No source has been provided yet
    #[default]
    Uninitialized,
    /// Waiting for the engine to report ready, an error, or the timeout
    Loading,
    /// Duration known, not yet played
    Ready,
    Playing,
    Paused,
    /// Load or runtime failure; leave only via `reset`
    Error,
}

impl PlaybackStatus {
    /// Whether the audio duration is known in this status
    pub fn has_duration(&self) -> bool {
        matches!(
            self,
            PlaybackStatus::Ready | PlaybackStatus::Playing | PlaybackStatus::Paused
        )
    }

    /// Whether `next` is a legal transition from this status
    ///
    /// `Loading` is reachable from `Error` and the ready family only through
    /// `reset`, which is the only caller allowed to pass `via_reset = true`.
    pub fn can_transition_to(&self, next: PlaybackStatus, via_reset: bool) -> bool {
        use PlaybackStatus::*;
        match (self, next) {
            (Uninitialized, Loading) => true,
            (Loading, Ready) | (Loading, Error) => true,
            (Ready, Playing) | (Paused, Playing) => true,
            (Playing, Paused) => true,
            (Ready, Error) | (Playing, Error) | (Paused, Error) => true,
            (Error, Loading) | (Ready, Loading) | (Playing, Loading) | (Paused, Loading) => {
                via_reset
            }
            _ => false,
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackStatus::Uninitialized => write!(f, "Uninitialized"),
            PlaybackStatus::Loading => write!(f, "Loading"),
            PlaybackStatus::Ready => write!(f, "Ready"),
            PlaybackStatus::Playing => write!(f, "Playing"),
            PlaybackStatus::Paused => write!(f, "Paused"),
            PlaybackStatus::Error => write!(f, "Error"),
        }
    }
}

/// Snapshot-able playback state owned by the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub position_seconds: f64,
    /// 0 until the engine reports ready
    pub duration_seconds: f64,
    pub zoom_pixels_per_second: f64,
    /// Present only while `status == Error`
    pub error_message: Option<String>,
    pub load_progress_percent: f64,
    pub source_url: Option<String>,
}

impl PlaybackState {
    pub fn new(zoom_pixels_per_second: f64) -> Self {
        Self {
            status: PlaybackStatus::Uninitialized,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            zoom_pixels_per_second,
            error_message: None,
            load_progress_percent: 0.0,
            source_url: None,
        }
    }

    /// Duration in seconds once known
    pub fn known_duration(&self) -> Option<f64> {
        if self.duration_seconds > 0.0 {
            Some(self.duration_seconds)
        } else {
            None
        }
    }

    /// Clamp a position into `[0, duration]`
    pub fn clamp_position(&self, seconds: f64) -> f64 {
        seconds.clamp(0.0, self.duration_seconds.max(0.0))
    }

    /// Playhead as a fraction of the duration, 0 when the duration is unknown
    pub fn progress_fraction(&self) -> f64 {
        match self.known_duration() {
            Some(duration) => (self.position_seconds / duration).clamp(0.0, 1.0),
            None => 0.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn is_loading(&self) -> bool {
        self.status == PlaybackStatus::Loading
    }
}
