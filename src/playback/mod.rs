//! Playback Module
//!
//! Annotated playback controller and its building blocks:
//! - Playback status state machine
//! - Load timeout timer and clock sources
//! - Zoom bounds and stepping

mod controller;
mod state;
mod timeout;
mod zoom;

pub use controller::{ControllerSnapshot, PlaybackController};
pub use state::{PlaybackState, PlaybackStatus};
pub use timeout::{Clock, LoadTimer, ManualClock, SystemClock};
pub use zoom::ZoomPolicy;
