//! Callscope - Compliance-Annotated Call Playback
//!
//! Callscope drives a waveform display for recorded calls and overlays the
//! compliance findings a reviewer has to look at.
//!
//! # Architecture
//!
//! - [`playback::PlaybackController`]: single source of truth for playback
//!   state, zoom and regions. Commands go in, engine callbacks are folded in.
//! - [`engine::WaveformEngine`]: the seam to whatever renders the waveform.
//!   [`engine::MockEngine`] records commands for tests and replays.
//! - [`regions`]: compliance regions, bounds validation and pixel layout.
//! - [`records`]: call list and call detail value objects.
//! - [`session`]: deterministic replay of scripted sessions.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod playback;
pub mod records;
pub mod regions;
pub mod session;
pub mod timecode;

pub use config::ControllerConfig;
pub use engine::{EngineEvent, LoadTicket, MockEngine, WaveformEngine};
pub use error::{Result, ReviewError};
pub use events::{ControllerEvent, SubscriptionId};
pub use playback::{ControllerSnapshot, PlaybackController, PlaybackState, PlaybackStatus};
pub use regions::{ComplianceKind, ComplianceRegion, RegionDraft};
