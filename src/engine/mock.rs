//! In-memory waveform engine
//!
//! Records every command it receives instead of rendering anything. Used by
//! the replay runner and by tests to assert exactly which engine calls the
//! controller made.

use std::collections::BTreeSet;

use log::debug;
use serde::Serialize;

use super::{EngineOptions, LoadTicket, OverlayRegion, RegionOverlayHandle, WaveformEngine};

/// A command received by [`MockEngine`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EngineCommand {
    Load {
        ticket: LoadTicket,
        source_url: String,
        min_px_per_sec: f64,
    },
    PlayPause,
    SeekToFraction { fraction: f64 },
    Zoom { pixels_per_second: f64 },
    Detach { ticket: LoadTicket },
    Destroy,
    RegisterRegionOverlay,
    AddOverlayRegion { id: String },
    ClearOverlayRegions,
}

/// Engine double that records commands and keeps a fake playhead
#[derive(Debug, Clone)]
pub struct MockEngine {
    commands: Vec<EngineCommand>,
    duration: f64,
    current_time: f64,
    with_overlay: bool,
    overlay: Option<RegionOverlayHandle>,
    overlay_regions: Vec<OverlayRegion>,
    attached: BTreeSet<LoadTicket>,
    destroyed: bool,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    /// Create an engine with a region overlay plugin available
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            duration: 0.0,
            current_time: 0.0,
            with_overlay: true,
            overlay: None,
            overlay_regions: Vec::new(),
            attached: BTreeSet::new(),
            destroyed: false,
        }
    }

    /// Create an engine without a region overlay plugin
    pub fn without_overlay() -> Self {
        Self {
            with_overlay: false,
            ..Self::new()
        }
    }

    /// Pretend the engine decoded audio of this length
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }

    /// Pretend the playhead moved on its own during playback
    pub fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    /// Every command received so far, in order
    pub fn commands(&self) -> &[EngineCommand] {
        &self.commands
    }

    /// Number of commands received so far
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Tickets whose callbacks are still attached
    pub fn attached_tickets(&self) -> Vec<LoadTicket> {
        self.attached.iter().copied().collect()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl WaveformEngine for MockEngine {
    fn load(&mut self, ticket: LoadTicket, source_url: &str, options: &EngineOptions) {
        debug!("[MOCK-ENGINE] load {} ({})", source_url, ticket);
        self.attached.insert(ticket);
        self.duration = 0.0;
        self.current_time = 0.0;
        self.commands.push(EngineCommand::Load {
            ticket,
            source_url: source_url.to_string(),
            min_px_per_sec: options.min_px_per_sec,
        });
    }

    fn play_pause(&mut self) {
        self.commands.push(EngineCommand::PlayPause);
    }

    fn seek_to_fraction(&mut self, fraction: f64) {
        self.current_time = fraction * self.duration;
        self.commands.push(EngineCommand::SeekToFraction { fraction });
    }

    fn zoom(&mut self, pixels_per_second: f64) {
        self.commands.push(EngineCommand::Zoom { pixels_per_second });
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn detach(&mut self, ticket: LoadTicket) {
        self.attached.remove(&ticket);
        self.commands.push(EngineCommand::Detach { ticket });
    }

    fn destroy(&mut self) {
        self.attached.clear();
        self.overlay_regions.clear();
        self.destroyed = true;
        self.commands.push(EngineCommand::Destroy);
    }

    fn register_region_overlay(&mut self) -> Option<RegionOverlayHandle> {
        self.commands.push(EngineCommand::RegisterRegionOverlay);
        if !self.with_overlay {
            return None;
        }
        let handle = RegionOverlayHandle(1);
        self.overlay = Some(handle);
        Some(handle)
    }

    fn add_overlay_region(&mut self, overlay: RegionOverlayHandle, region: &OverlayRegion) {
        if self.overlay == Some(overlay) {
            self.overlay_regions.push(region.clone());
        }
        self.commands.push(EngineCommand::AddOverlayRegion {
            id: region.id.clone(),
        });
    }

    fn clear_overlay_regions(&mut self, overlay: RegionOverlayHandle) {
        if self.overlay == Some(overlay) {
            self.overlay_regions.clear();
        }
        self.commands.push(EngineCommand::ClearOverlayRegions);
    }

    fn overlay_regions(&self, overlay: RegionOverlayHandle) -> Vec<OverlayRegion> {
        if self.overlay == Some(overlay) {
            self.overlay_regions.clone()
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::WaveformStyle;

    fn options() -> EngineOptions {
        EngineOptions {
            container: "waveform".to_string(),
            style: WaveformStyle::default(),
            min_px_per_sec: 50.0,
        }
    }

    #[test]
    fn test_records_commands_in_order() {
        let mut engine = MockEngine::new();
        let ticket = LoadTicket::default();
        engine.load(ticket, "call.mp3", &options());
        engine.play_pause();
        engine.zoom(75.0);

        assert_eq!(engine.command_count(), 3);
        assert_eq!(engine.commands()[1], EngineCommand::PlayPause);
        assert_eq!(engine.attached_tickets(), vec![ticket]);
    }

    #[test]
    fn test_seek_moves_playhead() {
        let mut engine = MockEngine::new();
        engine.set_duration(40.0);
        engine.seek_to_fraction(0.5);
        assert_eq!(engine.current_time(), 20.0);
    }

    #[test]
    fn test_overlay_unavailable() {
        let mut engine = MockEngine::without_overlay();
        assert!(engine.register_region_overlay().is_none());
    }

    #[test]
    fn test_detach_and_destroy() {
        let mut engine = MockEngine::new();
        let ticket = LoadTicket::default();
        engine.load(ticket, "call.mp3", &options());
        engine.detach(ticket);
        assert!(engine.attached_tickets().is_empty());

        engine.destroy();
        assert!(engine.is_destroyed());
    }
}
