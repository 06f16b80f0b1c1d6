//! Annotated Playback Controller
//!
//! Single source of truth for playback and compliance-region state. User
//! commands are validated here and forwarded to the engine; engine callbacks
//! are folded into state through [`PlaybackController::handle_engine_event`].
//!
//! Load resolution is compare-and-set: the first of {timeout, ready, error}
//! to occur moves the controller out of `Loading`, and every later arrival is
//! ignored. Events tagged with a superseded [`LoadTicket`] are dropped.

use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::ControllerConfig;
use crate::engine::{EngineEvent, EngineOptions, LoadTicket, RegionOverlayHandle, WaveformEngine};
use crate::error::{Result, ReviewError};
use crate::events::{ControllerEvent, EventBus, SubscriptionId};
use crate::regions::{
    layout_regions, waveform_width_px, ComplianceRegion, RegionDraft, RegionLayout, RegionSet,
};
use crate::timecode::format_clock;

use super::state::{PlaybackState, PlaybackStatus};
use super::timeout::{Clock, LoadTimer, SystemClock};
use super::zoom::ZoomPolicy;

/// Read-only view of the controller handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerSnapshot {
    pub playback: PlaybackState,
    pub regions: Vec<ComplianceRegion>,
    pub layout: Vec<RegionLayout>,
    pub waveform_width_px: f64,
    /// `MM:SS` of the playhead
    pub position_label: String,
    /// `MM:SS` of the duration
    pub duration_label: String,
}

/// Controller mediating between review UI commands and a waveform engine
pub struct PlaybackController<E: WaveformEngine, C: Clock = SystemClock> {
    config: ControllerConfig,
    engine: E,
    clock: C,
    state: PlaybackState,
    regions: RegionSet,
    zoom: ZoomPolicy,
    timer: LoadTimer,
    /// Ticket of the load whose events are accepted
    ticket: Option<LoadTicket>,
    last_ticket: Option<LoadTicket>,
    overlay: Option<RegionOverlayHandle>,
    overlay_requested: bool,
    events: EventBus,
    disposed: bool,
}

impl<E: WaveformEngine> PlaybackController<E, SystemClock> {
    /// Create a controller driven by the wall clock
    pub fn with_system_clock(config: ControllerConfig, engine: E) -> Result<Self> {
        Self::new(config, engine, SystemClock::new())
    }
}

impl<E: WaveformEngine, C: Clock> PlaybackController<E, C> {
    /// Create an `Uninitialized` controller
    ///
    /// Regions listed in the configuration are accepted provisionally; call
    /// [`init`](Self::init) to start loading the configured source.
    pub fn new(config: ControllerConfig, engine: E, clock: C) -> Result<Self> {
        config.validate()?;

        let zoom = config.zoom_policy();
        let mut controller = Self {
            state: PlaybackState::new(zoom.clamp(config.default_zoom)),
            timer: LoadTimer::new(config.load_timeout()),
            regions: RegionSet::new(),
            zoom,
            engine,
            clock,
            ticket: None,
            last_ticket: None,
            overlay: None,
            overlay_requested: false,
            events: EventBus::new(),
            disposed: false,
            config,
        };

        for draft in controller.config.regions.clone() {
            controller.regions.insert(draft, None)?;
        }

        Ok(controller)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start loading the configured source
    pub fn init(&mut self) -> Result<()> {
        let source_url = self.config.source_url.clone();
        self.load(&source_url)
    }

    /// Start loading `source_url`
    ///
    /// Returns as soon as the engine has been asked to load; readiness
    /// arrives later as an engine event.
    pub fn load(&mut self, source_url: &str) -> Result<()> {
        self.ensure_live("load")?;
        if source_url.trim().is_empty() {
            return Err(ReviewError::invalid_argument("source URL must not be empty"));
        }
        if self.state.status != PlaybackStatus::Uninitialized {
            return Err(self.invalid_state("load"));
        }
        self.start_load(source_url);
        Ok(())
    }

    /// Abandon the current load and start again
    ///
    /// Cancels the pending timeout and detaches the old load's callbacks
    /// before anything else. Without `source_url` the current source is
    /// reloaded. Existing regions become provisional until the new duration
    /// is known.
    pub fn reset(&mut self, source_url: Option<&str>) -> Result<()> {
        self.ensure_live("reset")?;
        if self.state.status == PlaybackStatus::Uninitialized {
            return Err(self.invalid_state("reset"));
        }
        let source_url = match source_url {
            Some(url) if url.trim().is_empty() => {
                return Err(ReviewError::invalid_argument("source URL must not be empty"));
            }
            Some(url) => url.to_string(),
            None => self
                .state
                .source_url
                .clone()
                .unwrap_or_else(|| self.config.source_url.clone()),
        };

        self.timer.cancel();
        if let Some(old) = self.ticket.take() {
            debug!("[CONTROLLER] Detaching {}", old);
            self.engine.detach(old);
        }
        if let Some(overlay) = self.overlay {
            self.engine.clear_overlay_regions(overlay);
        }
        self.regions.mark_all_provisional();

        info!("[CONTROLLER] Reset, reloading {}", source_url);
        self.start_load(&source_url);
        Ok(())
    }

    /// Release the engine; every later command fails
    pub fn dispose(&mut self) -> Result<()> {
        self.ensure_live("dispose")?;

        self.timer.cancel();
        if let Some(ticket) = self.ticket.take() {
            self.engine.detach(ticket);
        }
        self.engine.destroy();
        self.overlay = None;
        self.regions.clear();

        self.events.emit(ControllerEvent::Disposed);
        self.events.clear();
        self.disposed = true;
        info!("[CONTROLLER] Disposed");
        Ok(())
    }

    /// Host event-loop hook: fire the load timeout if it is due
    pub fn poll(&mut self) {
        if self.disposed {
            return;
        }
        self.expire_if_due();
    }

    /// Time left before a pending load times out
    pub fn time_until_timeout(&self) -> Option<Duration> {
        if self.disposed || self.state.status != PlaybackStatus::Loading {
            return None;
        }
        self.timer.remaining(self.clock.now())
    }

    // ========================================================================
    // Engine callbacks
    // ========================================================================

    /// Fold an engine callback into controller state
    ///
    /// Events from a superseded load, events after dispose, and late load
    /// outcomes after the load was already resolved are ignored.
    pub fn handle_engine_event(&mut self, ticket: LoadTicket, event: EngineEvent) {
        if self.disposed {
            debug!("[CONTROLLER] Ignoring {} after dispose", event.name());
            return;
        }
        if self.ticket != Some(ticket) {
            debug!("[CONTROLLER] Ignoring {} from stale {}", event.name(), ticket);
            return;
        }

        // A deadline that passed before this event arrived wins the race
        self.expire_if_due();

        let status = self.state.status;
        match event {
            EngineEvent::Ready { duration } => {
                if status != PlaybackStatus::Loading {
                    debug!("[CONTROLLER] Late ready ignored in {}", status);
                    return;
                }
                self.timer.cancel();
                let duration = if usable_duration(duration) {
                    duration
                } else {
                    // Some engines fire ready before filling the event payload
                    let reported = self.engine.duration();
                    if !usable_duration(reported) {
                        self.fail(format!("engine reported unusable duration {}", duration));
                        return;
                    }
                    debug!(
                        "[CONTROLLER] Ready carried {}, using engine duration {:.3}s",
                        duration, reported
                    );
                    reported
                };
                self.become_ready(duration);
            }
            EngineEvent::LoadProgress { percent } => {
                if status == PlaybackStatus::Loading && percent.is_finite() {
                    self.state.load_progress_percent = percent.clamp(0.0, 100.0);
                    self.events.emit(ControllerEvent::LoadProgress {
                        percent: self.state.load_progress_percent,
                    });
                }
            }
            EngineEvent::Error { message } => match status {
                PlaybackStatus::Loading => {
                    self.timer.cancel();
                    self.fail(message);
                }
                PlaybackStatus::Ready | PlaybackStatus::Playing | PlaybackStatus::Paused => {
                    self.fail(message);
                }
                _ => debug!("[CONTROLLER] Error event ignored in {}", status),
            },
            EngineEvent::Play => {
                if matches!(status, PlaybackStatus::Ready | PlaybackStatus::Paused) {
                    self.set_status(PlaybackStatus::Playing);
                }
            }
            EngineEvent::Pause => {
                if status == PlaybackStatus::Playing {
                    self.sync_position_from_engine();
                    self.set_status(PlaybackStatus::Paused);
                }
            }
            EngineEvent::Finish => {
                if status == PlaybackStatus::Playing {
                    self.set_position(self.state.duration_seconds);
                    self.set_status(PlaybackStatus::Paused);
                }
            }
            EngineEvent::TimeUpdate { position } => {
                if status.has_duration() && position.is_finite() {
                    self.set_position(position);
                }
            }
            EngineEvent::ZoomChanged { pixels_per_second } => {
                // The engine already shows this zoom; do not echo it back
                self.store_zoom(pixels_per_second);
            }
        }
    }

    // ========================================================================
    // Playback commands
    // ========================================================================

    /// Toggle between playing and paused
    pub fn play_pause(&mut self) -> Result<PlaybackStatus> {
        self.ensure_live("play/pause")?;
        self.expire_if_due();

        let next = match self.state.status {
            PlaybackStatus::Ready | PlaybackStatus::Paused => PlaybackStatus::Playing,
            PlaybackStatus::Playing => PlaybackStatus::Paused,
            _ => return Err(self.invalid_state("play/pause")),
        };
        self.engine.play_pause();
        self.set_status(next);
        Ok(next)
    }

    /// Move the playhead by `delta_seconds`, clamped into `[0, duration]`
    pub fn skip(&mut self, delta_seconds: f64) -> Result<f64> {
        self.ensure_live("skip")?;
        self.require_duration("skip")?;
        if delta_seconds.is_nan() {
            return Err(ReviewError::invalid_argument("skip delta must be a number"));
        }
        let target = self.state.position_seconds + delta_seconds;
        Ok(self.seek_clamped(target))
    }

    pub fn skip_forward(&mut self) -> Result<f64> {
        self.skip(self.config.skip_seconds)
    }

    pub fn skip_backward(&mut self) -> Result<f64> {
        self.skip(-self.config.skip_seconds)
    }

    /// Jump to `position_seconds`, clamped into `[0, duration]`
    pub fn seek(&mut self, position_seconds: f64) -> Result<f64> {
        self.ensure_live("seek")?;
        self.require_duration("seek")?;
        if position_seconds.is_nan() {
            return Err(ReviewError::invalid_argument("seek position must be a number"));
        }
        Ok(self.seek_clamped(position_seconds))
    }

    /// Set zoom, clamped into the configured bounds
    pub fn set_zoom(&mut self, pixels_per_second: f64) -> Result<f64> {
        self.ensure_live("zoom")?;
        let zoom = self.store_zoom(pixels_per_second);
        if self.ticket.is_some() {
            self.engine.zoom(zoom);
        }
        Ok(zoom)
    }

    pub fn zoom_in(&mut self) -> Result<f64> {
        let target = self.zoom.zoom_in(self.state.zoom_pixels_per_second);
        self.set_zoom(target)
    }

    pub fn zoom_out(&mut self) -> Result<f64> {
        let target = self.zoom.zoom_out(self.state.zoom_pixels_per_second);
        self.set_zoom(target)
    }

    // ========================================================================
    // Region commands
    // ========================================================================

    /// Add a region; returns its id
    ///
    /// While the duration is unknown the region is accepted provisionally and
    /// may later be dropped with a `RegionRejected` event.
    pub fn add_region(&mut self, draft: RegionDraft) -> Result<String> {
        self.ensure_live("add region")?;
        let duration = self.known_duration();
        let id = self.regions.insert(draft, duration)?.id.clone();

        debug!(
            "[CONTROLLER] Region {} added{}",
            id,
            if duration.is_none() { " (provisional)" } else { "" }
        );
        self.events.emit(ControllerEvent::RegionAdded { id: id.clone() });
        self.sync_overlay();
        Ok(id)
    }

    /// Remove a region; returns whether it existed
    pub fn remove_region(&mut self, id: &str) -> Result<bool> {
        self.ensure_live("remove region")?;
        match self.regions.remove(id) {
            Some(region) => {
                self.events
                    .emit(ControllerEvent::RegionRemoved { id: region.id });
                self.sync_overlay();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Move a mutable region's bounds
    pub fn resize_region(&mut self, id: &str, start_seconds: f64, end_seconds: f64) -> Result<()> {
        self.ensure_live("resize region")?;
        let duration = self.known_duration();
        self.regions
            .resize(id, start_seconds, end_seconds, duration)?;

        self.events.emit(ControllerEvent::RegionResized {
            id: id.to_string(),
            start_seconds,
            end_seconds,
        });
        self.sync_overlay();
        Ok(())
    }

    pub fn clear_regions(&mut self) -> Result<()> {
        self.ensure_live("clear regions")?;
        self.regions.clear();
        self.events.emit(ControllerEvent::RegionsCleared);
        self.sync_overlay();
        Ok(())
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    pub fn subscribe<F>(&mut self, listener: F) -> Result<SubscriptionId>
    where
        F: FnMut(&ControllerEvent) + 'static,
    {
        self.ensure_live("subscribe")?;
        Ok(self.events.subscribe(listener))
    }

    /// Drop a subscription; returns whether it was registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Result<bool> {
        self.ensure_live("unsubscribe")?;
        Ok(self.events.unsubscribe(id))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn snapshot(&self) -> ControllerSnapshot {
        let zoom = self.state.zoom_pixels_per_second;
        ControllerSnapshot {
            playback: self.state.clone(),
            regions: self.regions.iter().cloned().collect(),
            layout: layout_regions(self.regions.iter(), zoom),
            waveform_width_px: waveform_width_px(self.state.duration_seconds, zoom),
            position_label: format_clock(self.state.position_seconds),
            duration_label: format_clock(self.state.duration_seconds),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    pub fn region(&self, id: &str) -> Option<&ComplianceRegion> {
        self.regions.get(id)
    }

    pub fn regions(&self) -> impl Iterator<Item = &ComplianceRegion> {
        self.regions.iter()
    }

    /// Regions under the playhead
    pub fn active_regions(&self) -> Vec<&ComplianceRegion> {
        self.regions.at(self.state.position_seconds)
    }

    pub fn is_provisional(&self, id: &str) -> bool {
        self.regions.is_provisional(id)
    }

    /// Ticket of the load currently accepting events
    pub fn current_ticket(&self) -> Option<LoadTicket> {
        self.ticket
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable engine access for hosts that feed engine-side state
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn zoom_policy(&self) -> ZoomPolicy {
        self.zoom
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn start_load(&mut self, source_url: &str) {
        let ticket = self.last_ticket.map(LoadTicket::next).unwrap_or_default();
        self.last_ticket = Some(ticket);
        self.ticket = Some(ticket);

        self.state.source_url = Some(source_url.to_string());
        self.state.duration_seconds = 0.0;
        self.state.position_seconds = 0.0;
        self.state.load_progress_percent = 0.0;
        self.state.error_message = None;
        self.set_status(PlaybackStatus::Loading);

        self.timer.arm(self.clock.now());
        if !self.overlay_requested {
            self.overlay_requested = true;
            self.overlay = self.engine.register_region_overlay();
            if self.overlay.is_none() {
                warn!("[CONTROLLER] Engine has no region overlay; regions will not be drawn");
            }
        }

        let options = EngineOptions {
            container: self.config.container.clone(),
            style: self.config.style.clone(),
            min_px_per_sec: self.state.zoom_pixels_per_second,
        };
        info!(
            "[CONTROLLER] Loading {} ({}, timeout {} ms)",
            source_url, ticket, self.config.load_timeout_ms
        );
        self.engine.load(ticket, source_url, &options);
    }

    fn become_ready(&mut self, duration: f64) {
        self.state.duration_seconds = duration;
        self.state.load_progress_percent = 100.0;
        self.state.position_seconds = self.state.clamp_position(self.state.position_seconds);
        self.set_status(PlaybackStatus::Ready);
        self.events.emit(ControllerEvent::DurationKnown {
            duration_seconds: duration,
        });
        info!("[CONTROLLER] Ready, duration {:.3}s", duration);

        for (region, violation) in self.regions.revalidate(duration) {
            warn!("[CONTROLLER] Dropping region {}: {}", region.id, violation);
            self.events.emit(ControllerEvent::RegionRejected {
                region,
                reason: violation.to_string(),
            });
        }

        if let Some(window) = self.config.max_visible_window_seconds {
            if let Some(zoom) = self
                .zoom
                .fit_window(self.config.viewport_width_px, duration, window)
            {
                let zoom = self.store_zoom(zoom);
                self.engine.zoom(zoom);
            }
        }

        self.sync_overlay();
    }

    fn expire_if_due(&mut self) {
        if self.state.status == PlaybackStatus::Loading && self.timer.is_expired(self.clock.now()) {
            self.timer.cancel();
            warn!(
                "[CONTROLLER] No response from engine within {} ms",
                self.config.load_timeout_ms
            );
            self.fail(format!(
                "load timeout: audio did not load within {} ms",
                self.config.load_timeout_ms
            ));
        }
    }

    fn fail(&mut self, message: String) {
        warn!("[CONTROLLER] Engine failure: {}", message);
        self.state.error_message = Some(message.clone());
        self.set_status(PlaybackStatus::Error);
        self.events.emit(ControllerEvent::Failed { message });
    }

    fn set_status(&mut self, next: PlaybackStatus) {
        let from = self.state.status;
        if from == next {
            return;
        }
        debug_assert!(
            from.can_transition_to(next, next == PlaybackStatus::Loading),
            "illegal transition {} -> {}",
            from,
            next
        );
        self.state.status = next;
        if next != PlaybackStatus::Error {
            self.state.error_message = None;
        }
        debug!("[CONTROLLER] {} -> {}", from, next);
        self.events
            .emit(ControllerEvent::StatusChanged { from, to: next });
    }

    fn set_position(&mut self, seconds: f64) {
        let position = self.state.clamp_position(seconds);
        if position != self.state.position_seconds {
            self.state.position_seconds = position;
            self.events.emit(ControllerEvent::PositionChanged {
                position_seconds: position,
            });
        }
    }

    /// Take the engine's playhead, which may be ahead of the last tick
    fn sync_position_from_engine(&mut self) {
        if !usable_duration(self.engine.duration()) {
            return;
        }
        let engine_time = self.engine.current_time();
        if engine_time.is_finite() {
            self.set_position(engine_time);
        }
    }

    fn seek_clamped(&mut self, target: f64) -> f64 {
        self.set_position(target);
        let duration = self.state.duration_seconds;
        let fraction = if duration > 0.0 {
            self.state.position_seconds / duration
        } else {
            0.0
        };
        self.engine.seek_to_fraction(fraction);
        self.state.position_seconds
    }

    fn store_zoom(&mut self, pixels_per_second: f64) -> f64 {
        let zoom = self.zoom.clamp(pixels_per_second);
        if zoom != self.state.zoom_pixels_per_second {
            self.state.zoom_pixels_per_second = zoom;
            self.events.emit(ControllerEvent::ZoomChanged {
                pixels_per_second: zoom,
            });
        }
        zoom
    }

    /// Mirror the region set into the engine overlay
    fn sync_overlay(&mut self) {
        let Some(overlay) = self.overlay else {
            return;
        };
        if self.known_duration().is_none() {
            return;
        }
        self.engine.clear_overlay_regions(overlay);
        for region in self.regions.iter() {
            self.engine.add_overlay_region(overlay, &region.to_overlay());
        }
    }

    fn known_duration(&self) -> Option<f64> {
        if self.state.status.has_duration() {
            self.state.known_duration()
        } else {
            None
        }
    }

    fn ensure_live(&self, operation: &'static str) -> Result<()> {
        if self.disposed {
            Err(ReviewError::Disposed { operation })
        } else {
            Ok(())
        }
    }

    fn require_duration(&mut self, operation: &'static str) -> Result<()> {
        self.expire_if_due();
        if self.state.status.has_duration() {
            Ok(())
        } else {
            Err(self.invalid_state(operation))
        }
    }

    fn invalid_state(&self, operation: &'static str) -> ReviewError {
        ReviewError::InvalidState {
            operation,
            status: self.state.status,
        }
    }
}

fn usable_duration(duration: f64) -> bool {
    duration.is_finite() && duration > 0.0
}
