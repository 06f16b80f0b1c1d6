//! Scripted replay of a playback session
//!
//! A replay script is a controller configuration plus a list of timed steps,
//! each either an engine callback or a user command. The runner drives a
//! controller over [`MockEngine`] and [`ManualClock`], so a whole session,
//! including load timeouts, replays deterministically.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::ControllerConfig;
use crate::engine::{EngineCommand, EngineEvent, MockEngine, WaveformEngine};
use crate::error::{Result, ReviewError};
use crate::events::ControllerEvent;
use crate::playback::{ControllerSnapshot, ManualClock, PlaybackController};
use crate::regions::RegionDraft;

/// A user command issued during a replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptCommand {
    /// Load the configured source
    Init,
    Load { url: String },
    PlayPause,
    Skip { delta: f64 },
    SkipForward,
    SkipBackward,
    Seek { position: f64 },
    SetZoom { pixels_per_second: f64 },
    ZoomIn,
    ZoomOut,
    AddRegion { region: RegionDraft },
    RemoveRegion { id: String },
    ResizeRegion { id: String, start: f64, end: f64 },
    ClearRegions,
    Reset {
        #[serde(default)]
        url: Option<String>,
    },
    Dispose,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptAction {
    /// Engine callback, delivered with the controller's current load ticket
    Event(EngineEvent),
    Command(ScriptCommand),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Milliseconds since the start of the replay
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    pub config: ControllerConfig,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
    /// Clock time the replay runs to after the last step
    #[serde(default)]
    pub end_ms: Option<u64>,
}

impl ReplayScript {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let script: ReplayScript = serde_json::from_str(json)?;
        script.config.validate()?;
        Ok(script)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ReviewError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&content)
    }
}

/// A command that failed during the replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepError {
    pub step: usize,
    pub at_ms: u64,
    pub code: &'static str,
    pub message: String,
}

/// Outcome of a replay
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub snapshot: ControllerSnapshot,
    pub events: Vec<ControllerEvent>,
    pub errors: Vec<StepError>,
    pub engine_commands: Vec<EngineCommand>,
    pub disposed: bool,
}

/// Run a script to completion
///
/// Steps run in `at_ms` order (ties keep script order). Before each step the
/// clock is moved to the step's time and the controller is polled, so a load
/// timeout fires exactly as it would on a live event loop. Command failures
/// are collected, not propagated.
pub fn run_script(script: &ReplayScript) -> Result<ReplayReport> {
    let clock = ManualClock::new();
    let mut controller =
        PlaybackController::new(script.config.clone(), MockEngine::new(), clock.clone())?;

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    controller.subscribe(move |event: &ControllerEvent| sink.borrow_mut().push(event.clone()))?;

    let mut steps: Vec<(usize, &ScriptStep)> = script.steps.iter().enumerate().collect();
    steps.sort_by_key(|(index, step)| (step.at_ms, *index));

    let mut errors = Vec::new();
    for (index, step) in steps {
        clock.set(Duration::from_millis(step.at_ms));
        controller.poll();

        match &step.action {
            ScriptAction::Event(event) => match controller.current_ticket() {
                Some(ticket) => {
                    mirror_into_engine(controller.engine_mut(), event);
                    controller.handle_engine_event(ticket, event.clone());
                }
                None => debug!("[REPLAY] Step {}: no active load for {}", index, event.name()),
            },
            ScriptAction::Command(command) => {
                if let Err(err) = apply_command(&mut controller, command) {
                    debug!("[REPLAY] Step {} failed: {}", index, err);
                    errors.push(StepError {
                        step: index,
                        at_ms: step.at_ms,
                        code: err.error_code(),
                        message: err.to_string(),
                    });
                }
            }
        }
    }

    if let Some(end_ms) = script.end_ms {
        clock.set(Duration::from_millis(end_ms));
        controller.poll();
    }

    info!(
        "[REPLAY] Finished in {} with {} events, {} errors",
        controller.status(),
        events.borrow().len(),
        errors.len()
    );

    let snapshot = controller.snapshot();
    let disposed = controller.is_disposed();
    let engine_commands = controller.engine().commands().to_vec();
    let events = events.borrow().clone();
    Ok(ReplayReport {
        snapshot,
        events,
        errors,
        engine_commands,
        disposed,
    })
}

/// Keep the mock engine's own duration and playhead in step with the
/// callbacks it is pretending to emit
fn mirror_into_engine(engine: &mut MockEngine, event: &EngineEvent) {
    match event {
        EngineEvent::Ready { duration } => engine.set_duration(*duration),
        EngineEvent::TimeUpdate { position } => engine.set_current_time(*position),
        EngineEvent::Finish => {
            let end = engine.duration();
            engine.set_current_time(end);
        }
        _ => {}
    }
}

fn apply_command(
    controller: &mut PlaybackController<MockEngine, ManualClock>,
    command: &ScriptCommand,
) -> Result<()> {
    match command {
        ScriptCommand::Init => controller.init(),
        ScriptCommand::Load { url } => controller.load(url),
        ScriptCommand::PlayPause => controller.play_pause().map(|_| ()),
        ScriptCommand::Skip { delta } => controller.skip(*delta).map(|_| ()),
        ScriptCommand::SkipForward => controller.skip_forward().map(|_| ()),
        ScriptCommand::SkipBackward => controller.skip_backward().map(|_| ()),
        ScriptCommand::Seek { position } => controller.seek(*position).map(|_| ()),
        ScriptCommand::SetZoom { pixels_per_second } => {
            controller.set_zoom(*pixels_per_second).map(|_| ())
        }
        ScriptCommand::ZoomIn => controller.zoom_in().map(|_| ()),
        ScriptCommand::ZoomOut => controller.zoom_out().map(|_| ()),
        ScriptCommand::AddRegion { region } => controller.add_region(region.clone()).map(|_| ()),
        ScriptCommand::RemoveRegion { id } => controller.remove_region(id).map(|_| ()),
        ScriptCommand::ResizeRegion { id, start, end } => {
            controller.resize_region(id, *start, *end)
        }
        ScriptCommand::ClearRegions => controller.clear_regions(),
        ScriptCommand::Reset { url } => controller.reset(url.as_deref()),
        ScriptCommand::Dispose => controller.dispose(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlaybackStatus;

    #[test]
    fn test_step_json_shape() {
        let step: ScriptStep =
            serde_json::from_str(r#"{"at_ms": 10, "event": {"type": "ready", "duration": 40}}"#)
                .unwrap();
        assert_eq!(step.action, ScriptAction::Event(EngineEvent::Ready { duration: 40.0 }));

        let step: ScriptStep =
            serde_json::from_str(r#"{"at_ms": 0, "command": {"op": "skip", "delta": -10}}"#)
                .unwrap();
        assert_eq!(
            step.action,
            ScriptAction::Command(ScriptCommand::Skip { delta: -10.0 })
        );
    }

    #[test]
    fn test_replay_timeout() {
        let script = ReplayScript::from_json_str(
            r#"{
                "config": {"source_url": "track.mp3", "load_timeout_ms": 15000},
                "steps": [{"at_ms": 0, "command": {"op": "init"}}],
                "end_ms": 15001
            }"#,
        )
        .unwrap();

        let report = run_script(&script).unwrap();
        assert_eq!(report.snapshot.playback.status, PlaybackStatus::Error);
        assert!(report.snapshot.playback.error_message.unwrap().contains("timeout"));
    }

    #[test]
    fn test_replay_collects_command_errors() {
        let script = ReplayScript::from_json_str(
            r#"{
                "config": {"source_url": "track.mp3"},
                "steps": [
                    {"at_ms": 0, "command": {"op": "play_pause"}},
                    {"at_ms": 5, "command": {"op": "init"}},
                    {"at_ms": 10, "event": {"type": "ready", "duration": 40}},
                    {"at_ms": 20, "command": {"op": "play_pause"}}
                ]
            }"#,
        )
        .unwrap();

        let report = run_script(&script).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, "INVALID_STATE");
        assert_eq!(report.snapshot.playback.status, PlaybackStatus::Playing);
    }

    #[test]
    fn test_replay_engine_tracks_playhead() {
        let script = ReplayScript::from_json_str(
            r#"{
                "config": {"source_url": "track.mp3"},
                "steps": [
                    {"at_ms": 0, "command": {"op": "init"}},
                    {"at_ms": 10, "event": {"type": "ready", "duration": 40}},
                    {"at_ms": 20, "command": {"op": "play_pause"}},
                    {"at_ms": 30, "event": {"type": "time_update", "position": 17}},
                    {"at_ms": 40, "event": {"type": "pause"}}
                ]
            }"#,
        )
        .unwrap();

        let report = run_script(&script).unwrap();
        assert_eq!(report.snapshot.playback.status, PlaybackStatus::Paused);
        assert_eq!(report.snapshot.playback.position_seconds, 17.0);
    }

    #[test]
    fn test_steps_sorted_by_time() {
        let script = ReplayScript::from_json_str(
            r#"{
                "config": {"source_url": "track.mp3"},
                "steps": [
                    {"at_ms": 10, "event": {"type": "ready", "duration": 40}},
                    {"at_ms": 0, "command": {"op": "init"}}
                ]
            }"#,
        )
        .unwrap();

        let report = run_script(&script).unwrap();
        assert_eq!(report.snapshot.playback.status, PlaybackStatus::Ready);
    }
}
