//! Integration Tests
//!
//! End-to-end tests: configuration and call records on disk, through the
//! controller, out to the engine overlay and the replay report.

use std::io::Write;

use callscope::engine::{EngineCommand, RegionOverlayHandle};
use callscope::playback::ManualClock;
use callscope::records::CallData;
use callscope::session::{run_script, ReplayScript};
use callscope::{
    ComplianceKind, ControllerConfig, ControllerEvent, EngineEvent, MockEngine,
    PlaybackController, PlaybackStatus, WaveformEngine,
};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

const CALL_JSON: &str = r#"{
    "summary": "Client asked about Treasury Bonds.",
    "callDetails": {
        "callDate": "Nov 30, 2025",
        "duration": "4 mins",
        "callStartTime": "10:30:00 AM",
        "callEndTime": "10:34:00 AM",
        "callType": "Inbound",
        "recordingSource": "NICE",
        "overallSentimentAnalysis": "Positive"
    },
    "flagAuditLog": [
        {"id": "1", "regulationType": "Failure to Disclose Risk", "timeStamp": "00:02:35", "status": "PENDING"}
    ],
    "transcript": [
        {"id": "1", "speaker": "Agent", "timestamp": "00:02:02", "text": "Which ones?"},
        {"id": "2", "speaker": "Agent", "timestamp": "00:02:35", "text": "Really good yields", "flagged": true, "violation": "Failure to Disclose Risk"},
        {"id": "3", "speaker": "Client", "timestamp": "00:02:50", "text": "I would like some"}
    ],
    "voiceAnalysisData": {"duration": 240, "segments": 170, "complete": true}
}"#;

fn temp_json(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

// === Configuration ===

#[test]
fn test_config_file_drives_controller() {
    let file = temp_json(
        r#"{
            "source_url": "calls/0987.mp3",
            "max_visible_window_seconds": 20,
            "regions": [
                {"id": "opening", "start": 0, "end": 15, "kind": "compliant"},
                {"id": "pitch", "start": 150, "end": 170, "kind": "non-compliant", "label": "Risk not disclosed"},
                {"id": "outro", "start": 230, "end": 300, "kind": "review-required"}
            ]
        }"#,
    );
    let config = ControllerConfig::from_file(file.path()).unwrap();
    assert_eq!(config.load_timeout_ms, 15000);

    let mut controller =
        PlaybackController::new(config, MockEngine::new(), ManualClock::new()).unwrap();
    controller.init().unwrap();
    let ticket = controller.current_ticket().unwrap();
    controller.handle_engine_event(ticket, EngineEvent::Ready { duration: 240.0 });

    assert_eq!(controller.status(), PlaybackStatus::Ready);
    // 20 s window in an 800 px viewport
    assert_eq!(controller.state().zoom_pixels_per_second, 40.0);
    // "outro" ends past the audio and is dropped
    let ids: Vec<&str> = controller.regions().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["opening", "pitch"]);

    let overlay = controller.engine().overlay_regions(RegionOverlayHandle(1));
    assert_eq!(overlay.len(), 2);
    assert_eq!(overlay[1].content, "Risk not disclosed");
    assert_eq!(overlay[1].color, ComplianceKind::NonCompliant.color());
}

#[test]
fn test_invalid_config_rejected() {
    let file = temp_json(r#"{"source_url": "a.mp3", "min_zoom": 500, "max_zoom": 100}"#);
    let err = ControllerConfig::from_file(file.path()).unwrap_err();
    assert_eq!(err.error_code(), "CONFIG_ERROR");
}

// === Call Records ===

#[test]
fn test_flagged_transcript_becomes_locked_regions() {
    let file = temp_json(CALL_JSON);
    let call = CallData::from_file(file.path()).unwrap();

    let mut controller = PlaybackController::new(
        ControllerConfig::new("calls/0987.mp3"),
        MockEngine::new(),
        ManualClock::new(),
    )
    .unwrap();
    controller.init().unwrap();
    let ticket = controller.current_ticket().unwrap();
    controller.handle_engine_event(ticket, EngineEvent::Ready { duration: 240.0 });

    for draft in call.review_regions().unwrap() {
        controller.add_region(draft).unwrap();
    }

    let region = controller.region("transcript-2").unwrap();
    assert_eq!(region.start_seconds, 155.0);
    assert_eq!(region.end_seconds, 170.0);
    assert!(!region.mutable);

    assert_eq!(controller.active_regions().len(), 0);
    controller.seek(160.0).unwrap();
    assert_eq!(controller.active_regions()[0].id, "transcript-2");

    let overlay = controller.engine().overlay_regions(RegionOverlayHandle(1));
    assert!(!overlay[0].draggable);
    assert!(!overlay[0].resizable);
}

// === Replay ===

#[test]
fn test_replay_file_reproduces_timeout() {
    let file = temp_json(
        r#"{
            "config": {"source_url": "track.mp3", "load_timeout_ms": 15000},
            "steps": [
                {"at_ms": 0, "command": {"op": "init"}},
                {"at_ms": 15001, "event": {"type": "ready", "duration": 40}}
            ]
        }"#,
    );
    let script = ReplayScript::from_file(file.path()).unwrap();
    let report = run_script(&script).unwrap();

    assert_eq!(report.snapshot.playback.status, PlaybackStatus::Error);
    let message = report.snapshot.playback.error_message.clone().unwrap();
    assert!(message.contains("timeout"));
    assert!(report
        .events
        .iter()
        .any(|event| matches!(event, ControllerEvent::Failed { .. })));
    assert!(!report
        .events
        .iter()
        .any(|event| matches!(event, ControllerEvent::DurationKnown { .. })));
}

#[test]
fn test_replay_full_session() {
    let script = ReplayScript::from_json_str(
        r#"{
            "config": {"source_url": "track.mp3"},
            "steps": [
                {"at_ms": 0, "command": {"op": "init"}},
                {"at_ms": 5, "command": {"op": "add_region", "region": {"id": "late", "start": 30, "end": 999, "kind": "non-compliant"}}},
                {"at_ms": 50, "event": {"type": "load_progress", "percent": 60}},
                {"at_ms": 100, "event": {"type": "ready", "duration": 40}},
                {"at_ms": 120, "command": {"op": "add_region", "region": {"id": "r1", "start": 22, "end": 28, "kind": "non-compliant"}}},
                {"at_ms": 130, "command": {"op": "add_region", "region": {"id": "r1", "start": 0, "end": 5, "kind": "compliant"}}},
                {"at_ms": 200, "command": {"op": "play_pause"}},
                {"at_ms": 300, "event": {"type": "time_update", "position": 25}},
                {"at_ms": 400, "command": {"op": "skip", "delta": 100}},
                {"at_ms": 500, "command": {"op": "dispose"}},
                {"at_ms": 600, "command": {"op": "zoom_in"}}
            ]
        }"#,
    )
    .unwrap();

    let report = run_script(&script).unwrap();

    assert!(report.disposed);
    assert_eq!(report.snapshot.playback.position_seconds, 40.0);
    assert!(report.events.iter().any(|event| matches!(
        event,
        ControllerEvent::RegionRejected { region, .. } if region.id == "late"
    )));

    let codes: Vec<&str> = report.errors.iter().map(|e| e.code).collect();
    assert_eq!(codes, vec!["INVALID_ARGUMENT", "INVALID_STATE"]);
    assert_eq!(report.engine_commands.last(), Some(&EngineCommand::Destroy));
}
