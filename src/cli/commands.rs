//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::{info, warn};

use crate::config::ControllerConfig;
use crate::engine::{EngineEvent, MockEngine};
use crate::error::{Result, ReviewError};
use crate::playback::PlaybackController;
use crate::records::{filter_by_status, load_call_list, sort_by_date, CallData, CallStatus};
use crate::session::{run_script, ReplayScript};
use crate::timecode::format_clock;

/// Replay a scripted session and print the report as JSON.
pub fn replay(script_path: &Path) -> Result<()> {
    info!("Replaying session: {}", script_path.display());

    let script = ReplayScript::from_file(script_path)?;
    let report = run_script(&script)?;

    for error in &report.errors {
        warn!(
            "Step {} at {} ms failed [{}]: {}",
            error.step, error.at_ms, error.code, error.message
        );
    }

    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);

    Ok(())
}

/// Print the pixel layout of the configured regions for a given duration.
pub fn layout(config_path: &Path, duration: f64, zoom: Option<f64>) -> Result<()> {
    info!("Computing layout for: {}", config_path.display());

    let config = ControllerConfig::from_file(config_path)?;
    let configured = config.regions.len();

    let mut controller = PlaybackController::with_system_clock(config, MockEngine::new())?;
    controller.init()?;
    if let Some(ticket) = controller.current_ticket() {
        controller.handle_engine_event(ticket, EngineEvent::Ready { duration });
    }
    if let Some(message) = &controller.state().error_message {
        return Err(ReviewError::EngineFailure {
            message: message.clone(),
        });
    }
    if let Some(zoom) = zoom {
        controller.set_zoom(zoom)?;
    }

    let snapshot = controller.snapshot();
    println!(
        "Duration {} | Zoom {:.1} px/s | Width {:.1} px",
        snapshot.duration_label,
        snapshot.playback.zoom_pixels_per_second,
        snapshot.waveform_width_px
    );
    println!("{:-<60}", "");

    for (region, layout) in snapshot.regions.iter().zip(&snapshot.layout) {
        println!(
            "{:<24} {:>10.1} px {:>10.1} px  {}",
            region.id,
            layout.offset_px,
            layout.width_px,
            region.display_label()
        );
    }

    let dropped = configured.saturating_sub(snapshot.regions.len());
    if dropped > 0 {
        println!("{:-<60}", "");
        println!("{} region(s) dropped: outside the audio duration", dropped);
    }

    Ok(())
}

/// List calls newest first, optionally filtered by status.
pub fn calls(list_path: &Path, status: Option<&str>) -> Result<()> {
    info!("Listing calls: {}", list_path.display());

    let mut calls = load_call_list(list_path)?;
    sort_by_date(&mut calls)?;

    let shown = match status {
        Some(value) => {
            let status = CallStatus::parse(value)
                .ok_or_else(|| ReviewError::invalid_argument(format!("unknown status '{}'", value)))?;
            filter_by_status(&calls, status)
        }
        None => calls.iter().collect(),
    };

    if shown.is_empty() {
        println!("No calls.");
        return Ok(());
    }

    for call in &shown {
        println!(
            "{:>4}  {}  {:<20} {:<10} {:<12} {}",
            call.no,
            call.interaction_date,
            call.agent_name,
            call.call_type,
            call.origin,
            call.status
        );
    }

    println!("{:-<60}", "");
    let pending = shown.iter().filter(|call| call.status.needs_review()).count();
    println!("Shown: {} | Pending review: {}", shown.len(), pending);

    Ok(())
}

/// Print review regions derived from a call's flagged transcript entries.
pub fn call_regions(call_path: &Path) -> Result<()> {
    info!("Deriving review regions: {}", call_path.display());

    let call = CallData::from_file(call_path)?;
    let regions = call.review_regions()?;
    let summary = call.audit_summary();

    println!("Summary: {}", call.summary);
    println!(
        "Flag audit: {} accepted | {} rejected | {} pending",
        summary.accepted, summary.rejected, summary.pending
    );
    println!("{:-<60}", "");

    if regions.is_empty() {
        println!("No flagged transcript entries.");
        return Ok(());
    }

    for draft in &regions {
        println!(
            "{} - {}  {}",
            format_clock(draft.start_seconds),
            format_clock(draft.end_seconds),
            draft.label.as_deref().unwrap_or_else(|| draft.kind.display_name())
        );
    }

    Ok(())
}
