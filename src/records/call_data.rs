//! Call detail records: metadata, flag audit log and transcript

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ReviewError};
use crate::regions::{ComplianceKind, RegionDraft};
use crate::timecode::parse_timestamp;

/// Outcome of reviewing one compliance flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditStatus {
    #[serde(rename = "REVIEWED / ACCEPTED")]
    Accepted,
    #[serde(rename = "REVIEWED / REJECTED")]
    Rejected,
    #[serde(rename = "PENDING")]
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDetails {
    pub call_date: String,
    pub duration: String,
    pub call_start_time: String,
    pub call_end_time: String,
    pub call_type: String,
    pub recording_source: String,
    pub overall_sentiment_analysis: String,
    #[serde(default)]
    pub firsty_sensor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagAuditItem {
    pub id: String,
    pub regulation_type: String,
    /// `HH:MM:SS` into the call
    pub time_stamp: String,
    pub status: AuditStatus,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: String,
    pub speaker: String,
    /// `HH:MM:SS` into the call
    pub timestamp: String,
    pub text: String,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default)]
    pub violation: Option<String>,
}

impl TranscriptEntry {
    pub fn offset_seconds(&self) -> Result<f64> {
        parse_timestamp(&self.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceAnalysisInfo {
    /// Recording length in seconds
    pub duration: f64,
    pub segments: u32,
    pub complete: bool,
}

/// Counts of flag audit entries per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub pending: usize,
}

/// Everything the call detail view shows for one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallData {
    pub summary: String,
    pub call_details: CallDetails,
    #[serde(default)]
    pub flag_audit_log: Vec<FlagAuditItem>,
    #[serde(default)]
    pub transcript: Vec<TranscriptEntry>,
    #[serde(default)]
    pub voice_analysis_data: Option<VoiceAnalysisInfo>,
}

impl CallData {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ReviewError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&content)
    }

    pub fn flagged_entries(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.transcript.iter().filter(|entry| entry.flagged)
    }

    pub fn audit_summary(&self) -> AuditSummary {
        let mut summary = AuditSummary::default();
        for item in &self.flag_audit_log {
            match item.status {
                AuditStatus::Accepted => summary.accepted += 1,
                AuditStatus::Rejected => summary.rejected += 1,
                AuditStatus::Pending => summary.pending += 1,
            }
        }
        summary
    }

    /// Non-compliant regions for every flagged transcript entry
    ///
    /// A region runs from its entry's timestamp to the next entry's
    /// timestamp, or to the end of the recording for the last entry. Entries
    /// without room for a region (same timestamp as the next one and no known
    /// recording length) are skipped. Regions are locked so reviewers cannot
    /// move machine-flagged spans.
    pub fn review_regions(&self) -> Result<Vec<RegionDraft>> {
        let mut offsets = Vec::with_capacity(self.transcript.len());
        for entry in &self.transcript {
            offsets.push(entry.offset_seconds()?);
        }
        let recording_end = self.voice_analysis_data.as_ref().map(|info| info.duration);

        let mut regions = Vec::new();
        for (index, entry) in self.transcript.iter().enumerate() {
            if !entry.flagged {
                continue;
            }
            let start = offsets[index];
            let end = offsets
                .iter()
                .skip(index + 1)
                .copied()
                .find(|next| *next > start)
                .or(recording_end.filter(|end| *end > start));
            let Some(end) = end else {
                continue;
            };

            let label = entry
                .violation
                .clone()
                .unwrap_or_else(|| format!("Flagged: {}", entry.speaker));
            regions.push(
                RegionDraft::new(start, end, ComplianceKind::NonCompliant)
                    .with_id(format!("transcript-{}", entry.id))
                    .with_label(label)
                    .locked(),
            );
        }
        Ok(regions)
    }
}
