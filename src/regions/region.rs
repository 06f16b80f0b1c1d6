//! Compliance region types

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::OverlayRegion;

/// Compliance verdict attached to a stretch of audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceKind {
    Compliant,
    NonCompliant,
    ReviewRequired,
}

impl ComplianceKind {
    /// Overlay fill color for this kind
    pub fn color(&self) -> &'static str {
        match self {
            ComplianceKind::Compliant => "rgba(34, 197, 94, 0.3)",
            ComplianceKind::NonCompliant => "rgba(239, 68, 68, 0.3)",
            ComplianceKind::ReviewRequired => "rgba(245, 158, 11, 0.3)",
        }
    }

    /// Label shown when a region carries no label of its own
    pub fn display_name(&self) -> &'static str {
        match self {
            ComplianceKind::Compliant => "Compliant Section",
            ComplianceKind::NonCompliant => "Non-compliant Section",
            ComplianceKind::ReviewRequired => "Review Required",
        }
    }
}

impl fmt::Display for ComplianceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplianceKind::Compliant => write!(f, "compliant"),
            ComplianceKind::NonCompliant => write!(f, "non-compliant"),
            ComplianceKind::ReviewRequired => write!(f, "review-required"),
        }
    }
}

/// A time-ranged compliance annotation owned by a controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRegion {
    pub id: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub kind: ComplianceKind,
    pub label: Option<String>,
    /// Whether bounds may be dragged or resized after creation
    pub mutable: bool,
}

impl ComplianceRegion {
    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Label to render: the explicit label, else the kind's display name
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .unwrap_or_else(|| self.kind.display_name())
    }

    /// Check whether `seconds` falls inside this region (end exclusive)
    pub fn contains(&self, seconds: f64) -> bool {
        seconds >= self.start_seconds && seconds < self.end_seconds
    }

    /// Overlay description pushed to the engine
    pub fn to_overlay(&self) -> OverlayRegion {
        OverlayRegion {
            id: self.id.clone(),
            start: self.start_seconds,
            end: self.end_seconds,
            color: self.kind.color(),
            content: self.display_label().to_string(),
            draggable: self.mutable,
            resizable: self.mutable,
        }
    }
}

/// A region as supplied by a caller, before the controller accepts it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDraft {
    /// Assigned a fresh UUID when missing
    #[serde(default)]
    pub id: Option<String>,
    #[serde(alias = "start")]
    pub start_seconds: f64,
    #[serde(alias = "end")]
    pub end_seconds: f64,
    pub kind: ComplianceKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_mutable")]
    pub mutable: bool,
}

fn default_mutable() -> bool {
    true
}

impl RegionDraft {
    /// Create a mutable, unlabelled draft with a generated id
    pub fn new(start_seconds: f64, end_seconds: f64, kind: ComplianceKind) -> Self {
        Self {
            id: None,
            start_seconds,
            end_seconds,
            kind,
            label: None,
            mutable: true,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Lock the region's bounds
    pub fn locked(mut self) -> Self {
        self.mutable = false;
        self
    }

    pub(crate) fn into_region(self) -> ComplianceRegion {
        ComplianceRegion {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            start_seconds: self.start_seconds,
            end_seconds: self.end_seconds,
            kind: self.kind,
            label: self.label,
            mutable: self.mutable,
        }
    }
}
