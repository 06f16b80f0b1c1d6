//! Error handling for Callscope
//!
//! Command validation errors are returned synchronously. Engine failures are
//! folded into the controller's Error status and only surface here when a
//! caller asks for them explicitly.

use std::path::PathBuf;

use thiserror::Error;

use crate::playback::PlaybackStatus;
use crate::regions::RegionSetError;

/// Result type alias for Callscope operations
pub type Result<T> = std::result::Result<T, ReviewError>;

/// Main error type for Callscope operations
#[derive(Error, Debug)]
pub enum ReviewError {
    // Command Errors
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Cannot {operation} while {status}")]
    InvalidState {
        operation: &'static str,
        status: PlaybackStatus,
    },

    #[error("Invalid region: {0}")]
    Region(#[from] RegionSetError),

    #[error("Controller has been disposed; cannot {operation}")]
    Disposed { operation: &'static str },

    // Engine Errors
    #[error("Engine failure: {message}")]
    EngineFailure { message: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    // Record Errors
    #[error("Malformed {field}: '{value}'")]
    RecordFormat { field: &'static str, value: String },

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReviewError {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        ReviewError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        ReviewError::Config {
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ReviewError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            // Moving a locked region is a state problem, not bad input
            ReviewError::Region(RegionSetError::Immutable(_)) => "INVALID_STATE",
            ReviewError::Region(_) => "INVALID_ARGUMENT",
            // A disposed controller rejects everything as a state error
            ReviewError::InvalidState { .. } | ReviewError::Disposed { .. } => "INVALID_STATE",
            ReviewError::EngineFailure { .. } => "ENGINE_FAILURE",
            ReviewError::Config { .. } => "CONFIG_ERROR",
            ReviewError::RecordFormat { .. } => "RECORD_FORMAT",
            ReviewError::FileRead { .. } => "FILE_READ_ERROR",
            ReviewError::Io(_) => "IO_ERROR",
            ReviewError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// True for errors raised because the controller was in the wrong state
    pub fn is_invalid_state(&self) -> bool {
        self.error_code() == "INVALID_STATE"
    }

    /// True for errors raised because the command input was malformed
    pub fn is_invalid_argument(&self) -> bool {
        self.error_code() == "INVALID_ARGUMENT"
    }

    /// Check if this error is recoverable by the caller without a reset
    pub fn is_recoverable(&self) -> bool {
        match self {
            ReviewError::InvalidArgument { .. } => true,
            ReviewError::InvalidState { .. } => true,
            ReviewError::Region(_) => true,
            ReviewError::Config { .. } => true,
            ReviewError::RecordFormat { .. } => true,
            ReviewError::FileRead { .. } => true,
            _ => false,
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ReviewError::InvalidArgument { .. } => vec![
                "Check that region bounds satisfy 0 <= start < end <= duration",
                "Use a region id that is not already in use",
                "Provide a non-empty source URL",
            ],
            ReviewError::InvalidState { .. } => vec![
                "Wait for the audio to finish loading",
                "Check the controller status before issuing the command",
            ],
            ReviewError::Region(RegionSetError::Immutable(_)) => {
                vec!["Locked regions keep their bounds; remove and re-add it instead"]
            }
            ReviewError::Region(_) => vec![
                "Check that region bounds satisfy 0 <= start < end <= duration",
                "Use a region id that is not already in use",
            ],
            ReviewError::Disposed { .. } => vec!["Create a new controller for this recording"],
            ReviewError::EngineFailure { .. } => vec![
                "Reset the controller to retry loading",
                "Check that the recording URL is reachable",
                "Large recordings may need a longer load timeout",
            ],
            ReviewError::Config { .. } => vec![
                "Check the configuration file against the documented defaults",
                "Remove the offending field to fall back to its default",
            ],
            ReviewError::RecordFormat { .. } => vec![
                "Dates use MM/DD/YYYY and timestamps use HH:MM:SS",
            ],
            _ => vec![],
        }
    }
}
