//! Call list entries

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ReviewError};

/// Date format used by `interactionDate`
pub const INTERACTION_DATE_FORMAT: &str = "%m/%d/%Y";

/// Processing/review status of a recorded call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallStatus {
    #[serde(rename = "PENDING REVIEW")]
    PendingReview,
    #[serde(rename = "REVIEWED")]
    Reviewed,
    #[serde(rename = "REPROCESSING")]
    Reprocessing,
    #[serde(rename = "PROCESSING FAIL")]
    ProcessingFail,
}

impl CallStatus {
    /// Parse the display form, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value
            .trim()
            .to_ascii_uppercase()
            .replace(|c: char| c == '-' || c == '_', " ");
        match normalized.as_str() {
            "PENDING REVIEW" => Some(CallStatus::PendingReview),
            "REVIEWED" => Some(CallStatus::Reviewed),
            "REPROCESSING" => Some(CallStatus::Reprocessing),
            "PROCESSING FAIL" => Some(CallStatus::ProcessingFail),
            _ => None,
        }
    }

    /// Whether a reviewer still has to act on the call
    pub fn needs_review(&self) -> bool {
        matches!(self, CallStatus::PendingReview)
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallStatus::PendingReview => write!(f, "PENDING REVIEW"),
            CallStatus::Reviewed => write!(f, "REVIEWED"),
            CallStatus::Reprocessing => write!(f, "REPROCESSING"),
            CallStatus::ProcessingFail => write!(f, "PROCESSING FAIL"),
        }
    }
}

/// One row of the call list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallListItem {
    pub id: String,
    pub no: u32,
    pub interaction_id: String,
    pub agent_name: String,
    pub call_type: String,
    /// `MM/DD/YYYY`
    pub interaction_date: String,
    pub origin: String,
    pub status: CallStatus,
}

impl CallListItem {
    pub fn interaction_date(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.interaction_date, INTERACTION_DATE_FORMAT).map_err(|_| {
            ReviewError::RecordFormat {
                field: "interactionDate",
                value: self.interaction_date.clone(),
            }
        })
    }
}

/// Read a JSON array of call list entries
pub fn load_call_list(path: &Path) -> Result<Vec<CallListItem>> {
    let content = fs::read_to_string(path).map_err(|e| ReviewError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let calls: Vec<CallListItem> = serde_json::from_str(&content)?;
    Ok(calls)
}

/// Calls with the given status, in list order
pub fn filter_by_status(calls: &[CallListItem], status: CallStatus) -> Vec<&CallListItem> {
    calls.iter().filter(|call| call.status == status).collect()
}

/// Sort newest first by interaction date, then by list number
///
/// Fails on the first unparseable date.
pub fn sort_by_date(calls: &mut [CallListItem]) -> Result<()> {
    for call in calls.iter() {
        call.interaction_date()?;
    }
    calls.sort_by(|a, b| {
        let a_date = a.interaction_date().ok();
        let b_date = b.interaction_date().ok();
        b_date.cmp(&a_date).then(a.no.cmp(&b.no))
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use test_case::test_case;

    fn item(no: u32, date: &str, status: CallStatus) -> CallListItem {
        CallListItem {
            id: no.to_string(),
            no,
            interaction_id: "EJI234567890-0987".to_string(),
            agent_name: "John Hamm".to_string(),
            call_type: "Inbound".to_string(),
            interaction_date: date.to_string(),
            origin: "NIC - OPS".to_string(),
            status,
        }
    }

    #[test]
    fn test_status_json_names() {
        let json = serde_json::to_string(&CallStatus::ProcessingFail).unwrap();
        assert_eq!(json, r#""PROCESSING FAIL""#);
        let status: CallStatus = serde_json::from_str(r#""PENDING REVIEW""#).unwrap();
        assert_eq!(status, CallStatus::PendingReview);
    }

    #[test_case("pending-review", Some(CallStatus::PendingReview))]
    #[test_case("PENDING REVIEW", Some(CallStatus::PendingReview); "display form")]
    #[test_case("Reviewed", Some(CallStatus::Reviewed))]
    #[test_case("processing_fail", Some(CallStatus::ProcessingFail))]
    #[test_case("done", None)]
    fn test_status_parse(value: &str, expected: Option<CallStatus>) {
        assert_eq!(CallStatus::parse(value), expected);
    }

    #[test]
    fn test_camel_case_fields() {
        let json = r#"{
            "id": "1", "no": 1, "interactionId": "EJI-1", "agentName": "John Hamm",
            "callType": "Inbound", "interactionDate": "04/01/2025",
            "origin": "NIC - OPS", "status": "REVIEWED"
        }"#;
        let call: CallListItem = serde_json::from_str(json).unwrap();
        assert_eq!(call.agent_name, "John Hamm");
        assert_eq!(
            call.interaction_date().unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
        );
    }

    #[test]
    fn test_sort_newest_first() {
        let mut calls = vec![
            item(1, "04/01/2025", CallStatus::Reviewed),
            item(2, "05/12/2025", CallStatus::PendingReview),
            item(3, "04/01/2025", CallStatus::PendingReview),
        ];
        sort_by_date(&mut calls).unwrap();
        let order: Vec<u32> = calls.iter().map(|c| c.no).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn test_sort_rejects_bad_date() {
        let mut calls = vec![item(1, "2025-04-01", CallStatus::Reviewed)];
        assert_eq!(
            sort_by_date(&mut calls).unwrap_err().error_code(),
            "RECORD_FORMAT"
        );
    }

    #[test]
    fn test_filter_by_status() {
        let calls = vec![
            item(1, "04/01/2025", CallStatus::Reviewed),
            item(2, "04/01/2025", CallStatus::PendingReview),
        ];
        let pending = filter_by_status(&calls, CallStatus::PendingReview);
        assert_eq!(pending.len(), 1);
        assert!(pending[0].status.needs_review());
    }

    #[test]
    fn test_load_call_list() {
        let calls = vec![item(1, "04/01/2025", CallStatus::Reviewed)];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&calls).unwrap()).unwrap();

        let loaded = load_call_list(file.path()).unwrap();
        assert_eq!(loaded, calls);
    }
}
