//! Call Records Module
//!
//! Plain value objects consumed by the call list and call detail views.
//! They carry no playback logic; the only bridge to the controller is
//! [`CallData::review_regions`].

mod call_data;
mod call_list;

pub use call_data::{
    AuditStatus, AuditSummary, CallData, CallDetails, FlagAuditItem, Sentiment, TranscriptEntry,
    VoiceAnalysisInfo,
};
pub use call_list::{
    filter_by_status, load_call_list, sort_by_date, CallListItem, CallStatus,
    INTERACTION_DATE_FORMAT,
};
