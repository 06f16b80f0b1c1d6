//! Compliance Region Module
//!
//! Time-ranged annotations overlaid on the waveform:
//! - Region and draft types with per-kind color and label
//! - Insertion-ordered storage with bound validation
//! - Zoom-dependent pixel layout

mod layout;
mod region;
mod set;

pub use layout::{
    layout_region, layout_regions, px_to_time, time_to_px, waveform_width_px, RegionLayout,
};
pub use region::{ComplianceKind, ComplianceRegion, RegionDraft};
pub use set::{validate_bounds, BoundsViolation, RegionSet, RegionSetError};
