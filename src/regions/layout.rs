//! Pixel layout of regions on a zoomed waveform
//!
//! Pure functions of (region, zoom). Layout is linear in zoom, so doubling
//! the pixels-per-second value doubles every offset and width.

use serde::Serialize;

use super::region::ComplianceRegion;

/// Horizontal placement of one region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionLayout {
    pub id: String,
    pub offset_px: f64,
    pub width_px: f64,
}

/// Offset in pixels of a time position at `pixels_per_second`
pub fn time_to_px(seconds: f64, pixels_per_second: f64) -> f64 {
    seconds * pixels_per_second
}

/// Time position under a pixel offset; 0 for a degenerate zoom
pub fn px_to_time(px: f64, pixels_per_second: f64) -> f64 {
    if pixels_per_second > 0.0 {
        px / pixels_per_second
    } else {
        0.0
    }
}

pub fn layout_region(region: &ComplianceRegion, pixels_per_second: f64) -> RegionLayout {
    RegionLayout {
        id: region.id.clone(),
        offset_px: time_to_px(region.start_seconds, pixels_per_second),
        width_px: time_to_px(region.duration_seconds(), pixels_per_second),
    }
}

pub fn layout_regions<'a>(
    regions: impl IntoIterator<Item = &'a ComplianceRegion>,
    pixels_per_second: f64,
) -> Vec<RegionLayout> {
    regions
        .into_iter()
        .map(|region| layout_region(region, pixels_per_second))
        .collect()
}

/// Full rendered width of the waveform
pub fn waveform_width_px(duration_seconds: f64, pixels_per_second: f64) -> f64 {
    time_to_px(duration_seconds.max(0.0), pixels_per_second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::{ComplianceKind, RegionDraft};
    use approx::assert_relative_eq;

    fn region(start: f64, end: f64) -> ComplianceRegion {
        RegionDraft::new(start, end, ComplianceKind::NonCompliant)
            .with_id("r")
            .into_region()
    }

    #[test]
    fn test_layout_at_zoom() {
        let layout = layout_region(&region(12.0, 18.0), 50.0);
        assert_relative_eq!(layout.offset_px, 600.0);
        assert_relative_eq!(layout.width_px, 300.0);

        let layout = layout_region(&region(12.0, 18.0), 100.0);
        assert_relative_eq!(layout.offset_px, 1200.0);
        assert_relative_eq!(layout.width_px, 600.0);
    }

    #[test]
    fn test_layout_linear_in_zoom() {
        let regions = vec![region(0.5, 3.25), region(7.1, 39.9), region(22.0, 28.0)];
        for zoom in [10.0, 37.5, 50.0, 333.3] {
            let single = layout_regions(&regions, zoom);
            let double = layout_regions(&regions, zoom * 2.0);
            for (a, b) in single.iter().zip(&double) {
                assert_relative_eq!(b.offset_px, a.offset_px * 2.0);
                assert_relative_eq!(b.width_px, a.width_px * 2.0);
            }
        }
    }

    #[test]
    fn test_layout_is_idempotent() {
        let r = region(3.3, 9.9);
        let first = layout_region(&r, 123.4);
        for _ in 0..10 {
            assert_eq!(layout_region(&r, 123.4), first);
        }
    }

    #[test]
    fn test_px_to_time_guards_zero_zoom() {
        assert_eq!(px_to_time(100.0, 0.0), 0.0);
        assert_relative_eq!(px_to_time(600.0, 50.0), 12.0);
    }

    #[test]
    fn test_waveform_width() {
        assert_relative_eq!(waveform_width_px(40.0, 50.0), 2000.0);
        assert_eq!(waveform_width_px(-1.0, 50.0), 0.0);
    }
}
