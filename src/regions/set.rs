//! Insertion-ordered region storage with bound validation
//!
//! Regions added before the duration is known are held provisionally and
//! re-validated by [`RegionSet::revalidate`] once it arrives.

use thiserror::Error;

use super::region::{ComplianceRegion, RegionDraft};

/// Why a pair of region bounds was refused
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsViolation {
    #[error("region bounds must be finite")]
    NonFinite,

    #[error("region start {start:.3}s is negative")]
    NegativeStart { start: f64 },

    #[error("region start {start:.3}s is not before end {end:.3}s")]
    Inverted { start: f64, end: f64 },

    #[error("region end {end:.3}s exceeds duration {duration:.3}s")]
    BeyondDuration { end: f64, duration: f64 },
}

/// Check `0 <= start < end <= duration`
///
/// `duration` is `None` while the audio duration is still unknown, in which
/// case only the duration-independent rules apply.
pub fn validate_bounds(
    start: f64,
    end: f64,
    duration: Option<f64>,
) -> Result<(), BoundsViolation> {
    if !start.is_finite() || !end.is_finite() {
        return Err(BoundsViolation::NonFinite);
    }
    if start < 0.0 {
        return Err(BoundsViolation::NegativeStart { start });
    }
    if start >= end {
        return Err(BoundsViolation::Inverted { start, end });
    }
    if let Some(duration) = duration {
        if end > duration {
            return Err(BoundsViolation::BeyondDuration { end, duration });
        }
    }
    Ok(())
}

/// Why a region could not be inserted or resized
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegionSetError {
    #[error("region id '{0}' already exists")]
    DuplicateId(String),

    #[error("no region with id '{0}'")]
    UnknownId(String),

    #[error("region '{0}' is not mutable")]
    Immutable(String),

    #[error(transparent)]
    Bounds(#[from] BoundsViolation),
}

#[derive(Debug, Clone)]
struct StoredRegion {
    region: ComplianceRegion,
    provisional: bool,
}

/// Regions of one controller, in insertion order
#[derive(Debug, Clone, Default)]
pub struct RegionSet {
    entries: Vec<StoredRegion>,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a region
    ///
    /// With `duration == None` the region is stored provisionally.
    pub fn insert(
        &mut self,
        draft: RegionDraft,
        duration: Option<f64>,
    ) -> Result<&ComplianceRegion, RegionSetError> {
        validate_bounds(draft.start_seconds, draft.end_seconds, duration)?;
        if let Some(id) = &draft.id {
            if self.position(id).is_some() {
                return Err(RegionSetError::DuplicateId(id.clone()));
            }
        }

        self.entries.push(StoredRegion {
            region: draft.into_region(),
            provisional: duration.is_none(),
        });
        let last = self.entries.len() - 1;
        Ok(&self.entries[last].region)
    }

    /// Remove a region by id; `None` if it did not exist
    pub fn remove(&mut self, id: &str) -> Option<ComplianceRegion> {
        let index = self.position(id)?;
        Some(self.entries.remove(index).region)
    }

    /// Move a mutable region's bounds
    pub fn resize(
        &mut self,
        id: &str,
        start: f64,
        end: f64,
        duration: Option<f64>,
    ) -> Result<&ComplianceRegion, RegionSetError> {
        let index = self
            .position(id)
            .ok_or_else(|| RegionSetError::UnknownId(id.to_string()))?;
        if !self.entries[index].region.mutable {
            return Err(RegionSetError::Immutable(id.to_string()));
        }
        validate_bounds(start, end, duration)?;

        let entry = &mut self.entries[index];
        entry.region.start_seconds = start;
        entry.region.end_seconds = end;
        entry.provisional = duration.is_none();
        Ok(&entry.region)
    }

    /// Re-check provisional regions against a now-known duration
    ///
    /// Regions that fail are dropped and returned with the reason.
    pub fn revalidate(&mut self, duration: f64) -> Vec<(ComplianceRegion, BoundsViolation)> {
        let mut rejected = Vec::new();
        self.entries.retain_mut(|entry| {
            if !entry.provisional {
                return true;
            }
            match validate_bounds(
                entry.region.start_seconds,
                entry.region.end_seconds,
                Some(duration),
            ) {
                Ok(()) => {
                    entry.provisional = false;
                    true
                }
                Err(violation) => {
                    rejected.push((entry.region.clone(), violation));
                    false
                }
            }
        });
        rejected
    }

    /// Mark every region provisional again (the source changed)
    pub fn mark_all_provisional(&mut self) {
        for entry in &mut self.entries {
            entry.provisional = true;
        }
    }

    pub fn get(&self, id: &str) -> Option<&ComplianceRegion> {
        self.position(id).map(|index| &self.entries[index].region)
    }

    pub fn is_provisional(&self, id: &str) -> bool {
        self.position(id)
            .map(|index| self.entries[index].provisional)
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComplianceRegion> {
        self.entries.iter().map(|entry| &entry.region)
    }

    /// Regions containing `seconds`, in insertion order
    pub fn at(&self, seconds: f64) -> Vec<&ComplianceRegion> {
        self.iter().filter(|region| region.contains(seconds)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.region.id == id)
    }
}
