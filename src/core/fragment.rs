//! Regions that may carry their own bases.

use std::ops::Deref;

use tracing::debug;

use crate::core::contig::ContigError;
use crate::core::region::{Region, RegionError};

/// A [`Region`] plus an optional literal sequence and provenance.
///
/// The sequence is read in the region's direction, from `start` to `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContigRegion {
    region: Region,
    sequence: Option<String>,
    filename: Option<String>,
}

impl ContigRegion {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            sequence: None,
            filename: None,
        }
    }

    #[must_use]
    pub fn with_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = Some(sequence.into());
        self
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub(crate) fn region_mut(&mut self) -> &mut Region {
        &mut self.region
    }

    pub fn sequence(&self) -> Option<&str> {
        self.sequence.as_deref()
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn has_sequence(&self) -> bool {
        self.sequence.is_some()
    }

    /// Flip direction and reverse the carried sequence
    pub fn reverse_direction(&mut self) {
        self.region.reverse_direction();
        if let Some(seq) = &mut self.sequence {
            *seq = seq.chars().rev().collect();
        }
    }

    /// Drop the sequence once it no longer matches the region length
    pub(crate) fn discard_stale_sequence(&mut self) {
        let stale = self
            .sequence
            .as_ref()
            .is_some_and(|seq| i64::try_from(seq.len()).ok() != Some(self.region.length()));
        if stale {
            debug!(region = %self.region, "Discarding sequence after resize");
            self.sequence = None;
        }
    }

    /// Sub-fragment from `start` to `end`, slicing the sequence to match
    ///
    /// # Errors
    ///
    /// See [`Region::sub_region`].
    pub fn sub_region(&self, start: i64, end: i64) -> Result<ContigRegion, RegionError> {
        let region = self.region.sub_region(start, end)?;
        let sequence = match (&self.sequence, self.region.distance_from_start(start)) {
            (Some(seq), Some(offset)) => usize::try_from(offset)
                .ok()
                .zip(usize::try_from(region.length()).ok())
                .and_then(|(from, len)| seq.get(from..from + len))
                .map(str::to_string),
            _ => None,
        };
        Ok(ContigRegion {
            region,
            sequence,
            filename: self.filename.clone(),
        })
    }

    /// Fuse a consecutive fragment onto this one, joining their sequences.
    ///
    /// # Errors
    ///
    /// Returns `ContigError::SequenceMismatch` if only one side carries a
    /// sequence, or `ContigError::Region` if the regions cannot be fused.
    pub fn fuse(&mut self, other: &ContigRegion) -> Result<(), ContigError> {
        let sequence = match (&self.sequence, &other.sequence) {
            (Some(left), Some(right)) if self.region.is_forward() => Some(format!("{left}{right}")),
            (Some(left), Some(right)) => Some(format!("{right}{left}")),
            (None, None) => None,
            _ => {
                return Err(ContigError::SequenceMismatch {
                    left: self.region.to_string(),
                    right: other.region.to_string(),
                })
            }
        };
        self.region.fuse(&other.region)?;
        self.sequence = sequence;
        Ok(())
    }
}

impl Deref for ContigRegion {
    type Target = Region;

    fn deref(&self) -> &Region {
        &self.region
    }
}

impl From<Region> for ContigRegion {
    fn from(region: Region) -> Self {
        Self::new(region)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::context::Context;

    fn ctx() -> Arc<Context> {
        Arc::new(Context::linear(100, 1).unwrap())
    }

    #[test]
    fn test_reverse_direction_reverses_sequence() {
        let mut frag = ContigRegion::new(Region::forward(1, 4, ctx()).unwrap()).with_sequence("ACGT");
        frag.reverse_direction();
        assert!(frag.is_reverse());
        assert_eq!(frag.sequence(), Some("TGCA"));
        assert_eq!((frag.start(), frag.end()), (4, 1));
    }

    #[test]
    fn test_sub_region_slices_sequence() {
        let frag = ContigRegion::new(Region::forward(1, 8, ctx()).unwrap())
            .with_sequence("AAAACCCC")
            .with_filename("plasmid.gb");
        let sub = frag.sub_region(3, 6).unwrap();
        assert_eq!(sub.sequence(), Some("AACC"));
        assert_eq!(sub.filename(), Some("plasmid.gb"));
        assert_eq!(sub.length(), 4);
    }

    #[test]
    fn test_fuse_joins_sequences() {
        let mut left = ContigRegion::new(Region::forward(1, 4, ctx()).unwrap()).with_sequence("AAAA");
        let right = ContigRegion::new(Region::forward(5, 6, ctx()).unwrap()).with_sequence("CC");
        left.fuse(&right).unwrap();
        assert_eq!(left.sequence(), Some("AAAACC"));
        assert_eq!(left.end(), 6);
    }

    #[test]
    fn test_fuse_rejects_one_sided_sequence() {
        let mut left = ContigRegion::new(Region::forward(1, 4, ctx()).unwrap()).with_sequence("AAAA");
        let right = ContigRegion::new(Region::forward(5, 6, ctx()).unwrap());
        assert!(matches!(
            left.fuse(&right),
            Err(ContigError::SequenceMismatch { .. })
        ));
        assert_eq!(left.end(), 4);
    }

    #[test]
    fn test_discard_stale_sequence() {
        let mut frag = ContigRegion::new(Region::forward(1, 4, ctx()).unwrap()).with_sequence("ACGT");
        frag.discard_stale_sequence();
        assert!(frag.has_sequence());
        frag.region_mut().extend_end(2).unwrap();
        frag.discard_stale_sequence();
        assert!(!frag.has_sequence());
    }
}
