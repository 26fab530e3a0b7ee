//! Aligned contigs: a query span on the target paired with a subject span
//! of equal length on a source sequence.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::fragment::ContigRegion;
use crate::core::region::{Direction, RegionError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContigError {
    #[error("Query and subject lengths differ: query {query} bp, subject {subject} bp")]
    LengthMismatch { query: i64, subject: i64 },

    #[error("Position {position} is outside of query {query}")]
    OutsideQuery { position: i64, query: String },

    #[error("Contigs {left} and {right} are in different coordinate spaces")]
    ContextMismatch { left: ContigId, right: ContigId },

    #[error("Contigs {left} and {right} are not consecutive")]
    NotConsecutive { left: ContigId, right: ContigId },

    #[error("Only one of {left} and {right} carries a sequence")]
    SequenceMismatch { left: String, right: String },

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error("Duplicate contig id: {0}")]
    DuplicateId(ContigId),

    #[error("Contig not found: {0}")]
    NotFound(ContigId),
}

/// Unique identifier of a contig within one planning run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContigId(pub u64);

impl std::fmt::Display for ContigId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues contig ids that are never reused.
///
/// Each container owns one generator, so ids are unique per run rather than
/// per process.
#[derive(Debug, Default)]
pub struct ContigIdGenerator {
    next: AtomicU64,
}

impl ContigIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> ContigId {
        ContigId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids issued so far
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

/// How a contig came to exist
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContigType {
    /// Direct alignment of a source sequence against the target
    #[default]
    Alignment,
    /// Primer binding site
    Primer,
    /// Primer-bounded sub-fragment of an alignment
    Product,
    /// Half of an alignment split at the target origin
    CircularPartition,
    Other(String),
}

impl std::fmt::Display for ContigType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alignment => write!(f, "alignment"),
            Self::Primer => write!(f, "primer"),
            Self::Product => write!(f, "product"),
            Self::CircularPartition => write!(f, "circular_partition"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Query,
    Subject,
}

/// A query span of the target paired with an equal-length subject span of a
/// source sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Contig {
    id: ContigId,
    query: ContigRegion,
    subject: ContigRegion,
    contig_type: ContigType,
    quality: f64,
    metadata: BTreeMap<String, String>,
}

impl Contig {
    /// Pair a query and a subject region under a fresh id
    ///
    /// # Errors
    ///
    /// Returns `ContigError::LengthMismatch` if the two regions differ in length.
    pub fn new(
        query: ContigRegion,
        subject: ContigRegion,
        contig_type: ContigType,
        ids: &ContigIdGenerator,
    ) -> Result<Self, ContigError> {
        check_lengths(&query, &subject)?;
        Ok(Self {
            id: ids.next_id(),
            query,
            subject,
            contig_type,
            quality: 1.0,
            metadata: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> ContigId {
        self.id
    }

    pub fn query(&self) -> &ContigRegion {
        &self.query
    }

    pub fn subject(&self) -> &ContigRegion {
        &self.subject
    }

    pub fn contig_type(&self) -> &ContigType {
        &self.contig_type
    }

    pub fn set_contig_type(&mut self, contig_type: ContigType) {
        self.contig_type = contig_type;
    }

    pub fn quality(&self) -> f64 {
        self.quality
    }

    pub fn set_quality(&mut self, quality: f64) {
        self.quality = quality;
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.metadata
    }

    /// Number of aligned positions
    pub fn length(&self) -> i64 {
        self.query.length()
    }

    /// Current query length, re-checking that the subject still matches
    ///
    /// # Errors
    ///
    /// Returns `ContigError::LengthMismatch` if the invariant has been broken.
    pub fn alignment_length(&self) -> Result<i64, ContigError> {
        check_lengths(&self.query, &self.subject)?;
        Ok(self.query.length())
    }

    /// Deep copy under a fresh id
    #[must_use]
    pub fn copy(&self, ids: &ContigIdGenerator) -> Self {
        let mut copy = self.clone();
        copy.id = ids.next_id();
        copy
    }

    /// Query contexts and subject contexts are both equal
    pub fn same_context(&self, other: &Contig) -> bool {
        self.query.same_context(&other.query) && self.subject.same_context(&other.subject)
    }

    /// Flip both sides
    pub fn reverse_direction(&mut self) {
        self.query.reverse_direction();
        self.subject.reverse_direction();
    }

    /// Move the query start and end, mirroring the change onto the subject
    ///
    /// # Errors
    ///
    /// Returns `ContigError::Region` if either side would become invalid. The
    /// contig is left unchanged on error.
    pub fn modify_query(&mut self, start: i64, end: i64) -> Result<(), ContigError> {
        self.modify(Side::Query, Some(start), Some(end))
    }

    /// # Errors
    ///
    /// See [`Contig::modify_query`].
    pub fn modify_query_start(&mut self, start: i64) -> Result<(), ContigError> {
        self.modify(Side::Query, Some(start), None)
    }

    /// # Errors
    ///
    /// See [`Contig::modify_query`].
    pub fn modify_query_end(&mut self, end: i64) -> Result<(), ContigError> {
        self.modify(Side::Query, None, Some(end))
    }

    /// Move the query's left and right ends in position space
    ///
    /// # Errors
    ///
    /// See [`Contig::modify_query`].
    pub fn modify_query_ends(&mut self, left: i64, right: i64) -> Result<(), ContigError> {
        match self.query.direction() {
            Direction::Forward => self.modify_query(left, right),
            Direction::Reverse => self.modify_query(right, left),
        }
    }

    /// Move the subject start and end, mirroring the change onto the query
    ///
    /// # Errors
    ///
    /// See [`Contig::modify_query`].
    pub fn modify_subject(&mut self, start: i64, end: i64) -> Result<(), ContigError> {
        self.modify(Side::Subject, Some(start), Some(end))
    }

    /// # Errors
    ///
    /// See [`Contig::modify_query`].
    pub fn modify_subject_start(&mut self, start: i64) -> Result<(), ContigError> {
        self.modify(Side::Subject, Some(start), None)
    }

    /// # Errors
    ///
    /// See [`Contig::modify_query`].
    pub fn modify_subject_end(&mut self, end: i64) -> Result<(), ContigError> {
        self.modify(Side::Subject, None, Some(end))
    }

    fn modify(&mut self, side: Side, start: Option<i64>, end: Option<i64>) -> Result<(), ContigError> {
        let mut query = self.query.clone();
        let mut subject = self.subject.clone();
        let (moved, mirror) = match side {
            Side::Query => (&mut query, &mut subject),
            Side::Subject => (&mut subject, &mut query),
        };

        if let Some(start) = start {
            let delta = start_extension(moved, start);
            moved.region_mut().extend_start(delta)?;
            mirror.region_mut().extend_start(delta)?;
        }
        if let Some(end) = end {
            let delta = end_extension(moved, end);
            moved.region_mut().extend_end(delta)?;
            mirror.region_mut().extend_end(delta)?;
        }

        check_lengths(&query, &subject)?;
        query.discard_stale_sequence();
        subject.discard_stale_sequence();
        self.query = query;
        self.subject = subject;
        Ok(())
    }

    /// A copy whose query is trimmed to `start..end` and whose subject is
    /// trimmed by the same amounts
    ///
    /// # Errors
    ///
    /// Returns `ContigError::OutsideQuery` if either position falls outside
    /// the query, or `ContigError::Region` if `end` precedes `start`.
    pub fn sub_query(&self, start: i64, end: i64, ids: &ContigIdGenerator) -> Result<Contig, ContigError> {
        let from = self.query_distance(start)?;
        let to = self.query_distance(end)?;
        let query = self.query.sub_region(start, end)?;

        let mut trimmed = self.subject.region().clone();
        trimmed.extend_start(-from)?;
        trimmed.extend_end(-(self.length() - 1 - to))?;
        let subject = self.subject.sub_region(trimmed.start(), trimmed.end())?;

        check_lengths(&query, &subject)?;
        Ok(Contig {
            id: ids.next_id(),
            query,
            subject,
            contig_type: self.contig_type.clone(),
            quality: self.quality,
            metadata: self.metadata.clone(),
        })
    }

    fn query_distance(&self, position: i64) -> Result<i64, ContigError> {
        self.query
            .distance_from_start(position)
            .ok_or_else(|| ContigError::OutsideQuery {
                position,
                query: self.query.to_string(),
            })
    }

    /// Every sub-contig bounded by one of `starts` and one of `ends`.
    ///
    /// The contig's own start and end are added to the candidates. Pairs
    /// whose end precedes their start along the query are skipped. A given
    /// `contig_type` is applied to every returned contig, including the copy
    /// of this one.
    ///
    /// # Errors
    ///
    /// Returns `ContigError::OutsideQuery` if a candidate lies outside the query.
    pub fn divide_contig(
        &self,
        starts: &[i64],
        ends: &[i64],
        include_self: bool,
        contig_type: Option<ContigType>,
        ids: &ContigIdGenerator,
    ) -> Result<Vec<Contig>, ContigError> {
        let starts: Vec<i64> = starts.iter().copied().chain([self.query.start()]).collect();
        let ends: Vec<i64> = ends.iter().copied().chain([self.query.end()]).collect();

        let mut divided = Vec::with_capacity(starts.len() * ends.len() + 1);
        for &start in &starts {
            let from = self.query_distance(start)?;
            for &end in &ends {
                if self.query_distance(end)? < from {
                    continue;
                }
                let mut sub = self.sub_query(start, end, ids)?;
                if let Some(contig_type) = &contig_type {
                    sub.contig_type = contig_type.clone();
                }
                divided.push(sub);
            }
        }
        if include_self {
            let mut this = self.clone();
            if let Some(contig_type) = contig_type {
                this.contig_type = contig_type;
            }
            divided.push(this);
        }
        Ok(divided)
    }

    /// Append a consecutive contig to this one
    ///
    /// # Errors
    ///
    /// Returns `ContigError::ContextMismatch` if the contigs come from different
    /// sequences, `ContigError::NotConsecutive` unless both sides are
    /// consecutive, or `ContigError::SequenceMismatch` if only one side of a
    /// junction carries a sequence. The contig is left unchanged on error.
    pub fn fuse(&mut self, other: &Contig) -> Result<(), ContigError> {
        if !self.same_context(other) {
            return Err(ContigError::ContextMismatch {
                left: self.id,
                right: other.id,
            });
        }
        if !(self.query.consecutive_with(&other.query)?
            && self.subject.consecutive_with(&other.subject)?)
        {
            return Err(ContigError::NotConsecutive {
                left: self.id,
                right: other.id,
            });
        }

        let mut query = self.query.clone();
        let mut subject = self.subject.clone();
        query.fuse(&other.query)?;
        subject.fuse(&other.subject)?;
        check_lengths(&query, &subject)?;
        self.query = query;
        self.subject = subject;
        Ok(())
    }
}

impl std::fmt::Display for Contig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Contig {} ({}) query {} subject {}",
            self.id, self.contig_type, *self.query, *self.subject
        )
    }
}

fn check_lengths(query: &ContigRegion, subject: &ContigRegion) -> Result<(), ContigError> {
    if query.length() == subject.length() {
        Ok(())
    } else {
        Err(ContigError::LengthMismatch {
            query: query.length(),
            subject: subject.length(),
        })
    }
}

/// Signed growth at the start when the start moves to `position`
fn start_extension(fragment: &ContigRegion, position: i64) -> i64 {
    let context = fragment.context();
    match fragment.direction() {
        Direction::Forward => context.displacement(position, fragment.start()),
        Direction::Reverse => context.displacement(fragment.start(), position),
    }
}

/// Signed growth at the end when the end moves to `position`
fn end_extension(fragment: &ContigRegion, position: i64) -> i64 {
    let context = fragment.context();
    match fragment.direction() {
        Direction::Forward => context.displacement(fragment.end(), position),
        Direction::Reverse => context.displacement(position, fragment.end()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::context::Context;
    use crate::core::region::Region;

    fn frag(start: i64, end: i64, direction: Direction, ctx: &Arc<Context>) -> ContigRegion {
        ContigRegion::new(Region::new(start, end, direction, Arc::clone(ctx)).unwrap())
    }

    /// Forward query against a reverse subject on two plasmids
    fn example(ids: &ContigIdGenerator) -> Contig {
        let query_ctx = Arc::new(Context::circular(22240, 1).unwrap());
        let subject_ctx = Arc::new(Context::circular(9795, 1).unwrap());
        Contig::new(
            frag(1, 155, Direction::Forward, &query_ctx).with_filename("templates/target.gb"),
            frag(911, 757, Direction::Reverse, &subject_ctx).with_filename("templates/pRIAS.gb"),
            ContigType::Alignment,
            ids,
        )
        .unwrap()
    }

    fn assert_invariant(contig: &Contig) {
        assert_eq!(contig.query().length(), contig.subject().length());
        assert!(contig.alignment_length().is_ok());
    }

    #[test]
    fn test_constructor_rejects_length_mismatch() {
        let ids = ContigIdGenerator::new();
        let ctx = Arc::new(Context::circular(100, 1).unwrap());
        let result = Contig::new(
            frag(1, 2, Direction::Forward, &ctx),
            frag(1, 20, Direction::Forward, &ctx),
            ContigType::Alignment,
            &ids,
        );
        assert!(matches!(
            result,
            Err(ContigError::LengthMismatch {
                query: 2,
                subject: 20
            })
        ));
    }

    #[test]
    fn test_alignment_length() {
        let ids = ContigIdGenerator::new();
        let contig = example(&ids);
        assert_eq!(contig.alignment_length().unwrap(), 155);
        assert_eq!(contig.quality(), 1.0);
    }

    #[test]
    fn test_reverse_direction() {
        let ids = ContigIdGenerator::new();
        let query_ctx = Arc::new(Context::circular(22240, 1).unwrap());
        let subject_ctx = Arc::new(Context::circular(9795, 1).unwrap());
        let mut contig = Contig::new(
            frag(1, 6, Direction::Forward, &query_ctx).with_sequence("ACGTAG"),
            frag(911, 906, Direction::Reverse, &subject_ctx).with_sequence("TTGACC"),
            ContigType::Alignment,
            &ids,
        )
        .unwrap();

        contig.reverse_direction();
        assert_eq!((contig.query().start(), contig.query().end()), (6, 1));
        assert_eq!((contig.subject().start(), contig.subject().end()), (906, 911));
        assert_eq!(contig.query().sequence(), Some("GATGCA"));
        assert_eq!(contig.subject().sequence(), Some("CCAGTT"));
        assert_invariant(&contig);
    }

    #[test]
    fn test_copy_assigns_fresh_ids() {
        let ids = ContigIdGenerator::new();
        let contig = example(&ids);
        let first = contig.copy(&ids);
        let second = contig.copy(&ids);
        assert_ne!(first.id(), contig.id());
        assert_ne!(second.id(), contig.id());
        assert_ne!(first.id(), second.id());
        assert_eq!(first.query(), contig.query());
        assert_eq!(ids.issued(), 3);
    }

    #[test]
    fn test_modify_query_start() {
        let ids = ContigIdGenerator::new();
        let mut contig = example(&ids);

        contig.modify_query_start(140).unwrap();
        assert_eq!(contig.query().start(), 140);
        assert_eq!(contig.subject().start(), 772);
        assert_invariant(&contig);

        contig.modify_query_start(-138).unwrap();
        assert_eq!(contig.query().start(), 22102);
        assert_eq!(contig.query().length(), 294);
        assert_invariant(&contig);

        let before = contig.clone();
        assert!(matches!(
            contig.modify_query_start(1566),
            Err(ContigError::Region(_))
        ));
        assert_eq!(contig, before);
    }

    #[test]
    fn test_modify_query_end() {
        let ids = ContigIdGenerator::new();
        let mut contig = example(&ids);

        contig.modify_query_end(294).unwrap();
        assert_eq!(contig.query().end(), 294);
        assert_eq!(contig.subject().end(), 618);
        assert_invariant(&contig);

        contig.modify_query_end(16).unwrap();
        assert_eq!(contig.query().end(), 16);
        assert_eq!(contig.subject().end(), 896);
        assert_invariant(&contig);

        assert!(contig.modify_query_end(-1000).is_err());
        assert_eq!(contig.query().end(), 16);
        assert_invariant(&contig);
    }

    #[test]
    fn test_modify_subject() {
        let ids = ContigIdGenerator::new();
        let mut contig = example(&ids);
        contig.modify_subject(921, 767).unwrap();
        assert_eq!((contig.query().start(), contig.query().end()), (22231, 145));
        assert_eq!((contig.subject().start(), contig.subject().end()), (921, 767));
        assert_invariant(&contig);
    }

    #[test]
    fn test_modify_query() {
        let ids = ContigIdGenerator::new();
        let mut contig = example(&ids);
        contig.modify_query(-9, 145).unwrap();
        assert_eq!((contig.query().start(), contig.query().end()), (22231, 145));
        assert_eq!((contig.subject().start(), contig.subject().end()), (921, 767));
        assert_invariant(&contig);
    }

    #[test]
    fn test_modify_query_ends() {
        let ids = ContigIdGenerator::new();
        let mut contig = example(&ids);
        contig.modify_query_ends(16, 145).unwrap();
        assert_eq!(contig.query().left_end(), 16);
        assert_eq!(contig.query().right_end(), 145);
        assert_invariant(&contig);
    }

    #[test]
    fn test_modify_linear_is_atomic() {
        let ids = ContigIdGenerator::new();
        let query_ctx = Arc::new(Context::linear(1000, 1).unwrap());
        let subject_ctx = Arc::new(Context::linear(100, 1).unwrap());
        let mut contig = Contig::new(
            frag(500, 549, Direction::Forward, &query_ctx),
            frag(51, 100, Direction::Forward, &subject_ctx),
            ContigType::Alignment,
            &ids,
        )
        .unwrap();
        let before = contig.clone();
        // query could grow but the subject would run off its end
        assert!(contig.modify_query_end(560).is_err());
        assert_eq!(contig, before);
    }

    #[test]
    fn test_sub_query() {
        let ids = ContigIdGenerator::new();
        let query_ctx = Arc::new(Context::circular(10000, 1).unwrap());
        let subject_ctx = Arc::new(Context::circular(5000, 1).unwrap());
        let contig = Contig::new(
            frag(100, 300, Direction::Forward, &query_ctx),
            frag(500, 700, Direction::Forward, &subject_ctx),
            ContigType::Alignment,
            &ids,
        )
        .unwrap();

        let first = contig.sub_query(200, 250, &ids).unwrap();
        assert_eq!(first.length(), 51);
        assert_eq!((first.subject().start(), first.subject().end()), (600, 650));
        let second = contig.sub_query(220, 300, &ids).unwrap();
        assert_eq!(second.length(), 81);
        assert_ne!(first.id(), second.id());

        assert!(matches!(
            contig.sub_query(50, 250, &ids),
            Err(ContigError::OutsideQuery { position: 50, .. })
        ));
        assert!(contig.sub_query(250, 200, &ids).is_err());
    }

    #[test]
    fn test_sub_query_reverse_subject() {
        let ids = ContigIdGenerator::new();
        let contig = example(&ids);
        let sub = contig.sub_query(11, 20, &ids).unwrap();
        assert_eq!((sub.subject().start(), sub.subject().end()), (901, 892));
        assert_invariant(&sub);
    }

    #[test]
    fn test_divide_contig() {
        let ids = ContigIdGenerator::new();
        let query_ctx = Arc::new(Context::circular(10000, 1).unwrap());
        let subject_ctx = Arc::new(Context::circular(8000, 1).unwrap());
        let contig = Contig::new(
            frag(1000, 3000, Direction::Forward, &query_ctx),
            frag(5000, 7000, Direction::Forward, &subject_ctx),
            ContigType::Alignment,
            &ids,
        )
        .unwrap();

        let divided = contig
            .divide_contig(&[1100, 1200], &[2000, 2200, 2300], false, Some(ContigType::Product), &ids)
            .unwrap();
        assert_eq!(divided.len(), 12);
        assert!(divided.iter().all(|c| *c.contig_type() == ContigType::Product));
        divided.iter().for_each(assert_invariant);

        let divided = contig
            .divide_contig(&[1100, 1200], &[2000, 2200, 2300], true, None, &ids)
            .unwrap();
        assert_eq!(divided.len(), 13);
        assert!(divided.iter().any(|c| c.id() == contig.id()));

        let divided = contig
            .divide_contig(&[1100], &[2000], true, Some(ContigType::Product), &ids)
            .unwrap();
        let this = divided.iter().find(|c| c.id() == contig.id()).unwrap();
        assert_eq!(*this.contig_type(), ContigType::Product);
        assert!(divided.iter().all(|c| *c.contig_type() == ContigType::Product));

        assert!(contig
            .divide_contig(&[10], &[2000], false, None, &ids)
            .is_err());
    }

    fn fuse_pair(ids: &ContigIdGenerator) -> (Contig, Contig) {
        let query_ctx = Arc::new(Context::circular(10000, 1).unwrap());
        let subject_ctx = Arc::new(Context::circular(5100, 1).unwrap());
        let left = Contig::new(
            frag(100, 300, Direction::Forward, &query_ctx),
            frag(500, 700, Direction::Forward, &subject_ctx),
            ContigType::Alignment,
            ids,
        )
        .unwrap();
        let right = Contig::new(
            frag(301, 600, Direction::Forward, &query_ctx),
            frag(701, 1000, Direction::Forward, &subject_ctx),
            ContigType::Alignment,
            ids,
        )
        .unwrap();
        (left, right)
    }

    #[test]
    fn test_fuse() {
        let ids = ContigIdGenerator::new();
        let (mut left, right) = fuse_pair(&ids);
        left.fuse(&right).unwrap();
        assert_eq!(left.query().end(), 600);
        assert_eq!(left.subject().end(), 1000);
        assert_invariant(&left);
    }

    #[test]
    fn test_fuse_joins_sequences() {
        let ids = ContigIdGenerator::new();
        let (left, right) = fuse_pair(&ids);
        let seq = |c: char, n: i64| c.to_string().repeat(usize::try_from(n).unwrap());

        let mut left = Contig {
            query: left.query.clone().with_sequence(seq('A', 201)),
            subject: left.subject.clone().with_sequence(seq('B', 201)),
            ..left
        };
        let right = Contig {
            query: right.query.clone().with_sequence(seq('C', 300)),
            subject: right.subject.clone().with_sequence(seq('D', 300)),
            ..right
        };
        left.fuse(&right).unwrap();
        assert_eq!(left.query().sequence(), Some(format!("{}{}", seq('A', 201), seq('C', 300)).as_str()));
        assert_eq!(left.subject().sequence(), Some(format!("{}{}", seq('B', 201), seq('D', 300)).as_str()));
    }

    #[test]
    fn test_fuse_rejects_one_sided_sequence() {
        let ids = ContigIdGenerator::new();
        let (left, right) = fuse_pair(&ids);
        let mut left = Contig {
            query: left.query.clone().with_sequence("A".repeat(201)),
            ..left
        };
        let before = left.clone();
        assert!(matches!(
            left.fuse(&right),
            Err(ContigError::SequenceMismatch { .. })
        ));
        assert_eq!(left, before);
    }

    #[test]
    fn test_fuse_rejects_other_context() {
        let ids = ContigIdGenerator::new();
        let (_, right) = fuse_pair(&ids);
        let other_query = Arc::new(Context::circular(5100, 1).unwrap());
        let subject_ctx = Arc::clone(right.subject().context());
        let mut stray = Contig::new(
            frag(301, 600, Direction::Forward, &other_query),
            frag(701, 1000, Direction::Forward, &subject_ctx),
            ContigType::Alignment,
            &ids,
        )
        .unwrap();
        assert!(matches!(
            stray.fuse(&right),
            Err(ContigError::ContextMismatch { .. })
        ));
    }

    #[test]
    fn test_fuse_rejects_gap() {
        let ids = ContigIdGenerator::new();
        let (left, mut right) = fuse_pair(&ids);
        assert!(matches!(
            right.fuse(&left),
            Err(ContigError::NotConsecutive { .. })
        ));
        assert_eq!(right.query().end(), 600);
    }
}
