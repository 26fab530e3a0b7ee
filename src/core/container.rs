//! The set of candidate contigs for one target.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::core::contig::{Contig, ContigError, ContigId, ContigIdGenerator, ContigType};

/// Owns every contig of a planning run, keyed by id.
///
/// The container also owns the [`ContigIdGenerator`], so contigs created by
/// its cleanup operations never collide with contigs added by the caller as
/// long as both draw ids from [`ContigContainer::ids`].
#[derive(Debug, Default)]
pub struct ContigContainer {
    contigs: BTreeMap<ContigId, Contig>,
    ids: ContigIdGenerator,
}

impl ContigContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id source for contigs destined for this container
    pub fn ids(&self) -> &ContigIdGenerator {
        &self.ids
    }

    /// # Errors
    ///
    /// Returns `ContigError::DuplicateId` if a contig with the same id is
    /// already present.
    pub fn add_contig(&mut self, contig: Contig) -> Result<(), ContigError> {
        let id = contig.id();
        if self.contigs.contains_key(&id) {
            return Err(ContigError::DuplicateId(id));
        }
        self.contigs.insert(id, contig);
        Ok(())
    }

    /// # Errors
    ///
    /// See [`ContigContainer::add_contig`].
    pub fn add_contigs(&mut self, contigs: impl IntoIterator<Item = Contig>) -> Result<(), ContigError> {
        for contig in contigs {
            self.add_contig(contig)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ContigError::NotFound` if no contig has this id.
    pub fn remove(&mut self, id: ContigId) -> Result<Contig, ContigError> {
        self.contigs.remove(&id).ok_or(ContigError::NotFound(id))
    }

    pub fn get(&self, id: ContigId) -> Option<&Contig> {
        self.contigs.get(&id)
    }

    pub fn contains(&self, id: ContigId) -> bool {
        self.contigs.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    /// Contigs in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Contig> {
        self.contigs.values()
    }

    pub fn contig_ids(&self) -> impl Iterator<Item = ContigId> + '_ {
        self.contigs.keys().copied()
    }

    /// Contigs ordered by query start, ties broken by id
    pub fn sorted_contigs(&self, reverse: bool) -> Vec<&Contig> {
        let mut sorted: Vec<&Contig> = self.contigs.values().collect();
        sorted.sort_by_key(|c| (c.query().start(), c.id()));
        if reverse {
            sorted.reverse();
        }
        sorted
    }

    /// Keep only the lowest-id contig for each distinct query start/end.
    ///
    /// Returns the number of contigs removed.
    pub fn remove_redundant_contigs(&mut self) -> usize {
        let mut seen = HashSet::new();
        let before = self.contigs.len();
        self.contigs
            .retain(|_, c| seen.insert((c.query().start(), c.query().end())));
        let removed = before - self.contigs.len();
        debug!(removed, remaining = self.contigs.len(), "Removed redundant contigs");
        removed
    }

    /// Re-join contigs that an aligner split only because they cross the
    /// origin of a circular sequence.
    ///
    /// A pair is fused when both sides share coordinate spaces and are
    /// consecutive on the query and on the subject. The right contig is
    /// removed after fusion. Returns the number of fusions.
    ///
    /// # Errors
    ///
    /// Returns `ContigError` if a qualifying pair fails to fuse.
    pub fn fuse_circular_fragments(&mut self) -> Result<usize, ContigError> {
        let ids: Vec<ContigId> = self.contig_ids().collect();
        let mut fused = 0;
        for &left in &ids {
            for &right in &ids {
                if left == right {
                    continue;
                }
                let (Some(l), Some(r)) = (self.contigs.get(&left), self.contigs.get(&right)) else {
                    continue;
                };
                if !fuse_condition(l, r) {
                    continue;
                }
                let right_contig = self.remove(right)?;
                let Some(l) = self.contigs.get_mut(&left) else {
                    continue;
                };
                if let Err(err) = l.fuse(&right_contig) {
                    self.contigs.insert(right, right_contig);
                    return Err(err);
                }
                debug!(left = %left, right = %right, "Fused contigs across origin");
                fused += 1;
            }
        }
        Ok(fused)
    }

    /// Split contigs at positions `length` away from every contig's ends so
    /// that shorter fragments exist for closing a circular assembly.
    ///
    /// Cut points are each contig's `query.start + length` and
    /// `query.end - length` that fall within the query context. Every contig
    /// that strictly contains a cut point gains two new halves of type
    /// [`ContigType::CircularPartition`] sharing that point. Originals are
    /// kept. Returns the ids of the new contigs.
    ///
    /// # Errors
    ///
    /// Returns `ContigError` if a half cannot be built.
    pub fn circular_partition(&mut self, length: i64) -> Result<Vec<ContigId>, ContigError> {
        let mut cuts: Vec<i64> = Vec::new();
        for contig in self.contigs.values() {
            let query = contig.query();
            for cut in [query.start() + length, query.end() - length] {
                if query.context().within_bounds(cut, true) && !cuts.contains(&cut) {
                    cuts.push(cut);
                }
            }
        }

        let mut halves = Vec::new();
        for contig in self.contigs.values() {
            let query = contig.query();
            for &cut in &cuts {
                if !query.within_region(cut, false) {
                    continue;
                }
                for (start, end) in [(query.start(), cut), (cut, query.end())] {
                    let mut half = contig.sub_query(start, end, &self.ids)?;
                    half.set_contig_type(ContigType::CircularPartition);
                    halves.push(half);
                }
            }
        }

        let new_ids: Vec<ContigId> = halves.iter().map(Contig::id).collect();
        self.add_contigs(halves)?;
        debug!(cuts = cuts.len(), added = new_ids.len(), "Partitioned contigs");
        Ok(new_ids)
    }
}

fn fuse_condition(left: &Contig, right: &Contig) -> bool {
    left.same_context(right)
        && left
            .query()
            .consecutive_with(right.query())
            .unwrap_or(false)
        && left
            .subject()
            .consecutive_with(right.subject())
            .unwrap_or(false)
}

impl<'a> IntoIterator for &'a ContigContainer {
    type Item = &'a Contig;
    type IntoIter = std::collections::btree_map::Values<'a, ContigId, Contig>;

    fn into_iter(self) -> Self::IntoIter {
        self.contigs.values()
    }
}
