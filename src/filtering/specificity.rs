//! Off-target screening from aligner hit reports.
//!
//! A candidate is unique when every reference it aligns to is a transcript variant of
//! the target gene. Whether a reference is a variant is decided by fetching its record
//! and looking for the gene name in the description; each reference is looked up at
//! most once per target run thanks to the [`VariantMemo`].

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::external::{ExternalError, RecordSource};
use crate::filtering::RejectionMask;
use crate::parsing::alignment_report::{AlignmentHit, NO_ALIGNMENT};

/// Classification of a reference sequence relative to the target gene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Variant,
    OffTarget,
}

/// Reference classifications already known within one target run.
///
/// Seeded with the no-alignment marker, which always counts as a variant.
#[derive(Debug, Clone)]
pub struct VariantMemo {
    known: HashMap<String, Classification>,
}

impl Default for VariantMemo {
    fn default() -> Self {
        Self::new()
    }
}

impl VariantMemo {
    #[must_use]
    pub fn new() -> Self {
        let mut known = HashMap::new();
        known.insert(NO_ALIGNMENT.to_string(), Classification::Variant);
        Self { known }
    }

    #[must_use]
    pub fn get(&self, reference: &str) -> Option<Classification> {
        self.known.get(reference).copied()
    }

    pub fn insert(&mut self, reference: &str, classification: Classification) {
        self.known.insert(reference.to_string(), classification);
    }

    /// Number of references confirmed as variants, the no-alignment marker included
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.known
            .values()
            .filter(|&&c| c == Classification::Variant)
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.known.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

/// Decides candidate uniqueness for one target gene.
///
/// Keep one oracle for all reports of a target run so the memo is shared between them.
pub struct SpecificityOracle<'a> {
    gene: String,
    source: &'a dyn RecordSource,
    memo: VariantMemo,
    lookups: usize,
    memo_hits: usize,
}

impl<'a> SpecificityOracle<'a> {
    pub fn new(gene: &str, source: &'a dyn RecordSource) -> Self {
        Self {
            gene: gene.to_lowercase(),
            source,
            memo: VariantMemo::new(),
            lookups: 0,
            memo_hits: 0,
        }
    }

    /// Number of record fetches issued so far
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    /// Number of classifications served from the memo so far
    #[must_use]
    pub fn memo_hits(&self) -> usize {
        self.memo_hits
    }

    #[must_use]
    pub fn memo(&self) -> &VariantMemo {
        &self.memo
    }

    /// Classify `reference`, fetching its description only if it is not memoised.
    ///
    /// # Errors
    ///
    /// Returns an `ExternalError` if the record cannot be fetched.
    pub fn classify(&mut self, reference: &str) -> Result<Classification, ExternalError> {
        if let Some(known) = self.memo.get(reference) {
            self.memo_hits += 1;
            return Ok(known);
        }

        self.lookups += 1;
        let description = self.source.fetch_description(reference)?;
        let classification = if description.to_lowercase().contains(&self.gene) {
            Classification::Variant
        } else {
            Classification::OffTarget
        };
        debug!("{} classified as {:?}", reference, classification);

        self.memo.insert(reference, classification);
        Ok(classification)
    }

    /// Non-uniqueness flag for each offset in `live`, in the same order.
    ///
    /// Unaligned hits and hits whose offset is not live are ignored. Hits from both parts of a two-part
    /// query count towards the same offset, so a candidate is non-unique if either
    /// part hits an off-target reference.
    ///
    /// # Errors
    ///
    /// Returns an `ExternalError` if a record lookup fails.
    pub fn non_unique(
        &mut self,
        hits: &[AlignmentHit],
        live: &[usize],
    ) -> Result<Vec<bool>, ExternalError> {
        let live_set: HashSet<usize> = live.iter().copied().collect();

        let mut grouped: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for hit in hits {
            let offset = hit.query.offset();
            if hit.is_aligned() && live_set.contains(&offset) {
                grouped.entry(offset).or_default().push(&hit.reference);
            }
        }

        let mut off_target: HashSet<usize> = HashSet::new();
        for (offset, references) in grouped {
            for reference in references {
                if self.classify(reference)? == Classification::OffTarget {
                    off_target.insert(offset);
                    break;
                }
            }
        }

        Ok(live.iter().map(|o| off_target.contains(o)).collect())
    }

    /// Same as [`SpecificityOracle::non_unique`], as a mask over `total` offsets.
    ///
    /// # Errors
    ///
    /// Returns an `ExternalError` if a record lookup fails.
    pub fn rejection_mask(
        &mut self,
        hits: &[AlignmentHit],
        live: &[usize],
        total: usize,
    ) -> Result<RejectionMask, ExternalError> {
        let flags = self.non_unique(hits, live)?;
        let mut mask = RejectionMask::new(total);
        for (&offset, _) in live.iter().zip(flags).filter(|(_, bad)| *bad) {
            mask.reject(offset);
        }
        Ok(mask)
    }
}
