//! Candidate filtering and position selection.
//!
//! Every filter is an independent predicate stage producing a [`RejectionMask`] over all
//! candidate offsets of one target. Stages are combined with a logical OR, and the
//! [`PositionSelector`](selection::PositionSelector) walks the combined mask:
//!
//! ```text
//! candidates ──► composition ──┐
//!            ──► structure ────┼── OR ──► selection
//!            ──► specificity ──┘
//! ```
//!
//! - [`composition`]: GC%, homopolymer runs and hairpin ΔG on each probe half
//! - [`structure`]: unpaired flanks of assembled primer/padlock strands (padlock scheme only)
//! - [`specificity`]: off-target alignments classified through a memoised record lookup
//! - [`selection`]: greedy in-bounds, spaced position selection

pub mod composition;
pub mod selection;
pub mod specificity;
pub mod structure;

use serde::Serialize;

/// One rejection flag per candidate offset; `true` means rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RejectionMask(Vec<bool>);

impl RejectionMask {
    /// Mask of `len` offsets with nothing rejected
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self(vec![false; len])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mark `offset` as rejected. Offsets beyond the mask are ignored.
    pub fn reject(&mut self, offset: usize) {
        if let Some(flag) = self.0.get_mut(offset) {
            *flag = true;
        }
    }

    /// Offsets past the end of the mask count as rejected.
    #[must_use]
    pub fn is_rejected(&self, offset: usize) -> bool {
        self.0.get(offset).copied().unwrap_or(true)
    }

    /// Fold another stage's rejections into this mask.
    ///
    /// The result covers the longer of the two masks; offsets only one side knows
    /// about keep that side's flag.
    pub fn union_with(&mut self, other: &RejectionMask) {
        if other.0.len() > self.0.len() {
            self.0.resize(other.0.len(), false);
        }
        for (flag, &rejected) in self.0.iter_mut().zip(&other.0) {
            *flag |= rejected;
        }
    }

    /// Offsets that are still accepted, in ascending order
    #[must_use]
    pub fn live_offsets(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(offset, &rejected)| (!rejected).then_some(offset))
            .collect()
    }

    #[must_use]
    pub fn count_rejected(&self) -> usize {
        self.0.iter().filter(|&&rejected| rejected).count()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

impl From<Vec<bool>> for RejectionMask {
    fn from(flags: Vec<bool>) -> Self {
        Self(flags)
    }
}

impl std::ops::BitOr for RejectionMask {
    type Output = RejectionMask;

    fn bitor(mut self, rhs: RejectionMask) -> RejectionMask {
        self.union_with(&rhs);
        self
    }
}
