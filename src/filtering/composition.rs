use serde::Serialize;
use tracing::debug;

use crate::core::candidate::Candidate;
use crate::core::sequence::{gc_percent, has_forbidden_run};
use crate::external::{ExternalError, Thermodynamics};
use crate::filtering::RejectionMask;

/// Sequence-composition criteria applied to each probe half
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompositionFilter {
    /// Inclusive GC% bounds
    pub gc_low: f64,
    pub gc_high: f64,
    /// Halves whose hairpin ΔG (kcal/mol) is at or below this are rejected
    pub dg_threshold: f64,
}

impl Default for CompositionFilter {
    fn default() -> Self {
        Self {
            gc_low: 40.0,
            gc_high: 60.0,
            dg_threshold: -9.0,
        }
    }
}

/// Per-criterion rejections over every candidate offset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionReport {
    pub bad_gc: RejectionMask,
    pub bad_repeats: RejectionMask,
    pub bad_hairpin: RejectionMask,
}

impl CompositionReport {
    /// A candidate fails composition if any criterion rejects it
    #[must_use]
    pub fn combined(&self) -> RejectionMask {
        self.bad_gc.clone() | self.bad_repeats.clone() | self.bad_hairpin.clone()
    }
}

impl CompositionFilter {
    #[must_use]
    pub fn gc_rejected(&self, half: &str) -> bool {
        let gc = gc_percent(half.as_bytes());
        gc < self.gc_low || gc > self.gc_high
    }

    #[must_use]
    pub fn repeat_rejected(half: &str) -> bool {
        has_forbidden_run(half.as_bytes())
    }

    #[must_use]
    pub fn hairpin_rejected(&self, dg: f64) -> bool {
        dg <= self.dg_threshold
    }

    /// Evaluate all three criteria on both halves of every candidate.
    ///
    /// `candidates` must be indexed by offset, as produced by the enumerator.
    ///
    /// # Errors
    ///
    /// Returns an `ExternalError` if the thermodynamics engine fails.
    pub fn evaluate(
        &self,
        candidates: &[Candidate],
        thermo: &dyn Thermodynamics,
    ) -> Result<CompositionReport, ExternalError> {
        let n = candidates.len();
        let mut bad_gc = RejectionMask::new(n);
        let mut bad_repeats = RejectionMask::new(n);
        let mut bad_hairpin = RejectionMask::new(n);

        for candidate in candidates {
            let halves = [candidate.half_a.as_str(), candidate.half_b.as_str()];
            if halves.iter().any(|h| self.gc_rejected(h)) {
                bad_gc.reject(candidate.offset);
            }
            if halves.iter().any(|h| Self::repeat_rejected(h)) {
                bad_repeats.reject(candidate.offset);
            }
        }

        let halves: Vec<&str> = candidates
            .iter()
            .flat_map(|c| [c.half_a.as_str(), c.half_b.as_str()])
            .collect();
        let energies = thermo.hairpin_dgs(&halves)?;

        for (candidate, pair) in candidates.iter().zip(energies.chunks(2)) {
            if pair.iter().any(|&dg| self.hairpin_rejected(dg)) {
                bad_hairpin.reject(candidate.offset);
            }
        }

        debug!(
            "Composition: {} GC, {} repeat, {} hairpin rejections of {} candidates",
            bad_gc.count_rejected(),
            bad_repeats.count_rejected(),
            bad_hairpin.count_rejected(),
            n
        );

        Ok(CompositionReport {
            bad_gc,
            bad_repeats,
            bad_hairpin,
        })
    }
}
