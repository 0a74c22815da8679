use serde::Serialize;

use crate::core::candidate::Candidate;
use crate::core::scaffold::{HcrScaffold, PadlockScaffold, ProbeScaffold, PHOSPHORYLATION_MARK};
use crate::core::types::{Part, ProbeScheme, QueryId};
use crate::filtering::structure::{BondCounts, StrandPair};

/// Final oligos for one selected position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum AssembledProbe {
    Hcr {
        probe_a: String,
        probe_b: String,
    },
    Padlock {
        primer: String,
        /// Carries the 5' phosphorylation mark
        padlock: String,
        bonds: Option<BondCounts>,
    },
}

impl AssembledProbe {
    /// The two oligos in output order
    #[must_use]
    pub fn oligos(&self) -> (&str, &str) {
        match self {
            Self::Hcr { probe_a, probe_b } => (probe_a.as_str(), probe_b.as_str()),
            Self::Padlock {
                primer, padlock, ..
            } => (primer.as_str(), padlock.as_str()),
        }
    }
}

/// `initiator 5' half + spacer + half_b` and `half_a + spacer + initiator 3' half`
#[must_use]
pub fn hcr_pair(scaffold: &HcrScaffold, candidate: &Candidate) -> (String, String) {
    let (head, tail) = scaffold.split_initiator();
    let probe_a = format!("{head}{}{}", scaffold.spacers.0, candidate.half_b);
    let probe_b = format!("{}{}{tail}", candidate.half_a, scaffold.spacers.1);
    (probe_a, probe_b)
}

/// Unphosphorylated primer and padlock for one candidate
#[must_use]
pub fn padlock_pair(scaffold: &PadlockScaffold, candidate: &Candidate) -> StrandPair {
    StrandPair {
        offset: candidate.offset,
        primer: format!("{}{}", candidate.half_a, scaffold.primer_end),
        padlock: format!(
            "{}{}{}{}{}{}",
            scaffold.padlock_start,
            candidate.half_b,
            scaffold.spacer1,
            scaffold.ugi,
            scaffold.spacer2,
            scaffold.padlock_end
        ),
    }
}

/// Queries written to one FASTA file and aligned as one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBatch {
    /// Used in work file names
    pub label: &'static str,
    pub queries: Vec<(QueryId, String)>,
}

impl QueryBatch {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            queries: Vec::new(),
        }
    }
}

/// Attaches a scheme's scaffold to candidate halves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAssembler {
    scaffold: ProbeScaffold,
}

impl ProbeAssembler {
    #[must_use]
    pub fn new(scaffold: ProbeScaffold) -> Self {
        Self { scaffold }
    }

    #[must_use]
    pub fn scheme(&self) -> ProbeScheme {
        match self.scaffold {
            ProbeScaffold::Hcr(_) => ProbeScheme::Hcr,
            ProbeScaffold::Padlock(_) => ProbeScheme::Padlock,
        }
    }

    #[must_use]
    pub fn scaffold(&self) -> &ProbeScaffold {
        &self.scaffold
    }

    /// Aligner queries for the assembled oligos of `candidates`, one batch per report.
    ///
    /// HCR yields one batch with both probes as parts `-1` and `-2`; the padlock
    /// scheme yields a primer batch and a padlock batch with single-part ids.
    #[must_use]
    pub fn assembled_queries(&self, candidates: &[&Candidate]) -> Vec<QueryBatch> {
        match &self.scaffold {
            ProbeScaffold::Hcr(scaffold) => {
                let mut probes = QueryBatch::new("probes");
                for candidate in candidates {
                    let (probe_a, probe_b) = hcr_pair(scaffold, candidate);
                    probes
                        .queries
                        .push((QueryId::split(candidate.offset, Part::First), probe_a));
                    probes
                        .queries
                        .push((QueryId::split(candidate.offset, Part::Second), probe_b));
                }
                vec![probes]
            }
            ProbeScaffold::Padlock(scaffold) => {
                let mut primers = QueryBatch::new("primers");
                let mut padlocks = QueryBatch::new("padlocks");
                for candidate in candidates {
                    let pair = padlock_pair(scaffold, candidate);
                    let id = QueryId::single(candidate.offset);
                    primers.queries.push((id, pair.primer));
                    padlocks.queries.push((id, pair.padlock));
                }
                vec![primers, padlocks]
            }
        }
    }

    /// Strand pairs for the secondary-structure screen; empty for HCR
    #[must_use]
    pub fn strand_pairs(&self, candidates: &[&Candidate]) -> Vec<StrandPair> {
        match &self.scaffold {
            ProbeScaffold::Hcr(_) => Vec::new(),
            ProbeScaffold::Padlock(scaffold) => candidates
                .iter()
                .map(|c| padlock_pair(scaffold, c))
                .collect(),
        }
    }

    /// Final oligos for a selected candidate
    #[must_use]
    pub fn assemble(&self, candidate: &Candidate, bonds: Option<BondCounts>) -> AssembledProbe {
        match &self.scaffold {
            ProbeScaffold::Hcr(scaffold) => {
                let (probe_a, probe_b) = hcr_pair(scaffold, candidate);
                AssembledProbe::Hcr { probe_a, probe_b }
            }
            ProbeScaffold::Padlock(scaffold) => {
                let pair = padlock_pair(scaffold, candidate);
                AssembledProbe::Padlock {
                    primer: pair.primer,
                    padlock: format!("{PHOSPHORYLATION_MARK}{}", pair.padlock),
                    bonds,
                }
            }
        }
    }
}
