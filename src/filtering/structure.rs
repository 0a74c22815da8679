//! Secondary-structure screen for assembled primer and padlock strands.
//!
//! A strand with no paired bases always passes. Otherwise the unpaired run next to
//! each functional literal must be longer than that literal, so the literal stays
//! free to hybridise:
//!
//! ```text
//! primer   [ binding half | primer end ]            trailing run > len(primer end)
//! padlock  [ start | binding half | ... | end ]      leading run > len(start)
//!                                                     trailing run > len(end)
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::external::{ExternalError, Thermodynamics};
use crate::filtering::RejectionMask;

/// Which strand a structure belongs to, with the literal lengths its flanks must exceed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrandRole {
    Primer { linker: usize },
    Padlock { leading: usize, trailing: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StructureVerdict {
    pub rejected: bool,
    /// Number of base pairs (opening brackets) in the structure
    pub bond_count: usize,
}

fn leading_unpaired(structure: &str) -> usize {
    structure.chars().take_while(|&c| c == '.').count()
}

fn trailing_unpaired(structure: &str) -> usize {
    structure.chars().rev().take_while(|&c| c == '.').count()
}

/// Judge one dot-bracket structure.
///
/// `)` and `+` both end an unpaired run, like `(`.
#[must_use]
pub fn assess_structure(structure: &str, role: StrandRole) -> StructureVerdict {
    let bond_count = structure.chars().filter(|&c| c == '(').count();
    if bond_count == 0 {
        return StructureVerdict {
            rejected: false,
            bond_count,
        };
    }

    let passes = match role {
        StrandRole::Primer { linker } => trailing_unpaired(structure) > linker,
        StrandRole::Padlock { leading, trailing } => {
            leading_unpaired(structure) > leading && trailing_unpaired(structure) > trailing
        }
    };

    StructureVerdict {
        rejected: !passes,
        bond_count,
    }
}

/// Assembled primer and padlock for one candidate offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrandPair {
    pub offset: usize,
    pub primer: String,
    pub padlock: String,
}

/// Base-pair counts of a candidate's (primer, padlock) structures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BondCounts {
    pub primer: usize,
    pub padlock: usize,
}

impl std::fmt::Display for BondCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.primer, self.padlock)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureReport {
    pub rejected: RejectionMask,
    /// Bond counts for every evaluated offset
    pub bonds: BTreeMap<usize, BondCounts>,
}

/// Literal lengths used to judge primer and padlock structures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondaryStructureFilter {
    pub primer_end: usize,
    pub padlock_start: usize,
    pub padlock_end: usize,
}

impl SecondaryStructureFilter {
    /// Fold every strand pair and reject offsets where either strand fails.
    ///
    /// The returned mask covers `total` offsets; offsets without a strand pair are
    /// left unrejected.
    ///
    /// # Errors
    ///
    /// Returns an `ExternalError` if the thermodynamics engine fails.
    pub fn evaluate(
        &self,
        total: usize,
        strands: &[StrandPair],
        thermo: &dyn Thermodynamics,
    ) -> Result<StructureReport, ExternalError> {
        let mut rejected = RejectionMask::new(total);
        let mut bonds = BTreeMap::new();

        // Primer and padlock of each pair, folded in one batch
        let sequences: Vec<&str> = strands
            .iter()
            .flat_map(|pair| [pair.primer.as_str(), pair.padlock.as_str()])
            .collect();
        let structures = thermo.mfe_structures(&sequences)?;
        if structures.len() != sequences.len() {
            return Err(ExternalError::UnexpectedOutput {
                tool: "thermodynamics",
                message: format!(
                    "expected {} structures, found {}",
                    sequences.len(),
                    structures.len()
                ),
            });
        }

        for (pair, folded) in strands.iter().zip(structures.chunks(2)) {
            let primer = assess_structure(
                &folded[0],
                StrandRole::Primer {
                    linker: self.primer_end,
                },
            );
            let padlock = assess_structure(
                &folded[1],
                StrandRole::Padlock {
                    leading: self.padlock_start,
                    trailing: self.padlock_end,
                },
            );

            if primer.rejected || padlock.rejected {
                rejected.reject(pair.offset);
            }
            bonds.insert(
                pair.offset,
                BondCounts {
                    primer: primer.bond_count,
                    padlock: padlock.bond_count,
                },
            );
        }

        debug!(
            "Secondary structure: {} of {} strand pairs rejected",
            rejected.count_rejected(),
            strands.len()
        );

        Ok(StructureReport { rejected, bonds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpaired_structure_passes() {
        let verdict = assess_structure("..........", StrandRole::Primer { linker: 12 });
        assert!(!verdict.rejected);
        assert_eq!(verdict.bond_count, 0);
    }

    #[test]
    fn test_primer_needs_free_linker() {
        let role = StrandRole::Primer { linker: 3 };
        assert!(!assess_structure("((...))....", role).rejected);
        assert!(assess_structure("((...)).....((.))...", role).rejected);
        assert!(assess_structure("((....))", role).rejected);
        assert_eq!(assess_structure("((...))....", role).bond_count, 2);
    }

    #[test]
    fn test_padlock_needs_both_flanks_free() {
        let role = StrandRole::Padlock {
            leading: 2,
            trailing: 2,
        };
        assert!(!assess_structure("...((...)).....", role).rejected);
        assert!(assess_structure("..((...)).....", role).rejected);
        assert!(assess_structure("...((...))..", role).rejected);
    }

    #[test]
    fn test_plus_ends_a_run() {
        let role = StrandRole::Primer { linker: 2 };
        assert!(assess_structure("((...))...+..", role).rejected);
    }

    struct TableFold;

    impl Thermodynamics for TableFold {
        fn hairpin_dg(&self, _sequence: &str) -> Result<f64, ExternalError> {
            Ok(0.0)
        }

        fn mfe_structure(&self, sequence: &str) -> Result<String, ExternalError> {
            // strands starting with G fold at their 3' end
            Ok(if sequence.starts_with('G') {
                format!("{}(...)", ".".repeat(sequence.len() - 5))
            } else {
                ".".repeat(sequence.len())
            })
        }
    }

    #[test]
    fn test_filter_reports_bonds_and_rejections() {
        let filter = SecondaryStructureFilter {
            primer_end: 3,
            padlock_start: 2,
            padlock_end: 2,
        };
        let strands = vec![
            StrandPair {
                offset: 0,
                primer: "ACGTACGTAC".to_string(),
                padlock: "ACGTACGTACGT".to_string(),
            },
            StrandPair {
                offset: 2,
                primer: "GCGTACGTAC".to_string(),
                padlock: "ACGTACGTACGT".to_string(),
            },
        ];

        let report = filter.evaluate(4, &strands, &TableFold).unwrap();
        assert_eq!(report.rejected.live_offsets(), vec![0, 1, 3]);
        assert_eq!(
            report.bonds[&2],
            BondCounts {
                primer: 1,
                padlock: 0
            }
        );
        assert_eq!(report.bonds[&0].to_string(), "(0, 0)");
    }

    /// Only answers batched folds and counts how often it is asked
    #[derive(Default)]
    struct BatchFold {
        batches: std::cell::Cell<usize>,
    }

    impl Thermodynamics for BatchFold {
        fn hairpin_dg(&self, _sequence: &str) -> Result<f64, ExternalError> {
            Ok(0.0)
        }

        fn mfe_structure(&self, _sequence: &str) -> Result<String, ExternalError> {
            Err(ExternalError::UnexpectedOutput {
                tool: "fold",
                message: "single folds are not expected".to_string(),
            })
        }

        fn mfe_structures(&self, sequences: &[&str]) -> Result<Vec<String>, ExternalError> {
            self.batches.set(self.batches.get() + 1);
            Ok(sequences.iter().map(|s| ".".repeat(s.len())).collect())
        }
    }

    #[test]
    fn test_filter_folds_all_strands_in_one_batch() {
        let filter = SecondaryStructureFilter {
            primer_end: 3,
            padlock_start: 2,
            padlock_end: 2,
        };
        let strands: Vec<StrandPair> = (0..5)
            .map(|offset| StrandPair {
                offset,
                primer: "ACGTACGTAC".to_string(),
                padlock: "ACGTACGTACGT".to_string(),
            })
            .collect();

        let thermo = BatchFold::default();
        let report = filter.evaluate(5, &strands, &thermo).unwrap();
        assert_eq!(thermo.batches.get(), 1);
        assert_eq!(report.rejected.count_rejected(), 0);
        assert_eq!(report.bonds.len(), 5);
    }
}
