//! Fixed auxiliary sequences fused to probe halves.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::validation::is_valid_nucleotides;

/// HCR v3 split-initiator sequences, indexed by hairpin (B1..B5) then initiator (I1, I2).
pub const HCR_INITIATORS: [[&str; 2]; 5] = [
    [
        "gAggAgggCAgCAAACgggAAgAgTCTTCCTTTACg",
        "gCATTCTTTCTTgAggAgggCAgCAAACgggAAgAg",
    ],
    [
        "CCTCgTAAATCCTCATCAATCATCCAgTAAACCgCC",
        "AgCTCAgTCCATCCTCgTAAATCCTCATCAATCATC",
    ],
    [
        "gTCCCTgCCTCTATATCTCCACTCAACTTTAACCCg",
        "AAAgTCTAATCCgTCCCTgCCTCTATATCTCCACTC",
    ],
    [
        "CCTCAACCTACCTCCAACTCTCACCATATTCgCTTC",
        "CACATTTACAgACCTCAACCTACCTCCAACTCTCAC",
    ],
    [
        "CTCACTCCCAATCTCTATCTACCCTACAAATCCAAT",
        "CACTTCATATCACTCACTCCCAATCTCTATCTACCC",
    ],
];

pub const DEFAULT_HCR_SPACERS: (&str, &str) = ("ta", "at");

pub const DEFAULT_PRIMER_END: &str = "TAATGTTATCTT";
pub const DEFAULT_PADLOCK_START: &str = "ACATTA";
pub const DEFAULT_PADLOCK_END: &str = "AAGATA";
pub const DEFAULT_PADLOCK_SPACER1: &str = "attta";
pub const DEFAULT_PADLOCK_SPACER2: &str = "atta";

/// 5' phosphorylation modification prefixed to ordered padlock oligos
pub const PHOSPHORYLATION_MARK: &str = "/5Phos/";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScaffoldError {
    #[error("Hairpin id {0} is out of range (expected 1-{max})", max = HCR_INITIATORS.len())]
    UnknownHairpin(u8),

    #[error("UGI index {index} is out of range (table has {size} entries)")]
    UgiIndexOutOfRange { index: usize, size: usize },

    #[error("UGI table is empty")]
    EmptyUgiTable,

    #[error("{field} '{value}' contains characters other than A, C, G, T, N")]
    InvalidLiteral { field: &'static str, value: String },
}

/// Which of the two initiators of a hairpin pair to attach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Initiator {
    #[default]
    I1,
    I2,
}

fn check_literal(field: &'static str, value: &str) -> Result<(), ScaffoldError> {
    if is_valid_nucleotides(value) {
        Ok(())
    } else {
        Err(ScaffoldError::InvalidLiteral {
            field,
            value: value.to_string(),
        })
    }
}

/// Scaffold for split-initiator HCR probes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HcrScaffold {
    pub hairpin_id: u8,
    pub initiator: Initiator,
    /// Spacer between the initiator half and the binding half, for probe A and probe B
    pub spacers: (String, String),
}

impl HcrScaffold {
    /// # Errors
    ///
    /// Returns `ScaffoldError::UnknownHairpin` if `hairpin_id` is not 1-5, or
    /// `ScaffoldError::InvalidLiteral` if a spacer is not a nucleotide sequence.
    pub fn new(
        hairpin_id: u8,
        initiator: Initiator,
        spacers: (impl Into<String>, impl Into<String>),
    ) -> Result<Self, ScaffoldError> {
        if hairpin_id == 0 || usize::from(hairpin_id) > HCR_INITIATORS.len() {
            return Err(ScaffoldError::UnknownHairpin(hairpin_id));
        }
        let spacers = (spacers.0.into(), spacers.1.into());
        check_literal("spacer", &spacers.0)?;
        check_literal("spacer", &spacers.1)?;

        Ok(Self {
            hairpin_id,
            initiator,
            spacers,
        })
    }

    /// Full initiator sequence for the configured hairpin
    #[must_use]
    pub fn initiator_sequence(&self) -> &'static str {
        let pair = HCR_INITIATORS[usize::from(self.hairpin_id) - 1];
        match self.initiator {
            Initiator::I1 => pair[0],
            Initiator::I2 => pair[1],
        }
    }

    /// Initiator split at its midpoint into the 5' and 3' halves
    #[must_use]
    pub fn split_initiator(&self) -> (&'static str, &'static str) {
        let initiator = self.initiator_sequence();
        initiator.split_at(initiator.len() / 2)
    }
}

/// Scaffold for USeqFISH primer + padlock probes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PadlockScaffold {
    /// Linker appended to the primer's binding half
    pub primer_end: String,
    /// Literal at the 5' end of the padlock, before its binding half
    pub padlock_start: String,
    /// Literal at the 3' end of the padlock
    pub padlock_end: String,
    pub spacer1: String,
    pub spacer2: String,
    /// Universal insert between the two spacers
    pub ugi: String,
}

impl PadlockScaffold {
    /// Scaffold with the default literals and the given UGI insert.
    ///
    /// # Errors
    ///
    /// Returns `ScaffoldError::InvalidLiteral` if `ugi` is not a nucleotide sequence.
    pub fn with_ugi(ugi: impl Into<String>) -> Result<Self, ScaffoldError> {
        let scaffold = Self {
            primer_end: DEFAULT_PRIMER_END.to_string(),
            padlock_start: DEFAULT_PADLOCK_START.to_string(),
            padlock_end: DEFAULT_PADLOCK_END.to_string(),
            spacer1: DEFAULT_PADLOCK_SPACER1.to_string(),
            spacer2: DEFAULT_PADLOCK_SPACER2.to_string(),
            ugi: ugi.into(),
        };
        scaffold.validate()?;
        Ok(scaffold)
    }

    /// # Errors
    ///
    /// Returns `ScaffoldError::InvalidLiteral` naming the first literal that is not a
    /// nucleotide sequence.
    pub fn validate(&self) -> Result<(), ScaffoldError> {
        check_literal("primer end", &self.primer_end)?;
        check_literal("padlock start", &self.padlock_start)?;
        check_literal("padlock end", &self.padlock_end)?;
        check_literal("spacer1", &self.spacer1)?;
        check_literal("spacer2", &self.spacer2)?;
        check_literal("UGI", &self.ugi)
    }
}

/// Scheme-specific scaffold attached during assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum ProbeScaffold {
    Hcr(HcrScaffold),
    Padlock(PadlockScaffold),
}

/// Lookup table of universal inserts, addressed by 1-based index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UgiTable {
    entries: Vec<String>,
}

impl UgiTable {
    #[must_use]
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at 1-based `index`
    ///
    /// # Errors
    ///
    /// Returns `ScaffoldError::EmptyUgiTable` or `ScaffoldError::UgiIndexOutOfRange`.
    pub fn get(&self, index: usize) -> Result<&str, ScaffoldError> {
        if self.entries.is_empty() {
            return Err(ScaffoldError::EmptyUgiTable);
        }
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(String::as_str)
            .ok_or(ScaffoldError::UgiIndexOutOfRange {
                index,
                size: self.entries.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initiators_split_evenly() {
        for hairpin in 1..=5 {
            for initiator in [Initiator::I1, Initiator::I2] {
                let scaffold = HcrScaffold::new(hairpin, initiator, ("ta", "at")).unwrap();
                let (head, tail) = scaffold.split_initiator();
                assert_eq!(head.len(), 18);
                assert_eq!(tail.len(), 18);
                assert_eq!(format!("{head}{tail}"), scaffold.initiator_sequence());
            }
        }
    }

    #[test]
    fn test_hairpin_lookup() {
        let scaffold = HcrScaffold::new(3, Initiator::I1, ("ta", "at")).unwrap();
        assert_eq!(
            scaffold.initiator_sequence(),
            "gTCCCTgCCTCTATATCTCCACTCAACTTTAACCCg"
        );
        assert_eq!(
            HcrScaffold::new(0, Initiator::I1, ("ta", "at")),
            Err(ScaffoldError::UnknownHairpin(0))
        );
        assert_eq!(
            HcrScaffold::new(6, Initiator::I1, ("ta", "at")),
            Err(ScaffoldError::UnknownHairpin(6))
        );
    }

    #[test]
    fn test_padlock_scaffold_rejects_bad_ugi() {
        assert!(PadlockScaffold::with_ugi("ACGTACGT").is_ok());
        assert!(matches!(
            PadlockScaffold::with_ugi("ACGT!"),
            Err(ScaffoldError::InvalidLiteral { field: "UGI", .. })
        ));
    }

    #[test]
    fn test_ugi_table_is_one_based() {
        let table = UgiTable::new(vec!["AAAC".to_string(), "GGGT".to_string()]);
        assert_eq!(table.get(1).unwrap(), "AAAC");
        assert_eq!(table.get(2).unwrap(), "GGGT");
        assert!(table.get(0).is_err());
        assert!(table.get(3).is_err());
        assert_eq!(
            UgiTable::default().get(1),
            Err(ScaffoldError::EmptyUgiTable)
        );
    }
}
