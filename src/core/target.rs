use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;
use thiserror::Error;

use crate::utils::validation::{check_sequence_limit, normalize_sequence};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    #[error("Target '{0}' has an empty sequence")]
    EmptySequence(String),

    #[error("Target '{0}' contains characters other than A, C, G, T, N")]
    InvalidAlphabet(String),

    #[error("Target '{name}' is too long: {message}")]
    TooLong { name: String, message: String },

    #[error("Target '{name}' has invalid coding region [{start}, {end}) for length {length}")]
    InvalidCds {
        name: String,
        start: usize,
        end: usize,
        length: usize,
    },
}

/// A transcript to design probes against.
///
/// `cds_start..cds_end` is a half-open range of character offsets into `sequence`
/// and always satisfies `cds_start <= cds_end <= sequence.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Gene name, also used to recognise transcript variants of the same gene
    pub name: String,

    /// Accession the sequence was retrieved from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,

    /// Uppercase nucleotide sequence
    pub sequence: String,

    pub cds_start: usize,
    pub cds_end: usize,
}

impl Target {
    /// Create a target with explicit coding-region bounds.
    ///
    /// # Errors
    ///
    /// Returns a `TargetError` if the sequence is empty, contains non-nucleotide
    /// characters, is too long, or if the bounds fall outside the sequence.
    pub fn new(
        name: impl Into<String>,
        accession: Option<String>,
        sequence: &str,
        cds_start: usize,
        cds_end: usize,
    ) -> Result<Self, TargetError> {
        let name = name.into();
        let sequence =
            normalize_sequence(sequence).ok_or_else(|| TargetError::InvalidAlphabet(name.clone()))?;

        if sequence.is_empty() {
            return Err(TargetError::EmptySequence(name));
        }
        if let Some(message) = check_sequence_limit(sequence.len()) {
            return Err(TargetError::TooLong { name, message });
        }
        if cds_start > cds_end || cds_end > sequence.len() {
            return Err(TargetError::InvalidCds {
                name,
                start: cds_start,
                end: cds_end,
                length: sequence.len(),
            });
        }

        Ok(Self {
            name,
            accession,
            sequence,
            cds_start,
            cds_end,
        })
    }

    /// Create a target from a literal sequence; the whole sequence is treated as coding.
    ///
    /// # Errors
    ///
    /// See [`Target::new`].
    pub fn from_sequence(name: impl Into<String>, sequence: &str) -> Result<Self, TargetError> {
        let length = sequence.chars().filter(|c| !c.is_whitespace()).count();
        Self::new(name, None, sequence, 0, length)
    }

    #[must_use]
    pub fn with_accession(mut self, accession: impl Into<String>) -> Self {
        self.accession = Some(accession.into());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    #[must_use]
    pub fn cds(&self) -> Range<usize> {
        self.cds_start..self.cds_end
    }
}

/// Where a target's sequence comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSource {
    /// Literal sequence; the whole sequence is treated as coding
    Sequence(String),
    /// First record of a FASTA file; the whole sequence is treated as coding
    Fasta(PathBuf),
    /// Record fetched by accession; its CDS feature gives the coding region
    Accession(String),
}

/// A target as requested by the user, before its sequence is resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetRequest {
    pub name: String,
    /// Accession reported alongside the probes
    pub accession: Option<String>,
    pub source: TargetSource,
    /// Per-target hairpin override for HCR runs
    pub hairpin_id: Option<u8>,
}

impl TargetRequest {
    /// Request resolved from an accession
    #[must_use]
    pub fn from_accession(name: impl Into<String>, accession: impl Into<String>) -> Self {
        let accession = accession.into();
        Self {
            name: name.into(),
            accession: Some(accession.clone()),
            source: TargetSource::Accession(accession),
            hairpin_id: None,
        }
    }

    /// Request for a literal sequence
    #[must_use]
    pub fn from_sequence(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accession: None,
            source: TargetSource::Sequence(sequence.into()),
            hairpin_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sequence_covers_whole_sequence() {
        let target = Target::from_sequence("TH", "acgt acgt").unwrap();
        assert_eq!(target.sequence, "ACGTACGT");
        assert_eq!(target.cds(), 0..8);
        assert!(target.accession.is_none());
    }

    #[test]
    fn test_new_rejects_bad_bounds() {
        assert!(matches!(
            Target::new("TH", None, "ACGTACGT", 5, 3),
            Err(TargetError::InvalidCds { .. })
        ));
        assert!(matches!(
            Target::new("TH", None, "ACGTACGT", 0, 9),
            Err(TargetError::InvalidCds { .. })
        ));
        assert!(Target::new("TH", None, "ACGTACGT", 8, 8).is_ok());
    }

    #[test]
    fn test_new_rejects_bad_sequence() {
        assert!(matches!(
            Target::from_sequence("TH", ""),
            Err(TargetError::EmptySequence(_))
        ));
        assert!(matches!(
            Target::from_sequence("TH", "ACGU"),
            Err(TargetError::InvalidAlphabet(_))
        ));
    }
}
