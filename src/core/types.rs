use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Probe chemistry a design run targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeScheme {
    /// Split-initiator hybridization chain reaction probes (HCR v3)
    Hcr,
    /// Primer + padlock pairs (USeqFISH)
    Padlock,
}

impl std::fmt::Display for ProbeScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hcr => write!(f, "HCR"),
            Self::Padlock => write!(f, "padlock"),
        }
    }
}

/// Which oligo of an assembled two-part probe a query refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Part {
    /// Oligo carrying the 5' half of the initiator (`<id>-1`)
    First,
    /// Oligo carrying the 3' half of the initiator (`<id>-2`)
    Second,
}

impl Part {
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryIdError {
    #[error("query id is empty")]
    Empty,

    #[error("query id '{0}' is not a positive integer")]
    NotAnId(String),

    #[error("query id '{0}' has part suffix other than 1 or 2")]
    BadPart(String),
}

/// Identifier of one FASTA query handed to the aligner.
///
/// Written as `<id>` for single-part queries and `<id>-<part>` for the two oligos
/// of an assembled pair. `id` is the 1-based candidate offset and is never 0; values
/// are only built from an offset or parsed, so fields stay private.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QueryId {
    id: usize,
    part: Option<Part>,
}

impl QueryId {
    /// Single-part query for the candidate at `offset`
    #[must_use]
    pub fn single(offset: usize) -> Self {
        Self {
            id: offset + 1,
            part: None,
        }
    }

    /// One oligo of the two-part query for the candidate at `offset`
    #[must_use]
    pub fn split(offset: usize, part: Part) -> Self {
        Self {
            id: offset + 1,
            part: Some(part),
        }
    }

    /// 1-based candidate id as written to FASTA
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn part(&self) -> Option<Part> {
        self.part
    }

    /// 0-based candidate offset this query was built from
    #[must_use]
    pub fn offset(&self) -> usize {
        self.id.saturating_sub(1)
    }
}

impl TryFrom<String> for QueryId {
    type Error = QueryIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<QueryId> for String {
    fn from(query: QueryId) -> Self {
        query.to_string()
    }
}

impl std::fmt::Display for QueryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.part {
            Some(part) => write!(f, "{}-{}", self.id, part.number()),
            None => write!(f, "{}", self.id),
        }
    }
}

impl FromStr for QueryId {
    type Err = QueryIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(QueryIdError::Empty);
        }

        let (id_text, part) = match s.split_once('-') {
            Some((id_text, "1")) => (id_text, Some(Part::First)),
            Some((id_text, "2")) => (id_text, Some(Part::Second)),
            Some(_) => return Err(QueryIdError::BadPart(s.to_string())),
            None => (s, None),
        };

        if id_text.is_empty() || !id_text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(QueryIdError::NotAnId(s.to_string()));
        }
        let id: usize = id_text
            .parse()
            .map_err(|_| QueryIdError::NotAnId(s.to_string()))?;
        if id == 0 {
            return Err(QueryIdError::NotAnId(s.to_string()));
        }

        Ok(Self { id, part })
    }
}
