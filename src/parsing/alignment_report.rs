use std::path::Path;

use crate::core::types::QueryId;
use crate::parsing::ParseError;

/// Reference id the aligner reports for unaligned queries
pub const NO_ALIGNMENT: &str = "*";

/// One report line reduced to the query it belongs to and the reference it hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentHit {
    pub query: QueryId,
    pub reference: String,
}

impl AlignmentHit {
    #[must_use]
    pub fn is_aligned(&self) -> bool {
        self.reference != NO_ALIGNMENT
    }
}

/// Parse an alignment report file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_alignment_report(path: &Path) -> Result<Vec<AlignmentHit>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_alignment_text(&content)
}

/// Parse alignment report text.
///
/// Blank lines and `@` header lines are skipped.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a line has fewer than 3 fields, or
/// `ParseError::MalformedQueryId` if column 1 is not a query id.
pub fn parse_alignment_text(text: &str) -> Result<Vec<AlignmentHit>, ParseError> {
    let mut hits = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('@') {
            continue;
        }

        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            return Err(ParseError::InvalidFormat(format!(
                "Alignment report line {line_num} has fewer than 3 fields"
            )));
        }

        let query = fields[0]
            .parse::<QueryId>()
            .map_err(|source| ParseError::MalformedQueryId {
                line: line_num,
                id: fields[0].to_string(),
                source,
            })?;

        hits.push(AlignmentHit {
            query,
            reference: fields[2].trim().to_string(),
        });
    }

    Ok(hits)
}
