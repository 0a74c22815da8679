//! JSON batch files listing several targets for one design run.
//!
//! ```json
//! {
//!   "targets": [
//!     { "name": "Th", "accession": "NM_009377.2", "hairpin_id": 2 },
//!     { "name": "Gad1", "sequence": "ATGGCGTCTTCG..." },
//!     { "name": "Slc17a7", "fasta": "targets/slc17a7.fa" }
//!   ]
//! }
//! ```
//!
//! A bare JSON array of targets is accepted as well. Each target needs a `sequence`,
//! a `fasta` path, or an `accession`; when several are given the sequence wins, then
//! the FASTA file. Relative FASTA paths are resolved against the batch file's directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::target::{TargetRequest, TargetSource};
use crate::parsing::ParseError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BatchTarget {
    name: String,
    #[serde(default)]
    accession: Option<String>,
    #[serde(default)]
    sequence: Option<String>,
    #[serde(default)]
    fasta: Option<PathBuf>,
    #[serde(default)]
    hairpin_id: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BatchFile {
    Object { targets: Vec<BatchTarget> },
    List(Vec<BatchTarget>),
}

/// Parse a batch file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_batch_file(path: &Path) -> Result<Vec<TargetRequest>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    parse_batch_text(&content, base)
}

/// Parse batch JSON text, resolving relative FASTA paths against `base`.
///
/// # Errors
///
/// Returns `ParseError::Json` for malformed JSON, or `ParseError::InvalidFormat` if a
/// target has an empty name or no sequence source, or the batch is empty.
pub fn parse_batch_text(text: &str, base: &Path) -> Result<Vec<TargetRequest>, ParseError> {
    let targets = match serde_json::from_str::<BatchFile>(text)? {
        BatchFile::Object { targets } | BatchFile::List(targets) => targets,
    };

    if targets.is_empty() {
        return Err(ParseError::InvalidFormat(
            "Batch file lists no targets".to_string(),
        ));
    }

    targets
        .into_iter()
        .enumerate()
        .map(|(i, target)| to_request(i + 1, target, base))
        .collect()
}

fn to_request(number: usize, target: BatchTarget, base: &Path) -> Result<TargetRequest, ParseError> {
    let name = target.name.trim().to_string();
    if name.is_empty() {
        return Err(ParseError::InvalidFormat(format!(
            "Target {number} has an empty name"
        )));
    }

    let accession = target
        .accession
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());

    let source = match (target.sequence, target.fasta, &accession) {
        (Some(sequence), _, _) => TargetSource::Sequence(sequence),
        (None, Some(fasta), _) if fasta.is_relative() => TargetSource::Fasta(base.join(fasta)),
        (None, Some(fasta), _) => TargetSource::Fasta(fasta),
        (None, None, Some(accession)) => TargetSource::Accession(accession.clone()),
        (None, None, None) => {
            return Err(ParseError::InvalidFormat(format!(
                "Target '{name}' needs a sequence, a fasta path or an accession"
            )))
        }
    };

    Ok(TargetRequest {
        name,
        accession,
        source,
        hairpin_id: target.hairpin_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch_object() {
        let json = r#"{
            "targets": [
                {"name": "Th", "accession": "NM_009377.2", "hairpin_id": 2},
                {"name": "Gad1", "sequence": "ACGTACGT"},
                {"name": "Slc17a7", "fasta": "targets/slc17a7.fa"}
            ]
        }"#;

        let targets = parse_batch_text(json, Path::new("/data")).unwrap();
        assert_eq!(targets.len(), 3);
        assert_eq!(
            targets[0].source,
            TargetSource::Accession("NM_009377.2".to_string())
        );
        assert_eq!(targets[0].hairpin_id, Some(2));
        assert_eq!(
            targets[1].source,
            TargetSource::Sequence("ACGTACGT".to_string())
        );
        assert_eq!(
            targets[2].source,
            TargetSource::Fasta(PathBuf::from("/data/targets/slc17a7.fa"))
        );
    }

    #[test]
    fn test_parse_batch_list_prefers_sequence() {
        let json = r#"[{"name": "Th", "accession": "NM_009377.2", "sequence": "ACGT"}]"#;
        let targets = parse_batch_text(json, Path::new("")).unwrap();
        assert_eq!(targets[0].source, TargetSource::Sequence("ACGT".to_string()));
        assert_eq!(targets[0].accession.as_deref(), Some("NM_009377.2"));
    }

    #[test]
    fn test_target_without_source_is_rejected() {
        let json = r#"[{"name": "Th"}]"#;
        assert!(matches!(
            parse_batch_text(json, Path::new("")),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_empty_and_malformed_batches() {
        assert!(matches!(
            parse_batch_text("[]", Path::new("")),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(parse_batch_text("{\"targets\": [", Path::new("")).is_err());
        assert!(parse_batch_text(r#"[{"name": "Th", "seq": "ACGT"}]"#, Path::new("")).is_err());
    }
}
