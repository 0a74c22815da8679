//! Centralized validation and helper functions.

/// Maximum target length accepted for a single design run
pub const MAX_SEQUENCE_LENGTH: usize = 1_000_000;

/// Longest probe half accepted; a window of two halves must fit a target
pub const MAX_HALF_LENGTH: usize = MAX_SEQUENCE_LENGTH / 2;

/// Maximum length of a gene name used to derive output file names
pub const MAX_GENE_NAME_LENGTH: usize = 128;

/// Check that every base is an unambiguous nucleotide or `N` (case-insensitive).
///
/// # Examples
///
/// ```
/// use fish_probes::utils::validation::is_valid_nucleotides;
///
/// assert!(is_valid_nucleotides("ACGTacgtN"));
/// assert!(!is_valid_nucleotides("ACGU"));
/// assert!(!is_valid_nucleotides("ACG T"));
/// ```
#[must_use]
pub fn is_valid_nucleotides(s: &str) -> bool {
    s.bytes()
        .all(|b| matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N'))
}

/// Normalize a user-supplied sequence: drop whitespace and uppercase.
/// Returns None if anything other than `ACGTN` remains.
#[must_use]
pub fn normalize_sequence(s: &str) -> Option<String> {
    let normalized: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if is_valid_nucleotides(&normalized) {
        Some(normalized)
    } else {
        None
    }
}

/// Check a sequence length against [`MAX_SEQUENCE_LENGTH`].
///
/// Returns an error message if the sequence is too long, None if it is acceptable.
#[must_use]
pub fn check_sequence_limit(length: usize) -> Option<String> {
    if length > MAX_SEQUENCE_LENGTH {
        Some(format!(
            "Sequence of {length} nt exceeds maximum of {MAX_SEQUENCE_LENGTH}"
        ))
    } else {
        None
    }
}

/// Gene name validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Gene name too long: exceeds {MAX_GENE_NAME_LENGTH} characters")]
    NameTooLong,
    #[error("Invalid gene name '{0}': contains path separators or control characters")]
    InvalidName(String),
    #[error("Empty gene name provided")]
    EmptyName,
}

/// Validate a gene name and turn it into a safe file stem.
///
/// Gene names end up in per-target file names (`<gene>_probes.tsv`), so they are
/// checked the same way an uploaded filename would be:
/// - Checking length limits
/// - Preventing directory traversal (../, ..\\)
/// - Removing characters outside `[A-Za-z0-9._-]`
///
/// # Errors
///
/// Returns `ValidationError::EmptyName` if the name is empty,
/// `ValidationError::NameTooLong` if it exceeds the limit, or
/// `ValidationError::InvalidName` if it contains invalid characters.
pub fn gene_file_stem(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    if name.len() > MAX_GENE_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }

    if name.contains("..")
        || name.contains('/')
        || name.contains('\\')
        || name.chars().any(char::is_control)
    {
        return Err(ValidationError::InvalidName(name.to_string()));
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.starts_with('.') {
        return Err(ValidationError::InvalidName(name.to_string()));
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_nucleotides() {
        assert!(is_valid_nucleotides("ACGT"));
        assert!(is_valid_nucleotides("acgtn"));
        assert!(is_valid_nucleotides(""));
        assert!(!is_valid_nucleotides("ACGU"));
        assert!(!is_valid_nucleotides("ACGR"));
    }

    #[test]
    fn test_normalize_sequence() {
        assert_eq!(
            normalize_sequence("acg t\nACG\r\n"),
            Some("ACGTACG".to_string())
        );
        assert_eq!(normalize_sequence("ACGX"), None);
    }

    #[test]
    fn test_check_sequence_limit() {
        assert!(check_sequence_limit(1_000).is_none());
        assert!(check_sequence_limit(MAX_SEQUENCE_LENGTH).is_none());
        assert!(check_sequence_limit(MAX_SEQUENCE_LENGTH + 1).is_some());
    }

    #[test]
    fn test_gene_file_stem_safe() {
        assert_eq!(gene_file_stem("TH").unwrap(), "TH");
        assert_eq!(gene_file_stem("Slc6a3").unwrap(), "Slc6a3");
        assert_eq!(gene_file_stem("my gene").unwrap(), "my_gene");
        assert_eq!(gene_file_stem("Gad1-v2.1").unwrap(), "Gad1-v2.1");
    }

    #[test]
    fn test_gene_file_stem_dangerous() {
        assert!(gene_file_stem("../etc/passwd").is_err());
        assert!(gene_file_stem("a\\b").is_err());
        assert!(gene_file_stem("gene\0").is_err());
        assert!(gene_file_stem(".hidden").is_err());
        assert!(gene_file_stem("").is_err());
        assert!(gene_file_stem("   ").is_err());
        assert!(gene_file_stem(&"a".repeat(300)).is_err());
    }
}
