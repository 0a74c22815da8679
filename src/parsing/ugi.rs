use std::path::Path;

use crate::core::scaffold::UgiTable;
use crate::parsing::ParseError;
use crate::utils::validation::is_valid_nucleotides;

/// Parse a UGI table file. `.csv` files are comma-separated, anything else tab-separated.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_ugi_file(path: &Path) -> Result<UgiTable, ParseError> {
    let content = std::fs::read_to_string(path)?;
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    parse_ugi_text(&content, if is_csv { ',' } else { '\t' })
}

/// Parse UGI table text.
///
/// If the first non-comment line names a `ugi` column, sequences are read from that
/// column; otherwise the last field of every line is the sequence. Row order defines
/// the 1-based UGI index.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a row lacks the UGI column, holds a
/// non-nucleotide sequence, or no rows are found.
pub fn parse_ugi_text(text: &str, delimiter: char) -> Result<UgiTable, ParseError> {
    let mut entries = Vec::new();
    let mut column: Option<usize> = None;
    let mut first_data_line = true;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();

        // Check if first non-empty/non-comment line is a header
        if first_data_line {
            first_data_line = false;
            if let Some(index) = fields.iter().position(|f| f.eq_ignore_ascii_case("ugi")) {
                column = Some(index);
                continue;
            }
        }

        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;

        let value = match column {
            Some(index) => fields.get(index).copied(),
            None => fields.last().copied(),
        }
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ParseError::InvalidFormat(format!("Line {line_num} has no UGI sequence")))?;

        if !is_valid_nucleotides(value) {
            return Err(ParseError::InvalidFormat(format!(
                "Invalid UGI sequence on line {line_num}: '{value}'"
            )));
        }

        entries.push(value.to_string());
    }

    if entries.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No UGI sequences found in file".to_string(),
        ));
    }

    Ok(UgiTable::new(entries))
}
