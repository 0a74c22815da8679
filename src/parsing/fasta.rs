//! FASTA input and output using noodles.
//!
//! Target sequences are read from the first record of a FASTA file. Supports both
//! uncompressed and gzip/bgzip compressed files:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)
//!
//! Candidate queries for the aligner are written one record per query, named by
//! their [`QueryId`].

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;

use crate::core::types::QueryId;
use crate::parsing::ParseError;

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    // Check for gzipped FASTA
    if path_str.ends_with(".fa.gz")
        || path_str.ends_with(".fasta.gz")
        || path_str.ends_with(".fna.gz")
        || path_str.ends_with(".fa.bgz")
        || path_str.ends_with(".fasta.bgz")
        || path_str.ends_with(".fna.bgz")
    {
        return true;
    }

    // Check for uncompressed FASTA
    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// First record of a FASTA file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaSequence {
    pub name: String,
    pub description: Option<String>,
    pub sequence: String,
}

/// Read the first record of a FASTA file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// parsing fails, or `ParseError::InvalidFormat` if the file holds no record.
pub fn read_first_record(path: &Path) -> Result<FastaSequence, ParseError> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        let reader = BufReader::new(MultiGzDecoder::new(file));
        read_first_from(&mut fasta::io::Reader::new(reader))
    } else {
        read_first_from(&mut fasta::io::Reader::new(BufReader::new(file)))
    }
}

fn read_first_from<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<FastaSequence, ParseError> {
    let record = reader
        .records()
        .next()
        .ok_or_else(|| ParseError::InvalidFormat("No sequences found in FASTA file".to_string()))?
        .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

    let description = record
        .description()
        .map(|d| String::from_utf8_lossy(d).trim().to_string())
        .filter(|d| !d.is_empty());

    Ok(FastaSequence {
        name: String::from_utf8_lossy(record.name()).to_string(),
        description,
        sequence: String::from_utf8_lossy(record.sequence().as_ref()).to_string(),
    })
}

/// Write one FASTA record per query.
///
/// Returns the number of records written.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be created or written.
pub fn write_queries<'a, I>(path: &Path, queries: I) -> Result<usize, ParseError>
where
    I: IntoIterator<Item = (QueryId, &'a str)>,
{
    let file = BufWriter::new(File::create(path)?);
    let count = write_queries_to(file, queries)?;
    Ok(count)
}

fn write_queries_to<'a, W, I>(inner: W, queries: I) -> std::io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = (QueryId, &'a str)>,
{
    let mut writer = fasta::io::Writer::new(inner);
    let mut count = 0;

    for (id, sequence) in queries {
        let definition = fasta::record::Definition::new(id.to_string(), None);
        let sequence = fasta::record::Sequence::from(sequence.as_bytes().to_vec());
        writer.write_record(&fasta::Record::new(definition, sequence))?;
        count += 1;
    }

    writer.get_mut().flush()?;
    Ok(count)
}
