//! Narrow interfaces to the services the design pipeline consults.
//!
//! The pipeline only ever sees these three traits, so tests drive it with in-memory
//! fakes while production runs use the adapters in the submodules:
//!
//! | Capability | Trait | Production adapter |
//! |------------|-------|--------------------|
//! | Fetch a nucleotide record by accession | [`RecordSource`] | [`entrez::EntrezClient`] (NCBI E-utilities) |
//! | Align a FASTA file against a reference index | [`Aligner`] | [`bowtie2::Bowtie2`] |
//! | Fold a DNA strand | [`Thermodynamics`] | [`rnafold::RnaFold`] |

pub mod bowtie2;
pub mod entrez;
pub mod rnafold;

use std::io::{ErrorKind, Write};
use std::ops::Range;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExternalError {
    #[error("Could not find {tool} executable '{executable}'. Install {tool} or set {env_var}")]
    ToolNotFound {
        tool: &'static str,
        executable: String,
        env_var: &'static str,
    },

    #[error("{tool} command failed: {executable} {args} (status={status:?}, stderr='{stderr}')")]
    ToolFailed {
        tool: &'static str,
        executable: String,
        args: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Unexpected {tool} output: {message}")]
    UnexpectedOutput { tool: &'static str, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Record service returned status {status} for {accession}: {body}")]
    Service {
        accession: String,
        status: u16,
        body: String,
    },

    #[error("Invalid GenBank record for {accession}: {message}")]
    GenBank { accession: String, message: String },

    #[error("No record returned for accession {0}")]
    EmptyRecord(String),
}

/// The parts of a nucleotide database record the pipeline uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenBankRecord {
    pub accession: String,
    /// Free-text definition line, matched against gene names
    pub description: String,
    /// Uppercase nucleotide sequence
    pub sequence: String,
    /// Coding region as a half-open range of 0-based offsets, if annotated
    pub cds: Option<Range<usize>>,
}

/// Fetch nucleotide records by accession
pub trait RecordSource {
    /// # Errors
    ///
    /// Returns an `ExternalError` if the record cannot be retrieved or parsed.
    fn fetch_record(&self, accession: &str) -> Result<GenBankRecord, ExternalError>;

    /// Definition line only; used when classifying alignment hits.
    ///
    /// # Errors
    ///
    /// See [`RecordSource::fetch_record`].
    fn fetch_description(&self, accession: &str) -> Result<String, ExternalError> {
        self.fetch_record(accession).map(|record| record.description)
    }
}

/// Local aligner that reads query FASTA and writes a tab-separated hit report
pub trait Aligner {
    /// Align every record of `queries` and write one report line per query to `report`.
    ///
    /// `score_min` is the minimum alignment score function, e.g. `G,20,8`.
    ///
    /// # Errors
    ///
    /// Returns an `ExternalError` if the aligner cannot be run or fails.
    fn align(&self, queries: &Path, report: &Path, score_min: &str) -> Result<(), ExternalError>;
}

/// Secondary-structure prediction for single DNA strands
pub trait Thermodynamics {
    /// Minimum hairpin free energy of `sequence` in kcal/mol
    ///
    /// # Errors
    ///
    /// Returns an `ExternalError` if the engine cannot be run or its output is unreadable.
    fn hairpin_dg(&self, sequence: &str) -> Result<f64, ExternalError>;

    /// Minimum free energy structure of `sequence` in dot-bracket notation
    ///
    /// # Errors
    ///
    /// Returns an `ExternalError` if the engine cannot be run or its output is unreadable.
    fn mfe_structure(&self, sequence: &str) -> Result<String, ExternalError>;

    /// Hairpin ΔG for many sequences, in input order.
    ///
    /// # Errors
    ///
    /// See [`Thermodynamics::hairpin_dg`].
    fn hairpin_dgs(&self, sequences: &[&str]) -> Result<Vec<f64>, ExternalError> {
        sequences.iter().map(|s| self.hairpin_dg(s)).collect()
    }

    /// Minimum free energy structures for many sequences, in input order.
    ///
    /// # Errors
    ///
    /// See [`Thermodynamics::mfe_structure`].
    fn mfe_structures(&self, sequences: &[&str]) -> Result<Vec<String>, ExternalError> {
        sequences.iter().map(|s| self.mfe_structure(s)).collect()
    }
}

/// Resolve a tool executable from `env_var`, falling back to `default`.
pub(crate) fn tool_executable(env_var: &str, default: &str) -> String {
    std::env::var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Identity of an external command-line tool
#[derive(Debug, Clone)]
pub(crate) struct ToolCommand {
    pub tool: &'static str,
    pub env_var: &'static str,
    pub executable: String,
}

impl ToolCommand {
    /// Run the tool to completion, optionally feeding `stdin`.
    ///
    /// A non-zero exit status is reported as `ExternalError::ToolFailed`.
    pub(crate) fn run(&self, args: &[String], stdin: Option<&str>) -> Result<Output, ExternalError> {
        let mut command = Command::new(&self.executable);
        command
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = command.spawn().map_err(|e| self.spawn_error(e))?;

        // stdin is written from its own thread so a tool that streams output while
        // reading cannot fill the stdout pipe and stall.
        let writer = match (stdin, child.stdin.take()) {
            (Some(input), Some(mut pipe)) => {
                let input = input.to_string();
                Some(std::thread::spawn(move || pipe.write_all(input.as_bytes())))
            }
            _ => None,
        };

        let output = child.wait_with_output()?;
        let written = writer.map(|handle| {
            handle
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")))
        });

        if !output.status.success() {
            return Err(ExternalError::ToolFailed {
                tool: self.tool,
                executable: self.executable.clone(),
                args: args.join(" "),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if let Some(result) = written {
            result?;
        }
        Ok(output)
    }

    fn spawn_error(&self, error: std::io::Error) -> ExternalError {
        if error.kind() == ErrorKind::NotFound {
            ExternalError::ToolNotFound {
                tool: self.tool,
                executable: self.executable.clone(),
                env_var: self.env_var,
            }
        } else {
            ExternalError::Io(error)
        }
    }
}
