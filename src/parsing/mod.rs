//! Readers and writers for the files exchanged with users and external tools.
//!
//! This module provides parsers for:
//!
//! - **Alignment reports**: Tab-separated hit lines written by the aligner (SAM body)
//! - **FASTA files**: Target sequences in, candidate query records out
//! - **Batch files**: JSON lists of targets to design in one run
//! - **UGI tables**: TSV/CSV lists of universal inserts for the padlock scheme
//!
//! ## Alignment report columns
//!
//! Only two columns of each hit line are used:
//!
//! | Column | Content | Example |
//! |--------|---------|---------|
//! | 1 | Query id, `<id>` or `<id>-<part>` | `17`, `17-2` |
//! | 3 | Reference id, `*` when unaligned | `NM_009377.2` |

pub mod alignment_report;
pub mod batch;
pub mod fasta;
pub mod ugi;

use thiserror::Error;

use crate::core::types::QueryIdError;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Malformed query id '{id}' on line {line}: {source}")]
    MalformedQueryId {
        line: usize,
        id: String,
        source: QueryIdError,
    },

    #[error("Invalid batch file: {0}")]
    Json(#[from] serde_json::Error),
}
