//! Core data types for probe design.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Target`](target::Target): A transcript with its coding-region bounds
//! - [`Candidate`](candidate::Candidate): One probe-pair position, split into two halves
//! - [`CandidateWindows`](candidate::CandidateWindows): Sliding-window enumerator over a target
//! - [`QueryId`](types::QueryId), [`ProbeScheme`](types::ProbeScheme): Identifiers and classification types
//! - [`ProbeScaffold`](scaffold::ProbeScaffold): Initiators, linkers and inserts fused to probe halves
//!
//! ## Orientation
//!
//! Probes bind the transcript, so each candidate is the reverse complement of a window
//! of width `2L` on the target. For a window at offset `i`:
//!
//! | Half     | Sequence                                 |
//! |----------|------------------------------------------|
//! | `half_a` | revcomp of `target[i + L .. i + 2L]`     |
//! | `half_b` | revcomp of `target[i .. i + L]`          |
//!
//! All offsets are 0-based; ids written to FASTA files and alignment reports are 1-based.

pub mod candidate;
pub mod scaffold;
pub mod sequence;
pub mod target;
pub mod types;
