//! Command-line interface for fish-probes.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **hcr**: Design split-initiator HCR v3 probe pairs
//! - **padlock**: Design USeqFISH primer + padlock pairs
//!
//! ## Usage
//!
//! ```text
//! # HCR probes for a RefSeq transcript, amplified by hairpin B2
//! fish-probes hcr --name Th --accession NM_009377.2 --hairpin 2 --db refseq/mouse_rna
//!
//! # Padlock probes for a literal sequence, UGI #3 from a table
//! fish-probes padlock --name Gad1 --sequence ATGGCG... --ugi-table ugi.tsv --ugi-index 3 \
//!     --db refseq/mouse_rna
//!
//! # Batch of targets, JSON output, per-gene TSV files
//! fish-probes --format json hcr --batch targets.json --hairpin 1 --db refseq/mouse_rna \
//!     --output-dir probes/
//! ```

use clap::{Parser, Subcommand};

pub mod design;
pub mod hcr;
pub mod padlock;

#[derive(Parser)]
#[command(name = "fish-probes")]
#[command(version)]
#[command(about = "Design HCR and padlock probe pairs against target mRNAs")]
#[command(
    long_about = "fish-probes designs pairs of oligonucleotide probes for in-situ hybridization.\n\nFor each target transcript it enumerates every probe-pair position, filters candidates on GC content, homopolymer runs and hairpin stability, removes positions that align to other genes, and selects non-overlapping pairs inside the coding region.\n\nbowtie2 (with a prebuilt transcriptome index) and ViennaRNA RNAfold must be installed; set FISH_PROBES_BOWTIE2_BIN or FISH_PROBES_RNAFOLD_BIN to use other executables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Design split-initiator HCR v3 probe pairs
    Hcr(hcr::HcrArgs),

    /// Design USeqFISH primer and padlock pairs
    Padlock(padlock::PadlockArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
