//! # fish-probes
//!
//! A library for designing oligonucleotide probe pairs for in-situ hybridization
//! against a target mRNA.
//!
//! Two probe schemes are supported. Split-initiator HCR v3 probes carry half of an
//! amplifier hairpin's initiator on each probe of a pair; USeqFISH padlock probes pair a
//! primer with a circularisable padlock carrying a universal insert (UGI).
//!
//! For each target every window of two adjacent probe halves is a candidate. Candidates
//! are rejected on composition (GC%, homopolymer runs, hairpin ΔG), on secondary structure
//! of the assembled padlock strands, and on specificity: any alignment to a transcript of
//! another gene removes the position. Surviving positions inside the coding region are
//! picked left to right without overlap and fused to the scheme's scaffold.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fish_probes::core::scaffold::{HcrScaffold, Initiator, ProbeScaffold};
//! use fish_probes::core::target::TargetRequest;
//! use fish_probes::design::assembly::ProbeAssembler;
//! use fish_probes::design::config::DesignConfig;
//! use fish_probes::design::pipeline::ProbeDesigner;
//! use fish_probes::external::{bowtie2::Bowtie2, entrez::EntrezClient, rnafold::RnaFold};
//! use fish_probes::ProbeScheme;
//!
//! let source = EntrezClient::new(Some("me@example.org".into()), None).unwrap();
//! let aligner = Bowtie2::new("refseq/mouse_rna");
//! let thermo = RnaFold::new();
//!
//! let scaffold = HcrScaffold::new(2, Initiator::I1, ("ta", "at")).unwrap();
//! let designer = ProbeDesigner::new(
//!     DesignConfig::for_scheme(ProbeScheme::Hcr),
//!     ProbeAssembler::new(ProbeScaffold::Hcr(scaffold)),
//!     &source,
//!     &aligner,
//!     &thermo,
//!     "work",
//! )
//! .unwrap();
//!
//! let set = designer
//!     .design_request(&TargetRequest::from_accession("Th", "NM_009377.2"))
//!     .unwrap();
//! for probe in &set.probes {
//!     let (a, b) = probe.probe.oligos();
//!     println!("{}\t{a}\t{b}", probe.offset);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Targets, candidates, sequence helpers and scaffold tables
//! - [`filtering`]: Composition, structure and specificity filters and position selection
//! - [`external`]: Record source, aligner and thermodynamics capabilities and adapters
//! - [`parsing`]: Alignment reports, FASTA, batch files and UGI tables
//! - [`design`]: Probe assembly and the per-target pipeline
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod design;
pub mod external;
pub mod filtering;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::candidate::Candidate;
pub use core::target::{Target, TargetRequest, TargetSource};
pub use core::types::*;
pub use design::assembly::{AssembledProbe, ProbeAssembler};
pub use design::config::DesignConfig;
pub use design::pipeline::{DesignError, ProbeDesigner, ProbeSet, TargetOutcome};
