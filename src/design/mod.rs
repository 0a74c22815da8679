//! Per-target probe design.
//!
//! [`ProbeDesigner`](pipeline::ProbeDesigner) runs one target through the whole
//! pipeline:
//!
//! 1. Enumerate every candidate window of width `2L`
//! 2. Reject halves on GC%, homopolymer runs and hairpin ΔG
//! 3. Padlock scheme only: fold assembled primer and padlock strands
//! 4. Align live candidates and their assembled oligos, reject off-target hits
//! 5. Select positions inside the coding region
//! 6. Attach the scheme's scaffold to each selected position
//!
//! Everything a run creates (candidates, masks, the variant memo) belongs to that run;
//! batch runs design targets one after another and isolate their failures.

pub mod assembly;
pub mod config;
pub mod pipeline;
