//! Padlock command - design USeqFISH primer and padlock pairs.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::design::{run_design, DesignArgs};
use crate::cli::OutputFormat;
use crate::core::scaffold::{
    PadlockScaffold, ProbeScaffold, DEFAULT_PADLOCK_END, DEFAULT_PADLOCK_SPACER1,
    DEFAULT_PADLOCK_SPACER2, DEFAULT_PADLOCK_START, DEFAULT_PRIMER_END,
};
use crate::core::types::ProbeScheme;
use crate::design::assembly::ProbeAssembler;
use crate::parsing::ugi::parse_ugi_file;

/// Arguments for the padlock command
#[derive(Args)]
pub struct PadlockArgs {
    #[command(flatten)]
    pub design: DesignArgs,

    /// Literal UGI insert
    #[arg(long, required_unless_present = "ugi_table", conflicts_with = "ugi_table")]
    pub ugi: Option<String>,

    /// Table of UGI inserts (TSV, or CSV by extension); see --ugi-index
    #[arg(long)]
    pub ugi_table: Option<PathBuf>,

    /// 1-based row of the UGI table to use
    #[arg(long, default_value_t = 1)]
    pub ugi_index: usize,

    /// Linker appended to the primer's binding half
    #[arg(long, default_value = DEFAULT_PRIMER_END)]
    pub primer_end: String,

    /// 5' literal of the padlock
    #[arg(long, default_value = DEFAULT_PADLOCK_START)]
    pub padlock_start: String,

    /// 3' literal of the padlock
    #[arg(long, default_value = DEFAULT_PADLOCK_END)]
    pub padlock_end: String,

    /// Spacer between the padlock's binding half and the UGI
    #[arg(long, default_value = DEFAULT_PADLOCK_SPACER1)]
    pub spacer1: String,

    /// Spacer between the UGI and the padlock end
    #[arg(long, default_value = DEFAULT_PADLOCK_SPACER2)]
    pub spacer2: String,
}

impl PadlockArgs {
    fn scaffold(&self) -> anyhow::Result<PadlockScaffold> {
        let ugi = match (&self.ugi, &self.ugi_table) {
            (Some(ugi), _) => ugi.clone(),
            (None, Some(path)) => {
                let table = parse_ugi_file(path)
                    .with_context(|| format!("Failed to read UGI table {}", path.display()))?;
                table.get(self.ugi_index)?.to_string()
            }
            (None, None) => anyhow::bail!("Either --ugi or --ugi-table is required"),
        };

        let scaffold = PadlockScaffold {
            primer_end: self.primer_end.clone(),
            padlock_start: self.padlock_start.clone(),
            padlock_end: self.padlock_end.clone(),
            spacer1: self.spacer1.clone(),
            spacer2: self.spacer2.clone(),
            ugi,
        };
        scaffold.validate()?;
        Ok(scaffold)
    }
}

/// Execute the padlock command
///
/// # Errors
///
/// Returns an error if the UGI cannot be resolved, a literal is invalid, or any
/// target fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: PadlockArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let scaffold = args.scaffold()?;

    if verbose {
        eprintln!("UGI: {}", scaffold.ugi);
    }

    let config = args.design.config(ProbeScheme::Padlock, None);
    let assembler = ProbeAssembler::new(ProbeScaffold::Padlock(scaffold));
    run_design(&args.design, config, assembler, format, verbose)
}
