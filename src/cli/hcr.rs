//! HCR command - design split-initiator HCR v3 probe pairs.

use clap::Args;

use crate::cli::design::{run_design, DesignArgs};
use crate::cli::OutputFormat;
use crate::core::scaffold::{HcrScaffold, Initiator, ProbeScaffold, DEFAULT_HCR_SPACERS};
use crate::core::types::ProbeScheme;
use crate::design::assembly::ProbeAssembler;
use crate::design::config::DEFAULT_SPACING;

/// Arguments for the hcr command
#[derive(Args)]
pub struct HcrArgs {
    #[command(flatten)]
    pub design: DesignArgs,

    /// Amplifier hairpin (B1-B5); batch entries may override it per target
    #[arg(long, required = true, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub hairpin: u8,

    /// Which initiator of the hairpin pair to split across the probes
    #[arg(long, value_enum, default_value = "i1")]
    pub initiator: Initiator,

    /// Minimum number of bases between neighbouring probe pairs
    #[arg(long, default_value_t = DEFAULT_SPACING)]
    pub spacing: usize,

    /// Spacer between the initiator half and the binding half of probe A
    #[arg(long, default_value = DEFAULT_HCR_SPACERS.0)]
    pub spacer_a: String,

    /// Spacer between the binding half and the initiator half of probe B
    #[arg(long, default_value = DEFAULT_HCR_SPACERS.1)]
    pub spacer_b: String,
}

/// Execute the hcr command
///
/// # Errors
///
/// Returns an error if the scaffold or parameters are invalid, or any target fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: HcrArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let scaffold = HcrScaffold::new(
        args.hairpin,
        args.initiator,
        (args.spacer_a.as_str(), args.spacer_b.as_str()),
    )?;

    if verbose {
        eprintln!(
            "Hairpin B{} {:?}: {}",
            scaffold.hairpin_id,
            scaffold.initiator,
            scaffold.initiator_sequence()
        );
    }

    let config = args.design.config(ProbeScheme::Hcr, Some(args.spacing));
    let assembler = ProbeAssembler::new(ProbeScaffold::Hcr(scaffold));
    run_design(&args.design, config, assembler, format, verbose)
}
