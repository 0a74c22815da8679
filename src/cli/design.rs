//! Options and output shared by the `hcr` and `padlock` commands.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;
use tempfile::TempDir;

use crate::cli::OutputFormat;
use crate::core::target::{TargetRequest, TargetSource};
use crate::core::types::ProbeScheme;
use crate::design::assembly::{AssembledProbe, ProbeAssembler};
use crate::design::config::{DesignConfig, DEFAULT_HALF_LENGTH};
use crate::design::pipeline::{ProbeDesigner, ProbeSet, TargetOutcome};
use crate::external::bowtie2::Bowtie2;
use crate::external::entrez::{EntrezClient, DEFAULT_EFETCH_URL};
use crate::external::rnafold::RnaFold;
use crate::filtering::composition::CompositionFilter;
use crate::parsing::batch::parse_batch_file;
use crate::utils::validation::gene_file_stem;

#[derive(Args)]
pub struct DesignArgs {
    /// Gene name; fetched records must mention it in their description
    #[arg(short, long, required_unless_present = "batch")]
    pub name: Option<String>,

    /// Nucleotide accession of the target transcript (e.g. NM_009377.2)
    #[arg(short, long)]
    pub accession: Option<String>,

    /// Literal target sequence; used instead of fetching the accession
    #[arg(short, long, conflicts_with = "fasta")]
    pub sequence: Option<String>,

    /// FASTA file holding the target sequence (first record, plain or gzip)
    #[arg(long)]
    pub fasta: Option<PathBuf>,

    /// JSON file listing several targets
    #[arg(long, conflicts_with_all = ["name", "accession", "sequence", "fasta"])]
    pub batch: Option<PathBuf>,

    /// bowtie2 index basename of the reference transcriptome
    #[arg(long, required = true)]
    pub db: PathBuf,

    /// Contact email sent with NCBI requests
    #[arg(long)]
    pub email: Option<String>,

    /// NCBI API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// E-utilities efetch endpoint
    #[arg(long, hide = true, default_value = DEFAULT_EFETCH_URL)]
    pub efetch_url: String,

    /// Length of each probe half
    #[arg(short = 'l', long, default_value_t = DEFAULT_HALF_LENGTH)]
    pub probe_length: usize,

    /// Lowest accepted GC% of a probe half
    #[arg(long, default_value_t = 40.0)]
    pub gc_min: f64,

    /// Highest accepted GC% of a probe half
    #[arg(long, default_value_t = 60.0)]
    pub gc_max: f64,

    /// Reject halves with hairpin ΔG (kcal/mol) at or below this value
    #[arg(long, default_value_t = -9.0, allow_hyphen_values = true)]
    pub dg_threshold: f64,

    /// Write <gene>_probes.tsv for every target into this directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Keep query FASTA and alignment reports in this directory
    #[arg(long)]
    pub work_dir: Option<PathBuf>,
}

impl DesignArgs {
    /// Targets named on the command line or in the batch file
    ///
    /// # Errors
    ///
    /// Returns an error if the batch file is invalid or no sequence source is given.
    pub fn requests(&self) -> anyhow::Result<Vec<TargetRequest>> {
        if let Some(batch) = &self.batch {
            return parse_batch_file(batch)
                .with_context(|| format!("Failed to read batch file {}", batch.display()));
        }

        let Some(name) = self.name.clone() else {
            bail!("--name is required unless --batch is given");
        };

        let source = if let Some(sequence) = &self.sequence {
            TargetSource::Sequence(sequence.clone())
        } else if let Some(fasta) = &self.fasta {
            TargetSource::Fasta(fasta.clone())
        } else if let Some(accession) = &self.accession {
            TargetSource::Accession(accession.clone())
        } else {
            bail!("One of --sequence, --fasta or --accession is required");
        };

        Ok(vec![TargetRequest {
            name,
            accession: self.accession.clone(),
            source,
            hairpin_id: None,
        }])
    }

    /// Parameters for `scheme` with the command-line overrides applied
    #[must_use]
    pub fn config(&self, scheme: ProbeScheme, spacing: Option<usize>) -> DesignConfig {
        let defaults = DesignConfig::for_scheme(scheme);
        DesignConfig {
            half_length: self.probe_length,
            composition: CompositionFilter {
                gc_low: self.gc_min,
                gc_high: self.gc_max,
                dg_threshold: self.dg_threshold,
            },
            spacing: spacing.unwrap_or(defaults.spacing),
            ..defaults
        }
    }
}

/// Build the production services, run every target and report the results.
///
/// # Errors
///
/// Returns an error if the parameters are invalid, a single target fails, or any
/// target of a batch fails.
pub fn run_design(
    args: &DesignArgs,
    config: DesignConfig,
    assembler: ProbeAssembler,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let requests = args.requests()?;

    let source = EntrezClient::new(args.email.clone(), args.api_key.clone())?
        .with_base_url(args.efetch_url.clone());
    let aligner = Bowtie2::new(&args.db);
    let thermo = RnaFold::new();

    // A temporary work directory lives until the run is over
    let (work_dir, _temp_dir): (PathBuf, Option<TempDir>) = match &args.work_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create work directory {}", dir.display()))?;
            (dir.clone(), None)
        }
        None => {
            let temp = TempDir::new().context("Failed to create temporary work directory")?;
            (temp.path().to_path_buf(), Some(temp))
        }
    };

    let designer = ProbeDesigner::new(config, assembler, &source, &aligner, &thermo, &work_dir)?;

    if verbose {
        eprintln!(
            "Designing {} target(s), work files in {}",
            requests.len(),
            work_dir.display()
        );
    }

    let mut outcomes = designer.design_batch(&requests);

    // A single failing target is reported as the command's error
    if args.batch.is_none() && outcomes.len() == 1 && outcomes[0].result.is_err() {
        if let Some(TargetOutcome {
            name,
            result: Err(e),
        }) = outcomes.pop()
        {
            return Err(anyhow::Error::new(e).context(format!("Design failed for {name}")));
        }
    }

    report(&outcomes, args.output_dir.as_deref(), format)
}

/// Print results and write per-target files, failing if any target failed.
///
/// # Errors
///
/// Returns an error if output cannot be written or any target failed.
pub fn report(
    outcomes: &[TargetOutcome],
    output_dir: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if let Some(dir) = output_dir {
        write_probe_tables(outcomes, dir)?;
    }

    match format {
        OutputFormat::Text => print_text_results(outcomes),
        OutputFormat::Json => print_json_results(outcomes)?,
        OutputFormat::Tsv => print_tsv_results(outcomes),
    }

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        bail!("{failed} of {} targets failed", outcomes.len());
    }
    Ok(())
}

fn write_probe_tables(outcomes: &[TargetOutcome], dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    for set in outcomes.iter().filter_map(|o| o.result.as_ref().ok()) {
        let path = dir.join(format!("{}_probes.tsv", gene_file_stem(&set.name)?));
        let mut table = String::new();
        writeln!(table, "{}", tsv_header(set.scheme))?;
        for line in tsv_rows(set) {
            writeln!(table, "{line}")?;
        }
        std::fs::write(&path, table)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

fn tsv_header(scheme: ProbeScheme) -> &'static str {
    match scheme {
        ProbeScheme::Hcr => "name\taccession\toffset\tprobe_a\tprobe_b",
        ProbeScheme::Padlock => {
            "name\taccession\toffset\tprimer\tpadlock\tprimer_bonds\tpadlock_bonds"
        }
    }
}

fn tsv_rows(set: &ProbeSet) -> Vec<String> {
    let accession = set.accession.as_deref().unwrap_or("");
    set.probes
        .iter()
        .map(|selected| match &selected.probe {
            AssembledProbe::Hcr { probe_a, probe_b } => format!(
                "{}\t{}\t{}\t{}\t{}",
                set.name, accession, selected.offset, probe_a, probe_b
            ),
            AssembledProbe::Padlock {
                primer,
                padlock,
                bonds,
            } => {
                let (primer_bonds, padlock_bonds) = bonds
                    .map(|b| (b.primer.to_string(), b.padlock.to_string()))
                    .unwrap_or_default();
                format!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    set.name,
                    accession,
                    selected.offset,
                    primer,
                    padlock,
                    primer_bonds,
                    padlock_bonds
                )
            }
        })
        .collect()
}

fn print_text_results(outcomes: &[TargetOutcome]) {
    for outcome in outcomes {
        let set = match &outcome.result {
            Ok(set) => set,
            Err(e) => {
                println!("{}: FAILED - {}", outcome.name, e);
                println!();
                continue;
            }
        };

        let accession = set
            .accession
            .as_deref()
            .map(|a| format!(" ({a})"))
            .unwrap_or_default();
        println!(
            "{}{}: {} {} probe pairs",
            set.name,
            accession,
            set.probes.len(),
            set.scheme
        );
        println!(
            "  CDS {}..{}, {} candidates ({} composition, {} structure, {} specificity rejections)",
            set.cds_start,
            set.cds_end,
            set.stats.candidates,
            set.stats.composition_rejected,
            set.stats.structure_rejected,
            set.stats.specificity_rejected
        );

        for selected in &set.probes {
            match &selected.probe {
                AssembledProbe::Hcr { probe_a, probe_b } => {
                    println!("  {:>6}  A {}", selected.offset, probe_a);
                    println!("          B {}", probe_b);
                }
                AssembledProbe::Padlock {
                    primer,
                    padlock,
                    bonds,
                } => {
                    println!("  {:>6}  primer  {}", selected.offset, primer);
                    match bonds {
                        Some(b) => println!("          padlock {} bonds {}", padlock, b),
                        None => println!("          padlock {}", padlock),
                    }
                }
            }
        }
        println!();
    }
}

fn print_json_results(outcomes: &[TargetOutcome]) -> anyhow::Result<()> {
    let output: Vec<serde_json::Value> = outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(set) => serde_json::json!({
                "name": outcome.name,
                "status": "ok",
                "result": set,
            }),
            Err(e) => serde_json::json!({
                "name": outcome.name,
                "status": "failed",
                "error": e.to_string(),
            }),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(outcomes: &[TargetOutcome]) {
    let mut header_printed = false;
    for outcome in outcomes {
        match &outcome.result {
            Ok(set) => {
                if !header_printed {
                    println!("{}", tsv_header(set.scheme));
                    header_printed = true;
                }
                for line in tsv_rows(set) {
                    println!("{line}");
                }
            }
            Err(e) => eprintln!("{}: FAILED - {}", outcome.name, e),
        }
    }
}
