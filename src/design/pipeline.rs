use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::candidate::{enumerate_candidates, Candidate};
use crate::core::scaffold::{HcrScaffold, ProbeScaffold, ScaffoldError};
use crate::core::target::{Target, TargetError, TargetRequest, TargetSource};
use crate::core::types::{ProbeScheme, QueryId};
use crate::design::assembly::{AssembledProbe, ProbeAssembler};
use crate::design::config::DesignConfig;
use crate::external::{Aligner, ExternalError, RecordSource, Thermodynamics};
use crate::filtering::selection::PositionSelector;
use crate::filtering::specificity::SpecificityOracle;
use crate::filtering::structure::{BondCounts, SecondaryStructureFilter};
use crate::filtering::RejectionMask;
use crate::parsing::alignment_report::{parse_alignment_report, AlignmentHit};
use crate::parsing::fasta::{is_fasta_file, read_first_record, write_queries};
use crate::parsing::ParseError;
use crate::utils::validation::{gene_file_stem, ValidationError};

#[derive(Error, Debug)]
pub enum DesignError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Target name '{gene}' does not match record {accession}: {description}")]
    GeneMismatch {
        gene: String,
        accession: String,
        description: String,
    },

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Scaffold(#[from] ScaffoldError),

    #[error("Invalid target name: {0}")]
    Name(#[from] ValidationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    External(#[from] ExternalError),
}

/// Rejection counts and lookups for one target run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DesignStats {
    pub candidates: usize,
    pub composition_rejected: usize,
    pub structure_rejected: usize,
    pub specificity_rejected: usize,
    /// Record fetches issued while classifying alignment hits
    pub record_lookups: usize,
}

/// A selected position and its assembled oligos
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedProbe {
    pub offset: usize,
    #[serde(flatten)]
    pub probe: AssembledProbe,
}

/// Probes designed for one target, ordered by offset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeSet {
    pub name: String,
    pub accession: Option<String>,
    pub scheme: ProbeScheme,
    pub cds_start: usize,
    pub cds_end: usize,
    pub probes: Vec<SelectedProbe>,
    pub stats: DesignStats,
}

/// Result of one target in a batch
#[derive(Debug)]
pub struct TargetOutcome {
    pub name: String,
    pub result: Result<ProbeSet, DesignError>,
}

/// Runs the full design pipeline for targets of one probe scheme.
///
/// Work files (query FASTA and alignment reports) are written to `work_dir`, named
/// after the target.
pub struct ProbeDesigner<'a> {
    config: DesignConfig,
    assembler: ProbeAssembler,
    source: &'a dyn RecordSource,
    aligner: &'a dyn Aligner,
    thermo: &'a dyn Thermodynamics,
    work_dir: PathBuf,
}

impl<'a> ProbeDesigner<'a> {
    /// # Errors
    ///
    /// Returns `DesignError::InvalidParameter` if `config` fails validation.
    pub fn new(
        config: DesignConfig,
        assembler: ProbeAssembler,
        source: &'a dyn RecordSource,
        aligner: &'a dyn Aligner,
        thermo: &'a dyn Thermodynamics,
        work_dir: impl Into<PathBuf>,
    ) -> Result<Self, DesignError> {
        config.validate().map_err(DesignError::InvalidParameter)?;
        Ok(Self {
            config,
            assembler,
            source,
            aligner,
            thermo,
            work_dir: work_dir.into(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &DesignConfig {
        &self.config
    }

    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Turn a request into a target with its coding region.
    ///
    /// Literal and FASTA sequences are coding over their whole length. Fetched records
    /// must mention the gene name in their description; the record's CDS gives the
    /// coding region, or the whole sequence if it has none.
    ///
    /// # Errors
    ///
    /// Returns `DesignError::GeneMismatch` if the fetched record is not the named gene,
    /// or the error of the failing read, fetch or validation.
    pub fn resolve_target(&self, request: &TargetRequest) -> Result<Target, DesignError> {
        let target = match &request.source {
            TargetSource::Sequence(sequence) => Target::from_sequence(&request.name, sequence)?,
            TargetSource::Fasta(path) => {
                if !is_fasta_file(path) {
                    warn!("{} does not have a FASTA extension", path.display());
                }
                let record = read_first_record(path)?;
                debug!("Read {} from {}", record.name, path.display());
                Target::from_sequence(&request.name, &record.sequence)?
            }
            TargetSource::Accession(accession) => {
                let record = self.source.fetch_record(accession)?;
                if !record
                    .description
                    .to_lowercase()
                    .contains(&request.name.to_lowercase())
                {
                    return Err(DesignError::GeneMismatch {
                        gene: request.name.clone(),
                        accession: accession.clone(),
                        description: record.description,
                    });
                }

                let cds = record.cds.clone().unwrap_or_else(|| {
                    warn!(
                        "{} has no CDS feature; using the whole sequence",
                        accession
                    );
                    0..record.sequence.len()
                });
                Target::new(
                    &request.name,
                    Some(accession.clone()),
                    &record.sequence,
                    cds.start,
                    cds.end,
                )?
            }
        };

        Ok(match &request.accession {
            Some(accession) if target.accession.is_none() => target.with_accession(accession),
            _ => target,
        })
    }

    /// Resolve and design one request, honouring its hairpin override.
    ///
    /// # Errors
    ///
    /// See [`ProbeDesigner::resolve_target`] and [`ProbeDesigner::design`].
    pub fn design_request(&self, request: &TargetRequest) -> Result<ProbeSet, DesignError> {
        let assembler = self.assembler_for(request)?;
        let target = self.resolve_target(request)?;
        self.run(&target, &assembler)
    }

    /// Design every request in turn; a failing target does not stop the others.
    pub fn design_batch(&self, requests: &[TargetRequest]) -> Vec<TargetOutcome> {
        requests
            .iter()
            .map(|request| {
                let result = self.design_request(request);
                if let Err(e) = &result {
                    warn!("{} failed: {}", request.name, e);
                }
                TargetOutcome {
                    name: request.name.clone(),
                    result,
                }
            })
            .collect()
    }

    /// Design probes against an already resolved target.
    ///
    /// # Errors
    ///
    /// Returns a `DesignError` if a work file cannot be written or read, or an
    /// external tool fails. No partial result is returned.
    pub fn design(&self, target: &Target) -> Result<ProbeSet, DesignError> {
        self.run(target, &self.assembler)
    }

    fn assembler_for(&self, request: &TargetRequest) -> Result<Cow<'_, ProbeAssembler>, DesignError> {
        match (request.hairpin_id, self.assembler.scaffold()) {
            (Some(hairpin_id), ProbeScaffold::Hcr(scaffold)) if hairpin_id != scaffold.hairpin_id => {
                let scaffold =
                    HcrScaffold::new(hairpin_id, scaffold.initiator, scaffold.spacers.clone())?;
                Ok(Cow::Owned(ProbeAssembler::new(ProbeScaffold::Hcr(scaffold))))
            }
            (Some(_), ProbeScaffold::Padlock(_)) => {
                warn!("Ignoring hairpin id for padlock target {}", request.name);
                Ok(Cow::Borrowed(&self.assembler))
            }
            _ => Ok(Cow::Borrowed(&self.assembler)),
        }
    }

    fn run(&self, target: &Target, assembler: &ProbeAssembler) -> Result<ProbeSet, DesignError> {
        let scheme = assembler.scheme();
        let half_length = self.config.half_length;
        let stem = gene_file_stem(&target.name)?;

        info!("{} started ({} probes, {} nt)", target.name, scheme, target.len());

        let candidates = enumerate_candidates(&target.sequence, half_length);
        let total = candidates.len();
        let mut stats = DesignStats {
            candidates: total,
            ..DesignStats::default()
        };
        info!("{} candidate positions", total);

        // Composition on probe halves
        let composition = self
            .config
            .composition
            .evaluate(&candidates, self.thermo)?;
        let mut mask = composition.combined();
        stats.composition_rejected = mask.count_rejected();

        // Secondary structure on assembled strands, padlock scheme only
        let mut bonds: BTreeMap<usize, BondCounts> = BTreeMap::new();
        if let ProbeScaffold::Padlock(scaffold) = assembler.scaffold() {
            let live = live_candidates(&candidates, &mask);
            let strands = assembler.strand_pairs(&live);
            let filter = SecondaryStructureFilter {
                primer_end: scaffold.primer_end.len(),
                padlock_start: scaffold.padlock_start.len(),
                padlock_end: scaffold.padlock_end.len(),
            };
            let structure = filter.evaluate(total, &strands, self.thermo)?;
            stats.structure_rejected = structure.rejected.count_rejected();
            mask.union_with(&structure.rejected);
            bonds = structure.bonds;
        }

        // Specificity of the pairs and of every assembled oligo
        let live = live_candidates(&candidates, &mask);
        let live_offsets: Vec<usize> = live.iter().map(|c| c.offset).collect();
        let mut oracle = SpecificityOracle::new(&target.name, self.source);

        if !live.is_empty() {
            let mut specificity = RejectionMask::new(total);

            let pair_queries = live
                .iter()
                .map(|c| (QueryId::single(c.offset), c.pair_sequence()));
            let hits = self.align(
                &stem,
                "candidates",
                pair_queries,
                &self.config.candidate_score_min,
            )?;
            specificity.union_with(&oracle.rejection_mask(&hits, &live_offsets, total)?);

            for batch in assembler.assembled_queries(&live) {
                let hits = self.align(
                    &stem,
                    batch.label,
                    batch.queries.into_iter(),
                    &self.config.assembled_score_min,
                )?;
                specificity.union_with(&oracle.rejection_mask(&hits, &live_offsets, total)?);
            }

            stats.specificity_rejected = specificity.count_rejected();
            stats.record_lookups = oracle.lookups();
            mask.union_with(&specificity);
        }
        debug!(
            "Specificity: {} rejected, {} record lookups, {} memo hits",
            stats.specificity_rejected,
            oracle.lookups(),
            oracle.memo_hits()
        );

        // Selection inside the coding region
        let selector = match scheme {
            ProbeScheme::Hcr => PositionSelector::spaced(half_length, self.config.spacing),
            ProbeScheme::Padlock => PositionSelector::unspaced(half_length),
        };
        let selected = selector.select(&mask, &target.cds());

        let probes: Vec<SelectedProbe> = selected
            .into_iter()
            .map(|offset| SelectedProbe {
                offset,
                probe: assembler.assemble(&candidates[offset], bonds.get(&offset).copied()),
            })
            .collect();

        if probes.is_empty() {
            warn!("{} done, no probes passed all filters", target.name);
        } else {
            info!("{} done, {} probe pairs", target.name, probes.len());
        }

        Ok(ProbeSet {
            name: target.name.clone(),
            accession: target.accession.clone(),
            scheme,
            cds_start: target.cds_start,
            cds_end: target.cds_end,
            probes,
            stats,
        })
    }

    /// Write `queries` to `<stem>_<label>.fasta`, align them and read the report back.
    fn align<I>(
        &self,
        stem: &str,
        label: &str,
        queries: I,
        score_min: &str,
    ) -> Result<Vec<AlignmentHit>, DesignError>
    where
        I: Iterator<Item = (QueryId, String)>,
    {
        let fasta = self.work_dir.join(format!("{stem}_{label}.fasta"));
        let report = self.work_dir.join(format!("{stem}_{label}.sam"));

        let queries: Vec<(QueryId, String)> = queries.collect();
        let count = write_queries(&fasta, queries.iter().map(|(id, seq)| (*id, seq.as_str())))?;
        debug!("Aligning {} {} queries", count, label);

        self.aligner.align(&fasta, &report, score_min)?;
        Ok(parse_alignment_report(&report)?)
    }
}

fn live_candidates<'c>(candidates: &'c [Candidate], mask: &RejectionMask) -> Vec<&'c Candidate> {
    candidates
        .iter()
        .filter(|c| !mask.is_rejected(c.offset))
        .collect()
}
