//! End-to-end design runs against in-memory record source, aligner and thermodynamics.
//!
//! The aligner stand-in reads the query FASTA it is given and reports a fixed reference
//! per query offset, so every pipeline stage runs on real work files.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::ops::Range;
use std::path::Path;

use fish_probes::core::scaffold::{
    HcrScaffold, Initiator, PadlockScaffold, ProbeScaffold, PHOSPHORYLATION_MARK,
};
use fish_probes::core::sequence::reverse_complement;
use fish_probes::design::pipeline::DesignError;
use fish_probes::external::{Aligner, ExternalError, GenBankRecord, RecordSource, Thermodynamics};
use fish_probes::{
    AssembledProbe, DesignConfig, ProbeAssembler, ProbeDesigner, ProbeScheme, QueryId,
    TargetRequest,
};
use tempfile::TempDir;

/// 160 nt, every 20-mer at 50% GC with no homopolymer run
fn periodic_target() -> String {
    "ACGTTGCA".repeat(20)
}

fn revcomp(s: &str) -> String {
    String::from_utf8(reverse_complement(s.as_bytes())).unwrap()
}

#[derive(Default)]
struct Records {
    records: HashMap<String, GenBankRecord>,
    fetched: RefCell<Vec<String>>,
}

impl Records {
    fn with(
        mut self,
        accession: &str,
        description: &str,
        sequence: &str,
        cds: Option<Range<usize>>,
    ) -> Self {
        self.records.insert(
            accession.to_string(),
            GenBankRecord {
                accession: accession.to_string(),
                description: description.to_string(),
                sequence: sequence.to_string(),
                cds,
            },
        );
        self
    }

    fn fetch_count(&self, accession: &str) -> usize {
        self.fetched.borrow().iter().filter(|a| *a == accession).count()
    }
}

impl RecordSource for Records {
    fn fetch_record(&self, accession: &str) -> Result<GenBankRecord, ExternalError> {
        self.fetched.borrow_mut().push(accession.to_string());
        self.records
            .get(accession)
            .cloned()
            .ok_or_else(|| ExternalError::EmptyRecord(accession.to_string()))
    }
}

/// Reports `references[offset]` for every query, `*` for the rest
#[derive(Default)]
struct ScriptedAligner {
    references: HashMap<usize, &'static str>,
    calls: RefCell<Vec<(String, String)>>,
}

impl ScriptedAligner {
    fn hit(mut self, offset: usize, reference: &'static str) -> Self {
        self.references.insert(offset, reference);
        self
    }
}

impl Aligner for ScriptedAligner {
    fn align(&self, queries: &Path, report: &Path, score_min: &str) -> Result<(), ExternalError> {
        let name = queries
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.calls.borrow_mut().push((name, score_min.to_string()));

        let fasta = std::fs::read_to_string(queries)?;
        let mut out = String::new();
        for header in fasta.lines().filter_map(|l| l.strip_prefix('>')) {
            let id: QueryId = header
                .trim()
                .parse()
                .map_err(|e| ExternalError::UnexpectedOutput {
                    tool: "aligner",
                    message: format!("{e}"),
                })?;
            let reference = self.references.get(&id.offset()).copied().unwrap_or("*");
            writeln!(out, "{id}\t0\t{reference}\t1\t42\t40M").unwrap();
        }
        std::fs::write(report, out)?;
        Ok(())
    }
}

/// Fixed hairpin ΔG; structures are either fully open or closed end to end
struct FixedFolds {
    dg: f64,
    paired_ends: bool,
}

impl FixedFolds {
    fn open() -> Self {
        Self {
            dg: 0.0,
            paired_ends: false,
        }
    }
}

impl Thermodynamics for FixedFolds {
    fn hairpin_dg(&self, _sequence: &str) -> Result<f64, ExternalError> {
        Ok(self.dg)
    }

    fn mfe_structure(&self, sequence: &str) -> Result<String, ExternalError> {
        let n = sequence.len();
        if self.paired_ends && n >= 2 {
            Ok(format!("({})", ".".repeat(n - 2)))
        } else {
            Ok(".".repeat(n))
        }
    }
}

fn hcr_assembler(hairpin_id: u8) -> ProbeAssembler {
    let scaffold = HcrScaffold::new(hairpin_id, Initiator::I1, ("ta", "at")).unwrap();
    ProbeAssembler::new(ProbeScaffold::Hcr(scaffold))
}

fn padlock_assembler() -> ProbeAssembler {
    let scaffold = PadlockScaffold::with_ugi("GTCAGTCAGTCA").unwrap();
    ProbeAssembler::new(ProbeScaffold::Padlock(scaffold))
}

fn gad1_records() -> Records {
    Records::default()
        .with(
            "NM_GAD1",
            "Mus musculus glutamate decarboxylase 1 (Gad1), transcript variant 1, mRNA",
            &periodic_target(),
            Some(10..150),
        )
        .with(
            "NM_VAR",
            "Mus musculus glutamate decarboxylase 1 (Gad1), transcript variant 2, mRNA",
            &periodic_target(),
            None,
        )
        .with(
            "NM_OFF",
            "Mus musculus tyrosine hydroxylase (Th), mRNA",
            "ACGT",
            None,
        )
}

#[test]
fn test_hcr_design_from_accession() {
    let work = TempDir::new().unwrap();
    let records = gad1_records();
    let aligner = ScriptedAligner::default()
        .hit(11, "NM_VAR")
        .hit(53, "NM_OFF");
    let thermo = FixedFolds::open();

    let designer = ProbeDesigner::new(
        DesignConfig::for_scheme(ProbeScheme::Hcr),
        hcr_assembler(1),
        &records,
        &aligner,
        &thermo,
        work.path(),
    )
    .unwrap();

    let set = designer
        .design_request(&TargetRequest::from_accession("Gad1", "NM_GAD1"))
        .unwrap();

    assert_eq!(set.scheme, ProbeScheme::Hcr);
    assert_eq!(set.accession.as_deref(), Some("NM_GAD1"));
    assert_eq!((set.cds_start, set.cds_end), (10, 150));

    // 53 aligns to another gene, 11 only to a variant of the target
    let offsets: Vec<usize> = set.probes.iter().map(|p| p.offset).collect();
    assert_eq!(offsets, vec![11, 54, 96]);

    assert_eq!(set.stats.candidates, 121);
    assert_eq!(set.stats.composition_rejected, 0);
    assert_eq!(set.stats.structure_rejected, 0);
    assert_eq!(set.stats.specificity_rejected, 1);
    assert_eq!(set.stats.record_lookups, 2);

    // Each hit reference is fetched once per run, across both reports
    assert_eq!(records.fetch_count("NM_OFF"), 1);
    assert_eq!(records.fetch_count("NM_VAR"), 1);

    let calls = aligner.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].0.ends_with("_candidates.fasta"));
    assert!(calls[1].0.ends_with("_probes.fasta"));
    assert!(calls.iter().all(|(_, score)| score == "G,20,8"));

    let sequence = periodic_target();
    let AssembledProbe::Hcr { probe_a, probe_b } = &set.probes[0].probe else {
        panic!("expected an HCR probe");
    };
    let scaffold = HcrScaffold::new(1, Initiator::I1, ("ta", "at")).unwrap();
    let (head, tail) = scaffold.split_initiator();
    assert_eq!(
        probe_a,
        &format!("{head}ta{}", revcomp(&sequence[11..31]))
    );
    assert_eq!(
        probe_b,
        &format!("{}at{tail}", revcomp(&sequence[31..51]))
    );
}

#[test]
fn test_hcr_design_keeps_work_files() {
    let work = TempDir::new().unwrap();
    let records = Records::default();
    let aligner = ScriptedAligner::default();
    let thermo = FixedFolds::open();

    let designer = ProbeDesigner::new(
        DesignConfig::for_scheme(ProbeScheme::Hcr),
        hcr_assembler(3),
        &records,
        &aligner,
        &thermo,
        work.path(),
    )
    .unwrap();

    let set = designer
        .design_request(&TargetRequest::from_sequence("Gad1", periodic_target()))
        .unwrap();

    // Whole sequence is coding for literal targets
    let offsets: Vec<usize> = set.probes.iter().map(|p| p.offset).collect();
    assert_eq!(offsets, vec![1, 43, 85]);
    assert_eq!(set.stats.record_lookups, 0);

    let mut files: Vec<String> = std::fs::read_dir(work.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    files.sort();
    assert_eq!(files.len(), 4);
    assert!(files.iter().any(|f| f.ends_with("_candidates.fasta")));
    assert!(files.iter().any(|f| f.ends_with("_candidates.sam")));
    assert!(files.iter().any(|f| f.ends_with("_probes.fasta")));
    assert!(files.iter().any(|f| f.ends_with("_probes.sam")));
}

#[test]
fn test_padlock_design_keeps_overlapping_positions() {
    let work = TempDir::new().unwrap();
    let records = gad1_records();
    let aligner = ScriptedAligner::default().hit(40, "NM_OFF");
    let thermo = FixedFolds::open();

    let designer = ProbeDesigner::new(
        DesignConfig::for_scheme(ProbeScheme::Padlock),
        padlock_assembler(),
        &records,
        &aligner,
        &thermo,
        work.path(),
    )
    .unwrap();

    let set = designer
        .design_request(&TargetRequest::from_sequence("Gad1", periodic_target()))
        .unwrap();

    // Every in-bounds offset but the off-target one, overlaps allowed
    let offsets: Vec<usize> = set.probes.iter().map(|p| p.offset).collect();
    let expected: Vec<usize> = (1..120).filter(|&o| o != 40).collect();
    assert_eq!(offsets, expected);

    let AssembledProbe::Padlock {
        primer,
        padlock,
        bonds,
    } = &set.probes[0].probe
    else {
        panic!("expected a padlock probe");
    };
    let sequence = periodic_target();
    assert_eq!(primer, &format!("{}TAATGTTATCTT", revcomp(&sequence[21..41])));
    assert_eq!(
        padlock,
        &format!(
            "{PHOSPHORYLATION_MARK}ACATTA{}atttaGTCAGTCAGTCAattaAAGATA",
            revcomp(&sequence[1..21])
        )
    );
    let bonds = bonds.expect("bond counts for padlock probes");
    assert_eq!((bonds.primer, bonds.padlock), (0, 0));

    // Relaxed profile for candidate pairs, strict for primers and padlocks
    let calls = aligner.calls.borrow();
    let scores: Vec<(&str, &str)> = calls
        .iter()
        .map(|(file, score)| {
            let label = file.rsplit('_').next().unwrap_or("");
            (label, score.as_str())
        })
        .collect();
    assert_eq!(
        scores,
        vec![
            ("candidates.fasta", "G,10,4"),
            ("primers.fasta", "G,20,8"),
            ("padlocks.fasta", "G,20,8"),
        ]
    );
}

#[test]
fn test_padlock_structure_rejects_everything_and_skips_alignment() {
    let work = TempDir::new().unwrap();
    let records = Records::default();
    let aligner = ScriptedAligner::default();
    let thermo = FixedFolds {
        dg: 0.0,
        paired_ends: true,
    };

    let designer = ProbeDesigner::new(
        DesignConfig::for_scheme(ProbeScheme::Padlock),
        padlock_assembler(),
        &records,
        &aligner,
        &thermo,
        work.path(),
    )
    .unwrap();

    let set = designer
        .design_request(&TargetRequest::from_sequence("Gad1", periodic_target()))
        .unwrap();

    assert!(set.probes.is_empty());
    assert_eq!(set.stats.structure_rejected, 121);
    assert!(aligner.calls.borrow().is_empty());
}

#[test]
fn test_stable_hairpins_reject_all_candidates() {
    let work = TempDir::new().unwrap();
    let records = Records::default();
    let aligner = ScriptedAligner::default();
    let thermo = FixedFolds {
        dg: -12.5,
        paired_ends: false,
    };

    let designer = ProbeDesigner::new(
        DesignConfig::for_scheme(ProbeScheme::Hcr),
        hcr_assembler(1),
        &records,
        &aligner,
        &thermo,
        work.path(),
    )
    .unwrap();

    let set = designer
        .design_request(&TargetRequest::from_sequence("Gad1", periodic_target()))
        .unwrap();

    assert!(set.probes.is_empty());
    assert_eq!(set.stats.composition_rejected, 121);
    assert!(aligner.calls.borrow().is_empty());
}

#[test]
fn test_gene_mismatch_is_fatal() {
    let work = TempDir::new().unwrap();
    let records = gad1_records();
    let aligner = ScriptedAligner::default();
    let thermo = FixedFolds::open();

    let designer = ProbeDesigner::new(
        DesignConfig::for_scheme(ProbeScheme::Hcr),
        hcr_assembler(1),
        &records,
        &aligner,
        &thermo,
        work.path(),
    )
    .unwrap();

    let err = designer
        .design_request(&TargetRequest::from_accession("Th", "NM_GAD1"))
        .unwrap_err();
    assert!(matches!(err, DesignError::GeneMismatch { .. }));
    assert!(aligner.calls.borrow().is_empty());
}

#[test]
fn test_batch_isolates_failures() {
    let work = TempDir::new().unwrap();
    let records = gad1_records();
    let aligner = ScriptedAligner::default();
    let thermo = FixedFolds::open();

    let designer = ProbeDesigner::new(
        DesignConfig::for_scheme(ProbeScheme::Hcr),
        hcr_assembler(1),
        &records,
        &aligner,
        &thermo,
        work.path(),
    )
    .unwrap();

    let mut overridden = TargetRequest::from_sequence("Gad2", periodic_target());
    overridden.hairpin_id = Some(4);

    let requests = vec![
        TargetRequest::from_accession("Gad1", "NM_MISSING"),
        TargetRequest::from_accession("Gad1", "NM_GAD1"),
        overridden,
        TargetRequest::from_sequence("Bad", "ACGTXYZ"),
    ];
    let outcomes = designer.design_batch(&requests);

    assert_eq!(outcomes.len(), 4);
    assert!(matches!(
        outcomes[0].result,
        Err(DesignError::External(ExternalError::EmptyRecord(_)))
    ));
    assert!(outcomes[1].result.is_ok());
    assert!(matches!(outcomes[3].result, Err(DesignError::Target(_))));

    // Per-target hairpin override changes the initiator halves
    let set = outcomes[2].result.as_ref().unwrap();
    let b4 = HcrScaffold::new(4, Initiator::I1, ("ta", "at")).unwrap();
    let (head, _) = b4.split_initiator();
    let (probe_a, _) = set.probes[0].probe.oligos();
    assert!(probe_a.starts_with(head));
}

#[test]
fn test_invalid_config_is_rejected() {
    let records = Records::default();
    let aligner = ScriptedAligner::default();
    let thermo = FixedFolds::open();

    let config = DesignConfig {
        half_length: 0,
        ..DesignConfig::default()
    };
    let result = ProbeDesigner::new(
        config,
        hcr_assembler(1),
        &records,
        &aligner,
        &thermo,
        "unused",
    );
    assert!(matches!(result, Err(DesignError::InvalidParameter(_))));
}
