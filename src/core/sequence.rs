use bio::alphabets::dna;

/// Homopolymer runs that disqualify a probe half: four A/T or three G/C in a row.
pub const FORBIDDEN_RUNS: [&[u8]; 4] = [b"AAAA", b"TTTT", b"GGG", b"CCC"];

/// Reverse complement of an uppercase DNA sequence.
#[must_use]
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    dna::revcomp(seq)
}

/// Percentage (0-100) of G and C bases in `seq`.
///
/// An empty sequence has a GC content of 0.
#[must_use]
pub fn gc_percent(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let gc = seq.iter().filter(|&&b| matches!(b, b'G' | b'C')).count();
    #[allow(clippy::cast_precision_loss)]
    {
        100.0 * gc as f64 / seq.len() as f64
    }
}

/// True if `seq` contains any of the [`FORBIDDEN_RUNS`].
#[must_use]
pub fn has_forbidden_run(seq: &[u8]) -> bool {
    FORBIDDEN_RUNS
        .iter()
        .any(|run| seq.windows(run.len()).any(|window| window == *run))
}
