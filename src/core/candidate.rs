use serde::Serialize;

use crate::core::sequence::reverse_complement;

/// Number of candidate windows of width `2 * half_length` in a sequence of `length` bases.
#[must_use]
pub fn candidate_count(length: usize, half_length: usize) -> usize {
    match half_length.checked_mul(2) {
        Some(width) if width > 0 => length.saturating_add(1).saturating_sub(width),
        _ => 0,
    }
}

/// One probe pair position on the target.
///
/// The pair is the reverse complement of `sequence[offset..offset + 2L]`, split at its
/// midpoint: `half_a` is the reverse complement of the window's 3' half and `half_b`
/// the reverse complement of its 5' half, so `half_a + half_b` is the full pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// 0-based start of the window on the target
    pub offset: usize,
    pub half_a: String,
    pub half_b: String,
}

impl Candidate {
    /// Stable 1-based id used for FASTA records and alignment reports
    #[must_use]
    pub fn id(&self) -> usize {
        self.offset + 1
    }

    /// Both halves joined, i.e. the reverse complement of the whole window
    #[must_use]
    pub fn pair_sequence(&self) -> String {
        format!("{}{}", self.half_a, self.half_b)
    }
}

/// Sliding-window enumerator over a target sequence.
///
/// Yields exactly [`candidate_count`] candidates, one per offset in `0..=N-2L`.
/// A clone keeps the current position; call [`CandidateWindows::new`] again to
/// enumerate from the beginning.
#[derive(Debug, Clone)]
pub struct CandidateWindows<'a> {
    sequence: &'a [u8],
    half_length: usize,
    next_offset: usize,
}

impl<'a> CandidateWindows<'a> {
    #[must_use]
    pub fn new(sequence: &'a str, half_length: usize) -> Self {
        Self {
            sequence: sequence.as_bytes(),
            half_length,
            next_offset: 0,
        }
    }

    fn total(&self) -> usize {
        candidate_count(self.sequence.len(), self.half_length)
    }
}

impl Iterator for CandidateWindows<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.next_offset >= self.total() {
            return None;
        }

        let offset = self.next_offset;
        self.next_offset += 1;

        let window = &self.sequence[offset..offset + 2 * self.half_length];
        let pair = reverse_complement(window);
        let (half_a, half_b) = pair.split_at(self.half_length);

        Some(Candidate {
            offset,
            half_a: String::from_utf8_lossy(half_a).into_owned(),
            half_b: String::from_utf8_lossy(half_b).into_owned(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.next_offset);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CandidateWindows<'_> {}

/// Enumerate every candidate of `sequence` into a vector.
#[must_use]
pub fn enumerate_candidates(sequence: &str, half_length: usize) -> Vec<Candidate> {
    CandidateWindows::new(sequence, half_length).collect()
}
