use std::ops::Range;

use crate::filtering::RejectionMask;

/// Greedy left-to-right selection of probe positions.
///
/// An offset is kept when it is not rejected, its window lies strictly inside the
/// coding region (`cds.start < offset` and `offset + 2L < cds.end`) and, when a spacing
/// is set, it starts more than `2L + spacing` bases after the last kept offset. There is
/// no look-ahead, so a denser packing further right may be missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionSelector {
    half_length: usize,
    spacing: Option<usize>,
}

impl PositionSelector {
    /// Non-overlapping positions separated by at least `spacing` extra bases
    #[must_use]
    pub fn spaced(half_length: usize, spacing: usize) -> Self {
        Self {
            half_length,
            spacing: Some(spacing),
        }
    }

    /// Every surviving in-bounds position, overlapping or not
    #[must_use]
    pub fn unspaced(half_length: usize) -> Self {
        Self {
            half_length,
            spacing: None,
        }
    }

    fn window(&self) -> usize {
        self.half_length.saturating_mul(2)
    }

    fn in_bounds(&self, offset: usize, cds: &Range<usize>) -> bool {
        cds.start < offset && offset.saturating_add(self.window()) < cds.end
    }

    /// Selected offsets in increasing order; empty if nothing qualifies.
    #[must_use]
    pub fn select(&self, mask: &RejectionMask, cds: &Range<usize>) -> Vec<usize> {
        let mut selected: Vec<usize> = Vec::new();

        for offset in mask.live_offsets() {
            if !self.in_bounds(offset, cds) {
                continue;
            }
            let far_enough = match (self.spacing, selected.last()) {
                (Some(spacing), Some(&previous)) => {
                    offset > previous.saturating_add(self.window()).saturating_add(spacing)
                }
                _ => true,
            };
            if far_enough {
                selected.push(offset);
            }
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_full_cds() {
        // 80 nt target, L = 10, nothing rejected
        let mask = RejectionMask::new(61);
        let selected = PositionSelector::spaced(10, 0).select(&mask, &(0..80));
        assert_eq!(selected, vec![1, 22, 43]);
    }

    #[test]
    fn test_spacing_invariant() {
        let mut mask = RejectionMask::new(200);
        for offset in (0..200).filter(|o| o % 7 == 3) {
            mask.reject(offset);
        }
        let (l, s) = (8, 3);
        let selected = PositionSelector::spaced(l, s).select(&mask, &(5..216));

        assert!(!selected.is_empty());
        for pair in selected.windows(2) {
            assert!(pair[1] - pair[0] > 2 * l + s);
        }
        for &offset in &selected {
            assert!(!mask.is_rejected(offset));
            assert!(offset > 5 && offset + 2 * l < 216);
        }
    }

    #[test]
    fn test_selection_is_idempotent() {
        let mut mask = RejectionMask::new(100);
        mask.reject(12);
        mask.reject(40);
        let selector = PositionSelector::spaced(5, 1);
        let first = selector.select(&mask, &(0..110));

        let mut reselect = RejectionMask::new(100);
        for offset in 0..100 {
            if !first.contains(&offset) {
                reselect.reject(offset);
            }
        }
        assert_eq!(selector.select(&reselect, &(0..110)), first);
        assert_eq!(selector.select(&mask, &(0..110)), first);
    }

    #[test]
    fn test_unspaced_keeps_every_survivor() {
        let mut mask = RejectionMask::new(10);
        mask.reject(4);
        let selected = PositionSelector::unspaced(2).select(&mask, &(0..14));
        assert_eq!(selected, vec![1, 2, 3, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_nothing_selectable_is_empty() {
        let mask = RejectionMask::from(vec![true; 20]);
        assert!(PositionSelector::spaced(5, 1).select(&mask, &(0..30)).is_empty());

        let mask = RejectionMask::new(20);
        assert!(PositionSelector::spaced(5, 1).select(&mask, &(0..0)).is_empty());
    }

    #[test]
    fn test_oversized_half_length_selects_nothing() {
        let mask = RejectionMask::new(20);
        let huge = usize::MAX / 2 + 1;
        assert!(PositionSelector::spaced(huge, 1).select(&mask, &(0..30)).is_empty());
        assert!(PositionSelector::unspaced(huge).select(&mask, &(0..30)).is_empty());
    }
}
