use serde::Serialize;

use crate::core::types::ProbeScheme;
use crate::external::bowtie2::{RELAXED_SCORE_MIN, STRICT_SCORE_MIN};
use crate::filtering::composition::CompositionFilter;
use crate::utils::validation::MAX_HALF_LENGTH;

/// Default probe half length in nucleotides
pub const DEFAULT_HALF_LENGTH: usize = 20;

/// Default extra spacing between neighbouring HCR probe pairs
pub const DEFAULT_SPACING: usize = 1;

/// Tunable parameters shared by both probe schemes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignConfig {
    /// Length `L` of each probe half; a candidate window is `2L` long
    pub half_length: usize,
    pub composition: CompositionFilter,
    /// Minimum gap between selected HCR windows; ignored for padlocks
    pub spacing: usize,
    /// Aligner score function for candidate pairs
    pub candidate_score_min: String,
    /// Aligner score function for assembled oligos
    pub assembled_score_min: String,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            half_length: DEFAULT_HALF_LENGTH,
            composition: CompositionFilter::default(),
            spacing: DEFAULT_SPACING,
            candidate_score_min: STRICT_SCORE_MIN.to_string(),
            assembled_score_min: STRICT_SCORE_MIN.to_string(),
        }
    }
}

impl DesignConfig {
    /// Defaults with the aligner profiles used for `scheme`
    #[must_use]
    pub fn for_scheme(scheme: ProbeScheme) -> Self {
        let candidate_score_min = match scheme {
            ProbeScheme::Hcr => STRICT_SCORE_MIN,
            ProbeScheme::Padlock => RELAXED_SCORE_MIN,
        };
        Self {
            candidate_score_min: candidate_score_min.to_string(),
            ..Self::default()
        }
    }

    /// Check parameters before any work is done.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid parameter.
    pub fn validate(&self) -> Result<(), String> {
        if self.half_length == 0 {
            return Err("Probe half length must be greater than 0".to_string());
        }
        if self.half_length > MAX_HALF_LENGTH {
            return Err(format!(
                "Probe half length {} exceeds maximum of {MAX_HALF_LENGTH}",
                self.half_length
            ));
        }

        let CompositionFilter {
            gc_low,
            gc_high,
            dg_threshold,
        } = self.composition;
        if !(0.0..=100.0).contains(&gc_low) || !(0.0..=100.0).contains(&gc_high) {
            return Err(format!(
                "GC range [{gc_low}, {gc_high}] must lie within [0, 100]"
            ));
        }
        if gc_low > gc_high {
            return Err(format!(
                "GC lower bound {gc_low} exceeds upper bound {gc_high}"
            ));
        }
        if !dg_threshold.is_finite() {
            return Err(format!("Hairpin ΔG threshold {dg_threshold} is not finite"));
        }
        if self.candidate_score_min.trim().is_empty() || self.assembled_score_min.trim().is_empty()
        {
            return Err("Aligner score function must not be empty".to_string());
        }

        Ok(())
    }
}
