//! `bowtie2` adapter for the [`Aligner`] capability.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{tool_executable, Aligner, ExternalError, ToolCommand};

const DEFAULT_BOWTIE2_BIN: &str = "bowtie2";
pub const BOWTIE2_ENV_BIN: &str = "FISH_PROBES_BOWTIE2_BIN";

/// Score function for split HCR probes, primers and padlocks
pub const STRICT_SCORE_MIN: &str = "G,20,8";
/// Score function for padlock-scheme candidate pairs
pub const RELAXED_SCORE_MIN: &str = "G,10,4";

/// Runs `bowtie2` in very-sensitive local mode against a prebuilt index.
///
/// Reports are SAM bodies without header lines, in query order.
#[derive(Debug, Clone)]
pub struct Bowtie2 {
    executable: String,
    index: PathBuf,
}

impl Bowtie2 {
    /// Aligner against the index with basename `index`; the executable comes from
    /// `FISH_PROBES_BOWTIE2_BIN` if set.
    #[must_use]
    pub fn new(index: impl Into<PathBuf>) -> Self {
        Self {
            executable: tool_executable(BOWTIE2_ENV_BIN, DEFAULT_BOWTIE2_BIN),
            index: index.into(),
        }
    }

    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    fn command(&self) -> ToolCommand {
        ToolCommand {
            tool: "bowtie2",
            env_var: BOWTIE2_ENV_BIN,
            executable: self.executable.clone(),
        }
    }
}

/// Command-line arguments for one alignment run
#[must_use]
pub fn bowtie2_args(index: &Path, queries: &Path, report: &Path, score_min: &str) -> Vec<String> {
    vec![
        "--very-sensitive-local".to_string(),
        "-f".to_string(),
        "--no-sq".to_string(),
        "--no-hd".to_string(),
        "--reorder".to_string(),
        "--score-min".to_string(),
        score_min.to_string(),
        "-x".to_string(),
        index.display().to_string(),
        "-U".to_string(),
        queries.display().to_string(),
        "-S".to_string(),
        report.display().to_string(),
    ]
}

impl Aligner for Bowtie2 {
    fn align(&self, queries: &Path, report: &Path, score_min: &str) -> Result<(), ExternalError> {
        let args = bowtie2_args(&self.index, queries, report, score_min);
        debug!("Running {} {}", self.executable, args.join(" "));
        self.command().run(&args, None)?;
        Ok(())
    }
}
