//! ViennaRNA `RNAfold` adapter for the [`Thermodynamics`] capability.
//!
//! Sequences are folded with the DNA parameter set. For each input line RNAfold echoes
//! the sequence and then prints `<dot-bracket> (<energy>)`; the energy of that MFE
//! structure doubles as the hairpin ΔG.

use super::{tool_executable, ExternalError, Thermodynamics, ToolCommand};

const DEFAULT_RNAFOLD_BIN: &str = "RNAfold";
pub const RNAFOLD_ENV_BIN: &str = "FISH_PROBES_RNAFOLD_BIN";

/// One folded strand
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub structure: String,
    /// kcal/mol
    pub energy: f64,
}

#[derive(Debug, Clone)]
pub struct RnaFold {
    executable: String,
}

impl Default for RnaFold {
    fn default() -> Self {
        Self::new()
    }
}

impl RnaFold {
    /// Executable from `FISH_PROBES_RNAFOLD_BIN`, or `RNAfold` on the `PATH`
    #[must_use]
    pub fn new() -> Self {
        Self {
            executable: tool_executable(RNAFOLD_ENV_BIN, DEFAULT_RNAFOLD_BIN),
        }
    }

    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Fold every sequence in one RNAfold invocation.
    ///
    /// # Errors
    ///
    /// Returns an `ExternalError` if RNAfold cannot be run, fails, or reports a
    /// different number of structures than sequences were given.
    pub fn fold_all(&self, sequences: &[&str]) -> Result<Vec<Fold>, ExternalError> {
        if sequences.is_empty() {
            return Ok(Vec::new());
        }

        let mut input = sequences.join("\n");
        input.push('\n');

        let command = ToolCommand {
            tool: "RNAfold",
            env_var: RNAFOLD_ENV_BIN,
            executable: self.executable.clone(),
        };
        let args = vec!["--noPS".to_string(), "-P".to_string(), "DNA".to_string()];
        let output = command.run(&args, Some(&input))?;

        let folds = parse_rnafold_output(&String::from_utf8_lossy(&output.stdout))?;
        if folds.len() != sequences.len() {
            return Err(ExternalError::UnexpectedOutput {
                tool: "RNAfold",
                message: format!(
                    "expected {} structures, found {}",
                    sequences.len(),
                    folds.len()
                ),
            });
        }
        Ok(folds)
    }

    fn fold(&self, sequence: &str) -> Result<Fold, ExternalError> {
        self.fold_all(&[sequence])?
            .pop()
            .ok_or_else(|| ExternalError::UnexpectedOutput {
                tool: "RNAfold",
                message: "no structure reported".to_string(),
            })
    }
}

impl Thermodynamics for RnaFold {
    fn hairpin_dg(&self, sequence: &str) -> Result<f64, ExternalError> {
        self.fold(sequence).map(|fold| fold.energy)
    }

    fn mfe_structure(&self, sequence: &str) -> Result<String, ExternalError> {
        self.fold(sequence).map(|fold| fold.structure)
    }

    fn hairpin_dgs(&self, sequences: &[&str]) -> Result<Vec<f64>, ExternalError> {
        Ok(self
            .fold_all(sequences)?
            .into_iter()
            .map(|fold| fold.energy)
            .collect())
    }

    fn mfe_structures(&self, sequences: &[&str]) -> Result<Vec<String>, ExternalError> {
        Ok(self
            .fold_all(sequences)?
            .into_iter()
            .map(|fold| fold.structure)
            .collect())
    }
}

fn is_structure_line(line: &str) -> bool {
    line.starts_with(['.', '(', ')'])
}

/// Parse RNAfold stdout into one [`Fold`] per structure line.
///
/// # Errors
///
/// Returns `ExternalError::UnexpectedOutput` if a structure line has no energy or the
/// energy is not a number.
pub fn parse_rnafold_output(stdout: &str) -> Result<Vec<Fold>, ExternalError> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| is_structure_line(line))
        .map(parse_structure_line)
        .collect()
}

fn parse_structure_line(line: &str) -> Result<Fold, ExternalError> {
    let unexpected = || ExternalError::UnexpectedOutput {
        tool: "RNAfold",
        message: format!("cannot parse structure line '{line}'"),
    };

    // The energy is the last parenthesised group; the structure itself may contain '('.
    let split = line.rfind('(').ok_or_else(unexpected)?;
    let structure = line[..split].trim_end();
    let energy = line[split + 1..]
        .trim_end()
        .strip_suffix(')')
        .ok_or_else(unexpected)?
        .trim()
        .parse::<f64>()
        .map_err(|_| unexpected())?;

    if structure.is_empty() {
        return Err(unexpected());
    }

    Ok(Fold {
        structure: structure.to_string(),
        energy,
    })
}
