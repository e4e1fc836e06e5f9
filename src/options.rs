//! Runtime configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::executors::{Architecture, ExecMode};
use crate::{error::FuzzError, fuzz_err, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Seed program consumed at the start of every iteration.
    pub input: PathBuf,
    /// Where the mutated program is written before execution.
    pub output: PathBuf,
    pub iterations: usize,
    pub timeout_secs: u64,
    /// Extra golden-executor runs when checking for self-divergence.
    pub divergence_retry: usize,
    pub skip_host_verify: bool,
    pub skip_mutation: bool,
    pub execute_on_host: bool,
    pub dump_output: bool,
    pub seed: u64,
    pub architectures: Vec<Architecture>,
    pub use_interpreter: bool,
    pub use_optimizing: bool,
    pub device_name: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            input: PathBuf::from("seed.prog"),
            output: PathBuf::from("fuzzed.prog"),
            iterations: 1,
            timeout_secs: 30,
            divergence_retry: 10,
            skip_host_verify: false,
            skip_mutation: false,
            execute_on_host: true,
            dump_output: false,
            seed: 0,
            architectures: vec![Architecture::X86_64],
            use_interpreter: true,
            use_optimizing: true,
            device_name: None,
        }
    }
}

impl Options {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Options> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.architectures.is_empty() {
            return fuzz_err!(BadOptions, "{}", "no target architectures selected");
        }
        if !self.use_interpreter && !self.use_optimizing {
            return fuzz_err!(BadOptions, "{}", "no execution mode selected");
        }
        if self.iterations == 0 {
            return fuzz_err!(BadOptions, "{}", "iterations must be at least 1");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Backend pairings in execution order. The optimizing backend comes
    /// before the same architecture's interpreter: interpreter runs rely on
    /// compilation artifacts already existing, otherwise debug info skew
    /// shows up as false-positive divergences.
    pub fn backend_pairings(&self) -> Vec<(Architecture, ExecMode)> {
        let mut pairings = Vec::new();
        for &arch in &self.architectures {
            if self.use_optimizing {
                pairings.push((arch, ExecMode::Optimizing));
            }
            if self.use_interpreter {
                pairings.push((arch, ExecMode::Interpreter));
            }
        }
        pairings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Options::default().validate().is_ok());
    }

    #[test]
    fn test_validation_catches_empty_backends() {
        let mut options = Options::default();
        options.architectures.clear();
        assert!(matches!(
            options.validate(),
            Err(FuzzError::BadOptions(_))
        ));

        let mut options = Options::default();
        options.use_interpreter = false;
        options.use_optimizing = false;
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_backend_ordering() {
        let mut options = Options::default();
        options.architectures = vec![Architecture::Arm64, Architecture::X86];
        let pairings = options.backend_pairings();
        assert_eq!(
            pairings,
            vec![
                (Architecture::Arm64, ExecMode::Optimizing),
                (Architecture::Arm64, ExecMode::Interpreter),
                (Architecture::X86, ExecMode::Optimizing),
                (Architecture::X86, ExecMode::Interpreter),
            ]
        );
    }

    #[test]
    fn test_json_round_trip() {
        let options = Options::default();
        let json = serde_json::to_string(&options).unwrap();
        let back: Options = serde_json::from_str(&json).unwrap();
        assert_eq!(back.iterations, options.iterations);
        assert_eq!(back.architectures, options.architectures);
    }
}
