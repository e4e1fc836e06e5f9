//! Execution backends.
//!
//! A backend is one (architecture, execution mode) pairing that can run a
//! program file and report its output. The pipeline never looks past the
//! [`Executor`] trait; the concrete command-driven implementation lives in
//! [`command`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{error::FuzzError, fuzz_err, Result};

pub mod command;
pub use command::CommandExecutor;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[allow(non_camel_case_types)]
pub enum Architecture {
    Arm,
    Arm64,
    X86,
    X86_64,
    Mips,
    Mips64,
}

impl Architecture {
    pub fn is_64bit(self) -> bool {
        matches!(
            self,
            Architecture::Arm64 | Architecture::X86_64 | Architecture::Mips64
        )
    }

    /// Instruction-set name as the toolchain spells it.
    pub fn isa_name(self) -> &'static str {
        match self {
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
            Architecture::X86 => "x86",
            Architecture::X86_64 => "x86_64",
            Architecture::Mips => "mips",
            Architecture::Mips64 => "mips64",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecMode {
    Optimizing,
    Interpreter,
}

/// Output of one run. Held by the executor until the next `reset()`.
#[derive(Clone, Debug, Default)]
pub struct ExecutionResult {
    pub output: Vec<String>,
    pub timed_out: bool,
    pub return_code: Option<i32>,
}

impl ExecutionResult {
    /// Single-line form used for output comparison.
    pub fn flattened_output(&self) -> String {
        self.output.join(" ")
    }

    pub fn flattened_output_with_newlines(&self) -> String {
        self.output.join("\n")
    }
}

/// Contract between the pipeline and one backend.
///
/// Executors carry mutable per-run state and must not be shared across
/// concurrent iterations; `reset()` is called before every use.
pub trait Executor {
    fn name(&self) -> String;

    fn architecture(&self) -> Architecture;

    fn mode(&self) -> ExecMode;

    /// Clear per-run state before the next execution.
    fn reset(&mut self);

    /// Stage the program for execution (e.g. push it to the target).
    fn prepare(&mut self, program: &Path) -> Result<()>;

    /// Run the program. Blocks up to the configured timeout; a timeout is a
    /// normal recorded outcome, not an error.
    fn execute(&mut self, program: &Path);

    /// Whether the target's own bytecode verification accepted the program
    /// on the last execution.
    fn did_target_verify(&self) -> bool;

    fn result(&self) -> &ExecutionResult;

    /// Run the program once in the trusted host environment. Returns false
    /// if it failed to even produce a verified run, in which case target
    /// execution is skipped entirely.
    fn verify_on_host(&mut self, program: &Path) -> bool;

    /// Release per-iteration resources. Runs on every path, including early
    /// aborts.
    fn finished_with_program(&mut self);
}

/// Construction-time settings shared by all command-driven executors.
#[derive(Clone, Debug)]
pub struct ExecutorConfig {
    pub timeout: Duration,
    pub execute_on_host: bool,
    pub device_name: Option<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            timeout: Duration::from_secs(30),
            execute_on_host: true,
            device_name: None,
        }
    }
}

type ExecutorCtor = fn(&ExecutorConfig) -> Box<dyn Executor>;

macro_rules! executor_ctor {
    ($fn_name:ident, $arch:ident, $mode:ident) => {
        fn $fn_name(config: &ExecutorConfig) -> Box<dyn Executor> {
            Box::new(CommandExecutor::new(
                Architecture::$arch,
                ExecMode::$mode,
                config,
            ))
        }
    };
}

executor_ctor!(arm_optimizing, Arm, Optimizing);
executor_ctor!(arm_interpreter, Arm, Interpreter);
executor_ctor!(arm64_optimizing, Arm64, Optimizing);
executor_ctor!(arm64_interpreter, Arm64, Interpreter);
executor_ctor!(x86_optimizing, X86, Optimizing);
executor_ctor!(x86_interpreter, X86, Interpreter);
executor_ctor!(x86_64_optimizing, X86_64, Optimizing);
executor_ctor!(x86_64_interpreter, X86_64, Interpreter);
executor_ctor!(mips_optimizing, Mips, Optimizing);
executor_ctor!(mips_interpreter, Mips, Interpreter);
executor_ctor!(mips64_optimizing, Mips64, Optimizing);
executor_ctor!(mips64_interpreter, Mips64, Interpreter);

/// Explicit registry mapping every supported (architecture, mode) pairing
/// to a constructor. Populated statically so a missing pairing is caught by
/// the table test rather than discovered at runtime.
const EXECUTOR_REGISTRY: &[(Architecture, ExecMode, ExecutorCtor)] = &[
    (Architecture::Arm, ExecMode::Optimizing, arm_optimizing),
    (Architecture::Arm, ExecMode::Interpreter, arm_interpreter),
    (Architecture::Arm64, ExecMode::Optimizing, arm64_optimizing),
    (Architecture::Arm64, ExecMode::Interpreter, arm64_interpreter),
    (Architecture::X86, ExecMode::Optimizing, x86_optimizing),
    (Architecture::X86, ExecMode::Interpreter, x86_interpreter),
    (Architecture::X86_64, ExecMode::Optimizing, x86_64_optimizing),
    (Architecture::X86_64, ExecMode::Interpreter, x86_64_interpreter),
    (Architecture::Mips, ExecMode::Optimizing, mips_optimizing),
    (Architecture::Mips, ExecMode::Interpreter, mips_interpreter),
    (Architecture::Mips64, ExecMode::Optimizing, mips64_optimizing),
    (Architecture::Mips64, ExecMode::Interpreter, mips64_interpreter),
];

pub fn create_executor(
    architecture: Architecture,
    mode: ExecMode,
    config: &ExecutorConfig,
) -> Result<Box<dyn Executor>> {
    for (arch, m, ctor) in EXECUTOR_REGISTRY {
        if *arch == architecture && *m == mode {
            return Ok(ctor(config));
        }
    }
    fuzz_err!(UnknownExecutor { architecture, mode })
}
