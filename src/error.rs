use std::fmt::Debug;

use thiserror::Error;

use crate::executors::{Architecture, ExecMode};

#[derive(Error)]
pub enum FuzzError {
    #[error("Empty or truncated file")]
    TruncatedFile,

    #[error("Bad file magic")]
    BadFileMagic,

    #[error("Bad checksum: {actual:#08x}, expected {expected:#08x}")]
    BadChecksum { actual: u32, expected: u32 },

    #[error("Bad file size ({actual}, expected at least {expected})")]
    FileSizeAtLeast { actual: usize, expected: usize },

    #[error("Instruction stream size({size}) is not a whole number of code units")]
    BadStreamSize { size: usize },

    #[error("{what}: needs {need} bytes at offset {offset} - stream too small({have})")]
    TruncatedInstruction {
        what: &'static str,
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("Unrecognised ident({ident:#06x}) in data-payload instruction at offset {offset}")]
    BadPayloadIdent { ident: u16, offset: usize },

    #[error("No executor registered for ({architecture:?}, {mode:?})")]
    UnknownExecutor {
        architecture: Architecture,
        mode: ExecMode,
    },

    #[error("No backends configured - nothing to run the program on")]
    NoBackends,

    #[error("Bad options: {0}")]
    BadOptions(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

#[macro_export]
macro_rules! fuzz_err {
    ($name:ident) => {
        Err(FuzzError::$name)
    };
    ($name:ident, $arg1:literal, $($arg:tt)*) => {
        Err(FuzzError::$name(format!($arg1, $($arg)*)))
    };
    ($name:ident { $($arg:tt)* }) => {
        Err(FuzzError::$name { $($arg)* })
    };
    ($name:ident, $($arg:tt)*) => {
        Err(FuzzError::$name($($arg)*))
    };
}

impl Debug for FuzzError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}
