//! Raw DEX instruction stream model.
//!
//! The instruction-level codec lives here: primitive byte/nibble accessors,
//! the closed set of instruction formats, the 256-entry opcode table, the
//! decoded [`Instruction`]/[`Program`] model and the checksummed container
//! used to persist a program between fuzzing stages.

pub mod codec;
pub mod container;
pub mod format;
pub mod instruction;
pub mod opcode;
pub mod program;

pub use container::*;
pub use format::*;
pub use instruction::*;
pub use opcode::*;
pub use program::*;
