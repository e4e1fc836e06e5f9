//! Mutation contract consumed by the pipeline, plus one bundled operator.
//!
//! Mutation strategy is a pluggable capability: the pipeline only needs
//! `mutate` and `update_binary`. Operators must never change an
//! instruction's format - only operand values - or the program's offset
//! bookkeeping becomes invalid.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::rawdex::program::Program;

pub trait Mutator {
    /// Apply one mutation to the program in place.
    fn mutate(&mut self, program: &mut Program);

    /// Commit the mutation back to bytes. Returns false if the mutation
    /// could not be committed, in which case the iteration is abandoned
    /// before any execution.
    fn update_binary(&mut self, program: &mut Program) -> bool;
}

/// Replaces the immediate constant of a randomly chosen instruction with a
/// uniformly random value inside the field's declared range.
pub struct ConstTweaker {
    rng: StdRng,
    applied: bool,
}

impl ConstTweaker {
    pub fn new(seed: u64) -> ConstTweaker {
        ConstTweaker {
            rng: StdRng::seed_from_u64(seed),
            applied: false,
        }
    }
}

impl Mutator for ConstTweaker {
    fn mutate(&mut self, program: &mut Program) {
        self.applied = false;
        let candidates: Vec<usize> = program
            .insns()
            .iter()
            .enumerate()
            .filter(|(_, insn)| {
                insn.payload.is_none() && insn.opcode.format().const_spec().is_some()
            })
            .map(|(idx, _)| idx)
            .collect();
        if candidates.is_empty() {
            debug!("no constant-bearing instructions to mutate");
            return;
        }

        let idx = candidates[self.rng.gen_range(0..candidates.len())];
        let insn = &mut program.insns_mut()[idx];
        let spec = insn.opcode.format().const_spec().unwrap();
        let value = self.rng.gen_range(spec.min()..=spec.max());
        debug!(
            "mutating insn {} ({}): const {} -> {}",
            idx,
            insn.opcode.name(),
            spec.get(insn),
            value
        );
        spec.set(insn, value);
        self.applied = true;
    }

    fn update_binary(&mut self, _program: &mut Program) -> bool {
        // The program re-encodes from the decoded model, so a mutation that
        // applied is always committable.
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rawdex::opcode::Opcode;

    #[test]
    fn test_tweaked_const_stays_in_range() {
        let stream = vec![
            0x12, 0x01, // const/4 v1, #0
            0x13, 0x00, 0x00, 0x00, // const/16 v0, #0
            0x0e, 0x00, // return-void
        ];
        for seed in 0..64 {
            let mut program = Program::decode(&stream).unwrap();
            let mut mutator = ConstTweaker::new(seed);
            mutator.mutate(&mut program);
            assert!(mutator.update_binary(&mut program));

            for insn in program.insns() {
                if let Some(spec) = insn.opcode.format().const_spec() {
                    let value = spec.get(insn);
                    assert!(value >= spec.min() && value <= spec.max());
                }
                // Formats must survive mutation untouched.
                assert!(matches!(
                    insn.opcode,
                    Opcode::CONST_4 | Opcode::CONST_16 | Opcode::RETURN_VOID
                ));
            }
            // The stream still encodes at the original size.
            assert_eq!(program.encode().len(), stream.len());
        }
    }

    #[test]
    fn test_no_candidates_reports_failure() {
        let mut program = Program::decode(&[0x0e, 0x00]).unwrap();
        let mut mutator = ConstTweaker::new(1);
        mutator.mutate(&mut program);
        assert!(!mutator.update_binary(&mut program));
    }
}
