//! Whole-program view of an instruction stream.

use crate::{error::FuzzError, fuzz_err, rawdex::instruction::Instruction, Result};

/// An ordered instruction list plus the offset bookkeeping that maps logical
/// references (branch targets, indices) to code-unit positions.
///
/// A `Program` is owned by exactly one fuzzing iteration: it is rebuilt from
/// the input file on load and consumed on save. Mutation may only change
/// operand values, never an instruction's format - a size change would
/// invalidate the offset table, and `encode` panics on that desync since it
/// is a codec bug rather than a fuzzing signal.
#[derive(Clone, Debug, Default)]
pub struct Program {
    insns: Vec<Instruction>,
    // Code-unit offset of each instruction, parallel to `insns`.
    offsets: Vec<usize>,
}

impl Program {
    pub fn new(insns: Vec<Instruction>) -> Program {
        let mut program = Program {
            insns,
            offsets: Vec::new(),
        };
        program.rebuild_offsets();
        program
    }

    /// Decode a full instruction stream.
    pub fn decode(stream: &[u8]) -> Result<Program> {
        if stream.len() % 2 != 0 {
            return fuzz_err!(BadStreamSize { size: stream.len() });
        }
        let mut insns = Vec::new();
        let mut at = 0;
        while at < stream.len() {
            let insn = Instruction::read(stream, at)?;
            at += insn.size_in_bytes();
            insns.push(insn);
        }
        Ok(Program::new(insns))
    }

    /// Re-encode the whole stream. Inverse of `decode`.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size_in_code_units() * 2);
        for (idx, insn) in self.insns.iter().enumerate() {
            assert_eq!(
                out.len() / 2,
                self.offsets[idx],
                "instruction {} changed size after mutation",
                idx
            );
            insn.write(&mut out);
        }
        out
    }

    fn rebuild_offsets(&mut self) {
        self.offsets.clear();
        let mut offset = 0;
        for insn in &self.insns {
            self.offsets.push(offset);
            offset += insn.size_in_code_units();
        }
    }

    pub fn insns(&self) -> &[Instruction] {
        &self.insns
    }

    pub fn insns_mut(&mut self) -> &mut [Instruction] {
        &mut self.insns
    }

    pub fn len(&self) -> usize {
        self.insns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insns.is_empty()
    }

    /// Code-unit offset of the instruction at `index`.
    pub fn offset_of(&self, index: usize) -> usize {
        self.offsets[index]
    }

    /// Instruction index at an exact code-unit offset, if one starts there.
    pub fn index_at(&self, code_unit_offset: usize) -> Option<usize> {
        self.offsets.binary_search(&code_unit_offset).ok()
    }

    pub fn size_in_code_units(&self) -> usize {
        self.offsets
            .last()
            .map(|last| last + self.insns[self.insns.len() - 1].size_in_code_units())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rawdex::format::Format;
    use crate::rawdex::opcode::Opcode;

    fn sample_stream() -> Vec<u8> {
        vec![
            0x12, 0x01, // const/4 v1, #0
            0x90, 0x00, 0x01, 0x02, // add-int v0, v1, v2
            0x28, 0xFE, // goto -2
            0x0e, 0x00, // return-void
        ]
    }

    #[test]
    fn test_decode_encode_round_trip() {
        let stream = sample_stream();
        let program = Program::decode(&stream).unwrap();
        assert_eq!(program.len(), 4);
        assert_eq!(program.encode(), stream);
    }

    #[test]
    fn test_offset_tracking() {
        let program = Program::decode(&sample_stream()).unwrap();
        assert_eq!(program.offset_of(0), 0);
        assert_eq!(program.offset_of(1), 1);
        assert_eq!(program.offset_of(2), 3);
        assert_eq!(program.offset_of(3), 4);
        assert_eq!(program.size_in_code_units(), 5);
        assert_eq!(program.index_at(3), Some(2));
        assert_eq!(program.index_at(2), None);
    }

    #[test]
    fn test_mutating_an_operand_keeps_offsets_valid() {
        let mut program = Program::decode(&sample_stream()).unwrap();
        let insn = &mut program.insns_mut()[0];
        assert_eq!(insn.opcode, Opcode::CONST_4);
        let spec = Format::k11n.const_spec().unwrap();
        spec.set(insn, -1);
        let bytes = program.encode();
        assert_eq!(bytes[1], 0x01 | 0xF0);
    }

    #[test]
    fn test_odd_length_stream_rejected() {
        assert!(matches!(
            Program::decode(&[0x0e, 0x00, 0x0e]),
            Err(FuzzError::BadStreamSize { size: 3 })
        ));
    }

    #[test]
    #[should_panic(expected = "changed size")]
    fn test_format_change_panics_on_encode() {
        let mut program = Program::decode(&sample_stream()).unwrap();
        // Swapping an opcode for one of a different format is a codec bug.
        program.insns_mut()[0].opcode = Opcode::CONST_16;
        program.encode();
    }
}
