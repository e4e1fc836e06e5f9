//! Decoded instruction model.

use crate::{
    error::FuzzError,
    fuzz_err,
    rawdex::codec,
    rawdex::format::OperandField,
    rawdex::opcode::Opcode,
    Result,
};

/// Side record for `35c`/`35mi` instructions: up to five argument registers
/// have to be packed across two trailing bytes, with `vG` sharing a byte
/// with the argument count.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvokeInfo {
    pub vreg_d: u8,
    pub vreg_e: u8,
    pub vreg_f: u8,
    pub vreg_g: u8,
}

/// Data-payload pseudo-instructions share the NOP opcode byte and carry an
/// ident in the high byte of the first code unit.
pub const PACKED_SWITCH_IDENT: u8 = 0x01;
pub const SPARSE_SWITCH_IDENT: u8 = 0x02;
pub const FILL_ARRAY_DATA_IDENT: u8 = 0x03;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    PackedSwitch,
    SparseSwitch,
    FillArrayData,
}

/// Raw bytes of a data payload, kept verbatim. Mutators never touch these,
/// so decode and re-encode is a straight copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    pub kind: PayloadKind,
    pub raw: Vec<u8>,
}

/// One decoded instruction occurrence.
///
/// Operand values are register indices or immediate payloads depending on
/// the opcode's format; the format's capability specs say which. The byte
/// offset of the instruction is owned by the containing [`Program`].
///
/// [`Program`]: crate::rawdex::program::Program
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub vreg_a: i64,
    pub vreg_b: i64,
    pub vreg_c: i64,
    pub invoke_info: Option<InvokeInfo>,
    pub payload: Option<Payload>,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Instruction {
        let invoke_info = if opcode.format().needs_invoke_info() {
            Some(InvokeInfo::default())
        } else {
            None
        };
        Instruction {
            opcode,
            vreg_a: 0,
            vreg_b: 0,
            vreg_c: 0,
            invoke_info,
            payload: None,
        }
    }

    pub fn size_in_code_units(&self) -> usize {
        match &self.payload {
            Some(payload) => payload.raw.len() / 2,
            None => self.opcode.format().size_in_code_units(),
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        self.size_in_code_units() * 2
    }

    pub fn operand(&self, field: OperandField) -> i64 {
        match field {
            OperandField::A => self.vreg_a,
            OperandField::B => self.vreg_b,
            OperandField::C => self.vreg_c,
        }
    }

    pub fn set_operand(&mut self, field: OperandField, value: i64) {
        match field {
            OperandField::A => self.vreg_a = value,
            OperandField::B => self.vreg_b = value,
            OperandField::C => self.vreg_c = value,
        }
    }

    /// Decode one instruction from `buf` at byte offset `at`.
    pub fn read(buf: &[u8], at: usize) -> Result<Instruction> {
        if at + 2 > buf.len() {
            return fuzz_err!(TruncatedInstruction {
                what: "instruction",
                offset: at,
                need: 2,
                have: buf.len()
            });
        }

        let opcode_value = buf[at];
        let upper_bits = buf[at + 1];
        if opcode_value == 0x00 && upper_bits != 0x00 {
            return Instruction::read_payload(buf, at, upper_bits);
        }

        let opcode = Opcode::from_byte(opcode_value);
        let format = opcode.format();
        let size = format.size_in_bytes();
        if at + size > buf.len() {
            return fuzz_err!(TruncatedInstruction {
                what: opcode.name(),
                offset: at,
                need: size,
                have: buf.len()
            });
        }

        let raw = &buf[at..at + size];
        let mut insn = Instruction {
            opcode,
            vreg_a: format.decode_a(raw),
            vreg_b: format.decode_b(raw),
            vreg_c: format.decode_c(raw),
            invoke_info: None,
            payload: None,
        };

        if format.needs_invoke_info() {
            insn.invoke_info = Some(InvokeInfo {
                vreg_d: (raw[4] >> 4) & 0x0F,
                vreg_e: raw[5] & 0x0F,
                vreg_f: (raw[5] >> 4) & 0x0F,
                vreg_g: raw[1] & 0x0F,
            });
        }
        Ok(insn)
    }

    fn read_payload(buf: &[u8], at: usize, ident: u8) -> Result<Instruction> {
        // Payload sizes come from their own headers, in code units.
        let (kind, size_in_code_units) = match ident {
            PACKED_SWITCH_IDENT => {
                Instruction::check_available(buf, at, 4, "packed-switch payload")?;
                let entries = codec::unsigned_short(buf, at + 2) as usize;
                (PayloadKind::PackedSwitch, entries * 2 + 4)
            }
            SPARSE_SWITCH_IDENT => {
                Instruction::check_available(buf, at, 4, "sparse-switch payload")?;
                let entries = codec::unsigned_short(buf, at + 2) as usize;
                (PayloadKind::SparseSwitch, entries * 4 + 2)
            }
            FILL_ARRAY_DATA_IDENT => {
                Instruction::check_available(buf, at, 8, "fill-array-data payload")?;
                let element_width = codec::unsigned_short(buf, at + 2) as usize;
                let element_count = codec::unsigned_int(buf, at + 4) as usize;
                // Round up for odd total byte size.
                (
                    PayloadKind::FillArrayData,
                    (element_count * element_width + 1) / 2 + 4,
                )
            }
            _ => {
                return fuzz_err!(BadPayloadIdent {
                    ident: (ident as u16) << 8,
                    offset: at
                })
            }
        };

        let size = size_in_code_units * 2;
        Instruction::check_available(buf, at, size, "payload data")?;
        Ok(Instruction {
            opcode: Opcode::NOP,
            vreg_a: 0,
            vreg_b: 0,
            vreg_c: 0,
            invoke_info: None,
            payload: Some(Payload {
                kind,
                raw: buf[at..at + size].to_vec(),
            }),
        })
    }

    fn check_available(buf: &[u8], at: usize, need: usize, what: &'static str) -> Result<()> {
        if at + need > buf.len() {
            return fuzz_err!(TruncatedInstruction {
                what,
                offset: at,
                need,
                have: buf.len()
            });
        }
        Ok(())
    }

    /// Append the encoded bytes of this instruction. The encoded length
    /// always equals the declared size of the instruction.
    pub fn write(&self, out: &mut Vec<u8>) {
        if let Some(payload) = &self.payload {
            out.extend_from_slice(&payload.raw);
            return;
        }
        let format = self.opcode.format();
        let start = out.len();
        out.resize(start + format.size_in_bytes(), 0);
        format.encode(self, &mut out[start..]);
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(payload) = &self.payload {
            return match payload.kind {
                PayloadKind::PackedSwitch => write!(f, "packed-switch-payload"),
                PayloadKind::SparseSwitch => write!(f, "sparse-switch-payload"),
                PayloadKind::FillArrayData => write!(f, "fill-array-data-payload"),
            };
        }

        let format = self.opcode.format();
        write!(f, "{}", self.opcode.name())?;
        if let Some(info) = &self.invoke_info {
            let regs = [
                self.vreg_c as u8,
                info.vreg_d,
                info.vreg_e,
                info.vreg_f,
                info.vreg_g,
            ];
            let count = (self.vreg_a.clamp(0, 5)) as usize;
            let names: Vec<String> = regs[..count].iter().map(|r| format!("v{}", r)).collect();
            write!(f, " {{{}}}", names.join(", "))?;
        } else if let Some(count) = format.vreg_count() {
            let regs = [self.vreg_a, self.vreg_b, self.vreg_c];
            let names: Vec<String> = regs[..count as usize]
                .iter()
                .map(|r| format!("v{}", r))
                .collect();
            write!(f, " {}", names.join(", "))?;
        }
        if let Some(spec) = format.const_spec() {
            write!(f, " #{}", spec.get(self))?;
        }
        if let Some(spec) = format.pool_index_spec() {
            write!(f, " pool@{}", spec.get(self))?;
        }
        if let Some(spec) = format.target_spec() {
            write!(f, " {:+}", spec.get(self))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_round_trip() {
        // A representative instruction per size class.
        let cases: Vec<Vec<u8>> = vec![
            vec![0x0e, 0x00],                                     // return-void (10x)
            vec![0x12, 0x83],                                     // const/4 v3, #-8 (11n)
            vec![0x15, 0x01, 0xFF, 0x7F],                         // const/high16 (21h)
            vec![0xd8, 0x01, 0x02, 0xFE],                         // add-int/lit8 (22b)
            vec![0x1b, 0x00, 0x78, 0x56, 0x34, 0x12],             // const-string/jumbo (31c)
            vec![0x6e, 0x53, 0x34, 0x12, 0x21, 0x43],             // invoke-virtual (35c)
            vec![0x18, 0x00, 1, 2, 3, 4, 5, 6, 7, 8],             // const-wide (51l)
        ];
        for bytes in cases {
            let insn = Instruction::read(&bytes, 0).unwrap();
            assert_eq!(insn.size_in_bytes(), bytes.len());
            let mut out = Vec::new();
            insn.write(&mut out);
            assert_eq!(out, bytes);

            let again = Instruction::read(&out, 0).unwrap();
            assert_eq!(again, insn);
        }
    }

    #[test]
    fn test_invoke_info_decoding() {
        // invoke-virtual {v1, v2, v3, v4, v5}, meth@0x1234
        let bytes = [0x6e, 0x55, 0x34, 0x12, 0x21, 0x43];
        let insn = Instruction::read(&bytes, 0).unwrap();
        assert_eq!(insn.vreg_a, 5);
        assert_eq!(insn.vreg_b, 0x1234);
        assert_eq!(insn.vreg_c, 1);
        let info = insn.invoke_info.as_ref().unwrap();
        assert_eq!(info.vreg_d, 2);
        assert_eq!(info.vreg_e, 3);
        assert_eq!(info.vreg_f, 4);
        assert_eq!(info.vreg_g, 5);
    }

    #[test]
    fn test_packed_switch_payload_size() {
        // ident, entry count 2, first key, 2 targets => 4 + 2*2 code units.
        let mut bytes = vec![0x00, 0x01, 0x02, 0x00];
        bytes.extend_from_slice(&[0u8; 12]);
        let insn = Instruction::read(&bytes, 0).unwrap();
        let payload = insn.payload.as_ref().unwrap();
        assert_eq!(payload.kind, PayloadKind::PackedSwitch);
        assert_eq!(insn.size_in_code_units(), 8);

        let mut out = Vec::new();
        insn.write(&mut out);
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_fill_array_data_payload_size() {
        // element width 3, count 3 => (3*3+1)/2 + 4 = 9 code units.
        let mut bytes = vec![0x00, 0x03, 0x03, 0x00, 0x03, 0x00, 0x00, 0x00];
        bytes.extend_from_slice(&[0u8; 10]);
        let insn = Instruction::read(&bytes, 0).unwrap();
        assert_eq!(insn.size_in_code_units(), 9);
    }

    #[test]
    fn test_bad_payload_ident() {
        let bytes = [0x00, 0x07, 0x00, 0x00];
        assert!(matches!(
            Instruction::read(&bytes, 0),
            Err(FuzzError::BadPayloadIdent { .. })
        ));
    }

    #[test]
    fn test_truncated_stream() {
        let bytes = [0x1b, 0x00, 0x78];
        assert!(matches!(
            Instruction::read(&bytes, 0),
            Err(FuzzError::TruncatedInstruction { .. })
        ));
    }

    #[test]
    fn test_display() {
        let insn = Instruction::read(&[0x12, 0x83], 0).unwrap();
        assert_eq!(insn.to_string(), "const/4 v3 #-8");
    }
}
