//! Instruction format descriptors.
//!
//! Every opcode maps to exactly one format: the fixed physical layout of the
//! instruction in the stream. The set is closed, so formats are a plain enum
//! and every operation is a match - no virtual dispatch, and the compiler
//! checks exhaustiveness whenever a new shape is added.
//!
//! Layouts follow [Android Docs: Dalvik executable instruction
//! formats](https://source.android.com/docs/core/runtime/instruction-formats).
//! Byte 0 of every instruction is the opcode value.

use crate::rawdex::codec;
use crate::rawdex::instruction::Instruction;
use crate::rawdex::opcode::Opcode;

#[allow(non_camel_case_types)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Format {
    k10x,  // op
    k12x,  // op vA, vB
    k11n,  // op vA, #+B
    k11x,  // op vAA
    k10t,  // op +AA
    k20t,  // op +AAAA
    k22x,  // op vAA, vBBBB
    k21t,  // op vAA, +BBBB
    k21s,  // op vAA, #+BBBB
    k21h,  // op vAA, #+BBBB00000[00000000]
    k21c,  // op vAA, thing@BBBB
    k23x,  // op vAA, vBB, vCC
    k22b,  // op vAA, vBB, #+CC
    k22t,  // op vA, vB, +CCCC
    k22s,  // op vA, vB, #+CCCC
    k22c,  // op vA, vB, thing@CCCC
    k32x,  // op vAAAA, vBBBB
    k30t,  // op +AAAAAAAA
    k31t,  // op vAA, +BBBBBBBB
    k31i,  // op vAA, #+BBBBBBBB
    k31c,  // op vAA, string@BBBBBBBB
    k35c,  // op {vC, vD, vE, vF, vG}, thing@BBBB (A: count, G packed with A)
    k35mi, // same layout as 35c, B indexes a VM-private inline table
    k3rc,  // op {vCCCC .. v(CCCC+AA-1)}, meth@BBBB
    k51l,  // op vAA, #+BBBBBBBBBBBBBBBB
}

/// Which decoded operand slot a capability reads and writes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperandField {
    A,
    B,
    C,
}

/// The format carries an immediate constant in one of its fields.
#[derive(Copy, Clone, Debug)]
pub struct ConstSpec {
    pub field: OperandField,
    pub bits: u8,
}

impl ConstSpec {
    /// Number of distinct values the constant field can represent.
    /// Saturates for the full 64-bit field of `51l`.
    pub fn range(&self) -> u64 {
        1u64.checked_shl(self.bits as u32).unwrap_or(u64::MAX)
    }

    /// Smallest encodable constant. All constant fields are signed.
    pub fn min(&self) -> i64 {
        if self.bits >= 64 {
            i64::MIN
        } else {
            -(1i64 << (self.bits - 1))
        }
    }

    /// Largest encodable constant.
    pub fn max(&self) -> i64 {
        if self.bits >= 64 {
            i64::MAX
        } else {
            (1i64 << (self.bits - 1)) - 1
        }
    }

    pub fn get(&self, insn: &Instruction) -> i64 {
        insn.operand(self.field)
    }

    /// The descriptor trusts the caller to stay within `min()..=max()`;
    /// out-of-range values are a mutator bug, not validated here.
    pub fn set(&self, insn: &mut Instruction, value: i64) {
        insn.set_operand(self.field, value);
    }
}

/// Which constant pool the index field of an instruction refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PoolIndexKind {
    String,
    Type,
    Field,
    Method,
    Invalid,
}

/// The format carries an index into one of the DEX constant pools. The pool
/// kind is a property of the opcode, not the format: the same layout serves
/// different pools depending on the mnemonic using it.
#[derive(Copy, Clone)]
pub struct PoolIndexSpec {
    pub field: OperandField,
    kind: fn(Opcode) -> PoolIndexKind,
}

impl PoolIndexSpec {
    pub fn kind(&self, opcode: Opcode) -> PoolIndexKind {
        (self.kind)(opcode)
    }

    pub fn get(&self, insn: &Instruction) -> i64 {
        insn.operand(self.field)
    }

    pub fn set(&self, insn: &mut Instruction, index: i64) {
        insn.set_operand(self.field, index);
    }
}

/// The format carries a relative branch target.
#[derive(Copy, Clone, Debug)]
pub struct TargetSpec {
    pub field: OperandField,
}

impl TargetSpec {
    pub fn get(&self, insn: &Instruction) -> i64 {
        insn.operand(self.field)
    }

    pub fn set(&self, insn: &mut Instruction, target: i64) {
        insn.set_operand(self.field, target);
    }
}

fn pool_kind_21c(opcode: Opcode) -> PoolIndexKind {
    match opcode {
        Opcode::CONST_STRING => PoolIndexKind::String,
        Opcode::CONST_CLASS | Opcode::CHECK_CAST | Opcode::NEW_INSTANCE => PoolIndexKind::Type,
        _ => PoolIndexKind::Field,
    }
}

fn pool_kind_22c(opcode: Opcode) -> PoolIndexKind {
    match opcode {
        Opcode::INSTANCE_OF | Opcode::NEW_ARRAY => PoolIndexKind::Type,
        _ => PoolIndexKind::Field,
    }
}

fn pool_kind_31c(_opcode: Opcode) -> PoolIndexKind {
    PoolIndexKind::String
}

// filled-new-array shares the invoke layout but indexes the type pool.
fn pool_kind_35c(opcode: Opcode) -> PoolIndexKind {
    match opcode {
        Opcode::FILLED_NEW_ARRAY => PoolIndexKind::Type,
        _ => PoolIndexKind::Method,
    }
}

fn pool_kind_3rc(opcode: Opcode) -> PoolIndexKind {
    match opcode {
        Opcode::FILLED_NEW_ARRAY_RANGE => PoolIndexKind::Type,
        _ => PoolIndexKind::Method,
    }
}

impl Format {
    /// Fixed size of the format. Code units are 16 bits.
    pub const fn size_in_code_units(self) -> usize {
        match self {
            Format::k10x | Format::k12x | Format::k11n | Format::k11x | Format::k10t => 1,
            Format::k20t
            | Format::k22x
            | Format::k21t
            | Format::k21s
            | Format::k21h
            | Format::k21c
            | Format::k23x
            | Format::k22b
            | Format::k22t
            | Format::k22s
            | Format::k22c => 2,
            Format::k32x
            | Format::k30t
            | Format::k31t
            | Format::k31i
            | Format::k31c
            | Format::k35c
            | Format::k35mi
            | Format::k3rc => 3,
            Format::k51l => 5,
        }
    }

    pub const fn size_in_bytes(self) -> usize {
        self.size_in_code_units() * 2
    }

    /// Extract the A operand from the raw bytes of an instruction.
    /// Formats without an A field decode 0.
    pub fn decode_a(self, raw: &[u8]) -> i64 {
        match self {
            Format::k10x => 0,
            Format::k12x | Format::k11n => codec::unsigned_low_nibble(raw, 1),
            Format::k11x
            | Format::k22x
            | Format::k21t
            | Format::k21s
            | Format::k21h
            | Format::k21c
            | Format::k23x
            | Format::k22b
            | Format::k31t
            | Format::k31i
            | Format::k31c
            | Format::k3rc
            | Format::k51l => codec::unsigned_byte(raw, 1),
            Format::k10t => codec::signed_byte(raw, 1),
            Format::k20t => codec::signed_short(raw, 2),
            Format::k30t => codec::signed_int(raw, 2),
            Format::k22t | Format::k22s | Format::k22c => codec::unsigned_low_nibble(raw, 1),
            Format::k32x => codec::unsigned_short(raw, 2),
            Format::k35c | Format::k35mi => codec::unsigned_high_nibble(raw, 1),
        }
    }

    /// Extract the B operand. `21h` yields the raw 16-bit value; the caller
    /// shifts it into the high bits of the materialized constant.
    pub fn decode_b(self, raw: &[u8]) -> i64 {
        match self {
            Format::k10x | Format::k11x | Format::k10t | Format::k20t | Format::k30t => 0,
            Format::k12x | Format::k22t | Format::k22s | Format::k22c => {
                codec::unsigned_high_nibble(raw, 1)
            }
            Format::k11n => codec::signed_high_nibble(raw, 1),
            Format::k21t | Format::k21s | Format::k21h => codec::signed_short(raw, 2),
            Format::k22x | Format::k21c | Format::k35c | Format::k35mi | Format::k3rc => {
                codec::unsigned_short(raw, 2)
            }
            Format::k23x | Format::k22b => codec::unsigned_byte(raw, 2),
            Format::k31t | Format::k31i => codec::signed_int(raw, 2),
            Format::k31c => codec::unsigned_int(raw, 2),
            Format::k32x => codec::unsigned_short(raw, 4),
            Format::k51l => codec::signed_long(raw, 2),
        }
    }

    /// Extract the C operand. Formats without a C field decode 0.
    pub fn decode_c(self, raw: &[u8]) -> i64 {
        match self {
            Format::k23x => codec::unsigned_byte(raw, 3),
            Format::k22b => codec::signed_byte(raw, 3),
            Format::k22t | Format::k22s => codec::signed_short(raw, 2),
            Format::k22c => codec::unsigned_short(raw, 2),
            Format::k35c | Format::k35mi => codec::unsigned_low_nibble(raw, 4),
            Format::k3rc => codec::unsigned_short(raw, 4),
            _ => 0,
        }
    }

    /// Serialize `insn` into `buf`, which must hold exactly
    /// `size_in_bytes()` bytes. Inverse of `decode_a`/`b`/`c` for every
    /// value inside the fields' declared ranges; out-of-range values are a
    /// caller error and are neither clamped nor validated.
    pub fn encode(self, insn: &Instruction, buf: &mut [u8]) {
        assert_eq!(buf.len(), self.size_in_bytes(), "format/buffer desync");
        buf[0] = insn.opcode.value();
        let a = insn.vreg_a;
        let b = insn.vreg_b;
        let c = insn.vreg_c;
        match self {
            Format::k10x => buf[1] = 0,
            Format::k12x | Format::k11n => buf[1] = codec::pack_nibbles(a as u8, b as u8),
            Format::k11x | Format::k10t => buf[1] = a as u8,
            Format::k20t => {
                buf[1] = 0;
                codec::write_unsigned_short(buf, 2, a as u16);
            }
            Format::k22x | Format::k21t | Format::k21s | Format::k21h | Format::k21c => {
                buf[1] = a as u8;
                codec::write_unsigned_short(buf, 2, b as u16);
            }
            Format::k23x | Format::k22b => {
                buf[1] = a as u8;
                buf[2] = b as u8;
                buf[3] = c as u8;
            }
            Format::k22t | Format::k22s | Format::k22c => {
                buf[1] = codec::pack_nibbles(a as u8, b as u8);
                codec::write_unsigned_short(buf, 2, c as u16);
            }
            Format::k32x => {
                buf[1] = 0;
                codec::write_unsigned_short(buf, 2, a as u16);
                codec::write_unsigned_short(buf, 4, b as u16);
            }
            Format::k30t => {
                buf[1] = 0;
                codec::write_unsigned_int(buf, 2, a as u32);
            }
            Format::k31t | Format::k31i | Format::k31c => {
                buf[1] = a as u8;
                codec::write_unsigned_int(buf, 2, b as u32);
            }
            Format::k35c | Format::k35mi => {
                let info = insn
                    .invoke_info
                    .as_ref()
                    .expect("35c/35mi instruction without invoke info");
                buf[1] = codec::pack_nibbles(info.vreg_g, a as u8);
                codec::write_unsigned_short(buf, 2, b as u16);
                buf[4] = codec::pack_nibbles(c as u8, info.vreg_d);
                buf[5] = codec::pack_nibbles(info.vreg_e, info.vreg_f);
            }
            Format::k3rc => {
                buf[1] = a as u8;
                codec::write_unsigned_short(buf, 2, b as u16);
                codec::write_unsigned_short(buf, 4, c as u16);
            }
            Format::k51l => {
                buf[1] = a as u8;
                codec::write_unsigned_long(buf, 2, b as u64);
            }
        }
    }

    pub fn const_spec(self) -> Option<ConstSpec> {
        Some(match self {
            Format::k11n => ConstSpec {
                field: OperandField::B,
                bits: 4,
            },
            Format::k21s | Format::k21h => ConstSpec {
                field: OperandField::B,
                bits: 16,
            },
            Format::k22b => ConstSpec {
                field: OperandField::C,
                bits: 8,
            },
            Format::k22s => ConstSpec {
                field: OperandField::C,
                bits: 16,
            },
            Format::k31i => ConstSpec {
                field: OperandField::B,
                bits: 32,
            },
            Format::k51l => ConstSpec {
                field: OperandField::B,
                bits: 64,
            },
            _ => return None,
        })
    }

    /// `35mi` is deliberately absent: its index points into a VM-private
    /// inline table, not a standard constant pool.
    pub fn pool_index_spec(self) -> Option<PoolIndexSpec> {
        Some(match self {
            Format::k21c => PoolIndexSpec {
                field: OperandField::B,
                kind: pool_kind_21c,
            },
            Format::k22c => PoolIndexSpec {
                field: OperandField::C,
                kind: pool_kind_22c,
            },
            Format::k31c => PoolIndexSpec {
                field: OperandField::B,
                kind: pool_kind_31c,
            },
            Format::k35c => PoolIndexSpec {
                field: OperandField::B,
                kind: pool_kind_35c,
            },
            Format::k3rc => PoolIndexSpec {
                field: OperandField::B,
                kind: pool_kind_3rc,
            },
            _ => return None,
        })
    }

    pub fn target_spec(self) -> Option<TargetSpec> {
        Some(match self {
            Format::k10t | Format::k20t | Format::k30t => TargetSpec {
                field: OperandField::A,
            },
            Format::k21t | Format::k31t => TargetSpec {
                field: OperandField::B,
            },
            Format::k22t => TargetSpec {
                field: OperandField::C,
            },
            _ => return None,
        })
    }

    /// How many register operands the format reads from the instruction.
    /// `None` for formats whose registers come from an argument list.
    pub fn vreg_count(self) -> Option<u8> {
        match self {
            Format::k11n
            | Format::k11x
            | Format::k21c
            | Format::k21h
            | Format::k21s
            | Format::k21t
            | Format::k31c
            | Format::k31i
            | Format::k31t
            | Format::k51l => Some(1),
            Format::k12x
            | Format::k22b
            | Format::k22c
            | Format::k22s
            | Format::k22t
            | Format::k22x
            | Format::k32x => Some(2),
            Format::k23x => Some(3),
            _ => None,
        }
    }

    /// Only the variable-argument invoke layouts carry the packed side
    /// record of up to five argument registers.
    pub const fn needs_invoke_info(self) -> bool {
        matches!(self, Format::k35c | Format::k35mi)
    }
}
