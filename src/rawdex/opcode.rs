//! The 256-entry opcode table.
//!
//! Each opcode carries a fixed association to one [`Format`] and the numeric
//! value stored in the first byte of the instruction. Enum discriminants are
//! assigned in table order, so `opcode as u8` is the encoded value; the table
//! sanity test below keeps the two from drifting apart.

use crate::rawdex::format::Format;

/// Immutable per-opcode information.
pub struct OpcodeInfo {
    pub opcode: Opcode,
    pub name: &'static str,
    pub value: u8,
    pub format: Format,
}

macro_rules! opcode_table {
    ($({$code:ident, $name:literal, $value:literal, $format:ident},)*) => {
        #[repr(u8)]
        #[allow(non_camel_case_types)]
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Opcode {
            $($code,)*
        }

        pub const OPCODE_INFO: &[OpcodeInfo] = &[
            $(OpcodeInfo {
                opcode: Opcode::$code,
                name: $name,
                value: $value,
                format: Format::$format,
            },)*
        ];
    };
}

impl Opcode {
    #[inline(always)]
    pub const fn from_byte(value: u8) -> Opcode {
        OPCODE_INFO[value as usize].opcode
    }

    #[inline(always)]
    pub const fn info(self) -> &'static OpcodeInfo {
        &OPCODE_INFO[self as usize]
    }

    pub const fn name(self) -> &'static str {
        self.info().name
    }

    pub const fn value(self) -> u8 {
        self.info().value
    }

    pub const fn format(self) -> Format {
        self.info().format
    }
}

opcode_table!(
 /* 0x00 */ {NOP, "nop", 0x00, k10x},
 /* 0x01 */ {MOVE, "move", 0x01, k12x},
 /* 0x02 */ {MOVE_FROM16, "move/from16", 0x02, k22x},
 /* 0x03 */ {MOVE_16, "move/16", 0x03, k32x},
 /* 0x04 */ {MOVE_WIDE, "move-wide", 0x04, k12x},
 /* 0x05 */ {MOVE_WIDE_FROM16, "move-wide/from16", 0x05, k22x},
 /* 0x06 */ {MOVE_WIDE_16, "move-wide/16", 0x06, k32x},
 /* 0x07 */ {MOVE_OBJECT, "move-object", 0x07, k12x},
 /* 0x08 */ {MOVE_OBJECT_FROM16, "move-object/from16", 0x08, k22x},
 /* 0x09 */ {MOVE_OBJECT_16, "move-object/16", 0x09, k32x},
 /* 0x0a */ {MOVE_RESULT, "move-result", 0x0a, k11x},
 /* 0x0b */ {MOVE_RESULT_WIDE, "move-result-wide", 0x0b, k11x},
 /* 0x0c */ {MOVE_RESULT_OBJECT, "move-result-object", 0x0c, k11x},
 /* 0x0d */ {MOVE_EXCEPTION, "move-exception", 0x0d, k11x},
 /* 0x0e */ {RETURN_VOID, "return-void", 0x0e, k10x},
 /* 0x0f */ {RETURN, "return", 0x0f, k11x},
 /* 0x10 */ {RETURN_WIDE, "return-wide", 0x10, k11x},
 /* 0x11 */ {RETURN_OBJECT, "return-object", 0x11, k11x},
 /* 0x12 */ {CONST_4, "const/4", 0x12, k11n},
 /* 0x13 */ {CONST_16, "const/16", 0x13, k21s},
 /* 0x14 */ {CONST, "const", 0x14, k31i},
 /* 0x15 */ {CONST_HIGH16, "const/high16", 0x15, k21h},
 /* 0x16 */ {CONST_WIDE_16, "const-wide/16", 0x16, k21s},
 /* 0x17 */ {CONST_WIDE_32, "const-wide/32", 0x17, k31i},
 /* 0x18 */ {CONST_WIDE, "const-wide", 0x18, k51l},
 /* 0x19 */ {CONST_WIDE_HIGH16, "const-wide/high16", 0x19, k21h},
 /* 0x1a */ {CONST_STRING, "const-string", 0x1a, k21c},
 /* 0x1b */ {CONST_STRING_JUMBO, "const-string/jumbo", 0x1b, k31c},
 /* 0x1c */ {CONST_CLASS, "const-class", 0x1c, k21c},
 /* 0x1d */ {MONITOR_ENTER, "monitor-enter", 0x1d, k11x},
 /* 0x1e */ {MONITOR_EXIT, "monitor-exit", 0x1e, k11x},
 /* 0x1f */ {CHECK_CAST, "check-cast", 0x1f, k21c},
 /* 0x20 */ {INSTANCE_OF, "instance-of", 0x20, k22c},
 /* 0x21 */ {ARRAY_LENGTH, "array-length", 0x21, k12x},
 /* 0x22 */ {NEW_INSTANCE, "new-instance", 0x22, k21c},
 /* 0x23 */ {NEW_ARRAY, "new-array", 0x23, k22c},
 /* 0x24 */ {FILLED_NEW_ARRAY, "filled-new-array", 0x24, k35c},
 /* 0x25 */ {FILLED_NEW_ARRAY_RANGE, "filled-new-array/range", 0x25, k3rc},
 /* 0x26 */ {FILL_ARRAY_DATA, "fill-array-data", 0x26, k31t},
 /* 0x27 */ {THROW, "throw", 0x27, k11x},
 /* 0x28 */ {GOTO, "goto", 0x28, k10t},
 /* 0x29 */ {GOTO_16, "goto/16", 0x29, k20t},
 /* 0x2a */ {GOTO_32, "goto/32", 0x2a, k30t},
 /* 0x2b */ {PACKED_SWITCH, "packed-switch", 0x2b, k31t},
 /* 0x2c */ {SPARSE_SWITCH, "sparse-switch", 0x2c, k31t},
 /* 0x2d */ {CMPL_FLOAT, "cmpl-float", 0x2d, k23x},
 /* 0x2e */ {CMPG_FLOAT, "cmpg-float", 0x2e, k23x},
 /* 0x2f */ {CMPL_DOUBLE, "cmpl-double", 0x2f, k23x},
 /* 0x30 */ {CMPG_DOUBLE, "cmpg-double", 0x30, k23x},
 /* 0x31 */ {CMP_LONG, "cmp-long", 0x31, k23x},
 /* 0x32 */ {IF_EQ, "if-eq", 0x32, k22t},
 /* 0x33 */ {IF_NE, "if-ne", 0x33, k22t},
 /* 0x34 */ {IF_LT, "if-lt", 0x34, k22t},
 /* 0x35 */ {IF_GE, "if-ge", 0x35, k22t},
 /* 0x36 */ {IF_GT, "if-gt", 0x36, k22t},
 /* 0x37 */ {IF_LE, "if-le", 0x37, k22t},
 /* 0x38 */ {IF_EQZ, "if-eqz", 0x38, k21t},
 /* 0x39 */ {IF_NEZ, "if-nez", 0x39, k21t},
 /* 0x3a */ {IF_LTZ, "if-ltz", 0x3a, k21t},
 /* 0x3b */ {IF_GEZ, "if-gez", 0x3b, k21t},
 /* 0x3c */ {IF_GTZ, "if-gtz", 0x3c, k21t},
 /* 0x3d */ {IF_LEZ, "if-lez", 0x3d, k21t},
 /* 0x3e */ {UNUSED_3E, "unused-3e", 0x3e, k10x},
 /* 0x3f */ {UNUSED_3F, "unused-3f", 0x3f, k10x},
 /* 0x40 */ {UNUSED_40, "unused-40", 0x40, k10x},
 /* 0x41 */ {UNUSED_41, "unused-41", 0x41, k10x},
 /* 0x42 */ {UNUSED_42, "unused-42", 0x42, k10x},
 /* 0x43 */ {UNUSED_43, "unused-43", 0x43, k10x},
 /* 0x44 */ {AGET, "aget", 0x44, k23x},
 /* 0x45 */ {AGET_WIDE, "aget-wide", 0x45, k23x},
 /* 0x46 */ {AGET_OBJECT, "aget-object", 0x46, k23x},
 /* 0x47 */ {AGET_BOOLEAN, "aget-boolean", 0x47, k23x},
 /* 0x48 */ {AGET_BYTE, "aget-byte", 0x48, k23x},
 /* 0x49 */ {AGET_CHAR, "aget-char", 0x49, k23x},
 /* 0x4a */ {AGET_SHORT, "aget-short", 0x4a, k23x},
 /* 0x4b */ {APUT, "aput", 0x4b, k23x},
 /* 0x4c */ {APUT_WIDE, "aput-wide", 0x4c, k23x},
 /* 0x4d */ {APUT_OBJECT, "aput-object", 0x4d, k23x},
 /* 0x4e */ {APUT_BOOLEAN, "aput-boolean", 0x4e, k23x},
 /* 0x4f */ {APUT_BYTE, "aput-byte", 0x4f, k23x},
 /* 0x50 */ {APUT_CHAR, "aput-char", 0x50, k23x},
 /* 0x51 */ {APUT_SHORT, "aput-short", 0x51, k23x},
 /* 0x52 */ {IGET, "iget", 0x52, k22c},
 /* 0x53 */ {IGET_WIDE, "iget-wide", 0x53, k22c},
 /* 0x54 */ {IGET_OBJECT, "iget-object", 0x54, k22c},
 /* 0x55 */ {IGET_BOOLEAN, "iget-boolean", 0x55, k22c},
 /* 0x56 */ {IGET_BYTE, "iget-byte", 0x56, k22c},
 /* 0x57 */ {IGET_CHAR, "iget-char", 0x57, k22c},
 /* 0x58 */ {IGET_SHORT, "iget-short", 0x58, k22c},
 /* 0x59 */ {IPUT, "iput", 0x59, k22c},
 /* 0x5a */ {IPUT_WIDE, "iput-wide", 0x5a, k22c},
 /* 0x5b */ {IPUT_OBJECT, "iput-object", 0x5b, k22c},
 /* 0x5c */ {IPUT_BOOLEAN, "iput-boolean", 0x5c, k22c},
 /* 0x5d */ {IPUT_BYTE, "iput-byte", 0x5d, k22c},
 /* 0x5e */ {IPUT_CHAR, "iput-char", 0x5e, k22c},
 /* 0x5f */ {IPUT_SHORT, "iput-short", 0x5f, k22c},
 /* 0x60 */ {SGET, "sget", 0x60, k21c},
 /* 0x61 */ {SGET_WIDE, "sget-wide", 0x61, k21c},
 /* 0x62 */ {SGET_OBJECT, "sget-object", 0x62, k21c},
 /* 0x63 */ {SGET_BOOLEAN, "sget-boolean", 0x63, k21c},
 /* 0x64 */ {SGET_BYTE, "sget-byte", 0x64, k21c},
 /* 0x65 */ {SGET_CHAR, "sget-char", 0x65, k21c},
 /* 0x66 */ {SGET_SHORT, "sget-short", 0x66, k21c},
 /* 0x67 */ {SPUT, "sput", 0x67, k21c},
 /* 0x68 */ {SPUT_WIDE, "sput-wide", 0x68, k21c},
 /* 0x69 */ {SPUT_OBJECT, "sput-object", 0x69, k21c},
 /* 0x6a */ {SPUT_BOOLEAN, "sput-boolean", 0x6a, k21c},
 /* 0x6b */ {SPUT_BYTE, "sput-byte", 0x6b, k21c},
 /* 0x6c */ {SPUT_CHAR, "sput-char", 0x6c, k21c},
 /* 0x6d */ {SPUT_SHORT, "sput-short", 0x6d, k21c},
 /* 0x6e */ {INVOKE_VIRTUAL, "invoke-virtual", 0x6e, k35c},
 /* 0x6f */ {INVOKE_SUPER, "invoke-super", 0x6f, k35c},
 /* 0x70 */ {INVOKE_DIRECT, "invoke-direct", 0x70, k35c},
 /* 0x71 */ {INVOKE_STATIC, "invoke-static", 0x71, k35c},
 /* 0x72 */ {INVOKE_INTERFACE, "invoke-interface", 0x72, k35c},
 /* 0x73 */ {RETURN_VOID_NO_BARRIER, "return-void-no-barrier", 0x73, k10x},
 /* 0x74 */ {INVOKE_VIRTUAL_RANGE, "invoke-virtual/range", 0x74, k3rc},
 /* 0x75 */ {INVOKE_SUPER_RANGE, "invoke-super/range", 0x75, k3rc},
 /* 0x76 */ {INVOKE_DIRECT_RANGE, "invoke-direct/range", 0x76, k3rc},
 /* 0x77 */ {INVOKE_STATIC_RANGE, "invoke-static/range", 0x77, k3rc},
 /* 0x78 */ {INVOKE_INTERFACE_RANGE, "invoke-interface/range", 0x78, k3rc},
 /* 0x79 */ {UNUSED_79, "unused-79", 0x79, k10x},
 /* 0x7a */ {UNUSED_7A, "unused-7a", 0x7a, k10x},
 /* 0x7b */ {NEG_INT, "neg-int", 0x7b, k12x},
 /* 0x7c */ {NOT_INT, "not-int", 0x7c, k12x},
 /* 0x7d */ {NEG_LONG, "neg-long", 0x7d, k12x},
 /* 0x7e */ {NOT_LONG, "not-long", 0x7e, k12x},
 /* 0x7f */ {NEG_FLOAT, "neg-float", 0x7f, k12x},
 /* 0x80 */ {NEG_DOUBLE, "neg-double", 0x80, k12x},
 /* 0x81 */ {INT_TO_LONG, "int-to-long", 0x81, k12x},
 /* 0x82 */ {INT_TO_FLOAT, "int-to-float", 0x82, k12x},
 /* 0x83 */ {INT_TO_DOUBLE, "int-to-double", 0x83, k12x},
 /* 0x84 */ {LONG_TO_INT, "long-to-int", 0x84, k12x},
 /* 0x85 */ {LONG_TO_FLOAT, "long-to-float", 0x85, k12x},
 /* 0x86 */ {LONG_TO_DOUBLE, "long-to-double", 0x86, k12x},
 /* 0x87 */ {FLOAT_TO_INT, "float-to-int", 0x87, k12x},
 /* 0x88 */ {FLOAT_TO_LONG, "float-to-long", 0x88, k12x},
 /* 0x89 */ {FLOAT_TO_DOUBLE, "float-to-double", 0x89, k12x},
 /* 0x8a */ {DOUBLE_TO_INT, "double-to-int", 0x8a, k12x},
 /* 0x8b */ {DOUBLE_TO_LONG, "double-to-long", 0x8b, k12x},
 /* 0x8c */ {DOUBLE_TO_FLOAT, "double-to-float", 0x8c, k12x},
 /* 0x8d */ {INT_TO_BYTE, "int-to-byte", 0x8d, k12x},
 /* 0x8e */ {INT_TO_CHAR, "int-to-char", 0x8e, k12x},
 /* 0x8f */ {INT_TO_SHORT, "int-to-short", 0x8f, k12x},
 /* 0x90 */ {ADD_INT, "add-int", 0x90, k23x},
 /* 0x91 */ {SUB_INT, "sub-int", 0x91, k23x},
 /* 0x92 */ {MUL_INT, "mul-int", 0x92, k23x},
 /* 0x93 */ {DIV_INT, "div-int", 0x93, k23x},
 /* 0x94 */ {REM_INT, "rem-int", 0x94, k23x},
 /* 0x95 */ {AND_INT, "and-int", 0x95, k23x},
 /* 0x96 */ {OR_INT, "or-int", 0x96, k23x},
 /* 0x97 */ {XOR_INT, "xor-int", 0x97, k23x},
 /* 0x98 */ {SHL_INT, "shl-int", 0x98, k23x},
 /* 0x99 */ {SHR_INT, "shr-int", 0x99, k23x},
 /* 0x9a */ {USHR_INT, "ushr-int", 0x9a, k23x},
 /* 0x9b */ {ADD_LONG, "add-long", 0x9b, k23x},
 /* 0x9c */ {SUB_LONG, "sub-long", 0x9c, k23x},
 /* 0x9d */ {MUL_LONG, "mul-long", 0x9d, k23x},
 /* 0x9e */ {DIV_LONG, "div-long", 0x9e, k23x},
 /* 0x9f */ {REM_LONG, "rem-long", 0x9f, k23x},
 /* 0xa0 */ {AND_LONG, "and-long", 0xa0, k23x},
 /* 0xa1 */ {OR_LONG, "or-long", 0xa1, k23x},
 /* 0xa2 */ {XOR_LONG, "xor-long", 0xa2, k23x},
 /* 0xa3 */ {SHL_LONG, "shl-long", 0xa3, k23x},
 /* 0xa4 */ {SHR_LONG, "shr-long", 0xa4, k23x},
 /* 0xa5 */ {USHR_LONG, "ushr-long", 0xa5, k23x},
 /* 0xa6 */ {ADD_FLOAT, "add-float", 0xa6, k23x},
 /* 0xa7 */ {SUB_FLOAT, "sub-float", 0xa7, k23x},
 /* 0xa8 */ {MUL_FLOAT, "mul-float", 0xa8, k23x},
 /* 0xa9 */ {DIV_FLOAT, "div-float", 0xa9, k23x},
 /* 0xaa */ {REM_FLOAT, "rem-float", 0xaa, k23x},
 /* 0xab */ {ADD_DOUBLE, "add-double", 0xab, k23x},
 /* 0xac */ {SUB_DOUBLE, "sub-double", 0xac, k23x},
 /* 0xad */ {MUL_DOUBLE, "mul-double", 0xad, k23x},
 /* 0xae */ {DIV_DOUBLE, "div-double", 0xae, k23x},
 /* 0xaf */ {REM_DOUBLE, "rem-double", 0xaf, k23x},
 /* 0xb0 */ {ADD_INT_2ADDR, "add-int/2addr", 0xb0, k12x},
 /* 0xb1 */ {SUB_INT_2ADDR, "sub-int/2addr", 0xb1, k12x},
 /* 0xb2 */ {MUL_INT_2ADDR, "mul-int/2addr", 0xb2, k12x},
 /* 0xb3 */ {DIV_INT_2ADDR, "div-int/2addr", 0xb3, k12x},
 /* 0xb4 */ {REM_INT_2ADDR, "rem-int/2addr", 0xb4, k12x},
 /* 0xb5 */ {AND_INT_2ADDR, "and-int/2addr", 0xb5, k12x},
 /* 0xb6 */ {OR_INT_2ADDR, "or-int/2addr", 0xb6, k12x},
 /* 0xb7 */ {XOR_INT_2ADDR, "xor-int/2addr", 0xb7, k12x},
 /* 0xb8 */ {SHL_INT_2ADDR, "shl-int/2addr", 0xb8, k12x},
 /* 0xb9 */ {SHR_INT_2ADDR, "shr-int/2addr", 0xb9, k12x},
 /* 0xba */ {USHR_INT_2ADDR, "ushr-int/2addr", 0xba, k12x},
 /* 0xbb */ {ADD_LONG_2ADDR, "add-long/2addr", 0xbb, k12x},
 /* 0xbc */ {SUB_LONG_2ADDR, "sub-long/2addr", 0xbc, k12x},
 /* 0xbd */ {MUL_LONG_2ADDR, "mul-long/2addr", 0xbd, k12x},
 /* 0xbe */ {DIV_LONG_2ADDR, "div-long/2addr", 0xbe, k12x},
 /* 0xbf */ {REM_LONG_2ADDR, "rem-long/2addr", 0xbf, k12x},
 /* 0xc0 */ {AND_LONG_2ADDR, "and-long/2addr", 0xc0, k12x},
 /* 0xc1 */ {OR_LONG_2ADDR, "or-long/2addr", 0xc1, k12x},
 /* 0xc2 */ {XOR_LONG_2ADDR, "xor-long/2addr", 0xc2, k12x},
 /* 0xc3 */ {SHL_LONG_2ADDR, "shl-long/2addr", 0xc3, k12x},
 /* 0xc4 */ {SHR_LONG_2ADDR, "shr-long/2addr", 0xc4, k12x},
 /* 0xc5 */ {USHR_LONG_2ADDR, "ushr-long/2addr", 0xc5, k12x},
 /* 0xc6 */ {ADD_FLOAT_2ADDR, "add-float/2addr", 0xc6, k12x},
 /* 0xc7 */ {SUB_FLOAT_2ADDR, "sub-float/2addr", 0xc7, k12x},
 /* 0xc8 */ {MUL_FLOAT_2ADDR, "mul-float/2addr", 0xc8, k12x},
 /* 0xc9 */ {DIV_FLOAT_2ADDR, "div-float/2addr", 0xc9, k12x},
 /* 0xca */ {REM_FLOAT_2ADDR, "rem-float/2addr", 0xca, k12x},
 /* 0xcb */ {ADD_DOUBLE_2ADDR, "add-double/2addr", 0xcb, k12x},
 /* 0xcc */ {SUB_DOUBLE_2ADDR, "sub-double/2addr", 0xcc, k12x},
 /* 0xcd */ {MUL_DOUBLE_2ADDR, "mul-double/2addr", 0xcd, k12x},
 /* 0xce */ {DIV_DOUBLE_2ADDR, "div-double/2addr", 0xce, k12x},
 /* 0xcf */ {REM_DOUBLE_2ADDR, "rem-double/2addr", 0xcf, k12x},
 /* 0xd0 */ {ADD_INT_LIT16, "add-int/lit16", 0xd0, k22s},
 /* 0xd1 */ {RSUB_INT, "rsub-int", 0xd1, k22s},
 /* 0xd2 */ {MUL_INT_LIT16, "mul-int/lit16", 0xd2, k22s},
 /* 0xd3 */ {DIV_INT_LIT16, "div-int/lit16", 0xd3, k22s},
 /* 0xd4 */ {REM_INT_LIT16, "rem-int/lit16", 0xd4, k22s},
 /* 0xd5 */ {AND_INT_LIT16, "and-int/lit16", 0xd5, k22s},
 /* 0xd6 */ {OR_INT_LIT16, "or-int/lit16", 0xd6, k22s},
 /* 0xd7 */ {XOR_INT_LIT16, "xor-int/lit16", 0xd7, k22s},
 /* 0xd8 */ {ADD_INT_LIT8, "add-int/lit8", 0xd8, k22b},
 /* 0xd9 */ {RSUB_INT_LIT8, "rsub-int/lit8", 0xd9, k22b},
 /* 0xda */ {MUL_INT_LIT8, "mul-int/lit8", 0xda, k22b},
 /* 0xdb */ {DIV_INT_LIT8, "div-int/lit8", 0xdb, k22b},
 /* 0xdc */ {REM_INT_LIT8, "rem-int/lit8", 0xdc, k22b},
 /* 0xdd */ {AND_INT_LIT8, "and-int/lit8", 0xdd, k22b},
 /* 0xde */ {OR_INT_LIT8, "or-int/lit8", 0xde, k22b},
 /* 0xdf */ {XOR_INT_LIT8, "xor-int/lit8", 0xdf, k22b},
 /* 0xe0 */ {SHL_INT_LIT8, "shl-int/lit8", 0xe0, k22b},
 /* 0xe1 */ {SHR_INT_LIT8, "shr-int/lit8", 0xe1, k22b},
 /* 0xe2 */ {USHR_INT_LIT8, "ushr-int/lit8", 0xe2, k22b},
 /* 0xe3 */ {IGET_QUICK, "+iget-quick", 0xe3, k22c},
 /* 0xe4 */ {IGET_WIDE_QUICK, "+iget-wide-quick", 0xe4, k22c},
 /* 0xe5 */ {IGET_OBJECT_QUICK, "+iget-object-quick", 0xe5, k22c},
 /* 0xe6 */ {IPUT_QUICK, "+iput-quick", 0xe6, k22c},
 /* 0xe7 */ {IPUT_WIDE_QUICK, "+iput-wide-quick", 0xe7, k22c},
 /* 0xe8 */ {IPUT_OBJECT_QUICK, "+iput-object-quick", 0xe8, k22c},
 /* 0xe9 */ {INVOKE_VIRTUAL_QUICK, "+invoke-virtual-quick", 0xe9, k35mi},
 /* 0xea */ {INVOKE_VIRTUAL_QUICK_RANGE, "+invoke-virtual-quick/range", 0xea, k3rc},
 /* 0xeb */ {IPUT_BOOLEAN_QUICK, "+iput-boolean-quick", 0xeb, k22c},
 /* 0xec */ {IPUT_BYTE_QUICK, "+iput-byte-quick", 0xec, k22c},
 /* 0xed */ {IPUT_CHAR_QUICK, "+iput-char-quick", 0xed, k22c},
 /* 0xee */ {IPUT_SHORT_QUICK, "+iput-short-quick", 0xee, k22c},
 /* 0xef */ {UNUSED_EF, "unused-ef", 0xef, k10x},
 /* 0xf0 */ {UNUSED_F0, "unused-f0", 0xf0, k10x},
 /* 0xf1 */ {UNUSED_F1, "unused-f1", 0xf1, k10x},
 /* 0xf2 */ {UNUSED_F2, "unused-f2", 0xf2, k10x},
 /* 0xf3 */ {UNUSED_F3, "unused-f3", 0xf3, k10x},
 /* 0xf4 */ {UNUSED_F4, "unused-f4", 0xf4, k10x},
 /* 0xf5 */ {UNUSED_F5, "unused-f5", 0xf5, k10x},
 /* 0xf6 */ {UNUSED_F6, "unused-f6", 0xf6, k10x},
 /* 0xf7 */ {UNUSED_F7, "unused-f7", 0xf7, k10x},
 /* 0xf8 */ {UNUSED_F8, "unused-f8", 0xf8, k10x},
 /* 0xf9 */ {UNUSED_F9, "unused-f9", 0xf9, k10x},
 /* 0xfa */ {UNUSED_FA, "unused-fa", 0xfa, k10x},
 /* 0xfb */ {UNUSED_FB, "unused-fb", 0xfb, k10x},
 /* 0xfc */ {UNUSED_FC, "unused-fc", 0xfc, k10x},
 /* 0xfd */ {UNUSED_FD, "unused-fd", 0xfd, k10x},
 /* 0xfe */ {UNUSED_FE, "unused-fe", 0xfe, k10x},
 /* 0xff */ {UNUSED_FF, "unused-ff", 0xff, k10x},
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_complete_and_in_order() {
        assert_eq!(OPCODE_INFO.len(), 256);
        for (i, info) in OPCODE_INFO.iter().enumerate() {
            assert_eq!(info.value as usize, i, "{} out of order", info.name);
            assert_eq!(info.opcode as usize, i, "{} discriminant mismatch", info.name);
        }
    }

    #[test]
    fn test_lookup_by_byte() {
        assert_eq!(Opcode::from_byte(0x12), Opcode::CONST_4);
        assert_eq!(Opcode::CONST_4.format(), Format::k11n);
        assert_eq!(Opcode::CONST_4.name(), "const/4");
        assert_eq!(Opcode::INVOKE_VIRTUAL_QUICK.format(), Format::k35mi);
        assert_eq!(Opcode::FILLED_NEW_ARRAY.format(), Format::k35c);
    }
}
