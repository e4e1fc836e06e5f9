#![no_main]

use dexfuzz::rawdex::Instruction;

extern crate dexfuzz;
extern crate libfuzzer_sys;

libfuzzer_sys::fuzz_target!(|data: &[u8]| {
    if let Ok(insn) = Instruction::read(data, 0) {
        assert!(insn.size_in_bytes() <= data.len());
        assert!(!insn.to_string().is_empty());

        let mut out = Vec::new();
        insn.write(&mut out);
        assert_eq!(out.len(), insn.size_in_bytes());
    }
});
