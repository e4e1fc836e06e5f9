#![no_main]

use dexfuzz::rawdex::Program;

extern crate dexfuzz;
extern crate libfuzzer_sys;

libfuzzer_sys::fuzz_target!(|data: &[u8]| {
    // Re-encoding normalizes unused padding bits, so compare decoded models
    // rather than raw bytes.
    if let Ok(program) = Program::decode(data) {
        let bytes = program.encode();
        let again = Program::decode(&bytes).expect("re-decode of encoded stream");
        assert_eq!(again.insns(), program.insns());
    }
});
