//! Checksummed on-disk container for instruction streams.
//!
//! Full DEX table/header serialization is a separate concern; the fuzzing
//! pipeline only needs a file it can hand to backends and re-open with an
//! independent decode. Layout: 8-byte magic, adler32 checksum over
//! everything after the checksum field, payload size, then the stream.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::{error::FuzzError, fuzz_err, rawdex::codec, rawdex::program::Program, Result};

pub const PROGRAM_MAGIC: &[u8] = b"dexz036\0";

const CHECKSUM_OFFSET: usize = 8;
const SIZE_OFFSET: usize = 12;
const HEADER_SIZE: usize = 16;

/// Read-side view of a program file. Checksum verification is optional so
/// that deliberately corrupted artifacts can still be inspected.
pub struct ProgramFile {
    mmap: Mmap,
    location: String,
    verify_checksum: bool,
}

impl ProgramFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<ProgramFile> {
        let file = File::open(path.as_ref())?;
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(ProgramFile {
            mmap,
            location: path.as_ref().display().to_string(),
            verify_checksum: true,
        })
    }

    pub fn verify_checksum(mut self, verify_checksum: bool) -> Self {
        self.verify_checksum = verify_checksum;
        self
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn load(&self) -> Result<Program> {
        let data: &[u8] = &self.mmap;
        if data.len() < HEADER_SIZE {
            return fuzz_err!(TruncatedFile);
        }
        if &data[..CHECKSUM_OFFSET] != PROGRAM_MAGIC {
            return fuzz_err!(BadFileMagic);
        }

        if self.verify_checksum {
            let expected = codec::unsigned_int(data, CHECKSUM_OFFSET) as u32;
            let actual = adler32::adler32(&data[SIZE_OFFSET..])?;
            if actual != expected {
                return fuzz_err!(BadChecksum { actual, expected });
            }
        }

        let size = codec::unsigned_int(data, SIZE_OFFSET) as usize;
        if HEADER_SIZE + size > data.len() {
            return fuzz_err!(FileSizeAtLeast {
                actual: data.len(),
                expected: HEADER_SIZE + size
            });
        }
        Program::decode(&data[HEADER_SIZE..HEADER_SIZE + size])
    }
}

/// Serialize `program` to `path`, recomputing the container checksum.
pub fn save_program<P: AsRef<Path>>(program: &Program, path: P) -> Result<()> {
    let stream = program.encode();
    let mut data = Vec::with_capacity(HEADER_SIZE + stream.len());
    data.extend_from_slice(PROGRAM_MAGIC);
    data.extend_from_slice(&[0u8; 4]); // checksum, patched below
    data.extend_from_slice(&(stream.len() as u32).to_le_bytes());
    data.extend_from_slice(&stream);

    let checksum = adler32::adler32(&data[SIZE_OFFSET..])?;
    codec::write_unsigned_int(&mut data, CHECKSUM_OFFSET, checksum);

    std::fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rawdex::format::Format;
    use crate::rawdex::instruction::Instruction;
    use crate::rawdex::opcode::Opcode;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dexfuzz-container-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_save_load_round_trip() {
        let stream = vec![0x12, 0x01, 0x0e, 0x00];
        let program = Program::decode(&stream).unwrap();
        let path = temp_path("round-trip");
        save_program(&program, &path).unwrap();

        let loaded = ProgramFile::open(&path).unwrap().load().unwrap();
        assert_eq!(loaded.encode(), stream);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_checksum_mismatch_detected() {
        let program = Program::decode(&[0x0e, 0x00]).unwrap();
        let path = temp_path("checksum");
        save_program(&program, &path).unwrap();

        // Corrupt the last byte of the stream.
        let mut data = std::fs::read(&path).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0xFF;
        std::fs::write(&path, data).unwrap();

        assert!(matches!(
            ProgramFile::open(&path).unwrap().load(),
            Err(FuzzError::BadChecksum { .. })
        ));
        // Skipping verification still decodes.
        assert!(ProgramFile::open(&path)
            .unwrap()
            .verify_checksum(false)
            .load()
            .is_ok());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_bad_magic() {
        let path = temp_path("magic");
        std::fs::write(&path, b"not a program file at all").unwrap();
        assert!(matches!(
            ProgramFile::open(&path).unwrap().load(),
            Err(FuzzError::BadFileMagic)
        ));
        std::fs::remove_file(&path).ok();
    }

    // The mutate -> save -> independent reload path must preserve exactly
    // the mutated field.
    #[test]
    fn test_mutate_save_reload() {
        let mut program = Program::decode(&[0x12, 0x10, 0x0e, 0x00]).unwrap();
        {
            let insn = &mut program.insns_mut()[0];
            assert_eq!(insn.opcode, Opcode::CONST_4);
            assert_eq!(insn.vreg_a, 0);
            assert_eq!(insn.vreg_b, 1);
            Format::k11n.const_spec().unwrap().set(insn, -1);
        }
        let path = temp_path("mutate-reload");
        save_program(&program, &path).unwrap();

        let reloaded = ProgramFile::open(&path).unwrap().load().unwrap();
        let insn = &reloaded.insns()[0];
        assert_eq!(insn.vreg_a, 0);
        assert_eq!(insn.vreg_b, -1);
        assert_eq!(reloaded.insns()[1], Instruction::new(Opcode::RETURN_VOID));
        std::fs::remove_file(&path).ok();
    }
}
