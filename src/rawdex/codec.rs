//! Primitive little-endian byte and bitfield accessors.
//!
//! All readers take a byte buffer plus a byte offset. Out-of-bounds access
//! is a programming error in the caller (the format descriptors drive every
//! read from their declared sizes), so these index directly and panic fast
//! instead of returning a `Result`.

#[inline(always)]
pub fn unsigned_byte(buf: &[u8], at: usize) -> i64 {
    buf[at] as i64
}

#[inline(always)]
pub fn signed_byte(buf: &[u8], at: usize) -> i64 {
    buf[at] as i8 as i64
}

#[inline(always)]
pub fn unsigned_low_nibble(buf: &[u8], at: usize) -> i64 {
    (buf[at] & 0x0F) as i64
}

#[inline(always)]
pub fn unsigned_high_nibble(buf: &[u8], at: usize) -> i64 {
    (buf[at] >> 4) as i64
}

// Arithmetic shift keeps the sign of the top nibble.
#[inline(always)]
pub fn signed_high_nibble(buf: &[u8], at: usize) -> i64 {
    ((buf[at] as i8) >> 4) as i64
}

#[inline(always)]
pub fn unsigned_short(buf: &[u8], at: usize) -> i64 {
    u16::from_le_bytes([buf[at], buf[at + 1]]) as i64
}

#[inline(always)]
pub fn signed_short(buf: &[u8], at: usize) -> i64 {
    i16::from_le_bytes([buf[at], buf[at + 1]]) as i64
}

#[inline(always)]
pub fn unsigned_int(buf: &[u8], at: usize) -> i64 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]) as i64
}

#[inline(always)]
pub fn signed_int(buf: &[u8], at: usize) -> i64 {
    i32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]) as i64
}

#[inline(always)]
pub fn signed_long(buf: &[u8], at: usize) -> i64 {
    i64::from_le_bytes([
        buf[at],
        buf[at + 1],
        buf[at + 2],
        buf[at + 3],
        buf[at + 4],
        buf[at + 5],
        buf[at + 6],
        buf[at + 7],
    ])
}

#[inline(always)]
pub fn write_unsigned_short(buf: &mut [u8], at: usize, value: u16) {
    buf[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

#[inline(always)]
pub fn write_unsigned_int(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

#[inline(always)]
pub fn write_unsigned_long(buf: &mut [u8], at: usize, value: u64) {
    buf[at..at + 8].copy_from_slice(&value.to_le_bytes());
}

#[inline(always)]
pub fn pack_nibbles(low: u8, high: u8) -> u8 {
    (low & 0x0F) | (high << 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibbles() {
        let buf = [0x83u8];
        assert_eq!(unsigned_low_nibble(&buf, 0), 3);
        assert_eq!(unsigned_high_nibble(&buf, 0), 8);
        assert_eq!(signed_high_nibble(&buf, 0), -8);
        assert_eq!(pack_nibbles(3, 0x8), 0x83);
    }

    #[test]
    fn test_bytes() {
        let buf = [0xFFu8, 0x7F];
        assert_eq!(unsigned_byte(&buf, 0), 255);
        assert_eq!(signed_byte(&buf, 0), -1);
        assert_eq!(signed_byte(&buf, 1), 127);
    }

    #[test]
    fn test_shorts_little_endian() {
        let buf = [0x34u8, 0x12, 0x00, 0x80];
        assert_eq!(unsigned_short(&buf, 0), 0x1234);
        assert_eq!(signed_short(&buf, 2), -32768);

        let mut out = [0u8; 2];
        write_unsigned_short(&mut out, 0, 0x1234);
        assert_eq!(out, [0x34, 0x12]);
    }

    #[test]
    fn test_ints_and_longs() {
        let buf = [0x78u8, 0x56, 0x34, 0x12];
        assert_eq!(unsigned_int(&buf, 0), 0x12345678);
        assert_eq!(signed_int(&[0xFF; 4], 0), -1);
        assert_eq!(signed_long(&[0xFF; 8], 0), -1);

        let mut out = [0u8; 8];
        write_unsigned_long(&mut out, 0, 0x1122334455667788);
        assert_eq!(signed_long(&out, 0), 0x1122334455667788);

        let mut out = [0u8; 4];
        write_unsigned_int(&mut out, 0, 0xDEADBEEF);
        assert_eq!(unsigned_int(&out, 0), 0xDEADBEEF);
    }
}
