//! Frame checksum algorithm
//!
//! A 16-bit running checksum (CRC-16/CCITT-FALSE, polynomial 0x1021,
//! seed 0xFFFF) computed over the tag byte, the two big-endian length
//! bytes and every payload byte, in that order. The same accumulator is
//! used when building outgoing frames and when validating incoming ones;
//! the transmitted value is never trusted without recomputation.

/// Checksum seed
pub const INIT: u16 = 0xFFFF;

/// Create a fresh accumulator
pub fn init() -> u16 {
    INIT
}

/// Fold one byte into the accumulator
///
/// Pure function: returns the updated accumulator, no other effects.
/// Order-sensitive - `add(add(c, a), b) != add(add(c, b), a)` in general.
pub fn add(crc: u16, byte: u8) -> u16 {
    let mut crc = crc ^ ((byte as u16) << 8);
    for _ in 0..8 {
        if crc & 0x8000 != 0 {
            crc = (crc << 1) ^ 0x1021;
        } else {
            crc <<= 1;
        }
    }
    crc
}

/// Checksum over a frame body: `TAG LEN_HI LEN_LO PAYLOAD...`
///
/// # Examples
///
/// ```
/// use magprobe_core::checksum;
///
/// let crc = checksum::over(0xD1, &[0x21]);
/// assert_eq!(crc, 0x5D05);
/// ```
pub fn over(tag: u8, payload: &[u8]) -> u16 {
    let len = payload.len() as u16;
    let mut crc = init();
    crc = add(crc, tag);
    crc = add(crc, (len >> 8) as u8);
    crc = add(crc, (len & 0xFF) as u8);
    for &b in payload {
        crc = add(crc, b);
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_known_answer() {
        // CRC-16/CCITT-FALSE check value for "123456789"
        let mut crc = init();
        for &b in b"123456789" {
            crc = add(crc, b);
        }
        assert_eq!(crc, 0x29B1);
    }

    #[test]
    fn test_over_matches_manual_fold() {
        let payload = [0x01, 0x02, 0x03];
        let mut crc = init();
        crc = add(crc, 0xD1);
        crc = add(crc, 0x00);
        crc = add(crc, 0x03);
        for &b in &payload {
            crc = add(crc, b);
        }
        assert_eq!(over(0xD1, &payload), crc);
    }

    #[test]
    fn test_deterministic() {
        let payload = [0xAB, 0xCD, 0xEF];
        assert_eq!(over(0x73, &payload), over(0x73, &payload));
    }

    #[test]
    fn test_order_sensitive() {
        assert_ne!(over(0xD1, &[0x01, 0x02]), over(0xD1, &[0x02, 0x01]));
    }

    #[test]
    fn test_different_tags() {
        assert_ne!(over(0xD1, &[]), over(0xD2, &[]));
    }

    #[test]
    fn test_length_is_covered() {
        // Same bytes, but a zero payload with the byte in the tag position
        // must not collide with the byte in payload position.
        assert_ne!(over(0x21, &[]), over(0x00, &[0x21]));
    }

    #[test]
    fn test_single_bit_sensitivity() {
        let base = over(0xD1, &[0x21, 0x42]);
        for bit in 0..8 {
            assert_ne!(base, over(0xD1 ^ (1 << bit), &[0x21, 0x42]));
            assert_ne!(base, over(0xD1, &[0x21 ^ (1 << bit), 0x42]));
            assert_ne!(base, over(0xD1, &[0x21, 0x42 ^ (1 << bit)]));
        }
    }
}
