//! Determinism fingerprints and ROM digests

use std::fmt;

use sha1::{Digest, Sha1};
use xxhash_rust::xxh3::Xxh3;

/// Work RAM bytes covered by a fingerprint
pub const FINGERPRINT_WINDOW: usize = 128;

/// 128-bit hash of the work RAM window
///
/// Displays as `0x` followed by the high and low halves, each as 16
/// uppercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub high: u64,
    pub low: u64,
}

impl From<u128> for Fingerprint {
    fn from(value: u128) -> Self {
        Self {
            high: (value >> 64) as u64,
            low: value as u64,
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}{:016X}", self.high, self.low)
    }
}

/// Hash work RAM addresses `0..FINGERPRINT_WINDOW`, one byte at a time
pub fn fingerprint(peek: impl Fn(usize) -> u8) -> Fingerprint {
    let mut hasher = Xxh3::new();
    for address in 0..FINGERPRINT_WINDOW {
        hasher.update(&[peek(address)]);
    }
    Fingerprint::from(hasher.digest128())
}

/// Lowercase hex SHA-1 of a ROM image
pub fn rom_sha1(rom: &[u8]) -> String {
    hex::encode(Sha1::digest(rom))
}

/// Compare a computed digest against a declared one, ignoring hex case
pub fn sha1_matches(computed: &str, expected: &str) -> bool {
    computed.eq_ignore_ascii_case(expected.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_display_is_two_padded_halves() {
        let fp = Fingerprint::from((0x1u128 << 64) | 0xAB);
        assert_eq!(fp.to_string(), "0x000000000000000100000000000000AB");
        assert_eq!(fp.to_string().len(), 34);
    }

    #[test]
    fn test_fingerprint_matches_one_shot_hash() {
        let ram: Vec<u8> = (0..FINGERPRINT_WINDOW as u8).collect();
        let streamed = fingerprint(|a| ram[a]);
        let one_shot = Fingerprint::from(xxhash_rust::xxh3::xxh3_128(&ram));
        assert_eq!(streamed, one_shot);
    }

    #[test]
    fn test_fingerprint_only_reads_window() {
        let a = fingerprint(|addr| if addr < FINGERPRINT_WINDOW { 7 } else { 0 });
        let b = fingerprint(|_| 7);
        assert_eq!(a, b);

        let c = fingerprint(|addr| if addr == 127 { 8 } else { 7 });
        assert_ne!(a, c);
    }

    #[test]
    fn test_rom_sha1() {
        assert_eq!(rom_sha1(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert!(sha1_matches(
            "a9993e364706816aba3e25717850c26c9cd0d89d",
            "A9993E364706816ABA3E25717850C26C9CD0D89D"
        ));
        assert!(!sha1_matches("a9993e36", "a9993e37"));
    }
}
