//! Positional checksum used to name backup copies
//!
//! The fingerprint is a cheap, order-sensitive 32-bit sum. It is not a
//! cryptographic hash; it only has to match the exam-finalization checksum
//! bit for bit, so the seed and the per-byte weights are fixed.

use crate::probe::Probe;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::num::ParseIntError;
use std::path::Path;
use std::str::FromStr;

/// A 32-bit signed fingerprint
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Fingerprint(i32);

impl Fingerprint {
    /// Initial accumulator value, also the fingerprint of zero bytes
    pub const SEED: Fingerprint = Fingerprint(29_366_927);

    /// Wrap a raw value
    pub const fn from_raw(value: i32) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i32>().map(Self)
    }
}

/// Streaming fingerprint accumulator
///
/// Offsets keep counting across `update` calls, so feeding a file in
/// arbitrary chunks gives the same result as feeding it at once.
#[derive(Debug, Clone)]
pub struct FingerprintHasher {
    acc: i32,
    offset: u64,
}

impl FingerprintHasher {
    /// Create a hasher starting from the seed
    pub fn new() -> Self {
        Self {
            acc: Fingerprint::SEED.0,
            offset: 0,
        }
    }

    /// Feed more bytes
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            // Bytes are summed as signed values
            let value = byte as i8 as i32;
            let weight = if self.offset % 2 == 0 { 1 } else { 100 };
            self.acc = self.acc.wrapping_add(value.wrapping_mul(weight));
            self.offset += 1;
        }
    }

    /// Number of bytes consumed so far
    pub fn bytes_seen(&self) -> u64 {
        self.offset
    }

    /// Finish and return the fingerprint
    pub fn finalize(self) -> Fingerprint {
        Fingerprint(self.acc)
    }
}

impl Default for FingerprintHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Fingerprint an in-memory buffer
pub fn fingerprint_bytes(data: &[u8]) -> Fingerprint {
    let mut hasher = FingerprintHasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Fingerprint a file's content
///
/// An unreadable file degrades to the seed (the fingerprint of zero bytes)
/// so a backup can still be named. A read failure halfway through also
/// yields the seed rather than a partial sum.
pub fn fingerprint_file(path: &Path) -> Probe<Fingerprint> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            return Probe::degraded(
                Fingerprint::SEED,
                format!("cannot open {}: {}", path.display(), e),
            )
        }
    };

    let mut reader = BufReader::new(file);
    let mut hasher = FingerprintHasher::new();
    let mut buffer = [0u8; 8192];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Probe::degraded(
                    Fingerprint::SEED,
                    format!("read failed on {} after {} bytes: {}", path.display(), hasher.bytes_seen(), e),
                )
            }
        }
    }

    Probe::Ok(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_seed() {
        assert_eq!(fingerprint_bytes(b""), Fingerprint::SEED);
        assert_eq!(Fingerprint::SEED.value(), 29_366_927);
    }

    #[test]
    fn test_hello_fingerprint() {
        // 104*1 + 101*100 + 108*1 + 108*100 + 111*1 = 21223
        assert_eq!(fingerprint_bytes(b"hello").value(), 29_388_150);
    }

    #[test]
    fn test_position_sensitive() {
        assert_ne!(fingerprint_bytes(b"ab"), fingerprint_bytes(b"ba"));
    }

    #[test]
    fn test_high_bytes_are_signed() {
        // 0xFF is -1 at an even offset, -100 at an odd one
        assert_eq!(fingerprint_bytes(&[0xFF]).value(), 29_366_926);
        assert_eq!(fingerprint_bytes(&[0x00, 0xFF]).value(), 29_366_827);
    }

    #[test]
    fn test_accumulator_wraps() {
        let data = vec![0x7Fu8; 2_000_000];
        let mut expected = Fingerprint::SEED.value();
        for (i, b) in data.iter().enumerate() {
            let w = if i % 2 == 0 { 1 } else { 100 };
            expected = expected.wrapping_add(*b as i32 * w);
        }
        assert_eq!(fingerprint_bytes(&data).value(), expected);
    }

    #[test]
    fn test_chunked_matches_whole() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();

        let mut hasher = FingerprintHasher::new();
        for chunk in data.chunks(777) {
            hasher.update(chunk);
        }

        assert_eq!(hasher.bytes_seen(), 10_000);
        assert_eq!(hasher.finalize(), fingerprint_bytes(&data));
    }

    #[test]
    fn test_fingerprint_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("a.txt");
        std::fs::write(&path, b"hello").unwrap();

        let probe = fingerprint_file(&path);
        assert!(!probe.is_degraded());
        assert_eq!(probe.into_value().value(), 29_388_150);
    }

    #[test]
    fn test_missing_file_degrades_to_seed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let probe = fingerprint_file(&temp_dir.path().join("gone.txt"));

        assert!(probe.is_degraded());
        assert!(probe.reason().unwrap().contains("gone.txt"));
        assert_eq!(*probe.value(), Fingerprint::SEED);
    }

    #[test]
    fn test_display_and_parse() {
        let fp = Fingerprint::from_raw(-42);
        assert_eq!(fp.to_string(), "-42");
        assert_eq!("-42".parse::<Fingerprint>().unwrap(), fp);
        assert!("x1".parse::<Fingerprint>().is_err());
    }
}
