use std::collections::BTreeMap;
use std::io::{self, Read};

/// Control byte (CAN) that is always counted once more than it occurs.
pub const SENTINEL: u8 = 24;

const READ_CHUNK: usize = 8 * 1024;

/// Occurrence count per byte value.
///
/// Backed by a `BTreeMap`, so iteration is always in ascending byte order.
/// The tree builder relies on that order to break ties identically on the
/// encode side (live table) and the decode side (table read from metadata).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<u8, u64>,
}

impl FrequencyTable {
    /// Counts every byte of `source`, then bumps `sentinel` by one.
    pub fn count<R: Read>(source: &mut R, sentinel: u8) -> io::Result<Self> {
        let mut histogram = [0u64; 256];
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = match source.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            for &byte in &chunk[..n] {
                histogram[byte as usize] += 1;
            }
        }
        histogram[sentinel as usize] += 1;

        let counts = histogram
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(byte, &count)| (byte as u8, count))
            .collect();

        Ok(FrequencyTable { counts })
    }

    pub fn from_bytes(bytes: &[u8], sentinel: u8) -> Self {
        let mut cursor = bytes;
        // reading from a slice cannot fail
        Self::count(&mut cursor, sentinel).unwrap_or_default()
    }

    pub fn get(&self, byte: u8) -> Option<u64> {
        self.counts.get(&byte).copied()
    }

    /// Number of distinct byte values.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// `(byte, count)` pairs in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts.iter().map(|(&byte, &count)| (byte, count))
    }

    pub(crate) fn insert(&mut self, byte: u8, count: u64) -> Option<u64> {
        self.counts.insert(byte, count)
    }
}

impl FromIterator<(u8, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (u8, u64)>>(iter: I) -> Self {
        FrequencyTable {
            counts: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_counts_and_sentinel() {
        let table = FrequencyTable::from_bytes(b"aabbb", SENTINEL);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(b'a'), Some(2));
        assert_eq!(table.get(b'b'), Some(3));
        assert_eq!(table.get(SENTINEL), Some(1));
        assert_eq!(table.total(), 6);
    }

    #[test]
    fn test_empty_input_still_has_sentinel() {
        let table = FrequencyTable::from_bytes(b"", SENTINEL);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(SENTINEL), Some(1));
    }

    #[test]
    fn test_sentinel_present_in_input_is_incremented() {
        let table = FrequencyTable::from_bytes(&[24, 24, 7], SENTINEL);
        assert_eq!(table.get(SENTINEL), Some(3));
        assert_eq!(table.get(7), Some(1));
    }

    #[test]
    fn test_custom_sentinel() {
        let table = FrequencyTable::from_bytes(b"xy", 0);
        assert_eq!(table.get(0), Some(1));
        assert_eq!(table.get(SENTINEL), None);
    }

    #[test]
    fn test_null_byte_counted() {
        let table = FrequencyTable::from_bytes(&[0, 0, 0], SENTINEL);
        assert_eq!(table.get(0), Some(3));
    }

    #[test]
    fn test_iteration_is_ascending() {
        let table = FrequencyTable::from_bytes(&[255, 3, 128, 3, 0], SENTINEL);
        let keys: Vec<u8> = table.iter().map(|(b, _)| b).collect();
        assert_eq!(keys, vec![0, 3, SENTINEL, 128, 255]);
    }

    #[test]
    fn test_count_propagates_read_errors() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "nope"))
            }
        }
        let err = FrequencyTable::count(&mut Broken, SENTINEL).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_large_input_spans_chunks() {
        let data = vec![b'q'; READ_CHUNK * 3 + 17];
        let table = FrequencyTable::from_bytes(&data, SENTINEL);
        assert_eq!(table.get(b'q'), Some(data.len() as u64));
    }
}
