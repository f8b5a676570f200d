use crate::frequency::SENTINEL;

const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Knobs for one encode or decode run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Byte that always receives one extra count during frequency collection.
    pub sentinel: u8,
    /// Original content length, when the caller knows it out of band.
    ///
    /// With a length the decoder stops after that many bytes, so the zero
    /// padding of the last packed byte never shows up in the output. Without
    /// one, up to seven trailing bytes may be decoded from the pad bits.
    pub expected_len: Option<u64>,
    /// Capacity of the buffered file readers and writers.
    pub buffer_capacity: usize,
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sentinel(mut self, sentinel: u8) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub fn with_expected_len(mut self, len: u64) -> Self {
        self.expected_len = Some(len);
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        // BufReader/BufWriter with zero capacity would hit the OS per byte
        self.buffer_capacity = capacity.max(1);
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            sentinel: SENTINEL,
            expected_len: None,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}
