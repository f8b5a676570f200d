use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, trace};

use crate::bit_stream::{BitPacker, BitUnpacker};
use crate::code_table::CodeTable;
use crate::config::CodecConfig;
use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::hufftree::HuffmanTree;
use crate::metadata::{metadata_len, read_metadata, write_metadata};

const CHUNK: usize = 8 * 1024;

/// Byte counts for one finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl RunStats {
    /// `bytes_out / bytes_in`, or 0 for an empty input.
    pub fn ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            0.0
        } else {
            self.bytes_out as f64 / self.bytes_in as f64
        }
    }
}

/// Everything an encode run derives before it writes a single bit.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub frequencies: FrequencyTable,
    pub tree: HuffmanTree,
    pub codes: CodeTable,
}

impl Analysis {
    pub fn from_frequencies(frequencies: FrequencyTable) -> Result<Self> {
        let tree = HuffmanTree::build(&frequencies)?;
        let codes = CodeTable::generate(&tree);
        for (byte, code) in codes.iter() {
            trace!(byte, code = %code, "code");
        }
        Ok(Analysis {
            frequencies,
            tree,
            codes,
        })
    }

    /// Length of the packed bitstream, excluding the sentinel's synthetic count.
    pub fn packed_bits(&self, sentinel: u8) -> u64 {
        let counts = self.frequencies.iter().map(|(byte, count)| {
            if byte == sentinel {
                (byte, count.saturating_sub(1))
            } else {
                (byte, count)
            }
        });
        self.codes.encoded_bits(counts)
    }

    /// Size of the file `encode` would write.
    pub fn encoded_len(&self, sentinel: u8) -> u64 {
        metadata_len(&self.frequencies) as u64 + self.packed_bits(sentinel).div_ceil(8)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HuffmanCodec {
    config: CodecConfig,
}

impl HuffmanCodec {
    pub fn new(config: CodecConfig) -> Self {
        HuffmanCodec { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Counts `source`, builds the tree and the code table.
    pub fn analyze<R: Read>(&self, source: &mut R) -> Result<Analysis> {
        let frequencies = FrequencyTable::count(source, self.config.sentinel)?;
        Analysis::from_frequencies(frequencies)
    }

    /// Writes metadata followed by the packed bitstream.
    ///
    /// `source` is read twice: once to count, then again from the position
    /// it had on entry to pack.
    pub fn encode<R, W>(&self, source: &mut R, sink: &mut W) -> Result<RunStats>
    where
        R: Read + Seek,
        W: Write,
    {
        let start = source.stream_position()?;
        let analysis = self.analyze(source)?;
        let meta_len = write_metadata(&analysis.frequencies, sink)?;

        source.seek(SeekFrom::Start(start))?;
        let mut packer = BitPacker::new(&analysis.codes, &mut *sink);
        let mut bytes_in = 0u64;
        for_each_chunk(source, |chunk| {
            bytes_in += chunk.len() as u64;
            packer.emit_all(chunk)?;
            Ok(true)
        })?;
        let (_, packed) = packer.finish()?;
        sink.flush()?;

        let stats = RunStats {
            bytes_in,
            bytes_out: meta_len as u64 + packed,
        };
        debug!(
            bytes_in = stats.bytes_in,
            metadata = meta_len,
            packed,
            "encoded"
        );
        Ok(stats)
    }

    /// Rebuilds the tree from metadata and expands the bitstream.
    ///
    /// Without `expected_len` the output may end with up to seven extra
    /// bytes decoded from the zero padding of the final packed byte.
    pub fn decode<R, W>(&self, source: &mut R, sink: &mut W) -> Result<RunStats>
    where
        R: Read,
        W: Write,
    {
        let frequencies = read_metadata(source)?;
        let tree = HuffmanTree::build(&frequencies)?;
        let mut unpacker = match self.config.expected_len {
            Some(len) => BitUnpacker::with_limit(&tree.root, len),
            None => BitUnpacker::new(&tree.root),
        };

        let mut bytes_in = metadata_len(&frequencies) as u64;
        for_each_chunk(source, |chunk| {
            bytes_in += chunk.len() as u64;
            for &byte in chunk {
                unpacker.consume(byte, sink)?;
                if unpacker.is_saturated() {
                    return Ok(false);
                }
            }
            Ok(true)
        })?;
        unpacker.finish(sink)?;
        sink.flush()?;

        let decoded = unpacker.emitted();
        if let Some(expected) = self.config.expected_len {
            if decoded < expected {
                return Err(HuffmanError::TruncatedStream { expected, decoded });
            }
        }

        debug!(bytes_in, decoded, "decoded");
        Ok(RunStats {
            bytes_in,
            bytes_out: decoded,
        })
    }

    pub fn encode_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode(&mut io::Cursor::new(data), &mut out)?;
        Ok(out)
    }

    pub fn decode_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut source = data;
        self.decode(&mut source, &mut out)?;
        Ok(out)
    }

    pub fn encode_file(&self, input: &Path, output: &Path) -> Result<RunStats> {
        let mut source = self.open_source(input)?;
        let mut sink = self.create_sink(output)?;
        self.encode(&mut source, &mut sink)
    }

    pub fn decode_file(&self, input: &Path, output: &Path) -> Result<RunStats> {
        let mut source = self.open_source(input)?;
        let mut sink = self.create_sink(output)?;
        self.decode(&mut source, &mut sink)
    }

    pub fn analyze_file(&self, input: &Path) -> Result<Analysis> {
        let mut source = self.open_source(input)?;
        self.analyze(&mut source)
    }

    fn open_source(&self, path: &Path) -> Result<BufReader<File>> {
        let file = File::open(path).map_err(|source| HuffmanError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(BufReader::with_capacity(self.config.buffer_capacity, file))
    }

    fn create_sink(&self, path: &Path) -> Result<BufWriter<File>> {
        let file = File::create(path).map_err(|source| HuffmanError::SinkUnwritable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(BufWriter::with_capacity(self.config.buffer_capacity, file))
    }
}

/// Feeds `source` to `f` chunk by chunk until EOF or until `f` returns `false`.
fn for_each_chunk<R, F>(source: &mut R, mut f: F) -> Result<()>
where
    R: Read,
    F: FnMut(&[u8]) -> Result<bool>,
{
    let mut buf = [0u8; CHUNK];
    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        if !f(&buf[..n])? {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use crate::frequency::SENTINEL;

    #[test]
    fn test_encode_aabbb_bytes() {
        let encoded = HuffmanCodec::default().encode_bytes(b"aabbb").unwrap();
        let mut expected = vec![3, 0, 0, 0, 24, 1, 0, 0, 0, b'a', 2, 0, 0, 0, b'b', 3, 0, 0, 0];
        expected.push(0b1111_0000);
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_stats() {
        let codec = HuffmanCodec::default();
        let mut out = Vec::new();
        let stats = codec.encode(&mut Cursor::new(b"aabbb"), &mut out).unwrap();
        assert_eq!(stats, RunStats { bytes_in: 5, bytes_out: 20 });
        assert_eq!(out.len(), 20);

        let mut decoded = Vec::new();
        let stats = codec.decode(&mut out.as_slice(), &mut decoded).unwrap();
        assert_eq!(stats, RunStats { bytes_in: 20, bytes_out: 6 });
    }

    #[test]
    fn test_encode_rewinds_to_entry_position() {
        let mut source = Cursor::new(b"XXaabbb".to_vec());
        source.set_position(2);
        let mut out = Vec::new();
        HuffmanCodec::default().encode(&mut source, &mut out).unwrap();
        assert_eq!(out, HuffmanCodec::default().encode_bytes(b"aabbb").unwrap());
    }

    #[test]
    fn test_decode_with_expected_len() {
        let codec = HuffmanCodec::new(CodecConfig::default().with_expected_len(5));
        let encoded = codec.encode_bytes(b"aabbb").unwrap();
        assert_eq!(codec.decode_bytes(&encoded).unwrap(), b"aabbb");
    }

    #[test]
    fn test_decode_truncated_stream() {
        let encoded = HuffmanCodec::default().encode_bytes(b"aabbb").unwrap();
        let codec = HuffmanCodec::new(CodecConfig::default().with_expected_len(50));
        let err = codec.decode_bytes(&encoded).unwrap_err();
        assert!(matches!(
            err,
            HuffmanError::TruncatedStream { expected: 50, decoded: 6 }
        ));
    }

    #[test]
    fn test_empty_input() {
        let codec = HuffmanCodec::default();
        let encoded = codec.encode_bytes(b"").unwrap();
        // one entry for the sentinel, no packed bytes
        assert_eq!(encoded, vec![1, 0, 0, 0, SENTINEL, 1, 0, 0, 0]);
        assert_eq!(codec.decode_bytes(&encoded).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_empty_alphabet() {
        let err = HuffmanCodec::default()
            .decode_bytes(&0i32.to_le_bytes())
            .unwrap_err();
        assert!(matches!(err, HuffmanError::EmptyAlphabet));
    }

    #[test]
    fn test_analysis_predicts_encoded_len() {
        let data = b"she sells sea shells by the sea shore";
        let codec = HuffmanCodec::default();
        let analysis = codec.analyze(&mut &data[..]).unwrap();
        let encoded = codec.encode_bytes(data).unwrap();
        assert_eq!(analysis.encoded_len(SENTINEL), encoded.len() as u64);
    }

    #[test]
    fn test_missing_source_file() {
        let dir = std::env::temp_dir().join("huffpack-codec-missing");
        let err = HuffmanCodec::default()
            .encode_file(&dir.join("does-not-exist"), &dir.join("out"))
            .unwrap_err();
        assert!(matches!(err, HuffmanError::SourceUnreadable { .. }));
    }

    #[test]
    fn test_ratio() {
        assert_eq!(RunStats::default().ratio(), 0.0);
        assert_eq!(RunStats { bytes_in: 4, bytes_out: 2 }.ratio(), 0.5);
    }
}
