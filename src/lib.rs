//! # huffpack
//!
//! Static Huffman compression for whole files.
//!
//! An encoded file is a frequency table (see [`metadata`]) followed by the
//! packed code bits. The decoder rebuilds the exact same tree from that table,
//! so no code table is stored.
//!
//! ## Quick Start
//!
//! ```rust
//! use huffpack::{CodecConfig, HuffmanCodec};
//!
//! let codec = HuffmanCodec::default();
//! let encoded = codec.encode_bytes(b"abracadabra")?;
//!
//! // The last packed byte is zero-padded, so plain decoding may append a
//! // few bytes. Supplying the original length removes them.
//! let decoded = HuffmanCodec::new(CodecConfig::default().with_expected_len(11))
//!     .decode_bytes(&encoded)?;
//! assert_eq!(decoded, b"abracadabra");
//! # Ok::<(), huffpack::HuffmanError>(())
//! ```

pub mod bit_stream;
pub mod code_table;
pub mod config;
pub mod error;
pub mod frequency;
pub mod huffman_codec;
pub mod hufftree;
pub mod metadata;

mod min_heap;

pub use bit_stream::{BitPacker, BitUnpacker};
pub use code_table::{Code, CodeTable};
pub use config::CodecConfig;
pub use error::{HuffmanError, Result};
pub use frequency::{FrequencyTable, SENTINEL};
pub use huffman_codec::{Analysis, HuffmanCodec, RunStats};
pub use hufftree::{HuffNode, HuffmanTree};
