use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HuffmanError {
    #[error("cannot read source {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create sink {}: {source}", path.display())]
    SinkUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),

    #[error("cannot build a Huffman tree from an empty frequency table")]
    EmptyAlphabet,

    #[error("frequency {count} of byte {byte} does not fit the metadata count field")]
    FrequencyOverflow { byte: u8, count: u64 },

    #[error("byte {0} has no code in the code table")]
    UnknownSymbol(u8),

    #[error("stream ended after {decoded} decoded bytes, expected {expected}")]
    TruncatedStream { expected: u64, decoded: u64 },
}

pub type Result<T> = std::result::Result<T, HuffmanError>;
