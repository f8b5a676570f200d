//! On-disk frequency table.
//!
//! ```text
//! i32 LE   size                number of entries
//! size x { u8 byte, i32 LE count }   ascending byte order
//! ```
//!
//! The packed bitstream follows immediately; there is no delimiter, magic
//! number or length field.

use std::io::{self, Read, Write};

use tracing::debug;

use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;

/// One entry per possible byte value.
pub const MAX_ENTRIES: usize = 256;

const ENTRY_LEN: usize = 1 + 4;

/// Encoded size of the metadata block for `table`.
pub fn metadata_len(table: &FrequencyTable) -> usize {
    4 + table.len() * ENTRY_LEN
}

pub fn write_metadata<W: Write>(table: &FrequencyTable, writer: &mut W) -> Result<usize> {
    let size = i32::try_from(table.len())
        .map_err(|_| HuffmanError::MalformedMetadata(format!("{} entries", table.len())))?;

    let mut block = Vec::with_capacity(metadata_len(table));
    block.extend_from_slice(&size.to_le_bytes());
    for (byte, count) in table.iter() {
        let count = i32::try_from(count).map_err(|_| HuffmanError::FrequencyOverflow { byte, count })?;
        block.push(byte);
        block.extend_from_slice(&count.to_le_bytes());
    }
    writer.write_all(&block)?;

    debug!(entries = table.len(), bytes = block.len(), "wrote metadata");
    Ok(block.len())
}

pub fn read_metadata<R: Read>(reader: &mut R) -> Result<FrequencyTable> {
    let size = read_i32(reader, "entry count")?;
    let size = usize::try_from(size)
        .map_err(|_| HuffmanError::MalformedMetadata(format!("negative entry count {size}")))?;
    if size > MAX_ENTRIES {
        return Err(HuffmanError::MalformedMetadata(format!(
            "entry count {size} exceeds {MAX_ENTRIES}"
        )));
    }

    let mut table = FrequencyTable::default();
    for index in 0..size {
        let mut byte = [0u8; 1];
        read_field(reader, &mut byte, "entry byte")?;
        let byte = byte[0];

        let count = read_i32(reader, "entry count")?;
        let count = u64::try_from(count).map_err(|_| {
            HuffmanError::MalformedMetadata(format!("entry {index}: negative count {count} for byte {byte}"))
        })?;

        if table.insert(byte, count).is_some() {
            return Err(HuffmanError::MalformedMetadata(format!(
                "entry {index}: duplicate byte {byte}"
            )));
        }
    }

    debug!(entries = size, "read metadata");
    Ok(table)
}

fn read_i32<R: Read>(reader: &mut R, what: &str) -> Result<i32> {
    let mut buf = [0u8; 4];
    read_field(reader, &mut buf, what)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_field<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            HuffmanError::MalformedMetadata(format!("truncated while reading {what}"))
        }
        _ => HuffmanError::Io(e),
    })
}
