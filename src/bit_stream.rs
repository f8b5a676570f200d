use std::io::{self, Write};

use crate::code_table::CodeTable;
use crate::error::{HuffmanError, Result};
use crate::hufftree::HuffNode;

/// Packs code bits MSB-first into whole bytes written to `sink`.
pub struct BitPacker<'c, W: Write> {
    codes: &'c CodeTable,
    sink: W,
    buffer: u8,
    held: u8,
    written: u64,
}

impl<'c, W: Write> BitPacker<'c, W> {
    pub fn new(codes: &'c CodeTable, sink: W) -> Self {
        BitPacker {
            codes,
            sink,
            buffer: 0,
            held: 0,
            written: 0,
        }
    }

    pub fn emit(&mut self, byte: u8) -> Result<()> {
        let code = self
            .codes
            .get(byte)
            .ok_or(HuffmanError::UnknownSymbol(byte))?;
        for &bit in code.bits() {
            self.buffer = (self.buffer << 1) | bit as u8;
            self.held += 1;
            if self.held == 8 {
                self.write_buffer()?;
            }
        }
        Ok(())
    }

    pub fn emit_all(&mut self, bytes: &[u8]) -> Result<()> {
        bytes.iter().try_for_each(|&b| self.emit(b))
    }

    /// Flushes a partial byte, zero-padded in its low bits, and hands back the sink.
    pub fn finish(mut self) -> io::Result<(W, u64)> {
        if self.held > 0 {
            self.buffer <<= 8 - self.held;
            self.write_buffer()?;
        }
        Ok((self.sink, self.written))
    }

    fn write_buffer(&mut self) -> io::Result<()> {
        self.sink.write_all(&[self.buffer])?;
        self.buffer = 0;
        self.held = 0;
        self.written += 1;
        Ok(())
    }
}

/// Walks the tree one bit at a time, emitting a byte whenever a leaf is hit.
pub struct BitUnpacker<'t> {
    root: &'t HuffNode,
    current: &'t HuffNode,
    // edges walked since the last emission; zero means nothing pending
    depth: usize,
    emitted: u64,
    limit: Option<u64>,
}

impl<'t> BitUnpacker<'t> {
    pub fn new(root: &'t HuffNode) -> Self {
        BitUnpacker {
            root,
            current: root,
            depth: 0,
            emitted: 0,
            limit: None,
        }
    }

    /// Stops emitting once `limit` bytes have been produced.
    pub fn with_limit(root: &'t HuffNode, limit: u64) -> Self {
        BitUnpacker {
            limit: Some(limit),
            ..Self::new(root)
        }
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn is_saturated(&self) -> bool {
        self.limit.is_some_and(|limit| self.emitted >= limit)
    }

    /// Feeds one packed byte, MSB first.
    ///
    /// A leaf reached by the previous bit is emitted before the next bit is
    /// consumed. In a single-leaf tree the current node is always a leaf, so
    /// every bit yields one copy of that byte.
    pub fn consume<W: Write>(&mut self, mut packed: u8, sink: &mut W) -> io::Result<()> {
        for _ in 0..8 {
            if let HuffNode::Leaf { byte, .. } = *self.current {
                self.emit(byte, sink)?;
                self.current = self.root;
                self.depth = 0;
            }
            let node: &'t HuffNode = self.current;
            if let HuffNode::Internal { left, right, .. } = node {
                self.current = if packed & 0x80 != 0 { &**right } else { &**left };
                self.depth += 1;
            }
            packed <<= 1;
        }
        Ok(())
    }

    /// Emits the leaf reached by the very last bit, if any.
    pub fn finish<W: Write>(&mut self, sink: &mut W) -> io::Result<()> {
        if self.depth > 0 {
            if let HuffNode::Leaf { byte, .. } = *self.current {
                self.emit(byte, sink)?;
            }
        }
        self.current = self.root;
        self.depth = 0;
        Ok(())
    }

    fn emit<W: Write>(&mut self, byte: u8, sink: &mut W) -> io::Result<()> {
        if self.is_saturated() {
            return Ok(());
        }
        sink.write_all(&[byte])?;
        self.emitted += 1;
        Ok(())
    }
}
