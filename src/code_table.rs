use std::collections::BTreeMap;
use std::fmt;

use crate::hufftree::{HuffNode, HuffmanTree};

/// Root-to-leaf path, `false` for a left edge and `true` for a right edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Only the root of a single-leaf tree has an empty code.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }

    fn child(&self, bit: bool) -> Code {
        let mut bits = Vec::with_capacity(self.bits.len() + 1);
        bits.extend_from_slice(&self.bits);
        bits.push(bit);
        Code { bits }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl From<&str> for Code {
    /// Parses a `'0'`/`'1'` string; any other character counts as `'1'`.
    fn from(s: &str) -> Self {
        Code {
            bits: s.chars().map(|c| c != '0').collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, Code>,
}

impl CodeTable {
    pub fn generate(tree: &HuffmanTree) -> Self {
        let mut codes = BTreeMap::new();
        walk(&tree.root, Code::default(), &mut codes);
        CodeTable { codes }
    }

    pub fn get(&self, byte: u8) -> Option<&Code> {
        self.codes.get(&byte)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes.iter().map(|(&byte, code)| (byte, code))
    }

    /// Total packed bits for `count` occurrences per byte, as in a frequency table.
    pub fn encoded_bits<I: IntoIterator<Item = (u8, u64)>>(&self, counts: I) -> u64 {
        counts
            .into_iter()
            .filter_map(|(byte, count)| self.get(byte).map(|code| code.len() as u64 * count))
            .sum()
    }
}

fn walk(node: &HuffNode, path: Code, codes: &mut BTreeMap<u8, Code>) {
    match node {
        HuffNode::Leaf { byte, .. } => {
            codes.insert(*byte, path);
        }
        HuffNode::Internal { left, right, .. } => {
            walk(left, path.child(false), codes);
            walk(right, path.child(true), codes);
        }
    }
}
