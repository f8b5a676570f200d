use std::cmp::Ordering;
use std::fmt;

use tracing::debug;

use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::min_heap::MinHeap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        weight: u64,
        byte: u8,
    },
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn leaf(byte: u8, weight: u64) -> Self {
        HuffNode::Leaf { weight, byte }
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }

    /// `a` becomes the left (0) child, `b` the right (1) child.
    pub fn merge(a: Self, b: Self) -> Self {
        let weight = a.weight() + b.weight();
        HuffNode::Internal {
            weight,
            left: Box::new(a),
            right: Box::new(b),
        }
    }

    fn collect_leaves(&self, table: &mut FrequencyTable) {
        match self {
            HuffNode::Leaf { byte, weight } => {
                table.insert(*byte, *weight);
            }
            HuffNode::Internal { left, right, .. } => {
                left.collect_leaves(table);
                right.collect_leaves(table);
            }
        }
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, depth: usize, label: &str) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            HuffNode::Leaf { byte, weight } => {
                writeln!(f, "{indent}{label}-> Leaf: {byte:#04x} [weight: {weight}]")
            }
            HuffNode::Internal { weight, left, right } => {
                writeln!(f, "{indent}{label}-> Internal [weight: {weight}]")?;
                left.fmt_node(f, depth + 1, "L")?;
                right.fmt_node(f, depth + 1, "R")
            }
        }
    }
}

/// Heap entry: ordered by weight, ties resolved by insertion sequence so
/// the first node pushed at a given weight is the first one popped.
#[derive(Debug)]
struct Ranked {
    seq: u64,
    node: HuffNode,
}

impl Ranked {
    fn key(&self) -> (u64, u64) {
        (self.node.weight(), self.seq)
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    pub root: HuffNode,
}

impl HuffmanTree {
    /// Greedy Huffman construction over `frequencies`.
    ///
    /// Leaves enter the heap in ascending byte order, so the shape depends
    /// only on the table contents and is reproduced exactly by a decoder that
    /// rebuilds the same table from metadata.
    pub fn build(frequencies: &FrequencyTable) -> Result<Self> {
        if frequencies.is_empty() {
            return Err(HuffmanError::EmptyAlphabet);
        }

        let leaves: Vec<Ranked> = frequencies
            .iter()
            .zip(0u64..)
            .map(|((byte, count), seq)| Ranked {
                seq,
                node: HuffNode::leaf(byte, count),
            })
            .collect();
        let mut next_seq = leaves.len() as u64;
        let mut heap = MinHeap::build(leaves);

        while heap.heap_size() > 1 {
            let x = heap.extract_min().map_err(|_| HuffmanError::EmptyAlphabet)?;
            let y = heap.extract_min().map_err(|_| HuffmanError::EmptyAlphabet)?;
            heap.insert(Ranked {
                seq: next_seq,
                node: HuffNode::merge(x.node, y.node),
            });
            next_seq += 1;
        }

        let root = heap
            .extract_min()
            .map_err(|_| HuffmanError::EmptyAlphabet)?
            .node;
        debug!(
            alphabet = frequencies.len(),
            weight = root.weight(),
            "built huffman tree"
        );
        Ok(HuffmanTree { root })
    }

    pub fn weight(&self) -> u64 {
        self.root.weight()
    }

    /// Recovers the leaf frequencies the tree was built from.
    pub fn frequencies(&self) -> FrequencyTable {
        let mut table = FrequencyTable::default();
        self.root.collect_leaves(&mut table);
        table
    }
}

impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Huffman Tree Structure:")?;
        self.root.fmt_node(f, 0, "root")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frequency::SENTINEL;

    fn table(pairs: &[(u8, u64)]) -> FrequencyTable {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = HuffmanTree::build(&FrequencyTable::default()).unwrap_err();
        assert!(matches!(err, HuffmanError::EmptyAlphabet));
    }

    #[test]
    fn test_single_leaf_is_root() {
        let tree = HuffmanTree::build(&table(&[(b'z', 4)])).unwrap();
        assert_eq!(tree.root, HuffNode::leaf(b'z', 4));
    }

    #[test]
    fn test_aabbb_shape() {
        // sentinel(1) + a(2) merge first; the resulting 3 ties with b(3),
        // and b was inserted earlier so it is popped first and goes left.
        let freqs = FrequencyTable::from_bytes(b"aabbb", SENTINEL);
        let tree = HuffmanTree::build(&freqs).unwrap();
        let expected = HuffNode::merge(
            HuffNode::leaf(b'b', 3),
            HuffNode::merge(HuffNode::leaf(SENTINEL, 1), HuffNode::leaf(b'a', 2)),
        );
        assert_eq!(tree.root, expected);
    }

    #[test]
    fn test_equal_weights_follow_byte_order() {
        let tree = HuffmanTree::build(&table(&[(3, 1), (1, 1), (2, 1), (0, 1)])).unwrap();
        let expected = HuffNode::merge(
            HuffNode::merge(HuffNode::leaf(0, 1), HuffNode::leaf(1, 1)),
            HuffNode::merge(HuffNode::leaf(2, 1), HuffNode::leaf(3, 1)),
        );
        assert_eq!(tree.root, expected);
    }

    #[test]
    fn test_null_byte_is_a_real_leaf() {
        let tree = HuffmanTree::build(&table(&[(0, 5), (1, 1)])).unwrap();
        match &tree.root {
            HuffNode::Internal { left, right, .. } => {
                assert_eq!(**left, HuffNode::leaf(1, 1));
                assert_eq!(**right, HuffNode::leaf(0, 5));
            }
            leaf => panic!("expected internal root, got {leaf:?}"),
        }
    }

    #[test]
    fn test_weight_conservation() {
        let freqs = FrequencyTable::from_bytes(b"the quick brown fox jumps over the lazy dog", SENTINEL);
        let tree = HuffmanTree::build(&freqs).unwrap();
        assert_eq!(tree.weight(), freqs.total());
        assert_eq!(tree.frequencies(), freqs);
        assert_eq!(tree.frequencies().total(), tree.weight());
    }

    #[test]
    fn test_build_is_deterministic() {
        let freqs: FrequencyTable = (0..=255u8).map(|b| (b, (b as u64 % 7) + 1)).collect();
        let a = HuffmanTree::build(&freqs).unwrap();
        let b = HuffmanTree::build(&freqs.clone()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_display_lists_every_node() {
        let tree = HuffmanTree::build(&table(&[(b'a', 1), (b'b', 2)])).unwrap();
        let dump = tree.to_string();
        assert!(dump.starts_with("Huffman Tree Structure:"));
        assert!(dump.contains("root-> Internal [weight: 3]"));
        assert!(dump.contains("L-> Leaf: 0x61 [weight: 1]"));
        assert!(dump.contains("R-> Leaf: 0x62 [weight: 2]"));
    }
}
