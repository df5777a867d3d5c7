//! Huffman encoding and decoding for QPACK string literals.
//!
//! Implements the static Huffman code defined in RFC 7541 Appendix B, which
//! QPACK reuses unchanged. The instruction encoder only Huffman-codes a string
//! when [`encoded_size`] is strictly smaller than the raw length.

use std::sync::OnceLock;

use bytes::BufMut;

use crate::error::{Error, Result};

/// Huffman code entry: code bits right-aligned in `code`, `len` bits long.
struct HuffmanCode {
    code: u32,
    len: u8,
}

const EOS: u16 = 256;

// Symbols 0-255 plus EOS (256).
static ENCODE_TABLE: [HuffmanCode; 257] = include!("huffman_table.inc");

#[derive(Clone, Copy)]
enum Child {
    Empty,
    Node(u16),
    Symbol(u16),
}

#[derive(Clone, Copy)]
struct Node {
    children: [Child; 2],
}

const EMPTY_NODE: Node = Node {
    children: [Child::Empty; 2],
};

static DECODE_TREE: OnceLock<Vec<Node>> = OnceLock::new();

fn decode_tree() -> &'static [Node] {
    DECODE_TREE.get_or_init(|| {
        let mut tree = vec![EMPTY_NODE];

        for (symbol, entry) in ENCODE_TABLE.iter().enumerate() {
            let mut node = 0usize;
            for shift in (0..entry.len).rev() {
                let bit = ((entry.code >> shift) & 1) as usize;
                if shift == 0 {
                    tree[node].children[bit] = Child::Symbol(symbol as u16);
                    break;
                }
                node = match tree[node].children[bit] {
                    Child::Node(next) => next as usize,
                    _ => {
                        tree.push(EMPTY_NODE);
                        let next = tree.len() - 1;
                        tree[node].children[bit] = Child::Node(next as u16);
                        next
                    }
                };
            }
        }

        tree
    })
}

/// Returns the Huffman-encoded size of `data` in bytes, padding included.
pub fn encoded_size(data: &[u8]) -> usize {
    let bits: usize = data
        .iter()
        .map(|&byte| ENCODE_TABLE[byte as usize].len as usize)
        .sum();
    (bits + 7) / 8
}

/// Huffman-encodes `data` into `buf`.
///
/// The final byte is padded with the most significant bits of EOS (all ones),
/// per RFC 7541 Section 5.2. Writes exactly [`encoded_size`] bytes.
pub fn encode<B: BufMut>(data: &[u8], buf: &mut B) {
    let mut acc: u64 = 0;
    let mut bits: u8 = 0;

    for &byte in data {
        let entry = &ENCODE_TABLE[byte as usize];
        acc = (acc << entry.len) | u64::from(entry.code);
        bits += entry.len;

        while bits >= 8 {
            bits -= 8;
            buf.put_u8((acc >> bits) as u8);
        }
    }

    if bits > 0 {
        let pad = 8 - bits;
        buf.put_u8(((acc << pad) | ((1u64 << pad) - 1)) as u8);
    }
}

/// Decodes Huffman-encoded `data`, appending the symbols to `output`.
///
/// Fails if the data contains EOS, or if the trailing padding is longer than
/// seven bits or is not a prefix of EOS.
pub fn decode(data: &[u8], output: &mut Vec<u8>) -> Result<usize> {
    let tree = decode_tree();
    let initial_len = output.len();

    let mut node = 0usize;
    let mut pending_bits = 0u32;
    let mut pending_all_ones = true;

    for &byte in data {
        for shift in (0..8).rev() {
            let bit = (byte >> shift) & 1;
            pending_bits += 1;
            pending_all_ones &= bit == 1;

            match tree[node].children[bit as usize] {
                Child::Symbol(EOS) => {
                    return Err(Error::HuffmanError("unexpected EOS symbol".into()));
                }
                Child::Symbol(symbol) => {
                    output.push(symbol as u8);
                    node = 0;
                    pending_bits = 0;
                    pending_all_ones = true;
                }
                Child::Node(next) => node = next as usize,
                Child::Empty => {
                    return Err(Error::HuffmanError("invalid huffman code".into()));
                }
            }
        }
    }

    if pending_bits > 7 {
        return Err(Error::HuffmanError("padding longer than 7 bits".into()));
    }
    if !pending_all_ones {
        return Err(Error::HuffmanError("invalid padding".into()));
    }

    Ok(output.len() - initial_len)
}
