//! Solidity ABI encoding (`abi.encode`) of a tree of [Token]s.
//!
//! Every value takes up one or more 32 byte slots. Static values (addresses,
//! uints, `bytes32` and tuples/fixed-size arrays made only of static values)
//! are written in place. Dynamic values (`T[]` and anything containing one)
//! leave an offset in the head of the enclosing sequence and are written after
//! all heads of that sequence (the tail). Offsets are relative to the start of
//! the enclosing sequence.

use super::types::{Address, Hash, U256};

const SLOT_SIZE: usize = 32; // bytes

/// Sink for the encoded slots, for example a hasher.
pub trait Writer {
    fn write(&mut self, slot: &[u8]);
}

impl Writer for Vec<u8> {
    fn write(&mut self, slot: &[u8]) {
        self.extend_from_slice(slot);
    }
}

/// A value together with the Solidity type it is encoded as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `address`, right aligned like a uint.
    Address(Address),
    /// `uint256`
    Uint(U256),
    /// `bytes32`
    FixedBytes(Hash),
    /// `T[N]`
    FixedArray(Vec<Token>),
    /// `T[]`
    Array(Vec<Token>),
    /// A struct.
    Tuple(Vec<Token>),
}

impl Token {
    pub fn is_dynamic(&self) -> bool {
        match self {
            Token::Address(_) | Token::Uint(_) | Token::FixedBytes(_) => false,
            Token::Array(_) => true,
            Token::FixedArray(items) | Token::Tuple(items) => items.iter().any(Token::is_dynamic),
        }
    }

    /// Number of bytes this token occupies in the head of its sequence.
    fn head_size(&self) -> usize {
        if self.is_dynamic() {
            SLOT_SIZE
        } else {
            self.encoded_size()
        }
    }

    /// Number of bytes written by [Token::encode], excluding the offset a
    /// dynamic token leaves in its parent's head.
    fn encoded_size(&self) -> usize {
        match self {
            Token::Address(_) | Token::Uint(_) | Token::FixedBytes(_) => SLOT_SIZE,
            Token::Array(items) => SLOT_SIZE + sequence_size(items),
            Token::FixedArray(items) | Token::Tuple(items) => sequence_size(items),
        }
    }

    fn encode<W: Writer>(&self, writer: &mut W) {
        match self {
            Token::Address(addr) => {
                // For some unknown reason abi encoding has addresses right
                // aligned (like uints) instead of left aligned like bytesN.
                let mut slot = [0u8; SLOT_SIZE];
                slot[SLOT_SIZE - 20..].copy_from_slice(&addr.0);
                writer.write(&slot);
            }
            Token::Uint(value) => write_uint(writer, *value),
            Token::FixedBytes(hash) => writer.write(&hash.0),
            Token::Array(items) => {
                write_uint(writer, U256::from(items.len()));
                encode_sequence(items, writer);
            }
            Token::FixedArray(items) | Token::Tuple(items) => encode_sequence(items, writer),
        }
    }
}

fn sequence_size(items: &[Token]) -> usize {
    items
        .iter()
        .map(|item| {
            if item.is_dynamic() {
                SLOT_SIZE + item.encoded_size()
            } else {
                item.encoded_size()
            }
        })
        .sum()
}

fn write_uint<W: Writer>(writer: &mut W, value: U256) {
    let mut slot = [0u8; SLOT_SIZE];
    value.to_big_endian(&mut slot);
    writer.write(&slot);
}

fn encode_sequence<W: Writer>(items: &[Token], writer: &mut W) {
    // Head
    let mut offset: usize = items.iter().map(Token::head_size).sum();
    for item in items {
        if item.is_dynamic() {
            write_uint(writer, U256::from(offset));
            offset += item.encoded_size();
        } else {
            item.encode(writer);
        }
    }

    // Tail
    for item in items.iter().filter(|item| item.is_dynamic()) {
        item.encode(writer);
    }
}

/// Writes `abi.encode(tokens...)`.
///
/// Encoding a single struct is done by passing a single [Token::Tuple], which
/// produces the leading offset slot Solidity emits for dynamic structs.
pub fn to_writer<W: Writer>(tokens: &[Token], writer: &mut W) {
    encode_sequence(tokens, writer);
}
