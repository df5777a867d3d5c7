//! Generic instruction decoder, the inverse of
//! [`InstructionEncoder`](crate::InstructionEncoder).

use bytes::Bytes;
use tracing::trace;

use crate::error::{Error, Result};
use crate::huffman;
use crate::instructions::{Field, Instruction, InstructionValues, InstructionWithValues, Language};
use crate::integer;

/// An instruction read from the wire, with owned string fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction {
    pub instruction: &'static Instruction,
    pub s_bit: bool,
    pub varint: u64,
    pub varint2: u64,
    pub name: Bytes,
    pub value: Bytes,
}

impl DecodedInstruction {
    /// Decodes one instruction of `language` from the start of `data`.
    ///
    /// Returns the instruction and the number of bytes it occupied. Fails with
    /// [`Error::Incomplete`] if `data` ends mid-instruction, in which case the
    /// caller should retry once more bytes have arrived.
    pub fn decode(language: &Language, data: &[u8]) -> Result<(Self, usize)> {
        let first = *data.first().ok_or(Error::Incomplete(1))?;
        let instruction = language
            .find(first)
            .ok_or(Error::UnknownInstruction(first))?;

        let mut decoded = DecodedInstruction {
            instruction,
            s_bit: false,
            varint: 0,
            varint2: 0,
            name: Bytes::new(),
            value: Bytes::new(),
        };

        let mut pos = 0;
        for field in instruction.fields {
            match *field {
                Field::SBit(mask) => {
                    let byte = *data.get(pos).ok_or(Error::Incomplete(1))?;
                    decoded.s_bit = byte & mask != 0;
                }
                Field::Varint(prefix_bits) => {
                    let (value, consumed) = integer::decode(prefix_bits, &data[pos..])?;
                    decoded.varint = value;
                    pos += consumed;
                }
                Field::Varint2(prefix_bits) => {
                    let (value, consumed) = integer::decode(prefix_bits, &data[pos..])?;
                    decoded.varint2 = value;
                    pos += consumed;
                }
                Field::Name(prefix_bits) => {
                    let (name, consumed) = decode_string(prefix_bits, &data[pos..])?;
                    decoded.name = name;
                    pos += consumed;
                }
                Field::Value(prefix_bits) => {
                    let (value, consumed) = decode_string(prefix_bits, &data[pos..])?;
                    decoded.value = value;
                    pos += consumed;
                }
            }
        }

        trace!(
            language = language.name,
            instruction = instruction.name,
            len = pos,
            "decoded instruction"
        );
        Ok((decoded, pos))
    }

    /// Borrowed view of the decoded values.
    pub fn values(&self) -> InstructionValues<'_> {
        InstructionValues {
            s_bit: self.s_bit,
            varint: self.varint,
            varint2: self.varint2,
            name: &self.name,
            value: &self.value,
        }
    }

    /// Re-pairs the instruction with its values, ready for re-encoding.
    pub fn as_instruction_with_values(&self) -> InstructionWithValues<'_> {
        InstructionWithValues::new(self.instruction, self.values())
    }
}

/// Decodes a string literal whose Huffman flag sits just above a
/// `prefix_bits` length prefix.
fn decode_string(prefix_bits: u8, data: &[u8]) -> Result<(Bytes, usize)> {
    let first = *data.first().ok_or(Error::Incomplete(1))?;
    let huffman = first & (1 << prefix_bits) != 0;
    let (len, consumed) = integer::decode(prefix_bits, data)?;
    let len = usize::try_from(len)
        .map_err(|_| Error::IntegerError("string length exceeds address space".into()))?;

    let end = consumed
        .checked_add(len)
        .ok_or_else(|| Error::IntegerError("string length exceeds address space".into()))?;
    if end > data.len() {
        return Err(Error::Incomplete(end - data.len()));
    }

    let string_data = &data[consumed..end];
    let result = if huffman {
        let mut decoded = Vec::with_capacity(len * 8 / 5);
        huffman::decode(string_data, &mut decoded)?;
        Bytes::from(decoded)
    } else {
        Bytes::copy_from_slice(string_data)
    };

    Ok((result, end))
}
