//! Generic instruction encoder.
//!
//! Serializes one [`InstructionWithValues`] at a time by walking the
//! instruction's field list. Several fields (opcode, static bit, Huffman bit,
//! integer prefix) share the leading byte, which is built up in a
//! [`PendingByte`] and flushed together with the first integer that follows.
//!
//! Encoding is a small state machine:
//!
//! ```text
//! Opcode -> StartField -+-> SBit ----------------------------> StartField
//!                       +-> VarintEncode ---------------------> StartField
//!                       +-> StartString -> VarintEncode -> WriteString -> StartField
//!                       +-> Done (no fields left)
//! ```

use bytes::BufMut;

use crate::config::{HuffmanEncoding, QpackConfig};
use crate::huffman;
use crate::instructions::{Field, Instruction, InstructionValues, InstructionWithValues};
use crate::integer;

/// Encodes instructions of any QPACK language.
///
/// Holds no state between calls: every [`encode`](Self::encode) writes one
/// complete instruction.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstructionEncoder {
    huffman_encoding: HuffmanEncoding,
}

impl InstructionEncoder {
    pub fn new(huffman_encoding: HuffmanEncoding) -> Self {
        Self { huffman_encoding }
    }

    pub fn from_config(config: &QpackConfig) -> Self {
        Self::new(config.huffman)
    }

    pub fn huffman_encoding(&self) -> HuffmanEncoding {
        self.huffman_encoding
    }

    /// Appends the encoded instruction to `output`.
    pub fn encode<B: BufMut>(&self, instruction: &InstructionWithValues<'_>, output: &mut B) {
        let mut encoding = Encoding::new(
            instruction.instruction,
            &instruction.values,
            self.huffman_encoding,
        );
        while encoding.state != State::Done {
            encoding.step(output);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Write the opcode into the pending byte.
    Opcode,
    /// Select the next state from the type of the current field.
    StartField,
    /// OR the static bit into the pending byte.
    SBit,
    /// Encode an integer (varint, varint2 or string length), flushing the
    /// pending byte as its first byte.
    VarintEncode,
    /// Decide on Huffman encoding, set the Huffman bit and the string length.
    StartString,
    /// Write the string bytes.
    WriteString,
    Done,
}

/// The partially filled leading byte.
#[derive(Debug, Default, Clone, Copy)]
struct PendingByte(u8);

impl PendingByte {
    fn set(&mut self, bits: u8) {
        debug_assert_eq!(self.0 & bits, 0, "field bits written twice");
        self.0 |= bits;
    }

    /// Writes `value` with its low `prefix_bits` bits packed into this byte,
    /// then starts a fresh byte.
    fn flush_with_integer<B: BufMut>(&mut self, value: u64, prefix_bits: u8, output: &mut B) {
        integer::encode(value, prefix_bits, self.0, output);
        self.0 = 0;
    }
}

/// String chosen by [`State::StartString`] for the current field.
#[derive(Debug, Default, Clone, Copy)]
struct PendingString<'a> {
    data: &'a [u8],
    use_huffman: bool,
    /// Length on the wire, after Huffman encoding if used.
    length: u64,
}

/// Transient state for encoding a single instruction.
struct Encoding<'v, 'a> {
    instruction: &'static Instruction,
    values: &'v InstructionValues<'a>,
    huffman_encoding: HuffmanEncoding,
    state: State,
    field: usize,
    byte: PendingByte,
    string: PendingString<'a>,
}

impl<'v, 'a> Encoding<'v, 'a> {
    fn new(
        instruction: &'static Instruction,
        values: &'v InstructionValues<'a>,
        huffman_encoding: HuffmanEncoding,
    ) -> Self {
        Self {
            instruction,
            values,
            huffman_encoding,
            state: State::Opcode,
            field: 0,
            byte: PendingByte::default(),
            string: PendingString::default(),
        }
    }

    fn step<B: BufMut>(&mut self, output: &mut B) {
        self.state = match self.state {
            State::Opcode => self.do_opcode(),
            State::StartField => self.do_start_field(),
            State::SBit => self.do_sbit(),
            State::VarintEncode => self.do_varint_encode(output),
            State::StartString => self.do_start_string(),
            State::WriteString => self.do_write_string(output),
            State::Done => State::Done,
        };
    }

    fn current_field(&self) -> Field {
        self.instruction.fields[self.field]
    }

    fn do_opcode(&mut self) -> State {
        self.byte.set(self.instruction.opcode.value);
        State::StartField
    }

    fn do_start_field(&mut self) -> State {
        if self.field == self.instruction.fields.len() {
            debug_assert_eq!(self.byte.0, 0, "unflushed bits at end of instruction");
            return State::Done;
        }

        match self.current_field() {
            Field::SBit(_) => State::SBit,
            Field::Varint(_) | Field::Varint2(_) => State::VarintEncode,
            Field::Name(_) | Field::Value(_) => State::StartString,
        }
    }

    fn do_sbit(&mut self) -> State {
        if let Field::SBit(mask) = self.current_field() {
            if self.values.s_bit {
                self.byte.set(mask);
            }
        }
        self.field += 1;
        State::StartField
    }

    fn do_varint_encode<B: BufMut>(&mut self, output: &mut B) -> State {
        let (value, prefix_bits, next) = match self.current_field() {
            Field::Varint(prefix) => (self.values.varint, prefix, State::StartField),
            Field::Varint2(prefix) => (self.values.varint2, prefix, State::StartField),
            Field::Name(prefix) | Field::Value(prefix) => {
                (self.string.length, prefix, State::WriteString)
            }
            Field::SBit(_) => unreachable!("static bit field in varint state"),
        };

        self.byte.flush_with_integer(value, prefix_bits, output);
        if next == State::StartField {
            self.field += 1;
        }
        next
    }

    fn do_start_string(&mut self) -> State {
        let (data, prefix_bits) = match self.current_field() {
            Field::Name(prefix) => (self.values.name, prefix),
            Field::Value(prefix) => (self.values.value, prefix),
            _ => unreachable!("non-string field in string state"),
        };

        self.string = PendingString {
            data,
            use_huffman: false,
            length: data.len() as u64,
        };

        if self.huffman_encoding == HuffmanEncoding::Enabled {
            let encoded_size = huffman::encoded_size(data);
            if encoded_size < data.len() {
                self.byte.set(1 << prefix_bits);
                self.string.use_huffman = true;
                self.string.length = encoded_size as u64;
            }
        }

        State::VarintEncode
    }

    fn do_write_string<B: BufMut>(&mut self, output: &mut B) -> State {
        if self.string.use_huffman {
            huffman::encode(self.string.data, output);
        } else {
            output.put_slice(self.string.data);
        }
        self.field += 1;
        State::StartField
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::InstructionWithValues as Iwv;

    fn encode(instruction: Iwv<'_>) -> Vec<u8> {
        let mut output = Vec::new();
        InstructionEncoder::default().encode(&instruction, &mut output);
        output
    }

    fn encode_raw(instruction: Iwv<'_>) -> Vec<u8> {
        let mut output = Vec::new();
        InstructionEncoder::new(HuffmanEncoding::Disabled).encode(&instruction, &mut output);
        output
    }

    #[test]
    fn test_insert_with_name_reference() {
        assert_eq!(encode(Iwv::insert_with_name_reference(true, 5, b"")), [0xc5, 0x00]);
        assert_eq!(
            encode(Iwv::insert_with_name_reference(true, 2, b"foo")),
            [0xc2, 0x82, 0x94, 0xe7]
        );
        assert_eq!(
            encode(Iwv::insert_with_name_reference(false, 137, b"bar")),
            [0xbf, 0x4a, 0x03, b'b', b'a', b'r']
        );
    }

    #[test]
    fn test_insert_without_name_reference() {
        assert_eq!(encode(Iwv::insert_without_name_reference(b"", b"")), [0x40, 0x00]);
        assert_eq!(
            encode(Iwv::insert_without_name_reference(b"foo", b"foo")),
            [0x62, 0x94, 0xe7, 0x82, 0x94, 0xe7]
        );
    }

    #[test]
    fn test_long_z_string_is_not_huffman_encoded() {
        let value = vec![b'Z'; 127];
        let output = encode(Iwv::insert_with_name_reference(false, 42, &value));
        assert_eq!(&output[..3], [0xaa, 0x7f, 0x00]);
        assert_eq!(&output[3..], &value[..]);
    }

    #[test]
    fn test_duplicate_and_capacity() {
        assert_eq!(encode(Iwv::duplicate(17)), [0x11]);
        assert_eq!(encode(Iwv::duplicate(500)), [0x1f, 0xd5, 0x03]);
        assert_eq!(encode(Iwv::set_dynamic_table_capacity(17)), [0x31]);
        assert_eq!(encode(Iwv::set_dynamic_table_capacity(500)), [0x3f, 0xd5, 0x03]);
    }

    #[test]
    fn test_huffman_disabled() {
        assert_eq!(
            encode_raw(Iwv::insert_with_name_reference(true, 2, b"foo")),
            [0xc2, 0x03, b'f', b'o', b'o']
        );
    }

    #[test]
    fn test_field_section_prefix_shares_second_byte() {
        assert_eq!(encode(Iwv::field_section_prefix(3, true, 0)), [0x03, 0x80]);
        assert_eq!(encode(Iwv::field_section_prefix(3, true, 1)), [0x03, 0x81]);
        assert_eq!(encode(Iwv::field_section_prefix(0, false, 0)), [0x00, 0x00]);
        assert_eq!(
            encode(Iwv::field_section_prefix(255, false, 127)),
            [0xff, 0x00, 0x7f, 0x00]
        );
    }

    #[test]
    fn test_field_lines() {
        assert_eq!(encode(Iwv::indexed_field_line(true, 17)), [0xd1]);
        assert_eq!(encode(Iwv::indexed_field_line(false, 0)), [0x80]);
        assert_eq!(encode(Iwv::indexed_field_line_post_base(1)), [0x11]);
        assert_eq!(
            encode_raw(Iwv::literal_with_name_reference(true, 1, b"/x")),
            [0x51, 0x02, b'/', b'x']
        );
        assert_eq!(
            encode_raw(Iwv::literal_with_post_base_name_reference(0, b"v")),
            [0x00, 0x01, b'v']
        );
        assert_eq!(
            encode_raw(Iwv::literal_with_literal_name(b"test", b"value")),
            [0x24, b't', b'e', b's', b't', 0x05, b'v', b'a', b'l', b'u', b'e']
        );
    }

    #[test]
    fn test_appends_to_existing_output() {
        let mut output = vec![0xaa];
        let encoder = InstructionEncoder::default();
        encoder.encode(&Iwv::duplicate(1), &mut output);
        encoder.encode(&Iwv::duplicate(2), &mut output);
        assert_eq!(output, [0xaa, 0x01, 0x02]);
    }
}
