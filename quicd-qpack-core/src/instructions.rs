//! QPACK instruction languages per RFC 9204.
//!
//! Every instruction is described declaratively: an opcode occupying the high
//! bits of the first byte, followed by an ordered list of fields. The
//! [`InstructionEncoder`](crate::InstructionEncoder) and
//! [`DecodedInstruction::decode`](crate::DecodedInstruction::decode) are
//! generic over these descriptions and never special-case an instruction.
//!
//! Encoder stream instructions (Section 4.3):
//! - Insert With Name Reference      `1Txxxxxx`
//! - Insert Without Name Reference   `01Hxxxxx`
//! - Duplicate                       `000xxxxx`
//! - Set Dynamic Table Capacity      `001xxxxx`
//!
//! Decoder stream instructions (Section 4.4):
//! - Insert Count Increment          `00xxxxxx`
//! - Section Acknowledgement         `1xxxxxxx`
//! - Stream Cancellation             `01xxxxxx`
//!
//! Field section prefix (Section 4.5.1) and field line representations
//! (Sections 4.5.2 - 4.5.6) form two more languages.

/// Fixed bit pattern identifying an instruction.
///
/// A byte `b` starts this instruction iff `b & mask == value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub value: u8,
    pub mask: u8,
}

impl Opcode {
    #[inline]
    pub fn matches(&self, byte: u8) -> bool {
        byte & self.mask == self.value
    }
}

/// One field of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// A single flag bit in the current byte; the parameter is its mask.
    SBit(u8),
    /// Integer with the given prefix length, taken from `varint`.
    Varint(u8),
    /// Integer with the given prefix length, taken from `varint2`.
    Varint2(u8),
    /// Header name: Huffman bit at `1 << prefix`, then a length with the
    /// given prefix length, then the string bytes.
    Name(u8),
    /// Header value, laid out like [`Field::Name`].
    Value(u8),
}

/// An instruction schema: opcode plus ordered fields.
#[derive(Debug, PartialEq, Eq)]
pub struct Instruction {
    pub name: &'static str,
    pub opcode: Opcode,
    pub fields: &'static [Field],
}

/// A set of instructions that may appear on one stream.
#[derive(Debug)]
pub struct Language {
    pub name: &'static str,
    pub instructions: &'static [&'static Instruction],
}

impl Language {
    /// Returns the instruction whose opcode matches the leading byte.
    pub fn find(&self, first_byte: u8) -> Option<&'static Instruction> {
        self.instructions
            .iter()
            .copied()
            .find(|instruction| instruction.opcode.matches(first_byte))
    }
}

// Encoder stream.

pub static INSERT_WITH_NAME_REFERENCE: Instruction = Instruction {
    name: "Insert With Name Reference",
    opcode: Opcode {
        value: 0b1000_0000,
        mask: 0b1000_0000,
    },
    fields: &[Field::SBit(0b0100_0000), Field::Varint(6), Field::Value(7)],
};

pub static INSERT_WITHOUT_NAME_REFERENCE: Instruction = Instruction {
    name: "Insert Without Name Reference",
    opcode: Opcode {
        value: 0b0100_0000,
        mask: 0b1100_0000,
    },
    fields: &[Field::Name(5), Field::Value(7)],
};

pub static DUPLICATE: Instruction = Instruction {
    name: "Duplicate",
    opcode: Opcode {
        value: 0b0000_0000,
        mask: 0b1110_0000,
    },
    fields: &[Field::Varint(5)],
};

pub static SET_DYNAMIC_TABLE_CAPACITY: Instruction = Instruction {
    name: "Set Dynamic Table Capacity",
    opcode: Opcode {
        value: 0b0010_0000,
        mask: 0b1110_0000,
    },
    fields: &[Field::Varint(5)],
};

pub static ENCODER_STREAM_LANGUAGE: Language = Language {
    name: "encoder stream",
    instructions: &[
        &INSERT_WITH_NAME_REFERENCE,
        &INSERT_WITHOUT_NAME_REFERENCE,
        &DUPLICATE,
        &SET_DYNAMIC_TABLE_CAPACITY,
    ],
};

// Decoder stream.

pub static INSERT_COUNT_INCREMENT: Instruction = Instruction {
    name: "Insert Count Increment",
    opcode: Opcode {
        value: 0b0000_0000,
        mask: 0b1100_0000,
    },
    fields: &[Field::Varint(6)],
};

pub static SECTION_ACKNOWLEDGEMENT: Instruction = Instruction {
    name: "Section Acknowledgement",
    opcode: Opcode {
        value: 0b1000_0000,
        mask: 0b1000_0000,
    },
    fields: &[Field::Varint(7)],
};

pub static STREAM_CANCELLATION: Instruction = Instruction {
    name: "Stream Cancellation",
    opcode: Opcode {
        value: 0b0100_0000,
        mask: 0b1100_0000,
    },
    fields: &[Field::Varint(6)],
};

pub static DECODER_STREAM_LANGUAGE: Language = Language {
    name: "decoder stream",
    instructions: &[
        &INSERT_COUNT_INCREMENT,
        &SECTION_ACKNOWLEDGEMENT,
        &STREAM_CANCELLATION,
    ],
};

// Field section prefix: Encoded Required Insert Count, then sign bit and
// Delta Base sharing the second byte.

pub static FIELD_SECTION_PREFIX: Instruction = Instruction {
    name: "Field Section Prefix",
    opcode: Opcode { value: 0, mask: 0 },
    fields: &[Field::Varint(8), Field::SBit(0b1000_0000), Field::Varint2(7)],
};

pub static PREFIX_LANGUAGE: Language = Language {
    name: "field section prefix",
    instructions: &[&FIELD_SECTION_PREFIX],
};

// Field line representations. The N ("never index") bit is always sent as 0.

pub static INDEXED_FIELD_LINE: Instruction = Instruction {
    name: "Indexed Field Line",
    opcode: Opcode {
        value: 0b1000_0000,
        mask: 0b1000_0000,
    },
    fields: &[Field::SBit(0b0100_0000), Field::Varint(6)],
};

pub static INDEXED_FIELD_LINE_POST_BASE: Instruction = Instruction {
    name: "Indexed Field Line With Post-Base Index",
    opcode: Opcode {
        value: 0b0001_0000,
        mask: 0b1111_0000,
    },
    fields: &[Field::Varint(4)],
};

pub static LITERAL_WITH_NAME_REFERENCE: Instruction = Instruction {
    name: "Literal Field Line With Name Reference",
    opcode: Opcode {
        value: 0b0100_0000,
        mask: 0b1100_0000,
    },
    fields: &[Field::SBit(0b0001_0000), Field::Varint(4), Field::Value(7)],
};

pub static LITERAL_WITH_POST_BASE_NAME_REFERENCE: Instruction = Instruction {
    name: "Literal Field Line With Post-Base Name Reference",
    opcode: Opcode {
        value: 0b0000_0000,
        mask: 0b1111_0000,
    },
    fields: &[Field::Varint(3), Field::Value(7)],
};

pub static LITERAL_WITH_LITERAL_NAME: Instruction = Instruction {
    name: "Literal Field Line With Literal Name",
    opcode: Opcode {
        value: 0b0010_0000,
        mask: 0b1110_0000,
    },
    fields: &[Field::Name(3), Field::Value(7)],
};

pub static FIELD_LINE_LANGUAGE: Language = Language {
    name: "field lines",
    instructions: &[
        &INDEXED_FIELD_LINE,
        &INDEXED_FIELD_LINE_POST_BASE,
        &LITERAL_WITH_NAME_REFERENCE,
        &LITERAL_WITH_POST_BASE_NAME_REFERENCE,
        &LITERAL_WITH_LITERAL_NAME,
    ],
};

/// Field values for one instruction.
///
/// Only the values named by the instruction's fields are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstructionValues<'a> {
    pub s_bit: bool,
    pub varint: u64,
    pub varint2: u64,
    pub name: &'a [u8],
    pub value: &'a [u8],
}

/// An instruction schema paired with the values to encode.
#[derive(Debug, Clone, Copy)]
pub struct InstructionWithValues<'a> {
    pub instruction: &'static Instruction,
    pub values: InstructionValues<'a>,
}

impl<'a> InstructionWithValues<'a> {
    pub fn new(instruction: &'static Instruction, values: InstructionValues<'a>) -> Self {
        Self {
            instruction,
            values,
        }
    }

    pub fn insert_with_name_reference(is_static: bool, name_index: u64, value: &'a [u8]) -> Self {
        Self::new(
            &INSERT_WITH_NAME_REFERENCE,
            InstructionValues {
                s_bit: is_static,
                varint: name_index,
                value,
                ..Default::default()
            },
        )
    }

    pub fn insert_without_name_reference(name: &'a [u8], value: &'a [u8]) -> Self {
        Self::new(
            &INSERT_WITHOUT_NAME_REFERENCE,
            InstructionValues {
                name,
                value,
                ..Default::default()
            },
        )
    }

    pub fn duplicate(index: u64) -> Self {
        Self::with_varint(&DUPLICATE, index)
    }

    pub fn set_dynamic_table_capacity(capacity: u64) -> Self {
        Self::with_varint(&SET_DYNAMIC_TABLE_CAPACITY, capacity)
    }

    pub fn insert_count_increment(increment: u64) -> Self {
        Self::with_varint(&INSERT_COUNT_INCREMENT, increment)
    }

    pub fn section_acknowledgement(stream_id: u64) -> Self {
        Self::with_varint(&SECTION_ACKNOWLEDGEMENT, stream_id)
    }

    pub fn stream_cancellation(stream_id: u64) -> Self {
        Self::with_varint(&STREAM_CANCELLATION, stream_id)
    }

    /// Field section prefix. `sign` set means Base = Required Insert Count
    /// minus `delta_base` minus one.
    pub fn field_section_prefix(
        encoded_required_insert_count: u64,
        sign: bool,
        delta_base: u64,
    ) -> Self {
        Self::new(
            &FIELD_SECTION_PREFIX,
            InstructionValues {
                s_bit: sign,
                varint: encoded_required_insert_count,
                varint2: delta_base,
                ..Default::default()
            },
        )
    }

    pub fn indexed_field_line(is_static: bool, index: u64) -> Self {
        Self::new(
            &INDEXED_FIELD_LINE,
            InstructionValues {
                s_bit: is_static,
                varint: index,
                ..Default::default()
            },
        )
    }

    pub fn indexed_field_line_post_base(index: u64) -> Self {
        Self::with_varint(&INDEXED_FIELD_LINE_POST_BASE, index)
    }

    pub fn literal_with_name_reference(is_static: bool, name_index: u64, value: &'a [u8]) -> Self {
        Self::new(
            &LITERAL_WITH_NAME_REFERENCE,
            InstructionValues {
                s_bit: is_static,
                varint: name_index,
                value,
                ..Default::default()
            },
        )
    }

    pub fn literal_with_post_base_name_reference(name_index: u64, value: &'a [u8]) -> Self {
        Self::new(
            &LITERAL_WITH_POST_BASE_NAME_REFERENCE,
            InstructionValues {
                varint: name_index,
                value,
                ..Default::default()
            },
        )
    }

    pub fn literal_with_literal_name(name: &'a [u8], value: &'a [u8]) -> Self {
        Self::new(
            &LITERAL_WITH_LITERAL_NAME,
            InstructionValues {
                name,
                value,
                ..Default::default()
            },
        )
    }

    fn with_varint(instruction: &'static Instruction, varint: u64) -> Self {
        Self::new(
            instruction,
            InstructionValues {
                varint,
                ..Default::default()
            },
        )
    }
}
