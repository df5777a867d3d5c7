//! Error types for the QPACK header table and instruction codec.
//!
//! Table rejections are recoverable: the caller decides whether the failure
//! is a peer protocol violation. Lookup misses are not errors at all and are
//! reported through `Option` / [`FieldMatch::NoMatch`](crate::FieldMatch).
//! Error codes map to the HTTP/3 codes of RFC 9204 Section 6.

use thiserror::Error;

use crate::instructions::{Language, DECODER_STREAM_LANGUAGE, ENCODER_STREAM_LANGUAGE};

/// Result type for QPACK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP/3 error code `QPACK_DECOMPRESSION_FAILED`.
pub const QPACK_DECOMPRESSION_FAILED: u64 = 0x0200;

/// HTTP/3 error code `QPACK_ENCODER_STREAM_ERROR`.
pub const QPACK_ENCODER_STREAM_ERROR: u64 = 0x0201;

/// HTTP/3 error code `QPACK_DECODER_STREAM_ERROR`.
pub const QPACK_DECODER_STREAM_ERROR: u64 = 0x0202;

/// Errors that can occur during QPACK table and instruction operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An entry can never fit in the dynamic table at its current capacity.
    ///
    /// Fields are the entry size and the capacity, both in bytes.
    #[error("entry size {0} exceeds dynamic table capacity {1}")]
    EntryTooLarge(u64, u64),

    /// A capacity update asked for more than the negotiated maximum.
    #[error("dynamic table capacity {0} exceeds maximum {1}")]
    CapacityExceedsMaximum(u64, u64),

    /// Input ended mid-instruction.
    ///
    /// The count is a lower bound: a truncated integer reports 1 because its
    /// length is unknown until the final byte arrives, while a truncated
    /// string literal reports the exact shortfall.
    #[error("incomplete data: need at least {0} more bytes")]
    Incomplete(usize),

    /// Integer encoding/decoding error.
    #[error("integer encoding error: {0}")]
    IntegerError(String),

    /// Huffman encoding/decoding error.
    #[error("huffman encoding error: {0}")]
    HuffmanError(String),

    /// First byte of an instruction matches no opcode in the language.
    #[error("unknown instruction with leading byte {0:#04x}")]
    UnknownInstruction(u8),
}

impl Error {
    /// Returns the HTTP/3 error code for this error when the stream it came
    /// from is unknown.
    ///
    /// Table rejections always come from encoder stream instructions. For
    /// decoding failures prefer [`error_code_on`](Self::error_code_on).
    pub fn error_code(&self) -> u64 {
        match self {
            Error::EntryTooLarge(..)
            | Error::CapacityExceedsMaximum(..)
            | Error::UnknownInstruction(_) => QPACK_ENCODER_STREAM_ERROR,
            _ => QPACK_DECOMPRESSION_FAILED,
        }
    }

    /// Returns the HTTP/3 error code for this error raised while reading
    /// instructions of `language`.
    ///
    /// Any failure on the encoder stream is `QPACK_ENCODER_STREAM_ERROR` and
    /// any failure on the decoder stream is `QPACK_DECODER_STREAM_ERROR`.
    /// Malformed header blocks are `QPACK_DECOMPRESSION_FAILED`.
    pub fn error_code_on(&self, language: &Language) -> u64 {
        if std::ptr::eq(language, &ENCODER_STREAM_LANGUAGE) {
            QPACK_ENCODER_STREAM_ERROR
        } else if std::ptr::eq(language, &DECODER_STREAM_LANGUAGE) {
            QPACK_DECODER_STREAM_ERROR
        } else {
            QPACK_DECOMPRESSION_FAILED
        }
    }

    /// Returns true if more input may resolve the error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Incomplete(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::EntryTooLarge(101, 100).error_code(), 0x0201);
        assert_eq!(Error::CapacityExceedsMaximum(200, 100).error_code(), 0x0201);
        assert_eq!(Error::UnknownInstruction(0xff).error_code(), 0x0201);
        assert_eq!(Error::HuffmanError("eos".into()).error_code(), 0x0200);
    }

    #[test]
    fn test_error_codes_by_stream() {
        use crate::instructions::{FIELD_LINE_LANGUAGE, PREFIX_LANGUAGE};

        let huffman = Error::HuffmanError("padding".into());
        assert_eq!(huffman.error_code_on(&ENCODER_STREAM_LANGUAGE), 0x0201);
        assert_eq!(huffman.error_code_on(&DECODER_STREAM_LANGUAGE), 0x0202);
        assert_eq!(huffman.error_code_on(&FIELD_LINE_LANGUAGE), 0x0200);
        assert_eq!(huffman.error_code_on(&PREFIX_LANGUAGE), 0x0200);

        let unknown = Error::UnknownInstruction(0xff);
        assert_eq!(unknown.error_code_on(&FIELD_LINE_LANGUAGE), 0x0200);
    }

    #[test]
    fn test_incomplete_error() {
        let err = Error::Incomplete(10);
        assert!(err.is_recoverable());
        assert!(!Error::EntryTooLarge(1, 0).is_recoverable());
        assert_eq!(
            Error::Incomplete(1).to_string(),
            "incomplete data: need at least 1 more bytes"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Error::EntryTooLarge(101, 100).to_string(),
            "entry size 101 exceeds dynamic table capacity 100"
        );
        assert_eq!(
            Error::UnknownInstruction(0x0f).to_string(),
            "unknown instruction with leading byte 0x0f"
        );
    }
}
