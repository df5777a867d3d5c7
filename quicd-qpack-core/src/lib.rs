//! QPACK core: header table and instruction codec for HTTP/3 (RFC 9204)
//!
//! This crate provides the building blocks a QPACK encoder or decoder is
//! assembled from:
//!
//! - [`HeaderTable`]: the static table plus a bounded dynamic table with
//!   FIFO eviction, absolute indexing, and name / name-value lookup.
//! - [`InstructionEncoder`]: a schema-driven serializer for every QPACK
//!   instruction, with Huffman encoding whenever it saves space.
//! - [`DecodedInstruction::decode`]: the matching parser.
//! - [`EncoderStreamSender`] / [`DecoderStreamSender`]: one-write-per-instruction
//!   senders for the two unidirectional QPACK streams.
//!
//! # Example
//!
//! ```rust
//! use quicd_qpack_core::{EncoderStreamSender, FieldMatch, HeaderTable};
//!
//! let mut table = HeaderTable::new(4096);
//! let mut sender = EncoderStreamSender::new(Vec::new());
//!
//! // `:authority` is static entry 0; insert it with a value.
//! if let FieldMatch::Name { is_static: true, index } =
//!     table.find_header_field(b":authority", b"www.example.com")
//! {
//!     sender.send_insert_with_name_reference(true, index, b"www.example.com");
//!     table.insert_entry(b":authority", b"www.example.com").unwrap();
//! }
//!
//! assert_eq!(
//!     table.find_header_field(b":authority", b"www.example.com"),
//!     FieldMatch::NameAndValue { is_static: false, index: 0 }
//! );
//! assert!(!sender.delegate().is_empty());
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod header_table;
pub mod huffman;
pub mod instruction_decoder;
pub mod instruction_encoder;
pub mod instructions;
pub mod integer;
pub mod static_table;
pub mod stream_sender;

// Re-export main types
pub use config::{HuffmanEncoding, QpackConfig};
pub use entry::Entry;
pub use error::{Error, Result};
pub use header_table::{FieldMatch, HeaderTable};
pub use instruction_decoder::DecodedInstruction;
pub use instruction_encoder::InstructionEncoder;
pub use instructions::{InstructionValues, InstructionWithValues};
pub use static_table::{static_table, StaticTable};
pub use stream_sender::{DecoderStreamSender, EncoderStreamSender, SenderDelegate};
