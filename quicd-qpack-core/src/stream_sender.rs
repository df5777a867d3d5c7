//! Senders for the unidirectional QPACK encoder and decoder streams.
//!
//! Each `send_*` call serializes exactly one instruction and hands the
//! complete bytes to a [`SenderDelegate`] in a single `write`.

use bytes::{BufMut, BytesMut};
use tracing::trace;

use crate::instruction_encoder::InstructionEncoder;
use crate::instructions::InstructionWithValues;

/// Sink for serialized stream instructions, typically the write side of a
/// QUIC stream.
pub trait SenderDelegate {
    fn write(&mut self, data: &[u8]);
}

impl SenderDelegate for Vec<u8> {
    fn write(&mut self, data: &[u8]) {
        self.extend_from_slice(data);
    }
}

impl SenderDelegate for BytesMut {
    fn write(&mut self, data: &[u8]) {
        self.put_slice(data);
    }
}

impl<T: SenderDelegate + ?Sized> SenderDelegate for &mut T {
    fn write(&mut self, data: &[u8]) {
        (**self).write(data);
    }
}

/// Shared plumbing: encode into a scratch buffer, then write it out whole.
#[derive(Debug)]
struct InstructionSender<D> {
    encoder: InstructionEncoder,
    buffer: BytesMut,
    delegate: D,
}

impl<D: SenderDelegate> InstructionSender<D> {
    fn new(encoder: InstructionEncoder, delegate: D) -> Self {
        Self {
            encoder,
            buffer: BytesMut::new(),
            delegate,
        }
    }

    fn send(&mut self, instruction: InstructionWithValues<'_>) {
        self.buffer.clear();
        self.encoder.encode(&instruction, &mut self.buffer);
        trace!(
            instruction = instruction.instruction.name,
            len = self.buffer.len(),
            "sending instruction"
        );
        self.delegate.write(&self.buffer);
    }
}

/// Serializes encoder stream instructions (RFC 9204 Section 4.3).
#[derive(Debug)]
pub struct EncoderStreamSender<D> {
    inner: InstructionSender<D>,
}

impl<D: SenderDelegate> EncoderStreamSender<D> {
    pub fn new(delegate: D) -> Self {
        Self::with_encoder(InstructionEncoder::default(), delegate)
    }

    pub fn with_encoder(encoder: InstructionEncoder, delegate: D) -> Self {
        Self {
            inner: InstructionSender::new(encoder, delegate),
        }
    }

    /// Insert With Name Reference. `name_index` is a static index if
    /// `is_static`, otherwise a relative dynamic index.
    pub fn send_insert_with_name_reference(&mut self, is_static: bool, name_index: u64, value: &[u8]) {
        self.inner.send(InstructionWithValues::insert_with_name_reference(
            is_static, name_index, value,
        ));
    }

    pub fn send_insert_without_name_reference(&mut self, name: &[u8], value: &[u8]) {
        self.inner
            .send(InstructionWithValues::insert_without_name_reference(name, value));
    }

    /// Duplicate of the entry at relative `index`.
    pub fn send_duplicate(&mut self, index: u64) {
        self.inner.send(InstructionWithValues::duplicate(index));
    }

    /// Set Dynamic Table Capacity.
    pub fn send_dynamic_table_size_update(&mut self, max_size: u64) {
        self.inner
            .send(InstructionWithValues::set_dynamic_table_capacity(max_size));
    }

    pub fn delegate(&self) -> &D {
        &self.inner.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.inner.delegate
    }

    pub fn into_delegate(self) -> D {
        self.inner.delegate
    }
}

/// Serializes decoder stream instructions (RFC 9204 Section 4.4).
#[derive(Debug)]
pub struct DecoderStreamSender<D> {
    inner: InstructionSender<D>,
}

impl<D: SenderDelegate> DecoderStreamSender<D> {
    pub fn new(delegate: D) -> Self {
        Self {
            inner: InstructionSender::new(InstructionEncoder::default(), delegate),
        }
    }

    pub fn send_insert_count_increment(&mut self, increment: u64) {
        self.inner
            .send(InstructionWithValues::insert_count_increment(increment));
    }

    pub fn send_header_acknowledgement(&mut self, stream_id: u64) {
        self.inner
            .send(InstructionWithValues::section_acknowledgement(stream_id));
    }

    pub fn send_stream_cancellation(&mut self, stream_id: u64) {
        self.inner
            .send(InstructionWithValues::stream_cancellation(stream_id));
    }

    pub fn delegate(&self) -> &D {
        &self.inner.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.inner.delegate
    }

    pub fn into_delegate(self) -> D {
        self.inner.delegate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every write separately.
    #[derive(Default)]
    struct RecordingDelegate {
        writes: Vec<Vec<u8>>,
    }

    impl SenderDelegate for RecordingDelegate {
        fn write(&mut self, data: &[u8]) {
            self.writes.push(data.to_vec());
        }
    }

    #[test]
    fn test_one_write_per_instruction() {
        let mut sender = EncoderStreamSender::new(RecordingDelegate::default());
        sender.send_insert_with_name_reference(true, 2, b"foo");
        sender.send_duplicate(500);
        sender.send_dynamic_table_size_update(17);

        let writes = sender.into_delegate().writes;
        assert_eq!(
            writes,
            vec![vec![0xc2, 0x82, 0x94, 0xe7], vec![0x1f, 0xd5, 0x03], vec![0x31]]
        );
    }

    #[test]
    fn test_decoder_stream() {
        let mut sender = DecoderStreamSender::new(Vec::new());
        sender.send_header_acknowledgement(4);
        sender.send_insert_count_increment(1);
        sender.send_stream_cancellation(8);
        assert_eq!(sender.delegate().as_slice(), [0x84, 0x01, 0x48]);
    }

    #[test]
    fn test_borrowed_delegate() {
        let mut output = BytesMut::new();
        {
            let mut sender = EncoderStreamSender::new(&mut output);
            sender.send_insert_without_name_reference(b"", b"");
        }
        assert_eq!(&output[..], [0x40, 0x00]);
    }
}
