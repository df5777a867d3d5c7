//! Encoder and decoder stream sender wire format tests.

use quicd_qpack_core::{DecoderStreamSender, EncoderStreamSender, SenderDelegate};

/// Keeps each write separate so tests can check instruction boundaries.
#[derive(Default)]
struct Writes(Vec<Vec<u8>>);

impl SenderDelegate for Writes {
    fn write(&mut self, data: &[u8]) {
        self.0.push(data.to_vec());
    }
}

fn hex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

fn z(n: usize) -> Vec<u8> {
    vec![b'Z'; n]
}

#[test]
fn test_insert_with_name_reference() {
    let mut sender = EncoderStreamSender::new(Writes::default());

    // Static, index fits in prefix, empty value.
    sender.send_insert_with_name_reference(true, 5, b"");
    // Static, Huffman-encoded value.
    sender.send_insert_with_name_reference(true, 2, b"foo");
    // Dynamic, index overflows the prefix, raw value.
    sender.send_insert_with_name_reference(false, 137, b"bar");
    // 'Z' costs 8 bits in Huffman, so the value stays raw.
    sender.send_insert_with_name_reference(false, 42, &z(127));

    let mut long = hex("aa7f00");
    long.extend(z(127));

    let writes = sender.into_delegate().0;
    assert_eq!(writes.len(), 4);
    assert_eq!(writes[0], hex("c500"));
    assert_eq!(writes[1], hex("c28294e7"));
    assert_eq!(writes[2], hex("bf4a03626172"));
    assert_eq!(writes[3], long);
}

#[test]
fn test_insert_without_name_reference() {
    let mut sender = EncoderStreamSender::new(Writes::default());

    sender.send_insert_without_name_reference(b"", b"");
    sender.send_insert_without_name_reference(b"bar", b"bar");
    sender.send_insert_without_name_reference(b"foo", b"foo");
    sender.send_insert_without_name_reference(&z(31), &z(127));

    let mut long = hex("5f00");
    long.extend(z(31));
    long.extend(hex("7f00"));
    long.extend(z(127));

    let writes = sender.into_delegate().0;
    assert_eq!(writes[0], hex("4000"));
    assert_eq!(writes[1], hex("4362617203626172"));
    assert_eq!(writes[2], hex("6294e78294e7"));
    assert_eq!(writes[3], long);
}

#[test]
fn test_duplicate() {
    let mut sender = EncoderStreamSender::new(Writes::default());
    sender.send_duplicate(17);
    sender.send_duplicate(500);

    assert_eq!(sender.delegate().0, vec![hex("11"), hex("1fd503")]);
}

#[test]
fn test_dynamic_table_size_update() {
    let mut sender = EncoderStreamSender::new(Writes::default());
    sender.send_dynamic_table_size_update(17);
    sender.send_dynamic_table_size_update(500);

    assert_eq!(sender.delegate().0, vec![hex("31"), hex("3fd503")]);
}

#[test]
fn test_decoder_stream_instructions() {
    let mut sender = DecoderStreamSender::new(Writes::default());
    sender.send_insert_count_increment(1);
    sender.send_header_acknowledgement(4);
    sender.send_stream_cancellation(8);
    sender.send_header_acknowledgement(500);

    let writes = sender.into_delegate().0;
    assert_eq!(writes, vec![hex("01"), hex("84"), hex("48"), hex("fff502")]);
}
