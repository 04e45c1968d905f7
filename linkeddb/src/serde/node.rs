//! Node record value encoding/decoding.
//!
//! A node record is the value stored under every node key. Older stores
//! threaded a doubly linked list through these records, so the layout keeps
//! the two link slots:
//!
//! ```text
//! | version (u16 BE) |
//! | value_len (u32 BE) | value |
//! | has_next (u8) | next_len (u32 BE) | next |
//! | has_previous (u8) | previous_len (u32 BE) | previous |
//! ```
//!
//! Records are only ever written with empty links. Decoding accepts any
//! link contents and hands back the value alone.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// The only record layout version.
pub(crate) const CODEC_VERSION: u16 = 0;

const VERSION_LEN: usize = 2;
const LEN_PREFIX_LEN: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NodeRecord {
    pub(crate) value: Bytes,
    pub(crate) has_next: bool,
    pub(crate) next: Bytes,
    pub(crate) has_previous: bool,
    pub(crate) previous: Bytes,
}

impl NodeRecord {
    /// Creates a record holding `value` with both links unset.
    pub(crate) fn new(value: Bytes) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a field is longer than `u32::MAX`
    /// bytes.
    pub(crate) fn serialize(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(
            VERSION_LEN
                + 3 * LEN_PREFIX_LEN
                + 2
                + self.value.len()
                + self.next.len()
                + self.previous.len(),
        );
        buf.put_u16(CODEC_VERSION);
        put_bytes(&mut buf, &self.value, "value")?;
        buf.put_u8(self.has_next as u8);
        put_bytes(&mut buf, &self.next, "next")?;
        buf.put_u8(self.has_previous as u8);
        put_bytes(&mut buf, &self.previous, "previous")?;
        Ok(buf.freeze())
    }

    pub(crate) fn deserialize(data: &[u8]) -> Result<Self> {
        if data.len() < VERSION_LEN {
            return Err(Error::CorruptRecord(format!(
                "buffer too short for version: need {} bytes, got {}",
                VERSION_LEN,
                data.len()
            )));
        }
        let version = u16::from_be_bytes([data[0], data[1]]);
        if version != CODEC_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let mut buf = &data[VERSION_LEN..];
        let value = get_bytes(&mut buf, "value")?;
        let has_next = get_bool(&mut buf, "has_next")?;
        let next = get_bytes(&mut buf, "next")?;
        let has_previous = get_bool(&mut buf, "has_previous")?;
        let previous = get_bytes(&mut buf, "previous")?;

        if !buf.is_empty() {
            return Err(Error::CorruptRecord(format!(
                "{} trailing bytes after node record",
                buf.len()
            )));
        }

        Ok(NodeRecord {
            value,
            has_next,
            next,
            has_previous,
            previous,
        })
    }
}

/// Serializes `value` as a node record with empty links.
pub(crate) fn encode_value(value: Bytes) -> Result<Bytes> {
    NodeRecord::new(value).serialize()
}

/// Deserializes a node record and returns its value, ignoring the links.
pub(crate) fn decode_value(data: &[u8]) -> Result<Bytes> {
    NodeRecord::deserialize(data).map(|record| record.value)
}

fn put_bytes(buf: &mut BytesMut, bytes: &[u8], field: &str) -> Result<()> {
    buf.put_u32(length_prefix(bytes.len(), field)?);
    buf.extend_from_slice(bytes);
    Ok(())
}

fn length_prefix(len: usize, field: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        Error::InvalidInput(format!(
            "{} of {} bytes exceeds the maximum of {} bytes",
            field,
            len,
            u32::MAX
        ))
    })
}

fn get_bytes(buf: &mut &[u8], field: &str) -> Result<Bytes> {
    if buf.len() < LEN_PREFIX_LEN {
        return Err(Error::CorruptRecord(format!(
            "buffer too short for {} length: need {} bytes, got {}",
            field,
            LEN_PREFIX_LEN,
            buf.len()
        )));
    }
    let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    *buf = &buf[LEN_PREFIX_LEN..];

    if buf.len() < len {
        return Err(Error::CorruptRecord(format!(
            "buffer too short for {}: need {} bytes, got {}",
            field,
            len,
            buf.len()
        )));
    }
    let bytes = Bytes::copy_from_slice(&buf[..len]);
    *buf = &buf[len..];
    Ok(bytes)
}

fn get_bool(buf: &mut &[u8], field: &str) -> Result<bool> {
    let Some((&byte, rest)) = buf.split_first() else {
        return Err(Error::CorruptRecord(format!(
            "buffer too short for {}",
            field
        )));
    };
    *buf = rest;
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(Error::CorruptRecord(format!(
            "invalid {} flag: 0x{:02x}",
            field, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn should_roundtrip_any_value(value: Vec<u8>) {
            let encoded = encode_value(Bytes::from(value.clone())).unwrap();
            prop_assert_eq!(decode_value(&encoded).unwrap(), Bytes::from(value));
        }
    }

    #[test]
    fn should_encode_empty_value_with_unset_links() {
        // when
        let encoded = encode_value(Bytes::new()).unwrap();

        // then
        assert_eq!(
            encoded.as_ref(),
            &[
                0x00, 0x00, // version
                0x00, 0x00, 0x00, 0x00, // value_len
                0x00, // has_next
                0x00, 0x00, 0x00, 0x00, // next_len
                0x00, // has_previous
                0x00, 0x00, 0x00, 0x00, // previous_len
            ]
        );
        assert_eq!(decode_value(&encoded).unwrap(), Bytes::new());
    }

    #[test]
    fn should_encode_value_length_big_endian() {
        // when
        let encoded = encode_value(Bytes::from("abc")).unwrap();

        // then
        assert_eq!(&encoded[..9], &[0x00, 0x00, 0x00, 0x00, 0x00, 0x03, b'a', b'b', b'c']);
        assert_eq!(encoded.len(), 16 + 3);
    }

    #[test]
    fn should_decode_only_value_from_linked_record() {
        // given
        let legacy = NodeRecord {
            value: Bytes::from("payload"),
            has_next: true,
            next: Bytes::from("next-key"),
            has_previous: true,
            previous: Bytes::from("prev-key"),
        };

        // when
        let value = decode_value(&legacy.serialize().unwrap()).unwrap();

        // then
        assert_eq!(value, Bytes::from("payload"));
    }

    #[test]
    fn should_deserialize_links_as_written() {
        // given
        let record = NodeRecord {
            value: Bytes::from("v"),
            has_next: false,
            next: Bytes::new(),
            has_previous: true,
            previous: Bytes::from("p"),
        };

        // when
        let decoded = NodeRecord::deserialize(&record.serialize().unwrap()).unwrap();

        // then
        assert_eq!(decoded, record);
    }

    #[test]
    fn should_reject_unknown_version() {
        // given
        let mut data = encode_value(Bytes::from("v")).unwrap().to_vec();
        data[1] = 0x07;

        // when
        let result = decode_value(&data);

        // then
        assert_eq!(result, Err(Error::UnsupportedVersion(7)));
    }

    #[test]
    fn should_reject_buffer_shorter_than_version() {
        for data in [&[][..], &[0x00][..]] {
            let result = decode_value(data);
            assert!(matches!(result, Err(Error::CorruptRecord(msg)) if msg.contains("version")));
        }
    }

    #[test]
    fn should_reject_value_length_past_end() {
        // given
        let data = [0x00, 0x00, 0x00, 0x00, 0x00, 0x10, b'a'];

        // when
        let result = decode_value(&data);

        // then
        assert!(matches!(result, Err(Error::CorruptRecord(msg)) if msg.contains("value")));
    }

    #[test]
    fn should_reject_truncated_links() {
        // given
        let encoded = encode_value(Bytes::from("v")).unwrap();

        // when
        let result = decode_value(&encoded[..encoded.len() - 1]);

        // then
        assert!(matches!(result, Err(Error::CorruptRecord(msg)) if msg.contains("previous")));
    }

    #[test]
    fn should_reject_invalid_flag_byte() {
        // given
        let mut data = encode_value(Bytes::from("v")).unwrap().to_vec();
        data[2 + 4 + 1] = 0x02; // has_next

        // when
        let result = decode_value(&data);

        // then
        assert!(matches!(result, Err(Error::CorruptRecord(msg)) if msg.contains("has_next")));
    }

    #[test]
    fn should_reject_trailing_bytes() {
        // given
        let mut data = encode_value(Bytes::from("v")).unwrap().to_vec();
        data.push(0x00);

        // when
        let result = decode_value(&data);

        // then
        assert!(matches!(result, Err(Error::CorruptRecord(msg)) if msg.contains("trailing")));
    }

    #[test]
    fn should_reject_field_longer_than_u32_length_prefix() {
        // given
        let len = u32::MAX as usize + 1;

        // when
        let result = length_prefix(len, "value");

        // then
        assert!(matches!(result, Err(Error::InvalidInput(msg)) if msg.contains("value")));
        assert_eq!(length_prefix(u32::MAX as usize, "value"), Ok(u32::MAX));
    }
}
