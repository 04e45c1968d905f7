//! Key encoding for LinkedDb storage.
//!
//! ```text
//! Node key:    | 0x00 | user_key (bytes) |
//! Legacy head: | 0x01 |
//! ```
//!
//! Every node key sorts before the legacy head key, so the namespace is a
//! single contiguous run at the very start of the engine's key space. The
//! head key is never written any more; older stores may still contain it.
//!
//! Values are [`node::NodeRecord`]s.

pub(crate) mod node;

use bytes::{BufMut, Bytes, BytesMut};
use common::BytesRange;

/// Prefix byte of every key stored by LinkedDb.
pub const NODE_KEY_PREFIX: u8 = 0x00;

/// Key under which older stores kept an explicit pointer to the list head.
pub const HEAD_KEY: &[u8] = &[0x01];

const _: () = assert!(NODE_KEY_PREFIX < HEAD_KEY[0]);

/// Encodes a user key by prepending the node prefix.
pub(crate) fn node_key(user_key: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + user_key.len());
    buf.put_u8(NODE_KEY_PREFIX);
    buf.extend_from_slice(user_key);
    buf.freeze()
}

/// Strips the node prefix from a storage key.
///
/// Returns `None` for keys outside the node namespace, including the empty
/// key and the legacy head key.
pub(crate) fn decode_node_key(storage_key: &Bytes) -> Option<Bytes> {
    match storage_key.first() {
        Some(&NODE_KEY_PREFIX) => Some(storage_key.slice(1..)),
        _ => None,
    }
}

/// The storage range holding every node: `[0x00, 0x01)`.
pub(crate) fn node_key_range() -> BytesRange {
    BytesRange::prefix(Bytes::from_static(&[NODE_KEY_PREFIX]))
}

/// The storage range holding every node whose user key is `>= start`.
pub(crate) fn node_key_range_from(start: &[u8]) -> BytesRange {
    BytesRange::prefix_from(&[NODE_KEY_PREFIX], node_key(start))
}

#[cfg(test)]
mod tests {
    use std::ops::Bound;

    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn should_preserve_user_key_order(a: Vec<u8>, b: Vec<u8>) {
            prop_assert_eq!(a.cmp(&b), node_key(&a).as_ref().cmp(node_key(&b).as_ref()));
        }

        #[test]
        fn should_sort_every_node_key_before_head_key(key: Vec<u8>) {
            prop_assert!(node_key(&key).as_ref() < HEAD_KEY);
        }

        #[test]
        fn should_strip_exactly_the_prefix(key: Vec<u8>) {
            let decoded = decode_node_key(&node_key(&key));
            prop_assert_eq!(decoded, Some(Bytes::from(key)));
        }
    }

    #[test]
    fn should_encode_key_with_prefix() {
        // when
        let encoded = node_key(b"my-key");

        // then
        assert_eq!(encoded.len(), 7);
        assert_eq!(encoded[0], NODE_KEY_PREFIX);
        assert_eq!(&encoded[1..], b"my-key");
    }

    #[test]
    fn should_encode_empty_key_as_bare_prefix() {
        assert_eq!(node_key(b"").as_ref(), &[NODE_KEY_PREFIX]);
    }

    #[test]
    fn should_not_decode_keys_outside_namespace() {
        assert_eq!(decode_node_key(&Bytes::new()), None);
        assert_eq!(decode_node_key(&Bytes::from_static(HEAD_KEY)), None);
        assert_eq!(decode_node_key(&Bytes::from_static(b"\x02abc")), None);
    }

    #[test]
    fn should_bound_node_range_by_head_key() {
        // when
        let range = node_key_range();

        // then
        assert_eq!(range.start, Bound::Included(Bytes::from_static(&[0x00])));
        assert_eq!(range.end, Bound::Excluded(Bytes::from_static(HEAD_KEY)));
    }

    #[test]
    fn should_start_node_range_at_encoded_key() {
        // when
        let range = node_key_range_from(b"b");

        // then
        assert_eq!(range.start, Bound::Included(node_key(b"b")));
        assert!(!range.contains(&node_key(b"a")));
        assert!(range.contains(&node_key(b"b")));
        assert!(range.contains(&node_key(b"b\xff\xff")));
        assert!(!range.contains(HEAD_KEY));
    }
}
