//! Byte utilities for key ranges.

use bytes::{Bytes, BytesMut};
use std::ops::Bound::{Excluded, Included, Unbounded};
use std::ops::{Bound, RangeBounds};

/// Computes the lexicographic successor of a byte prefix.
///
/// Returns the smallest byte sequence that is strictly greater than every key
/// starting with `data`, or `None` when no such sequence exists (empty input
/// or all `0xFF` bytes).
///
/// - `[0x00]` → `Some([0x01])`
/// - `[0x61, 0xFF]` → `Some([0x62])`
/// - `[0xFF]` → `None`
pub fn lex_increment(data: &[u8]) -> Option<Bytes> {
    let mut result = BytesMut::from(data);

    while let Some(last) = result.last_mut() {
        if *last < 0xFF {
            *last += 1;
            return Some(result.freeze());
        }
        // 0xFF cannot be bumped, carry into the previous byte
        result.truncate(result.len() - 1);
    }

    None
}

/// A range over byte sequences, used for engine scans.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BytesRange {
    pub start: Bound<Bytes>,
    pub end: Bound<Bytes>,
}

impl BytesRange {
    pub fn new(start: Bound<Bytes>, end: Bound<Bytes>) -> Self {
        Self { start, end }
    }

    /// Creates the half-open range `[prefix, lex_increment(prefix))`, i.e.
    /// every key that starts with `prefix`.
    pub fn prefix(prefix: Bytes) -> Self {
        let end = match lex_increment(&prefix) {
            Some(end) => Excluded(end),
            None => Unbounded,
        };
        let start = if prefix.is_empty() {
            Unbounded
        } else {
            Included(prefix)
        };
        Self { start, end }
    }

    /// Creates the range of keys starting with `prefix` that are `>= start`.
    ///
    /// `start` is expected to carry `prefix` itself; it is used verbatim as
    /// the inclusive lower bound.
    pub fn prefix_from(prefix: &[u8], start: Bytes) -> Self {
        let end = match lex_increment(prefix) {
            Some(end) => Excluded(end),
            None => Unbounded,
        };
        Self {
            start: Included(start),
            end,
        }
    }

    /// Creates a range that scans everything.
    pub fn unbounded() -> Self {
        Self {
            start: Unbounded,
            end: Unbounded,
        }
    }

    pub fn contains(&self, k: &[u8]) -> bool {
        (match &self.start {
            Included(s) => k >= s,
            Excluded(s) => k > s,
            Unbounded => true,
        }) && (match &self.end {
            Included(e) => k <= e,
            Excluded(e) => k < e,
            Unbounded => true,
        })
    }
}

impl RangeBounds<Bytes> for BytesRange {
    fn start_bound(&self) -> Bound<&Bytes> {
        self.start.as_ref()
    }
    fn end_bound(&self) -> Bound<&Bytes> {
        self.end.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn should_increment_bound_every_extension_of_prefix(prefix: Vec<u8>, suffix: Vec<u8>) {
            prop_assume!(prefix.iter().any(|&b| b != 0xFF));

            let end = lex_increment(&prefix).unwrap();
            let mut extended = prefix.clone();
            extended.extend(&suffix);

            prop_assert!(extended.as_slice() < end.as_ref());
            prop_assert!(prefix.as_slice() < end.as_ref());
        }

        #[test]
        fn should_prefix_range_contain_only_prefixed_keys(prefix: Vec<u8>, key: Vec<u8>) {
            prop_assume!(!prefix.is_empty());

            let range = BytesRange::prefix(Bytes::from(prefix.clone()));

            prop_assert_eq!(range.contains(&key), key.starts_with(&prefix));
        }
    }

    #[test]
    fn should_increment_single_byte() {
        assert_eq!(lex_increment(&[0x00]).unwrap().as_ref(), &[0x01]);
        assert_eq!(lex_increment(&[0xFE]).unwrap().as_ref(), &[0xFF]);
    }

    #[test]
    fn should_carry_over_trailing_ff() {
        assert_eq!(lex_increment(&[0x61, 0xFF]).unwrap().as_ref(), &[0x62]);
        assert_eq!(
            lex_increment(&[0x00, 0xFF, 0xFF]).unwrap().as_ref(),
            &[0x01]
        );
    }

    #[test]
    fn should_not_increment_empty_or_all_ff() {
        assert!(lex_increment(&[]).is_none());
        assert!(lex_increment(&[0xFF, 0xFF]).is_none());
    }

    #[test]
    fn should_exclude_next_single_byte_key_from_prefix_range() {
        // given
        let range = BytesRange::prefix(Bytes::from_static(&[0x00]));

        // then
        assert!(range.contains(&[0x00]));
        assert!(range.contains(&[0x00, 0xFF, 0xFF]));
        assert!(!range.contains(&[0x01]));
        assert!(!range.contains(&[]));
    }

    #[test]
    fn should_leave_all_ff_prefix_unbounded_above() {
        let range = BytesRange::prefix(Bytes::from_static(&[0xFF]));

        assert_eq!(range.end, Unbounded);
        assert!(range.contains(&[0xFF, 0xFF, 0xFF]));
        assert!(!range.contains(&[0xFE]));
    }

    #[test]
    fn should_treat_empty_prefix_as_unbounded() {
        let range = BytesRange::prefix(Bytes::new());

        assert_eq!(range, BytesRange::unbounded());
        assert!(range.contains(b""));
    }

    #[test]
    fn should_start_prefix_range_at_given_key() {
        // given
        let range = BytesRange::prefix_from(&[0x00], Bytes::from_static(b"\x00b"));

        // then
        assert!(!range.contains(b"\x00a"));
        assert!(range.contains(b"\x00b"));
        assert!(range.contains(b"\x00c"));
        assert!(!range.contains(&[0x01]));
    }
}
