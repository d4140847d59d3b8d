//! Versioned keys
//!
//! A versioned key is the user key followed by an 8-byte big-endian
//! timestamp stored inverted (`u64::MAX - ts`), so that for the same user
//! key a newer version sorts first under plain byte comparison of the
//! suffix.

use std::cmp::Ordering;

/// Size of the timestamp suffix.
pub const TS_SIZE: usize = 8;

/// Append the inverted timestamp `ts` to `key`.
pub fn key_with_ts(key: &[u8], ts: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(key.len() + TS_SIZE);
    out.extend_from_slice(key);
    out.extend_from_slice(&(u64::MAX - ts).to_be_bytes());
    out
}

/// Timestamp of a versioned key; 0 if the key is too short to carry one.
pub fn parse_ts(key: &[u8]) -> u64 {
    if key.len() <= TS_SIZE {
        return 0;
    }
    let mut suffix = [0u8; TS_SIZE];
    suffix.copy_from_slice(&key[key.len() - TS_SIZE..]);
    u64::MAX - u64::from_be_bytes(suffix)
}

/// User key without the timestamp suffix. An empty input stays empty.
///
/// # Panics
///
/// Panics if a non-empty key is not longer than the suffix.
pub fn parse_key(key: &[u8]) -> &[u8] {
    if key.is_empty() {
        return key;
    }
    assert!(key.len() > TS_SIZE, "versioned key too short: {} bytes", key.len());
    &key[..key.len() - TS_SIZE]
}

/// Order two versioned keys: by user key, then newest version first.
///
/// # Panics
///
/// Panics if either key is not longer than the suffix.
pub fn compare_keys(a: &[u8], b: &[u8]) -> Ordering {
    assert!(
        a.len() > TS_SIZE && b.len() > TS_SIZE,
        "versioned key too short"
    );
    let (a_key, a_ts) = a.split_at(a.len() - TS_SIZE);
    let (b_key, b_ts) = b.split_at(b.len() - TS_SIZE);
    a_key.cmp(b_key).then_with(|| a_ts.cmp(b_ts))
}

/// Whether two versioned keys share a user key, ignoring the version.
pub fn same_key(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    parse_key(a) == parse_key(b)
}
