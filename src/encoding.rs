//! Byte conversion helpers
//!
//! Single `u32` values are big-endian. Bulk `u32` slices are encoded
//! little-endian into freshly allocated containers; nothing is reinterpreted
//! in place.

use std::time::Duration;

/// Big-endian bytes of `v`.
pub fn u32_to_bytes(v: u32) -> [u8; 4] {
    v.to_be_bytes()
}

/// Big-endian `u32` from the first four bytes of `b`.
///
/// # Panics
///
/// Panics if `b` is shorter than four bytes.
pub fn bytes_to_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

/// Encode a slice of `u32` as consecutive little-endian words.
pub fn u32_slice_to_bytes(values: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Decode consecutive little-endian words. Trailing bytes that do not form a
/// whole word are ignored.
pub fn bytes_to_u32_slice(b: &[u8]) -> Vec<u32> {
    b.chunks_exact(4)
        .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .collect()
}

/// Replace the contents of `dst` with `src`, reusing its allocation.
pub fn safe_copy(dst: &mut Vec<u8>, src: &[u8]) {
    dst.clear();
    dst.extend_from_slice(src);
}

/// Reusable scratch buffer that only reallocates when asked for more
/// bytes than it has ever held.
#[derive(Debug, Default)]
pub struct ResizeBuffer {
    buf: Vec<u8>,
}

impl ResizeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slice of exactly `size` bytes. Contents are whatever the previous
    /// user left behind.
    pub fn resize(&mut self, size: usize) -> &mut [u8] {
        if self.buf.len() < size {
            self.buf = vec![0; size];
        }
        &mut self.buf[..size]
    }

    /// Largest size handed out so far.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }
}

/// Format as `SSs`, `MMmSSs` or `HHhMMmSSs`, zero padded.
pub fn fixed_duration(d: Duration) -> String {
    let total = d.as_secs();
    let mut out = format!("{:02}s", total % 60);
    if total >= 60 {
        out = format!("{:02}m{}", (total / 60) % 60, out);
    }
    if total >= 3600 {
        out = format!("{:02}h{}", total / 3600, out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u32_big_endian() {
        assert_eq!(u32_to_bytes(0x0102_0304), [1, 2, 3, 4]);
        assert_eq!(bytes_to_u32(&[1, 2, 3, 4, 9]), 0x0102_0304);
    }

    #[test]
    #[should_panic]
    fn test_bytes_to_u32_short() {
        bytes_to_u32(&[1, 2, 3]);
    }

    #[test]
    fn test_u32_slice_encoding() {
        let bytes = u32_slice_to_bytes(&[1, 0x0A0B_0C0D]);
        assert_eq!(bytes, vec![1, 0, 0, 0, 0x0D, 0x0C, 0x0B, 0x0A]);
        assert_eq!(bytes_to_u32_slice(&bytes), vec![1, 0x0A0B_0C0D]);
    }

    #[test]
    fn test_u32_slice_empty_and_ragged() {
        assert!(u32_slice_to_bytes(&[]).is_empty());
        assert!(bytes_to_u32_slice(&[]).is_empty());
        assert_eq!(bytes_to_u32_slice(&[2, 0, 0, 0, 7, 7]), vec![2]);
    }

    #[test]
    fn test_safe_copy_reuses_allocation() {
        let mut dst = Vec::with_capacity(64);
        dst.extend_from_slice(b"old contents");
        let ptr = dst.as_ptr();
        safe_copy(&mut dst, b"new");
        assert_eq!(dst, b"new");
        assert_eq!(dst.as_ptr(), ptr);
    }

    #[test]
    fn test_resize_buffer_grows_only() {
        let mut buf = ResizeBuffer::new();
        assert_eq!(buf.resize(8).len(), 8);
        buf.resize(8)[0] = 7;
        assert_eq!(buf.resize(4).len(), 4);
        assert_eq!(buf.resize(4)[0], 7);
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.resize(16).len(), 16);
        assert_eq!(buf.capacity(), 16);
    }

    #[test]
    fn test_fixed_duration() {
        assert_eq!(fixed_duration(Duration::from_secs(5)), "05s");
        assert_eq!(fixed_duration(Duration::from_secs(65)), "01m05s");
        assert_eq!(fixed_duration(Duration::from_secs(3600)), "01h00m00s");
        assert_eq!(fixed_duration(Duration::from_secs(90_061)), "25h01m01s");
        assert_eq!(fixed_duration(Duration::from_millis(999)), "00s");
    }
}
