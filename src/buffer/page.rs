//! Fixed-capacity page backing a chunked buffer

/// An owned byte region holding a prefix of logical data.
///
/// Capacity is fixed at creation; the page never reallocates.
#[derive(Debug)]
pub(crate) struct Page {
    buf: Vec<u8>,
    capacity: usize,
}

impl Page {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.buf.len() == self.capacity
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Copy as much of `data` as fits; returns the number of bytes taken.
    pub(crate) fn fill(&mut self, data: &[u8]) -> usize {
        let n = data.len().min(self.capacity - self.buf.len());
        self.buf.extend_from_slice(&data[..n]);
        n
    }
}
