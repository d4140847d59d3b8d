//! Chunked, append-only byte buffer
//!
//! The buffer grows in pages and never moves bytes that were already
//! written:
//!
//! - Writes fill the last page, then allocate a new page of twice the
//!   previous page's capacity. Page count stays logarithmic in total size.
//! - Reads always return copies; pages are never handed out mutably.
//! - Every page except the last is full, and the sum of page lengths is the
//!   logical length.
//!
//! # Concurrency
//!
//! The buffer is not internally synchronised. `write` takes `&mut self`, so
//! concurrent writers need an external lock; readers share `&self` once the
//! writer is done or under the same lock.
//!
//! # Usage
//!
//! ```ignore
//! use aerodb_rt::buffer::ChunkedBuffer;
//!
//! let mut buf = ChunkedBuffer::new(4096);
//! buf.write(b"key=value");
//! let copy = buf.read_at(4, None)?;
//! buf.write_all_to(&mut file)?;
//! ```

mod errors;
mod page;
mod reader;

pub use errors::{BufferError, BufferResult, SinkError};
pub use reader::{BufferReader, ReadPosition, ReadStatus};

use std::io::{self, Write};

use crate::config::BufferConfig;
use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry};

use page::Page;

/// Append-only byte buffer backed by pages of doubling capacity.
#[derive(Debug)]
pub struct ChunkedBuffer {
    /// Pages in logical order; never empty.
    pages: Vec<Page>,
    /// Total logical length.
    len: usize,
    /// Capacity of the most recently allocated page.
    page_size: usize,
}

impl ChunkedBuffer {
    /// Create a buffer whose first page holds `page_size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is 0.
    pub fn new(page_size: usize) -> Self {
        assert!(page_size > 0, "ChunkedBuffer page size must be > 0");
        Self {
            pages: vec![Page::with_capacity(page_size)],
            len: 0,
            page_size,
        }
    }

    /// Create a buffer sized from configuration.
    pub fn with_config(config: &BufferConfig) -> Self {
        Self::new(config.initial_page_size)
    }

    /// Append `data`. Always writes every byte and returns `data.len()`.
    pub fn write(&mut self, mut data: &[u8]) -> usize {
        let total = data.len();
        loop {
            let n = self.last_page_mut().fill(data);
            data = &data[n..];
            if data.is_empty() {
                break;
            }
            self.grow();
        }
        self.len += total;
        MetricsRegistry::global().add_bytes_buffered(total as u64);
        total
    }

    /// Append a single byte.
    pub fn write_byte(&mut self, byte: u8) {
        self.write(&[byte]);
    }

    /// Total logical length. O(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Capacity of every page, in order.
    pub fn page_capacities(&self) -> Vec<usize> {
        self.pages.iter().map(Page::capacity).collect()
    }

    /// Used length of every page, in order.
    pub fn page_lengths(&self) -> Vec<usize> {
        self.pages.iter().map(Page::len).collect()
    }

    /// Copy `len` bytes starting at `offset`.
    ///
    /// `None` reads to the end. A length running past the end is clamped to
    /// `self.len() - offset`; a clamped length of zero yields an empty vector.
    pub fn read_at(&self, offset: usize, len: Option<usize>) -> BufferResult<Vec<u8>> {
        if offset > self.len {
            return Err(BufferError::OffsetOutOfRange {
                offset,
                len: self.len,
            });
        }
        let available = self.len - offset;
        let len = len.map_or(available, |l| l.min(available));
        if len == 0 {
            return Ok(Vec::new());
        }

        let start = self.locate(offset);
        let mut out = Vec::with_capacity(len);
        let mut page_offset = start.offset();
        for page in &self.pages[start.page()..] {
            let src = &page.as_slice()[page_offset..];
            let take = src.len().min(len - out.len());
            out.extend_from_slice(&src[..take]);
            if out.len() == len {
                break;
            }
            page_offset = 0;
        }
        Ok(out)
    }

    /// Contiguous copy of the whole logical content.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len);
        for page in &self.pages {
            out.extend_from_slice(page.as_slice());
        }
        out
    }

    /// Sequential reader starting at logical offset 0.
    pub fn reader(&self) -> BufferReader<'_> {
        BufferReader::new(self, ReadPosition::start())
    }

    /// Resume a reader at a position taken from an earlier reader.
    ///
    /// Pages appended since the position was taken are visible. A position
    /// past the end of this buffer (taken from a different, longer buffer)
    /// is clamped to the end.
    pub fn reader_at(&self, position: ReadPosition) -> BufferReader<'_> {
        BufferReader::new(self, self.clamp(position))
    }

    /// Write every page, in order, straight into `sink`.
    pub fn write_all_to<W: Write + ?Sized>(&self, sink: &mut W) -> Result<u64, SinkError> {
        self.reader().write_to(sink)
    }

    pub(crate) fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Find the page holding logical `offset`. The scan stops at the first
    /// page whose range contains it.
    fn locate(&self, offset: usize) -> ReadPosition {
        let mut consumed = 0;
        for (i, page) in self.pages.iter().enumerate() {
            if offset < consumed + page.len() {
                return ReadPosition::new(i, offset - consumed);
            }
            consumed += page.len();
        }
        ReadPosition::new(self.pages.len(), 0)
    }

    fn clamp(&self, position: ReadPosition) -> ReadPosition {
        let in_range = match self.pages.get(position.page()) {
            Some(page) => position.offset() <= page.len(),
            // Just past a full last page.
            None => {
                position.page() == self.pages.len()
                    && position.offset() == 0
                    && self.pages.last().map_or(true, |p| p.is_full())
            }
        };
        if in_range {
            return position;
        }
        match self.pages.len().checked_sub(1) {
            Some(last) => ReadPosition::new(last, self.pages[last].len()),
            None => ReadPosition::start(),
        }
    }

    fn last_page_mut(&mut self) -> &mut Page {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn grow(&mut self) {
        self.page_size = self.page_size.saturating_mul(2);
        self.pages.push(Page::with_capacity(self.page_size));
        MetricsRegistry::global().increment_pages_allocated();

        if Logger::enabled(Event::BufferPageAllocated.severity()) {
            log_event_with_fields(
                Event::BufferPageAllocated,
                &[
                    ("capacity", &self.page_size.to_string()),
                    ("page", &(self.pages.len() - 1).to_string()),
                ],
            );
        }
    }
}

impl Write for ChunkedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(ChunkedBuffer::write(self, buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_empty() {
        let buf = ChunkedBuffer::new(16);
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.page_count(), 1);
        assert!(buf.bytes().is_empty());
    }

    #[test]
    #[should_panic(expected = "page size must be > 0")]
    fn test_zero_page_size_panics() {
        ChunkedBuffer::new(0);
    }

    #[test]
    fn test_doubling_page_layout() {
        let mut buf = ChunkedBuffer::new(4);
        assert_eq!(buf.write(b"abc"), 3);
        assert_eq!(buf.write(b"defgh"), 5);
        assert_eq!(buf.write(b"ijklmnopqr"), 10);

        assert_eq!(buf.len(), 18);
        assert_eq!(buf.page_capacities(), vec![4, 8, 16]);
        assert_eq!(buf.page_lengths(), vec![4, 8, 6]);
        assert_eq!(buf.bytes(), b"abcdefghijklmnopqr");
    }

    #[test]
    fn test_single_write_spans_several_pages() {
        let mut buf = ChunkedBuffer::new(1);
        let data: Vec<u8> = (0..20).collect();
        buf.write(&data);
        assert_eq!(buf.page_capacities(), vec![1, 2, 4, 8, 16]);
        assert_eq!(buf.page_lengths(), vec![1, 2, 4, 8, 5]);
        assert_eq!(buf.bytes(), data);
    }

    #[test]
    fn test_empty_write_allocates_nothing() {
        let mut buf = ChunkedBuffer::new(2);
        buf.write(b"ab");
        assert_eq!(buf.write(&[]), 0);
        assert_eq!(buf.page_count(), 1);
    }

    #[test]
    fn test_write_byte() {
        let mut buf = ChunkedBuffer::new(1);
        for b in b"bytes" {
            buf.write_byte(*b);
        }
        assert_eq!(buf.bytes(), b"bytes");
        assert_eq!(buf.page_capacities(), vec![1, 2, 4]);
    }

    #[test]
    fn test_read_at_within_and_across_pages() {
        let mut buf = ChunkedBuffer::new(4);
        buf.write(b"abc");
        buf.write(b"defgh");
        buf.write(b"ijklmnopqr");

        assert_eq!(buf.read_at(2, Some(10)).unwrap(), b"cdefghijkl");
        assert_eq!(buf.read_at(0, Some(2)).unwrap(), b"ab");
        assert_eq!(buf.read_at(5, Some(3)).unwrap(), b"fgh");
    }

    #[test]
    fn test_read_at_starting_in_middle_page() {
        // Offset lands in page 1 of 3; the lookup must not drift to page 2.
        let mut buf = ChunkedBuffer::new(4);
        buf.write(b"0123456789abcdefgh");
        assert_eq!(buf.read_at(6, Some(4)).unwrap(), b"6789");
        assert_eq!(buf.read_at(11, None).unwrap(), b"bcdefgh");
        assert_eq!(buf.read_at(4, Some(1)).unwrap(), b"4");
        assert_eq!(buf.read_at(12, Some(1)).unwrap(), b"c");
    }

    #[test]
    fn test_read_at_clamps() {
        let mut buf = ChunkedBuffer::new(4);
        buf.write(b"abcdef");
        assert_eq!(buf.read_at(4, Some(100)).unwrap(), b"ef");
        assert_eq!(buf.read_at(1, None).unwrap(), b"bcdef");
        assert!(buf.read_at(6, Some(3)).unwrap().is_empty());
        assert!(buf.read_at(2, Some(0)).unwrap().is_empty());
    }

    #[test]
    fn test_read_at_past_end_is_error() {
        let mut buf = ChunkedBuffer::new(4);
        buf.write(b"abc");
        let err = buf.read_at(4, None).unwrap_err();
        assert_eq!(err, BufferError::OffsetOutOfRange { offset: 4, len: 3 });
    }

    #[test]
    fn test_write_all_to() {
        let mut buf = ChunkedBuffer::new(3);
        buf.write(b"the quick brown fox");
        let mut sink = Vec::new();
        assert_eq!(buf.write_all_to(&mut sink).unwrap(), 19);
        assert_eq!(sink, b"the quick brown fox");
    }

    #[test]
    fn test_io_write_impl() {
        let mut buf = ChunkedBuffer::new(2);
        write!(buf, "{}-{}", 12, "ab").unwrap();
        assert_eq!(buf.bytes(), b"12-ab");
    }

    #[test]
    fn test_with_config() {
        let config = BufferConfig {
            initial_page_size: 8,
        };
        let buf = ChunkedBuffer::with_config(&config);
        assert_eq!(buf.page_capacities(), vec![8]);
    }

    #[test]
    fn test_growth_never_moves_pages() {
        let mut buf = ChunkedBuffer::new(2);
        buf.write(b"abcdef");
        let before: Vec<*const u8> = buf.pages().iter().map(|p| p.as_slice().as_ptr()).collect();

        buf.write(&[7u8; 200]);
        for (i, ptr) in before.iter().enumerate() {
            assert_eq!(buf.pages()[i].as_slice().as_ptr(), *ptr, "page {} moved", i);
        }
        assert_eq!(buf.read_at(0, Some(6)).unwrap(), b"abcdef");
    }

    #[test]
    fn test_reader_at_clamps_foreign_position() {
        let mut long = ChunkedBuffer::new(2);
        long.write(b"abcdef");
        let mut reader = long.reader();
        let mut five = [0u8; 5];
        reader.read_chunk(&mut five);
        let position = reader.position();

        let mut short = ChunkedBuffer::new(2);
        short.write(b"xy");
        let mut reader = short.reader_at(position);
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.logical_offset(), 2);
        assert_eq!(reader.read_chunk(&mut five), ReadStatus::EndOfStream(0));

        let mut partial = ChunkedBuffer::new(4);
        partial.write(b"x");
        let reader = partial.reader_at(position);
        assert_eq!(reader.position(), ReadPosition::new(0, 1));
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_reader_at_keeps_own_positions() {
        let mut buf = ChunkedBuffer::new(2);
        buf.write(b"ab");
        let mut reader = buf.reader();
        let mut two = [0u8; 2];
        reader.read_chunk(&mut two);
        let position = reader.position();
        assert_eq!(position, ReadPosition::new(1, 0));
        assert_eq!(buf.reader_at(position).position(), position);

        buf.write(b"cd");
        let mut resumed = buf.reader_at(position);
        assert_eq!(resumed.read_chunk(&mut two), ReadStatus::Filled(2));
        assert_eq!(&two, b"cd");
    }
}
