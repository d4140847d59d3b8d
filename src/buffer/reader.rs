//! Sequential cursor over a chunked buffer

use std::io::{self, Read, Write};

use super::errors::SinkError;
use super::ChunkedBuffer;
use crate::observability::{log_event_with_fields, Event};

/// Position of a cursor: page index plus offset inside that page.
///
/// Detached from any borrow, so it can be kept while the buffer grows and
/// handed back to [`ChunkedBuffer::reader_at`] to resume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadPosition {
    page: usize,
    offset: usize,
}

impl ReadPosition {
    /// Position of the first byte
    pub fn start() -> Self {
        Self::default()
    }

    pub(crate) fn new(page: usize, offset: usize) -> Self {
        Self { page, offset }
    }

    /// Page index
    pub fn page(&self) -> usize {
        self.page
    }

    /// Offset within the page
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Outcome of [`BufferReader::read_chunk`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// The destination was filled exactly
    Filled(usize),
    /// The buffer ran out before the destination was full
    EndOfStream(usize),
}

impl ReadStatus {
    /// Bytes copied
    pub fn count(&self) -> usize {
        match *self {
            ReadStatus::Filled(n) | ReadStatus::EndOfStream(n) => n,
        }
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ReadStatus::EndOfStream(_))
    }
}

/// Restartable sequential reader over a [`ChunkedBuffer`].
///
/// Reads copy out of the buffer; nothing is aliased. The position only ever
/// moves forward. A reader parked at the end of a partially filled last page
/// stays there, so bytes appended later (after resuming through
/// [`ChunkedBuffer::reader_at`]) are picked up.
#[derive(Debug)]
pub struct BufferReader<'a> {
    buffer: &'a ChunkedBuffer,
    pos: ReadPosition,
}

impl<'a> BufferReader<'a> {
    pub(crate) fn new(buffer: &'a ChunkedBuffer, pos: ReadPosition) -> Self {
        Self { buffer, pos }
    }

    /// Current position
    pub fn position(&self) -> ReadPosition {
        self.pos
    }

    /// Logical offset of the next byte to be read
    pub fn logical_offset(&self) -> usize {
        let pages = self.buffer.pages();
        let before: usize = pages[..self.pos.page.min(pages.len())]
            .iter()
            .map(|p| p.len())
            .sum();
        before + self.pos.offset
    }

    /// Bytes left between the position and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.logical_offset()
    }

    /// Whether every byte currently in the buffer has been read
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Step past a full page once its last byte has been consumed.
    #[inline]
    fn settle(&mut self) {
        if let Some(page) = self.buffer.pages().get(self.pos.page) {
            if page.is_full() && self.pos.offset == page.len() {
                self.pos.page += 1;
                self.pos.offset = 0;
            }
        }
    }

    /// Copy from the current position into `into`, crossing pages as needed.
    pub fn read_chunk(&mut self, into: &mut [u8]) -> ReadStatus {
        if into.is_empty() {
            return ReadStatus::Filled(0);
        }

        let buffer = self.buffer;
        let mut read = 0;
        while read < into.len() {
            self.settle();
            let Some(page) = buffer.pages().get(self.pos.page) else {
                break;
            };
            let src = &page.as_slice()[self.pos.offset..];
            if src.is_empty() {
                break;
            }
            let n = src.len().min(into.len() - read);
            into[read..read + n].copy_from_slice(&src[..n]);
            read += n;
            self.pos.offset += n;
        }
        self.settle();

        if read == into.len() {
            ReadStatus::Filled(read)
        } else {
            ReadStatus::EndOfStream(read)
        }
    }

    /// Stream everything from the current position into `sink`, one page
    /// at a time.
    ///
    /// The position advances only over bytes the sink accepted, so after an
    /// error the reader can be resumed from exactly where the sink stopped.
    pub fn write_to<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<u64, SinkError> {
        let buffer = self.buffer;
        let mut written = 0u64;
        loop {
            self.settle();
            let Some(page) = buffer.pages().get(self.pos.page) else {
                break;
            };
            let chunk = &page.as_slice()[self.pos.offset..];
            if chunk.is_empty() {
                break;
            }
            match sink.write(chunk) {
                Ok(0) => {
                    return Err(self.sink_failed(written, io::ErrorKind::WriteZero.into()));
                }
                Ok(n) => {
                    self.pos.offset += n;
                    written += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.sink_failed(written, e)),
            }
        }
        Ok(written)
    }

    fn sink_failed(&self, written: u64, source: io::Error) -> SinkError {
        log_event_with_fields(
            Event::BufferSinkFailed,
            &[
                ("error", &source.to_string()),
                ("written", &written.to_string()),
            ],
        );
        SinkError::new(written, source)
    }
}

impl Read for BufferReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_chunk(buf).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(page_size: usize, data: &[u8]) -> ChunkedBuffer {
        let mut buf = ChunkedBuffer::new(page_size);
        buf.write(data);
        buf
    }

    #[test]
    fn test_read_chunk_crosses_pages() {
        let buf = filled(2, b"abcdefghij");
        let mut reader = buf.reader();

        let mut out = [0u8; 5];
        assert_eq!(reader.read_chunk(&mut out), ReadStatus::Filled(5));
        assert_eq!(&out, b"abcde");

        let mut out = [0u8; 8];
        assert_eq!(reader.read_chunk(&mut out), ReadStatus::EndOfStream(5));
        assert_eq!(&out[..5], b"fghij");
        assert!(reader.is_exhausted());

        assert_eq!(reader.read_chunk(&mut out), ReadStatus::EndOfStream(0));
    }

    #[test]
    fn test_empty_destination() {
        let buf = filled(4, b"xy");
        let mut reader = buf.reader();
        assert_eq!(reader.read_chunk(&mut []), ReadStatus::Filled(0));
        assert_eq!(reader.position(), ReadPosition::start());
    }

    #[test]
    fn test_exact_fill_at_end_is_not_eof() {
        let buf = filled(4, b"abcd");
        let mut reader = buf.reader();
        let mut out = [0u8; 4];
        assert_eq!(reader.read_chunk(&mut out), ReadStatus::Filled(4));
        assert!(reader.is_exhausted());
        assert_eq!(reader.position(), ReadPosition::new(1, 0));
    }

    #[test]
    fn test_position_stays_on_partial_last_page() {
        let buf = filled(8, b"abc");
        let mut reader = buf.reader();
        let mut out = [0u8; 16];
        assert_eq!(reader.read_chunk(&mut out), ReadStatus::EndOfStream(3));
        assert_eq!(reader.position(), ReadPosition::new(0, 3));
    }

    #[test]
    fn test_io_read_trait() {
        let buf = filled(3, b"hello world");
        let mut out = Vec::new();
        buf.reader().read_to_end(&mut out).unwrap();
        assert_eq!(out, b"hello world");
    }

    #[test]
    fn test_logical_offset_and_remaining() {
        let buf = filled(2, b"abcdef");
        let mut reader = buf.reader();
        let mut out = [0u8; 3];
        reader.read_chunk(&mut out);
        assert_eq!(reader.logical_offset(), 3);
        assert_eq!(reader.remaining(), 3);
    }

    #[test]
    fn test_write_to_from_middle() {
        let buf = filled(2, b"abcdefg");
        let mut reader = buf.reader();
        let mut out = [0u8; 3];
        reader.read_chunk(&mut out);

        let mut sink = Vec::new();
        assert_eq!(reader.write_to(&mut sink).unwrap(), 4);
        assert_eq!(sink, b"defg");
        assert!(reader.is_exhausted());
    }

    struct Interrupting {
        interrupted: bool,
        out: Vec<u8>,
    }

    impl Write for Interrupting {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::ErrorKind::Interrupted.into());
            }
            self.out.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_to_retries_interrupted() {
        let buf = filled(4, b"retry me");
        let mut sink = Interrupting {
            interrupted: false,
            out: Vec::new(),
        };
        assert_eq!(buf.reader().write_to(&mut sink).unwrap(), 8);
        assert_eq!(sink.out, b"retry me");
    }

    struct Stuck;

    impl Write for Stuck {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_to_zero_progress_is_error() {
        let buf = filled(4, b"data");
        let mut reader = buf.reader();
        let err = reader.write_to(&mut Stuck).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
        assert_eq!(err.written(), 0);
        assert_eq!(reader.position(), ReadPosition::start());
    }
}
