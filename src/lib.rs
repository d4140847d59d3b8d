//! aerodb-rt - runtime support primitives for the aerodb storage engine
//!
//! - [`buffer`]: chunked, append-only byte buffer with a restartable reader
//! - [`lifecycle`]: worker shutdown signalling and bounded parallelism
//! - [`keys`], [`encoding`], [`file`], [`checksum`]: small stateless helpers
//! - [`observability`], [`config`]: logging, counters and runtime settings

pub mod buffer;
pub mod checksum;
pub mod config;
pub mod encoding;
pub mod errors;
pub mod file;
pub mod keys;
pub mod lifecycle;
pub mod observability;

pub use buffer::{BufferError, BufferReader, ChunkedBuffer, ReadPosition, ReadStatus, SinkError};
pub use config::{BufferConfig, RuntimeConfig, ThrottleConfig};
pub use lifecycle::{Closer, Throttle};
