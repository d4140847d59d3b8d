//! Observable runtime events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events emitted by the runtime primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Runtime configuration loaded and applied
    ConfigLoaded,

    // Buffer
    /// A chunked buffer allocated a new page
    BufferPageAllocated,
    /// A buffer sink rejected a write
    BufferSinkFailed,

    // Lifecycle
    /// A closer was signalled
    CloserSignalled,
    /// All workers tracked by a closer finished
    CloserDrained,

    // Throttle
    /// A throttle was finished (first call only)
    ThrottleFinished,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::BufferPageAllocated => "BUFFER_PAGE_ALLOCATED",
            Event::BufferSinkFailed => "BUFFER_SINK_FAILED",
            Event::CloserSignalled => "CLOSER_SIGNALLED",
            Event::CloserDrained => "CLOSER_DRAINED",
            Event::ThrottleFinished => "THROTTLE_FINISHED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::BufferPageAllocated | Event::CloserDrained => Severity::Trace,
            Event::ConfigLoaded | Event::CloserSignalled | Event::ThrottleFinished => {
                Severity::Info
            }
            Event::BufferSinkFailed => Severity::Warn,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
