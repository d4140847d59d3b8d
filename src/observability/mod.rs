//! Observability for the runtime primitives
//!
//! - Structured logging (JSON, one line per event)
//! - Monotonic counters
//!
//! Observability is read-only: nothing here changes the behaviour of a
//! buffer, closer or throttle, and a failed log write is dropped.
//!
//! # Usage
//!
//! ```ignore
//! use aerodb_rt::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event_with_fields(Event::ThrottleFinished, &[("outcome", "ok")]);
//! let snap = MetricsRegistry::global().snapshot();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity, UnknownSeverity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a runtime event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a runtime event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
