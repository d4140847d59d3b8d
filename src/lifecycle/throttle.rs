//! Bounded parallelism with first-error aggregation
//!
//! A `Throttle` admits at most `max` units of work at a time. Workers call
//! [`Throttle::acquire`] before starting and [`Throttle::release`] when done,
//! passing along any error. The supervisor calls [`Throttle::finish`] to wait
//! for everything to drain and collect the first error reported.
//!
//! # Invariants
//!
//! - Admitted-but-unreleased units never exceed `max`
//! - A pending error is handed to the next `acquire` instead of a token,
//!   so callers can stop scheduling work that would be discarded
//! - `finish` computes its result once; every caller sees the same value
//! - `release` without a matching `acquire` panics
//!
//! ```ignore
//! let throttle = Arc::new(Throttle::new(4));
//! for item in items {
//!     throttle.acquire()?;
//!     let throttle = Arc::clone(&throttle);
//!     thread::spawn(move || throttle.release(process(item).err()));
//! }
//! throttle.finish()?;
//! ```

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::config::ThrottleConfig;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

#[derive(Debug)]
struct ThrottleState<E> {
    /// Free admission tokens.
    available: usize,
    /// Units admitted and not yet released.
    outstanding: usize,
    /// Errors waiting to be picked up by `acquire`; bounded by `max`.
    relay: VecDeque<E>,
    /// First error ever released; kept for `finish`.
    first_error: Option<E>,
    /// Memoized `finish` result.
    result: Option<Result<(), E>>,
}

/// Admits at most `max` concurrent units of work and keeps the first error.
///
/// `E` is opaque to the throttle: stored, relayed and returned, never
/// inspected.
#[derive(Debug)]
pub struct Throttle<E> {
    max: usize,
    state: Mutex<ThrottleState<E>>,
    /// Notified on every release.
    changed: Condvar,
}

impl<E: Clone> Throttle<E> {
    /// Create a throttle admitting `max` concurrent units.
    ///
    /// # Panics
    ///
    /// Panics if `max` is 0.
    pub fn new(max: usize) -> Self {
        assert!(max > 0, "Throttle capacity must be > 0");
        Self {
            max,
            state: Mutex::new(ThrottleState {
                available: max,
                outstanding: 0,
                relay: VecDeque::with_capacity(max),
                first_error: None,
                result: None,
            }),
            changed: Condvar::new(),
        }
    }

    /// Create a throttle sized from configuration.
    pub fn with_config(config: &ThrottleConfig) -> Self {
        Self::new(config.max_workers)
    }

    fn lock(&self) -> MutexGuard<'_, ThrottleState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Capacity.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Snapshot of admitted-but-unreleased units.
    pub fn outstanding(&self) -> usize {
        self.lock().outstanding
    }

    /// Block until a unit of work may start.
    ///
    /// Returns `Err` with an error released by an earlier worker if one is
    /// pending; in that case no token was taken and `release` must not be
    /// called.
    ///
    /// # Panics
    ///
    /// Panics if the throttle has already been finished.
    pub fn acquire(&self) -> Result<(), E> {
        let mut state = self.lock();
        loop {
            if state.result.is_some() {
                drop(state);
                panic!("throttle already finished");
            }
            if let Some(err) = state.relay.pop_front() {
                return Err(err);
            }
            if state.available > 0 {
                state.available -= 1;
                state.outstanding += 1;
                MetricsRegistry::global().increment_throttle_admissions();
                return Ok(());
            }
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Finish one unit of work, reporting its error if any.
    ///
    /// The relay holds at most `max` errors. Once it is full, further errors
    /// are dropped: the first error is always retained for `finish`, and
    /// `acquire` callers already have a pending error to stop on.
    ///
    /// # Panics
    ///
    /// Panics if there is no matching `acquire`, or after `finish`.
    pub fn release(&self, err: Option<E>) {
        let mut state = self.lock();
        if state.result.is_some() {
            drop(state);
            panic!("throttle already finished");
        }
        if state.outstanding == 0 {
            drop(state);
            panic!("throttle acquire/release mismatch");
        }

        if let Some(err) = err {
            MetricsRegistry::global().increment_throttle_errors();
            if state.first_error.is_none() {
                state.first_error = Some(err.clone());
            }
            if state.relay.len() < self.max {
                state.relay.push_back(err);
            }
        }

        state.available += 1;
        state.outstanding -= 1;
        drop(state);
        self.changed.notify_all();
    }

    /// Wait for every admitted unit to be released and return the first
    /// error reported, if any.
    ///
    /// Only the first call waits and computes; later calls return the same
    /// result.
    pub fn finish(&self) -> Result<(), E> {
        let mut state = self.lock();
        while state.outstanding > 0 {
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if let Some(result) = &state.result {
            return result.clone();
        }

        state.relay.clear();
        state.available = 0;
        let result = match state.first_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        };
        state.result = Some(result.clone());
        drop(state);

        log_event_with_fields(
            Event::ThrottleFinished,
            &[
                ("max", &self.max.to_string()),
                ("outcome", if result.is_ok() { "ok" } else { "error" }),
            ],
        );
        result
    }
}
