//! Shutdown signal plus completion counter for background workers
//!
//! A supervisor creates a `Closer` with the number of workers it is about
//! to start, hands a clone to each one, and later calls
//! [`Closer::signal_and_wait`]. Workers poll [`Closer::has_been_closed`] (or
//! block in [`Closer::wait_signal`]) and call [`Closer::done`] on exit.
//!
//! The signal is one-shot: signalling twice is a programming error and
//! panics. An absent closer ([`Closer::absent`]) is never signalled, never
//! counts anything and never blocks in [`Closer::wait`].

use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::observability::{log_event, log_event_with_fields, Event, MetricsRegistry};

#[derive(Debug, Default)]
struct CloserState {
    signalled: bool,
    running: isize,
}

#[derive(Debug, Default)]
struct CloserInner {
    state: Mutex<CloserState>,
    /// Notified once, on signal.
    signalled: Condvar,
    /// Notified whenever `running` drops to zero.
    drained: Condvar,
}

impl CloserInner {
    fn lock(&self) -> MutexGuard<'_, CloserState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Never signalled; absent closers park on it in `wait_signal`.
static NEVER_SIGNALLED: OnceLock<CloserInner> = OnceLock::new();

/// Cloneable handle to a shutdown signal and a running-worker count.
#[derive(Debug, Clone)]
pub struct Closer {
    inner: Option<Arc<CloserInner>>,
}

impl Closer {
    /// Create an unsignalled closer with `initial` running workers.
    ///
    /// # Panics
    ///
    /// Panics if `initial` exceeds `isize::MAX`.
    pub fn new(initial: usize) -> Self {
        let running = match isize::try_from(initial) {
            Ok(running) => running,
            Err(_) => panic!("closer running count overflow"),
        };
        let inner = CloserInner::default();
        inner.lock().running = running;
        Self {
            inner: Some(Arc::new(inner)),
        }
    }

    /// A closer that was never created.
    ///
    /// Mutations are no-ops, `has_been_closed` is always false and
    /// `wait_signal` blocks forever.
    pub fn absent() -> Self {
        Self { inner: None }
    }

    pub fn is_absent(&self) -> bool {
        self.inner.is_none()
    }

    /// Add `delta` to the running count.
    ///
    /// # Panics
    ///
    /// Panics if the count would go negative.
    pub fn add_running(&self, delta: isize) {
        let Some(inner) = &self.inner else {
            return;
        };
        let mut state = inner.lock();
        let Some(running) = state.running.checked_add(delta) else {
            drop(state);
            panic!("closer running count overflow");
        };
        if running < 0 {
            drop(state);
            panic!("negative closer running count");
        }
        state.running = running;
        if running == 0 {
            drop(state);
            inner.drained.notify_all();
            log_event(Event::CloserDrained);
        }
    }

    /// Mark one worker as finished.
    pub fn done(&self) {
        self.add_running(-1);
    }

    /// Tell every worker to stop.
    ///
    /// # Panics
    ///
    /// Panics if the closer was already signalled.
    pub fn signal(&self) {
        let Some(inner) = &self.inner else {
            return;
        };
        let mut state = inner.lock();
        if state.signalled {
            drop(state);
            panic!("closer signalled twice");
        }
        state.signalled = true;
        let running = state.running;
        drop(state);

        inner.signalled.notify_all();
        MetricsRegistry::global().increment_closers_signalled();
        log_event_with_fields(Event::CloserSignalled, &[("running", &running.to_string())]);
    }

    /// Non-blocking check of the signal. Absent closers report `false`.
    pub fn has_been_closed(&self) -> bool {
        match &self.inner {
            Some(inner) => inner.lock().signalled,
            None => false,
        }
    }

    /// Block until the closer is signalled.
    ///
    /// Returns immediately if it already was. On an absent closer this
    /// never returns.
    pub fn wait_signal(&self) {
        let inner = match &self.inner {
            Some(inner) => inner.as_ref(),
            None => NEVER_SIGNALLED.get_or_init(CloserInner::default),
        };
        let mut state = inner.lock();
        while !state.signalled {
            state = inner
                .signalled
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block until the running count reaches zero.
    pub fn wait(&self) {
        let Some(inner) = &self.inner else {
            return;
        };
        let mut state = inner.lock();
        while state.running > 0 {
            state = inner
                .drained
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// [`signal`](Self::signal) then [`wait`](Self::wait).
    pub fn signal_and_wait(&self) {
        self.signal();
        self.wait();
    }

    /// Snapshot of the running count.
    pub fn running(&self) -> usize {
        match &self.inner {
            Some(inner) => inner.lock().running.max(0) as usize,
            None => 0,
        }
    }
}
