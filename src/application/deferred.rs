// src/application/deferred.rs
use std::time::{Duration, Instant};

/// A cancellable task that fires once, `delay` after it was last scheduled.
///
/// Scheduling again replaces the pending payload and pushes the deadline out,
/// so at most one task is pending at a time. The owner drives it by calling
/// [`DeferredTask::take_due`] from its event loop.
#[derive(Debug)]
pub struct DeferredTask<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> DeferredTask<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule(&mut self, payload: T, now: Instant) {
        self.pending = Some((now + self.delay, payload));
    }

    /// Drop the pending payload, returning it if there was one.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Payload of the pending task if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|deadline| now >= deadline) {
            self.cancel()
        } else {
            None
        }
    }
}
