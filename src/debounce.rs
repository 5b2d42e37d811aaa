//! Trailing-edge debounce driven by the host's clock.

use web_time::{Duration, Instant};

/// Holds back calls until `delay` has passed without another one.
///
/// Only the latest arguments survive. The owner polls with the current time,
/// typically from a timer armed at [`Debouncer::deadline`].
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record a call, dropping any pending one and restarting the delay.
    pub fn call(&mut self, args: T, now: Instant) {
        self.pending = Some((args, now + self.delay));
    }

    /// When the pending call becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending arguments if they are due at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending.take() {
            Some((args, due)) if due <= now => Some(args),
            still_waiting => {
                self.pending = still_waiting;
                None
            }
        }
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(args, _)| args)
    }
}
