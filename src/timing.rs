//! Clocks and rate limiters.
//!
//! Pointer-move picking is throttled and resize handling is debounced. Both
//! limiters are plain state machines fed with the current time, so they can be
//! driven by [`SystemClock`] in the browser and by [`VirtualClock`] in tests.

use std::{cell::Cell, rc::Rc};

use instant::{Duration, Instant};

/// Monotonic time source. `now` is measured from an arbitrary fixed start.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock; works natively and on `wasm32` through `instant`.
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Manually advanced clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now: Rc<Cell<Duration>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Lets at most one value through per `interval`.
///
/// Values arriving too early are not lost: the latest one is kept and handed
/// out by [`Throttle::poll`] once the interval has elapsed (trailing edge).
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Duration,
    last_fired: Option<Duration>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
            pending: None,
        }
    }

    fn ready(&self, now: Duration) -> bool {
        self.last_fired
            .is_none_or(|last| now.saturating_sub(last) >= self.interval)
    }

    /// Returns the value if it may be handled now, otherwise parks it.
    pub fn submit(&mut self, now: Duration, value: T) -> Option<T> {
        if self.ready(now) {
            self.last_fired = Some(now);
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Releases the parked value once the interval has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        if self.pending.is_some() && self.ready(now) {
            self.last_fired = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    /// Drops the parked value, e.g. when the pointer left the canvas.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Hands out a value only after `quiet_period` passed without a newer one.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    quiet_period: Duration,
    pending: Option<(T, Duration)>,
}

impl<T> Debounce<T> {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn submit(&mut self, now: Duration, value: T) {
        self.pending = Some((value, now + self.quiet_period));
    }

    pub fn poll(&mut self, now: Duration) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|(_, deadline)| now >= *deadline);
        if due {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
