//! Load timeout timer and clock sources
//!
//! The controller runs on a single-threaded event loop and owns no threads.
//! The timer only stores a deadline; the host calls `poll()` (or delivers an
//! engine event) and the controller checks the deadline against its clock.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source
pub trait Clock {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;
}

/// Wall-clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
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
        self.origin.elapsed()
    }
}

/// Manually advanced clock
///
/// Clones share the same time, so a test can keep one handle and hand the
/// other to the controller.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Jump to an absolute time; never moves backwards
    pub fn set(&self, to: Duration) {
        if to > self.now.get() {
            self.now.set(to);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Single-shot deadline for one load attempt
#[derive(Debug, Clone)]
pub struct LoadTimer {
    timeout: Duration,
    deadline: Option<Duration>,
}

impl LoadTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start (or restart) the countdown from `now`
    pub fn arm(&mut self, now: Duration) {
        self.deadline = Some(now + self.timeout);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once `now` has passed the deadline
    pub fn is_expired(&self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) => now > deadline,
            None => false,
        }
    }

    /// Time left before expiry; `None` when no timer is pending
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_sub(now))
    }
}
