use std::time::Duration;

use instant::Instant;

/// One-shot deadline owned by a pin.
///
/// The event loop passes the current time into [`GraceTimer::fire_if_due`];
/// cancelling clears the deadline so a late poll cannot fire it.
#[derive(Debug, Clone)]
pub struct GraceTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl GraceTimer {
    pub fn new(delay: Duration) -> Self {
        GraceTimer {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Start (or restart) the countdown from `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns true if a pending deadline was dropped.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarms and returns true once `now` has reached the deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
