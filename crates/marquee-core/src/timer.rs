//! Cancellable scheduled task
//!
//! A deadline-based timer that can be rescheduled, suspended and cancelled.
//! It never runs anything itself: the owner polls it with the current time
//! and acts when it reports due. This keeps every firing on the owner's
//! serial execution context.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct ScheduledTask {
    /// Next firing time, if armed
    deadline: Option<Instant>,
    /// Repeat period; `None` for a one-shot schedule
    period: Option<Duration>,
    /// Suspended tasks keep their schedule but never fire
    suspended: bool,
    /// Cancelled tasks are dead for good
    cancelled: bool,
}

impl ScheduledTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Task that first fires `delay` after `now`, then every `period`.
    pub fn scheduled(now: Instant, delay: Duration, period: Option<Duration>) -> Self {
        let mut task = Self::new();
        task.reschedule(now, delay, period);
        task
    }

    /// Replace any pending schedule and un-suspend the task.
    ///
    /// No-op once the task has been cancelled.
    pub fn reschedule(&mut self, now: Instant, delay: Duration, period: Option<Duration>) {
        if self.cancelled {
            return;
        }
        self.deadline = Some(now + delay);
        self.period = period.filter(|p| !p.is_zero());
        self.suspended = false;
    }

    /// Stop firing until the next `reschedule`.
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    /// Disarm permanently.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.deadline = None;
        self.period = None;
    }

    #[inline]
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// When the task will next fire, if it is live and armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.cancelled || self.suspended {
            None
        } else {
            self.deadline
        }
    }

    /// Consume a due firing.
    ///
    /// Returns true if the deadline has passed. Periodic tasks are re-armed
    /// one period later; if that is still in the past, missed firings are
    /// skipped and the next one is placed a full period after `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.next_deadline() else {
            return false;
        };
        if now < deadline {
            return false;
        }

        self.deadline = self.period.map(|period| {
            let next = deadline + period;
            if next <= now {
                now + period
            } else {
                next
            }
        });
        true
    }
}
