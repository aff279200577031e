//! Single-shot cancellable alarms.
//!
//! An [`Alarm`] has at most one pending deadline. Every time the alarm is set or cancelled its
//! generation advances, so a token handed out earlier stops matching. Whoever acts on a firing
//! must check the token with [`Alarm::is_current`] first; a stale token means the context that
//! armed the alarm is gone and the firing is a no-op.

use std::time::Duration;

/// Identifies one arming of an [`Alarm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlarmToken(u64);

#[derive(Debug, Default)]
pub struct Alarm {
    generation: u64,
    deadline: Option<Duration>,
}

impl Alarm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the alarm, replacing any pending deadline.
    pub fn set(&mut self, now: Duration, delay: Duration) -> AlarmToken {
        self.generation += 1;
        self.deadline = Some(now + delay);
        AlarmToken(self.generation)
    }

    /// Disarms the alarm and invalidates every token handed out so far.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.generation += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Token of the pending arming, if any.
    pub fn token(&self) -> Option<AlarmToken> {
        self.deadline.map(|_| AlarmToken(self.generation))
    }

    /// Returns the token if the deadline has passed, disarming the alarm.
    ///
    /// The returned token stays current until the alarm is set or cancelled again.
    pub fn take_due(&mut self, now: Duration) -> Option<AlarmToken> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                Some(AlarmToken(self.generation))
            }
            _ => None,
        }
    }

    pub fn is_current(&self, token: AlarmToken) -> bool {
        token.0 == self.generation
    }
}
