use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Shareable monotonic clock.
///
/// All clones observe the same time. A clock is either backed by [`Instant`], or manual, in
/// which case time only moves through [`Clock::set_time`] and [`Clock::advance`]. Manual clocks
/// drive tests and replays.
#[derive(Debug, Clone)]
pub struct Clock {
    inner: Rc<RefCell<Inner>>,
}

#[derive(Debug)]
enum Inner {
    Monotonic { start: Instant },
    Manual { time: Duration },
}

impl Clock {
    /// Creates a clock backed by the system monotonic time, starting at zero.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::Monotonic {
                start: Instant::now(),
            })),
        }
    }

    /// Creates a manual clock starting at `time`.
    pub fn with_time(time: Duration) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::Manual { time })),
        }
    }

    pub fn now(&self) -> Duration {
        match &*self.inner.borrow() {
            Inner::Monotonic { start } => start.elapsed(),
            Inner::Manual { time } => *time,
        }
    }

    /// Sets the time of a manual clock. Time never goes backwards.
    ///
    /// Does nothing for a monotonic clock.
    pub fn set_time(&self, new: Duration) {
        if let Inner::Manual { time } = &mut *self.inner.borrow_mut() {
            *time = (*time).max(new);
        }
    }

    /// Moves a manual clock forward. Does nothing for a monotonic clock.
    pub fn advance(&self, delta: Duration) {
        if let Inner::Manual { time } = &mut *self.inner.borrow_mut() {
            *time += delta;
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Clock {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
