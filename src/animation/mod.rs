//! Time-driven value animations.

use std::time::Duration;

use keyframe::functions::EaseOutQuint;
use keyframe::EasingFunction;

mod clock;

pub use clock::Clock;

/// Eased transition between two values.
///
/// Progress follows a quintic ease-out, so the value moves fast at first and settles gently.
#[derive(Debug, Clone)]
pub struct Animation {
    from: f64,
    to: f64,
    duration: Duration,
    start_time: Duration,
    clock: Clock,
}

impl Animation {
    pub fn new(clock: Clock, from: f64, to: f64, duration: Duration) -> Self {
        let start_time = clock.now();
        Self {
            from,
            to,
            duration,
            start_time,
            clock,
        }
    }

    pub fn is_done(&self) -> bool {
        self.clock.now() >= self.start_time + self.duration
    }

    pub fn value(&self) -> f64 {
        let passed = self.clock.now().saturating_sub(self.start_time);
        if passed >= self.duration || self.duration.is_zero() {
            return self.to;
        }

        let x = passed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * EaseOutQuint.y(x)
    }
}
