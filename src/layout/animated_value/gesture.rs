use std::time::Duration;

use crate::input::swipe_tracker::SwipeTracker;

/// State of a pointer-controlled value.
#[derive(Debug, Clone)]
pub struct ViewGesture {
    /// Value when the gesture started.
    pub start_value: f64,
    /// Current value as modified by the gesture, after any overscroll treatment.
    pub current_value: f64,
    /// Accumulated pointer travel and its velocity.
    pub tracker: SwipeTracker,
}

impl ViewGesture {
    /// Creates a new gesture starting at the given value.
    pub fn new(value: f64, timestamp: Duration) -> Self {
        let mut tracker = SwipeTracker::new();
        // Marks the start of the velocity window.
        tracker.push(0., timestamp);

        Self {
            start_value: value,
            current_value: value,
            tracker,
        }
    }

    /// Value before any overscroll treatment: pointer travel moves the value the opposite way.
    pub fn raw_value(&self) -> f64 {
        self.start_value - self.tracker.pos()
    }
}
