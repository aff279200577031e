use std::collections::VecDeque;
use std::time::Duration;

use tracing::trace;

/// Events older than this relative to the newest one are ignored for velocity.
const HISTORY_LIMIT: Duration = Duration::from_millis(1000);

/// Accumulates one-dimensional pointer movement and estimates its velocity.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    history: VecDeque<Event>,
    pos: f64,
}

#[derive(Debug, Clone, Copy)]
struct Event {
    delta: f64,
    timestamp: Duration,
}

impl SwipeTracker {
    pub fn new() -> Self {
        Self {
            history: VecDeque::new(),
            pos: 0.,
        }
    }

    /// Pushes a new reading into the tracker.
    pub fn push(&mut self, delta: f64, timestamp: Duration) {
        // For the events that we care about, timestamps should always increase
        // monotonically.
        if let Some(last) = self.history.back() {
            if timestamp < last.timestamp {
                trace!(
                    "ignoring event with timestamp {timestamp:?} earlier than last {:?}",
                    last.timestamp
                );
                return;
            }
        }

        self.history.push_back(Event { delta, timestamp });
        self.pos += delta;

        self.trim_history();
    }

    /// Current total movement.
    pub fn pos(&self) -> f64 {
        self.pos
    }

    /// Current velocity in units per second, averaged over the history window.
    pub fn velocity(&self) -> f64 {
        let (Some(first), Some(last)) = (self.history.front(), self.history.back()) else {
            return 0.;
        };

        let total_time = (last.timestamp - first.timestamp).as_secs_f64();
        if total_time == 0. {
            return 0.;
        }

        // The first event only marks the start of the window; its delta happened before it.
        let total_delta = self.history.iter().skip(1).map(|event| event.delta).sum::<f64>();
        total_delta / total_time
    }

    fn trim_history(&mut self) {
        let Some(&Event { timestamp: last, .. }) = self.history.back() else {
            return;
        };

        while let Some(first) = self.history.front() {
            if last <= first.timestamp + HISTORY_LIMIT {
                break;
            }

            let _ = self.history.pop_front();
        }
    }
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new()
    }
}
