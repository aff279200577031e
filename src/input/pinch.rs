use crate::utils::Point;

/// Recognizes the two-finger "zoom out" pinch that opens the page preview.
///
/// The detector only tracks the distance between two contacts. It triggers once, when that
/// distance has shrunk by more than the slop since both contacts went down.
#[derive(Debug, Clone)]
pub struct PinchDetector {
    slop: f64,
    start_distance: f64,
    triggered: bool,
}

impl PinchDetector {
    pub fn new(first: Point, second: Point, slop: f64) -> Self {
        Self {
            slop,
            start_distance: first.distance(second),
            triggered: false,
        }
    }

    /// Feeds the current contact positions. Returns `true` exactly once, when the pinch triggers.
    pub fn update(&mut self, first: Point, second: Point) -> bool {
        if self.triggered {
            return false;
        }

        let distance = first.distance(second);
        if self.start_distance - distance > self.slop {
            self.triggered = true;
            return true;
        }

        false
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggers_when_closing_in_past_slop() {
        let mut pinch = PinchDetector::new(Point::new(100., 500.), Point::new(700., 500.), 50.);
        assert!(!pinch.update(Point::new(120., 500.), Point::new(680., 500.)));
        assert!(pinch.update(Point::new(140., 500.), Point::new(650., 500.)));
        assert!(pinch.is_triggered());
        // Only once.
        assert!(!pinch.update(Point::new(300., 500.), Point::new(400., 500.)));
    }

    #[test]
    fn spreading_does_not_trigger() {
        let mut pinch = PinchDetector::new(Point::new(300., 500.), Point::new(400., 500.), 50.);
        assert!(!pinch.update(Point::new(100., 500.), Point::new(700., 500.)));
        assert!(!pinch.is_triggered());
    }
}
