//! Routing of pointer events to drags, page drags, scrolling and the preview pinch.

use std::time::Duration;

use serde::Deserialize;

use self::pinch::PinchDetector;
use crate::layout::drag::DropOutcome;
use crate::layout::Canvas;
use crate::utils::Point;

pub mod pinch;
pub mod swipe_tracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// One pointer or touch contact event, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PointerEvent {
    /// Contact id, stable from `Down` to `Up`.
    #[serde(default)]
    pub id: u32,
    pub phase: PointerPhase,
    pub pos: Point,
    /// Event timestamp, used for fling velocity.
    #[serde(with = "millis")]
    pub time: Duration,
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Copy)]
struct TrackedPointer {
    id: u32,
    down: Point,
    last: Point,
    /// Whether this pointer moves the canvas.
    scrolling: bool,
}

/// Which contact does what.
#[derive(Debug, Default)]
pub struct PointerRouting {
    primary: Option<TrackedPointer>,
    /// Second contact, only tracked for the pinch.
    secondary: Option<(u32, Point)>,
    pinch: Option<PinchDetector>,
}

impl PointerRouting {
    pub fn is_scrolling(&self) -> bool {
        self.primary.is_some_and(|p| p.scrolling)
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }
}

impl Canvas {
    /// Handles a pointer event.
    ///
    /// Returns the outcome if the event ended an item drag.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<DropOutcome> {
        match event.phase {
            PointerPhase::Down => {
                self.on_pointer_down(event);
                None
            }
            PointerPhase::Move => {
                self.on_pointer_move(event);
                None
            }
            PointerPhase::Up => self.on_pointer_up(event),
            PointerPhase::Cancel => self.on_pointer_cancel(event),
        }
    }

    fn on_pointer_down(&mut self, event: PointerEvent) {
        let Some(mut primary) = self.input.primary else {
            self.input.primary = Some(TrackedPointer {
                id: event.id,
                down: event.pos,
                last: event.pos,
                scrolling: false,
            });
            return;
        };

        if primary.id == event.id || self.input.secondary.is_some() {
            trace!("ignoring extra pointer {}", event.id);
            return;
        }

        self.input.secondary = Some((event.id, event.pos));
        if self.is_dragging() || self.is_preview() {
            return;
        }

        // Two fingers down: the canvas stops following the first one.
        if primary.scrolling {
            self.scroll_gesture_cancel();
            primary.scrolling = false;
            self.input.primary = Some(primary);
        }

        trace!("watching for a pinch");
        self.input.pinch = Some(PinchDetector::new(
            primary.last,
            event.pos,
            self.options().pinch_slop,
        ));
    }

    fn on_pointer_move(&mut self, event: PointerEvent) {
        let Some(mut primary) = self.input.primary else {
            return;
        };
        let is_primary = primary.id == event.id;

        if let Some((id, pos)) = &mut self.input.secondary {
            if *id == event.id {
                *pos = event.pos;
            }
        }

        if let Some(pinch) = &mut self.input.pinch {
            if is_primary {
                primary.last = event.pos;
                self.input.primary = Some(primary);
            }
            let Some((_, second)) = self.input.secondary else {
                return;
            };

            if pinch.update(primary.last, second) {
                debug!("pinch recognized");
                self.input.pinch = None;
                self.enter_preview();
            }
            return;
        }

        if !is_primary {
            return;
        }

        let delta_x = event.pos.x - primary.last.x;
        primary.last = event.pos;

        if self.is_dragging() {
            self.drag_update(event.pos);
        } else if self.reorder().is_some() {
            self.preview_drag_update(event.pos);
        } else if !self.is_preview() {
            if !primary.scrolling && (event.pos.x - primary.down.x).abs() > self.options().touch_slop
            {
                primary.scrolling = self.scroll_gesture_begin(event.time);
            }
            if primary.scrolling {
                self.scroll_gesture_update(delta_x, event.time);
            }
        }

        self.input.primary = Some(primary);
    }

    fn on_pointer_up(&mut self, event: PointerEvent) -> Option<DropOutcome> {
        if self.input.secondary.is_some_and(|(id, _)| id == event.id) {
            self.input.secondary = None;
            self.input.pinch = None;
            return None;
        }

        let primary = self.input.primary.filter(|p| p.id == event.id)?;
        self.input = PointerRouting::default();

        if self.is_dragging() {
            return self.drag_drop(event.pos);
        }

        if self.reorder().is_some() {
            self.preview_drag_update(event.pos);
            self.preview_drag_drop();
        } else if primary.scrolling {
            self.scroll_gesture_end(event.time);
        }

        None
    }

    fn on_pointer_cancel(&mut self, event: PointerEvent) -> Option<DropOutcome> {
        if self.input.secondary.is_some_and(|(id, _)| id == event.id) {
            self.input.secondary = None;
            self.input.pinch = None;
            return None;
        }

        let primary = self.input.primary.filter(|p| p.id == event.id)?;
        self.input = PointerRouting::default();

        if self.is_dragging() {
            return self.drag_cancel();
        }

        if self.reorder().is_some() {
            self.preview_drag_cancel();
        } else if primary.scrolling {
            self.scroll_gesture_cancel();
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use deckgrid_config::Config;

    use super::*;
    use crate::animation::Clock;
    use crate::layout::grid::Cell;
    use crate::layout::item::{Item, ItemId, ItemKind};

    fn event(id: u32, phase: PointerPhase, x: f64, y: f64, ms: u64) -> PointerEvent {
        PointerEvent {
            id,
            phase,
            pos: Point::new(x, y),
            time: Duration::from_millis(ms),
        }
    }

    fn canvas() -> Canvas {
        Canvas::new(Clock::with_time(Duration::ZERO), &Config::default())
    }

    #[test]
    fn small_moves_do_not_scroll() {
        let mut canvas = canvas();
        let start = canvas.scroll().offset();
        canvas.handle_pointer(event(0, PointerPhase::Down, 500., 500., 0));
        canvas.handle_pointer(event(0, PointerPhase::Move, 495., 500., 10));
        assert!(!canvas.input.is_scrolling());
        assert_eq!(canvas.scroll().offset(), start);
    }

    #[test]
    fn swipe_scrolls_to_next_page() {
        let mut canvas = canvas();
        canvas.set_current_page(0);
        canvas.handle_pointer(event(0, PointerPhase::Down, 900., 500., 0));
        for step in 1..=10 {
            canvas.handle_pointer(event(
                0,
                PointerPhase::Move,
                900. - 60. * step as f64,
                500.,
                step * 10,
            ));
        }
        assert!(canvas.input.is_scrolling());
        assert!(canvas.scroll().is_gesture());

        canvas.handle_pointer(event(0, PointerPhase::Up, 300., 500., 100));
        assert!(!canvas.scroll().is_gesture());
        assert_eq!(canvas.scroll().target_page(), 1);
    }

    #[test]
    fn pinch_enters_preview() {
        let mut canvas = canvas();
        canvas.handle_pointer(event(0, PointerPhase::Down, 100., 500., 0));
        canvas.handle_pointer(event(1, PointerPhase::Down, 900., 500., 5));
        assert!(canvas.input.is_pinching());

        canvas.handle_pointer(event(0, PointerPhase::Move, 300., 500., 20));
        canvas.handle_pointer(event(1, PointerPhase::Move, 700., 500., 25));
        assert!(canvas.is_preview());
        assert!(!canvas.input.is_pinching());
    }

    #[test]
    fn pointer_up_drops_dragged_item() {
        let mut canvas = canvas();
        canvas.set_current_page(0);
        assert!(canvas.add_item(Item::new(1, ItemKind::Application), 0, Cell::new(0, 0)));

        canvas.handle_pointer(event(0, PointerPhase::Down, 50., 50., 0));
        assert!(canvas.drag_item_begin(ItemId(1), Point::new(50., 50.)));
        canvas.handle_pointer(event(0, PointerPhase::Move, 400., 50., 10));
        let outcome = canvas.handle_pointer(event(0, PointerPhase::Up, 400., 50., 20));
        assert_eq!(
            outcome,
            Some(DropOutcome::Moved {
                page: 0,
                cell: Cell::new(1, 0)
            })
        );
        assert!(!canvas.is_dragging());
    }

    #[test]
    fn cancel_abandons_drag() {
        let mut canvas = canvas();
        canvas.set_current_page(0);
        assert!(canvas.add_item(Item::new(1, ItemKind::Application), 0, Cell::new(0, 0)));

        canvas.handle_pointer(event(0, PointerPhase::Down, 50., 50., 0));
        assert!(canvas.drag_item_begin(ItemId(1), Point::new(50., 50.)));
        canvas.handle_pointer(event(0, PointerPhase::Move, 250., 250., 10));
        let outcome = canvas.handle_pointer(event(0, PointerPhase::Cancel, 250., 250., 20));
        assert_eq!(outcome, Some(DropOutcome::Cancelled));
        assert_eq!(canvas.find_item(ItemId(1)).unwrap().1.cell, Cell::new(0, 0));
    }
}
