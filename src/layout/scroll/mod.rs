//! Page-to-page navigation.
//!
//! The scroll offset is measured in logical units from the left edge of page 0: page `i` is at
//! rest when the offset is `i * page_width`. Pointer travel to the right decreases the offset and
//! reveals lower pages, so a positive release velocity flings toward the lower index.

use std::time::Duration;

use deckgrid_config::OverscrollPolicy;
use serde::Serialize;
use tracing::trace;

use crate::animation::{Animation, Clock};
use crate::layout::animated_value::{AnimatedValue, ViewGesture};

mod overscroll;

pub use overscroll::Overscroll;

/// Fling velocity the snap duration is normalized to, in units per second.
const BASELINE_FLING_VELOCITY: f64 = 2500.;

/// How much the fling velocity shortens or lengthens a snap.
const FLING_VELOCITY_INFLUENCE: f64 = 0.4;

/// Snap duration per page of distance.
const SNAP_DURATION_PER_PAGE: Duration = Duration::from_millis(100);

/// Extra snap duration when there is no velocity to take into account.
const SNAP_DURATION_NO_VELOCITY: Duration = Duration::from_millis(100);

/// Snapshot of the scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollState {
    pub offset: f64,
    pub current_page: usize,
    /// Page an ongoing snap is heading to, if it differs from the current page.
    pub next_page: Option<usize>,
    /// Pointer velocity during a gesture, or the fling velocity during a snap.
    pub velocity: f64,
    /// Signed displacement past the first (negative) or the last (positive) page.
    pub overscroll: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollOptions {
    pub snap_velocity: f64,
    pub overscroll: OverscrollPolicy,
    pub overscroll_damp_factor: f64,
}

#[derive(Debug)]
pub struct ScrollController {
    offset: AnimatedValue,
    page_count: usize,
    page_width: f64,
    current_page: usize,
    /// Target of the ongoing snap animation.
    snap_target: Option<usize>,
    fling_velocity: f64,
    options: ScrollOptions,
    clock: Clock,
}

impl ScrollController {
    pub fn new(
        page_count: usize,
        page_width: f64,
        current_page: usize,
        options: ScrollOptions,
        clock: Clock,
    ) -> Self {
        let current_page = current_page.min(page_count.saturating_sub(1));
        Self {
            offset: AnimatedValue::new(current_page as f64 * page_width),
            page_count,
            page_width,
            current_page,
            snap_target: None,
            fling_velocity: 0.,
            options,
            clock,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn page_width(&self) -> f64 {
        self.page_width
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Page that is current once the ongoing snap finishes.
    pub fn target_page(&self) -> usize {
        self.snap_target.unwrap_or(self.current_page)
    }

    pub fn options(&self) -> &ScrollOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ScrollOptions) {
        self.options = options;
    }

    fn overscroll_curve(&self) -> Overscroll {
        Overscroll {
            policy: self.options.overscroll,
            damp_factor: self.options.overscroll_damp_factor,
            page_width: self.page_width,
        }
    }

    pub fn max_offset(&self) -> f64 {
        self.page_count.saturating_sub(1) as f64 * self.page_width
    }

    pub fn page_offset(&self, page: usize) -> f64 {
        page as f64 * self.page_width
    }

    pub fn offset(&self) -> f64 {
        self.offset.current()
    }

    pub fn overscroll(&self) -> f64 {
        let offset = self.offset();
        offset - offset.clamp(0., self.max_offset())
    }

    pub fn is_gesture(&self) -> bool {
        self.offset.is_gesture()
    }

    pub fn is_animating(&self) -> bool {
        self.offset.is_animation_ongoing()
    }

    pub fn state(&self) -> ScrollState {
        let velocity = match &self.offset {
            AnimatedValue::Gesture(gesture) => gesture.tracker.velocity(),
            AnimatedValue::Animation(_) => self.fling_velocity,
            AnimatedValue::Static(_) => 0.,
        };

        ScrollState {
            offset: self.offset(),
            current_page: self.current_page,
            next_page: self.snap_target.filter(|&page| page != self.current_page),
            velocity,
            overscroll: self.overscroll(),
        }
    }

    /// Position of `page` relative to the viewport, in `[-1, 1]`.
    ///
    /// 0 when the page is centred, +1 when it is one page to the left of the viewport, -1 when it
    /// is one page to the right.
    pub fn page_progress(&self, page: usize) -> f64 {
        if self.page_width <= 0. {
            return 0.;
        }

        let progress = (self.offset() - self.page_offset(page)) / self.page_width;
        progress.clamp(-1., 1.)
    }

    /// Page whose rest position is nearest to `offset`, rounding half pages up.
    pub fn nearest_page(&self, offset: f64) -> usize {
        if self.page_count == 0 || self.page_width <= 0. {
            return 0;
        }

        let page = (offset / self.page_width + 0.5).floor();
        page.clamp(0., (self.page_count - 1) as f64) as usize
    }

    /// Updates the number of pages, keeping the current page where possible.
    pub fn set_page_count(&mut self, page_count: usize) {
        self.page_count = page_count;
        let last = page_count.saturating_sub(1);
        self.current_page = self.current_page.min(last);
        if let Some(target) = &mut self.snap_target {
            *target = (*target).min(last);
        }

        if self.offset.is_static() {
            self.offset = AnimatedValue::Static(self.page_offset(self.current_page));
        }
    }

    pub fn set_page_width(&mut self, page_width: f64) {
        let page = self.target_page();
        self.page_width = page_width;
        self.offset = AnimatedValue::Static(self.page_offset(page));
        self.current_page = page;
        self.snap_target = None;
    }

    /// Jumps to a page without animating.
    pub fn set_current_page(&mut self, page: usize) {
        if self.page_count == 0 {
            return;
        }

        let page = page.min(self.page_count - 1);
        self.current_page = page;
        self.snap_target = None;
        self.fling_velocity = 0.;
        self.offset = AnimatedValue::Static(self.page_offset(page));
    }

    pub fn snap_to_page(&mut self, page: usize) {
        self.snap_to_page_with_velocity(page, 0.);
    }

    /// Duration of a snap across `page_delta` pages with the given fling velocity.
    pub fn snap_duration(page_delta: usize, velocity: f64) -> Duration {
        let page_delta = page_delta.max(1) as u32;
        let mut duration = (SNAP_DURATION_PER_PAGE * (page_delta + 1)).as_secs_f64();

        let velocity = velocity.abs();
        if velocity > 0. {
            duration += duration
                * (duration / (velocity / BASELINE_FLING_VELOCITY))
                * FLING_VELOCITY_INFLUENCE;
        } else {
            duration += SNAP_DURATION_NO_VELOCITY.as_secs_f64();
        }

        Duration::from_secs_f64(duration)
    }

    pub fn snap_to_page_with_velocity(&mut self, page: usize, velocity: f64) {
        if self.page_count == 0 {
            return;
        }

        let page = page.min(self.page_count - 1);
        let from = self.offset();
        let to = self.page_offset(page);
        let page_delta = page.abs_diff(self.current_page);
        let duration = Self::snap_duration(page_delta, velocity);
        trace!("snapping to page {page} over {duration:?} with velocity {velocity}");

        self.snap_target = Some(page);
        self.fling_velocity = velocity;
        self.offset =
            AnimatedValue::Animation(Animation::new(self.clock.clone(), from, to, duration));
    }

    /// Finishes an ongoing snap immediately, leaving the target page at rest.
    ///
    /// Ongoing gestures are left alone.
    pub fn stop_animation(&mut self) {
        if !self.offset.is_animation_ongoing() {
            return;
        }

        let page = self.target_page();
        self.set_current_page(page);
    }

    /// Settles finished snaps. Returns `true` if the state changed.
    pub fn advance_animations(&mut self) -> bool {
        let AnimatedValue::Animation(anim) = &self.offset else {
            return false;
        };

        if !anim.is_done() {
            return true;
        }

        let page = self.target_page();
        self.set_current_page(page);
        true
    }

    /// Starts tracking the pointer. Catches an ongoing snap where it is.
    pub fn gesture_begin(&mut self, timestamp: Duration) -> bool {
        if self.page_count == 0 {
            return false;
        }

        if self.offset.is_animation_ongoing() {
            self.offset.stop();
            self.current_page = self.nearest_page(self.offset());
            self.snap_target = None;
            self.fling_velocity = 0.;
        }

        self.offset = AnimatedValue::Gesture(ViewGesture::new(self.offset(), timestamp));
        true
    }

    /// Moves the canvas with the pointer. `delta_x` is the pointer travel since the last update.
    ///
    /// Returns `None` if there is no ongoing gesture.
    pub fn gesture_update(&mut self, delta_x: f64, timestamp: Duration) -> Option<bool> {
        let max = self.max_offset();
        let curve = self.overscroll_curve();

        let AnimatedValue::Gesture(gesture) = &mut self.offset else {
            return None;
        };

        gesture.tracker.push(delta_x, timestamp);

        let new = curve.clamp(0., max, gesture.raw_value());
        if new == gesture.current_value {
            return Some(false);
        }

        gesture.current_value = new;
        Some(true)
    }

    /// Releases the pointer and snaps to the resulting page.
    ///
    /// Returns the page being snapped to, or `None` if there is no ongoing gesture.
    pub fn gesture_end(&mut self, timestamp: Duration) -> Option<usize> {
        let AnimatedValue::Gesture(gesture) = &mut self.offset else {
            return None;
        };

        // Take into account any idle time between the last event and the release.
        gesture.tracker.push(0., timestamp);
        let velocity = gesture.tracker.velocity();
        let current = gesture.current_value;

        let target = if velocity.abs() > self.options.snap_velocity {
            if velocity > 0. {
                self.current_page.saturating_sub(1)
            } else {
                (self.current_page + 1).min(self.page_count - 1)
            }
        } else {
            self.nearest_page(current)
        };

        trace!("fling with velocity {velocity} from page {}", self.current_page);
        self.snap_to_page_with_velocity(target, velocity);
        Some(target)
    }

    /// Abandons the gesture and returns to the current page.
    pub fn gesture_cancel(&mut self) {
        if self.offset.is_gesture() {
            self.snap_to_page(self.current_page);
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const WIDTH: f64 = 1000.;

    fn options() -> ScrollOptions {
        ScrollOptions {
            snap_velocity: 600.,
            overscroll: OverscrollPolicy::Damped,
            overscroll_damp_factor: 0.2,
        }
    }

    fn controller(pages: usize, current: usize) -> (ScrollController, Clock) {
        let clock = Clock::with_time(Duration::ZERO);
        let scroll = ScrollController::new(pages, WIDTH, current, options(), clock.clone());
        (scroll, clock)
    }

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    fn settle(scroll: &mut ScrollController, clock: &Clock) {
        clock.advance(Duration::from_secs(10));
        scroll.advance_animations();
    }

    #[test]
    fn progress_at_rest() {
        let (scroll, _) = controller(5, 2);
        assert_eq!(scroll.page_progress(2), 0.);
        assert_abs_diff_eq!(scroll.page_progress(1), 1.);
        assert_abs_diff_eq!(scroll.page_progress(3), -1.);
        assert_eq!(scroll.page_progress(0), 1.);
        assert_eq!(scroll.page_progress(4), -1.);
    }

    #[test]
    fn progress_mid_scroll() {
        let (mut scroll, _) = controller(5, 2);
        scroll.gesture_begin(ms(0));
        scroll.gesture_update(250., ms(16));
        assert_abs_diff_eq!(scroll.offset(), 1750.);
        assert_abs_diff_eq!(scroll.page_progress(2), -0.25);
        assert_abs_diff_eq!(scroll.page_progress(1), 0.75);
    }

    #[test]
    fn fast_positive_fling_goes_to_lower_page() {
        let (mut scroll, clock) = controller(5, 2);
        scroll.gesture_begin(ms(0));
        // 80 units over 100 ms: 800 units/s to the right.
        for i in 1..=10 {
            scroll.gesture_update(8., ms(i * 10));
        }
        assert_abs_diff_eq!(scroll.state().velocity, 800., epsilon = 1e-6);

        assert_eq!(scroll.gesture_end(ms(100)), Some(1));
        assert_eq!(scroll.state().next_page, Some(1));

        settle(&mut scroll, &clock);
        let state = scroll.state();
        assert_eq!(state.current_page, 1);
        assert_eq!(state.next_page, None);
        assert_eq!(state.offset, 1000.);
        assert_eq!(state.velocity, 0.);
    }

    #[test]
    fn fast_negative_fling_goes_to_higher_page() {
        let (mut scroll, clock) = controller(5, 2);
        scroll.gesture_begin(ms(0));
        for i in 1..=10 {
            scroll.gesture_update(-8., ms(i * 10));
        }
        assert_eq!(scroll.gesture_end(ms(100)), Some(3));
        settle(&mut scroll, &clock);
        assert_eq!(scroll.current_page(), 3);
    }

    #[test]
    fn slow_release_snaps_to_nearest() {
        let (mut scroll, clock) = controller(5, 2);
        scroll.gesture_begin(ms(0));
        // 600 units over 2 s is well below the fling threshold.
        for i in 1..=20 {
            scroll.gesture_update(30., ms(i * 100));
        }
        assert_abs_diff_eq!(scroll.offset(), 1400.);
        assert_eq!(scroll.gesture_end(ms(2000)), Some(1));
        settle(&mut scroll, &clock);
        assert_eq!(scroll.current_page(), 1);

        scroll.gesture_begin(ms(3000));
        scroll.gesture_update(-400., ms(4500));
        assert_eq!(scroll.gesture_end(ms(5000)), Some(1));
    }

    #[test]
    fn fling_is_clamped_at_edges() {
        let (mut scroll, _) = controller(3, 0);
        scroll.gesture_begin(ms(0));
        for i in 1..=10 {
            scroll.gesture_update(20., ms(i * 10));
        }
        assert_eq!(scroll.gesture_end(ms(100)), Some(0));
    }

    #[test]
    fn overscroll_is_damped_and_bounded() {
        let (mut scroll, _) = controller(3, 0);
        scroll.gesture_begin(ms(0));
        scroll.gesture_update(500., ms(100));
        let state = scroll.state();
        assert!(state.overscroll < 0.);
        assert!(state.overscroll > -500.);

        scroll.gesture_update(5000., ms(200));
        assert_abs_diff_eq!(scroll.state().overscroll, -200., epsilon = 1e-9);
    }

    #[test]
    fn accelerated_overscroll_goes_further() {
        let (mut scroll, _) = controller(3, 2);
        scroll.set_options(ScrollOptions {
            overscroll: OverscrollPolicy::Accelerated,
            ..options()
        });
        scroll.gesture_begin(ms(0));
        scroll.gesture_update(-300., ms(100));
        assert_abs_diff_eq!(scroll.state().overscroll, 600., epsilon = 1e-9);
    }

    #[test]
    fn single_page_only_overscrolls() {
        let (mut scroll, clock) = controller(1, 0);
        scroll.gesture_begin(ms(0));
        scroll.gesture_update(300., ms(100));
        let left = scroll.offset();
        scroll.gesture_update(-600., ms(200));
        let right = scroll.offset();
        assert!(left < 0.);
        assert_abs_diff_eq!(left, -right);

        scroll.gesture_end(ms(1000));
        settle(&mut scroll, &clock);
        assert_eq!(scroll.offset(), 0.);
        assert_eq!(scroll.current_page(), 0);
    }

    #[test]
    fn zero_pages_is_noop() {
        let (mut scroll, _) = controller(0, 0);
        assert!(!scroll.gesture_begin(ms(0)));
        assert_eq!(scroll.gesture_update(10., ms(10)), None);
        assert_eq!(scroll.gesture_end(ms(20)), None);
        scroll.snap_to_page(3);
        assert!(!scroll.is_animating());
        assert_eq!(scroll.offset(), 0.);
    }

    #[test]
    fn snap_duration_formula() {
        // (1 + 1) * 100 ms, plus the flat 100 ms without velocity.
        assert_eq!(ScrollController::snap_duration(1, 0.), ms(300));
        // Same page counts as one page of distance.
        assert_eq!(ScrollController::snap_duration(0, 0.), ms(300));
        // d = 0.3 s; d += d * (d / (2500 / 2500)) * 0.4.
        let d = ScrollController::snap_duration(2, 2500.).as_secs_f64();
        assert_abs_diff_eq!(d, 0.3 + 0.3 * 0.3 * 0.4, epsilon = 1e-6);
        // Direction does not matter.
        assert_eq!(
            ScrollController::snap_duration(1, -800.),
            ScrollController::snap_duration(1, 800.)
        );
    }

    #[test]
    fn snap_animates_monotonically() {
        let (mut scroll, clock) = controller(5, 0);
        scroll.snap_to_page(3);
        assert!(scroll.is_animating());
        assert_eq!(scroll.state().next_page, Some(3));

        let mut prev = scroll.offset();
        for _ in 0..40 {
            clock.advance(ms(16));
            scroll.advance_animations();
            let offset = scroll.offset();
            assert!(offset >= prev);
            prev = offset;
        }
        assert_eq!(scroll.offset(), 3000.);
        assert_eq!(scroll.current_page(), 3);
        assert!(!scroll.is_animating());
    }

    #[test]
    fn stop_animation_lands_on_target() {
        let (mut scroll, clock) = controller(5, 0);
        scroll.snap_to_page(2);
        clock.advance(ms(50));
        scroll.stop_animation();
        assert!(!scroll.is_animating());
        assert_eq!(scroll.current_page(), 2);
        assert_eq!(scroll.offset(), 2000.);
    }

    #[test]
    fn gesture_catches_running_snap() {
        let (mut scroll, clock) = controller(5, 0);
        scroll.snap_to_page(4);
        clock.advance(ms(100));
        let caught = scroll.offset();
        assert!(caught > 0. && caught < 4000.);

        scroll.gesture_begin(ms(100));
        assert!(scroll.is_gesture());
        assert_eq!(scroll.offset(), caught);
        assert_eq!(scroll.current_page(), scroll.nearest_page(caught));
    }

    #[test]
    fn page_count_change_clamps_current_page() {
        let (mut scroll, _) = controller(5, 4);
        scroll.set_page_count(3);
        assert_eq!(scroll.current_page(), 2);
        assert_eq!(scroll.offset(), 2000.);
    }
}
