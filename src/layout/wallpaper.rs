//! Smoothed wallpaper offset following the scroll position.
//!
//! Offsets are normalized: 0 shows the left edge of the wallpaper and 1 the right edge. The
//! interpolator eases toward the final offset frame by frame, speeding up when it falls far
//! behind.

use std::time::Duration;

/// Reference frame time the catch-up factors are tuned for, in milliseconds.
const FRAME_MS: f64 = 33.;

/// Catch-up factors per reference frame.
const PORTRAIT: f64 = 0.5;
const LANDSCAPE: f64 = 0.27;
const PORTRAIT_FAST: f64 = 0.75;
const LANDSCAPE_FAST: f64 = 0.5;

/// Distance from the final offset above which the interpolator switches to the fast factors.
const FAST_THRESHOLD: f64 = 0.07;

/// Distance from the final offset below which the interpolator jumps to it.
const SETTLE_THRESHOLD: f64 = 1e-5;

const CENTERED: f64 = 0.5;

#[derive(Debug)]
pub struct WallpaperOffsetInterpolator {
    current_x: f64,
    final_x: f64,
    current_y: f64,
    final_y: f64,
    /// Latched once the horizontal offset falls far behind, until it settles.
    moving_fast: bool,
    last_update: Option<Duration>,
    landscape: bool,
    /// Keeps the wallpaper centred regardless of scrolling.
    fixed: bool,
}

impl WallpaperOffsetInterpolator {
    pub fn new(landscape: bool, fixed: bool) -> Self {
        Self {
            current_x: CENTERED,
            final_x: CENTERED,
            current_y: CENTERED,
            final_y: CENTERED,
            moving_fast: false,
            last_update: None,
            landscape,
            fixed,
        }
    }

    pub fn current(&self) -> (f64, f64) {
        (self.current_x, self.current_y)
    }

    pub fn final_offset(&self) -> (f64, f64) {
        (self.final_x, self.final_y)
    }

    pub fn is_moving_fast(&self) -> bool {
        self.moving_fast
    }

    pub fn set_landscape(&mut self, landscape: bool) {
        self.landscape = landscape;
    }

    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
    }

    /// Horizontal offset for a scroll position.
    pub fn offset_for_scroll(&self, scroll_offset: f64, page_count: usize, page_width: f64) -> f64 {
        let range = page_count.saturating_sub(1) as f64 * page_width;
        if self.fixed || range <= 0. {
            return CENTERED;
        }

        (scroll_offset / range).clamp(0., 1.)
    }

    pub fn sync_to_scroll(&mut self, scroll_offset: f64, page_count: usize, page_width: f64) {
        self.final_x = self.offset_for_scroll(scroll_offset, page_count, page_width);
    }

    /// Jumps to the final offset.
    pub fn jump_to_final(&mut self) {
        self.current_x = self.final_x;
        self.current_y = self.final_y;
        self.moving_fast = false;
    }

    /// Moves the current offset toward the final one. Returns `true` if anything changed.
    pub fn advance(&mut self, now: Duration) -> bool {
        let dt = match self.last_update {
            Some(last) => now.saturating_sub(last).as_secs_f64() * 1000.,
            None => FRAME_MS,
        };
        let dt = dt.clamp(1., FRAME_MS);
        self.last_update = Some(now);

        let diff_x = self.final_x - self.current_x;
        if diff_x.abs() > FAST_THRESHOLD {
            self.moving_fast = true;
        }

        let (normal, fast) = if self.landscape {
            (LANDSCAPE, LANDSCAPE_FAST)
        } else {
            (PORTRAIT, PORTRAIT_FAST)
        };
        let k_x = if self.moving_fast { fast } else { normal };

        let (x, changed_x) = step(self.current_x, self.final_x, dt, k_x);
        let (y, changed_y) = step(self.current_y, self.final_y, dt, normal);
        self.current_x = x;
        self.current_y = y;

        if x == self.final_x {
            self.moving_fast = false;
        }

        changed_x || changed_y
    }
}

fn step(current: f64, target: f64, dt: f64, k: f64) -> (f64, bool) {
    let diff = target - current;
    if diff == 0. {
        return (current, false);
    }
    if diff.abs() < SETTLE_THRESHOLD {
        return (target, true);
    }

    let fraction = (dt * k / FRAME_MS).min(1.);
    (current + diff * fraction, true)
}
