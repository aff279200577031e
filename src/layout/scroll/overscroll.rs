use std::f64::consts::FRAC_PI_2;

use deckgrid_config::OverscrollPolicy;

/// Resistance applied to scrolling past the first or the last page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overscroll {
    pub policy: OverscrollPolicy,
    /// Bound of the damped curve as a fraction of the page width.
    pub damp_factor: f64,
    pub page_width: f64,
}

impl Overscroll {
    /// Maps raw travel past the edge (non-negative) to the displayed travel.
    pub fn band(&self, raw: f64) -> f64 {
        if self.page_width <= 0. || raw <= 0. {
            return 0.;
        }

        let f = raw / self.page_width;
        match self.policy {
            OverscrollPolicy::Damped => {
                self.damp_factor * self.page_width * (f.min(1.) * FRAC_PI_2).sin()
            }
            OverscrollPolicy::Accelerated => (2. * f).min(1.) * self.page_width,
        }
    }

    /// Clamps `x` into `min..=max`, letting the part outside through [`Overscroll::band`].
    pub fn clamp(&self, min: f64, max: f64, x: f64) -> f64 {
        let clamped = x.clamp(min, max);
        let sign = if x < clamped { -1. } else { 1. };
        let diff = (x - clamped).abs();

        clamped + sign * self.band(diff)
    }
}
