//! Per-page visual transforms driven by scroll progress.

use deckgrid_config::TransitionEffect;
use serde::Serialize;

use super::page::PageId;
use crate::utils::Size;

mod effects;
mod interpolators;

/// Rotation around the y axis applied to the edge page when overscrolling, in degrees per unit
/// of progress.
const OVERSCROLL_ROTATION: f64 = -24.;

/// Horizontal pivot of the overscroll rotation, as a fraction of the page width.
const OVERSCROLL_PIVOT_LEFT: f64 = 0.75;
const OVERSCROLL_PIVOT_RIGHT: f64 = 0.25;

/// Distance of the camera for 3D rotations, in multiples of the larger page dimension.
const CAMERA_DISTANCE_FACTOR: f64 = 8.;

/// Visual transform of one page. Rotations are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageTransform {
    pub translation_x: f64,
    pub translation_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
    pub rotation_x: f64,
    pub rotation_y: f64,
    pub pivot_x: f64,
    pub pivot_y: f64,
    pub alpha: f64,
    pub camera_distance: f64,
}

impl PageTransform {
    /// Transform that leaves the page untouched.
    pub fn identity(size: Size) -> Self {
        Self {
            translation_x: 0.,
            translation_y: 0.,
            scale_x: 1.,
            scale_y: 1.,
            rotation: 0.,
            rotation_x: 0.,
            rotation_y: 0.,
            pivot_x: size.w / 2.,
            pivot_y: size.h / 2.,
            alpha: 1.,
            camera_distance: size.w.max(size.h) * CAMERA_DISTANCE_FACTOR,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.alpha > 0.
    }
}

/// Receives page transforms. Implemented by whatever draws the pages.
pub trait PageRenderer {
    fn apply_transform(&mut self, page: PageId, transform: &PageTransform);

    /// Asks for the page to be redrawn.
    fn invalidate(&mut self, page: PageId);
}

/// The active page transition effect.
#[derive(Debug)]
pub struct TransformStrategy {
    effect: TransitionEffect,
    rng: fastrand::Rng,
}

impl TransformStrategy {
    pub fn new(effect: TransitionEffect) -> Self {
        Self {
            effect,
            rng: fastrand::Rng::new(),
        }
    }

    /// Strategy with a fixed random seed, for reproducible [`TransitionEffect::Random`] runs.
    pub fn with_seed(effect: TransitionEffect, seed: u64) -> Self {
        Self {
            effect,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn effect(&self) -> TransitionEffect {
        self.effect
    }

    pub fn set_effect(&mut self, effect: TransitionEffect) {
        self.effect = effect;
    }

    /// Transform for a page at `progress`: 0 when centred, +1 one page to the left of the
    /// viewport, -1 one page to the right.
    pub fn apply(&mut self, progress: f64, size: Size) -> PageTransform {
        let progress = progress.clamp(-1., 1.);
        let effect = match self.effect {
            TransitionEffect::Random => {
                TransitionEffect::CONCRETE[self.rng.usize(..TransitionEffect::CONCRETE.len())]
            }
            effect => effect,
        };

        effects::apply(effect, progress, size)
    }

    /// Transform for the first page when scrolled past it.
    pub fn apply_left_overscroll(&self, progress: f64, size: Size) -> PageTransform {
        overscroll(progress, size, OVERSCROLL_PIVOT_LEFT)
    }

    /// Transform for the last page when scrolled past it.
    pub fn apply_right_overscroll(&self, progress: f64, size: Size) -> PageTransform {
        overscroll(progress, size, OVERSCROLL_PIVOT_RIGHT)
    }

    pub fn reset(&self, size: Size) -> PageTransform {
        PageTransform::identity(size)
    }
}

fn overscroll(progress: f64, size: Size, pivot: f64) -> PageTransform {
    PageTransform {
        rotation_y: OVERSCROLL_ROTATION * progress.clamp(-1., 1.),
        pivot_x: size.w * pivot,
        ..PageTransform::identity(size)
    }
}
