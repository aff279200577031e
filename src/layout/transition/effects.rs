use deckgrid_config::TransitionEffect;

use super::interpolators::{Decelerate, ZDepth};
use super::PageTransform;
use crate::utils::Size;

/// Tilt of the rotate and cylinder effects, in degrees.
const SCREEN_ROTATION: f64 = 12.5;

const TABLET_ROTATION: f64 = 22.;
const TABLET_OFFSET: f64 = 0.1;

const ZOOM_IN_SCALE: f64 = -0.2;
const ZOOM_OUT_SCALE: f64 = 0.1;

const STACK_MIN_SCALE: f64 = 0.74;
const STACK_DEPTH: ZDepth = ZDepth { focal_length: 0.5 };
const STACK_ALPHA: Decelerate = Decelerate(0.9);

/// Transform of a page at `progress` under a concrete effect.
///
/// `progress` is in `[-1, 1]`; positive values are pages to the left of the viewport.
pub fn apply(effect: TransitionEffect, p: f64, size: Size) -> PageTransform {
    let identity = PageTransform::identity(size);
    let (w, h) = (size.w, size.h);
    // Edge the page is attached to while it moves away.
    let attached_edge = if p < 0. { 0. } else { w };

    match effect {
        TransitionEffect::Standard | TransitionEffect::Random => identity,
        TransitionEffect::Tablet => PageTransform {
            rotation_y: -TABLET_ROTATION * p,
            translation_x: TABLET_OFFSET * w * p,
            ..identity
        },
        TransitionEffect::ZoomIn => {
            let scale = 1. + ZOOM_IN_SCALE * p.abs();
            PageTransform {
                scale_x: scale,
                scale_y: scale,
                ..identity
            }
        }
        TransitionEffect::ZoomOut => {
            let scale = 1. + ZOOM_OUT_SCALE * p.abs();
            PageTransform {
                scale_x: scale,
                scale_y: scale,
                translation_x: -ZOOM_OUT_SCALE * w * p,
                ..identity
            }
        }
        TransitionEffect::RotateUp | TransitionEffect::RotateDown => {
            let up = effect == TransitionEffect::RotateUp;
            // Distance of the rotation centre from the page so that adjacent pages touch.
            let reach = (w / 2.) / (SCREEN_ROTATION / 2.).to_radians().tan();
            PageTransform {
                rotation: if up { SCREEN_ROTATION } else { -SCREEN_ROTATION } * p,
                translation_x: w * p,
                pivot_y: if up { -reach } else { h + reach },
                ..identity
            }
        }
        TransitionEffect::CubeIn | TransitionEffect::CubeOut => PageTransform {
            rotation_y: if effect == TransitionEffect::CubeIn { 90. } else { -90. } * p,
            pivot_x: attached_edge,
            ..identity
        },
        TransitionEffect::Stack => {
            if p >= 0. {
                // Leaving pages slide off on top.
                identity
            } else {
                let depth = STACK_DEPTH.y(p.abs());
                let scale = (1. - depth) + depth * STACK_MIN_SCALE;
                PageTransform {
                    translation_x: w * p,
                    scale_x: scale,
                    scale_y: scale,
                    alpha: STACK_ALPHA.y(1. - p.abs()),
                    ..identity
                }
            }
        }
        TransitionEffect::Accordion => PageTransform {
            scale_x: 1. - p.abs(),
            pivot_x: attached_edge,
            ..identity
        },
        TransitionEffect::Flip => {
            let rotation = -180. * p;
            PageTransform {
                rotation_y: rotation,
                translation_x: w * p,
                alpha: if rotation.abs() <= 90. { 1. } else { 0. },
                ..identity
            }
        }
        TransitionEffect::CylinderIn | TransitionEffect::CylinderOut => PageTransform {
            rotation_y: if effect == TransitionEffect::CylinderIn {
                SCREEN_ROTATION
            } else {
                -SCREEN_ROTATION
            } * p,
            pivot_x: (p + 1.) * w / 2.,
            ..identity
        },
        TransitionEffect::Carousel => PageTransform {
            rotation_y: -90. * p,
            translation_x: w * p,
            pivot_x: attached_edge,
            ..identity
        },
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const SIZE: Size = Size::new(1000., 2000.);

    #[test]
    fn zoom() {
        let t = apply(TransitionEffect::ZoomIn, -0.5, SIZE);
        assert_abs_diff_eq!(t.scale_x, 0.9, epsilon = 1e-9);
        assert_abs_diff_eq!(t.translation_x, 0., epsilon = 1e-9);

        let t = apply(TransitionEffect::ZoomOut, 0.5, SIZE);
        assert_abs_diff_eq!(t.scale_y, 1.05, epsilon = 1e-9);
        assert_abs_diff_eq!(t.translation_x, -50., epsilon = 1e-9);
    }

    #[test]
    fn cube_pivots_on_shared_edge() {
        let incoming = apply(TransitionEffect::CubeIn, -0.25, SIZE);
        assert_abs_diff_eq!(incoming.rotation_y, -22.5, epsilon = 1e-9);
        assert_eq!(incoming.pivot_x, 0.);

        let outgoing = apply(TransitionEffect::CubeOut, 0.25, SIZE);
        assert_abs_diff_eq!(outgoing.rotation_y, -22.5, epsilon = 1e-9);
        assert_eq!(outgoing.pivot_x, 1000.);
    }

    #[test]
    fn flip_hides_back_face() {
        assert_eq!(apply(TransitionEffect::Flip, 0.4, SIZE).alpha, 1.);
        assert_eq!(apply(TransitionEffect::Flip, 0.6, SIZE).alpha, 0.);
        assert_eq!(apply(TransitionEffect::Flip, -0.6, SIZE).alpha, 0.);
    }

    #[test]
    fn stack_shrinks_incoming_page() {
        let mut prev = 1.;
        for i in 1..=10 {
            let t = apply(TransitionEffect::Stack, -f64::from(i) / 10., SIZE);
            assert!(t.scale_x < prev);
            assert!(t.scale_x >= STACK_MIN_SCALE - 1e-9);
            prev = t.scale_x;
        }
        let t = apply(TransitionEffect::Stack, -1., SIZE);
        assert_abs_diff_eq!(t.scale_x, STACK_MIN_SCALE, epsilon = 1e-9);
        assert_abs_diff_eq!(t.alpha, 0., epsilon = 1e-9);
        assert_abs_diff_eq!(t.translation_x, -1000., epsilon = 1e-9);

        let t = apply(TransitionEffect::Stack, 0.5, SIZE);
        assert_eq!(t.scale_x, 1.);
    }

    #[test]
    fn rotate_pivot_is_off_page() {
        let up = apply(TransitionEffect::RotateUp, 0.5, SIZE);
        let down = apply(TransitionEffect::RotateDown, 0.5, SIZE);
        assert!(up.pivot_y < 0.);
        assert!(down.pivot_y > SIZE.h);
        assert_abs_diff_eq!(up.rotation, -down.rotation, epsilon = 1e-9);
    }

    #[test]
    fn accordion_and_cylinder() {
        let t = apply(TransitionEffect::Accordion, -0.3, SIZE);
        assert_abs_diff_eq!(t.scale_x, 0.7, epsilon = 1e-9);
        assert_eq!(t.pivot_x, 0.);

        let t = apply(TransitionEffect::CylinderIn, 1., SIZE);
        assert_abs_diff_eq!(t.pivot_x, 1000., epsilon = 1e-9);
        assert_abs_diff_eq!(t.rotation_y, SCREEN_ROTATION, epsilon = 1e-9);
    }
}
