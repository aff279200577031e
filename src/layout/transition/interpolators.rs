//! Shaping curves used by the page effects. All map `[0, 1]` onto `[0, 1]`.

/// Starts fast and slows down; larger factors exaggerate the effect.
#[derive(Debug, Clone, Copy)]
pub struct Decelerate(pub f64);

impl Decelerate {
    pub fn y(self, x: f64) -> f64 {
        1. - (1. - x.clamp(0., 1.)).powf(2. * self.0)
    }
}

/// Perspective depth: how far along the z axis an object moving at constant speed away from a
/// camera with this focal length appears to be.
#[derive(Debug, Clone, Copy)]
pub struct ZDepth {
    pub focal_length: f64,
}

impl ZDepth {
    pub fn y(self, x: f64) -> f64 {
        let f = self.focal_length;
        let z = |x: f64| 1. - f / (f + x);
        z(x.clamp(0., 1.)) / z(1.)
    }
}
