//! Storage for the scroll offset, which is either at rest, snapping, or following the pointer.

use crate::animation::Animation;

mod gesture;
pub use gesture::ViewGesture;

#[derive(Debug, Clone)]
pub enum AnimatedValue {
    Static(f64),
    /// Snapping toward a page.
    Animation(Animation),
    /// Following a pointer drag.
    Gesture(ViewGesture),
}

impl AnimatedValue {
    pub fn new(value: f64) -> Self {
        Self::Static(value)
    }

    pub fn current(&self) -> f64 {
        match self {
            Self::Static(value) => *value,
            Self::Animation(anim) => anim.value(),
            Self::Gesture(gesture) => gesture.current_value,
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }

    pub fn is_gesture(&self) -> bool {
        matches!(self, Self::Gesture(_))
    }

    pub fn is_animation_ongoing(&self) -> bool {
        matches!(self, Self::Animation(_))
    }

    /// Freezes the value where it is right now.
    pub fn stop(&mut self) {
        *self = Self::Static(self.current());
    }
}
