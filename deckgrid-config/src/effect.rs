use std::str::FromStr;

use miette::miette;

/// Visual effect applied to pages while scrolling.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionEffect {
    #[default]
    Standard,
    Tablet,
    ZoomIn,
    ZoomOut,
    RotateUp,
    RotateDown,
    CubeIn,
    CubeOut,
    Stack,
    Accordion,
    Flip,
    CylinderIn,
    CylinderOut,
    Carousel,
    /// Picks one of the other effects at random on every invocation.
    Random,
}

impl TransitionEffect {
    /// All concrete effects, excluding [`TransitionEffect::Random`].
    pub const CONCRETE: [TransitionEffect; 14] = [
        TransitionEffect::Standard,
        TransitionEffect::Tablet,
        TransitionEffect::ZoomIn,
        TransitionEffect::ZoomOut,
        TransitionEffect::RotateUp,
        TransitionEffect::RotateDown,
        TransitionEffect::CubeIn,
        TransitionEffect::CubeOut,
        TransitionEffect::Stack,
        TransitionEffect::Accordion,
        TransitionEffect::Flip,
        TransitionEffect::CylinderIn,
        TransitionEffect::CylinderOut,
        TransitionEffect::Carousel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TransitionEffect::Standard => "standard",
            TransitionEffect::Tablet => "tablet",
            TransitionEffect::ZoomIn => "zoom-in",
            TransitionEffect::ZoomOut => "zoom-out",
            TransitionEffect::RotateUp => "rotate-up",
            TransitionEffect::RotateDown => "rotate-down",
            TransitionEffect::CubeIn => "cube-in",
            TransitionEffect::CubeOut => "cube-out",
            TransitionEffect::Stack => "stack",
            TransitionEffect::Accordion => "accordion",
            TransitionEffect::Flip => "flip",
            TransitionEffect::CylinderIn => "cylinder-in",
            TransitionEffect::CylinderOut => "cylinder-out",
            TransitionEffect::Carousel => "carousel",
            TransitionEffect::Random => "random",
        }
    }
}

impl FromStr for TransitionEffect {
    type Err = miette::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "random" {
            return Ok(TransitionEffect::Random);
        }

        TransitionEffect::CONCRETE
            .into_iter()
            .find(|effect| effect.name() == s)
            .ok_or_else(|| {
                miette!(
                    "invalid transition effect {s:?}, can be \"random\" or one of: {}",
                    TransitionEffect::CONCRETE.map(TransitionEffect::name).join(", ")
                )
            })
    }
}

/// How the canvas behaves when scrolled past the first or the last page.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OverscrollPolicy {
    /// Bounded sine-shaped resistance, suited to large layouts.
    #[default]
    Damped,
    /// Linear acceleration up to a full page, suited to compact layouts.
    Accelerated,
}

impl FromStr for OverscrollPolicy {
    type Err = miette::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "damped" => Ok(Self::Damped),
            "accelerated" => Ok(Self::Accelerated),
            _ => Err(miette!(
                r#"invalid overscroll policy, can be "damped" or "accelerated""#
            )),
        }
    }
}
