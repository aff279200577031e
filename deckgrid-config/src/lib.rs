//! Configuration for the deckgrid engine.
//!
//! The config file is KDL. Every node is optional, so an empty file yields [`Config::default()`].
//!
//! ```kdl
//! grid {
//!     columns 4
//!     rows 5
//! }
//!
//! pages {
//!     count 5
//!     default-page 2
//! }
//!
//! scroll {
//!     snap-velocity 600
//!     overscroll "accelerated"
//! }
//!
//! transition-effect "cube-out"
//! ```

use std::ffi::OsStr;
use std::path::Path;

use knuffel::errors::DecodeError;
use miette::{Context, IntoDiagnostic};
use tracing::{debug, warn};

mod effect;

pub use effect::{OverscrollPolicy, TransitionEffect};

#[derive(knuffel::Decode, Debug, Default, Clone, PartialEq)]
pub struct Config {
    #[knuffel(child, default)]
    pub grid: Grid,
    #[knuffel(child, default)]
    pub pages: Pages,
    #[knuffel(child, default)]
    pub geometry: Geometry,
    #[knuffel(child, default)]
    pub scroll: Scroll,
    #[knuffel(child, default)]
    pub drag: Drag,
    #[knuffel(child, unwrap(argument, str), default)]
    pub transition_effect: TransitionEffect,
    #[knuffel(child)]
    pub fade_adjacent_pages: bool,
    #[knuffel(child, default)]
    pub wallpaper: Wallpaper,
}

#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    #[knuffel(child, unwrap(argument), default = 4)]
    pub columns: u16,
    #[knuffel(child, unwrap(argument), default = 4)]
    pub rows: u16,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            columns: 4,
            rows: 4,
        }
    }
}

#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pages {
    #[knuffel(child, unwrap(argument), default = 5)]
    pub count: u16,
    #[knuffel(child, unwrap(argument), default = 2)]
    pub default_page: u16,
    #[knuffel(child, unwrap(argument), default = 9)]
    pub max_pages: u16,
}

impl Default for Pages {
    fn default() -> Self {
        Self {
            count: 5,
            default_page: 2,
            max_pages: 9,
        }
    }
}

/// Size of one page in logical units.
#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    #[knuffel(child, unwrap(argument), default = FloatOrInt(1080.))]
    pub page_width: FloatOrInt<1, 65535>,
    #[knuffel(child, unwrap(argument), default = FloatOrInt(1920.))]
    pub page_height: FloatOrInt<1, 65535>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            page_width: FloatOrInt(1080.),
            page_height: FloatOrInt(1920.),
        }
    }
}

/// Range of `scroll.overscroll-damp-factor`.
pub const OVERSCROLL_DAMP_FACTOR_MIN: f64 = 0.15;
pub const OVERSCROLL_DAMP_FACTOR_MAX: f64 = 0.3;

#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq)]
pub struct Scroll {
    /// Release velocity, in units per second, above which a fling moves to the adjacent page.
    #[knuffel(child, unwrap(argument), default = FloatOrInt(600.))]
    pub snap_velocity: FloatOrInt<0, 100000>,
    #[knuffel(child, unwrap(argument, str), default)]
    pub overscroll: OverscrollPolicy,
    /// Maximum damped overscroll as a fraction of the page width. Clamped to 0.15..=0.3.
    #[knuffel(child, unwrap(argument), default = FloatOrInt(0.2))]
    pub overscroll_damp_factor: FloatOrInt<0, 1>,
    /// Distance the pointer must travel before a scroll gesture begins.
    #[knuffel(child, unwrap(argument), default = FloatOrInt(8.))]
    pub touch_slop: FloatOrInt<0, 1000>,
}

impl Default for Scroll {
    fn default() -> Self {
        Self {
            snap_velocity: FloatOrInt(600.),
            overscroll: OverscrollPolicy::default(),
            overscroll_damp_factor: FloatOrInt(0.2),
            touch_slop: FloatOrInt(8.),
        }
    }
}

#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    #[knuffel(child, unwrap(argument), default = 250)]
    pub folder_creation_delay_ms: u32,
    #[knuffel(child, unwrap(argument), default = 500)]
    pub page_hover_delay_ms: u32,
    /// Width of the strips at the left and right viewport edges that switch pages on hover.
    #[knuffel(child, unwrap(argument), default = FloatOrInt(20.))]
    pub edge_scroll_zone: FloatOrInt<0, 1000>,
    #[knuffel(child, unwrap(argument), default = 16)]
    pub folder_capacity: u16,
    /// How much two pointers must close in before the pinch opens the page preview.
    #[knuffel(child, unwrap(argument), default = FloatOrInt(50.))]
    pub pinch_slop: FloatOrInt<0, 10000>,
}

impl Default for Drag {
    fn default() -> Self {
        Self {
            folder_creation_delay_ms: 250,
            page_hover_delay_ms: 500,
            edge_scroll_zone: FloatOrInt(20.),
            folder_capacity: 16,
            pinch_slop: FloatOrInt(50.),
        }
    }
}

#[derive(knuffel::Decode, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Wallpaper {
    /// Keep the wallpaper centered instead of following the scroll position.
    #[knuffel(child)]
    pub fixed: bool,
}

/// A number that accepts both integer and decimal literals, bounded to `MIN..=MAX`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FloatOrInt<const MIN: i32, const MAX: i32>(pub f64);

impl Config {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {path:?}"))?;

        let config = Self::parse(
            path.file_name()
                .and_then(OsStr::to_str)
                .unwrap_or("config.kdl"),
            &contents,
        )
        .context("error parsing")?;
        debug!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(filename: &str, text: &str) -> Result<Self, knuffel::Error> {
        let mut config: Self = knuffel::parse(filename, text)?;
        config.sanitize();
        Ok(config)
    }

    /// Brings values that depend on each other into a consistent state.
    fn sanitize(&mut self) {
        let grid = &mut self.grid;
        if grid.columns == 0 || grid.rows == 0 {
            warn!("grid must have at least one column and one row");
            grid.columns = grid.columns.max(1);
            grid.rows = grid.rows.max(1);
        }

        let pages = &mut self.pages;
        if pages.max_pages == 0 {
            warn!("pages.max-pages must be at least 1");
            pages.max_pages = 1;
        }
        if pages.count == 0 || pages.count > pages.max_pages {
            warn!(
                "pages.count {} is outside 1..={}, clamping",
                pages.count, pages.max_pages
            );
            pages.count = pages.count.clamp(1, pages.max_pages);
        }
        if pages.default_page >= pages.count {
            warn!(
                "pages.default-page {} is past the last page, clamping",
                pages.default_page
            );
            pages.default_page = pages.count - 1;
        }

        let damp = &mut self.scroll.overscroll_damp_factor;
        if !(OVERSCROLL_DAMP_FACTOR_MIN..=OVERSCROLL_DAMP_FACTOR_MAX).contains(&damp.0) {
            warn!(
                "scroll.overscroll-damp-factor {} is outside {OVERSCROLL_DAMP_FACTOR_MIN}..={OVERSCROLL_DAMP_FACTOR_MAX}, clamping",
                damp.0
            );
            damp.0 = damp
                .0
                .clamp(OVERSCROLL_DAMP_FACTOR_MIN, OVERSCROLL_DAMP_FACTOR_MAX);
        }
    }
}

impl<S: knuffel::traits::ErrorSpan, const MIN: i32, const MAX: i32> knuffel::DecodeScalar<S>
    for FloatOrInt<MIN, MAX>
{
    fn type_check(
        type_name: &Option<knuffel::span::Spanned<knuffel::ast::TypeName, S>>,
        ctx: &mut knuffel::decode::Context<S>,
    ) {
        if let Some(type_name) = &type_name {
            ctx.emit_error(DecodeError::unexpected(
                type_name,
                "type name",
                "no type name expected for this node",
            ));
        }
    }

    fn raw_decode(
        val: &knuffel::span::Spanned<knuffel::ast::Literal, S>,
        ctx: &mut knuffel::decode::Context<S>,
    ) -> Result<Self, DecodeError<S>> {
        match &**val {
            knuffel::ast::Literal::Int(ref value) => match value.try_into() {
                Ok(v) => {
                    let v: i32 = v;
                    if (MIN..=MAX).contains(&v) {
                        Ok(FloatOrInt(f64::from(v)))
                    } else {
                        ctx.emit_error(DecodeError::conversion(
                            val,
                            format!("value must be between {MIN} and {MAX}"),
                        ));
                        Ok(FloatOrInt::default())
                    }
                }
                Err(e) => {
                    ctx.emit_error(DecodeError::conversion(val, e));
                    Ok(FloatOrInt::default())
                }
            },
            knuffel::ast::Literal::Decimal(ref value) => match value.try_into() {
                Ok(v) => {
                    let v: f64 = v;
                    if (f64::from(MIN)..=f64::from(MAX)).contains(&v) {
                        Ok(FloatOrInt(v))
                    } else {
                        ctx.emit_error(DecodeError::conversion(
                            val,
                            format!("value must be between {MIN} and {MAX}"),
                        ));
                        Ok(FloatOrInt::default())
                    }
                }
                Err(e) => {
                    ctx.emit_error(DecodeError::conversion(val, e));
                    Ok(FloatOrInt::default())
                }
            },
            _ => {
                ctx.emit_error(DecodeError::unsupported(
                    val,
                    "Unsupported value, only numbers are recognized",
                ));
                Ok(FloatOrInt::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[track_caller]
    fn do_parse(text: &str) -> Config {
        Config::parse("test.kdl", text)
            .map_err(miette::Report::new)
            .unwrap()
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(do_parse(""), Config::default());
    }

    #[test]
    fn parse_full() {
        let parsed = do_parse(
            r#"
            grid {
                columns 5
                rows 6
            }

            pages {
                count 3
                default-page 1
                max-pages 7
            }

            geometry {
                page-width 720
                page-height 1280.5
            }

            scroll {
                snap-velocity 800
                overscroll "accelerated"
                overscroll-damp-factor 0.25
                touch-slop 12
            }

            drag {
                folder-creation-delay-ms 300
                page-hover-delay-ms 600
                edge-scroll-zone 32
                folder-capacity 12
                pinch-slop 40.5
            }

            transition-effect "cylinder-out"
            fade-adjacent-pages

            wallpaper {
                fixed
            }
            "#,
        );

        assert_eq!(
            parsed,
            Config {
                grid: Grid {
                    columns: 5,
                    rows: 6,
                },
                pages: Pages {
                    count: 3,
                    default_page: 1,
                    max_pages: 7,
                },
                geometry: Geometry {
                    page_width: FloatOrInt(720.),
                    page_height: FloatOrInt(1280.5),
                },
                scroll: Scroll {
                    snap_velocity: FloatOrInt(800.),
                    overscroll: OverscrollPolicy::Accelerated,
                    overscroll_damp_factor: FloatOrInt(0.25),
                    touch_slop: FloatOrInt(12.),
                },
                drag: Drag {
                    folder_creation_delay_ms: 300,
                    page_hover_delay_ms: 600,
                    edge_scroll_zone: FloatOrInt(32.),
                    folder_capacity: 12,
                    pinch_slop: FloatOrInt(40.5),
                },
                transition_effect: TransitionEffect::CylinderOut,
                fade_adjacent_pages: true,
                wallpaper: Wallpaper { fixed: true },
            }
        );
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let parsed = do_parse(
            r#"
            scroll {
                snap-velocity 900
            }
            "#,
        );

        assert_eq!(parsed.scroll.snap_velocity, FloatOrInt(900.));
        assert_eq!(parsed.scroll.overscroll, OverscrollPolicy::Damped);
        assert_eq!(parsed.scroll.touch_slop, FloatOrInt(8.));
        assert_eq!(parsed.grid, Grid::default());
    }

    #[test]
    fn default_page_is_clamped_to_count() {
        let parsed = do_parse(
            r#"
            pages {
                count 3
                default-page 8
            }
            "#,
        );

        assert_eq!(parsed.pages.count, 3);
        assert_eq!(parsed.pages.default_page, 2);
    }

    #[test]
    fn page_count_is_clamped_to_max() {
        let parsed = do_parse(
            r#"
            pages {
                count 12
                max-pages 4
                default-page 0
            }
            "#,
        );

        assert_eq!(parsed.pages.count, 4);
    }

    #[test]
    fn overscroll_damp_factor_is_clamped() {
        let parse = |value: &str| {
            let text = format!("scroll {{ overscroll-damp-factor {value}; }}");
            do_parse(&text).scroll.overscroll_damp_factor
        };

        assert_eq!(parse("1"), FloatOrInt(OVERSCROLL_DAMP_FACTOR_MAX));
        assert_eq!(parse("0.1"), FloatOrInt(OVERSCROLL_DAMP_FACTOR_MIN));
        assert_eq!(parse("0.3"), FloatOrInt(0.3));
    }

    #[test]
    fn invalid_effect_is_an_error() {
        assert!(Config::parse("test.kdl", r#"transition-effect "wobble""#).is_err());
    }

    #[test]
    fn out_of_range_number_is_an_error() {
        let text = r#"
            scroll {
                overscroll-damp-factor 3
            }
        "#;
        assert!(Config::parse("test.kdl", text).is_err());
    }

    #[test]
    fn string_where_number_expected_is_an_error() {
        let text = r#"
            geometry {
                page-width "wide"
            }
        "#;
        assert!(Config::parse("test.kdl", text).is_err());
    }
}
