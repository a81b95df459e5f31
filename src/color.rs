//! CSS color values for `lighting-color` and `flood-color`.

use cssparser::Parser;

use crate::error::*;
use crate::parsers::Parse;
use crate::surface_utils::Pixel;

pub use cssparser::{Color, RGBA};

impl Parse for cssparser::Color {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<cssparser::Color, ParseError<'i>> {
        Ok(cssparser::Color::parse(parser)?)
    }
}

impl Parse for cssparser::RGBA {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<cssparser::RGBA, ParseError<'i>> {
        let loc = parser.current_source_location();

        match cssparser::Color::parse(parser)? {
            cssparser::Color::RGBA(rgba) => Ok(rgba),
            cssparser::Color::CurrentColor => Err(loc.new_custom_error(ValueErrorKind::Value(
                "currentColor is not allowed here".to_string(),
            ))),
        }
    }
}

/// Resolves `currentColor` against the given color.
pub fn resolve_color(color: &Color, current_color: RGBA) -> RGBA {
    match *color {
        Color::RGBA(rgba) => rgba,
        Color::CurrentColor => current_color,
    }
}

/// Converts a color to an unpremultiplied pixel, with its alpha scaled by `opacity`.
pub fn color_to_pixel(rgba: RGBA, opacity: f64) -> Pixel {
    let alpha = (f64::from(rgba.alpha) * opacity.clamp(0.0, 1.0) + 0.5) as u8;

    Pixel {
        r: rgba.red,
        g: rgba.green,
        b: rgba.blue,
        a: alpha,
    }
}
