//! Length values for filter regions and primitive subregions.
//!
//! [`CssLength`] is a number with a unit.  It is converted to user-space units with
//! [`CssLength::to_user`] and a [`NormalizeParams`], which carries the size of the
//! reference box that percentages resolve against.
//!
//! ```
//! # use vectorfx::length::{Horizontal, Length, LengthUnit, NormalizeParams, ULength};
//! # use vectorfx::parsers::Parse;
//! let x: Length<Horizontal> = Length::new(0.1, LengthUnit::Percent);
//! let params = NormalizeParams::new(200.0, 100.0);
//! assert_eq!(x.to_user(&params), 20.0);
//!
//! let w = ULength::<Horizontal>::parse_str("1in").unwrap();
//! assert_eq!(w.to_user(&params), 96.0);
//! ```

use cssparser::{_cssparser_internal_to_lowercase, match_ignore_ascii_case, Parser, Token};
use std::marker::PhantomData;

use crate::error::*;
use crate::parsers::Parse;

/// Units for length values.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum LengthUnit {
    /// `1.0` means 100%
    Percent,

    /// Pixels, or the CSS default unit
    Px,

    /// Inches (25.4 mm)
    In,

    /// Centimeters
    Cm,

    /// Millimeters
    Mm,

    /// Points (1/72 inch)
    Pt,

    /// Picas (12 points)
    Pc,
}

/// Used for the `N` type parameter of `CssLength<N: Normalize, V: Validate>`.
pub trait Normalize {
    /// Computes an orientation-based scaling factor.
    fn normalize(x: f64, y: f64) -> f64;
}

/// Allows declaring `CssLength<Horizontal>`.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Horizontal;

/// Allows declaring `CssLength<Vertical>`.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Vertical;

impl Normalize for Horizontal {
    #[inline]
    fn normalize(x: f64, _y: f64) -> f64 {
        x
    }
}

impl Normalize for Vertical {
    #[inline]
    fn normalize(_x: f64, y: f64) -> f64 {
        y
    }
}

/// Used for the `V` type parameter of `CssLength<N: Normalize, V: Validate>`.
pub trait Validate {
    /// Checks if the specified value is acceptable
    fn validate(v: f64) -> Result<f64, ValueErrorKind> {
        Ok(v)
    }
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Signed;

impl Validate for Signed {}

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Unsigned;

impl Validate for Unsigned {
    fn validate(v: f64) -> Result<f64, ValueErrorKind> {
        if v >= 0.0 {
            Ok(v)
        } else {
            Err(ValueErrorKind::Value(
                "value must be non-negative".to_string(),
            ))
        }
    }
}

/// A length value with a unit, oriented by `N` and validated by `V`.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct CssLength<N: Normalize, V: Validate> {
    /// Numeric part of the length
    pub length: f64,

    /// Unit part of the length
    pub unit: LengthUnit,

    orientation: PhantomData<N>,
    validation: PhantomData<V>,
}

/// Alias for `CssLength` types that can have negative values
pub type Length<N> = CssLength<N, Signed>;

/// Alias for `CssLength` types that are non negative
pub type ULength<N> = CssLength<N, Unsigned>;

impl<N: Normalize, V: Validate> Default for CssLength<N, V> {
    fn default() -> Self {
        CssLength::new(0.0, LengthUnit::Px)
    }
}

/// Resolution used to convert absolute units to pixels.
pub const DPI: f64 = 96.0;

const POINTS_PER_INCH: f64 = 72.0;
const CM_PER_INCH: f64 = 2.54;
const MM_PER_INCH: f64 = 25.4;
const PICA_PER_INCH: f64 = 6.0;

impl<N: Normalize, V: Validate> Parse for CssLength<N, V> {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<CssLength<N, V>, ParseError<'i>> {
        let token = parser.next()?.clone();

        let (l_value, l_unit) = match token {
            Token::Number { value, .. } => (value, LengthUnit::Px),

            Token::Percentage { unit_value, .. } => (unit_value, LengthUnit::Percent),

            Token::Dimension {
                value, ref unit, ..
            } => {
                let unit = match_ignore_ascii_case! {unit.as_ref(),
                    "px" => LengthUnit::Px,
                    "in" => LengthUnit::In,
                    "cm" => LengthUnit::Cm,
                    "mm" => LengthUnit::Mm,
                    "pt" => LengthUnit::Pt,
                    "pc" => LengthUnit::Pc,

                    _ => return Err(parser.new_unexpected_token_error(token)),
                };

                (value, unit)
            }

            _ => return Err(parser.new_unexpected_token_error(token)),
        };

        if !l_value.is_finite() {
            return Err(parser.new_custom_error(ValueErrorKind::value_error("expected finite number")));
        }

        <V as Validate>::validate(f64::from(l_value))
            .map_err(|e| parser.new_custom_error(e))
            .map(|l_value| CssLength::new(l_value, l_unit))
    }
}

/// Parameters to normalize [`Length`] values to user-space distances.
///
/// Percentages resolve against `width` for horizontal lengths and `height` for
/// vertical ones.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NormalizeParams {
    width: f64,
    height: f64,
}

impl NormalizeParams {
    /// Percentages resolve against a reference box of the given size.
    pub fn new(width: f64, height: f64) -> NormalizeParams {
        NormalizeParams { width, height }
    }

    /// Parameters for `objectBoundingBox` units, where `100%` is `1.0`.
    pub fn object_bounding_box() -> NormalizeParams {
        NormalizeParams::new(1.0, 1.0)
    }
}

impl<N: Normalize, V: Validate> CssLength<N, V> {
    /// Creates a CssLength.
    #[inline]
    pub fn new(l: f64, unit: LengthUnit) -> CssLength<N, V> {
        CssLength {
            length: l,
            unit,
            orientation: PhantomData,
            validation: PhantomData,
        }
    }

    /// Convert a Length with units into user-space coordinates.
    pub fn to_user(&self, params: &NormalizeParams) -> f64 {
        match self.unit {
            LengthUnit::Px => self.length,

            LengthUnit::Percent => {
                self.length * <N as Normalize>::normalize(params.width, params.height)
            }

            LengthUnit::In => self.length * DPI,

            LengthUnit::Cm => self.length * DPI / CM_PER_INCH,

            LengthUnit::Mm => self.length * DPI / MM_PER_INCH,

            LengthUnit::Pt => self.length * DPI / POINTS_PER_INCH,

            LengthUnit::Pc => self.length * DPI / PICA_PER_INCH,
        }
    }
}
