//! `userSpaceOnUse` or `objectBoundingBox` values.

use cssparser::Parser;

use crate::error::*;
use crate::parse_identifiers;
use crate::parsers::Parse;

/// Coordinate system for the `filterUnits` and `primitiveUnits` attributes.
///
/// With `ObjectBoundingBox`, lengths are fractions of the bounding box of the element
/// being filtered.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordUnits {
    UserSpaceOnUse,
    ObjectBoundingBox,
}

impl Parse for CoordUnits {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "userSpaceOnUse" => CoordUnits::UserSpaceOnUse,
            "objectBoundingBox" => CoordUnits::ObjectBoundingBox,
        )?)
    }
}

/// Creates a newtype around `CoordUnits` with its own default value.
///
/// `filterUnits` and `primitiveUnits` take the same keywords but default differently.
#[doc(hidden)]
#[macro_export]
macro_rules! coord_units {
    ($name:ident, $default:expr) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub struct $name(pub $crate::coord_units::CoordUnits);

        impl Default for $name {
            fn default() -> Self {
                $name($default)
            }
        }

        impl From<$name> for $crate::coord_units::CoordUnits {
            fn from(u: $name) -> Self {
                u.0
            }
        }

        impl $crate::parsers::Parse for $name {
            fn parse<'i>(
                parser: &mut ::cssparser::Parser<'i, '_>,
            ) -> Result<Self, $crate::error::ParseError<'i>> {
                Ok($name(<$crate::coord_units::CoordUnits as $crate::parsers::Parse>::parse(
                    parser,
                )?))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    coord_units!(RegionUnits, CoordUnits::ObjectBoundingBox);

    #[test]
    fn rejects_unknown_keywords() {
        assert!(RegionUnits::parse_str("").is_err());
        assert!(RegionUnits::parse_str("strokeBox").is_err());
    }

    #[test]
    fn parses_both_keywords() {
        assert_eq!(
            RegionUnits::parse_str("userSpaceOnUse").unwrap(),
            RegionUnits(CoordUnits::UserSpaceOnUse)
        );
        assert_eq!(
            CoordUnits::parse_str("objectBoundingBox").unwrap(),
            CoordUnits::ObjectBoundingBox
        );
    }

    #[test]
    fn newtype_has_its_own_default() {
        assert_eq!(
            CoordUnits::from(RegionUnits::default()),
            CoordUnits::ObjectBoundingBox
        );
    }
}
