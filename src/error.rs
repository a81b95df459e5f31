//! Error types.

use std::fmt;

use cssparser::{BasicParseError, BasicParseErrorKind, ParseErrorKind, ToCss};
use markup5ever::QualName;
use thiserror::Error;

use crate::filters::FilterError;

/// A short-lived error.
///
/// The lifetime of the error is the same as the `cssparser::ParserInput` that
/// was used to create a `cssparser::Parser`.  That is, it is the lifetime of
/// the string data that is being parsed.
pub type ParseError<'i> = cssparser::ParseError<'i, ValueErrorKind>;

/// A simple error which refers to an attribute's value
#[derive(Debug, Clone, PartialEq)]
pub enum ValueErrorKind {
    /// A property with the specified name was not found
    UnknownProperty,

    /// The value could not be parsed
    Parse(String),

    // The value could be parsed, but is invalid
    Value(String),
}

impl ValueErrorKind {
    pub fn parse_error(s: &str) -> ValueErrorKind {
        ValueErrorKind::Parse(s.to_string())
    }

    pub fn value_error(s: &str) -> ValueErrorKind {
        ValueErrorKind::Value(s.to_string())
    }
}

impl fmt::Display for ValueErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ValueErrorKind::UnknownProperty => write!(f, "unknown property name"),

            ValueErrorKind::Parse(ref s) => write!(f, "parse error: {s}"),

            ValueErrorKind::Value(ref s) => write!(f, "invalid value: {s}"),
        }
    }
}

impl<'a> From<BasicParseError<'a>> for ValueErrorKind {
    fn from(e: BasicParseError<'_>) -> ValueErrorKind {
        let BasicParseError { kind, .. } = e;

        let msg = match kind {
            BasicParseErrorKind::UnexpectedToken(_) => "unexpected token",
            BasicParseErrorKind::EndOfInput => "unexpected end of input",
            BasicParseErrorKind::AtRuleInvalid(_) => "invalid @-rule",
            BasicParseErrorKind::AtRuleBodyInvalid => "invalid @-rule body",
            BasicParseErrorKind::QualifiedRuleInvalid => "invalid qualified rule",
        };

        ValueErrorKind::parse_error(msg)
    }
}

impl<'i> From<ParseError<'i>> for ValueErrorKind {
    fn from(e: ParseError<'i>) -> ValueErrorKind {
        match e.kind {
            ParseErrorKind::Basic(kind) => ValueErrorKind::from(BasicParseError {
                kind,
                location: e.location,
            }),
            ParseErrorKind::Custom(err) => err,
        }
    }
}

/// A complete error for an attribute and its erroneous value
#[derive(Debug, Clone)]
pub struct ElementError {
    pub attr: QualName,
    pub err: ValueErrorKind,
}

impl fmt::Display for ElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.attr.local, self.err)
    }
}

/// Helper for converting `Result<O, E>` into `Result<O, ElementError>`
///
/// A `ElementError` requires a `QualName` that corresponds to the attribute to which the
/// error refers, plus the actual `ValueErrorKind` that describes the error.  However,
/// parsing functions for attribute value types will want to return their own kind of
/// error, instead of `ValueErrorKind`.  If that particular error type has an `impl
/// From<FooError> for ValueErrorKind`, then this trait helps assign attribute values
/// with `.attribute(attr)`.
pub trait AttributeResultExt<O> {
    fn attribute(self, attr: QualName) -> Result<O, ElementError>;
}

impl<O, E: Into<ValueErrorKind>> AttributeResultExt<O> for Result<O, E> {
    fn attribute(self, attr: QualName) -> Result<O, ElementError> {
        self.map_err(|e| e.into())
            .map_err(|err| ElementError { attr, err })
    }
}

/// Converts a short-lived `ParseError` into a long-lived `ElementError`.
pub fn parse_error_to_element_error(e: ParseError<'_>, attr: QualName) -> ElementError {
    let ParseError { kind, .. } = e;

    match kind {
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(tok)) => {
            let mut s = String::from("unexpected token '");
            // Writing into a String cannot fail.
            let _ = tok.to_css(&mut s);
            s.push('\'');

            ElementError {
                attr,
                err: ValueErrorKind::Parse(s),
            }
        }

        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => ElementError {
            attr,
            err: ValueErrorKind::parse_error("unexpected end of input"),
        },

        ParseErrorKind::Basic(_) => ElementError {
            attr,
            err: ValueErrorKind::parse_error("unexpected CSS rule in attribute value"),
        },

        ParseErrorKind::Custom(err) => ElementError { attr, err },
    }
}

/// Errors that can happen while loading filter definitions from XML.
#[derive(Debug, Clone, Error)]
pub enum LoadingError {
    /// XML data could not be parsed.
    #[error("XML parse error: {0}")]
    XmlParseError(String),

    /// The input is not valid UTF-8.
    #[error("input data is not valid UTF-8")]
    BadEncoding,

    /// No `<filter>` element was found in the document.
    #[error("no filter elements found")]
    NoFilters,
}

/// Errors that can happen while rendering a filter.
#[derive(Debug, Clone, Error)]
pub enum RenderingError {
    /// An error from the rendering backend.
    #[error("rendering error: {0}")]
    Rendering(String),

    /// The filter's estimated cost is above the renderer's configured ceiling.
    #[error("filter complexity {complexity} exceeds the limit {limit}")]
    TooComplex { complexity: f64, limit: f64 },

    /// The filter was given a transform that cannot be inverted.
    #[error("non-invertible transform")]
    InvalidTransform,
}

impl From<cairo::Error> for RenderingError {
    fn from(e: cairo::Error) -> RenderingError {
        RenderingError::Rendering(format!("{e:?}"))
    }
}

impl From<FilterError> for RenderingError {
    fn from(e: FilterError) -> RenderingError {
        RenderingError::Rendering(format!("{e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{Parse, ParseValue};
    use markup5ever::{local_name, namespace_url, ns, QualName};

    #[test]
    fn element_error_names_the_attribute() {
        let attr = QualName::new(None, ns!(), local_name!("dx"));
        let res: Result<f64, ElementError> = attr.parse("foo");
        let e = res.unwrap_err();
        assert_eq!(format!("{e}"), "dx: parse error: unexpected token 'foo'");
    }

    #[test]
    fn custom_errors_are_preserved() {
        let e = crate::parsers::NonNegative::parse_str("-1").unwrap_err();
        assert_eq!(
            ValueErrorKind::from(e),
            ValueErrorKind::value_error("expected non negative number")
        );
    }
}
