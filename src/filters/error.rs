use std::fmt;

/// An enumeration of errors that can occur during filter primitive rendering.
#[derive(Debug, Clone)]
pub enum FilterError {
    /// The filter was passed invalid input (the `in` attribute).
    InvalidInput,
    /// The filter was passed an invalid parameter.
    InvalidParameter(String),
    /// A Cairo error.
    ///
    /// This means that either a failed intermediate surface creation or bad intermediate surface
    /// status.
    CairoError(cairo::Error),
    /// A lighting filter has none or multiple light sources.
    InvalidLightSourceCount,
    /// A lighting filter input surface is too small.
    LightingInputTooSmall,
    /// The primitive's element could not be loaded, so it has nothing to render.
    NotLoaded,
}

/// Errors that can occur while turning a primitive element into something renderable.
///
/// The primitive's place in the filter chain is then taken by an empty output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResolveError {
    /// A lighting filter has none or multiple light sources.
    InvalidLightSourceCount,
    /// The element is not a filter primitive this crate knows about.
    UnknownPrimitive,
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FilterError::InvalidInput => write!(f, "invalid value of the `in` attribute"),
            FilterError::InvalidParameter(ref s) => write!(f, "invalid parameter value: {s}"),
            FilterError::CairoError(ref status) => write!(f, "Cairo error: {status}"),
            FilterError::InvalidLightSourceCount => write!(f, "invalid light source count"),
            FilterError::LightingInputTooSmall => write!(
                f,
                "lighting filter input surface is too small (less than 2×2 pixels)"
            ),
            FilterError::NotLoaded => write!(f, "primitive was not loaded"),
        }
    }
}

impl fmt::Display for FilterResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FilterResolveError::InvalidLightSourceCount => {
                write!(f, "lighting filter must have exactly one light source")
            }
            FilterResolveError::UnknownPrimitive => write!(f, "unsupported filter primitive"),
        }
    }
}

impl From<cairo::Error> for FilterError {
    #[inline]
    fn from(x: cairo::Error) -> Self {
        FilterError::CairoError(x)
    }
}
