//! Attribute handling shared by the filter elements.

use crate::error::ElementError;
use crate::session::Session;
use crate::vfx_log;
use crate::xml::Attributes;

/// Elements that read their parameters from XML attributes.
pub trait ElementTrait {
    /// Sets per-element attributes.
    ///
    /// Unknown attributes are ignored, and known attributes with invalid values are
    /// ignored so that they keep their initial value.  Use [`set_attribute`] for that.
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session);
}

/// Stores a successfully parsed attribute value, or logs the error and keeps `dest`.
pub fn set_attribute<T>(dest: &mut T, parse_result: Result<T, ElementError>, session: &Session) {
    match parse_result {
        Ok(v) => *dest = v,
        Err(e) => {
            vfx_log!(session, "ignoring attribute with invalid value: {}", e);
        }
    }
}
