//! Loading filter definitions from an XML document.

use std::collections::HashMap;
use std::time::Instant;

use crate::error::LoadingError;
use crate::filter::Filter;
use crate::log;
use crate::session::Session;
use crate::vfx_log;
use crate::xml::parse_elements;

/// All the `<filter>` elements of a document, indexed by id.
pub struct FilterDocument {
    filters: Vec<Filter>,
    ids: HashMap<String, usize>,
}

impl FilterDocument {
    /// Loads every `<filter>` element found anywhere in `data`.
    ///
    /// Filters may be nested inside other elements, like `<svg>` and `<defs>`.  If two
    /// filters share an id, the first one wins.
    pub fn load_from_str(data: &str, session: &Session) -> Result<FilterDocument, LoadingError> {
        let start = Instant::now();
        let roots = parse_elements(data)?;

        let mut filters = Vec::new();
        let mut ids = HashMap::new();

        for element in roots
            .iter()
            .flat_map(|r| r.descendants())
            .filter(|e| e.local_name() == "filter")
        {
            let filter = Filter::from_element(element, session);

            if let Some(id) = filter.id() {
                if ids.contains_key(id) {
                    vfx_log!(session, "(duplicate filter id \"{}\"; ignoring)", id);
                } else {
                    ids.insert(id.to_string(), filters.len());
                }
            }

            filters.push(filter);
        }

        if filters.is_empty() {
            return Err(LoadingError::NoFilters);
        }

        vfx_log!(
            session,
            "(loaded {} filters in {:.3}s)",
            filters.len(),
            log::seconds(start.elapsed())
        );

        Ok(FilterDocument { filters, ids })
    }

    /// Like [`FilterDocument::load_from_str`], for data that must be valid UTF-8.
    pub fn load_from_bytes(data: &[u8], session: &Session) -> Result<FilterDocument, LoadingError> {
        let s = std::str::from_utf8(data).map_err(|_| LoadingError::BadEncoding)?;
        FilterDocument::load_from_str(s, session)
    }

    /// Looks up a filter by its `id` attribute.
    pub fn lookup(&self, id: &str) -> Option<&Filter> {
        self.ids.get(id).map(|&i| &self.filters[i])
    }

    /// All filters, in document order, including the ones without an id.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_nested_filters() {
        let doc = FilterDocument::load_from_str(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                 <defs>
                   <filter id="a"><feFlood/></filter>
                   <filter><feOffset/></filter>
                 </defs>
                 <g><filter id="b"/></g>
               </svg>"#,
            &Session::new_for_test_suite(),
        )
        .unwrap();

        assert_eq!(doc.filters().len(), 3);
        assert_eq!(doc.lookup("a").unwrap().primitives().len(), 1);
        assert!(doc.lookup("b").unwrap().primitives().is_empty());
        assert!(doc.lookup("c").is_none());
    }

    #[test]
    fn first_duplicate_id_wins() {
        let doc = FilterDocument::load_from_str(
            r#"<defs>
                 <filter id="f"><feFlood/></filter>
                 <filter id="f"><feFlood/><feFlood/></filter>
               </defs>"#,
            &Session::new_for_test_suite(),
        )
        .unwrap();

        assert_eq!(doc.lookup("f").unwrap().primitives().len(), 1);
    }

    #[test]
    fn reports_missing_filters() {
        let res = FilterDocument::load_from_str("<svg/>", &Session::new_for_test_suite());
        assert!(matches!(res, Err(LoadingError::NoFilters)));
    }

    #[test]
    fn reports_malformed_xml() {
        let res = FilterDocument::load_from_str(
            "<filter id=\"f\"><feFlood></filter>",
            &Session::new_for_test_suite(),
        );
        assert!(matches!(res, Err(LoadingError::XmlParseError(_))));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let res = FilterDocument::load_from_bytes(b"<filter id=\"\xff\"/>", &Session::new_for_test_suite());
        assert!(matches!(res, Err(LoadingError::BadEncoding)));
    }
}
