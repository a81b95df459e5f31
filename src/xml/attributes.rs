//! Store XML element attributes and their values.

use std::slice;

use markup5ever::{expanded_name, local_name, namespace_url, ns, QualName};
use string_cache::DefaultAtom;

/// Type used to store attribute values.
///
/// Attribute values are often repeated in a document, so we intern them using the
/// string_cache crate.
pub type AttributeValue = DefaultAtom;

/// The attributes of one element, in document order.
///
/// Attributes with a namespace prefix (`xmlns:foo`, `xlink:title`) belong to
/// other vocabularies and are not stored.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    attrs: Box<[(QualName, AttributeValue)]>,
    id_idx: Option<u16>,
}

/// Iterator from `Attributes.iter`.
pub struct AttributesIter<'a>(slice::Iter<'a, (QualName, AttributeValue)>);

impl Attributes {
    pub fn new() -> Attributes {
        Attributes::default()
    }

    /// Builds the attribute list for a tag produced by the XML tokenizer.
    pub fn from_tag_attributes(tag_attrs: &[markup5ever::Attribute]) -> Attributes {
        let mut array = Vec::with_capacity(tag_attrs.len());
        let mut id_idx = None;

        for a in tag_attrs.iter().filter(|a| a.name.prefix.is_none()) {
            let qual_name = a.name.clone();
            let value = DefaultAtom::from(a.value.as_ref());

            if qual_name.expanded() == expanded_name!("", "id") {
                id_idx = Some(array.len() as u16);
            }

            array.push((qual_name, value));
        }

        Attributes {
            attrs: array.into(),
            id_idx,
        }
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Creates an iterator that yields `(QualName, &'a str)` tuples.
    pub fn iter(&self) -> AttributesIter<'_> {
        AttributesIter(self.attrs.iter())
    }

    pub fn get_id(&self) -> Option<&str> {
        self.id_idx.and_then(|idx| {
            self.attrs
                .get(usize::from(idx))
                .map(|(_name, value)| &value[..])
        })
    }

    /// Looks up an unprefixed attribute by its local name.
    pub fn get(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(name, _)| name.local.as_ref() == local)
            .map(|(_name, value)| &value[..])
    }
}

impl<'a> Iterator for AttributesIter<'a> {
    type Item = (QualName, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(a, v)| (a.clone(), v.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markup5ever::{LocalName, Prefix};
    use markup5ever::tendril::StrTendril;

    fn attr(prefix: Option<&str>, local: &str, value: &str) -> markup5ever::Attribute {
        markup5ever::Attribute {
            name: QualName::new(prefix.map(Prefix::from), ns!(), LocalName::from(local)),
            value: StrTendril::from(value),
        }
    }

    #[test]
    fn empty_attributes() {
        let map = Attributes::from_tag_attributes(&[]);
        assert_eq!(map.len(), 0);
        assert!(map.get_id().is_none());
    }

    #[test]
    fn skips_prefixed_attributes() {
        let map = Attributes::from_tag_attributes(&[
            attr(Some("xlink"), "title", "layer"),
            attr(None, "dx", "2"),
            attr(None, "id", "blur"),
            attr(Some("xmlns"), "xlink", "http://www.w3.org/1999/xlink"),
        ]);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get_id(), Some("blur"));
        assert_eq!(map.get("dx"), Some("2"));
        assert_eq!(map.get("title"), None);

        let names: Vec<String> = map.iter().map(|(n, _)| n.local.to_string()).collect();
        assert_eq!(names, vec!["dx", "id"]);
    }
}
