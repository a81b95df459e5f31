//! The `filter` element.

use markup5ever::{expanded_name, local_name, namespace_url, ns};

use crate::coord_units;
use crate::coord_units::CoordUnits;
use crate::element::{set_attribute, ElementTrait};
use crate::filters::{
    load_primitive, resolve_inputs, FilterResolveError, FilterSpec, ResolvedPrimitive, SlotRef,
};
use crate::length::*;
use crate::parsers::ParseValue;
use crate::rect::Rect;
use crate::session::Session;
use crate::vfx_log;
use crate::xml::{Attributes, XmlElement};

coord_units!(FilterUnits, CoordUnits::ObjectBoundingBox);
coord_units!(PrimitiveUnits, CoordUnits::UserSpaceOnUse);

/// The `<filter>` element, with its primitives loaded and their inputs resolved.
pub struct Filter {
    id: Option<String>,
    x: Length<Horizontal>,
    y: Length<Vertical>,
    width: ULength<Horizontal>,
    height: ULength<Vertical>,
    filter_units: FilterUnits,
    primitive_units: PrimitiveUnits,
    primitives: Vec<ResolvedPrimitive>,
    inputs: Vec<Vec<SlotRef>>,
}

/// A `<filter>` element definition in user-space coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UserSpaceFilter {
    pub rect: Rect,
    pub filter_units: CoordUnits,
    pub primitive_units: CoordUnits,
}

impl Default for Filter {
    /// Constructs a new `Filter` with default properties.
    fn default() -> Self {
        Self {
            id: None,
            x: Length::<Horizontal>::new(-0.1, LengthUnit::Percent),
            y: Length::<Vertical>::new(-0.1, LengthUnit::Percent),
            width: ULength::<Horizontal>::new(1.2, LengthUnit::Percent),
            height: ULength::<Vertical>::new(1.2, LengthUnit::Percent),
            filter_units: Default::default(),
            primitive_units: Default::default(),
            primitives: Vec::new(),
            inputs: Vec::new(),
        }
    }
}

impl Filter {
    /// Loads a `<filter>` element and its primitive children.
    ///
    /// Children that are not supported primitives are left out with a log message.  A
    /// primitive that cannot be loaded keeps its place in the chain, with an output that
    /// reads as transparent black.
    pub fn from_element(element: &XmlElement, session: &Session) -> Filter {
        let mut filter = Filter::default();
        filter.set_attributes(&element.attributes, session);

        for child in &element.children {
            match load_primitive(child, session) {
                Ok(primitive) => filter.primitives.push(primitive),

                Err(FilterResolveError::UnknownPrimitive) => {
                    vfx_log!(
                        session,
                        "(ignoring unsupported element <{}> in filter {:?})",
                        child.local_name(),
                        filter.id
                    );
                }

                Err(e) => {
                    vfx_log!(
                        session,
                        "(filter primitive <{}> in filter {:?} could not be loaded: {})",
                        child.local_name(),
                        filter.id,
                        e
                    );

                    filter.primitives.push(ResolvedPrimitive::unloaded(child, session));
                }
            }
        }

        filter.inputs = resolve_inputs(&filter.primitives);
        filter
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn filter_units(&self) -> CoordUnits {
        self.filter_units.into()
    }

    pub fn primitive_units(&self) -> CoordUnits {
        self.primitive_units.into()
    }

    /// The loaded primitives, in document order.
    pub fn primitives(&self) -> &[ResolvedPrimitive] {
        &self.primitives
    }

    /// The resolved inputs of primitive `index`.
    pub fn slot_refs(&self, index: usize) -> Option<&[SlotRef]> {
        self.inputs.get(index).map(Vec::as_slice)
    }

    fn normalize_params(units: CoordUnits, viewport: &NormalizeParams) -> NormalizeParams {
        match units {
            CoordUnits::ObjectBoundingBox => NormalizeParams::object_bounding_box(),
            CoordUnits::UserSpaceOnUse => *viewport,
        }
    }

    /// Resolves the filter region.
    ///
    /// With `objectBoundingBox` units the rectangle is in fractions of the bounding box;
    /// otherwise percentages refer to `viewport`.
    pub fn to_user_space(&self, viewport: &NormalizeParams) -> UserSpaceFilter {
        let params = Self::normalize_params(self.filter_units(), viewport);

        let x = self.x.to_user(&params);
        let y = self.y.to_user(&params);
        let w = self.width.to_user(&params);
        let h = self.height.to_user(&params);

        let rect = Rect::new(x, y, x + w, y + h);

        UserSpaceFilter {
            rect,
            filter_units: self.filter_units(),
            primitive_units: self.primitive_units(),
        }
    }

    /// Builds the renderable form of this filter for a given viewport.
    pub fn to_filter_spec(&self, viewport: &NormalizeParams) -> FilterSpec {
        let user_space_filter = self.to_user_space(viewport);
        let params = Self::normalize_params(self.primitive_units(), viewport);

        let primitives = self
            .primitives
            .iter()
            .zip(self.inputs.iter())
            .map(|(p, inputs)| p.to_user_space(&params, inputs.clone()))
            .collect();

        FilterSpec {
            name: self.id.clone().unwrap_or_else(|| "unnamed filter".to_string()),
            user_space_filter,
            primitives,
        }
    }
}

impl ElementTrait for Filter {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        self.id = attrs.get_id().map(str::to_string);

        for (attr, value) in attrs.iter() {
            match attr.expanded() {
                expanded_name!("", "filterUnits") => {
                    set_attribute(&mut self.filter_units, attr.parse(value), session)
                }
                expanded_name!("", "x") => set_attribute(&mut self.x, attr.parse(value), session),
                expanded_name!("", "y") => set_attribute(&mut self.y, attr.parse(value), session),
                expanded_name!("", "width") => {
                    set_attribute(&mut self.width, attr.parse(value), session)
                }
                expanded_name!("", "height") => {
                    set_attribute(&mut self.height, attr.parse(value), session)
                }
                expanded_name!("", "primitiveUnits") => {
                    set_attribute(&mut self.primitive_units, attr.parse(value), session)
                }
                _ => (),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FilterDocument;

    fn load(xml: &str) -> FilterDocument {
        FilterDocument::load_from_str(xml, &Session::new_for_test_suite()).unwrap()
    }

    #[test]
    fn default_region_is_relative_to_bounding_box() {
        let doc = load(r#"<filter id="f"/>"#);
        let filter = doc.lookup("f").unwrap();

        assert_eq!(filter.filter_units(), CoordUnits::ObjectBoundingBox);
        assert_eq!(filter.primitive_units(), CoordUnits::UserSpaceOnUse);

        let user_space = filter.to_user_space(&NormalizeParams::new(300.0, 200.0));
        assert!(user_space
            .rect
            .approx_eq(&Rect::new(-0.1, -0.1, 1.1, 1.1)));
    }

    #[test]
    fn user_space_region_uses_viewport_for_percentages() {
        let doc = load(
            r#"<filter id="f" filterUnits="userSpaceOnUse" x="10%" y="5" width="1in" height="50%"/>"#,
        );
        let user_space = doc
            .lookup("f")
            .unwrap()
            .to_user_space(&NormalizeParams::new(300.0, 200.0));

        assert!(user_space
            .rect
            .approx_eq(&Rect::new(30.0, 5.0, 30.0 + 96.0, 105.0)));
    }

    #[test]
    fn invalid_attributes_keep_defaults() {
        let doc = load(r#"<filter id="f" filterUnits="bogus" width="-5"/>"#);
        let filter = doc.lookup("f").unwrap();

        assert_eq!(filter.filter_units(), CoordUnits::ObjectBoundingBox);
        let user_space = filter.to_user_space(&NormalizeParams::new(10.0, 10.0));
        assert!(user_space
            .rect
            .approx_eq(&Rect::new(-0.1, -0.1, 1.1, 1.1)));
    }

    #[test]
    fn object_bounding_box_primitive_units_resolve_fractions() {
        let doc = load(
            r#"<filter id="f" primitiveUnits="objectBoundingBox">
                 <feFlood x="25%" width="0.5"/>
                 <fePointLight/>
               </filter>"#,
        );
        let filter = doc.lookup("f").unwrap();
        assert_eq!(filter.primitives().len(), 1);
        assert_eq!(filter.slot_refs(0), Some(&[][..]));

        let spec = filter.to_filter_spec(&NormalizeParams::new(300.0, 200.0));
        assert_eq!(spec.name, "f");
        assert_eq!(spec.primitives.len(), 1);
    }
}
