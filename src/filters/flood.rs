use crate::color::{color_to_pixel, resolve_color, Color, RGBA};
use crate::element::{set_attribute, ElementTrait};
use crate::parsers::{ParseValue, UnitInterval};
use crate::rect::IRect;
use crate::session::Session;
use crate::surface_utils::Pixel;
use crate::vfx_log;
use crate::xml::{Attributes, XmlElement};

use super::bounds::BoundsBuilder;
use super::context::{FilterContext, FilterOutput};
use super::{
    ColorProperties, FilterEffect, FilterError, FilterResolveError, Primitive, PrimitiveParams,
    ResolvedPrimitive,
};

/// The `feFlood` filter primitive.
pub struct FeFlood {
    base: Primitive,
    flood_color: Color,
    flood_opacity: UnitInterval,
}

impl Default for FeFlood {
    fn default() -> Self {
        FeFlood {
            base: Default::default(),
            flood_color: Color::RGBA(RGBA::new(0, 0, 0, 255)),
            flood_opacity: UnitInterval(1.0),
        }
    }
}

/// Resolved `feFlood` primitive for rendering.
#[derive(Debug, Clone)]
pub struct Flood {
    /// Unpremultiplied sRGB color, with the opacity folded into the alpha channel.
    pub color: Pixel,
}

impl ElementTrait for FeFlood {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        self.base.parse_no_inputs(attrs, session);

        for (attr, value) in attrs.iter() {
            match &*attr.local {
                "flood-color" => set_attribute(&mut self.flood_color, attr.parse(value), session),
                "flood-opacity" => {
                    set_attribute(&mut self.flood_opacity, attr.parse(value), session)
                }
                _ => (),
            }
        }
    }
}

impl Flood {
    pub fn render(
        &self,
        bounds_builder: BoundsBuilder,
        ctx: &FilterContext,
    ) -> Result<FilterOutput, FilterError> {
        let bounds: IRect = bounds_builder.compute(ctx).clipped.into();
        vfx_log!(ctx.session(), "(feFlood bounds={:?})", bounds);

        let surface = ctx.source_graphic().flood(bounds, self.color)?;

        Ok(FilterOutput { surface, bounds })
    }
}

impl FilterEffect for FeFlood {
    fn resolve(
        &self,
        element: &XmlElement,
        session: &Session,
    ) -> Result<ResolvedPrimitive, FilterResolveError> {
        let props = ColorProperties::from_attributes(&element.attributes, session);
        let rgba = resolve_color(&self.flood_color, props.color);

        Ok(ResolvedPrimitive {
            primitive: self.base.clone(),
            params: PrimitiveParams::Flood(Flood {
                color: color_to_pixel(rgba, self.flood_opacity.0),
            }),
        })
    }
}
