use markup5ever::{expanded_name, local_name, namespace_url, ns};

use crate::element::{set_attribute, ElementTrait};
use crate::parsers::ParseValue;
use crate::rect::IRect;
use crate::session::Session;
use crate::transform::Transform;
use crate::vfx_log;
use crate::xml::{Attributes, XmlElement};

use super::bounds::BoundsBuilder;
use super::context::{FilterContext, FilterOutput};
use super::{
    ColorInterpolationFilters, FilterEffect, FilterError, FilterResolveError, Input, Primitive,
    PrimitiveParams, ResolvedPrimitive, SlotRef,
};

/// The `feOffset` filter primitive.
#[derive(Default)]
pub struct FeOffset {
    base: Primitive,
    params: Offset,
}

/// Resolved `feOffset` primitive for rendering.
#[derive(Debug, Clone, Default)]
pub struct Offset {
    pub in1: Input,
    pub dx: f64,
    pub dy: f64,
}

impl ElementTrait for FeOffset {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        self.params.in1 = self.base.parse_one_input(attrs, session);

        for (attr, value) in attrs.iter() {
            match attr.expanded() {
                expanded_name!("", "dx") => {
                    set_attribute(&mut self.params.dx, attr.parse(value), session)
                }
                expanded_name!("", "dy") => {
                    set_attribute(&mut self.params.dy, attr.parse(value), session)
                }
                _ => (),
            }
        }
    }
}

impl Offset {
    pub fn render(
        &self,
        bounds_builder: BoundsBuilder,
        ctx: &FilterContext,
        in1: &SlotRef,
    ) -> Result<FilterOutput, FilterError> {
        // color-interpolation-filters has no effect on feOffset, so the input is taken
        // in whatever color space it already is.
        let input_1 = ctx.get_input(in1, ColorInterpolationFilters::Auto)?;
        let bounds: IRect = bounds_builder.compute(ctx).clipped.into();

        let input_surface = input_1.surface();

        // Anything shifted further than the surface's size leaves it empty.
        let (dx, dy) = ctx.paffine().transform_distance(self.dx, self.dy);
        let dx = clamp_shift(dx, input_surface.width());
        let dy = clamp_shift(dy, input_surface.height());

        vfx_log!(
            ctx.session(),
            "(feOffset bounds={:?} dx={} dy={})",
            bounds,
            dx,
            dy
        );

        let surface = input_surface.offset(bounds, dx, dy)?;

        Ok(FilterOutput { surface, bounds })
    }

    /// An output pixel at `p` comes from the input pixel at `p - offset`, so the
    /// area grows against the direction of the offset.
    pub fn area_enlarge(&self, area: &mut IRect, transform: &Transform) {
        let (dx, dy) = transform.transform_distance(self.dx, self.dy);

        // `as` saturates, so huge offsets end up at the limits of i32.
        if dx > 0.0 {
            area.x0 = area.x0.saturating_sub(dx.ceil() as i32);
        } else {
            area.x1 = area.x1.saturating_sub(dx.floor() as i32);
        }

        if dy > 0.0 {
            area.y0 = area.y0.saturating_sub(dy.ceil() as i32);
        } else {
            area.y1 = area.y1.saturating_sub(dy.floor() as i32);
        }
    }
}

fn clamp_shift(d: f64, size: i32) -> i32 {
    let limit = f64::from(size) + 1.0;
    d.round().clamp(-limit, limit) as i32
}

impl FilterEffect for FeOffset {
    fn resolve(
        &self,
        _element: &XmlElement,
        _session: &Session,
    ) -> Result<ResolvedPrimitive, FilterResolveError> {
        Ok(ResolvedPrimitive {
            primitive: self.base.clone(),
            params: PrimitiveParams::Offset(self.params.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_utils::{checkerboard, render_filter};
    use crate::surface_utils::Pixel;

    #[test]
    fn zero_offset_is_identity_inside_subregion() {
        let source = checkerboard(8, 8);
        let output = render_filter(
            r#"<filter id="f" filterUnits="userSpaceOnUse" x="0" y="0" width="8" height="8">
                 <feOffset x="2" y="2" width="4" height="4"/>
               </filter>"#,
            &source,
        );

        for y in 0..8 {
            for x in 0..8 {
                let inside = (2..6).contains(&x) && (2..6).contains(&y);
                let expected = if inside {
                    source.get_pixel(x, y)
                } else {
                    Pixel::new(0, 0, 0, 0)
                };
                assert_eq!(output.get_pixel(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn offset_fills_uncovered_area_with_transparent_black() {
        let source = checkerboard(8, 8);
        let output = render_filter(
            r#"<filter id="f" filterUnits="userSpaceOnUse" x="0" y="0" width="8" height="8">
                 <feOffset dx="3" dy="-1"/>
               </filter>"#,
            &source,
        );

        for y in 0..8 {
            for x in 0..8 {
                let expected = if x >= 3 && y < 7 {
                    source.get_pixel(x - 3, y + 1)
                } else {
                    Pixel::new(0, 0, 0, 0)
                };
                assert_eq!(output.get_pixel(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn offset_rounds_to_nearest_pixel() {
        let source = checkerboard(8, 8);
        let output = render_filter(
            r#"<filter id="f" filterUnits="userSpaceOnUse" x="0" y="0" width="8" height="8">
                 <feOffset dx="0.6" dy="0.4"/>
               </filter>"#,
            &source,
        );

        assert_eq!(output.get_pixel(0, 0), Pixel::new(0, 0, 0, 0));
        assert_eq!(output.get_pixel(4, 4), source.get_pixel(3, 4));
    }

    #[test]
    fn enlarges_area_against_the_offset() {
        let offset = Offset {
            in1: Input::Unspecified,
            dx: 1.5,
            dy: -2.0,
        };

        let mut area = IRect::new(0, 0, 10, 10);
        offset.area_enlarge(&mut area, &Transform::new_scale(2.0, 2.0));
        assert_eq!(area, IRect::new(-3, 0, 10, 14));
    }

    #[test]
    fn huge_offset_moves_everything_out() {
        let source = checkerboard(8, 8);
        let output = render_filter(
            r#"<filter id="f" filterUnits="userSpaceOnUse" x="0" y="0" width="8" height="8">
                 <feOffset dx="3e9" dy="-3e9"/>
               </filter>"#,
            &source,
        );

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(output.get_pixel(x, y), Pixel::new(0, 0, 0, 0));
            }
        }
    }

    #[test]
    fn huge_offset_saturates_enlarged_area() {
        let offset = Offset {
            in1: Input::Unspecified,
            dx: 3e9,
            dy: -3e9,
        };

        let mut area = IRect::new(-10, -10, 10, 10);
        offset.area_enlarge(&mut area, &Transform::identity());
        assert_eq!(area, IRect::new(i32::MIN, -10, 10, i32::MAX));
    }
}
