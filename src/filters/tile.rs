use crate::element::ElementTrait;
use crate::rect::IRect;
use crate::session::Session;
use crate::surface_utils::shared_surface::SharedImageSurface;
use crate::vfx_log;
use crate::xml::{Attributes, XmlElement};

use super::bounds::BoundsBuilder;
use super::context::{FilterContext, FilterInput, FilterOutput};
use super::{
    ColorInterpolationFilters, FilterEffect, FilterError, FilterResolveError, Input, Primitive,
    PrimitiveParams, ResolvedPrimitive, SlotRef,
};

/// The area an `feTile` may read from: any pixel of its input can end up anywhere.
pub const ENLARGED_AREA: IRect = IRect::new(-(1 << 24), -(1 << 24), 1 << 24, 1 << 24);

/// The `feTile` filter primitive.
#[derive(Default)]
pub struct FeTile {
    base: Primitive,
    params: Tile,
}

/// Resolved `feTile` primitive for rendering.
#[derive(Debug, Clone, Default)]
pub struct Tile {
    pub in1: Input,
}

impl ElementTrait for FeTile {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        self.params.in1 = self.base.parse_one_input(attrs, session);
    }
}

impl Tile {
    pub fn render(
        &self,
        bounds_builder: BoundsBuilder,
        ctx: &FilterContext,
        in1: &SlotRef,
    ) -> Result<FilterOutput, FilterError> {
        // color-interpolation-filters has no effect on feTile.
        let input_1 = ctx.get_input(in1, ColorInterpolationFilters::Auto)?;

        // feTile doesn't consider its inputs in the filter primitive subregion calculation.
        let bounds: IRect = bounds_builder.compute(ctx).clipped.into();

        // A standard input covers the whole filter effects region, which is then its
        // period.
        let (input_surface, input_bounds) = match input_1 {
            FilterInput::StandardInput(input_surface) => {
                (input_surface, IRect::from(ctx.effects_region()))
            }
            FilterInput::PrimitiveOutput(FilterOutput {
                surface: input_surface,
                bounds: input_bounds,
            }) => (input_surface, input_bounds),
        };

        let surface = if input_bounds.is_empty() {
            vfx_log!(
                ctx.session(),
                "(feTile with empty input_bounds; returning a transparent surface)"
            );

            SharedImageSurface::empty(
                input_surface.width(),
                input_surface.height(),
                input_surface.surface_type(),
            )?
        } else {
            vfx_log!(
                ctx.session(),
                "(feTile bounds={:?}, input_bounds={:?})",
                bounds,
                input_bounds
            );

            let tile_surface = input_surface.tile(input_bounds)?;

            ctx.source_graphic().paint_image_tiled(
                bounds,
                &tile_surface,
                input_bounds.x0,
                input_bounds.y0,
            )?
        };

        Ok(FilterOutput { surface, bounds })
    }
}

impl FilterEffect for FeTile {
    fn resolve(
        &self,
        _element: &XmlElement,
        _session: &Session,
    ) -> Result<ResolvedPrimitive, FilterResolveError> {
        Ok(ResolvedPrimitive {
            primitive: self.base.clone(),
            params: PrimitiveParams::Tile(self.params.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::filters::test_utils::{checkerboard, render_filter};
    use crate::surface_utils::Pixel;

    #[test]
    fn tile_with_same_subregion_is_identity() {
        let source = checkerboard(8, 8);
        let output = render_filter(
            r#"<filter id="f" filterUnits="userSpaceOnUse" x="0" y="0" width="8" height="8">
                 <feOffset x="1" y="1" width="5" height="5"/>
                 <feTile x="1" y="1" width="5" height="5"/>
               </filter>"#,
            &source,
        );

        for y in 1..6 {
            for x in 1..6 {
                assert_eq!(output.get_pixel(x, y), source.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn tile_repeats_input_subregion() {
        let source = checkerboard(12, 12);
        let output = render_filter(
            r#"<filter id="f" filterUnits="userSpaceOnUse" x="0" y="0" width="12" height="12">
                 <feOffset x="2" y="3" width="3" height="2"/>
                 <feTile/>
               </filter>"#,
            &source,
        );

        for y in 0..12u32 {
            for x in 0..12u32 {
                // The period is the 3×2 input subregion anchored at (2, 3).
                let sx = 2 + (x + 12 - 2) % 3;
                let sy = 3 + (y + 12 - 3) % 2;
                assert_eq!(
                    output.get_pixel(x, y),
                    source.get_pixel(sx, sy),
                    "pixel ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn standard_input_stays_inside_subregion() {
        let source = checkerboard(8, 8);
        let output = render_filter(
            r#"<filter id="f" filterUnits="userSpaceOnUse" x="0" y="0" width="8" height="8">
                 <feTile in="SourceGraphic" x="2" y="2" width="4" height="4"/>
               </filter>"#,
            &source,
        );

        for y in 0..8 {
            for x in 0..8 {
                let inside = (2..6).contains(&x) && (2..6).contains(&y);
                let expected = if inside {
                    source.get_pixel(x, y)
                } else {
                    Pixel::default()
                };

                assert_eq!(output.get_pixel(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn empty_input_tiles_to_transparent() {
        let source = checkerboard(8, 8);
        let output = render_filter(
            r#"<filter id="f" filterUnits="userSpaceOnUse" x="0" y="0" width="8" height="8">
                 <feOffset x="2" y="2" width="0" height="3"/>
                 <feTile/>
               </filter>"#,
            &source,
        );

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(output.get_pixel(x, y), Pixel::default(), "pixel ({x}, {y})");
            }
        }
    }
}
