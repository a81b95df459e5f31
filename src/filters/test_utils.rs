//! Helpers for the primitive tests.

use crate::document::FilterDocument;
use crate::length::NormalizeParams;
use crate::rect::{IRect, Rect};
use crate::session::Session;
use crate::surface_utils::shared_surface::{ExclusiveImageSurface, SharedImageSurface, SurfaceType};
use crate::surface_utils::{ImageSurfaceDataExt, Pixel, PixelOps};
use crate::transform::Transform;

use super::FilterRenderer;

/// An opaque surface where every pixel has a different color.
pub fn checkerboard(width: i32, height: i32) -> SharedImageSurface {
    let mut surface = ExclusiveImageSurface::new(width, height, SurfaceType::SRgb).unwrap();

    surface.modify(&mut |data, stride| {
        for y in 0..height as u32 {
            for x in 0..width as u32 {
                let pixel = Pixel::new((x * 20) as u8, (y * 20) as u8, ((x + y) % 2 * 200) as u8, 255);
                data.set_pixel(stride, pixel.premultiply(), x, y);
            }
        }
    });

    surface.share().unwrap()
}

/// Loads the filter with id `f` and renders it over `source`, with an identity
/// transform and the source's size as both viewport and bounding box.
pub fn render_filter(xml: &str, source: &SharedImageSurface) -> SharedImageSurface {
    let session = Session::new_for_test_suite();
    let document = FilterDocument::load_from_str(xml, &session).unwrap();

    let (w, h) = (f64::from(source.width()), f64::from(source.height()));
    let spec = document
        .lookup("f")
        .unwrap()
        .to_filter_spec(&NormalizeParams::new(w, h));

    FilterRenderer::new(&session)
        .render_shared(
            &spec,
            source.clone(),
            Transform::identity(),
            Some(Rect::from(IRect::from_size(source.width(), source.height()))),
        )
        .unwrap()
}
