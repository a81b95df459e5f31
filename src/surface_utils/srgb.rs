//! Conversions between the sRGB and linear sRGB color spaces.
//!
//! The lookup tables are generated by `build.rs`.

use crate::rect::IRect;
use crate::surface_utils::{
    iterators::Pixels,
    shared_surface::{ExclusiveImageSurface, SharedImageSurface, SurfaceType},
    ImageSurfaceDataExt, Pixel,
};

include!(concat!(env!("OUT_DIR"), "/srgb-codegen.rs"));

/// Converts an sRGB color value to a linear sRGB color value (undoes the gamma correction).
#[inline]
pub fn linearize(c: u8) -> u8 {
    LINEARIZE[usize::from(c)]
}

/// Converts a linear sRGB color value to a normal sRGB color value (applies the gamma correction).
#[inline]
pub fn unlinearize(c: u8) -> u8 {
    UNLINEARIZE[usize::from(c)]
}

/// Applies the function to each pixel component after unpremultiplying.
fn map_unpremultiplied_components<F: Fn(u8) -> u8>(
    surface: &SharedImageSurface,
    bounds: IRect,
    f: F,
    new_type: SurfaceType,
) -> Result<SharedImageSurface, cairo::Error> {
    let (width, height) = (surface.width(), surface.height());
    let mut output_surface = ExclusiveImageSurface::new(width, height, new_type)?;

    output_surface.modify(&mut |data, stride| {
        for (x, y, pixel) in Pixels::within(surface, bounds) {
            if pixel.a > 0 {
                let alpha = f64::from(pixel.a) / 255f64;

                let compute = |x| {
                    let x = f64::from(x) / alpha;
                    let x = f((x + 0.5).min(255.0) as u8);
                    let x = f64::from(x) * alpha;
                    (x + 0.5) as u8
                };

                let output_pixel = Pixel {
                    r: compute(pixel.r),
                    g: compute(pixel.g),
                    b: compute(pixel.b),
                    a: pixel.a,
                };

                data.set_pixel(stride, output_pixel, x, y);
            }
        }
    });

    output_surface.share()
}

/// Converts an sRGB surface to a linear sRGB surface (undoes the gamma correction).
#[inline]
pub fn linearize_surface(
    surface: &SharedImageSurface,
    bounds: IRect,
) -> Result<SharedImageSurface, cairo::Error> {
    map_unpremultiplied_components(surface, bounds, linearize, SurfaceType::LinearRgb)
}

/// Converts a linear sRGB surface to a normal sRGB surface (applies the gamma correction).
#[inline]
pub fn unlinearize_surface(
    surface: &SharedImageSurface,
    bounds: IRect,
) -> Result<SharedImageSurface, cairo::Error> {
    map_unpremultiplied_components(surface, bounds, unlinearize, SurfaceType::SRgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_keep_endpoints() {
        assert_eq!(linearize(0), 0);
        assert_eq!(linearize(255), 255);
        assert_eq!(unlinearize(0), 0);
        assert_eq!(unlinearize(255), 255);
    }

    #[test]
    fn linearize_darkens_midtones() {
        assert!(linearize(128) < 128);
        assert!(unlinearize(128) > 128);
    }

    #[test]
    fn converts_surface_type() {
        let bounds = IRect::from_size(2, 2);
        let s = SharedImageSurface::empty(2, 2, SurfaceType::SRgb)
            .unwrap()
            .flood(bounds, Pixel::new(255, 128, 0, 255))
            .unwrap();

        let linear = s.to_linear_rgb(bounds).unwrap();
        assert_eq!(linear.surface_type(), SurfaceType::LinearRgb);
        assert_eq!(linear.get_pixel(0, 0), Pixel::new(255, linearize(128), 0, 255));

        let back = linear.to_srgb(bounds).unwrap();
        assert_eq!(back.surface_type(), SurfaceType::SRgb);
        assert_eq!(back.get_pixel(1, 1).r, 255);
    }
}
