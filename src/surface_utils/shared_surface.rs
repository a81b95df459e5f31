//! Shared access to Cairo image surfaces.
use std::ptr::NonNull;

use cairo::ImageSurface;

use crate::rect::IRect;

use super::{iterators::Pixels, srgb, ImageSurfaceDataExt, Pixel, PixelOps};

/// Types of pixel data in a `SharedImageSurface`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceType {
    /// The pixel data is in the sRGB color space.
    SRgb,
    /// The pixel data is in the linear sRGB color space.
    LinearRgb,
    /// The pixel data is alpha-only (contains meaningful data only in the alpha channel).
    ///
    /// Alpha-only surfaces pass unchanged through color space conversions.
    AlphaOnly,
}

impl SurfaceType {
    /// Combines surface types
    ///
    /// Alpha-only surfaces take the type of the other operand.  Both operands are
    /// expected to be in the same color space otherwise; if they are not, the left
    /// operand wins.
    pub fn combine(self, other: SurfaceType) -> SurfaceType {
        match (self, other) {
            (SurfaceType::AlphaOnly, t) => t,
            (t, _) => t,
        }
    }
}

/// Read-only wrapper for a Cairo image surface that may be shared between filter slots.
///
/// The wrapped surface is never modified after construction; new results are
/// always written into an [`ExclusiveImageSurface`] and then shared.
#[derive(Debug, Clone)]
pub struct SharedImageSurface {
    surface: ImageSurface,

    data_ptr: NonNull<u8>, // *const.
    width: i32,
    height: i32,
    stride: isize,

    surface_type: SurfaceType,
}

// The pixel data is never written through a SharedImageSurface.
unsafe impl Sync for SharedImageSurface {}

/// Wrapper for a Cairo image surface that has exclusive access to its pixel data.
#[derive(Debug)]
pub struct ExclusiveImageSurface {
    surface: ImageSurface,

    width: i32,
    height: i32,

    surface_type: SurfaceType,
}

impl SharedImageSurface {
    /// Creates a `SharedImageSurface` from a unique `ImageSurface`.
    ///
    /// # Panics
    /// Panics if the surface format isn't `ARgb32` and if the surface is not unique, that is, its
    /// reference count isn't 1.
    #[inline]
    pub fn wrap(surface: ImageSurface, surface_type: SurfaceType) -> Result<Self, cairo::Error> {
        // get_pixel() assumes ARgb32.
        assert_eq!(surface.format(), cairo::Format::ARgb32);

        let reference_count =
            unsafe { cairo::ffi::cairo_surface_get_reference_count(surface.to_raw_none()) };
        assert_eq!(reference_count, 1);

        let (width, height) = (surface.width(), surface.height());

        // Cairo returns a null data pointer for zero-sized surfaces.
        assert!(width > 0 && height > 0);

        surface.flush();
        surface.status()?;

        let data_ptr = NonNull::new(unsafe {
            cairo::ffi::cairo_image_surface_get_data(surface.to_raw_none())
        })
        .ok_or(cairo::Error::NullPointer)?;

        let stride = surface.stride() as isize;

        Ok(SharedImageSurface {
            surface,
            data_ptr,
            width,
            height,
            stride,
            surface_type,
        })
    }

    /// Creates a `SharedImageSurface` copying from an `ImageSurface`, even if it
    /// is shared elsewhere.
    pub fn copy_from_surface(
        surface: &cairo::ImageSurface,
        surface_type: SurfaceType,
    ) -> Result<Self, cairo::Error> {
        let copy =
            cairo::ImageSurface::create(cairo::Format::ARgb32, surface.width(), surface.height())?;

        {
            let cr = cairo::Context::new(&copy)?;
            cr.set_source_surface(surface, 0f64, 0f64)?;
            cr.paint()?;
        }

        SharedImageSurface::wrap(copy, surface_type)
    }

    /// Creates an empty `SharedImageSurface` of the given size and `type`.
    #[inline]
    pub fn empty(width: i32, height: i32, surface_type: SurfaceType) -> Result<Self, cairo::Error> {
        let s = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)?;

        SharedImageSurface::wrap(s, surface_type)
    }

    /// Converts this `SharedImageSurface` back into a Cairo image surface.
    #[inline]
    pub fn into_image_surface(self) -> Result<ImageSurface, cairo::Error> {
        let reference_count =
            unsafe { cairo::ffi::cairo_surface_get_reference_count(self.surface.to_raw_none()) };

        if reference_count == 1 {
            Ok(self.surface)
        } else {
            // If there are any other references, copy the underlying surface.
            self.copy_surface(IRect::from_size(self.width, self.height))
        }
    }

    /// Returns the surface width.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Returns the surface height.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Returns the surface stride.
    #[inline]
    pub fn stride(&self) -> isize {
        self.stride
    }

    /// Returns `true` if the surface contains meaningful data only in the alpha channel.
    #[inline]
    pub fn is_alpha_only(&self) -> bool {
        self.surface_type == SurfaceType::AlphaOnly
    }

    /// Returns the type of this surface.
    #[inline]
    pub fn surface_type(&self) -> SurfaceType {
        self.surface_type
    }

    /// Retrieves the pixel value at the given coordinates.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Pixel {
        assert!(x < self.width as u32);
        assert!(y < self.height as u32);

        #[allow(clippy::cast_ptr_alignment)]
        let value = unsafe {
            *(self
                .data_ptr
                .as_ptr()
                .offset(y as isize * self.stride + x as isize * 4) as *const u32)
        };

        Pixel::from_u32(value)
    }

    /// Calls `set_source_surface()` on the given Cairo context.
    #[inline]
    pub fn set_as_source_surface(
        &self,
        cr: &cairo::Context,
        x: f64,
        y: f64,
    ) -> Result<(), cairo::Error> {
        cr.set_source_surface(&self.surface, x, y)
    }

    /// Creates a Cairo surface pattern from the surface
    pub fn to_cairo_pattern(&self) -> cairo::SurfacePattern {
        cairo::SurfacePattern::create(&self.surface)
    }

    /// Returns a new `ImageSurface` with the same contents as the one stored in this
    /// `SharedImageSurface` within the given bounds.
    fn copy_surface(&self, bounds: IRect) -> Result<ImageSurface, cairo::Error> {
        let output_surface =
            cairo::ImageSurface::create(cairo::Format::ARgb32, self.width, self.height)?;

        let cr = cairo::Context::new(&output_surface)?;
        clip_to(&cr, bounds);

        cr.set_source_surface(&self.surface, 0f64, 0f64)?;
        cr.paint()?;

        Ok(output_surface)
    }

    /// Returns a surface with black color channels and the alpha channel of this surface.
    pub fn extract_alpha(&self, bounds: IRect) -> Result<SharedImageSurface, cairo::Error> {
        let mut output_surface =
            ExclusiveImageSurface::new(self.width, self.height, SurfaceType::AlphaOnly)?;

        output_surface.modify(&mut |data, stride| {
            for (x, y, Pixel { a, .. }) in Pixels::within(self, bounds) {
                let output_pixel = Pixel {
                    r: 0,
                    g: 0,
                    b: 0,
                    a,
                };
                data.set_pixel(stride, output_pixel, x, y);
            }
        });

        output_surface.share()
    }

    /// Converts the surface to the linear sRGB color space.
    #[inline]
    pub fn to_linear_rgb(&self, bounds: IRect) -> Result<SharedImageSurface, cairo::Error> {
        match self.surface_type {
            SurfaceType::LinearRgb | SurfaceType::AlphaOnly => Ok(self.clone()),
            SurfaceType::SRgb => srgb::linearize_surface(self, bounds),
        }
    }

    /// Converts the surface to the sRGB color space.
    #[inline]
    pub fn to_srgb(&self, bounds: IRect) -> Result<SharedImageSurface, cairo::Error> {
        match self.surface_type {
            SurfaceType::SRgb | SurfaceType::AlphaOnly => Ok(self.clone()),
            SurfaceType::LinearRgb => srgb::unlinearize_surface(self, bounds),
        }
    }

    /// Translates the contents by a whole number of pixels.
    ///
    /// Only the part of the result that falls inside `bounds` is painted, and only
    /// pixels that came from inside `bounds`.
    pub fn offset(&self, bounds: IRect, dx: i32, dy: i32) -> Result<SharedImageSurface, cairo::Error> {
        let output_surface =
            cairo::ImageSurface::create(cairo::Format::ARgb32, self.width, self.height)?;

        if let Some(output_bounds) = bounds.translate((dx, dy)).intersection(&bounds) {
            let cr = cairo::Context::new(&output_surface)?;
            clip_to(&cr, output_bounds);

            self.set_as_source_surface(&cr, f64::from(dx), f64::from(dy))?;
            cr.paint()?;
        }

        SharedImageSurface::wrap(output_surface, self.surface_type)
    }

    /// Returns a new surface of the same size as `bounds`, holding the pixels of
    /// this surface inside `bounds`.
    pub fn tile(&self, bounds: IRect) -> Result<SharedImageSurface, cairo::Error> {
        let output_surface =
            cairo::ImageSurface::create(cairo::Format::ARgb32, bounds.width(), bounds.height())?;

        {
            let cr = cairo::Context::new(&output_surface)?;
            self.set_as_source_surface(&cr, f64::from(-bounds.x0), f64::from(-bounds.y0))?;
            cr.paint()?;
        }

        SharedImageSurface::wrap(output_surface, self.surface_type)
    }

    /// Returns a surface of this surface's size with `image` repeated across
    /// `bounds`, with a tile origin at `(x, y)`.
    pub fn paint_image_tiled(
        &self,
        bounds: IRect,
        image: &SharedImageSurface,
        x: i32,
        y: i32,
    ) -> Result<SharedImageSurface, cairo::Error> {
        let output_surface =
            cairo::ImageSurface::create(cairo::Format::ARgb32, self.width, self.height)?;

        {
            let cr = cairo::Context::new(&output_surface)?;

            let ptn = image.to_cairo_pattern();
            ptn.set_extend(cairo::Extend::Repeat);
            let mut mat = cairo::Matrix::identity();
            mat.translate(f64::from(-x), f64::from(-y));
            ptn.set_matrix(mat);

            clip_to(&cr, bounds);
            cr.set_source(&ptn)?;
            cr.paint()?;
        }

        SharedImageSurface::wrap(output_surface, image.surface_type)
    }

    /// Composites this surface over `other` within `bounds`, with the given operator.
    pub fn compose(
        &self,
        other: &SharedImageSurface,
        bounds: IRect,
        operator: cairo::Operator,
    ) -> Result<SharedImageSurface, cairo::Error> {
        let output_surface = other.copy_surface(bounds)?;

        {
            let cr = cairo::Context::new(&output_surface)?;
            clip_to(&cr, bounds);

            self.set_as_source_surface(&cr, 0.0, 0.0)?;
            cr.set_operator(operator);
            cr.paint()?;
        }

        SharedImageSurface::wrap(
            output_surface,
            other.surface_type.combine(self.surface_type),
        )
    }

    /// Fills the given bounds with an unpremultiplied pixel value.
    pub fn flood(&self, bounds: IRect, color: Pixel) -> Result<SharedImageSurface, cairo::Error> {
        let mut output_surface =
            ExclusiveImageSurface::new(self.width, self.height, self.surface_type)?;

        if color.a > 0 {
            let premultiplied = color.premultiply();

            output_surface.modify(&mut |data, stride| {
                for y in bounds.y_range() {
                    for x in bounds.x_range() {
                        data.set_pixel(stride, premultiplied, x as u32, y as u32);
                    }
                }
            });
        }

        output_surface.share()
    }
}

fn clip_to(cr: &cairo::Context, bounds: IRect) {
    cr.rectangle(
        f64::from(bounds.x0),
        f64::from(bounds.y0),
        f64::from(bounds.width()),
        f64::from(bounds.height()),
    );
    cr.clip();
}

impl ExclusiveImageSurface {
    pub fn new(
        width: i32,
        height: i32,
        surface_type: SurfaceType,
    ) -> Result<ExclusiveImageSurface, cairo::Error> {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)?;

        Ok(ExclusiveImageSurface {
            surface,
            width,
            height,
            surface_type,
        })
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> isize {
        self.surface.stride() as isize
    }

    /// Converts this surface into a read-only `SharedImageSurface`.
    #[inline]
    pub fn share(self) -> Result<SharedImageSurface, cairo::Error> {
        SharedImageSurface::wrap(self.surface, self.surface_type)
    }

    /// Raw access to the image data as a slice
    #[inline]
    pub fn data(&mut self) -> cairo::ImageSurfaceData<'_> {
        // Only fails if the surface is shared, and this type never hands it out.
        self.surface.data().unwrap()
    }

    /// Modify the image data
    #[inline]
    pub fn modify(&mut self, draw_fn: &mut dyn FnMut(&mut cairo::ImageSurfaceData<'_>, usize)) {
        let stride = self.stride() as usize;
        let mut data = self.data();

        draw_fn(&mut data, stride)
    }
}
