//! Row-major pixel iteration over a region of a `SharedImageSurface`.
use crate::rect::IRect;

use super::shared_surface::SharedImageSurface;
use super::Pixel;

/// Yields `(x, y, pixel)` for every pixel inside a rectangle, one row after another.
pub struct Pixels<'a> {
    surface: &'a SharedImageSurface,
    bounds: IRect,
    x: i32,
    y: i32,
}

impl<'a> Pixels<'a> {
    /// Iterates over the pixels of `surface` inside `bounds`.
    ///
    /// `bounds` must lie within the surface, or be empty.
    #[inline]
    pub fn within(surface: &'a SharedImageSurface, bounds: IRect) -> Self {
        let whole = IRect::from_size(surface.width(), surface.height());
        assert!(bounds.is_empty() || whole.intersection(&bounds) == Some(bounds));

        // An empty rectangle starts out exhausted.
        let y = if bounds.is_empty() { bounds.y1 } else { bounds.y0 };

        Self {
            surface,
            bounds,
            x: bounds.x0,
            y,
        }
    }

    fn remaining(&self) -> usize {
        if self.y >= self.bounds.y1 {
            return 0;
        }

        let full_rows = (self.bounds.y1 - self.y - 1) * self.bounds.width();
        (full_rows + self.bounds.x1 - self.x) as usize
    }
}

impl<'a> Iterator for Pixels<'a> {
    type Item = (u32, u32, Pixel);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.y >= self.bounds.y1 {
            return None;
        }

        let (x, y) = (self.x as u32, self.y as u32);

        self.x += 1;
        if self.x == self.bounds.x1 {
            self.x = self.bounds.x0;
            self.y += 1;
        }

        Some((x, y, self.surface.get_pixel(x, y)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl<'a> ExactSizeIterator for Pixels<'a> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface_utils::shared_surface::SurfaceType;

    #[test]
    fn counts_pixels_in_bounds() {
        const WIDTH: i32 = 32;
        const HEIGHT: i32 = 64;

        let surface = SharedImageSurface::empty(WIDTH, HEIGHT, SurfaceType::SRgb).unwrap();

        let all = Pixels::within(&surface, IRect::from_size(WIDTH, HEIGHT));
        assert_eq!(all.len(), (WIDTH * HEIGHT) as usize);
        assert_eq!(all.count(), (WIDTH * HEIGHT) as usize);

        for (bounds, n) in [
            (IRect::from_size(1, HEIGHT), HEIGHT as usize),
            (IRect::new(3, 5, 7, 6), 4),
            (IRect::from_size(0, HEIGHT), 0),
            (IRect::new(0, 0, 0, 0), 0),
        ] {
            assert_eq!(Pixels::within(&surface, bounds).count(), n, "{bounds:?}");
        }
    }

    #[test]
    fn visits_rows_in_order() {
        let surface = SharedImageSurface::empty(4, 4, SurfaceType::SRgb).unwrap();
        let mut pixels = Pixels::within(&surface, IRect::new(1, 1, 3, 3));

        pixels.next();
        assert_eq!(pixels.len(), 3);

        let coords: Vec<(u32, u32)> = pixels.map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(2, 1), (1, 2), (2, 2)]);
    }
}
