//! Primitive subregions.
use crate::rect::Rect;
use crate::transform::Transform;

use super::context::FilterContext;

/// The `x`, `y`, `width` and `height` of a primitive, in user space, waiting for a
/// [`FilterContext`] to supply the filter region they default to.
pub struct BoundsBuilder {
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,

    /// User space to device pixels.
    to_device: Transform,
}

/// A primitive subregion in device pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    /// The part of the subregion inside the filter effects region; may be empty.
    pub clipped: Rect,

    /// The subregion as written.
    pub unclipped: Rect,
}

// Moves the start of `[start, end)` to `new_start`, keeping its length, then
// replaces the length with `new_len`.
fn place(start: f64, end: f64, new_start: Option<f64>, new_len: Option<f64>) -> (f64, f64) {
    let from = new_start.unwrap_or(start);
    let len = new_len.unwrap_or(end - start);

    (from, from + len)
}

impl BoundsBuilder {
    #[inline]
    pub fn new(
        x: Option<f64>,
        y: Option<f64>,
        width: Option<f64>,
        height: Option<f64>,
        to_device: Transform,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            to_device,
        }
    }

    /// Resolves the subregion: unset attributes take their value from the filter
    /// region.
    pub fn compute(self, ctx: &FilterContext) -> Bounds {
        // FilterContext::new only accepts invertible transforms.
        let from_device = self.to_device.invert().unwrap_or_default();
        let region = from_device.transform_rect(&ctx.filter_region());

        let (x0, x1) = place(region.x0, region.x1, self.x, self.width);
        let (y0, y1) = place(region.y0, region.y1, self.y, self.height);

        let unclipped = self.to_device.transform_rect(&Rect::new(x0, y0, x1, y1));
        let clipped = unclipped
            .intersection(&ctx.effects_region())
            .unwrap_or_default();

        Bounds { clipped, unclipped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_attributes_override_the_region() {
        assert_eq!(place(-1.0, 9.0, None, None), (-1.0, 9.0));
        assert_eq!(place(-1.0, 9.0, Some(2.0), None), (2.0, 12.0));
        assert_eq!(place(-1.0, 9.0, None, Some(3.0)), (-1.0, 2.0));
        assert_eq!(place(-1.0, 9.0, Some(2.0), Some(0.0)), (2.0, 2.0));
    }
}
